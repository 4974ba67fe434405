use crate::error::PlanError;

/// Largest total the float shares stay exact for (2^53).
pub const MAX_TOTAL: i64 = 1 << 53;

/// Distribute an integer `total` over `weights` so the result sums to exactly
/// `total`.
///
/// Each slot first gets `floor(w / sum * total)`. The remainder is then handed
/// out one unit at a time to the first slots in index order, which keeps the
/// output reproducible across runs. Negative and non-finite weights count as 0.
/// Totals above [`MAX_TOTAL`] are rejected.
pub fn allocate(weights: &[f64], total: i64) -> Result<Vec<u64>, PlanError> {
    if total < 0 {
        return Err(PlanError::InvalidDistribution(format!(
            "total must not be negative (got {total})"
        )));
    }
    if total > MAX_TOTAL {
        return Err(PlanError::InvalidDistribution(format!(
            "total must be at most {MAX_TOTAL} (got {total})"
        )));
    }
    if total == 0 {
        return Ok(vec![0; weights.len()]);
    }

    let weights: Vec<f64> = weights.iter().copied().map(sanitize).collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(PlanError::InvalidDistribution(
            "at least one weight must be positive; adjust your ratios".into(),
        ));
    }
    if !sum.is_finite() {
        return Err(PlanError::InvalidDistribution(
            "weights are too large to add up; scale your ratios down".into(),
        ));
    }

    let total = total as u64;
    let mut out: Vec<u64> = weights
        .iter()
        .map(|w| (w / sum * total as f64).floor() as u64)
        .collect();

    // Float shares can land a unit above the exact floor; give it back from
    // the tail so the remainder below is never negative.
    let mut excess = out.iter().sum::<u64>().saturating_sub(total);
    for slot in out.iter_mut().rev() {
        let take = excess.min(*slot);
        *slot -= take;
        excess -= take;
    }

    let remainder = total - out.iter().sum::<u64>();
    let n = out.len() as u64;
    let (each, extra) = (remainder / n, remainder % n);
    for (i, slot) in out.iter_mut().enumerate() {
        *slot += each + u64::from((i as u64) < extra);
    }
    Ok(out)
}

fn sanitize(w: f64) -> f64 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}
