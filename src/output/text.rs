use crate::db::task_repo::TaskCounts;
use crate::engine::lag::{LagReason, TimeTotals};
use crate::models::{DailyPlanEntry, MergedDay, RecordWork, Task, TaskAuth};

fn short(id: &str) -> &str {
    &id[..std::cmp::min(8, id.len())]
}

pub fn print_task(t: &Task) {
    println!("Task: {} ({})", t.name, t.id);
    if !t.content.is_empty() {
        println!("  Content: {}", t.content);
    }
    println!("  Category: {}", t.category.as_str());
    println!("  Status: {}", t.status.as_str());
    println!("  Period: {} .. {}", t.start_date, t.end_date);
    println!("  Target time: {}", t.target_time);
    if let Some(ref comment) = t.comment {
        println!("  Comment: {comment}");
    }
    println!("  Created by: {}", t.created_by);
}

pub fn print_task_list(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    for t in tasks {
        println!(
            "  [{}] {} ({}) {} .. {} target={}",
            t.status.as_str(),
            t.name,
            short(&t.id),
            t.start_date,
            t.end_date,
            t.target_time
        );
    }
}

pub fn print_plan(items: &[DailyPlanEntry]) {
    if items.is_empty() {
        println!("No daily plan.");
        return;
    }
    println!("  {:>3}  {:<10}  {:>6}  {:>7}", "#", "date", "work%", "time");
    for (i, e) in items.iter().enumerate() {
        println!(
            "  {:>3}  {}  {:>6.1}  {:>7.1}",
            i, e.target_date, e.work_plan_value, e.time_plan_value
        );
    }
}

pub fn print_merged(rows: &[MergedDay]) {
    if rows.is_empty() {
        println!("No plan or actual data.");
        return;
    }
    println!(
        "  {:<10}  {:>6}  {:>6}  {:>7}  {:>7}",
        "date", "plan%", "done%", "plan t", "done t"
    );
    for r in rows {
        println!(
            "  {}  {:>6.1}  {:>6.1}  {:>7.1}  {:>7.1}",
            r.target_date, r.work_plan_value, r.work_actual_value, r.time_plan_value, r.time_actual_value
        );
    }
}

pub fn print_record_list(records: &[RecordWork]) {
    if records.is_empty() {
        println!("No records found.");
        return;
    }
    for r in records {
        let progress = r.progress_value.map(|p| format!(" +{p}%")).unwrap_or_default();
        let time = r.work_time.map(|w| format!(" {w}min")).unwrap_or_default();
        println!(
            "  {} task={} {} .. {}{}{}",
            short(&r.id),
            short(&r.task_id),
            r.start_at.format("%Y-%m-%d %H:%M"),
            r.end_at.format("%H:%M"),
            progress,
            time
        );
    }
}

pub fn print_auths(auths: &[TaskAuth]) {
    if auths.is_empty() {
        println!("Not shared with anyone.");
        return;
    }
    for a in auths {
        println!("  {} [{}]", a.user, a.role.as_str());
    }
}

pub fn print_totals(t: &TimeTotals) {
    println!("Time: planned {:.1}, actual {:.1}", t.planned, t.actual);
}

pub fn print_counts(c: &TaskCounts) {
    println!(
        "Tasks: {} (active={} completed={} paused={} cancelled={})",
        c.total, c.active, c.completed, c.paused, c.cancelled
    );
}

pub fn print_lagging(lagging: &[(Task, LagReason)]) {
    if lagging.is_empty() {
        println!("No lagging tasks.");
        return;
    }
    println!("Lagging:");
    for (t, reason) in lagging {
        println!("  {} ({}) - {}", t.name, short(&t.id), reason.as_str());
    }
}
