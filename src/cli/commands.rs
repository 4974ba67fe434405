use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::engine::PlanPolicy;
use crate::error::{ClimblyError, PlanError};

const VERSION: &str = env!("GIT_VERSION");

#[derive(Parser)]
#[command(
    name = "climbly",
    version = VERSION,
    about = "Plan daily progress on tasks and track it against actual work",
    after_help = "\
NOTE:
  Data lives in <dir>/.climbly/climbly.db, found by walking up from the current directory.
  Run `climbly init` before any other command.

PLANS:
  A daily plan has one entry per day between the task's start and end date.
  work_plan_value is cumulative and must reach exactly 100 on the last day.
  time_plan_value is per day and must add up to the task's target time.
  Plans that break either rule are rejected before anything is written.

USER:
  The acting user is --user, else $CLIMBLY_USER, else the user saved by `init`.

EXIT CODES:
  0  Success
  1  Error (validation, permission, DB, etc.)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Act as this user
    #[arg(long, global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize climbly in this directory (saves --user as the default user)
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Daily plan allocation and editing
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Work session records
    #[command(subcommand)]
    Record(RecordCommands),

    /// Compare a task's plan with its actual progress, day by day
    Progress {
        /// Task ID or prefix
        task: String,
        /// Reference date for lag detection (default: today, UTC)
        #[arg(long)]
        today: Option<String>,
    },

    /// Summary across all visible tasks
    Dashboard {
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Reference date for lag detection (default: today, UTC)
        #[arg(long)]
        today: Option<String>,
    },

    /// Share tasks with other users
    #[command(subcommand)]
    Share(ShareCommands),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Equal,
    WeekdayWeekend,
    PerWeekday,
}

/// Allocation policy selection shared by every command that generates a plan.
#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    /// Allocation policy
    #[arg(long, value_enum, default_value = "equal")]
    pub policy: PolicyKind,
    /// Weight of Monday..Friday (weekday-weekend)
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub weekday_ratio: f64,
    /// Weight of Saturday and Sunday (weekday-weekend)
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub weekend_ratio: f64,
    /// Seven weights, Sunday first (per-weekday), e.g. 0,1,1,1,1,1,0
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub ratios: Vec<f64>,
}

impl PolicyArgs {
    pub fn to_policy(&self) -> Result<PlanPolicy, ClimblyError> {
        match self.policy {
            PolicyKind::Equal => Ok(PlanPolicy::Equal),
            PolicyKind::WeekdayWeekend => Ok(PlanPolicy::WeekdayWeekend {
                weekday_ratio: self.weekday_ratio,
                weekend_ratio: self.weekend_ratio,
            }),
            PolicyKind::PerWeekday => {
                let ratios: [f64; 7] = self.ratios.as_slice().try_into().map_err(|_| {
                    PlanError::InvalidPolicyConfig(format!(
                        "--ratios needs exactly 7 values, Sunday first (got {})",
                        self.ratios.len()
                    ))
                })?;
                Ok(PlanPolicy::PerWeekday { ratios })
            }
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task and its daily plan
    Add {
        /// Task name
        name: String,
        #[arg(long, default_value = "")]
        content: String,
        /// study | creation | other
        #[arg(long, default_value = "study")]
        category: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Time budget spread over the plan (at most 1000000000)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        target_time: i64,
        #[arg(long)]
        comment: Option<String>,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Create a task from a stdin submission payload
    #[command(after_help = "\
STDIN FORMAT:
  {\"task\": {\"name\":\"...\", \"category\":\"study\", \"start_date\":\"2024-01-01\",
            \"end_date\":\"2024-01-03\", \"target_time\":10},
   \"daily_plans\": {\"items\": [{\"target_date\":\"2024-01-01\",
                                \"work_plan_value\":34, \"time_plan_value\":4}, ...]}}

NOTE:
  Atomic: the task and its plan are written together or not at all.
  The plan must be complete: last work value 100, time summing to target_time.")]
    Load,
    /// List tasks you own or were granted
    List {
        /// active | completed | paused | cancelled
        #[arg(long)]
        status: Option<String>,
    },
    /// Show task details and daily plan
    Show {
        /// Task ID or prefix
        id: String,
    },
    /// Update task fields
    #[command(after_help = "\
NOTE:
  Changing --start, --end or --target-time regenerates the daily plan with the
  given policy. Regeneration replaces both the work and the time value of
  every day in the new range; days outside it are removed.
  Pass --replan to regenerate without changing those fields.")]
    Update {
        /// Task ID or prefix
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        target_time: Option<i64>,
        #[arg(long)]
        comment: Option<String>,
        /// Regenerate the daily plan
        #[arg(long)]
        replan: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Delete a task with its plan and records
    Delete {
        /// Task ID or prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show a task's daily plan
    Show {
        /// Task ID or prefix
        task: String,
    },
    /// Re-allocate the plan with a policy
    #[command(after_help = "\
NOTE:
  --only work  re-allocates work and keeps the stored daily times.
  --only time  re-allocates time and keeps the stored cumulative work.")]
    Generate {
        /// Task ID or prefix
        task: String,
        #[command(flatten)]
        policy: PolicyArgs,
        /// work | time
        #[arg(long)]
        only: Option<String>,
        /// Print the result without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Set individual plan points, as a chart click or drag would
    #[command(after_help = "\
EDIT FORMAT:
  --set INDEX:FIELD=VALUE   (repeatable, applied in order)
  INDEX is the 0-based day, FIELD is work or time.
  e.g. --set 0:work=40 --set 2:time=1.5

NOTE:
  Work is clamped to 0..100, time to >= 0. Values keep one decimal, or are
  rounded to whole numbers with --drag. The edited plan is saved only if it
  still ends at 100% and its times add up to the target.")]
    Edit {
        /// Task ID or prefix
        task: String,
        #[arg(long = "set", required = true)]
        set: Vec<String>,
        /// Round values as a chart drag does
        #[arg(long)]
        drag: bool,
        /// Print the result without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Replace the plan from stdin JSON
    #[command(after_help = "\
STDIN FORMAT:
  {\"items\": [{\"target_date\":\"2024-01-01\", \"work_plan_value\":34, \"time_plan_value\":4}, ...]}

NOTE:
  Dates in the stored plan that are missing from the input are deleted.")]
    Put {
        /// Task ID or prefix
        task: String,
    },
}

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Log a work session
    Add {
        /// Task ID or prefix
        task: String,
        /// Session start (RFC 3339, or YYYY-MM-DD HH:MM as UTC)
        #[arg(long)]
        start: String,
        /// Session end
        #[arg(long)]
        end: String,
        /// Percentage points of the task completed in this session
        #[arg(long, allow_negative_numbers = true)]
        progress: Option<f64>,
        /// Minutes worked
        #[arg(long, allow_negative_numbers = true)]
        work_time: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// List work sessions
    List {
        /// Only this task
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Change a work session
    Update {
        /// Record ID or prefix
        id: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        progress: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        work_time: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a work session
    Delete {
        /// Record ID or prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ShareCommands {
    /// Grant a user access to a task
    Add {
        /// Task ID or prefix
        task: String,
        /// User to grant
        member: String,
        /// read | write | admin
        #[arg(long, default_value = "read")]
        role: String,
    },
    /// List users with access to a task
    List {
        /// Task ID or prefix
        task: String,
    },
    /// Revoke a user's access
    Remove {
        /// Task ID or prefix
        task: String,
        member: String,
    },
}
