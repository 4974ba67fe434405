use clap::Parser;
use std::process;

use climbly::cli::commands::{Cli, Commands};
use climbly::cli::{self, Ctx};
use climbly::{config, logging};

fn main() {
    let cli_args = Cli::parse();
    if let Err(e) = logging::init() {
        eprintln!("warning: {e:#}");
    }

    let ctx = Ctx {
        json: cli_args.json,
        user: config::resolve_user(cli_args.user.as_deref()),
    };

    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(&ctx, cli_args.user.as_deref()),
        Commands::Task(cmd) => cli::task::run(cmd, &ctx),
        Commands::Plan(cmd) => cli::plan::run(cmd, &ctx),
        Commands::Record(cmd) => cli::record::run(cmd, &ctx),
        Commands::Progress { task, today } => cli::progress::run(&task, today.as_deref(), &ctx),
        Commands::Dashboard { from, to, today } => {
            cli::dashboard::run(from.as_deref(), to.as_deref(), today.as_deref(), &ctx)
        }
        Commands::Share(cmd) => cli::share::run(cmd, &ctx),
    };

    process::exit(exit_code);
}
