mod audit;
mod config;
mod outbox;
mod report;
mod run;
mod system;
mod tenant;

use crate::cli::{args::Command, context::AppContext, error::CliError, ui::UiStyle};

pub fn dispatch(ctx: &AppContext, style: &UiStyle, command: Command) -> Result<(), CliError> {
    match command {
        Command::Run(args) => run::cmd_run(ctx, style, args),
        Command::Tenant(command) => tenant::cmd_tenant(ctx, style, command),
        Command::Report(args) => report::cmd_report(ctx, style, args),
        Command::Outbox { tenant } => outbox::cmd_outbox(ctx, style, &tenant),
        Command::Audit { limit } => audit::cmd_audit(ctx, style, limit),
        Command::Config(command) => config::cmd_config(ctx, command),
        Command::Version => system::cmd_version(style),
    }
}
