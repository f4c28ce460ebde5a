//! Non-interactive command-line front end over the tally crates.

pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod spool;
pub mod system_clock;
pub mod ui;

pub use args::Cli;
pub use error::CliError;

use context::AppContext;
use ui::UiStyle;

/// Loads configuration, initialises tracing and executes the parsed command.
pub fn run_cli(cli: Cli) -> Result<(), CliError> {
    let ctx = AppContext::load(cli.home.as_deref())?;
    crate::init(ctx.config.log_filter.as_deref());
    let style = UiStyle::detect(ctx.config.color_enabled && !cli.no_color);
    commands::dispatch(&ctx, &style, cli.command)
}
