use tally_config::Config;

use crate::cli::{args::ConfigCommand, context::AppContext, error::CliError};

pub(super) fn cmd_config(ctx: &AppContext, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            let json = serde_json::to_string_pretty(&ctx.config)
                .map_err(|err| CliError::InvalidArguments(err.to_string()))?;
            println!("# {}", ctx.config_manager.config_path().display());
            println!("{json}");
            let paths = ctx.storage.paths();
            println!("# data root:   {}", paths.data_root.display());
            println!("# backup root: {}", paths.backup_root.display());
            Ok(())
        }
        ConfigCommand::Init { force } => {
            let manager = &ctx.config_manager;
            if manager.exists() {
                if !force {
                    println!(
                        "Configuration already exists at {}",
                        manager.config_path().display()
                    );
                    return Ok(());
                }
                let name = manager.backup(&ctx.config)?;
                println!("Previous configuration saved as {name}");
            }
            manager.save(&Config::default())?;
            println!("Wrote {}", manager.config_path().display());
            Ok(())
        }
        ConfigCommand::Backups => {
            let backups = ctx.config_manager.list_backups()?;
            if backups.is_empty() {
                println!("No configuration backups.");
            }
            for name in backups {
                println!("{name}");
            }
            Ok(())
        }
        ConfigCommand::Restore { name } => {
            ctx.config_manager.restore(&name)?;
            tracing::info!(backup = %name, "configuration restored");
            println!("Restored configuration from {name}");
            Ok(())
        }
    }
}
