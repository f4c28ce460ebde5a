use tally_domain::CURRENT_SCHEMA_VERSION;

use crate::{cli::error::CliError, cli::ui::UiStyle, utils::build_info};

pub(super) fn cmd_version(style: &UiStyle) -> Result<(), CliError> {
    let meta = build_info::current();
    println!("{}", style.header(&format!("Billing Core {}", meta.version)));
    let rows = [
        ("Book schema", format!("v{CURRENT_SCHEMA_VERSION}")),
        ("Build hash", format!("{} ({})", meta.git_hash, meta.git_status)),
        ("Built at", meta.timestamp.to_string()),
        ("Target", meta.target.to_string()),
        ("Profile", meta.profile.to_string()),
        ("Rustc", meta.rustc.to_string()),
    ];
    for (label, value) in rows {
        println!("{label:<12} {value}");
    }
    Ok(())
}
