use anyhow::Result;
use console::style;

use crate::core::bots::{BotRecord, RecordStore};
use crate::core::config::{ConfigOverrides, ServiceConfig};
use crate::core::terminal::{print_info, print_status, print_warn};

/// Prints an owner's bots straight from the record store. Without a running
/// service there is no process registry, so only the persisted status is known.
pub async fn list_owner_bots(owner: &str, overrides: ConfigOverrides) -> Result<()> {
    let config = ServiceConfig::load(&overrides).await?;
    let path = config.records_path();
    if !path.exists() {
        print_info(&format!("No record store at {}", path.display()));
        return Ok(());
    }

    let records = RecordStore::open(&path).await?.load().await?;
    let mut owned: Vec<&BotRecord> = records.values().filter(|r| r.owner == owner).collect();
    owned.sort_by_key(|r| r.created_at);

    if owned.is_empty() {
        print_info(&format!("{} has no bots.", owner));
        return Ok(());
    }

    println!(" {} {}", style("Bots of").bold(), style(owner).cyan());
    for record in owned {
        print_status(
            &record.id,
            &format!(
                "{} ({}) recorded as {}",
                record.name,
                if record.file_type.is_empty() {
                    "no extension"
                } else {
                    record.file_type.as_str()
                },
                record.status
            ),
        );
    }
    print_warn("Recorded status may be stale; ask the running service for liveness.");
    Ok(())
}
