//! Init command implementation
//!
//! Writes the starter schema: a `Header`, three example payloads and the
//! `GamePacket` wrapper with its `payload` oneof.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Starter schema written by `socketgen init`
pub const STARTER_SCHEMA: &str = include_str!("../templates/packet.proto");

/// Default file name for the starter schema
pub const DEFAULT_SCHEMA_FILE: &str = "packet.proto";

/// Run the init command
pub fn run(path: Option<String>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| DEFAULT_SCHEMA_FILE.to_string());
    write_starter_schema(Path::new(&path), force)?;

    println!("Created {path}");
    println!();
    println!("Next steps:");
    println!("  Add payload messages and list them in the `payload` oneof");
    println!("  socketgen gen --lang go,ts --proto {path}");
    Ok(())
}

/// Write the starter schema to `path`, refusing to replace an existing file
/// unless `force` is set.
pub fn write_starter_schema(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("'{}' already exists (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    fs::write(path, STARTER_SCHEMA).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Wrote starter schema to {:?}", path);
    Ok(())
}
