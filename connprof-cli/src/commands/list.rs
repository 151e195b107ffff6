//! List profiles command.

use std::fmt::Write as _;
use std::path::Path;

use connprof_core::ProfileInfo;

use crate::cli::OutputFormat;
use crate::error::CliError;

use super::resolve_store;

/// List profiles command handler
pub fn cmd_list(config_path: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let store = resolve_store(config_path)?;

    let mut names: Vec<String> = store.list_names()?.into_iter().collect();
    names.sort();

    let mut profiles = Vec::with_capacity(names.len());
    for name in names {
        profiles.push(store.load(&name)?);
    }

    match format {
        OutputFormat::Table => println!("{}", format_table(&profiles)),
        OutputFormat::Json => println!("{}", format_json(&profiles)?),
    }
    Ok(())
}

/// Format profiles as a table string
#[must_use]
fn format_table(profiles: &[ProfileInfo]) -> String {
    if profiles.is_empty() {
        return "No profiles found.".to_string();
    }

    let mut output = String::new();
    // Width in characters, not bytes, so non-ASCII names line up.
    let name_width = profiles
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let host_width = profiles
        .iter()
        .map(|p| p.db.host.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let _ = writeln!(
        output,
        "{:<name_width$}  {:<host_width$}  {:<5}  {:<6}",
        "NAME", "HOST", "PORT", "TUNNEL"
    );
    let _ = writeln!(
        output,
        "{:-<name_width$}  {:-<host_width$}  {:-<5}  {:-<6}",
        "", "", "", ""
    );
    for profile in profiles {
        let tunnel = if profile.ssh_tunnel.enabled { "yes" } else { "no" };
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<host_width$}  {:<5}  {:<6}",
            profile.name, profile.db.host, profile.db.port, tunnel
        );
    }
    output.trim_end().to_string()
}

/// Format profiles as JSON string, without secrets
fn format_json(profiles: &[ProfileInfo]) -> Result<String, CliError> {
    let output: Vec<ProfileOutput> = profiles.iter().map(ProfileOutput::from).collect();
    serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Simplified profile output for CLI
#[derive(Debug, serde::Serialize)]
struct ProfileOutput<'a> {
    name: &'a str,
    host: &'a str,
    port: u16,
    user: &'a str,
    tunnel: bool,
}

impl<'a> From<&'a ProfileInfo> for ProfileOutput<'a> {
    fn from(profile: &'a ProfileInfo) -> Self {
        Self {
            name: &profile.name,
            host: &profile.db.host,
            port: profile.db.port,
            user: &profile.db.user,
            tunnel: profile.ssh_tunnel.enabled,
        }
    }
}
