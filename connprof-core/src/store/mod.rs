//! File-backed profile store.
//!
//! One profile per `<name>.toml` file in a single directory. The store
//! supplies the existing-name set the planner resolves against and performs
//! the commit writes for a finished plan. Commit treats the plan as
//! authoritative: it never re-derives conflict decisions, it only writes
//! what the plan says under the names the plan says.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::import::{ImportPlan, PlanAction};
use crate::models::{DbInfo, ProfileInfo, SshTunnelConfig};

/// On-disk representation of a profile file.
///
/// The profile name is the file stem, not a field; secrets pass through
/// plain strings only at the serialization boundary.
#[derive(Debug, Serialize, Deserialize)]
struct ProfileFile {
    db: DbFile,
    #[serde(default)]
    ssh_tunnel: Option<SshFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DbFile {
    host: String,
    port: u16,
    user: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SshFile {
    enabled: bool,
    host: String,
    port: u16,
    user: String,
    password: String,
    identity_file: String,
    local_port: u16,
}

impl ProfileFile {
    fn from_profile(profile: &ProfileInfo) -> Self {
        let ssh = &profile.ssh_tunnel;
        let ssh_tunnel = ssh.enabled.then(|| SshFile {
            enabled: true,
            host: ssh.host.clone(),
            port: ssh.port,
            user: ssh.user.clone(),
            password: ssh.password.expose_secret().to_string(),
            identity_file: ssh.identity_file.clone(),
            local_port: ssh.local_port,
        });
        Self {
            db: DbFile {
                host: profile.db.host.clone(),
                port: profile.db.port,
                user: profile.db.user.clone(),
                password: profile.db.password.expose_secret().to_string(),
            },
            ssh_tunnel,
        }
    }

    fn into_profile(self, name: String) -> ProfileInfo {
        ProfileInfo {
            name,
            db: DbInfo {
                host: self.db.host,
                port: self.db.port,
                user: self.db.user,
                password: SecretString::from(self.db.password),
            },
            ssh_tunnel: self.ssh_tunnel.map_or_else(SshTunnelConfig::default, |ssh| {
                SshTunnelConfig {
                    enabled: ssh.enabled,
                    host: ssh.host,
                    port: ssh.port,
                    user: ssh.user,
                    password: SecretString::from(ssh.password),
                    identity_file: ssh.identity_file,
                    local_port: ssh.local_port,
                }
            }),
        }
    }
}

/// Result of committing a plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommitSummary {
    /// Number of profiles written.
    pub saved: usize,
    /// Number of rows that failed to write (only with `continue_on_error`).
    pub failed: usize,
}

/// A directory of profile files.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the platform default profile directory.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("connprof").join("profiles"))
    }

    /// Returns the store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists the names of all stored profiles.
    ///
    /// A missing directory is an empty store; any other read failure is
    /// fatal, since planning against a partial name set would produce a
    /// silently colliding plan.
    pub fn list_names(&self) -> Result<HashSet<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(StoreError::DirectoryUnreadable {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut names = HashSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::DirectoryUnreadable {
                path: self.dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Returns true if a profile with the given name is stored.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        match Self::validate_name(name) {
            Ok(()) => self.profile_path(name).exists(),
            Err(_) => false,
        }
    }

    /// Loads a profile by name.
    pub fn load(&self, name: &str) -> Result<ProfileInfo, StoreError> {
        Self::validate_name(name)?;
        let path = self.profile_path(name);
        let content = fs::read_to_string(&path)?;
        let file: ProfileFile = toml::from_str(&content).map_err(|e| StoreError::Parse {
            path,
            reason: e.to_string(),
        })?;
        Ok(file.into_profile(name.to_string()))
    }

    /// Writes a profile file.
    ///
    /// Refuses to replace an existing profile unless `overwrite` is set.
    pub fn save(&self, profile: &ProfileInfo, overwrite: bool) -> Result<PathBuf, StoreError> {
        Self::validate_name(&profile.name)?;
        let path = self.profile_path(&profile.name);
        if !overwrite && path.exists() {
            return Err(StoreError::AlreadyExists(profile.name.clone()));
        }

        fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(&ProfileFile::from_profile(profile))?;
        fs::write(&path, content)?;
        tracing::debug!(name = %profile.name, path = %path.display(), "profile written");
        Ok(path)
    }

    /// Removes a profile file.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        Self::validate_name(name)?;
        fs::remove_file(self.profile_path(name))?;
        Ok(())
    }

    /// Writes every non-skipped row of a finished plan.
    ///
    /// Rows are written in ascending row-number order. With
    /// `continue_on_error`, individual write failures are counted and
    /// logged; otherwise the first failure aborts the commit.
    pub fn commit(
        &self,
        plan: &ImportPlan,
        continue_on_error: bool,
    ) -> Result<CommitSummary, StoreError> {
        let mut summary = CommitSummary::default();

        for row in plan.planned_rows() {
            let overwrite = row.action() == Some(PlanAction::Overwrite);
            match self.save(&row.profile, overwrite) {
                Ok(_) => summary.saved += 1,
                Err(e) if continue_on_error => {
                    tracing::warn!(
                        row = row.row_num,
                        name = %row.planned_name,
                        error = %e,
                        "failed to save profile"
                    );
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(saved = summary.saved, failed = summary.failed, "commit finished");
        Ok(summary)
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.toml"))
    }

    fn validate_name(name: &str) -> Result<(), StoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(())
    }
}
