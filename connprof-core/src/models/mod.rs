//! Profile data model.
//!
//! A profile is a named record of database connection parameters, optionally
//! reached through an SSH tunnel. Secrets are wrapped in
//! [`secrecy::SecretString`] so they are redacted from `Debug` output and
//! never serialized by accident.

use secrecy::SecretString;

/// Default MySQL/MariaDB server port.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Database endpoint parameters.
#[derive(Debug, Clone)]
pub struct DbInfo {
    /// Hostname or IP address of the database server.
    pub host: String,
    /// TCP port of the database server.
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Password for authentication.
    pub password: SecretString,
}

impl Default for DbInfo {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_DB_PORT,
            user: String::new(),
            password: SecretString::from(String::new()),
        }
    }
}

/// SSH tunnel configuration for profiles that reach the database through a
/// jump host.
#[derive(Debug, Clone)]
pub struct SshTunnelConfig {
    /// Whether the tunnel is enabled for this profile.
    pub enabled: bool,
    /// SSH host to tunnel through.
    pub host: String,
    /// SSH port.
    pub port: u16,
    /// SSH username.
    pub user: String,
    /// SSH password, if password authentication is used.
    pub password: SecretString,
    /// Path to an SSH identity file, if key authentication is used.
    pub identity_file: String,
    /// Local port for the tunnel endpoint (0 = auto-assign).
    pub local_port: u16,
}

impl Default for SshTunnelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: DEFAULT_SSH_PORT,
            user: String::new(),
            password: SecretString::from(String::new()),
            identity_file: String::new(),
            local_port: 0,
        }
    }
}

/// A complete connection profile as stored in the profile directory.
#[derive(Debug, Clone, Default)]
pub struct ProfileInfo {
    /// Profile name; unique within a store, used as the file stem.
    pub name: String,
    /// Database endpoint.
    pub db: DbInfo,
    /// Optional SSH tunnel.
    pub ssh_tunnel: SshTunnelConfig,
}

impl ProfileInfo {
    /// Creates a profile with the given name and database endpoint.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            db: DbInfo {
                host: host.into(),
                port,
                ..DbInfo::default()
            },
            ssh_tunnel: SshTunnelConfig::default(),
        }
    }

    /// Returns the host:port endpoint the profile connects to.
    #[must_use]
    pub fn endpoint(&self) -> (&str, u16) {
        (self.db.host.as_str(), self.db.port)
    }
}
