use std::net::SocketAddr;
use std::path::PathBuf;

use zeroize::Zeroizing;

/// Application-level constants
pub const APP_NAME: &str = "Sugarlab";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the HTTP API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Sessions expire this many hours after login.
pub const DEFAULT_SESSION_HOURS: i64 = 24;

/// Upper bound for `SUGARLAB_SESSION_HOURS` (366 days).
pub const MAX_SESSION_HOURS: i64 = 24 * 366;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,sugarlab_lib=debug"
}

/// Get the application data directory
/// ~/SugarLab/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("SugarLab")
}

/// Default database location inside the data directory.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("sugarlab.db")
}

// ═══════════════════════════════════════════════════════════
// Lab profile — everything printed on the report besides data
// ═══════════════════════════════════════════════════════════

/// Printed lab details. The organisation slug also prefixes report file names.
#[derive(Debug, Clone)]
pub struct LabProfile {
    pub org_slug: String,
    pub technician: String,
    pub technician_qualification: String,
    pub pathologist: String,
    pub pathologist_qualification: String,
    pub disclaimer: String,
    pub work_timings: String,
}

impl Default for LabProfile {
    fn default() -> Self {
        Self {
            org_slug: "sugar_diagnostic".into(),
            technician: "Lab Technician".into(),
            technician_qualification: "DMLT, Lab Incharge".into(),
            pathologist: "Dr. Pathologist".into(),
            pathologist_qualification: "MBBS, MD Pathologist".into(),
            disclaimer: "NOT VALID FOR MEDICO LEGAL PURPOSE".into(),
            work_timings: "Work timings: Monday to Sunday, 8 am to 8 pm".into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Runtime configuration
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Initial admin account, read once at startup and hashed into the store.
pub struct AdminBootstrap {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub session_hours: i64,
    pub lab: LabProfile,
    pub admin: Option<AdminBootstrap>,
}

impl AppConfig {
    /// Build configuration from `SUGARLAB_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but with an injectable lookup (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("SUGARLAB_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "SUGARLAB_BIND",
            value: bind_raw.clone(),
        })?;

        let db_path = lookup("SUGARLAB_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let session_hours = match lookup("SUGARLAB_SESSION_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(h) if (1..=MAX_SESSION_HOURS).contains(&h) => h,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SUGARLAB_SESSION_HOURS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SESSION_HOURS,
        };

        let mut lab = LabProfile::default();
        if let Some(org) = lookup("SUGARLAB_ORG").filter(|s| !s.trim().is_empty()) {
            let slug: String = org
                .trim()
                .to_lowercase()
                .replace(char::is_whitespace, "_")
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
                .collect();
            if slug.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "SUGARLAB_ORG",
                    value: org,
                });
            }
            lab.org_slug = slug;
        }

        let admin = match (lookup("SUGARLAB_ADMIN_USER"), lookup("SUGARLAB_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
                Some(AdminBootstrap {
                    username: username.trim().to_string(),
                    password: Zeroizing::new(password),
                })
            }
            _ => None,
        };

        Ok(Self {
            bind_addr,
            db_path,
            session_hours,
            lab,
            admin,
        })
    }
}
