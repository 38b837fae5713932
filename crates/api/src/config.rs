use std::path::PathBuf;

use resizer_worker::SchedulerConfig;

/// Password seeded for the initial account when `ADMIN_PASSWORD` is unset.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Name of the directory created under the user's documents folder when
/// `PROJECTS_DIR` is not set.
pub const DEFAULT_PROJECTS_DIR_NAME: &str = "ImageResizer";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local use.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root under which every project directory is created.
    pub projects_dir: PathBuf,
    /// Run the scheduler inside the server process (default: `true`).
    pub embedded_scheduler: bool,
    pub scheduler: SchedulerConfig,
    /// Account created at startup when no user with this name exists.
    pub admin_username: String,
    pub admin_password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                        |
    /// |------------------------|--------------------------------|
    /// | `HOST`                 | `0.0.0.0`                      |
    /// | `PORT`                 | `3000`                         |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `PROJECTS_DIR`         | `<documents>/ImageResizer`     |
    /// | `EMBEDDED_SCHEDULER`   | `true`                         |
    /// | `ADMIN_USERNAME`       | `admin`                        |
    /// | `ADMIN_PASSWORD`       | `admin123`                     |
    ///
    /// Scheduler settings are read by [`SchedulerConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let projects_dir = std::env::var("PROJECTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_projects_dir());

        let embedded_scheduler: bool = std::env::var("EMBEDDED_SCHEDULER")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("EMBEDDED_SCHEDULER must be 'true' or 'false'");

        let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("ADMIN_PASSWORD not set; seeding the default password");
            DEFAULT_ADMIN_PASSWORD.into()
        });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            projects_dir,
            embedded_scheduler,
            scheduler: SchedulerConfig::from_env(),
            admin_username,
            admin_password,
        }
    }
}

/// `<documents>/ImageResizer`, falling back to the home directory and then
/// the working directory when no documents folder is known.
pub fn default_projects_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_PROJECTS_DIR_NAME)
}
