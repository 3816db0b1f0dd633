use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use minutes_core::uploads::DEFAULT_MAX_FILE_BYTES;
use url::Url;

use crate::auth::jwt::JwtConfig;

/// Configuration errors detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the JWT secret and the database names has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT signing configuration.
    pub jwt: JwtConfig,
    /// Directory uploaded files are written to and served from.
    pub uploads_path: PathBuf,
    /// Per-file upload ceiling in bytes.
    pub max_upload_bytes: u64,
    /// PostgreSQL connection URL for the primary store.
    pub database_url: String,
    /// MySQL/MariaDB connection URL for the personnel directory.
    pub directory_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `UPLOADS_PATH`         | `uploads`                  |
    /// | `MAX_UPLOAD_BYTES`     | `20971520` (20 MiB)        |
    /// | `DATABASE_URL`         | built from `DB_*`          |
    /// | `MARIADB_URL`          | built from `MARIADB_*`     |
    ///
    /// JWT settings are documented on [`JwtConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let host = env.or("HOST", "0.0.0.0");
        let port: u16 = env.parse("PORT", 3001)?;

        let cors_origins = parse_origins(&env.or("CORS_ORIGINS", "http://localhost:3000"));

        let request_timeout_secs: u64 = env.parse("REQUEST_TIMEOUT_SECS", 30)?;
        let uploads_path = PathBuf::from(env.or("UPLOADS_PATH", "uploads"));
        let max_upload_bytes: u64 = env.parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_FILE_BYTES)?;

        let jwt = JwtConfig::from_lookup(&lookup)?;

        let database_url = env.database_url(&PRIMARY_DB)?;
        let directory_url = env.database_url(&DIRECTORY_DB)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            uploads_path,
            max_upload_bytes,
            database_url,
            directory_url,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Database URL assembly
// ---------------------------------------------------------------------------

/// Variable names describing one database connection.
struct DatabaseVars {
    scheme: &'static str,
    url: &'static str,
    host: &'static str,
    port: &'static str,
    default_port: u16,
    name: &'static str,
    user: &'static str,
    password: &'static str,
}

const PRIMARY_DB: DatabaseVars = DatabaseVars {
    scheme: "postgres",
    url: "DATABASE_URL",
    host: "DB_HOST",
    port: "DB_PORT",
    default_port: 5432,
    name: "DB_NAME",
    user: "DB_USER",
    password: "DB_PASS",
};

const DIRECTORY_DB: DatabaseVars = DatabaseVars {
    scheme: "mysql",
    url: "MARIADB_URL",
    host: "MARIADB_HOST",
    port: "MARIADB_PORT",
    default_port: 3306,
    name: "MARIADB_DATABASE",
    user: "MARIADB_USER",
    password: "MARIADB_PASSWORD",
};

/// Thin wrapper over a variable lookup that treats blank values as unset.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: name,
                value,
                reason: e.to_string(),
            }),
        }
    }

    /// The explicit URL if given, otherwise one assembled from its parts.
    ///
    /// Credentials are percent-encoded into the userinfo section.
    fn database_url(&self, vars: &DatabaseVars) -> Result<String, ConfigError> {
        if let Some(url) = self.get(vars.url) {
            return Ok(url);
        }
        let name = self.required(vars.name)?;
        let user = self.required(vars.user)?;
        let password = self.get(vars.password);
        let host = self.or(vars.host, "localhost");
        let port: u16 = self.parse(vars.port, vars.default_port)?;

        let invalid = |var: &'static str, value: &str, reason: &str| ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut url = Url::parse(&format!("{}://{host}:{port}", vars.scheme))
            .map_err(|e| invalid(vars.host, &host, &e.to_string()))?;
        url.set_path(&format!("/{name}"));
        url.set_username(&user)
            .map_err(|()| invalid(vars.user, &user, "cannot be used in a URL"))?;
        url.set_password(password.as_deref())
            .map_err(|()| invalid(vars.password, "***", "cannot be used in a URL"))?;
        Ok(url.into())
    }
}
