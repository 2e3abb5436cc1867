use crumpet_core::{Error, Result};

use mysql_async::{Opts, OptsBuilder, PoolConstraints, PoolOpts};
use serde::Deserialize;

/// Connection pool configuration.
///
/// This is the only configuration channel: the recognized options below,
/// with their defaults. `user`, `password` and `database` are required and
/// validated when the pool is built. Unknown options are rejected during
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub database: Option<String>,

    #[serde(default = "default_charset")]
    pub charset: String,

    /// Pool size bounds; `min_size` must not exceed `max_size`.
    #[serde(default = "default_min_size")]
    pub min_size: usize,

    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Connection-level autocommit. Leave on unless every statement goes
    /// through explicit transactions.
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_min_size() -> usize {
    1
}

fn default_max_size() -> usize {
    10
}

fn default_autocommit() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: None,
            password: None,
            database: None,
            charset: default_charset(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            autocommit: default_autocommit(),
        }
    }
}

impl Config {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
            database: Some(database.into()),
            ..Self::default()
        }
    }

    /// Validates the configuration and lowers it to driver options.
    pub(crate) fn opts(&self) -> Result<Opts> {
        let user = self.required("user", &self.user)?;
        let password = self.required("password", &self.password)?;
        let database = self.required("database", &self.database)?;

        let constraints = PoolConstraints::new(self.min_size, self.max_size).ok_or_else(|| {
            Error::invalid_config(format!(
                "pool bounds min_size={} max_size={} are not a valid range",
                self.min_size, self.max_size
            ))
        })?;

        if !is_charset_name(&self.charset) {
            return Err(Error::invalid_config(format!(
                "`{}` is not a charset name",
                self.charset
            )));
        }

        // Charset and autocommit have no dedicated driver options; both are
        // applied to each pooled connection as setup statements.
        let setup = vec![
            format!("SET NAMES {}", self.charset),
            format!("SET autocommit={}", i32::from(self.autocommit)),
        ];

        let opts = OptsBuilder::default()
            .ip_or_hostname(self.host.as_str())
            .tcp_port(self.port)
            .user(Some(user))
            .pass(Some(password))
            .db_name(Some(database))
            .setup(setup)
            .client_found_rows(true)
            .pool_opts(PoolOpts::default().with_constraints(constraints));

        Ok(opts.into())
    }

    fn required<'a>(&self, name: &str, value: &'a Option<String>) -> Result<&'a str> {
        value
            .as_deref()
            .ok_or_else(|| Error::invalid_config(format!("missing required option `{name}`")))
    }
}

fn is_charset_name(charset: &str) -> bool {
    !charset.is_empty()
        && charset
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.charset, "utf8");
        assert_eq!(config.min_size, 1);
        assert_eq!(config.max_size, 10);
        assert!(config.autocommit);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"user": "app", "password": "s3cret", "database": "blog"}"#)
                .unwrap();
        assert_eq!(config.user.as_deref(), Some("app"));
        assert_eq!(config.host, "localhost");
        assert!(config.opts().is_ok());
    }

    #[test]
    fn rejects_unknown_options() {
        let result: std::result::Result<Config, _> =
            serde_json::from_str(r#"{"user": "app", "hostname": "db"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let mut config = Config::default();
        let err = config.opts().unwrap_err();
        assert_eq!(err.to_string(), "invalid configuration: missing required option `user`");

        config.user = Some("app".into());
        let err = config.opts().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: missing required option `password`"
        );
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut config = Config::new("app", "s3cret", "blog");
        config.min_size = 10;
        config.max_size = 2;
        assert!(matches!(
            config.opts().unwrap_err(),
            Error::InvalidConfig { .. }
        ));
    }

    #[test]
    fn rejects_charset_injection() {
        let mut config = Config::new("app", "s3cret", "blog");
        config.charset = "utf8; drop table users".into();
        assert!(matches!(
            config.opts().unwrap_err(),
            Error::InvalidConfig { .. }
        ));
    }
}
