//! # Environment Configuration
//!
//! `FREIGHT_RATE_TABLE` names a YAML or JSON rate-table file;
//! `FREIGHT_DEFAULT_CUSTOMER` is the customer UUID used when a command is
//! not given `--customer`. Command-line flags always win.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use freight_core::CustomerId;
use freight_pricing::{PricingError, RateTable};

pub const RATE_TABLE_VAR: &str = "FREIGHT_RATE_TABLE";
pub const DEFAULT_CUSTOMER_VAR: &str = "FREIGHT_DEFAULT_CUSTOMER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid UUID: {value:?}")]
    InvalidCustomer { var: &'static str, value: String },

    #[error("failed to read rate table {path}: {source}")]
    ReadRateTable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse rate table {path}: {source}")]
    ParseRateTable { path: PathBuf, source: PricingError },
}

/// Settings resolved from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub rate_table: Option<PathBuf>,
    pub default_customer: Option<CustomerId>,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let default_customer = match non_empty(DEFAULT_CUSTOMER_VAR) {
            Some(raw) => Some(CustomerId(Uuid::parse_str(raw.trim()).map_err(|_| {
                ConfigError::InvalidCustomer {
                    var: DEFAULT_CUSTOMER_VAR,
                    value: raw.clone(),
                }
            })?)),
            None => None,
        };

        Ok(Self {
            rate_table: non_empty(RATE_TABLE_VAR).map(PathBuf::from),
            default_customer,
        })
    }

    /// The flag value if given, else the configured path.
    pub fn rate_table_path<'a>(&'a self, flag: Option<&'a Path>) -> Option<&'a Path> {
        flag.or(self.rate_table.as_deref())
    }

    pub fn customer(&self, flag: Option<Uuid>) -> Option<CustomerId> {
        flag.map(CustomerId).or(self.default_customer)
    }
}

/// Load a rate table, choosing the format from the file extension.
///
/// `.json` files are parsed as JSON; anything else as YAML.
pub fn load_rate_table(path: &Path) -> Result<RateTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadRateTable {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        RateTable::from_json_str(&content)
    } else {
        RateTable::from_yaml_str(&content)
    };
    parsed.map_err(|source| ConfigError::ParseRateTable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use freight_core::TransportMode;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn empty_environment() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn reads_both_variables() {
        let id = Uuid::new_v4();
        let config = CliConfig::from_lookup(lookup(&[
            (RATE_TABLE_VAR, "/etc/freight/rates.yaml"),
            (DEFAULT_CUSTOMER_VAR, &id.to_string()),
        ]))
        .unwrap();
        assert_eq!(
            config.rate_table.as_deref(),
            Some(Path::new("/etc/freight/rates.yaml"))
        );
        assert_eq!(config.default_customer, Some(CustomerId(id)));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = CliConfig::from_lookup(lookup(&[
            (RATE_TABLE_VAR, "  "),
            (DEFAULT_CUSTOMER_VAR, ""),
        ]))
        .unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn bad_customer_is_rejected() {
        let err = CliConfig::from_lookup(lookup(&[(DEFAULT_CUSTOMER_VAR, "acme")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCustomer { .. }));
    }

    #[test]
    fn flags_override_environment() {
        let env_customer = CustomerId(Uuid::new_v4());
        let config = CliConfig {
            rate_table: Some(PathBuf::from("env.yaml")),
            default_customer: Some(env_customer),
        };
        let flag_customer = Uuid::new_v4();
        assert_eq!(
            config.customer(Some(flag_customer)),
            Some(CustomerId(flag_customer))
        );
        assert_eq!(config.customer(None), Some(env_customer));
        assert_eq!(
            config.rate_table_path(Some(Path::new("flag.yaml"))),
            Some(Path::new("flag.yaml"))
        );
        assert_eq!(config.rate_table_path(None), Some(Path::new("env.yaml")));
    }

    #[test]
    fn loads_yaml_and_json_tables() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("rates.yaml");
        let mut f = std::fs::File::create(&yaml).unwrap();
        writeln!(
            f,
            "rules:\n  - name: sea standard\n    basis: per_cbm\n    rate_usd_per_cbm: \"500\""
        )
        .unwrap();
        let table = load_rate_table(&yaml).unwrap();
        assert_eq!(table.default_rules(TransportMode::Sea).len(), 1);

        let json = dir.path().join("rates.json");
        std::fs::write(&json, r#"{"rules": [], "overrides": []}"#).unwrap();
        let table = load_rate_table(&json).unwrap();
        assert!(table.rules.is_empty());
    }

    #[test]
    fn missing_table_file() {
        let err = load_rate_table(Path::new("/nonexistent/rates.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadRateTable { .. }));
    }
}
