//! Fixture settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ORDER_FIXTURES_*` environment variables and
//! an optional configuration file; unset values fall back to the defaults
//! below.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::error::SettingsError;
use crate::pool::{DEFAULT_RETENTION_FLOOR, SkewPolicy};

/// Users generated when no count is configured.
pub const DEFAULT_USER_COUNT: usize = 1_500;

/// Orders generated when no count is configured.
pub const DEFAULT_ORDER_COUNT: usize = 25_000;

/// Output file written when no path is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "orders.csv";

/// Configuration for one fixture generation run.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORDER_FIXTURES")]
pub struct OrderFixturesSettings {
    /// Number of users to generate.
    #[ortho_config(default = 1500)]
    pub user_count: usize,
    /// Number of orders to generate.
    #[ortho_config(default = 25000)]
    pub order_count: usize,
    /// Path of the orders file.
    pub output_path: Option<String>,
    /// RNG seed for reproducible output; random when unset.
    pub seed: Option<u64>,
    /// Pool size at or above which drawn users may be retired.
    pub retention_floor: Option<usize>,
}

impl Default for OrderFixturesSettings {
    fn default() -> Self {
        Self {
            user_count: DEFAULT_USER_COUNT,
            order_count: DEFAULT_ORDER_COUNT,
            output_path: None,
            seed: None,
            retention_floor: None,
        }
    }
}

impl OrderFixturesSettings {
    /// Returns the configured output path, falling back to the default.
    #[must_use]
    pub fn output_path(&self) -> Utf8PathBuf {
        self.output_path
            .as_deref()
            .map_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_PATH), Utf8PathBuf::from)
    }

    /// Returns the skew policy implied by these settings.
    #[must_use]
    pub fn skew_policy(&self) -> SkewPolicy {
        SkewPolicy::default()
            .with_retention_floor(self.retention_floor.unwrap_or(DEFAULT_RETENTION_FLOOR))
    }

    /// Checks the settings before any generation happens.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidCount`] for a zero order count, since
    /// the output header is derived from the first order, and
    /// [`SettingsError::InvalidOutputPath`] when the output path does not
    /// name a file.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.order_count == 0 {
            return Err(SettingsError::InvalidCount {
                field: "order_count",
                value: self.order_count,
                reason: "at least one order is required to write the output file",
            });
        }

        let output_path = self.output_path();
        if !names_a_file(&output_path) {
            return Err(SettingsError::InvalidOutputPath {
                path: output_path.into_string(),
                message: "output path must name a file".to_owned(),
            });
        }
        Ok(())
    }
}

fn names_a_file(path: &Utf8Path) -> bool {
    path.file_name().is_some() && !path.as_str().ends_with('/')
}

#[cfg(test)]
mod tests {
    //! Unit tests for fixture settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> OrderFixturesSettings {
        OrderFixturesSettings::load_from_iter([OsString::from("order-fixtures")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ORDER_FIXTURES_USER_COUNT", None::<String>),
            ("ORDER_FIXTURES_ORDER_COUNT", None::<String>),
            ("ORDER_FIXTURES_OUTPUT_PATH", None::<String>),
            ("ORDER_FIXTURES_SEED", None::<String>),
            ("ORDER_FIXTURES_RETENTION_FLOOR", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.user_count, DEFAULT_USER_COUNT);
        assert_eq!(settings.order_count, DEFAULT_ORDER_COUNT);
        assert_eq!(settings.output_path(), Utf8PathBuf::from("orders.csv"));
        assert_eq!(settings.skew_policy(), SkewPolicy::default());
        assert!(settings.seed.is_none());
        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ORDER_FIXTURES_USER_COUNT", Some("40".to_owned())),
            ("ORDER_FIXTURES_ORDER_COUNT", Some("400".to_owned())),
            (
                "ORDER_FIXTURES_OUTPUT_PATH",
                Some("/tmp/fixtures/orders.csv".to_owned()),
            ),
            ("ORDER_FIXTURES_SEED", Some("2026".to_owned())),
            ("ORDER_FIXTURES_RETENTION_FLOOR", Some("20".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.user_count, 40);
        assert_eq!(settings.order_count, 400);
        assert_eq!(
            settings.output_path(),
            Utf8PathBuf::from("/tmp/fixtures/orders.csv")
        );
        assert_eq!(settings.seed, Some(2026));
        assert_eq!(settings.skew_policy().retention_floor(), 20);
    }

    #[test]
    fn zero_orders_are_rejected() {
        let settings = OrderFixturesSettings {
            order_count: 0,
            ..OrderFixturesSettings::default()
        };

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidCount {
                field: "order_count",
                value: 0,
                ..
            })
        ));
    }

    #[test]
    fn zero_users_are_accepted() {
        let settings = OrderFixturesSettings {
            user_count: 0,
            ..OrderFixturesSettings::default()
        };

        assert_eq!(settings.validate(), Ok(()));
    }

    #[rstest]
    #[case("/")]
    #[case("fixtures/")]
    #[case("fixtures/..")]
    fn directory_output_paths_are_rejected(#[case] path: &str) {
        let settings = OrderFixturesSettings {
            output_path: Some(path.to_owned()),
            ..OrderFixturesSettings::default()
        };

        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidOutputPath { .. })
        ));
    }
}
