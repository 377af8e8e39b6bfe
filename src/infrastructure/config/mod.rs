// ============================================================
// CONFIGURATION
// ============================================================
// Layered settings: defaults < TOML file < BULKSHEET_* environment

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::error::{AppError, Result};
use crate::domain::survey::GenerationConfig;

pub const DEFAULT_CONFIG_FILE: &str = "bulksheet.toml";
pub const ENV_PREFIX: &str = "BULKSHEET_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,

    /// File name offered in the Content-Disposition of a converted sheet (extension appended)
    pub download_file_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_upload_bytes: 32 * 1024 * 1024,
            download_file_name: "bulk-upload".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationConfig,
    pub server: ServerSettings,
}

pub struct ConfigService;

impl ConfigService {
    /// Build the provider chain. An explicit path must exist; the default
    /// `bulksheet.toml` in the working directory is optional.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(AppError::ValidationError(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                debug!(path = %path.display(), "Using config file");
                figment = figment.merge(Toml::file(path));
            }
            None => {
                figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate settings
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let settings: Settings = Self::figment(path)?
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;

        settings
            .generation
            .validate()
            .map_err(AppError::ValidationError)?;

        info!(
            locale = ?settings.generation.locale,
            negative_asin_scope = ?settings.generation.negative_asin_scope,
            min_category_len = settings.generation.min_category_len,
            "Configuration loaded"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::{NegativeAsinScope, OutputLocale, SlotRange};
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let settings = ConfigService::load(None).unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.server.port, 3001);
            assert_eq!(settings.generation.min_category_len, 2);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [generation]
                locale = "zh"
                negative_asin_scope = "all-campaigns"
                seed_categories = ["dock"]

                [generation.layout.keyword_slots]
                start = 3
                end = 5

                [server]
                port = 8080
                "#,
            )?;

            let settings = ConfigService::load(None).unwrap();
            assert_eq!(settings.generation.locale, OutputLocale::Zh);
            assert_eq!(
                settings.generation.negative_asin_scope,
                NegativeAsinScope::AllCampaigns
            );
            assert_eq!(settings.generation.seed_categories, vec!["dock".to_string()]);
            assert_eq!(settings.generation.layout.keyword_slots, SlotRange::new(3, 5));
            // untouched keys keep their defaults
            assert_eq!(settings.generation.bid_adjustment_percentage, "900");
            assert_eq!(settings.server.port, 8080);
            assert_eq!(settings.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[server]\nport = 8080\n")?;
            jail.set_env("BULKSHEET_SERVER__PORT", "9090");
            jail.set_env("BULKSHEET_GENERATION__MIN_CATEGORY_LEN", "1");

            let settings = ConfigService::load(Some(Path::new("custom.toml"))).unwrap();
            assert_eq!(settings.server.port, 9090);
            assert_eq!(settings.generation.min_category_len, 1);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_rejected() {
        Jail::expect_with(|_jail| {
            let result = ConfigService::load(Some(Path::new("nope.toml")));
            assert!(matches!(result, Err(AppError::ValidationError(_))));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("BULKSHEET_GENERATION__MIN_CATEGORY_LEN", "0");
            assert!(matches!(
                ConfigService::load(None),
                Err(AppError::ValidationError(_))
            ));
            Ok(())
        });
    }
}
