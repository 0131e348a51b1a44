mod defaults;

use std::path::PathBuf;
use std::time::Duration;

use defaults::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ListenEndpoint, Secret};

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct HttpConfig {
    #[serde(default = "_default_http_listen")]
    #[schemars(with = "String")]
    pub listen: ListenEndpoint,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            listen: _default_http_listen(),
        }
    }
}

/// Controls the `<prefix>-<category code>-<sequence>` asset names.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct AssetCodeConfig {
    #[serde(default = "_default_asset_code_prefix")]
    pub prefix: String,

    /// Minimum number of digits in the sequence part. Longer numbers are kept as-is.
    #[serde(default = "_default_asset_code_width")]
    pub width: usize,
}

impl Default for AssetCodeConfig {
    fn default() -> Self {
        Self {
            prefix: _default_asset_code_prefix(),
            width: _default_asset_code_width(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct ReportsConfig {
    /// Number of trailing calendar months in the status trend
    #[serde(default = "_default_report_months")]
    pub months: u32,

    #[serde(default = "_default_license_expiry_warning", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub license_expiry_warning: Duration,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            months: _default_report_months(),
            license_expiry_warning: _default_license_expiry_warning(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct ApiTokenConfig {
    /// Identifier stamped on history entries written with this token
    pub actor: String,
    #[schemars(with = "String")]
    pub token: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct AssetdeskConfigStore {
    #[serde(default = "_default_database_url")]
    #[schemars(with = "String")]
    pub database_url: Secret<String>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub asset_codes: AssetCodeConfig,

    #[serde(default)]
    pub reports: ReportsConfig,

    #[serde(default = "_default_empty_vec::<ApiTokenConfig>")]
    pub api_tokens: Vec<ApiTokenConfig>,
}

impl Default for AssetdeskConfigStore {
    fn default() -> Self {
        Self {
            database_url: _default_database_url(),
            http: <_>::default(),
            asset_codes: <_>::default(),
            reports: <_>::default(),
            api_tokens: vec![],
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetdeskConfig {
    pub store: AssetdeskConfigStore,
    pub paths_relative_to: PathBuf,
}

impl AssetdeskConfig {
    /// Resolves an API token to the actor it was issued for.
    pub fn actor_for_token(&self, token: &str) -> Option<&str> {
        self.store
            .api_tokens
            .iter()
            .find(|t| t.token.expose_secret() == token)
            .map(|t| t.actor.as_str())
    }
}
