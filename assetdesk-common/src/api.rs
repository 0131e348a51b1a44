use poem_openapi::auth::ApiKey;
use poem_openapi::SecurityScheme;
use serde::{Deserialize, Serialize};

pub const TOKEN_HEADER: &str = "X-Assetdesk-Token";

#[derive(SecurityScheme)]
#[oai(ty = "api_key", key_name = "X-Assetdesk-Token", key_in = "header")]
#[allow(dead_code)]
pub struct TokenSecurityScheme(ApiKey);

/// Attached to every authorized request by the admin server.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RequestAuthorization {
    pub actor: String,
}

impl RequestAuthorization {
    pub fn actor(&self) -> &str {
        &self.actor
    }
}
