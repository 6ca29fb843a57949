use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_api_key_header() -> String {
    "X-API-Key".to_string()
}

/// How requests to the vendor API authenticate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiAuth {
    #[default]
    None,
    Bearer {
        token: String,
    },
    ApiKey {
        #[serde(default = "default_api_key_header")]
        header: String,
        key: String,
    },
    Basic {
        username: String,
        password: String,
    },
    Custom {
        headers: BTreeMap<String, String>,
    },
    /// Toast machine-client credentials, exchanged for a bearer token on
    /// first use.
    ToastClient {
        client_id: String,
        client_secret: String,
    },
}

impl ApiAuth {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer { .. } => "bearer",
            Self::ApiKey { .. } => "api_key",
            Self::Basic { .. } => "basic",
            Self::Custom { .. } => "custom",
            Self::ToastClient { .. } => "toast_client",
        }
    }
}
