use std::cell::RefCell;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use sales_core::{CategoryRule, SaleItem};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::ApiAuth;
use crate::error::{PosApiError, Result};
use crate::normalize::{items_from_records, records_from_body, rules_from_body};
use crate::toast::{self, LoginResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_PREVIEW_CHARS: usize = 500;

fn default_sales_path() -> String {
    "/api/sales".to_string()
}

fn default_categories_path() -> String {
    "/api/categories".to_string()
}

fn default_health_path() -> String {
    "/api/health".to_string()
}

/// Where the vendor API lives and how to reach each endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConnection {
    pub base_url: String,
    #[serde(default)]
    pub auth: ApiAuth,
    #[serde(default = "default_sales_path")]
    pub sales_path: String,
    #[serde(default = "default_categories_path")]
    pub categories_path: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl ApiConnection {
    pub fn new(base_url: impl Into<String>, auth: ApiAuth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            sales_path: default_sales_path(),
            categories_path: default_categories_path(),
            health_path: default_health_path(),
        }
    }
}

/// Result of a sales pull: rows ready to store plus how many records were
/// dropped during normalization.
#[derive(Debug, Clone, Default)]
pub struct SalesPull {
    pub items: Vec<SaleItem>,
    pub records_read: usize,
    pub records_dropped: usize,
}

/// Blocking client for one configured POS API.
pub struct PosClient {
    client: Client,
    connection: ApiConnection,
    toast_token: RefCell<Option<String>>,
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

impl PosClient {
    pub fn new(connection: ApiConnection) -> Result<Self> {
        let base_url = connection.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PosApiError::InvalidConfig(format!(
                "base url must start with http:// or https://, got `{}`",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sales-count/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            connection,
            toast_token: RefCell::new(None),
        })
    }

    pub fn connection(&self) -> &ApiConnection {
        &self.connection
    }

    fn url(&self, path: &str) -> String {
        let base = self.connection.base_url.trim().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn toast_login(&self, client_id: &str, client_secret: &str) -> Result<String> {
        if let Some(token) = self.toast_token.borrow().as_ref() {
            return Ok(token.clone());
        }
        let url = self.url(toast::LOGIN_PATH);
        tracing::debug!(url = %url, "toast login");
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "clientId": client_id,
                "clientSecret": client_secret,
                "userAccessType": "TOAST_MACHINE_CLIENT",
            }))
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = status.as_u16(), "toast login failed: {}", preview(&body));
            return Err(PosApiError::Auth(format!(
                "toast login returned status {}",
                status.as_u16()
            )));
        }
        let login: LoginResponse = response
            .json()
            .map_err(|err| PosApiError::Decode(err.to_string()))?;
        let token = login
            .token
            .and_then(|token| token.access_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PosApiError::Auth("no access token in login response".to_string()))?;
        self.toast_token.replace(Some(token.clone()));
        Ok(token)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let request = match &self.connection.auth {
            ApiAuth::None => request,
            ApiAuth::Bearer { token } => request.bearer_auth(token),
            ApiAuth::ApiKey { header, key } => request.header(header.as_str(), key.as_str()),
            ApiAuth::Basic { username, password } => request.basic_auth(username, Some(password)),
            ApiAuth::Custom { headers } => headers
                .iter()
                .fold(request, |request, (name, value)| {
                    request.header(name.as_str(), value.as_str())
                }),
            ApiAuth::ToastClient {
                client_id,
                client_secret,
            } => request.bearer_auth(self.toast_login(client_id, client_secret)?),
        };
        Ok(request.header("Accept", "application/json"))
    }

    fn get_json(&self, path: &str, query: &[(&str, String)], headers: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!(url = %url, query = ?query, "pos api request");
        let mut request = self.authorize(self.client.get(&url))?.query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send()?;
        let body = checked_body(response)?;
        serde_json::from_str(&body).map_err(|err| {
            tracing::error!("failed to parse pos api response: {}", preview(&body));
            PosApiError::Decode(err.to_string())
        })
    }

    /// True when the health endpoint answers 200.
    pub fn test_connection(&self) -> Result<bool> {
        let url = self.url(&self.connection.health_path);
        let response = self.authorize(self.client.get(&url))?.send()?;
        let ok = response.status() == StatusCode::OK;
        tracing::info!(url = %url, status = response.status().as_u16(), "pos api health check");
        Ok(ok)
    }

    pub fn pull_sales(&self, location: &str, start: NaiveDate, end: NaiveDate) -> Result<SalesPull> {
        let query = [
            ("location", location.to_string()),
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("format", "json".to_string()),
        ];
        let body = self.get_json(&self.connection.sales_path, &query, &[])?;
        let records = records_from_body(body)?;
        let (items, records_dropped) = items_from_records(&records, location);
        let pull = SalesPull {
            items,
            records_read: records.len(),
            records_dropped,
        };
        tracing::info!(
            location,
            records = pull.records_read,
            kept = pull.items.len(),
            "pulled sales"
        );
        Ok(pull)
    }

    /// Pulls one business day of Toast orders for `restaurant_guid` and books
    /// them under `location`.
    pub fn pull_toast_orders(
        &self,
        restaurant_guid: &str,
        location: &str,
        business_date: NaiveDate,
    ) -> Result<SalesPull> {
        if !matches!(self.connection.auth, ApiAuth::ToastClient { .. }) {
            return Err(PosApiError::InvalidConfig(
                "toast orders need toast_client authentication".to_string(),
            ));
        }
        let query = [(
            "businessDate",
            business_date.format("%Y%m%d").to_string(),
        )];
        let body = self.get_json(
            toast::ORDERS_BULK_PATH,
            &query,
            &[(toast::RESTAURANT_HEADER, restaurant_guid)],
        )?;
        let Value::Array(orders) = body else {
            return Err(PosApiError::Decode(
                "expected a list of toast orders".to_string(),
            ));
        };
        let items = toast::items_from_orders(&orders, location);
        tracing::info!(location, orders = orders.len(), items = items.len(), "pulled toast orders");
        Ok(SalesPull {
            records_read: orders.len(),
            records_dropped: 0,
            items,
        })
    }

    pub fn pull_category_mappings(&self) -> Result<Vec<CategoryRule>> {
        let body = self.get_json(&self.connection.categories_path, &[], &[])?;
        let rules = rules_from_body(&body)?;
        tracing::info!(categories = rules.len(), "pulled category mappings");
        Ok(rules)
    }
}

fn checked_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text()?;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::error!(status = status.as_u16(), "pos api rejected credentials");
        return Err(PosApiError::Auth(format!(
            "server returned status {}",
            status.as_u16()
        )));
    }
    if !status.is_success() {
        tracing::error!(status = status.as_u16(), "pos api request failed: {}", preview(&body));
        return Err(PosApiError::Status {
            status: status.as_u16(),
            body: preview(&body),
        });
    }
    Ok(body)
}
