//! # Notion Store
//!
//! [`RecordStore`] over the Notion REST API.
//!
//! - `GET   /v1/databases/{id}`       → schema
//! - `POST  /v1/databases/{id}/query` → item pages (100 per page)
//! - `PATCH /v1/pages/{id}`           → field writes

use crate::SixminError;
use crate::config::{AnchorPolicy, FieldNames, NotionConfig};
use crate::store::codec;
use crate::store::{ItemPage, RecordStore, Scope, StoreSchema, TargetFieldKind};
use serde_json::{Value, json};
use sixmin_core::{FieldUpdates, ItemId, Stage, score_field_for};

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// HTTP client bound to one Notion database.
#[derive(Clone)]
pub struct NotionStore {
    http: reqwest::Client,
    base_url: String,
    token: String,
    database_id: String,
    page_size: u32,
    fields: FieldNames,
    anchor: AnchorPolicy,
}

impl NotionStore {
    /// Create a store from configuration. Fails if credentials are missing.
    pub fn new(
        config: &NotionConfig,
        fields: FieldNames,
        anchor: AnchorPolicy,
    ) -> Result<Self, SixminError> {
        let (token, database_id) = config.credentials()?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            database_id: database_id.to_string(),
            page_size: config.page_size,
            fields,
            anchor,
        })
    }

    /// Build a request with auth and version headers.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Send a request, check the status, and parse the JSON body.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, SixminError> {
        let resp = req
            .send()
            .await
            .map_err(|e| SixminError::Connection(format!("{}: {e}", self.base_url)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SixminError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SixminError::RateLimited);
        }
        if !status.is_success() {
            let message = match resp.text().await {
                Ok(body) => error_message(&body),
                Err(e) => format!("error body could not be read: {e}"),
            };
            return Err(SixminError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<Value>().await?)
    }

    async fn update_page(&self, id: &ItemId, properties: Value) -> Result<(), SixminError> {
        let req = self
            .request(reqwest::Method::PATCH, &codec::page_path(id))
            .json(&json!({ "properties": properties }));
        self.send(req).await.map(|_| ())
    }
}

/// Notion error bodies carry a `message`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

impl RecordStore for NotionStore {
    async fn describe_schema(&self) -> Result<StoreSchema, SixminError> {
        let path = format!("/v1/databases/{}", self.database_id);
        let db = self.send(self.request(reqwest::Method::GET, &path)).await?;
        codec::decode_schema(&db, &self.fields)
    }

    async fn fetch_items(
        &self,
        scope: Scope,
        cursor: Option<String>,
    ) -> Result<ItemPage, SixminError> {
        let path = format!("/v1/databases/{}/query", self.database_id);
        let body = codec::query_body(scope, &self.fields, cursor.as_deref(), self.page_size);
        let req = self.request(reqwest::Method::POST, &path).json(&body);
        let resp = self.send(req).await?;
        codec::decode_query(&resp, &self.fields, self.anchor)
    }

    async fn apply_updates(
        &self,
        id: &ItemId,
        updates: &FieldUpdates,
        target: TargetFieldKind,
    ) -> Result<(), SixminError> {
        let properties = codec::encode_updates(updates, target, &self.fields);
        self.update_page(id, properties).await
    }

    async fn write_target_label(
        &self,
        id: &ItemId,
        label: &str,
        target: TargetFieldKind,
    ) -> Result<(), SixminError> {
        let Some(value) = codec::encode_target(label, target) else {
            return Ok(());
        };
        let mut properties = serde_json::Map::new();
        properties.insert(self.fields.target.clone(), value);
        self.update_page(id, Value::Object(properties)).await
    }

    async fn write_score(&self, id: &ItemId, stage: Stage, score: f64) -> Result<(), SixminError> {
        let field = score_field_for(stage).ok_or_else(|| {
            SixminError::Config(format!("Stage {} has no score field", stage))
        })?;
        let mut properties = serde_json::Map::new();
        properties.insert(field.to_string(), codec::encode_score(score));
        self.update_page(id, Value::Object(properties)).await
    }
}
