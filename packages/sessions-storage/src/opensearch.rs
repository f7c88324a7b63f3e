use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, header::CONTENT_TYPE};

use crate::{
	Error, Result,
	query::{
		BulkOperation, BulkResponse, DeleteByQueryRequest, SearchRequest, SearchResponse, bulk_body,
	},
};

pub struct OpenSearchStore {
	client: Client,
	base_url: String,
	username: Option<String>,
	password: Option<String>,
	elements_index: String,
	response_buffer_limit_bytes: u64,
}
impl OpenSearchStore {
	pub fn new(cfg: &sessions_config::OpenSearch) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self {
			client,
			base_url: cfg.url.trim_end_matches('/').to_string(),
			username: cfg.username.clone(),
			password: cfg.password.clone(),
			elements_index: normalize_index(cfg.index_prefix.as_deref(), &cfg.elements_index),
			response_buffer_limit_bytes: cfg.response_buffer_limit_bytes,
		})
	}

	/// Elements index name with the configured prefix applied.
	pub fn elements_index(&self) -> &str {
		&self.elements_index
	}

	pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
		let url = format!("{}/{}/_search", self.base_url, request.index);
		let res = self.authorized(self.client.post(url)).json(&request.to_body()).send().await?;
		let body = self.read_body(res).await?;

		SearchResponse::from_slice(&body)
	}

	pub async fn bulk(&self, operations: &[BulkOperation]) -> Result<BulkResponse> {
		if operations.is_empty() {
			return Ok(BulkResponse::default());
		}

		let url = format!("{}/_bulk", self.base_url);
		let res = self
			.authorized(self.client.post(url))
			.header(CONTENT_TYPE, "application/x-ndjson")
			.body(bulk_body(operations)?)
			.send()
			.await?;
		let body = self.read_body(res).await?;

		BulkResponse::from_slice(&body)
	}

	/// Returns the number of deleted documents.
	pub async fn delete_by_query(&self, request: &DeleteByQueryRequest) -> Result<u64> {
		let url = format!(
			"{}/{}/_delete_by_query?refresh={}",
			self.base_url, request.index, request.refresh
		);
		let body = serde_json::json!({ "query": request.query.to_json() });
		let res = self.authorized(self.client.post(url)).json(&body).send().await?;
		let body = self.read_body(res).await?;
		let parsed: serde_json::Value = serde_json::from_slice(&body)?;

		Ok(parsed.get("deleted").and_then(serde_json::Value::as_u64).unwrap_or(0))
	}

	fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
		match &self.username {
			Some(username) => builder.basic_auth(username, self.password.as_deref()),
			None => builder,
		}
	}

	async fn read_body(&self, res: Response) -> Result<Vec<u8>> {
		let limit = self.response_buffer_limit_bytes;

		if let Some(size) = res.content_length()
			&& size > limit
		{
			return Err(Error::ResponseTooLarge { size, limit });
		}

		let status = res.status();
		let body = res.bytes().await?;

		if body.len() as u64 > limit {
			return Err(Error::ResponseTooLarge { size: body.len() as u64, limit });
		}
		if !status.is_success() {
			tracing::warn!(status = status.as_u16(), "Search store request failed.");

			return Err(Error::Status {
				status: status.as_u16(),
				body: String::from_utf8_lossy(&body).into_owned(),
			});
		}

		Ok(body.to_vec())
	}
}

/// Joins an optional prefix and an index name with `_`.
pub fn normalize_index(prefix: Option<&str>, index: &str) -> String {
	match prefix.map(str::trim).filter(|prefix| !prefix.is_empty()) {
		Some(prefix) => format!("{prefix}_{index}"),
		None => index.to_string(),
	}
}
