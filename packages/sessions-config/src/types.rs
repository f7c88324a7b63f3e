use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub sessions: Sessions,
	pub catalog: Catalog,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Request body bound for session import uploads.
	#[serde(default = "default_max_import_bytes")]
	pub max_import_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub opensearch: OpenSearch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenSearch {
	pub url: String,
	pub username: Option<String>,
	pub password: Option<String>,
	/// Optional. When set, every index name is rendered as "<prefix>_<index>".
	pub index_prefix: Option<String>,
	pub elements_index: String,
	pub timeout_ms: u64,
	/// Upper bound on a single response body; larger responses are rejected.
	#[serde(default = "default_response_buffer_limit_bytes")]
	pub response_buffer_limit_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sessions {
	pub bulk_request: BulkRequest,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BulkRequest {
	pub max_size_kb: u32,
	pub payload_size_threshold_kb: u32,
	pub elements_count_threshold: u32,
}
impl BulkRequest {
	pub fn max_size_bytes(&self) -> usize {
		self.max_size_kb as usize * 1_024
	}

	pub fn payload_size_threshold_bytes(&self) -> usize {
		self.payload_size_threshold_kb as usize * 1_024
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
	pub url: String,
	pub timeout_ms: u64,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_import_bytes() -> usize {
	100 * 1_024 * 1_024
}

fn default_response_buffer_limit_bytes() -> u64 {
	100 * 1_024 * 1_024
}
