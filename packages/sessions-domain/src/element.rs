use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store document field names, as serialized by [`ElementRecord`].
pub mod field {
	pub const ID: &str = "id";
	pub const SESSION_ID: &str = "sessionId";
	pub const EXTERNAL_SESSION_ID: &str = "externalSessionId";
	pub const SESSION_STARTED: &str = "sessionStarted";
	pub const SESSION_FINISHED: &str = "sessionFinished";
	pub const SESSION_DURATION: &str = "sessionDuration";
	pub const SESSION_EXECUTION_STATUS: &str = "sessionExecutionStatus";
	pub const CHAIN_ID: &str = "chainId";
	pub const CHAIN_NAME: &str = "chainName";
	pub const ENGINE_ADDRESS: &str = "engineAddress";
	pub const LOGGING_LEVEL: &str = "loggingLevel";
	pub const STARTED: &str = "started";
	pub const BODY_BEFORE: &str = "bodyBefore";
	pub const BODY_AFTER: &str = "bodyAfter";
	pub const HEADERS_BEFORE: &str = "headersBefore";
	pub const HEADERS_AFTER: &str = "headersAfter";
	pub const PROPERTIES_BEFORE: &str = "propertiesBefore";
	pub const PROPERTIES_AFTER: &str = "propertiesAfter";
	pub const EXCHANGE_PROPERTIES_BEFORE: &str = "exchangePropertiesBefore";
	pub const EXCHANGE_PROPERTIES_AFTER: &str = "exchangePropertiesAfter";
	pub const CONTEXT_BEFORE: &str = "contextBefore";
	pub const CONTEXT_AFTER: &str = "contextAfter";

	/// Bulky snapshot fields dropped by light reads.
	pub const PAYLOAD_FIELDS: [&str; 10] = [
		BODY_BEFORE,
		BODY_AFTER,
		HEADERS_BEFORE,
		HEADERS_AFTER,
		EXCHANGE_PROPERTIES_BEFORE,
		EXCHANGE_PROPERTIES_AFTER,
		PROPERTIES_AFTER,
		PROPERTIES_BEFORE,
		CONTEXT_BEFORE,
		CONTEXT_AFTER,
	];

	/// Text fields matched by free-text search.
	pub const SEARCHABLE_PAYLOAD_FIELDS: [&str; 8] = [
		BODY_AFTER,
		BODY_BEFORE,
		HEADERS_AFTER,
		HEADERS_BEFORE,
		EXCHANGE_PROPERTIES_AFTER,
		EXCHANGE_PROPERTIES_BEFORE,
		CONTEXT_AFTER,
		CONTEXT_BEFORE,
	];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
	InProgress,
	CompletedNormally,
	CompletedWithWarnings,
	CompletedWithErrors,
	#[serde(other)]
	CancelledOrUnknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionInfo {
	pub message: Option<String>,
	pub stack_trace: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// One stored step document. Session-level fields are copied onto every element of a session;
/// snapshots are kept as opaque JSON text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub session_id: String,
	pub external_session_id: Option<String>,
	pub session_started: Option<String>,
	pub session_finished: Option<String>,
	#[serde(default)]
	pub session_duration: i64,
	pub session_execution_status: Option<ExecutionStatus>,
	#[serde(default)]
	pub imported_session: bool,
	pub chain_id: Option<String>,
	pub chain_name: Option<String>,
	pub domain: Option<String>,
	pub engine_address: Option<String>,
	pub logging_level: Option<String>,
	pub snapshot_name: Option<String>,
	pub correlation_id: Option<String>,
	pub parent_session_id: Option<String>,
	pub chain_element_id: Option<String>,
	pub actual_element_chain_id: Option<String>,
	pub element_name: Option<String>,
	pub camel_element_name: Option<String>,
	pub prev_element_id: Option<String>,
	pub parent_element_id: Option<String>,
	pub started: Option<String>,
	pub finished: Option<String>,
	#[serde(default)]
	pub duration: i64,
	pub execution_status: Option<ExecutionStatus>,
	pub body_before: Option<String>,
	pub body_after: Option<String>,
	pub headers_before: Option<String>,
	pub headers_after: Option<String>,
	pub properties_before: Option<String>,
	pub properties_after: Option<String>,
	pub context_before: Option<String>,
	pub context_after: Option<String>,
	pub exception_info: Option<ExceptionInfo>,
}

/// A node of a reconstructed session tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
	#[serde(default)]
	pub element_id: String,
	pub session_id: Option<String>,
	pub chain_element_id: Option<String>,
	pub actual_element_chain_id: Option<String>,
	pub parent_element: Option<String>,
	pub previous_element: Option<String>,
	pub element_name: Option<String>,
	pub camel_name: Option<String>,
	pub started: Option<String>,
	pub finished: Option<String>,
	#[serde(default)]
	pub duration: i64,
	pub execution_status: Option<ExecutionStatus>,
	pub body_before: Option<String>,
	pub body_after: Option<String>,
	pub headers_before: Option<BTreeMap<String, String>>,
	pub headers_after: Option<BTreeMap<String, String>>,
	#[serde(default)]
	pub properties_before: BTreeMap<String, Value>,
	#[serde(default)]
	pub properties_after: BTreeMap<String, Value>,
	pub context_before: Option<BTreeMap<String, String>>,
	pub context_after: Option<BTreeMap<String, String>>,
	pub exception_info: Option<ExceptionInfo>,
	#[serde(default)]
	pub children: Vec<Element>,
}
impl Element {
	/// Number of nodes in this subtree, including `self`.
	pub fn subtree_len(&self) -> usize {
		let mut count = 0;
		let mut stack = vec![self];

		while let Some(node) = stack.pop() {
			count += 1;

			stack.extend(node.children.iter());
		}

		count
	}
}

/// Read-side aggregation of all elements sharing a session id. Never stored as such.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	pub id: String,
	#[serde(default)]
	pub imported_session: bool,
	pub external_session_cip_id: Option<String>,
	pub chain_id: Option<String>,
	pub chain_name: Option<String>,
	pub domain: Option<String>,
	pub engine_address: Option<String>,
	pub logging_level: Option<String>,
	pub snapshot_name: Option<String>,
	pub correlation_id: Option<String>,
	pub parent_session_id: Option<String>,
	pub started: Option<String>,
	pub finished: Option<String>,
	#[serde(default)]
	pub duration: i64,
	pub execution_status: Option<ExecutionStatus>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_elements: Option<Vec<Element>>,
}
