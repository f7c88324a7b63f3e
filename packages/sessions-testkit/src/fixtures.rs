//! Records, sessions and configuration for tests.

use sessions_config::{BulkRequest, Catalog, Config, OpenSearch, Service, Sessions, Storage};
use sessions_domain::{ElementRecord, ExecutionStatus, Session, aggregate};

pub const ELEMENTS_INDEX: &str = "sessions-elements";

pub fn test_config(bulk_request: BulkRequest) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			max_import_bytes: 16 * 1_024 * 1_024,
		},
		storage: Storage {
			opensearch: OpenSearch {
				url: "http://localhost:9200".to_string(),
				username: None,
				password: None,
				index_prefix: None,
				elements_index: ELEMENTS_INDEX.to_string(),
				timeout_ms: 1_000,
				response_buffer_limit_bytes: 1_024 * 1_024,
			},
		},
		sessions: Sessions { bulk_request },
		catalog: Catalog { url: "http://catalog:8080".to_string(), timeout_ms: 1_000 },
	}
}

/// Bulk limits large enough that nothing is ever split.
pub fn default_bulk_request() -> BulkRequest {
	BulkRequest { max_size_kb: 10_240, payload_size_threshold_kb: 5_120, elements_count_threshold: 50 }
}

/// A session-level template; element fields are filled in by [`element`].
pub fn session_record(session_id: &str, chain_id: &str, session_started: &str) -> ElementRecord {
	ElementRecord {
		session_id: session_id.to_string(),
		external_session_id: Some(format!("ext-{session_id}")),
		session_started: Some(session_started.to_string()),
		session_finished: Some(session_started.to_string()),
		session_duration: 10,
		session_execution_status: Some(ExecutionStatus::CompletedNormally),
		chain_id: Some(chain_id.to_string()),
		chain_name: Some(format!("chain {chain_id}")),
		engine_address: Some("10.0.0.1".to_string()),
		logging_level: Some("INFO".to_string()),
		..Default::default()
	}
}

/// One element of `template`'s session.
pub fn element(
	template: &ElementRecord,
	element_id: &str,
	parent_element_id: Option<&str>,
	started: &str,
) -> ElementRecord {
	ElementRecord {
		id: element_id.to_string(),
		element_name: Some(format!("step {element_id}")),
		parent_element_id: parent_element_id.map(str::to_string),
		started: Some(started.to_string()),
		finished: Some(started.to_string()),
		duration: 1,
		execution_status: Some(ExecutionStatus::CompletedNormally),
		body_before: Some(format!("{{\"order\":\"{element_id}\"}}")),
		body_after: Some(format!("{{\"order\":\"{element_id}\",\"status\":\"Delivered\"}}")),
		headers_before: Some("{\"content-type\":\"application/json\"}".to_string()),
		properties_before: Some("{}".to_string()),
		properties_after: Some("{}".to_string()),
		..template.clone()
	}
}

/// A root element with `children` direct children, started one second apart.
pub fn session_records(
	session_id: &str,
	chain_id: &str,
	session_started: &str,
	children: usize,
) -> Vec<ElementRecord> {
	let template = session_record(session_id, chain_id, session_started);
	let root_id = format!("{session_id}-root");
	let mut records = vec![element(&template, &root_id, None, "2024-01-01T00:00:00")];

	for index in 0..children {
		let started = format!("2024-01-01T00:00:{:02}", (index + 1) % 60);

		records.push(element(&template, &format!("{session_id}-{index}"), Some(&root_id), &started));
	}

	records
}

/// The tree form of [`session_records`], as found in an export file.
pub fn session_tree(
	session_id: &str,
	chain_id: &str,
	session_started: &str,
	children: usize,
) -> Session {
	let records = session_records(session_id, chain_id, session_started, children);

	aggregate::to_session(records, true).unwrap_or_default()
}
