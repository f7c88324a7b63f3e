//! Conversion between the stored flat records and in-memory elements.

use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
	element::{Element, ElementRecord, Session},
	tree::{self, Forest},
};

/// Flattens every session tree into store records, parents before their children.
pub fn sessions_to_records(sessions: &[Session]) -> Vec<ElementRecord> {
	sessions.iter().flat_map(session_to_records).collect()
}

pub fn session_to_records(session: &Session) -> Vec<ElementRecord> {
	let Some(roots) = session.session_elements.as_deref() else {
		return Vec::new();
	};
	let mut records = Vec::new();
	let mut stack: Vec<&Element> = roots.iter().rev().collect();

	while let Some(element) = stack.pop() {
		records.push(element_to_record(element, session));
		stack.extend(element.children.iter().rev());
	}

	records
}

/// Builds the stored form of one element, stamping the session-level fields onto it.
pub fn element_to_record(element: &Element, session: &Session) -> ElementRecord {
	ElementRecord {
		id: element.element_id.clone(),
		session_id: session.id.clone(),
		external_session_id: session.external_session_cip_id.clone(),
		session_started: session.started.clone(),
		session_finished: session.finished.clone(),
		session_duration: session.duration,
		session_execution_status: session.execution_status,
		imported_session: session.imported_session,
		chain_id: session.chain_id.clone(),
		chain_name: session.chain_name.clone(),
		domain: session.domain.clone(),
		engine_address: session.engine_address.clone(),
		logging_level: session.logging_level.clone(),
		snapshot_name: session.snapshot_name.clone(),
		correlation_id: session.correlation_id.clone(),
		parent_session_id: session.parent_session_id.clone(),
		chain_element_id: None,
		actual_element_chain_id: element.actual_element_chain_id.clone(),
		element_name: element.element_name.clone(),
		camel_element_name: element.camel_name.clone(),
		prev_element_id: element.previous_element.clone(),
		parent_element_id: element.parent_element.clone(),
		started: element.started.clone(),
		finished: element.finished.clone(),
		duration: element.duration,
		execution_status: element.execution_status,
		body_before: element.body_before.clone(),
		body_after: element.body_after.clone(),
		headers_before: element.headers_before.as_ref().and_then(to_json_text),
		headers_after: element.headers_after.as_ref().and_then(to_json_text),
		properties_before: to_json_text(&element.properties_before),
		properties_after: to_json_text(&element.properties_after),
		context_before: element.context_before.as_ref().and_then(to_json_text),
		context_after: element.context_after.as_ref().and_then(to_json_text),
		exception_info: element.exception_info.clone(),
	}
}

/// Builds a childless element from its stored form. Malformed snapshot text is logged and
/// dropped rather than failing the read.
pub fn record_to_element(record: ElementRecord) -> Element {
	Element {
		element_id: record.id,
		session_id: Some(record.session_id),
		chain_element_id: record.chain_element_id,
		actual_element_chain_id: record.actual_element_chain_id,
		parent_element: record.parent_element_id,
		previous_element: record.prev_element_id,
		element_name: record.element_name,
		camel_name: record.camel_element_name,
		started: record.started,
		finished: record.finished,
		duration: record.duration,
		execution_status: record.execution_status,
		body_before: record.body_before,
		body_after: record.body_after,
		headers_before: string_map_from_json(record.headers_before.as_deref()),
		headers_after: string_map_from_json(record.headers_after.as_deref()),
		properties_before: properties_from_json(record.properties_before.as_deref()),
		properties_after: properties_from_json(record.properties_after.as_deref()),
		context_before: string_map_from_json(record.context_before.as_deref()),
		context_after: string_map_from_json(record.context_after.as_deref()),
		exception_info: record.exception_info,
		children: Vec::new(),
	}
}

/// Converts the records of one session and links them into a forest.
pub fn records_to_forest(records: Vec<ElementRecord>) -> Forest {
	tree::rebuild(records.into_iter().map(record_to_element).collect())
}

fn to_json_text<T>(value: &T) -> Option<String>
where
	T: Serialize + ?Sized,
{
	match serde_json::to_string(value) {
		Ok(text) => Some(text),
		Err(err) => {
			tracing::error!(error = %err, "Failed to serialize element snapshot.");

			None
		},
	}
}

fn string_map_from_json(raw: Option<&str>) -> Option<BTreeMap<String, String>> {
	let raw = raw.filter(|text| !text.trim().is_empty())?;

	parse_snapshot::<Option<BTreeMap<String, String>>>(raw).flatten()
}

fn properties_from_json(raw: Option<&str>) -> BTreeMap<String, Value> {
	raw.filter(|text| !text.trim().is_empty())
		.and_then(parse_snapshot::<Option<BTreeMap<String, Value>>>)
		.flatten()
		.unwrap_or_default()
}

fn parse_snapshot<T>(raw: &str) -> Option<T>
where
	T: DeserializeOwned,
{
	match serde_json::from_str(raw) {
		Ok(value) => Some(value),
		Err(err) => {
			tracing::error!(error = %err, snapshot = raw, "Failed to deserialize element snapshot.");

			None
		},
	}
}
