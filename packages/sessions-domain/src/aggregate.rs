use crate::{
	element::{ElementRecord, Session},
	flatten,
};

/// Session-level view taken from one element's denormalized copy.
pub fn to_preview(record: &ElementRecord) -> Session {
	Session {
		id: record.session_id.clone(),
		imported_session: record.imported_session,
		external_session_cip_id: record.external_session_id.clone(),
		chain_id: record.chain_id.clone(),
		chain_name: record.chain_name.clone(),
		domain: record.domain.clone(),
		engine_address: record.engine_address.clone(),
		logging_level: record.logging_level.clone(),
		snapshot_name: record.snapshot_name.clone(),
		correlation_id: record.correlation_id.clone(),
		parent_session_id: record.parent_session_id.clone(),
		started: record.session_started.clone(),
		finished: record.session_finished.clone(),
		duration: record.session_duration,
		execution_status: record.session_execution_status,
		session_elements: None,
	}
}

pub fn to_previews(records: &[ElementRecord]) -> Vec<Session> {
	records.iter().map(to_preview).collect()
}

/// Materializes a session from all of its records. The first record supplies the session-level
/// fields. Returns `None` when there are no records.
pub fn to_session(records: Vec<ElementRecord>, include_elements: bool) -> Option<Session> {
	let mut session = to_preview(records.first()?);

	if include_elements {
		session.session_elements = Some(flatten::records_to_forest(records).roots);
	}

	Some(session)
}
