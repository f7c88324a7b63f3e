use std::collections::{BTreeMap, HashSet};

use serde_json::json;

use sessions_domain::{
	Element, ExecutionStatus, Session, aggregate, flatten, import_check::conflicting_session_ids,
};

fn sample_session() -> Session {
	let child = Element {
		element_id: "e-2".to_string(),
		parent_element: Some("e-1".to_string()),
		previous_element: Some("e-1".to_string()),
		element_name: Some("Script".to_string()),
		started: Some("2024-05-01T10:00:01".to_string()),
		body_before: Some("{\"in\":1}".to_string()),
		headers_after: Some(BTreeMap::from([("h".to_string(), "v".to_string())])),
		properties_after: BTreeMap::from([(
			"p".to_string(),
			json!({ "type": "string", "value": "x" }),
		)]),
		execution_status: Some(ExecutionStatus::CompletedNormally),
		..Default::default()
	};
	let root = Element {
		element_id: "e-1".to_string(),
		element_name: Some("Http trigger".to_string()),
		started: Some("2024-05-01T10:00:00".to_string()),
		context_before: Some(BTreeMap::from([("k".to_string(), "v".to_string())])),
		children: vec![child],
		..Default::default()
	};

	Session {
		id: "s-1".to_string(),
		chain_id: Some("c-1".to_string()),
		chain_name: Some("Orders".to_string()),
		started: Some("2024-05-01T10:00:00".to_string()),
		duration: 1_500,
		execution_status: Some(ExecutionStatus::CompletedNormally),
		session_elements: Some(vec![root]),
		..Default::default()
	}
}

#[test]
fn flattening_copies_session_fields_onto_every_record() {
	let records = flatten::session_to_records(&sample_session());

	assert_eq!(records.len(), 2);
	assert_eq!(records[0].id, "e-1");
	assert_eq!(records[1].id, "e-2");

	for record in &records {
		assert_eq!(record.session_id, "s-1");
		assert_eq!(record.chain_id.as_deref(), Some("c-1"));
		assert_eq!(record.session_duration, 1_500);
		assert!(record.chain_element_id.is_none());
	}

	assert_eq!(records[1].parent_element_id.as_deref(), Some("e-1"));
	assert_eq!(records[1].headers_after.as_deref(), Some(r#"{"h":"v"}"#));
	assert!(records[1].headers_before.is_none());
}

#[test]
fn export_then_import_preserves_elements() {
	let mut session = sample_session();
	let exported = serde_json::to_string_pretty(&vec![session.clone()]).expect("export");
	let mut imported: Vec<Session> = serde_json::from_str(&exported).expect("import");

	for session in &mut imported {
		session.chain_id = None;
		session.imported_session = true;
	}

	let records = flatten::sessions_to_records(&imported);
	let rebuilt = aggregate::to_session(records, true).expect("session");

	session.chain_id = None;
	session.imported_session = true;

	for root in session.session_elements.iter_mut().flatten() {
		root.session_id = Some("s-1".to_string());

		for child in &mut root.children {
			child.session_id = Some("s-1".to_string());
		}
	}

	assert_eq!(rebuilt, session);
}

#[test]
fn conflicts_cover_store_file_and_batch_duplicates() {
	let session = |id: &str| Session { id: id.to_string(), ..Default::default() };
	let file = vec![session("a"), session("b"), session("b"), session("c"), session("d")];
	let earlier = HashSet::from(["c".to_string()]);
	let stored = HashSet::from(["a".to_string()]);
	let conflicts = conflicting_session_ids(&file, &earlier, &stored);

	assert_eq!(conflicts.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
	assert!(conflicting_session_ids(&file[3..], &HashSet::new(), &HashSet::new()).is_empty());
}
