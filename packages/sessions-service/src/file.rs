//! The export file format: a JSON array of session trees.
//!
//! Element trees nest one JSON level per tree level, so both directions run with the parser's
//! recursion limit off and on a stack that grows on the heap.

use serde::{Deserialize, Serialize};

use sessions_domain::Session;

pub(crate) fn read_sessions(content: &[u8]) -> serde_json::Result<Vec<Session>> {
	let mut de = serde_json::Deserializer::from_slice(content);

	de.disable_recursion_limit();

	let sessions = Vec::<Session>::deserialize(serde_stacker::Deserializer::new(&mut de))?;

	de.end()?;

	Ok(sessions)
}

/// Pretty-printed, two-space indented.
pub(crate) fn write_sessions(sessions: &[Session]) -> serde_json::Result<Vec<u8>> {
	let mut content = Vec::new();
	let mut ser = serde_json::Serializer::pretty(&mut content);

	sessions.serialize(serde_stacker::Serializer::new(&mut ser))?;

	Ok(content)
}
