use std::collections::{BTreeSet, HashMap, HashSet};

use crate::element::Session;

/// Session ids of one import file that may not be written: ids already in the store, ids
/// repeated inside the file, and ids seen in an earlier file of the same import.
pub fn conflicting_session_ids(
	sessions: &[Session],
	earlier_files: &HashSet<String>,
	stored: &HashSet<String>,
) -> BTreeSet<String> {
	let mut occurrences: HashMap<&str, usize> = HashMap::new();

	for session in sessions {
		*occurrences.entry(session.id.as_str()).or_default() += 1;
	}

	sessions
		.iter()
		.map(|session| session.id.as_str())
		.filter(|id| {
			stored.contains(*id)
				|| occurrences.get(id).copied().unwrap_or_default() > 1
				|| earlier_files.contains(*id)
		})
		.map(str::to_string)
		.collect()
}
