use time::{OffsetDateTime, macros::format_description};

use crate::{Error, Result, SessionService, file};
use sessions_domain::{Session, element::field};

/// A ready-to-download export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSessions {
	pub file_name: String,
	pub content: String,
}

impl SessionService {
	/// Serializes the full trees of the given sessions, with payloads, into one pretty-printed JSON
	/// array. Unknown ids are skipped; no known id at all is a not-found error.
	pub async fn export_sessions(&self, session_ids: &[String]) -> Result<ExportedSessions> {
		let mut sessions = Vec::with_capacity(session_ids.len());

		for session_id in session_ids {
			match self.load_session(field::SESSION_ID, session_id, false, true).await? {
				Some(session) => sessions.push(session),
				None => tracing::debug!(%session_id, "Skipping unknown session on export."),
			}
		}

		let Some(first) = sessions.first() else {
			return Err(Error::NotFound { message: "Sessions not found".to_string() });
		};
		let file_name = export_file_name(first.chain_id.as_deref(), OffsetDateTime::now_utc())?;
		let content = to_pretty_json(&sessions)?;

		Ok(ExportedSessions { file_name, content })
	}
}

/// `chain-sessions-<chainId>-(<yyyy-MM-dd'T'HH_mm_ss>).json`.
pub fn export_file_name(chain_id: Option<&str>, at: OffsetDateTime) -> Result<String> {
	let stamp = at
		.format(format_description!("[year]-[month]-[day]T[hour]_[minute]_[second]"))
		.map_err(|err| Error::Export { message: err.to_string() })?;

	Ok(format!("chain-sessions-{}-({stamp}).json", chain_id.unwrap_or("null")))
}

fn to_pretty_json(sessions: &[Session]) -> Result<String> {
	let content =
		file::write_sessions(sessions).map_err(|err| Error::Export { message: err.to_string() })?;

	String::from_utf8(content).map_err(|err| Error::Export { message: err.to_string() })
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn file_name_carries_chain_and_timestamp() {
		let name = export_file_name(Some("c-1"), datetime!(2024-03-05 07:08:09 UTC))
			.expect("file name");

		assert_eq!(name, "chain-sessions-c-1-(2024-03-05T07_08_09).json");
	}
}
