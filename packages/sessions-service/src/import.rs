use std::collections::HashSet;

use crate::{Error, Result, SessionService, file::read_sessions};
use sessions_domain::{
	ElementRecord, Session,
	batch::{BatchLimits, BulkBatcher},
	flatten, import_check,
};
use sessions_storage::query::BulkOperation;

/// One uploaded file: a JSON array of sessions in tree form.
#[derive(Debug, Clone)]
pub struct ImportFile {
	pub name: String,
	pub content: Vec<u8>,
}

impl SessionService {
	/// Writes the sessions of every file as imported sessions with no chain. All files are parsed
	/// and checked for duplicate session ids before anything is written. Returns the imported
	/// sessions without their element trees.
	pub async fn import_sessions(&self, files: Vec<ImportFile>) -> Result<Vec<Session>> {
		let mut parsed = Vec::with_capacity(files.len());
		let mut earlier_files = HashSet::new();

		for file in files {
			let sessions = read_sessions(&file.content).map_err(|err| {
				tracing::error!(file = %file.name, error = %err, "Failed to read import file.");

				Error::ImportFailure {
					message: format!("Error while reading file {}: {err}", file.name),
				}
			})?;

			self.check_duplicates(&file.name, &sessions, &earlier_files).await?;

			tracing::debug!(file = %file.name, sessions = sessions.len(), "Parsed import file.");

			earlier_files.extend(sessions.iter().map(|session| session.id.clone()));
			parsed.push(sessions);
		}

		let mut imported = Vec::new();

		for mut sessions in parsed {
			for session in &mut sessions {
				session.chain_id = None;
				session.imported_session = true;
			}

			self.write_records(&flatten::sessions_to_records(&sessions)).await?;

			imported.extend(
				sessions.into_iter().map(|session| Session { session_elements: None, ..session }),
			);
		}

		Ok(imported)
	}

	async fn check_duplicates(
		&self,
		file_name: &str,
		sessions: &[Session],
		earlier_files: &HashSet<String>,
	) -> Result<()> {
		let mut stored = HashSet::new();

		for session in sessions {
			if !stored.contains(&session.id) && self.session_exists(&session.id).await? {
				stored.insert(session.id.clone());
			}
		}

		let conflicts = import_check::conflicting_session_ids(sessions, earlier_files, &stored);

		if conflicts.is_empty() {
			return Ok(());
		}

		let session_ids: Vec<String> = conflicts.into_iter().collect();
		let message = format!(
			"File {file_name} can't be imported because of sessions duplicates: [{}]",
			session_ids.join(", ")
		);

		tracing::error!(file = file_name, ?session_ids, "Import rejected due to duplicate sessions.");

		Err(Error::ImportConflict { message, session_ids })
	}

	/// Issues bulk writes for one file's records, strictly in order.
	async fn write_records(&self, records: &[ElementRecord]) -> Result<()> {
		let bulk = self.cfg.sessions.bulk_request;
		let limits = BatchLimits {
			max_batch_bytes: bulk.max_size_bytes(),
			payload_threshold_bytes: bulk.payload_size_threshold_bytes(),
			elements_count_threshold: bulk.elements_count_threshold as usize,
		};
		let mut batcher = BulkBatcher::new(limits, records.len());

		for record in records {
			let document = serde_json::to_vec(record).map_err(|err| Error::ImportFailure {
				message: format!(
					"Failed to serialize element {} in chain {}: {err}",
					record.element_name.as_deref().unwrap_or(&record.id),
					record.chain_name.as_deref().unwrap_or("<unknown>"),
				),
			})?;
			let size = document.len();
			let operation =
				BulkOperation { index: self.index().to_string(), id: record.id.clone(), document };

			for flush in batcher.push(operation, size) {
				self.execute_bulk(flush.into_items()).await?;
			}
		}

		if let Some(flush) = batcher.finish() {
			self.execute_bulk(flush.into_items()).await?;
		}

		Ok(())
	}

	async fn execute_bulk(&self, operations: Vec<BulkOperation>) -> Result<()> {
		let response = self.store.bulk(&operations).await.map_err(|err| {
			tracing::error!(error = %err, "Bulk write failed.");

			Error::ImportFailure {
				message: format!("Import was failed while saving to the search store: {err}"),
			}
		})?;
		let reasons: Vec<&str> = response
			.failed_items()
			.filter_map(|item| item.error.as_ref().map(|error| error.reason.as_str()))
			.collect();

		if reasons.is_empty() {
			return Ok(());
		}

		tracing::error!(failed = reasons.len(), "Bulk write reported failed elements.");

		Err(Error::ImportFailure {
			message: format!(
				"Some sessions elements can't be saved to opensearch:\n{}",
				reasons.join("\n")
			),
		})
	}
}
