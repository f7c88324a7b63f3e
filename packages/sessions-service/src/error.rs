pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("{message}")]
	ImportConflict { message: String, session_ids: Vec<String> },
	#[error("Import failed: {message}")]
	ImportFailure { message: String },
	#[error("Search store {operation} failed: {message}")]
	SearchFailure { operation: &'static str, message: String },
	#[error("Export failed: {message}")]
	Export { message: String },
}
impl Error {
	pub(crate) fn search(err: sessions_storage::Error) -> Self {
		Self::SearchFailure { operation: "search", message: err.to_string() }
	}

	pub(crate) fn delete(err: sessions_storage::Error) -> Self {
		Self::SearchFailure { operation: "delete", message: err.to_string() }
	}
}
