#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Store responded with status {status}: {body}")]
	Status { status: u16, body: String },
	#[error("Store response of {size} bytes exceeds the {limit} byte buffer limit.")]
	ResponseTooLarge { size: u64, limit: u64 },
	#[error("Invalid store response: {message}")]
	InvalidResponse { message: String },
}
