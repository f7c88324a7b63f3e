mod error;
mod types;

pub use error::{Error, Result};
pub use types::{BulkRequest, Catalog, Config, OpenSearch, Service, Sessions, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("storage.opensearch.url", &cfg.storage.opensearch.url),
		("storage.opensearch.elements_index", &cfg.storage.opensearch.elements_index),
		("catalog.url", &cfg.catalog.url),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.service.max_import_bytes == 0 {
		return Err(Error::Validation {
			message: "service.max_import_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.opensearch.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.opensearch.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.opensearch.response_buffer_limit_bytes == 0 {
		return Err(Error::Validation {
			message: "storage.opensearch.response_buffer_limit_bytes must be greater than zero."
				.to_string(),
		});
	}
	if cfg.catalog.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "catalog.timeout_ms must be greater than zero.".to_string(),
		});
	}

	let bulk = &cfg.sessions.bulk_request;

	if bulk.max_size_kb == 0 {
		return Err(Error::Validation {
			message: "sessions.bulk_request.max_size_kb must be greater than zero.".to_string(),
		});
	}
	if bulk.payload_size_threshold_kb == 0 {
		return Err(Error::Validation {
			message: "sessions.bulk_request.payload_size_threshold_kb must be greater than zero."
				.to_string(),
		});
	}
	if bulk.payload_size_threshold_kb > bulk.max_size_kb {
		return Err(Error::Validation {
			message: "sessions.bulk_request.payload_size_threshold_kb must not exceed sessions.bulk_request.max_size_kb."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let opensearch = &mut cfg.storage.opensearch;

	for value in
		[&mut opensearch.username, &mut opensearch.password, &mut opensearch.index_prefix]
	{
		if value.as_deref().map(|raw| raw.trim().is_empty()).unwrap_or(false) {
			*value = None;
		}
	}
}
