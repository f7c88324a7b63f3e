use std::{collections::HashMap, time::Duration};

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

const CHAIN_NAMES_PATH: &str = "/v1/chains/names";

/// Resolves display names for the given chain ids. Ids unknown to the catalog are absent from
/// the result.
pub async fn chain_names(
	cfg: &sessions_config::Catalog,
	chain_ids: &[String],
) -> Result<HashMap<String, String>> {
	if chain_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{CHAIN_NAMES_PATH}", cfg.url.trim_end_matches('/'));
	let res = client.get(url).query(&[("chainIds", chain_ids.join(","))]).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chain_names(json)
}

fn parse_chain_names(json: Value) -> Result<HashMap<String, String>> {
	let entries =
		json.as_object().ok_or_else(|| eyre::eyre!("Chain names response must be an object."))?;
	let mut names = HashMap::with_capacity(entries.len());

	for (chain_id, name) in entries {
		match name {
			Value::String(name) => {
				names.insert(chain_id.clone(), name.clone());
			},
			Value::Null => {},
			_ => return Err(eyre::eyre!("Chain name for {chain_id} must be a string.")),
		}
	}

	Ok(names)
}
