use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{FilterRequestAndSearch, Result, SessionService, query};
use sessions_domain::{Session, aggregate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSearchResponse {
	/// Offset of the next page: the requested offset plus the rows returned.
	pub offset: i64,
	pub sessions: Vec<Session>,
}
impl SessionSearchResponse {
	fn empty() -> Self {
		Self { offset: 0, sessions: Vec::new() }
	}
}

impl SessionService {
	/// Preview rows, one per session, without element trees. A negative offset or a limit below
	/// one yields an empty page; a limit beyond the store's page type is clamped.
	pub async fn search(
		&self,
		chain_id: Option<&str>,
		offset: i64,
		limit: i64,
		sort_column: &str,
		filter: &FilterRequestAndSearch,
	) -> Result<SessionSearchResponse> {
		let Ok(from) = u64::try_from(offset) else {
			return Ok(SessionSearchResponse::empty());
		};

		if limit < 1 {
			return Ok(SessionSearchResponse::empty());
		}

		let size = u32::try_from(limit).unwrap_or(u32::MAX);

		query::validate_sort_column(sort_column)?;

		let request = query::preview_search(self.index(), chain_id, from, size, sort_column, filter)?;
		let response = self.store.search(&request).await.map_err(crate::Error::search)?;
		let records = query::inner_hit_records(response)?;
		let mut seen = HashSet::new();
		let sessions: Vec<Session> = aggregate::to_previews(&records)
			.into_iter()
			.filter(|session| seen.insert(session.id.clone()))
			.collect();

		Ok(SessionSearchResponse { offset: offset + sessions.len() as i64, sessions })
	}

	/// Like [`SessionService::search`] across every chain, with chain names refreshed from the
	/// catalog. Catalog failures keep the stored names.
	pub async fn search_all(
		&self,
		offset: i64,
		limit: i64,
		sort_column: &str,
		filter: &FilterRequestAndSearch,
	) -> Result<SessionSearchResponse> {
		let mut response = self.search(None, offset, limit, sort_column, filter).await?;

		self.refresh_chain_names(&mut response.sessions).await;

		Ok(response)
	}

	async fn refresh_chain_names(&self, sessions: &mut [Session]) {
		let chain_ids: Vec<String> = sessions
			.iter()
			.filter_map(|session| session.chain_id.clone())
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect();

		if chain_ids.is_empty() {
			return;
		}

		match self.providers.catalog.chain_names(&self.cfg.catalog, &chain_ids).await {
			Ok(names) =>
				for session in sessions.iter_mut() {
					if let Some(name) = session.chain_id.as_ref().and_then(|id| names.get(id)) {
						session.chain_name = Some(name.clone());
					}
				},
			Err(err) => {
				tracing::warn!(error = %err, "Failed to receive actual chain names for sessions.");
			},
		}
	}
}
