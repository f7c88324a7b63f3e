use crate::{Error, Result, SessionService};
use sessions_domain::element::field;
use sessions_storage::query::{DeleteByQueryRequest, Query};

impl SessionService {
	/// Removes every element of one session. The index is not refreshed.
	pub async fn delete_by_session_id(&self, session_id: &str) -> Result<u64> {
		tracing::info!(session_id, "Deleting session.");

		self.delete_matching(Query::term(field::SESSION_ID, session_id), false).await
	}

	pub async fn delete_by_chain_id(&self, chain_id: &str) -> Result<u64> {
		tracing::info!(chain_id, "Deleting chain sessions.");

		self.delete_matching(Query::term(field::CHAIN_ID, chain_id), true).await
	}

	/// One delete per chain id, in the given order. Stops at the first failure.
	pub async fn delete_by_chain_ids(&self, chain_ids: &[String]) -> Result<u64> {
		let mut deleted = 0;

		for chain_id in chain_ids {
			deleted += self.delete_by_chain_id(chain_id).await?;
		}

		Ok(deleted)
	}

	pub async fn delete_all(&self) -> Result<u64> {
		tracing::info!("Deleting all sessions.");

		self.delete_matching(Query::MatchAll, true).await
	}

	async fn delete_matching(&self, query: Query, refresh: bool) -> Result<u64> {
		let request = DeleteByQueryRequest { index: self.index().to_string(), query, refresh };

		self.store.delete_by_query(&request).await.map_err(Error::delete)
	}
}
