use std::sync::Arc;

use sessions_service::SessionService;
use sessions_storage::opensearch::OpenSearchStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SessionService>,
}
impl AppState {
	/// Builds the single store client shared by every request.
	pub fn new(config: sessions_config::Config) -> color_eyre::Result<Self> {
		let store = OpenSearchStore::new(&config.storage.opensearch)?;

		tracing::info!(index = store.elements_index(), "Search store client ready.");

		Ok(Self::from_service(SessionService::new(config, Arc::new(store))))
	}

	pub fn from_service(service: SessionService) -> Self {
		Self { service: Arc::new(service) }
	}
}
