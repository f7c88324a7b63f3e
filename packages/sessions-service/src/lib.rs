pub mod delete;
pub mod export;
pub mod find;
pub mod import;
pub mod query;
pub mod search;

mod error;
mod file;

pub use error::{Error, Result};
pub use export::ExportedSessions;
pub use import::ImportFile;
pub use query::{FilterCondition, FilterFeature, FilterRequest, FilterRequestAndSearch};
pub use search::SessionSearchResponse;
pub use sessions_domain::{Element, Session};
pub use sessions_storage::{BoxFuture, ElementStore};

use std::{collections::HashMap, sync::Arc};

use sessions_config::{Catalog, Config};
use sessions_providers::catalog;

/// Display-name lookup for chain ids.
pub trait CatalogProvider
where
	Self: Send + Sync,
{
	fn chain_names<'a>(
		&'a self,
		cfg: &'a Catalog,
		chain_ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<HashMap<String, String>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub catalog: Arc<dyn CatalogProvider>,
}
impl Providers {
	pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
		Self { catalog }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { catalog: Arc::new(DefaultProviders) }
	}
}

pub struct SessionService {
	pub cfg: Config,
	pub store: Arc<dyn ElementStore>,
	pub providers: Providers,
}
impl SessionService {
	pub fn new(cfg: Config, store: Arc<dyn ElementStore>) -> Self {
		Self { cfg, store, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn ElementStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}

	pub(crate) fn index(&self) -> &str {
		self.store.elements_index()
	}
}

struct DefaultProviders;
impl CatalogProvider for DefaultProviders {
	fn chain_names<'a>(
		&'a self,
		cfg: &'a Catalog,
		chain_ids: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<HashMap<String, String>>> {
		Box::pin(catalog::chain_names(cfg, chain_ids))
	}
}
