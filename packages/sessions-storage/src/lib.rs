pub mod opensearch;
pub mod query;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use crate::{
	opensearch::OpenSearchStore,
	query::{BulkOperation, BulkResponse, DeleteByQueryRequest, SearchRequest, SearchResponse},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Document store holding element records. One instance is shared by every request.
pub trait ElementStore
where
	Self: Send + Sync,
{
	fn elements_index(&self) -> &str;

	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>>;

	fn bulk<'a>(&'a self, operations: &'a [BulkOperation]) -> BoxFuture<'a, Result<BulkResponse>>;

	fn delete_by_query<'a>(
		&'a self,
		request: &'a DeleteByQueryRequest,
	) -> BoxFuture<'a, Result<u64>>;
}

impl ElementStore for OpenSearchStore {
	fn elements_index(&self) -> &str {
		OpenSearchStore::elements_index(self)
	}

	fn search<'a>(&'a self, request: &'a SearchRequest) -> BoxFuture<'a, Result<SearchResponse>> {
		Box::pin(OpenSearchStore::search(self, request))
	}

	fn bulk<'a>(&'a self, operations: &'a [BulkOperation]) -> BoxFuture<'a, Result<BulkResponse>> {
		Box::pin(OpenSearchStore::bulk(self, operations))
	}

	fn delete_by_query<'a>(
		&'a self,
		request: &'a DeleteByQueryRequest,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(OpenSearchStore::delete_by_query(self, request))
	}
}
