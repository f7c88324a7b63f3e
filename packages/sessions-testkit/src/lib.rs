pub mod fixtures;

mod error;
mod matcher;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, HashSet},
	future,
	sync::Mutex,
};

use serde_json::Value;

use sessions_domain::ElementRecord;
use sessions_storage::{
	BoxFuture, ElementStore,
	query::{
		BulkItem, BulkItemError, BulkOperation, BulkResponse, DeleteByQueryRequest, Hit,
		SearchRequest, SearchResponse,
	},
};

/// In-process element store. Evaluates the typed query subset the service issues, records every
/// bulk call and can be told to reject individual documents or every request.
pub struct MemoryStore {
	index: String,
	state: Mutex<State>,
}
impl MemoryStore {
	pub fn new(index: impl Into<String>) -> Self {
		Self { index: index.into(), state: Mutex::new(State::default()) }
	}

	pub fn with_records(index: impl Into<String>, records: &[ElementRecord]) -> Result<Self> {
		let store = Self::new(index);

		store.insert_records(records)?;

		Ok(store)
	}

	/// Stores records directly, bypassing bulk call accounting. Same id replaces.
	pub fn insert_records(&self, records: &[ElementRecord]) -> Result<()> {
		let mut state = self.lock();

		for record in records {
			state.upsert(record.id.clone(), serde_json::to_value(record)?);
		}

		Ok(())
	}

	/// Bulk writes of `id` report a per-item error from now on.
	pub fn fail_bulk_item(&self, id: impl Into<String>) {
		self.lock().failing_ids.insert(id.into());
	}

	/// Every request fails with a 503 status while set.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.lock().unavailable = unavailable;
	}

	/// Serialized document sizes of each bulk call, in call order.
	pub fn bulk_calls(&self) -> Vec<Vec<usize>> {
		self.lock().bulk_calls.clone()
	}

	pub fn search_count(&self) -> usize {
		self.lock().searches
	}

	pub fn records(&self) -> Result<Vec<ElementRecord>> {
		let state = self.lock();
		let mut records = Vec::with_capacity(state.documents.len());

		for (_, document) in &state.documents {
			records.push(serde_json::from_value(document.clone())?);
		}

		Ok(records)
	}

	pub fn len(&self) -> usize {
		self.lock().documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn check_index(&self, index: &str) -> sessions_storage::Result<()> {
		if index == self.index {
			return Ok(());
		}

		Err(sessions_storage::Error::Status {
			status: 404,
			body: format!("no such index [{index}]"),
		})
	}

	fn run_search(&self, request: &SearchRequest) -> sessions_storage::Result<SearchResponse> {
		self.check_index(&request.index)?;

		let mut state = self.lock();

		state.check_available()?;
		state.searches += 1;

		let mut matched: Vec<&Value> = state
			.documents
			.iter()
			.map(|(_, document)| document)
			.filter(|document| matcher::matches(&request.query, document))
			.collect();

		matcher::sort(&mut matched, &request.sort);

		let from = usize::try_from(request.from).unwrap_or(usize::MAX);
		let size = request.size as usize;
		let hits = match &request.collapse {
			None => matched
				.into_iter()
				.skip(from)
				.take(size)
				.map(|document| hit(document, &request.source_excludes))
				.collect(),
			Some(collapse) => {
				let mut order = Vec::new();
				let mut groups: HashMap<String, Vec<&Value>> = HashMap::new();

				for document in matched {
					let key = document.get(&collapse.field).map(Value::to_string).unwrap_or_default();

					if !groups.contains_key(&key) {
						order.push(key.clone());
					}

					groups.entry(key).or_default().push(document);
				}

				order
					.into_iter()
					.skip(from)
					.take(size)
					.filter_map(|key| groups.remove(&key))
					.map(|mut members| {
						let mut top = hit(members[0], &request.source_excludes);

						if let Some(inner) = &collapse.inner_hits {
							matcher::sort(&mut members, &inner.sort);

							let inner_hits = members
								.into_iter()
								.take(inner.size as usize)
								.map(|document| hit(document, &inner.source_excludes))
								.collect();

							top.inner_hits.insert(inner.name.clone(), inner_hits);
						}

						top
					})
					.collect()
			},
		};

		Ok(SearchResponse { hits })
	}

	fn run_bulk(&self, operations: &[BulkOperation]) -> sessions_storage::Result<BulkResponse> {
		let mut state = self.lock();

		state.check_available()?;
		state.bulk_calls.push(operations.iter().map(|operation| operation.document.len()).collect());

		let mut items = Vec::with_capacity(operations.len());

		for operation in operations {
			if operation.index != self.index || state.failing_ids.contains(&operation.id) {
				items.push(BulkItem {
					id: operation.id.clone(),
					status: 400,
					error: Some(BulkItemError {
						kind: "mapper_parsing_exception".to_string(),
						reason: format!("failed to parse document [{}]", operation.id),
					}),
				});

				continue;
			}

			let document: Value = serde_json::from_slice(&operation.document)?;

			state.upsert(operation.id.clone(), document);
			items.push(BulkItem { id: operation.id.clone(), status: 201, error: None });
		}

		Ok(BulkResponse { items })
	}

	fn run_delete(&self, request: &DeleteByQueryRequest) -> sessions_storage::Result<u64> {
		self.check_index(&request.index)?;

		let mut state = self.lock();

		state.check_available()?;

		let before = state.documents.len();

		state.documents.retain(|(_, document)| !matcher::matches(&request.query, document));

		Ok((before - state.documents.len()) as u64)
	}
}
impl ElementStore for MemoryStore {
	fn elements_index(&self) -> &str {
		&self.index
	}

	fn search<'a>(
		&'a self,
		request: &'a SearchRequest,
	) -> BoxFuture<'a, sessions_storage::Result<SearchResponse>> {
		Box::pin(future::ready(self.run_search(request)))
	}

	fn bulk<'a>(
		&'a self,
		operations: &'a [BulkOperation],
	) -> BoxFuture<'a, sessions_storage::Result<BulkResponse>> {
		Box::pin(future::ready(self.run_bulk(operations)))
	}

	fn delete_by_query<'a>(
		&'a self,
		request: &'a DeleteByQueryRequest,
	) -> BoxFuture<'a, sessions_storage::Result<u64>> {
		Box::pin(future::ready(self.run_delete(request)))
	}
}

#[derive(Default)]
struct State {
	documents: Vec<(String, Value)>,
	bulk_calls: Vec<Vec<usize>>,
	failing_ids: HashSet<String>,
	unavailable: bool,
	searches: usize,
}
impl State {
	fn upsert(&mut self, id: String, document: Value) {
		match self.documents.iter_mut().find(|(existing, _)| *existing == id) {
			Some((_, slot)) => *slot = document,
			None => self.documents.push((id, document)),
		}
	}

	fn check_available(&self) -> sessions_storage::Result<()> {
		if self.unavailable {
			return Err(sessions_storage::Error::Status {
				status: 503,
				body: "store unavailable".to_string(),
			});
		}

		Ok(())
	}
}

fn hit(document: &Value, excludes: &[String]) -> Hit {
	let mut source = document.clone();

	if let Some(object) = source.as_object_mut() {
		for field in excludes {
			object.remove(field);
		}
	}

	Hit {
		id: document.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
		source: Some(source),
		inner_hits: HashMap::new(),
	}
}
