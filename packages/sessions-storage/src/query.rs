//! Typed subset of the search-engine query language, rendered to its JSON wire form.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
	MatchAll,
	Term { field: String, value: Value },
	Terms { field: String, values: Vec<Value> },
	/// `*` matches any run of characters, `?` one character.
	Wildcard { field: String, value: String },
	MatchPhrasePrefix { field: String, query: String },
	MultiMatchPhrasePrefix { fields: Vec<String>, query: String },
	/// Inclusive bounds.
	Range { field: String, gte: Option<Value>, lte: Option<Value> },
	Bool(BoolQuery),
}
impl Query {
	pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::Term { field: field.into(), value: value.into() }
	}

	pub fn to_json(&self) -> Value {
		match self {
			Self::MatchAll => serde_json::json!({ "match_all": {} }),
			Self::Term { field, value } => single("term", field, serde_json::json!({ "value": value })),
			Self::Terms { field, values } => single("terms", field, Value::from(values.clone())),
			Self::Wildcard { field, value } =>
				single("wildcard", field, serde_json::json!({ "value": value })),
			Self::MatchPhrasePrefix { field, query } =>
				single("match_phrase_prefix", field, serde_json::json!({ "query": query })),
			Self::MultiMatchPhrasePrefix { fields, query } => serde_json::json!({
				"multi_match": { "query": query, "type": "phrase_prefix", "fields": fields }
			}),
			Self::Range { field, gte, lte } => {
				let mut bounds = Map::new();

				if let Some(gte) = gte {
					bounds.insert("gte".to_string(), gte.clone());
				}
				if let Some(lte) = lte {
					bounds.insert("lte".to_string(), lte.clone());
				}

				single("range", field, Value::Object(bounds))
			},
			Self::Bool(query) => query.to_json(),
		}
	}
}

/// An empty `should` list is ignored; a non-empty one requires at least one match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
	pub must: Vec<Query>,
	pub must_not: Vec<Query>,
	pub should: Vec<Query>,
}
impl BoolQuery {
	fn to_json(&self) -> Value {
		let mut clauses = Map::new();

		for (name, queries) in
			[("must", &self.must), ("must_not", &self.must_not), ("should", &self.should)]
		{
			if !queries.is_empty() {
				clauses.insert(name.to_string(), queries.iter().map(Query::to_json).collect());
			}
		}

		serde_json::json!({ "bool": clauses })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
	Asc,
	Desc,
}
impl SortOrder {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
	pub field: String,
	pub order: SortOrder,
}
impl SortField {
	pub fn asc(field: impl Into<String>) -> Self {
		Self { field: field.into(), order: SortOrder::Asc }
	}

	pub fn desc(field: impl Into<String>) -> Self {
		Self { field: field.into(), order: SortOrder::Desc }
	}

	fn to_json(&self) -> Value {
		single(&self.field, "order", Value::from(self.order.as_str()))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerHits {
	pub name: String,
	pub sort: Vec<SortField>,
	pub size: u32,
	pub source_excludes: Vec<String>,
}

/// Returns one top hit per distinct value of `field`.
#[derive(Debug, Clone, PartialEq)]
pub struct Collapse {
	pub field: String,
	pub inner_hits: Option<InnerHits>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
	pub index: String,
	pub query: Query,
	pub sort: Vec<SortField>,
	pub from: u64,
	pub size: u32,
	pub collapse: Option<Collapse>,
	pub source_excludes: Vec<String>,
}
impl SearchRequest {
	pub fn to_body(&self) -> Value {
		let mut body = Map::new();

		body.insert("query".to_string(), self.query.to_json());
		body.insert("from".to_string(), Value::from(self.from));
		body.insert("size".to_string(), Value::from(self.size));

		if !self.sort.is_empty() {
			body.insert("sort".to_string(), self.sort.iter().map(SortField::to_json).collect());
		}
		if !self.source_excludes.is_empty() {
			body.insert("_source".to_string(), source_filter(&self.source_excludes));
		}
		if let Some(collapse) = &self.collapse {
			let mut rendered = Map::new();

			rendered.insert("field".to_string(), Value::from(collapse.field.as_str()));

			if let Some(inner) = &collapse.inner_hits {
				let mut hits = Map::new();

				hits.insert("name".to_string(), Value::from(inner.name.as_str()));
				hits.insert("size".to_string(), Value::from(inner.size));
				hits.insert("sort".to_string(), inner.sort.iter().map(SortField::to_json).collect());

				if !inner.source_excludes.is_empty() {
					hits.insert("_source".to_string(), source_filter(&inner.source_excludes));
				}

				rendered.insert("inner_hits".to_string(), Value::Object(hits));
			}

			body.insert("collapse".to_string(), Value::Object(rendered));
		}

		Value::Object(body)
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
	pub hits: Vec<Hit>,
}
impl SearchResponse {
	pub fn from_slice(raw: &[u8]) -> Result<Self> {
		let parsed: RawSearchResponse = serde_json::from_slice(raw)?;

		Ok(Self { hits: parsed.hits.hits.into_iter().map(Hit::from_raw).collect() })
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hit {
	pub id: String,
	pub source: Option<Value>,
	pub inner_hits: HashMap<String, Vec<Hit>>,
}
impl Hit {
	fn from_raw(raw: RawHit) -> Self {
		Self {
			id: raw.id,
			source: raw.source,
			inner_hits: raw
				.inner_hits
				.into_iter()
				.map(|(name, inner)| (name, inner.hits.hits.into_iter().map(Hit::from_raw).collect()))
				.collect(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteByQueryRequest {
	pub index: String,
	pub query: Query,
	pub refresh: bool,
}

/// Index (create or replace) one pre-serialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOperation {
	pub index: String,
	pub id: String,
	pub document: Vec<u8>,
}

/// Renders operations as the newline-delimited bulk body.
pub fn bulk_body(operations: &[BulkOperation]) -> Result<Vec<u8>> {
	let mut body = Vec::new();

	for operation in operations {
		let action = serde_json::json!({
			"index": { "_index": operation.index, "_id": operation.id, "require_alias": true }
		});

		serde_json::to_writer(&mut body, &action)?;
		body.push(b'\n');
		body.extend_from_slice(&operation.document);
		body.push(b'\n');
	}

	Ok(body)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
	pub items: Vec<BulkItem>,
}
impl BulkResponse {
	pub fn from_slice(raw: &[u8]) -> Result<Self> {
		let parsed: RawBulkResponse = serde_json::from_slice(raw)?;
		let mut items = Vec::with_capacity(parsed.items.len());

		for entry in parsed.items {
			let Some((_, item)) = entry.into_iter().next() else {
				return Err(Error::InvalidResponse {
					message: "Bulk response item has no operation result.".to_string(),
				});
			};

			items.push(BulkItem {
				id: item.id,
				status: item.status,
				error: item.error.map(|error| BulkItemError { kind: error.kind, reason: error.reason }),
			});
		}

		Ok(Self { items })
	}

	pub fn failed_items(&self) -> impl Iterator<Item = &BulkItem> {
		self.items.iter().filter(|item| item.error.is_some())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
	pub id: String,
	pub status: u16,
	pub error: Option<BulkItemError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
	pub kind: String,
	pub reason: String,
}

#[derive(Deserialize)]
struct RawSearchResponse {
	hits: RawHits,
}

#[derive(Deserialize)]
struct RawHits {
	#[serde(default)]
	hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
	#[serde(rename = "_id", default)]
	id: String,
	#[serde(rename = "_source")]
	source: Option<Value>,
	#[serde(default)]
	inner_hits: HashMap<String, RawInnerHits>,
}

#[derive(Deserialize)]
struct RawInnerHits {
	hits: RawHits,
}

#[derive(Deserialize)]
struct RawBulkResponse {
	#[serde(default)]
	items: Vec<HashMap<String, RawBulkItem>>,
}

#[derive(Deserialize)]
struct RawBulkItem {
	#[serde(rename = "_id", default)]
	id: String,
	#[serde(default)]
	status: u16,
	error: Option<RawBulkItemError>,
}

#[derive(Deserialize)]
struct RawBulkItemError {
	#[serde(rename = "type", default)]
	kind: String,
	#[serde(default)]
	reason: String,
}

fn single(outer: &str, key: &str, value: Value) -> Value {
	let mut inner = Map::new();

	inner.insert(key.to_string(), value);

	let mut wrapper = Map::new();

	wrapper.insert(outer.to_string(), Value::Object(inner));

	Value::Object(wrapper)
}

fn source_filter(excludes: &[String]) -> Value {
	serde_json::json!({ "excludes": excludes })
}
