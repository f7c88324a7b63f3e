//! Translation of caller search criteria into store queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};
use sessions_domain::{ElementRecord, element::field};
use sessions_storage::query::{
	BoolQuery, Collapse, InnerHits, Query, SearchRequest, SearchResponse, SortField,
};

/// Session-level columns a listing may be sorted on.
pub const SORT_COLUMNS: [&str; 9] = [
	field::SESSION_ID,
	field::SESSION_STARTED,
	field::SESSION_FINISHED,
	field::SESSION_DURATION,
	field::SESSION_EXECUTION_STATUS,
	field::CHAIN_ID,
	field::CHAIN_NAME,
	field::ENGINE_ADDRESS,
	field::LOGGING_LEVEL,
];
/// Page size of windowed detail retrieval.
pub const SCROLL_WINDOW: u32 = 300;
pub const INNER_HIT_NAME: &str = "most_recent";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequestAndSearch {
	#[serde(default)]
	pub search_string: Option<String>,
	#[serde(default)]
	pub filter_request_list: Vec<FilterRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
	pub feature: FilterFeature,
	pub condition: FilterCondition,
	pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterFeature {
	Engine,
	Status,
	ChainName,
	StartTime,
	FinishTime,
}
impl FilterFeature {
	pub fn field(self) -> &'static str {
		match self {
			Self::Engine => field::ENGINE_ADDRESS,
			Self::Status => field::SESSION_EXECUTION_STATUS,
			Self::ChainName => field::CHAIN_NAME,
			Self::StartTime => field::SESSION_STARTED,
			Self::FinishTime => field::SESSION_FINISHED,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterCondition {
	In,
	NotIn,
	Contains,
	DoesNotContain,
	StartsWith,
	EndsWith,
	IsAfter,
	IsBefore,
	IsWithin,
}

pub fn validate_sort_column(column: &str) -> Result<()> {
	if SORT_COLUMNS.contains(&column) {
		return Ok(());
	}

	Err(Error::InvalidQuery {
		message: format!(
			"Can't sort results on this column. Valid columns are: {}",
			SORT_COLUMNS.join(", ")
		),
	})
}

/// Conjunction of the chain scope, the free-text search and every filter triple.
pub fn session_filter(
	chain_id: Option<&str>,
	filter: &FilterRequestAndSearch,
) -> Result<BoolQuery> {
	let mut query = BoolQuery::default();

	if let Some(chain_id) = chain_id.filter(|id| !id.is_empty()) {
		query.must.push(Query::term(field::CHAIN_ID, chain_id));
	}
	if let Some(search) = filter.search_string.as_deref().filter(|text| !text.is_empty()) {
		query.must.push(Query::Bool(BoolQuery {
			should: vec![
				Query::term(field::SESSION_ID, search),
				Query::MultiMatchPhrasePrefix {
					fields: field::SEARCHABLE_PAYLOAD_FIELDS.iter().map(|f| f.to_string()).collect(),
					query: search.to_string(),
				},
			],
			..Default::default()
		}));
	}

	for request in &filter.filter_request_list {
		apply_condition(&mut query, request.condition, request.feature.field(), &request.value)?;
	}

	Ok(query)
}

fn apply_condition(
	query: &mut BoolQuery,
	condition: FilterCondition,
	field_name: &str,
	value: &str,
) -> Result<()> {
	let field_name = field_name.to_string();

	match condition {
		FilterCondition::In => query.must.push(terms(field_name, value)),
		FilterCondition::NotIn => query.must_not.push(terms(field_name, value)),
		FilterCondition::Contains =>
			query.must.push(Query::Wildcard { field: field_name, value: format!("*{value}*") }),
		FilterCondition::DoesNotContain =>
			query.must_not.push(Query::Wildcard { field: field_name, value: format!("*{value}*") }),
		FilterCondition::StartsWith => query
			.must
			.push(Query::MatchPhrasePrefix { field: field_name, query: value.to_string() }),
		FilterCondition::EndsWith =>
			query.must.push(Query::Wildcard { field: field_name, value: format!("*{value}") }),
		FilterCondition::IsAfter => query.must.push(Query::Range {
			field: field_name,
			gte: Some(Value::from(epoch_millis(value)?)),
			lte: None,
		}),
		FilterCondition::IsBefore => query.must.push(Query::Range {
			field: field_name,
			gte: None,
			lte: Some(Value::from(epoch_millis(value)?)),
		}),
		// Always bounded on the finish time, whatever feature was chosen.
		FilterCondition::IsWithin => {
			let Some((from, to)) = value.split_once(',') else {
				return Err(Error::InvalidQuery {
					message: format!("IS_WITHIN expects two comma-separated bounds, got {value:?}."),
				});
			};

			query.must.push(Query::Range {
				field: field::SESSION_FINISHED.to_string(),
				gte: Some(Value::from(epoch_millis(from)?)),
				lte: Some(Value::from(epoch_millis(to)?)),
			});
		},
	}

	Ok(())
}

fn terms(field_name: String, value: &str) -> Query {
	Query::Terms { field: field_name, values: value.split(',').map(Value::from).collect() }
}

fn epoch_millis(value: &str) -> Result<i64> {
	value.trim().parse().map_err(|_| Error::InvalidQuery {
		message: format!("Time filter value {value:?} is not a millisecond timestamp."),
	})
}

/// One collapsed preview row per session, most recent element first within the page.
pub fn preview_search(
	index: &str,
	chain_id: Option<&str>,
	offset: u64,
	limit: u32,
	sort_column: &str,
	filter: &FilterRequestAndSearch,
) -> Result<SearchRequest> {
	Ok(SearchRequest {
		index: index.to_string(),
		query: Query::Bool(session_filter(chain_id, filter)?),
		sort: vec![
			SortField::desc(sort_column),
			SortField::asc(field::SESSION_ID),
			SortField::asc(field::STARTED),
		],
		from: offset,
		size: limit,
		collapse: Some(most_recent_collapse(field::SESSION_ID, true)),
		source_excludes: payload_excludes(),
	})
}

/// One page of the records whose `id_field` equals `id`, ordered by element start time.
pub fn window_search(
	index: &str,
	id_field: &str,
	id: &str,
	light: bool,
	page: u64,
) -> SearchRequest {
	SearchRequest {
		index: index.to_string(),
		query: Query::term(id_field, id),
		sort: vec![SortField::asc(field::STARTED)],
		from: page * u64::from(SCROLL_WINDOW),
		size: SCROLL_WINDOW,
		collapse: Some(most_recent_collapse(field::ID, light)),
		source_excludes: if light { payload_excludes() } else { Vec::new() },
	}
}

pub fn element_search(index: &str, element_id: &str) -> SearchRequest {
	window_search(index, field::ID, element_id, false, 0)
}

fn most_recent_collapse(field_name: &str, light: bool) -> Collapse {
	Collapse {
		field: field_name.to_string(),
		inner_hits: Some(InnerHits {
			name: INNER_HIT_NAME.to_string(),
			sort: vec![SortField::desc(field::SESSION_DURATION)],
			size: 1,
			source_excludes: if light { payload_excludes() } else { Vec::new() },
		}),
	}
}

fn payload_excludes() -> Vec<String> {
	field::PAYLOAD_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Records carried by the `most_recent` inner hit of every collapsed hit. A hit without inner
/// hits contributes its own source.
pub fn inner_hit_records(response: SearchResponse) -> Result<Vec<ElementRecord>> {
	let mut records = Vec::with_capacity(response.hits.len());

	for mut hit in response.hits {
		let sources = match hit.inner_hits.remove(INNER_HIT_NAME) {
			Some(inner) => inner.into_iter().filter_map(|inner| inner.source).collect(),
			None => hit.source.into_iter().collect::<Vec<_>>(),
		};

		for source in sources {
			let record = serde_json::from_value(source).map_err(|err| Error::SearchFailure {
				operation: "search",
				message: format!("Malformed element document: {err}"),
			})?;

			records.push(record);
		}
	}

	Ok(records)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filter(feature: FilterFeature, condition: FilterCondition, value: &str) -> FilterRequest {
		FilterRequest { feature, condition, value: value.to_string() }
	}

	#[test]
	fn filters_map_to_predicates() {
		let request = FilterRequestAndSearch {
			search_string: None,
			filter_request_list: vec![
				filter(FilterFeature::Engine, FilterCondition::NotIn, "e-1,e-2"),
				filter(FilterFeature::ChainName, FilterCondition::EndsWith, "orders"),
				filter(FilterFeature::StartTime, FilterCondition::IsWithin, "10,20"),
			],
		};
		let query = session_filter(Some("c-1"), &request).expect("filter");

		assert_eq!(query.must[0], Query::term(field::CHAIN_ID, "c-1"));
		assert_eq!(query.must_not, vec![Query::Terms {
			field: field::ENGINE_ADDRESS.to_string(),
			values: vec![Value::from("e-1"), Value::from("e-2")],
		}]);
		assert_eq!(query.must[1], Query::Wildcard {
			field: field::CHAIN_NAME.to_string(),
			value: "*orders".to_string(),
		});
		assert_eq!(query.must[2], Query::Range {
			field: field::SESSION_FINISHED.to_string(),
			gte: Some(Value::from(10)),
			lte: Some(Value::from(20)),
		});
	}

	#[test]
	fn malformed_time_bound_is_invalid_query() {
		let request = FilterRequestAndSearch {
			search_string: None,
			filter_request_list: vec![filter(
				FilterFeature::FinishTime,
				FilterCondition::IsAfter,
				"yesterday",
			)],
		};
		let err = session_filter(None, &request).expect_err("Expected invalid query.");

		assert!(matches!(err, Error::InvalidQuery { .. }), "Unexpected error: {err}");
	}

	#[test]
	fn unknown_sort_column_lists_allowed_columns() {
		let err = validate_sort_column("bogus").expect_err("Expected invalid query.");

		assert!(err.to_string().contains("sessionStarted, sessionFinished"), "Unexpected error: {err}");
		assert!(validate_sort_column(field::CHAIN_NAME).is_ok());
	}

	#[test]
	fn search_string_matches_id_or_payload_text() {
		let request =
			FilterRequestAndSearch { search_string: Some("abc".to_string()), ..Default::default() };
		let query = session_filter(None, &request).expect("filter");
		let Query::Bool(inner) = &query.must[0] else {
			panic!("Expected nested bool query.");
		};

		assert_eq!(inner.should.len(), 2);
		assert_eq!(inner.should[0], Query::term(field::SESSION_ID, "abc"));
	}

	#[test]
	fn light_window_excludes_payloads_and_pages_by_window() {
		let request = window_search("idx", field::SESSION_ID, "s-1", true, 2);

		assert_eq!(request.from, 600);
		assert_eq!(request.source_excludes.len(), field::PAYLOAD_FIELDS.len());
		assert_eq!(request.collapse.as_ref().map(|c| c.field.as_str()), Some(field::ID));
		assert!(element_search("idx", "e-1").source_excludes.is_empty());
	}
}
