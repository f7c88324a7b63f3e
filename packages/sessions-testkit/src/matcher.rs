use std::cmp::Ordering;

use serde_json::Value;

use sessions_domain::timestamp;
use sessions_storage::query::{Query, SortField, SortOrder};

pub(crate) fn matches(query: &Query, document: &Value) -> bool {
	match query {
		Query::MatchAll => true,
		Query::Term { field, value } => field_value(document, field).is_some_and(|v| v == value),
		Query::Terms { field, values } =>
			field_value(document, field).is_some_and(|v| values.contains(v)),
		Query::Wildcard { field, value } =>
			field_text(document, field).is_some_and(|text| wildcard(value, text)),
		Query::MatchPhrasePrefix { field, query } =>
			field_text(document, field).is_some_and(|text| phrase_prefix(text, query)),
		Query::MultiMatchPhrasePrefix { fields, query } => fields
			.iter()
			.any(|field| field_text(document, field).is_some_and(|text| phrase_prefix(text, query))),
		Query::Range { field, gte, lte } => {
			let Some(actual) = field_value(document, field).and_then(millis) else {
				return false;
			};

			gte.as_ref().and_then(millis).is_none_or(|bound| actual >= bound)
				&& lte.as_ref().and_then(millis).is_none_or(|bound| actual <= bound)
		},
		Query::Bool(bool_query) =>
			bool_query.must.iter().all(|query| matches(query, document))
				&& !bool_query.must_not.iter().any(|query| matches(query, document))
				&& (bool_query.should.is_empty()
					|| bool_query.should.iter().any(|query| matches(query, document))),
	}
}

/// Stable multi-key sort. Missing values sort last in either direction.
pub(crate) fn sort(documents: &mut [&Value], fields: &[SortField]) {
	documents.sort_by(|left, right| {
		for sort_field in fields {
			let ordering = match (
				field_value(left, &sort_field.field),
				field_value(right, &sort_field.field),
			) {
				(None, None) => Ordering::Equal,
				(None, Some(_)) => Ordering::Greater,
				(Some(_), None) => Ordering::Less,
				(Some(left), Some(right)) => {
					let ordering = compare(left, right);

					match sort_field.order {
						SortOrder::Asc => ordering,
						SortOrder::Desc => ordering.reverse(),
					}
				},
			};

			if ordering != Ordering::Equal {
				return ordering;
			}
		}

		Ordering::Equal
	});
}

fn field_value<'a>(document: &'a Value, field: &str) -> Option<&'a Value> {
	document.get(field).filter(|value| !value.is_null())
}

fn field_text<'a>(document: &'a Value, field: &str) -> Option<&'a str> {
	field_value(document, field).and_then(Value::as_str)
}

fn compare(left: &Value, right: &Value) -> Ordering {
	match (left, right) {
		(Value::Number(left), Value::Number(right)) => left
			.as_f64()
			.unwrap_or_default()
			.total_cmp(&right.as_f64().unwrap_or_default()),
		(Value::String(left), Value::String(right)) =>
			match (timestamp::parse(left), timestamp::parse(right)) {
				(Some(left), Some(right)) => left.cmp(&right),
				_ => left.cmp(right),
			},
		(Value::Bool(left), Value::Bool(right)) => left.cmp(right),
		_ => left.to_string().cmp(&right.to_string()),
	}
}

/// Dates as epoch milliseconds; numbers are taken as already being milliseconds.
fn millis(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) => number.as_i64(),
		Value::String(text) => timestamp::epoch_millis(text).or_else(|| text.parse().ok()),
		_ => None,
	}
}

fn wildcard(pattern: &str, text: &str) -> bool {
	glob(&pattern.chars().collect::<Vec<_>>(), &text.chars().collect::<Vec<_>>())
}

/// `*` matches any run, `?` exactly one character.
fn glob(pattern: &[char], text: &[char]) -> bool {
	let (mut p, mut t) = (0, 0);
	let mut backtrack: Option<(usize, usize)> = None;

	while t < text.len() {
		match pattern.get(p) {
			Some('*') => {
				backtrack = Some((p, t));
				p += 1;
			},
			Some('?') => {
				p += 1;
				t += 1;
			},
			Some(c) if *c == text[t] => {
				p += 1;
				t += 1;
			},
			_ => match backtrack {
				Some((star, matched)) => {
					p = star + 1;
					t = matched + 1;
					backtrack = Some((star, matched + 1));
				},
				None => return false,
			},
		}
	}

	pattern[p..].iter().all(|c| *c == '*')
}

/// Case-insensitive match of `query` at the start of any word of `text`.
fn phrase_prefix(text: &str, query: &str) -> bool {
	let text = text.to_lowercase();
	let query = query.to_lowercase();
	let mut previous: Option<char> = None;

	for (index, c) in text.char_indices() {
		let at_word_start = previous.is_none_or(|p| !p.is_alphanumeric());

		if at_word_start && text[index..].starts_with(&query) {
			return true;
		}

		previous = Some(c);
	}

	false
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(text: &str) -> Vec<char> {
		text.chars().collect()
	}

	#[test]
	fn glob_handles_stars_and_single_characters() {
		assert!(glob(&chars("*order*"), &chars("new-orders-flow")));
		assert!(glob(&chars("*flow"), &chars("orders-flow")));
		assert!(glob(&chars("o?der"), &chars("order")));
		assert!(!glob(&chars("*order"), &chars("orders")));
	}

	#[test]
	fn phrase_prefix_matches_word_starts_only() {
		assert!(phrase_prefix("{\"status\":\"Delivered\"}", "deliv"));
		assert!(!phrase_prefix("undelivered", "deliv"));
	}
}
