use time::{
	OffsetDateTime, PrimitiveDateTime, UtcOffset,
	format_description::well_known::{Iso8601, Rfc3339},
};

/// Parses a stored timestamp. Offset-qualified values are normalized to UTC; values without an
/// offset are taken as-is.
pub fn parse(raw: &str) -> Option<PrimitiveDateTime> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}
	if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
		let utc = value.to_offset(UtcOffset::UTC);

		return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
	}

	PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).ok()
}

pub fn epoch_millis(raw: &str) -> Option<i64> {
	let value = parse(raw)?;

	i64::try_from(value.assume_utc().unix_timestamp_nanos() / 1_000_000).ok()
}
