//! Chunking of bulk writes by item size and aggregate batch size.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
	pub max_batch_bytes: usize,
	pub payload_threshold_bytes: usize,
	pub elements_count_threshold: usize,
}

/// One bulk call's worth of items.
#[derive(Debug, PartialEq, Eq)]
pub enum Flush<T> {
	/// A large item, or any item of a small import, written on its own.
	Single(T),
	Batch(Vec<T>),
}
impl<T> Flush<T> {
	pub fn into_items(self) -> Vec<T> {
		match self {
			Self::Single(item) => vec![item],
			Self::Batch(items) => items,
		}
	}
}

/// Decides, item by item, when a bulk call must be issued.
///
/// Items at or above the payload threshold, and every item of an import whose total element
/// count is at or below the count threshold, are flushed alone immediately. Other items are
/// accumulated; a batch is flushed once it reaches the byte bound, and earlier when the next item
/// would push it past that bound, so a merged batch never exceeds `max_batch_bytes`.
#[derive(Debug)]
pub struct BulkBatcher<T> {
	limits: BatchLimits,
	total_items: usize,
	pending: Vec<T>,
	pending_bytes: usize,
}
impl<T> BulkBatcher<T> {
	pub fn new(limits: BatchLimits, total_items: usize) -> Self {
		Self { limits, total_items, pending: Vec::new(), pending_bytes: 0 }
	}

	pub fn pending_bytes(&self) -> usize {
		self.pending_bytes
	}

	/// Adds an item of `size` serialized bytes and returns the flushes it triggers, in order.
	pub fn push(&mut self, item: T, size: usize) -> Vec<Flush<T>> {
		let mut flushes = Vec::new();

		if size >= self.limits.payload_threshold_bytes
			|| self.total_items <= self.limits.elements_count_threshold
		{
			flushes.push(Flush::Single(item));

			return flushes;
		}
		if !self.pending.is_empty() && self.pending_bytes + size > self.limits.max_batch_bytes {
			flushes.push(self.take_batch());
		}

		self.pending.push(item);
		self.pending_bytes += size;

		if self.pending_bytes >= self.limits.max_batch_bytes {
			flushes.push(self.take_batch());
		}

		flushes
	}

	/// Flushes the residual batch once the input is exhausted.
	pub fn finish(mut self) -> Option<Flush<T>> {
		if self.pending.is_empty() { None } else { Some(self.take_batch()) }
	}

	fn take_batch(&mut self) -> Flush<T> {
		self.pending_bytes = 0;

		Flush::Batch(std::mem::take(&mut self.pending))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LIMITS: BatchLimits =
		BatchLimits { max_batch_bytes: 100, payload_threshold_bytes: 60, elements_count_threshold: 2 };

	#[test]
	fn exact_bound_flushes_immediately() {
		let mut batcher = BulkBatcher::new(LIMITS, 10);

		assert!(batcher.push("a", 50).is_empty());
		assert_eq!(batcher.pending_bytes(), 50);
		assert_eq!(batcher.push("b", 50), vec![Flush::Batch(vec!["a", "b"])]);
		assert_eq!(batcher.pending_bytes(), 0);
		assert_eq!(batcher.finish(), None);
	}
}
