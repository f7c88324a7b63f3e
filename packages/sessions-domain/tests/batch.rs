use sessions_domain::batch::{BatchLimits, BulkBatcher, Flush};

const LIMITS: BatchLimits =
	BatchLimits { max_batch_bytes: 1_000, payload_threshold_bytes: 400, elements_count_threshold: 3 };

fn run(limits: BatchLimits, sizes: &[usize]) -> Vec<Flush<usize>> {
	let mut batcher = BulkBatcher::new(limits, sizes.len());
	let mut flushes = Vec::new();

	for (index, size) in sizes.iter().enumerate() {
		flushes.extend(batcher.push(index, *size));
	}

	flushes.extend(batcher.finish());

	flushes
}

#[test]
fn large_items_are_always_written_alone() {
	let sizes = [100, 400, 100, 900, 100];
	let flushes = run(LIMITS, &sizes);

	assert!(flushes.contains(&Flush::Single(1)));
	assert!(flushes.contains(&Flush::Single(3)));

	for flush in &flushes {
		if let Flush::Batch(items) = flush {
			assert!(!items.contains(&1) && !items.contains(&3), "Large item merged: {items:?}");
		}
	}
}

#[test]
fn small_imports_write_every_item_alone() {
	let flushes = run(LIMITS, &[10, 20, 30]);

	assert_eq!(flushes, vec![Flush::Single(0), Flush::Single(1), Flush::Single(2)]);
}

#[test]
fn merged_batches_stay_within_the_byte_bound() {
	let sizes: Vec<usize> = (0..200).map(|index| 50 + (index * 37) % 340).collect();
	let flushes = run(LIMITS, &sizes);
	let mut written = Vec::new();

	for flush in flushes {
		if let Flush::Batch(items) = &flush {
			let total: usize = items.iter().map(|index| sizes[*index]).sum();

			assert!(total <= LIMITS.max_batch_bytes, "Batch of {total} bytes exceeds bound.");
		}

		written.extend(flush.into_items());
	}

	written.sort_unstable();

	assert_eq!(written, (0..sizes.len()).collect::<Vec<_>>());
}

#[test]
fn residual_batch_is_flushed_on_exhaustion() {
	let flushes = run(LIMITS, &[300, 300, 300, 300, 50]);

	assert_eq!(
		flushes,
		vec![Flush::Batch(vec![0, 1, 2]), Flush::Batch(vec![3, 4])]
	);
}
