//! Request-sized batching of write and delete operations.

/// Largest number of operations sent in one batch request.
///
/// Matches DynamoDB's `BatchWriteItem` ceiling, the smallest of the supported
/// backends.
pub const MAX_WINDOW_SIZE: usize = 25;

/// Clamp a requested window size into `1..=MAX_WINDOW_SIZE`.
pub fn clamp_window_size(size: usize) -> usize {
    size.clamp(1, MAX_WINDOW_SIZE)
}

/// Split `items` into contiguous windows of at most `size` elements.
///
/// Order is preserved inside each window. Produces `ceil(len / size)` windows
/// and no window for empty input. A `size` of zero is treated as one.
pub fn windows<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut out = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));

    for item in items {
        current.push(item);
        if current.len() == size {
            out.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_count_and_bounds() {
        for n in [0usize, 1, 24, 25, 26, 50, 51, 103] {
            let items: Vec<usize> = (0..n).collect();
            let batches = windows(items, MAX_WINDOW_SIZE);

            assert_eq!(batches.len(), n.div_ceil(MAX_WINDOW_SIZE), "n = {n}");
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= MAX_WINDOW_SIZE));

            let flattened: Vec<usize> = batches.into_iter().flatten().collect();
            assert_eq!(flattened, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_windows_preserves_order_within_window() {
        let batches = windows(vec!["a", "b", "c", "d", "e"], 2);
        assert_eq!(batches, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
    }

    #[test]
    fn test_zero_size_behaves_as_one() {
        let batches = windows(vec![1, 2, 3], 0);
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn test_clamp_window_size() {
        assert_eq!(clamp_window_size(0), 1);
        assert_eq!(clamp_window_size(10), 10);
        assert_eq!(clamp_window_size(100), MAX_WINDOW_SIZE);
    }
}
