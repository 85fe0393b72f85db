use super::types::ResolvedRequest;

/// Drops items whose destination already exists as a regular file, keeping
/// the order of the rest. Returns the remaining items and the skipped count.
///
/// Existence is the only check: a truncated or empty file at the destination
/// counts as downloaded.
pub fn filter_missing(items: &[ResolvedRequest]) -> (Vec<ResolvedRequest>, usize) {
    let missing: Vec<ResolvedRequest> = items
        .iter()
        .filter(|item| !item.destination.is_file())
        .cloned()
        .collect();
    let skipped = items.len() - missing.len();

    tracing::info!(skipped, "Skipping {} images (already downloaded)", skipped);
    (missing, skipped)
}
