//! Start-path reduction
//!
//! A selection of hierarchy nodes is collapsed to its topmost members:
//! a selected node whose materialized path extends another selected
//! node's path is already covered by that ancestor's prefix filter.

/// Reduce candidate paths to a prefix-free set.
///
/// Each candidate is compared against every path kept so far. A
/// candidate extending (or equal to) a kept path is discarded; a
/// candidate that is a prefix of kept paths takes the place of the first
/// of them and evicts the rest. Empty paths are ignored.
pub fn reduce_start_paths<I, S>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reduced: Vec<String> = Vec::new();

    for candidate in paths {
        let candidate = candidate.as_ref();
        if candidate.is_empty() || is_covered(&reduced, candidate) {
            continue;
        }

        match reduced.iter().position(|kept| kept.starts_with(candidate)) {
            Some(slot) => {
                reduced[slot] = candidate.to_string();
                let mut idx = 0;
                reduced.retain(|kept| {
                    let keep = idx == slot || !kept.starts_with(candidate);
                    idx += 1;
                    keep
                });
            }
            None => reduced.push(candidate.to_string()),
        }
    }

    reduced
}

/// Whether `path` equals or extends one of `prefixes`
pub fn is_covered(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
