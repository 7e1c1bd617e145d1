//! Small collection helpers.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::BuildHasher;

/// Return the keys of a string-keyed map in ascending order.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use metalstack_core::sorted_keys;
///
/// let map: HashMap<String, u32> = [("key2", 2), ("key1", 1), ("key0", 0)]
///     .into_iter()
///     .map(|(k, v)| (k.to_owned(), v))
///     .collect();
/// assert_eq!(sorted_keys(&map), vec!["key0", "key1", "key2"]);
/// ```
#[must_use]
pub fn sorted_keys<V, S: BuildHasher>(map: &HashMap<String, V, S>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort_unstable();
    keys
}

/// Return the strings in `right` that do not appear in `left`.
///
/// Order follows `right`; a value repeated in `right` is returned once.
#[must_use]
pub fn unique_strings<L, R>(left: &[L], right: &[R]) -> Vec<String>
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let known: HashSet<&str> = left.iter().map(AsRef::as_ref).collect();
    let mut seen = BTreeSet::new();
    right
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !known.contains(s) && seen.insert(*s))
        .map(str::to_owned)
        .collect()
}

/// Whether `list` contains `value`.
#[must_use]
pub fn contains<T: AsRef<str>>(list: &[T], value: &str) -> bool {
    list.iter().any(|item| item.as_ref() == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_sort_map_keys() {
        let mut map = HashMap::new();
        map.insert("key2".to_owned(), ());
        map.insert("key1".to_owned(), ());
        map.insert("key0".to_owned(), ());

        assert_eq!(sorted_keys(&map), vec!["key0", "key1", "key2"]);
    }

    #[test]
    fn test_should_return_empty_keys_for_empty_map() {
        let map: HashMap<String, i32> = HashMap::new();
        assert!(sorted_keys(&map).is_empty());
    }

    #[test]
    fn test_should_return_strings_missing_from_left() {
        assert_eq!(
            unique_strings(&["a", "b"], &["a", "b", "c", "d"]),
            vec!["c", "d"]
        );
    }

    #[test]
    fn test_should_emit_repeated_right_values_once() {
        assert_eq!(unique_strings(&["a"], &["c", "b", "c", "a"]), vec!["c", "b"]);
    }

    #[test]
    fn test_should_return_nothing_when_right_is_subset() {
        let left = vec!["x".to_owned(), "y".to_owned()];
        assert!(unique_strings(&left, &["y"]).is_empty());
    }

    #[test]
    fn test_should_find_contained_value() {
        assert!(contains(&["a", "b", "c"], "b"));
        assert!(!contains(&["a", "b", "c"], "d"));
        assert!(!contains::<&str>(&[], "a"));
    }
}
