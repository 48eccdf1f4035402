// Ordering by a stored id list - pure logic, no storage access.

use std::collections::HashMap;

/// Anything the machine list can be sorted by.
pub trait HasMachineId {
    fn machine_id(&self) -> &str;
}

/// Working-directory groups within one machine.
pub trait HasCwdRoot {
    fn cwd_root(&self) -> &str;
}

/// Sorts `items` by their position in `stored_ids`.
///
/// Items whose id is not stored rank last and keep their relative input order.
/// With an empty `stored_ids` the input comes back untouched. If an id appears
/// more than once in `stored_ids`, its last position wins.
pub fn sort_by_stored<T, F>(mut items: Vec<T>, stored_ids: &[String], id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if stored_ids.is_empty() {
        return items;
    }

    let index: HashMap<&str, usize> = stored_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    // sort_by_key is stable; usize::MAX plays the role of "unranked"
    items.sort_by_key(|item| index.get(id_of(item)).copied().unwrap_or(usize::MAX));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Machine {
        machine_id: String,
        tag: usize,
    }

    fn machines(ids: &[&str]) -> Vec<Machine> {
        ids.iter()
            .enumerate()
            .map(|(tag, id)| Machine {
                machine_id: id.to_string(),
                tag,
            })
            .collect()
    }

    fn ids(items: &[Machine]) -> Vec<&str> {
        items.iter().map(|m| m.machine_id.as_str()).collect()
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&["b", "a"], &["a", "c", "b"], &["b", "a", "c"])]
    #[case(&[], &["a", "c", "b"], &["a", "c", "b"])]
    #[case(&["c"], &["a", "b", "c"], &["c", "a", "b"])]
    #[case(&["x", "y"], &["b", "a"], &["b", "a"])]
    #[case(&["a", "b", "a"], &["a", "b"], &["b", "a"])]
    #[case(&["b", "a"], &[], &[])]
    fn test_sort_by_stored(#[case] stored: &[&str], #[case] input: &[&str], #[case] expected: &[&str]) {
        let sorted = sort_by_stored(machines(input), &order(stored), |m| m.machine_id.as_str());
        assert_eq!(ids(&sorted), expected);
    }

    #[test]
    fn test_unknown_ids_keep_input_order() {
        let input = machines(&["u1", "k", "u2", "u3"]);
        let sorted = sort_by_stored(input, &order(&["k"]), |m| m.machine_id.as_str());

        let tags: Vec<usize> = sorted.iter().map(|m| m.tag).collect();
        assert_eq!(tags, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_equal_ids_stay_stable() {
        let input = machines(&["a", "b", "a"]);
        let sorted = sort_by_stored(input, &order(&["a", "b"]), |m| m.machine_id.as_str());

        let tags: Vec<usize> = sorted.iter().map(|m| m.tag).collect();
        assert_eq!(tags, vec![0, 2, 1]);
    }
}
