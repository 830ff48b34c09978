/// Assigns a contiguous 0-based label to every run of equal keys.
///
/// The label starts at 0 and increases by exactly one wherever a key differs
/// from its predecessor, independent of the key values themselves. Feeding
/// the output back in reproduces it unchanged.
///
/// ```
/// use amber_forge::prep::sequence_ids;
///
/// let residue_ids = [7, 7, 42, 42, 42, 7];
/// assert_eq!(sequence_ids(residue_ids), vec![0, 0, 1, 1, 1, 2]);
/// ```
pub fn sequence_ids<I, K>(keys: I) -> Vec<usize>
where
    I: IntoIterator<Item = K>,
    K: PartialEq,
{
    let mut labels = Vec::new();
    let mut previous: Option<K> = None;
    let mut current = 0usize;

    for key in keys {
        if let Some(prev) = &previous {
            if *prev != key {
                current += 1;
            }
        }
        labels.push(current);
        previous = Some(key);
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(labels: &[usize]) {
        if let Some(&first) = labels.first() {
            assert_eq!(first, 0);
        }
        for pair in labels.windows(2) {
            let step = pair[1] - pair[0];
            assert!(step <= 1, "label sequence skips a value: {labels:?}");
        }
    }

    #[test]
    fn empty_input_yields_no_labels() {
        assert!(sequence_ids(Vec::<i32>::new()).is_empty());
    }

    #[test]
    fn labels_ignore_key_magnitude() {
        let labels = sequence_ids([1000, 1000, -5, 99999]);
        assert_eq!(labels, vec![0, 0, 1, 2]);
        assert_contiguous(&labels);
    }

    #[test]
    fn composite_keys_split_on_any_component() {
        let resids = [1, 1, 1, 1, 2];
        let icodes = [' ', ' ', 'A', 'A', ' '];
        let segids = ["P", "P", "P", "Q", "Q"];
        let keys = resids
            .iter()
            .zip(icodes.iter())
            .zip(segids.iter())
            .map(|((r, i), s)| (r, i, s));

        assert_eq!(sequence_ids(keys), vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn non_adjacent_repeats_get_new_labels() {
        assert_eq!(sequence_ids(["PC", "PC", "OL", "PC"]), vec![0, 0, 1, 2]);
    }

    #[test]
    fn relabeling_is_idempotent() {
        let first = sequence_ids([4, 4, 9, 2, 2, 2, 8]);
        let second = sequence_ids(first.iter().copied());
        assert_eq!(first, second);
        assert_contiguous(&second);
    }
}
