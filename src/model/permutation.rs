use thiserror::Error;

/// Errors raised while constructing or applying a [`Permutation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermutationError {
    /// An entry points outside `[0, N)`.
    #[error("permutation entry {value} at position {position} is out of range for {len} atoms")]
    OutOfRange {
        position: usize,
        value: usize,
        len: usize,
    },

    /// The same source atom is referenced twice.
    #[error("permutation references atom {value} more than once")]
    Duplicate { value: usize },

    /// The permutation length differs from the atom count of its target.
    #[error("permutation covers {permutation} atoms but the structure holds {atoms}")]
    LengthMismatch { permutation: usize, atoms: usize },
}

/// A bijection on `[0, N)` describing a new atom order.
///
/// Entry `i` holds the *old* index of the atom that ends up at position `i`.
/// Values of this type are always total bijections; every constructor
/// either builds one by construction or validates its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    order: Vec<usize>,
}

impl Permutation {
    /// Validates `order` and wraps it.
    pub fn new(order: Vec<usize>) -> Result<Self, PermutationError> {
        let len = order.len();
        let mut seen = vec![false; len];
        for (position, &value) in order.iter().enumerate() {
            if value >= len {
                return Err(PermutationError::OutOfRange {
                    position,
                    value,
                    len,
                });
            }
            if std::mem::replace(&mut seen[value], true) {
                return Err(PermutationError::Duplicate { value });
            }
        }
        Ok(Self { order })
    }

    pub fn identity(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
        }
    }

    /// Identity everywhere except positions `a` and `b`, which trade atoms.
    ///
    /// # Panics
    ///
    /// Panics if `a` or `b` is not below `len`.
    pub fn swap(len: usize, a: usize, b: usize) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.swap(a, b);
        Self { order }
    }

    /// Stable argsort of per-atom target keys.
    ///
    /// Atoms are ordered by ascending key; ties keep their original relative
    /// order, so duplicated keys never drop or duplicate an atom.
    pub fn from_sort_keys<K: Ord>(keys: &[K]) -> Self {
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        Self { order }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(i, &v)| i == v)
    }

    /// Maps each old index to its new position.
    pub fn inverse(&self) -> Vec<usize> {
        let mut inverse = vec![0; self.order.len()];
        for (new, &old) in self.order.iter().enumerate() {
            inverse[old] = new;
        }
        inverse
    }

    /// Reindexes a per-atom column in place. Empty columns are left alone.
    pub fn apply<T: Clone>(&self, column: &mut Vec<T>) {
        if column.is_empty() {
            return;
        }
        debug_assert_eq!(column.len(), self.order.len());
        *column = self.order.iter().map(|&old| column[old].clone()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_bijection() {
        let perm = Permutation::new(vec![2, 0, 1]).unwrap();
        assert_eq!(perm.as_slice(), &[2, 0, 1]);
        assert_eq!(perm.len(), 3);
    }

    #[test]
    fn new_rejects_duplicates_and_out_of_range() {
        assert_eq!(
            Permutation::new(vec![0, 0, 1]),
            Err(PermutationError::Duplicate { value: 0 })
        );
        assert_eq!(
            Permutation::new(vec![0, 3, 1]),
            Err(PermutationError::OutOfRange {
                position: 1,
                value: 3,
                len: 3
            })
        );
    }

    #[test]
    fn swap_exchanges_only_two_positions() {
        let perm = Permutation::swap(5, 1, 3);
        assert_eq!(perm.as_slice(), &[0, 3, 2, 1, 4]);
        assert!(Permutation::swap(4, 2, 2).is_identity());
    }

    #[test]
    fn sort_keys_is_stable_and_bijective() {
        let perm = Permutation::from_sort_keys(&[5, 1, 5, 0, 1]);
        assert_eq!(perm.as_slice(), &[3, 1, 4, 0, 2]);

        let mut positions = perm.as_slice().to_vec();
        positions.sort_unstable();
        assert_eq!(positions, (0..5).collect::<Vec<_>>());
    }

    #[test]
    fn inverse_maps_old_to_new() {
        let perm = Permutation::new(vec![2, 0, 1]).unwrap();
        let inverse = perm.inverse();
        assert_eq!(inverse, vec![1, 2, 0]);
        for (old, &new) in inverse.iter().enumerate() {
            assert_eq!(perm.as_slice()[new], old);
        }
    }

    #[test]
    fn apply_moves_values_and_skips_empty_columns() {
        let perm = Permutation::new(vec![2, 0, 1]).unwrap();
        let mut column = vec!["a", "b", "c"];
        perm.apply(&mut column);
        assert_eq!(column, vec!["c", "a", "b"]);

        let mut empty: Vec<f64> = Vec::new();
        perm.apply(&mut empty);
        assert!(empty.is_empty());
    }
}
