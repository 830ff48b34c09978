use super::residue;
use super::table::AtomView;

/// Declarative atom predicate evaluated against an [`AtomView`].
///
/// ```
/// use amber_forge::Selection;
///
/// let n_terminal_hydrogens = Selection::segment("P")
///     .and(Selection::residue_id(1))
///     .and(Selection::names(["H1", "H2", "H3"]));
/// # let _ = n_terminal_hydrogens;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Protein,
    Water,
    Segment(String),
    ResidueId(i32),
    ResidueName(String),
    Names(Vec<String>),
    And(Vec<Selection>),
    Not(Box<Selection>),
}

impl Selection {
    pub fn segment(segment_id: impl Into<String>) -> Self {
        Self::Segment(segment_id.into())
    }

    pub fn residue_id(residue_id: i32) -> Self {
        Self::ResidueId(residue_id)
    }

    pub fn residue_name(residue_name: impl Into<String>) -> Self {
        Self::ResidueName(residue_name.into())
    }

    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Conjunction; nested conjunctions are flattened.
    pub fn and(self, other: Selection) -> Self {
        match self {
            Self::And(mut terms) => {
                terms.push(other);
                Self::And(terms)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn matches(&self, atom: &AtomView<'_>) -> bool {
        match self {
            Self::All => true,
            Self::Protein => residue::is_protein(atom.residue_name),
            Self::Water => residue::is_water(atom.residue_name),
            Self::Segment(segment_id) => atom.segment_id == segment_id,
            Self::ResidueId(residue_id) => atom.residue_id == *residue_id,
            Self::ResidueName(residue_name) => atom.residue_name == residue_name,
            Self::Names(names) => names.iter().any(|n| n == atom.name),
            Self::And(terms) => terms.iter().all(|t| t.matches(atom)),
            Self::Not(inner) => !inner.matches(atom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(
        name: &'a str,
        residue_name: &'a str,
        residue_id: i32,
        segment_id: &'a str,
    ) -> AtomView<'a> {
        AtomView {
            name,
            residue_name,
            residue_id,
            insertion_code: ' ',
            chain_id: 'A',
            segment_id,
            beta: 0.0,
        }
    }

    #[test]
    fn conjunction_requires_every_term() {
        let sel = Selection::segment("P")
            .and(Selection::residue_id(3))
            .and(Selection::names(["OXT", "OT1"]));

        assert!(sel.matches(&view("OXT", "ALA", 3, "P")));
        assert!(!sel.matches(&view("OXT", "ALA", 4, "P")));
        assert!(!sel.matches(&view("O", "ALA", 3, "P")));
        assert!(!sel.matches(&view("OT1", "ALA", 3, "Q")));
        assert!(matches!(sel, Selection::And(ref terms) if terms.len() == 3));
    }

    #[test]
    fn category_and_negation() {
        let atom = view("OH2", "TIP3", 1, "W");
        assert!(Selection::Water.matches(&atom));
        assert!(!Selection::Protein.matches(&atom));
        assert!(Selection::Protein.not().matches(&atom));
        assert!(Selection::All.matches(&atom));
        assert!(Selection::residue_name("TIP3").matches(&atom));
    }
}
