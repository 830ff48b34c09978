use super::error::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// How one source-convention atom is rewritten into the target convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Replacement residue name.
    pub residue_name: String,
    /// Replacement atom name.
    pub atom_name: String,
    /// Canonical index of the atom inside its source residue, in `[0, residue_atoms)`.
    pub position: usize,
    /// Number of atoms the source residue is expected to hold.
    pub residue_atoms: usize,
    /// Whether a first/last atom also bounds a whole molecule instance.
    pub terminal: bool,
}

impl Rule {
    #[inline]
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.residue_atoms
    }

    /// First atom of a molecule instance.
    #[inline]
    pub fn opens_instance(&self) -> bool {
        self.terminal && self.is_first()
    }

    /// Last atom of a molecule instance.
    #[inline]
    pub fn closes_instance(&self) -> bool {
        self.terminal && self.is_last()
    }
}

/// Rules keyed by source residue name, then source atom name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    residues: HashMap<String, HashMap<String, Rule>>,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    search: String,
    replace: String,
    order: usize,
    num_atom: usize,
    #[serde(rename = "TER")]
    ter: String,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a rule table from a CSV file.
    ///
    /// The first line is a free-form comment, the second the column header
    /// `search,replace,order,num_atom,TER`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::RuleFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut reader = BufReader::new(reader);
        let mut comment = String::new();
        reader.read_line(&mut comment)?;

        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv
            .headers()
            .map_err(|e| Error::rule_parse(2, e.to_string()))?
            .clone();

        let mut table = Self::new();
        for record in csv.records() {
            let record = record.map_err(|e| {
                let line = e.position().map_or(0, |p| p.line() + 1);
                Error::rule_parse(line, e.to_string())
            })?;
            let line = record.position().map_or(0, |p| p.line() + 1);
            let row: RuleRow = record
                .deserialize(Some(&headers))
                .map_err(|e| Error::rule_parse(line, e.to_string()))?;

            let (search_atom, search_residue) = split_pair(&row.search)
                .ok_or_else(|| Error::rule_parse(line, format!("malformed search pair '{}'", row.search)))?;
            let (replace_atom, replace_residue) = split_pair(&row.replace)
                .ok_or_else(|| Error::rule_parse(line, format!("malformed replace pair '{}'", row.replace)))?;

            if row.num_atom == 0 {
                return Err(Error::rule_parse(line, "residue atom count must be at least 1"));
            }
            if row.order >= row.num_atom {
                return Err(Error::rule_parse(
                    line,
                    format!(
                        "position {} is outside a residue of {} atoms",
                        row.order, row.num_atom
                    ),
                ));
            }

            table.insert(
                search_residue,
                search_atom,
                Rule {
                    residue_name: replace_residue.to_string(),
                    atom_name: replace_atom.to_string(),
                    position: row.order,
                    residue_atoms: row.num_atom,
                    terminal: row.ter == "True",
                },
            );
        }

        Ok(table)
    }

    /// Adds a rule, replacing any earlier one for the same source atom.
    pub fn insert(
        &mut self,
        residue_name: impl Into<String>,
        atom_name: impl Into<String>,
        rule: Rule,
    ) {
        self.residues
            .entry(residue_name.into())
            .or_default()
            .insert(atom_name.into(), rule);
    }

    pub fn get(&self, residue_name: &str, atom_name: &str) -> Option<&Rule> {
        self.residues.get(residue_name)?.get(atom_name)
    }

    pub fn contains_residue(&self, residue_name: &str) -> bool {
        self.residues.contains_key(residue_name)
    }

    pub fn residue_names(&self) -> impl Iterator<Item = &str> {
        self.residues.keys().map(String::as_str)
    }

    /// Total number of atom rules.
    pub fn len(&self) -> usize {
        self.residues.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn split_pair(field: &str) -> Option<(&str, &str)> {
    let mut tokens = field.split_whitespace();
    let atom = tokens.next()?;
    let residue = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((atom, residue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
# CHARMM to AMBER lipid conversion
search,replace,order,num_atom,TER
N POPC,N PC,0,3,True
P POPC,P PC,1,3,False
C218 POPC,C18 OL,2,3,True
";

    #[test]
    fn parses_rows_into_nested_rules() {
        let table = RuleTable::from_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.contains_residue("POPC"));

        let first = table.get("POPC", "N").unwrap();
        assert_eq!(first.residue_name, "PC");
        assert_eq!(first.atom_name, "N");
        assert!(first.opens_instance());
        assert!(!first.closes_instance());

        let middle = table.get("POPC", "P").unwrap();
        assert!(!middle.terminal);
        assert!(!middle.is_first() && !middle.is_last());

        let last = table.get("POPC", "C218").unwrap();
        assert_eq!(last.residue_name, "OL");
        assert_eq!(last.atom_name, "C18");
        assert!(last.closes_instance());

        assert!(table.get("POPC", "C1").is_none());
        assert!(table.get("DOPC", "N").is_none());
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = RuleTable::load("/nonexistent/rules.csv").unwrap_err();
        assert!(matches!(err, Error::RuleFileNotFound { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let table = RuleTable::load(&path).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn rejects_position_outside_residue() {
        let src = "# c\nsearch,replace,order,num_atom,TER\nN POPC,N PC,3,3,False\n";
        let err = RuleTable::from_reader(Cursor::new(src)).unwrap_err();
        match err {
            Error::RuleParse { line, detail } => {
                assert_eq!(line, 3);
                assert!(detail.contains("position 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_pairs_and_numbers() {
        let bad_pair = "# c\nsearch,replace,order,num_atom,TER\nN,N PC,0,1,False\n";
        assert!(matches!(
            RuleTable::from_reader(Cursor::new(bad_pair)),
            Err(Error::RuleParse { .. })
        ));

        let bad_number = "# c\nsearch,replace,order,num_atom,TER\nN POPC,N PC,x,1,False\n";
        assert!(matches!(
            RuleTable::from_reader(Cursor::new(bad_number)),
            Err(Error::RuleParse { .. })
        ));
    }

    #[test]
    fn later_rows_override_earlier_ones() {
        let src = "# c\nsearch,replace,order,num_atom,TER\nN POPC,N PC,0,2,False\nN POPC,N2 PE,1,2,False\n";
        let table = RuleTable::from_reader(Cursor::new(src)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("POPC", "N").unwrap().atom_name, "N2");
    }

    #[test]
    fn only_literal_true_marks_terminal() {
        let src = "# c\nsearch,replace,order,num_atom,TER\nN POPC,N PC,0,1,true\n";
        let table = RuleTable::from_reader(Cursor::new(src)).unwrap();
        assert!(!table.get("POPC", "N").unwrap().terminal);
    }
}
