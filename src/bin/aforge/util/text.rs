/// Greedy word wrap; always yields at least one (possibly empty) line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for word in text.split_whitespace() {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 1 + word.chars().count() <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Shortens `s` to at most `max_len` characters, marking the cut with `…`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let mut out: String = s.chars().take(max_len - 1).collect();
    out.push('…');
    out
}

/// `"1 residue"`, `"3 residues"`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap("no segment 'P'", 20), vec!["no segment 'P'"]);
    }

    #[test]
    fn wrap_breaks_between_words() {
        assert_eq!(
            wrap("rule file does not exist", 10),
            vec!["rule file", "does not", "exist"]
        );
    }

    #[test]
    fn wrap_of_empty_text_is_one_empty_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn truncate_leaves_fitting_text_alone() {
        assert_eq!(truncate("ACE", 3), "ACE");
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("structure.prmtop", 8), "structu…");
        assert_eq!(truncate("Å Å Å", 2), "Å…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "segment"), "1 segment");
        assert_eq!(plural(0, "segment"), "0 segments");
    }
}
