//! CSV header normalization.

use std::collections::HashSet;

/// Trims a header value, drops a byte-order mark, and collapses inner runs of
/// whitespace to one space.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns raw header values into usable, unique column names.
///
/// Blank headers become `column_<n>` (one-based position). Names are compared
/// case-insensitively, as SQL identifiers are; repeats get `_2`, `_3`, ...
pub fn column_names(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (idx, value) in raw.iter().enumerate() {
        let mut base = normalize_header(value);
        if base.is_empty() {
            base = format!("column_{}", idx + 1);
        }

        let mut candidate = base.clone();
        let mut counter = 2;
        while !seen.insert(candidate.to_lowercase()) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        names.push(candidate);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  hello  "), "hello");
        assert_eq!(normalize_header("\u{feff}id"), "id");
        assert_eq!(normalize_header("first   name"), "first name");
    }

    #[test]
    fn test_blank_headers_get_positional_names() {
        let names = column_names(&strings(&["a", "", "  "]));
        assert_eq!(names, vec!["a", "column_2", "column_3"]);
    }

    #[test]
    fn test_duplicates_are_suffixed_case_insensitively() {
        let names = column_names(&strings(&["Name", "name", "NAME", "name_2"]));
        assert_eq!(names, vec!["Name", "name_2", "NAME_3", "name_2_2"]);
    }

    #[test]
    fn test_reserved_words_and_spaces_are_kept() {
        let names = column_names(&strings(&["select", "order date"]));
        assert_eq!(names, vec!["select", "order date"]);
    }
}
