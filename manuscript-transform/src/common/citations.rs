//! Numeric citation labels
//!
//! References are numbered in bibliography order; a citation pointing at several references
//! renders their numbers with runs of three or more consecutive numbers collapsed into an
//! en-dash range.

use std::collections::HashMap;

const RANGE_SEPARATOR: char = '\u{2013}';

/// Renders reference numbers, e.g. `[3, 4, 5]` → `3–5` and `[1, 2]` → `1,2`.
pub fn collapse_numbers(numbers: &[usize]) -> String {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut parts = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[j] + 1 {
            j += 1;
        }
        if j - i >= 2 {
            parts.push(format!("{}{}{}", sorted[i], RANGE_SEPARATOR, sorted[j]));
        } else {
            parts.extend(sorted[i..=j].iter().map(usize::to_string));
        }
        i = j + 1;
    }
    parts.join(",")
}

/// Number of each bibliography item, keyed by item id, in document order starting at 1.
pub fn number_references<'a, I>(ids: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut numbering = HashMap::new();
    for id in ids {
        let next = numbering.len() + 1;
        numbering.entry(id.to_string()).or_insert(next);
    }
    numbering
}

/// Label for a citation over `rids`, or `None` when no rid is a known reference.
pub fn citation_label(rids: &[String], numbering: &HashMap<String, usize>) -> Option<String> {
    let numbers: Vec<usize> = rids
        .iter()
        .filter_map(|rid| numbering.get(rid).copied())
        .collect();
    if numbers.is_empty() {
        None
    } else {
        Some(collapse_numbers(&numbers))
    }
}
