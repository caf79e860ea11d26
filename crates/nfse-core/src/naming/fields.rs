//! Positional field extraction: a marker line announces that the value
//! sits on the following line.

use super::patterns::{INVOICE_NUMBER_MARKERS, INVOICE_NUMBER_ORDINAL, ISSUE_DATE_MARKERS};

/// Return the line after the `n`th (1-based) line containing `marker`.
///
/// Matching is a case-insensitive substring test. A marker on the last
/// line has no value and yields `None` for that occurrence.
pub fn extract_after_marker(text: &str, marker: &str, n: usize) -> Option<String> {
    if n == 0 {
        return None;
    }
    let marker = marker.to_uppercase();
    let mut count = 0;
    find_after(text, |line| {
        if line.to_uppercase().contains(&marker) {
            count += 1;
            count == n
        } else {
            false
        }
    })
    .map(|line| line.trim().to_string())
}

/// Number of lines containing `marker`, case-insensitively.
pub fn count_marker_lines(text: &str, marker: &str) -> usize {
    let marker = marker.to_uppercase();
    text.lines()
        .filter(|line| line.to_uppercase().contains(&marker))
        .count()
}

/// Invoice number: the line after "NÚMERO DA NFS-E" or a "Nº ... NFS-E" label.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    find_after(text, |line| {
        let up = line.to_uppercase();
        INVOICE_NUMBER_MARKERS.iter().any(|m| up.contains(m))
            || INVOICE_NUMBER_ORDINAL.is_match(&up)
    })
    .map(|line| line.trim().to_string())
}

/// Issue date: first token of the line after the emission-date label, with
/// `/` turned into `-`.
pub fn extract_issue_date(text: &str) -> Option<String> {
    find_after(text, |line| {
        let up = line.to_uppercase();
        ISSUE_DATE_MARKERS.iter().any(|m| up.contains(m))
    })
    .map(|line| {
        line.trim()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .replace('/', "-")
    })
}

/// Find the first line accepted by `is_marker` that has a following line,
/// and return that following line.
fn find_after<'a>(text: &'a str, mut is_marker: impl FnMut(&str) -> bool) -> Option<&'a str> {
    let lines: Vec<&str> = text.lines().collect();
    lines
        .windows(2)
        .find(|pair| is_marker(pair[0]))
        .map(|pair| pair[1])
}
