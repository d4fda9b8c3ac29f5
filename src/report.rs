//! Candidate report
//!
//! The report layout is consumed by downstream tooling and tests, so it is
//! kept byte-stable:
//!
//! ```text
//! Candidate version sources (in priority order):
//!   buildpack.yml -> "3.9.1"
//!   <unknown>     -> ""
//!
//! Selected CPython version (using buildpack.yml): 3.9.1
//! ```

use crate::resolve::ResolvedRequest;

/// Header line preceding the candidate list
pub const CANDIDATES_HEADER: &str = "Candidate version sources (in priority order):";

/// One line per candidate, names left-aligned to the widest name
pub fn candidate_lines(request: &ResolvedRequest) -> Vec<String> {
    let width = request
        .candidates
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);

    request
        .candidates
        .iter()
        .map(|c| format!("{:<width$} -> \"{}\"", c.name, c.requested_value))
        .collect()
}

/// The trailing selection line; `selected_version` is the matched version
pub fn selected_line(
    display_name: &str,
    request: &ResolvedRequest,
    selected_version: &str,
) -> String {
    format!(
        "Selected {} version (using {}): {}",
        display_name, request.chosen_source, selected_version
    )
}

/// Full report without indentation
pub fn render(display_name: &str, request: &ResolvedRequest, selected_version: &str) -> String {
    let mut out = String::from(CANDIDATES_HEADER);
    out.push('\n');
    for line in candidate_lines(request) {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&selected_line(display_name, request, selected_version));
    out.push('\n');
    out
}
