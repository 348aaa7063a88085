//! Branch set handling
//!
//! Branch listings come back from the platform unordered and possibly with
//! blank lines. Everything downstream works on the normalized form: sorted
//! ascending, deduplicated, no empty names.

use std::collections::BTreeSet;

/// Normalize raw branch names into a sorted, duplicate-free list
pub fn normalize_branches<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse newline-delimited `gh` output into a normalized branch list
pub fn parse_branch_list(output: &str) -> Vec<String> {
    normalize_branches(output.lines())
}

/// Branches present in the fork but missing upstream, in sorted order
pub fn removed_branches(fork: &[String], upstream: &[String]) -> Vec<String> {
    let upstream: BTreeSet<&str> = upstream.iter().map(String::as_str).collect();

    normalize_branches(
        fork.iter()
            .map(String::as_str)
            .filter(|branch| !upstream.contains(branch)),
    )
}
