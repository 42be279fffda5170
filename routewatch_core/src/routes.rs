//! Route-set extraction from router filter text.
//!
//! Parsing is split into two stages that both feed the same set:
//! - [`scan_cidr_tokens`] finds every `address/length` token in a line
//! - [`vendor_prefix`] handles the `ip prefix <addr>/<len>` line form
//!
//! Comment (`#`) and definition (`define`) lines are skipped before either
//! stage runs.

use std::collections::btree_set::{self, BTreeSet};

const COMMENT_MARKER: char = '#';
const DEFINE_KEYWORD: &str = "define";
const VENDOR_KEYWORDS: [&str; 2] = ["ip", "prefix"];

/// Canonical, deduplicated set of CIDR prefixes extracted from one text.
///
/// Prefixes are kept verbatim; no address validation is performed. Iteration
/// is in ascending lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSet {
    prefixes: BTreeSet<String>,
}

impl RouteSet {
    /// Extract every prefix from `text`. Never fails.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut set = Self::default();
        for line in text.lines() {
            set.extend_from_line(line);
        }
        set
    }

    fn extend_from_line(&mut self, line: &str) {
        let line = line.trim();
        if is_skipped(line) {
            return;
        }

        for token in scan_cidr_tokens(line) {
            self.insert(token);
        }
        if let Some(token) = vendor_prefix(line) {
            self.insert(token);
        }
    }

    /// Insert a prefix, returning `false` when it was already present.
    pub fn insert(&mut self, prefix: impl Into<String>) -> bool {
        self.prefixes.insert(prefix.into())
    }

    /// Number of distinct prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no prefix was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Whether `prefix` is a member of the set.
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }

    /// Iterate prefixes in ascending order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.prefixes.iter()
    }

    /// Prefixes in `self` but not in `other`, ascending.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Vec<String> {
        self.prefixes.difference(&other.prefixes).cloned().collect()
    }

    /// Prefixes in both sets, ascending.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Vec<String> {
        self.prefixes
            .intersection(&other.prefixes)
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a RouteSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for RouteSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            prefixes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with(COMMENT_MARKER) || line.starts_with(DEFINE_KEYWORD)
}

const fn is_address_byte(byte: u8) -> bool {
    byte.is_ascii_hexdigit() || byte == b':' || byte == b'.'
}

/// Find every maximal `[0-9a-fA-F:.]+/[0-9]+` token in `line`, left to right
/// and without overlap.
pub fn scan_cidr_tokens(line: &str) -> CidrTokens<'_> {
    CidrTokens { line, pos: 0 }
}

/// Iterator returned by [`scan_cidr_tokens`].
#[derive(Debug, Clone)]
pub struct CidrTokens<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Iterator for CidrTokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.line.as_bytes();
        while self.pos < bytes.len() {
            if !is_address_byte(bytes[self.pos]) {
                self.pos += 1;
                continue;
            }

            let start = self.pos;
            let mut slash = start;
            while slash < bytes.len() && is_address_byte(bytes[slash]) {
                slash += 1;
            }

            let mut end = slash + 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }

            if slash < bytes.len() && bytes[slash] == b'/' && end > slash + 1 {
                self.pos = end;
                return Some(&self.line[start..end]);
            }

            // No token can start anywhere inside this run of address bytes.
            self.pos = slash.max(start + 1);
        }
        None
    }
}

/// Third token of an `ip prefix <addr>/<len> ...` line.
///
/// The token is only accepted when it is itself a complete CIDR token, so
/// this stage never yields anything the scan stage would not also yield.
#[must_use]
pub fn vendor_prefix(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != VENDOR_KEYWORDS[0] || tokens.next()? != VENDOR_KEYWORDS[1] {
        return None;
    }
    let candidate = tokens.next()?;
    let mut scanned = scan_cidr_tokens(candidate);
    match (scanned.next(), scanned.next()) {
        (Some(token), None) if token.len() == candidate.len() => Some(candidate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefixes(set: &RouteSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn mixed_syntax_yields_both_families() {
        let text = "ip prefix 10.0.0.0/8\n# comment\ndefine FOO\n2001:db8::/32 accept\n";
        let set = RouteSet::parse(text);
        assert_eq!(prefixes(&set), vec!["10.0.0.0/8", "2001:db8::/32"]);
    }

    #[test]
    fn bird_prefix_list_output() {
        let text = "define AS215172 = [\n    \
                    192.0.2.0/24,\n    \
                    198.51.100.0/22{22,24},\n    \
                    2001:db8:1000::/36\n];\n";
        let set = RouteSet::parse(text);
        assert_eq!(
            prefixes(&set),
            vec!["192.0.2.0/24", "198.51.100.0/22", "2001:db8:1000::/36"]
        );
    }

    #[test]
    fn empty_input_yields_empty_set() {
        assert!(RouteSet::parse("").is_empty());
        assert!(RouteSet::parse("\n\n   \n").is_empty());
    }

    #[test]
    fn comment_and_define_lines_are_skipped_even_with_prefixes() {
        let text = "# was 10.0.0.0/8\n  define X 10.1.0.0/16\n";
        assert!(RouteSet::parse(text).is_empty());
    }

    #[test]
    fn duplicates_across_lines_collapse() {
        let text = "10.0.0.0/8\nip prefix 10.0.0.0/8\n  10.0.0.0/8,\n";
        let set = RouteSet::parse(text);
        assert_eq!(set.len(), 1);
        assert!(set.contains("10.0.0.0/8"));
    }

    #[test]
    fn every_token_on_a_line_is_collected() {
        let set = RouteSet::parse("permit 10.0.0.0/8 and 10.1.0.0/16 or fe80::/10");
        assert_eq!(
            prefixes(&set),
            vec!["10.0.0.0/8", "10.1.0.0/16", "fe80::/10"]
        );
    }

    #[test]
    fn malformed_length_is_excluded() {
        let set = RouteSet::parse("10.0.0.0/ab\n10.2.0.0/\n/24\n10.3.0.0/24");
        assert_eq!(prefixes(&set), vec!["10.3.0.0/24"]);
    }

    #[test]
    fn scan_is_maximal_and_non_overlapping() {
        let tokens: Vec<_> = scan_cidr_tokens("x10.0.0.0/8/16 zz 1.2.3.4/32").collect();
        assert_eq!(tokens, vec!["10.0.0.0/8", "1.2.3.4/32"]);
    }

    #[test]
    fn scan_handles_non_ascii_text() {
        let tokens: Vec<_> = scan_cidr_tokens("路由 10.0.0.0/8 — 前缀").collect();
        assert_eq!(tokens, vec!["10.0.0.0/8"]);
    }

    #[test]
    fn vendor_prefix_requires_exact_keywords() {
        assert_eq!(vendor_prefix("ip prefix 10.0.0.0/8"), Some("10.0.0.0/8"));
        assert_eq!(vendor_prefix("ip  prefix\t2001:db8::/32 le 48"), Some("2001:db8::/32"));
        assert_eq!(vendor_prefix("ip prefix-list NAME permit 10.0.0.0/8"), None);
        assert_eq!(vendor_prefix("ip prefix"), None);
    }

    #[test]
    fn vendor_prefix_rejects_partial_tokens() {
        assert_eq!(vendor_prefix("ip prefix 10.0.0.0/8,"), None);
        assert_eq!(vendor_prefix("ip prefix LIST"), None);
    }

    #[test]
    fn set_operations_are_sorted() {
        let old: RouteSet = ["10.1.0.0/16", "10.0.0.0/8"].into_iter().collect();
        let new: RouteSet = ["10.2.0.0/16", "10.1.0.0/16"].into_iter().collect();
        assert_eq!(new.difference(&old), vec!["10.2.0.0/16".to_string()]);
        assert_eq!(old.difference(&new), vec!["10.0.0.0/8".to_string()]);
        assert_eq!(old.intersection(&new), vec!["10.1.0.0/16".to_string()]);
    }
}
