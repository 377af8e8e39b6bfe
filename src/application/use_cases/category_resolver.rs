//! Keyword category resolution
//!
//! Categories are short product-line tokens ("host", "case", "tape", ...).
//! They come from two places: a fixed seed list, and ASIN headers of the
//! survey whose prefix names the category, e.g. `host/宿主 ASIN精准`
//! contributes `host` and `宿主`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

static SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\-_\s.]+").unwrap());

/// Headers carrying one of these are negative columns and never name a category
const NEGATION_MARKERS: &[&str] = &["否定", "negative"];

/// Trailing qualifiers stripped from a header before its prefix is split.
/// Longer spellings come first so `精准词` is not cut down to `词`.
const QUALIFIER_SUFFIXES: &[&str] = &[
    "exact-keywords",
    "broad-keywords",
    "精准词",
    "广泛词",
    "exact",
    "broad",
    "精准",
    "广泛",
    "asin",
];

const SEPARATOR_CHARS: &[char] = &['/', '-', '_', ' ', '.'];

pub struct CategoryResolver<'a> {
    seeds: &'a [String],
    min_len: usize,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(seeds: &'a [String], min_len: usize) -> Self {
        Self { seeds, min_len }
    }

    /// Resolve the lower-cased, deduplicated category set for one survey
    pub fn resolve(&self, headers: &[String]) -> BTreeSet<String> {
        let mut categories = BTreeSet::new();

        for header in headers {
            for fragment in self.categories_from_header(header) {
                debug!(header = %header, category = %fragment, "Category from header");
                categories.insert(fragment);
            }
        }

        categories.extend(
            self.seeds
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        );

        info!(categories = ?categories, "Resolved keyword categories");
        categories
    }

    /// Category fragments named by one header (empty for non-ASIN headers)
    pub fn categories_from_header(&self, header: &str) -> Vec<String> {
        let lower = header.trim().to_lowercase();
        if !lower.contains("asin") || NEGATION_MARKERS.iter().any(|m| lower.contains(m)) {
            return Vec::new();
        }

        let Some(prefix) = strip_qualifiers(&lower) else {
            return Vec::new();
        };

        SEPARATOR_PATTERN
            .split(prefix)
            .map(str::trim)
            .filter(|f| f.chars().count() >= self.min_len)
            .filter(|f| !QUALIFIER_SUFFIXES.contains(f))
            .map(str::to_string)
            .collect()
    }
}

/// Repeatedly strip trailing qualifiers; `None` if the header ends in none of them
fn strip_qualifiers(lower: &str) -> Option<&str> {
    let mut rest = lower.trim_end_matches(SEPARATOR_CHARS);
    let mut stripped = false;

    'outer: loop {
        for suffix in QUALIFIER_SUFFIXES {
            if let Some(prefix) = rest.strip_suffix(suffix) {
                rest = prefix.trim_end_matches(SEPARATOR_CHARS);
                stripped = true;
                continue 'outer;
            }
        }
        break;
    }

    if stripped && !rest.is_empty() {
        Some(rest)
    } else {
        None
    }
}
