//! URL slug derivation.
//!
//! # Invariants
//! - Slugs only contain `a-z`, `0-9` and single inner hyphens.
//! - `slugify` is idempotent: `slugify(slugify(x)) == slugify(x)`.
//! - Non-ASCII letters are transliterated, not dropped.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Upper bound on numeric suffixes tried by [`disambiguate`].
const MAX_SUFFIX: u32 = 10_000;

/// Derives a URL-safe slug from a human readable name.
///
/// `"2005 to 2010 Labour government"` becomes `"2005-to-2010-labour-government"`
/// and `"Élysée"` becomes `"elysee"`. Returns an empty string when nothing
/// alphanumeric survives transliteration.
pub fn slugify(name: &str) -> String {
    let lowered = deunicode(name.trim()).to_lowercase();
    NON_SLUG_RUN_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Returns whether `value` is already a well-formed slug.
pub fn is_url_safe(value: &str) -> bool {
    SLUG_RE.is_match(value)
}

/// Picks the first free slug among `base`, `base-2`, `base-3`, ...
///
/// `is_taken` is consulted for each candidate. Returns `None` only when every
/// candidate up to the suffix limit is taken.
pub fn disambiguate<E>(
    base: &str,
    mut is_taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<Option<String>, E> {
    if !is_taken(base)? {
        return Ok(Some(base.to_string()));
    }
    for suffix in 2..=MAX_SUFFIX {
        let candidate = format!("{base}-{suffix}");
        if !is_taken(&candidate)? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
