//! Filename codec for draft artifacts
//!
//! Every draft is one Markdown file named `<sequence_key>_<id>_<slug>.md`.
//! The sequence key is a fixed-width UTC timestamp, so lexicographic order
//! over names equals chronological order; the id is the draft's stable key;
//! the slug is free text for human discoverability. This module is the only
//! place that constructs or picks apart those names; the rest of the crate
//! handles a typed [`DraftId`].

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RelayError, Result};
use crate::types::DraftId;

/// File extension for draft artifacts
pub const ARTIFACT_EXT: &str = "md";

/// Field separator inside artifact names
pub const SEPARATOR: char = '_';

/// Matches exactly one draft id rendering: 32 lowercase hex characters
fn hex_id_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("Valid hex id regex"));
    &PATTERN
}

/// Sequence key for the current instant
///
/// Fixed-width UTC timestamp with millisecond precision, e.g.
/// `20260822T141530.123Z`. Two drafts created in the same millisecond would
/// collide; collisions are surfaced as [`RelayError::AmbiguousLatest`] at
/// resolution time rather than tie-broken.
pub fn sequence_key_now() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Sortable sequence-key prefix of an artifact name
pub fn sequence_key_of(name: &str) -> &str {
    name.split(SEPARATOR).next().unwrap_or(name)
}

/// Build an artifact name from its parts
///
/// Fails with [`RelayError::InvalidSlug`] if the slug contains the field
/// separator, or if the slug is itself exactly a 32-hex token; such a name
/// could not be decoded unambiguously. The sequence key is expected to come
/// from [`sequence_key_now`] and must not contain the separator.
pub fn encode(sequence_key: &str, id: DraftId, slug: &str) -> Result<String> {
    debug_assert!(!sequence_key.contains(SEPARATOR));

    if slug.contains(SEPARATOR) {
        return Err(RelayError::InvalidSlug(format!(
            "'{}' contains the field separator '{}'",
            slug, SEPARATOR
        )));
    }
    if hex_id_pattern().is_match(slug) {
        return Err(RelayError::InvalidSlug(format!(
            "'{}' is indistinguishable from a draft id",
            slug
        )));
    }

    Ok(format!(
        "{}{}{}{}{}.{}",
        sequence_key, SEPARATOR, id, SEPARATOR, slug, ARTIFACT_EXT
    ))
}

/// Extract the draft id embedded in an artifact name
///
/// Extraction rule, fixed deliberately: strip the extension, split the stem
/// on `_`, exclude the first field (the sequence-key prefix), and take the
/// last remaining field that is exactly 32 lowercase hex characters. Names
/// produced by [`encode`] always decode to the id they were built from;
/// anything without such a field fails with [`RelayError::MalformedName`].
pub fn decode(name: &str) -> Result<DraftId> {
    let stem = std::path::Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let fields: Vec<&str> = stem.split(SEPARATOR).collect();
    if fields.len() < 2 {
        return Err(RelayError::MalformedName(format!(
            "'{}' has no separated id field",
            name
        )));
    }

    let hex = fields[1..]
        .iter()
        .rev()
        .find(|field| hex_id_pattern().is_match(field))
        .ok_or_else(|| {
            RelayError::MalformedName(format!("'{}' contains no 32-hex id field", name))
        })?;

    let id = DraftId::from_string(hex)?;
    Ok(id)
}
