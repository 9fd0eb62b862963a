//! Path Safety (C12): sanitize every user-supplied filename, and confirm
//! every resolved read path is strictly contained within its artifact
//! directory before touching the filesystem.

use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 255;

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-')
}

/// Sanitize a user-supplied filename per spec.md §4.3 step 2.
///
/// Strips path components and `..`, keeps only `[A-Za-z0-9 _.-]`, enforces
/// a length cap, and requires an extension. Falls back to a deterministic
/// `<short-id><ext>` name when the input cannot be made safe.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let base = Path::new(raw)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned: String = base
        .replace("..", "")
        .chars()
        .filter(|c| is_allowed_char(*c))
        .collect();

    let cleaned = cleaned.trim().to_string();
    let ext = Path::new(&cleaned)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"));

    let valid = !cleaned.is_empty()
        && cleaned.len() <= MAX_FILENAME_LEN
        && ext.is_some()
        && cleaned != *ext.as_ref().unwrap();

    if valid {
        cleaned
    } else {
        let fallback_ext = ext.unwrap_or_else(|| ".bin".to_string());
        let short_id = &Uuid::new_v4().simple().to_string()[..8];
        format!("{short_id}{fallback_ext}")
    }
}

/// Idempotence: `sanitize(sanitize(x)) == sanitize(x)` for any `x` that
/// survives the first pass untouched (spec.md §8).
#[must_use]
pub fn sanitize_is_stable(raw: &str) -> bool {
    let once = sanitize_filename(raw);
    sanitize_filename(&once) == once
}

/// Resolve `file_name` against `base_dir` and confirm the canonicalized
/// result has not escaped `base_dir`. Returns `None` on escape or when the
/// file does not exist — callers surface both as 404 to avoid information
/// leakage (spec.md §4.12).
pub fn resolve_within(base_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let candidate = base_dir.join(file_name);
    let canonical_base = base_dir.canonicalize().ok()?;
    let canonical_candidate = candidate.canonicalize().ok()?;
    if canonical_candidate.starts_with(&canonical_base) {
        Some(canonical_candidate)
    } else {
        None
    }
}
