//! Download filename generation, grounded on
//! `original_source/backend/utils/formatters.py::generate_professional_filename`.

use chrono::{DateTime, Utc};
use meetflow_store::ExportType;

const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "mp4", "m4a", "flac", "webm"];

fn strip_audio_extension(title: &str) -> &str {
    for ext in AUDIO_EXTENSIONS {
        let suffix = format!(".{ext}");
        if title.len() > suffix.len() && title.to_lowercase().ends_with(&suffix) {
            return &title[..title.len() - suffix.len()];
        }
    }
    title
}

fn slugify(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !"<>:\"/\\|?*".contains(*c))
        .collect();
    let hyphenated = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let trimmed = hyphenated.trim_matches('-');
    let truncated: String = trimmed.chars().take(50).collect();
    truncated.to_lowercase()
}

/// Build `<slug>_summary_<date>.<ext>` (or `_transcript_` for transcript
/// exports), matching the source's suffix and truncation rules.
#[must_use]
pub fn generate_professional_filename(
    meeting_title: &str,
    export_type: ExportType,
    generated_at: DateTime<Utc>,
) -> String {
    let stripped = strip_audio_extension(meeting_title);
    let slug = slugify(stripped);
    let slug = if slug.is_empty() { "meeting".to_string() } else { slug };

    let suffix = if export_type.includes_summary() { "summary" } else { "transcript" };
    let date_str = generated_at.format("%Y-%m-%d");
    format!("{slug}_{suffix}_{date_str}.{}", export_type.extension())
}

/// `MM:SS` rendering of a fractional-seconds string, matching
/// `format_timestamp`. Malformed input degrades to `"0:00"`.
#[must_use]
pub fn format_timestamp(seconds_str: &str) -> String {
    let seconds: f64 = match seconds_str.parse() {
        Ok(s) => s,
        Err(_) => return "0:00".to_string(),
    };
    let total_seconds = seconds.max(0.0) as u64;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{minutes}:{secs:02}")
}
