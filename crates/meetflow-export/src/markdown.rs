//! Hand-rolled Markdown rendering, a direct port of
//! `original_source/backend/utils/markdown_generator.py` — no templating
//! crate needed for this, matching the source.

use crate::filenames::format_timestamp;
use chrono::{DateTime, Utc};
use meetflow_align::{display_speaker, AlignedSegment};
use std::collections::HashMap;

fn render_body(meeting_title: &str, generated_on: DateTime<Utc>, summary: Option<&str>, segments: &[AlignedSegment]) -> String {
    let mut out = format!("# {meeting_title}\n\n");
    out.push_str(&format!("*Generated on {}*\n\n", generated_on.format("%B %d, %Y at %I:%M %p")));

    if let Some(summary) = summary {
        out.push_str(&format!("## Summary\n\n{summary}\n\n"));
    }

    out.push_str("## Transcript\n\n");
    let overrides = HashMap::new();
    for segment in segments {
        let speaker = display_speaker(&segment.speaker, &overrides);
        let start = format_timestamp(&segment.start);
        let end = format_timestamp(&segment.end);
        out.push_str(&format!("**{speaker}** *({start} - {end})*: {}\n\n", segment.text));
    }
    out
}

#[must_use]
pub fn generate_summary_markdown(
    meeting_title: &str,
    summary: &str,
    segments: &[AlignedSegment],
    generated_on: DateTime<Utc>,
) -> Vec<u8> {
    render_body(meeting_title, generated_on, Some(summary), segments).into_bytes()
}

#[must_use]
pub fn generate_transcript_markdown(
    meeting_title: &str,
    segments: &[AlignedSegment],
    generated_on: DateTime<Utc>,
) -> Vec<u8> {
    render_body(meeting_title, generated_on, None, segments).into_bytes()
}
