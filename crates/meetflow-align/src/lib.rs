//! Alignment Engine (C5): a pure function merging ASR segments with
//! diarization turns into speaker-attributed segments. No I/O, no async —
//! grounded exactly on `original_source/backend/services/alignment_service.py`.

use meetflow_store::{AsrSegment, SpeakerTurn};
use serde::{Deserialize, Serialize};

/// Sentinel speaker label used when no diarization turn overlaps a segment.
pub const NO_SPEAKER_SENTINEL: &str = "SPEAKER_00";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSegment {
    pub speaker: String,
    pub text: String,
    pub start: String,
    pub end: String,
}

fn overlap(s_start: f64, s_end: f64, t_start: f64, t_end: f64) -> f64 {
    (s_end.min(t_end) - s_start.max(t_start)).max(0.0)
}

/// Attribute each ASR segment to the speaker turn it overlaps most.
///
/// Both inputs are assumed time-ordered, as the Stage Executor produces
/// them. Output preserves ASR order; diarization turns are a label source
/// only and never reorder segments. Ties on overlap duration are broken by
/// the earliest `t_start`. `start`/`end` are formatted with two decimal
/// places, matching the source's `f"{seg_start:.2f}"`.
#[must_use]
pub fn align(asr_segments: &[AsrSegment], speaker_turns: &[SpeakerTurn]) -> Vec<AlignedSegment> {
    asr_segments
        .iter()
        .map(|segment| {
            let speaker = best_speaker(segment, speaker_turns);
            AlignedSegment {
                speaker,
                text: segment.text.trim().to_string(),
                start: format!("{:.2}", segment.start),
                end: format!("{:.2}", segment.end),
            }
        })
        .collect()
}

fn best_speaker(segment: &AsrSegment, turns: &[SpeakerTurn]) -> String {
    let mut best: Option<(&SpeakerTurn, f64)> = None;
    for turn in turns {
        let overlap_secs = overlap(segment.start, segment.end, turn.start, turn.end);
        if overlap_secs <= 0.0 {
            continue;
        }
        match best {
            None => best = Some((turn, overlap_secs)),
            Some((current_turn, current_overlap)) => {
                let better = overlap_secs > current_overlap
                    || (overlap_secs == current_overlap && turn.start < current_turn.start);
                if better {
                    best = Some((turn, overlap_secs));
                }
            }
        }
    }
    best.map(|(turn, _)| turn.speaker_label.clone())
        .unwrap_or_else(|| NO_SPEAKER_SENTINEL.to_string())
}

/// Map a diarizer label `SPEAKER_<nn>` to the display form `Speaker N`
/// (N = nn + 1), unless `overrides` has a user-supplied rename for it
/// (spec.md §4.7/§4.5).
#[must_use]
pub fn display_speaker(label: &str, overrides: &std::collections::HashMap<String, String>) -> String {
    if let Some(renamed) = overrides.get(label) {
        return renamed.clone();
    }
    label
        .strip_prefix("SPEAKER_")
        .and_then(|n| n.parse::<u32>().ok())
        .map(|n| format!("Speaker {}", n + 1))
        .unwrap_or_else(|| label.to_string())
}
