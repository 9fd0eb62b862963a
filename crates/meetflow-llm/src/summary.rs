//! Summarization and speaker identification (C8), prompts and thresholds
//! grounded verbatim on
//! `original_source/backend/services/summary_service.py`.

use crate::client::LlmClient;
use meetflow_error::AppResult;
use std::collections::{HashMap, HashSet};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes meeting transcripts. \
You will give a concise summary of the key points, decisions made, \
and any action items, outputting it in markdown format. \
IMPORTANT: Always use the exact speaker names provided in the transcript. \
Never change, substitute, or invent different names for speakers. \
CRITICAL: Only summarize what is actually present in the transcript. \
Do not invent or hallucinate content, participants, decisions, or action items.";

const DEFAULT_USER_PROMPT_PREFIX: &str = "Analyze the following transcript and provide an appropriate summary. \
Use exact speaker names as they appear. \
Only include sections that have actual content from the transcript. \
Use markdown format without code blocks.\n\n";

const IDENTIFY_SYSTEM_PROMPT: &str = "You are a helpful assistant that identifies speakers in meeting transcripts. \
Based on the conversation content, suggest likely names or roles for each speaker. \
Return ONLY a JSON object mapping speaker labels to suggested names.";

const SUMMARIZE_TEMPERATURE: f32 = 0.3;
const SUMMARIZE_MAX_TOKENS: u32 = 5000;
const IDENTIFY_TEMPERATURE: f32 = 0.1;
const IDENTIFY_MAX_TOKENS: u32 = 500;

/// Outcome of speaker identification: the service degrades to a structured
/// error rather than raising, since a malformed LLM response is expected
/// traffic, not a bug.
pub enum SpeakerIdentificationOutcome {
    Suggestions(HashMap<String, String>),
    ParseError(String),
}

fn unique_word_count(words: &[&str]) -> usize {
    words
        .iter()
        .map(|w| w.to_lowercase().trim_matches(|c: char| ".,!?;:".contains(c)).to_string())
        .collect::<HashSet<_>>()
        .len()
}

/// Summarize `transcript`, short-circuiting degenerate input (fewer than 10
/// words, or fewer than 5 unique case-folded punctuation-stripped tokens)
/// without calling the LLM.
pub async fn summarize(
    client: &LlmClient,
    transcript: &str,
    custom_prompt: Option<&str>,
    system_prompt: Option<&str>,
) -> AppResult<String> {
    let trimmed = transcript.trim();
    if trimmed.is_empty() {
        return Ok(
            "# No Content Available\n\nThe recording appears to be empty or could not be transcribed."
                .to_string(),
        );
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 10 || unique_word_count(&words) < 5 {
        let spoken_content = words.join(" ");
        return Ok(format!(
            "# Brief Recording Summary\n\n\
             ## Content\n\
             This appears to be a very short recording with limited content.\n\n\
             **Transcribed content:** \"{spoken_content}\"\n\n\
             ## Note\n\
             The recording was too brief to generate a detailed meeting summary."
        ));
    }

    let final_system_prompt = system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let final_user_prompt = match custom_prompt {
        Some(custom) => format!("{custom}\n\n{trimmed}"),
        None => format!("{DEFAULT_USER_PROMPT_PREFIX}{trimmed}"),
    };

    client
        .chat(final_system_prompt, &final_user_prompt, SUMMARIZE_TEMPERATURE, SUMMARIZE_MAX_TOKENS)
        .await
}

/// Suggest display names for diarized speaker labels based on transcript
/// content. Never propagates a parse failure as an error — it is reported
/// as `SpeakerIdentificationOutcome::ParseError` instead.
pub async fn identify_speakers(
    client: &LlmClient,
    transcript: &str,
    context: Option<&str>,
) -> AppResult<SpeakerIdentificationOutcome> {
    let context_text = context
        .map(|c| format!("\nContext: {c}\n\n"))
        .unwrap_or_else(|| "\n\n".to_string());
    let user_prompt = format!(
        "Analyze this transcript and suggest names or roles for each speaker. \
         {context_text}Transcript:\n{transcript}\n\n\
         Return a JSON object like: {{\"SPEAKER_00\": \"John (CEO)\", \"SPEAKER_01\": \"Sarah (CTO)\"}}"
    );

    let content = client
        .chat(IDENTIFY_SYSTEM_PROMPT, &user_prompt, IDENTIFY_TEMPERATURE, IDENTIFY_MAX_TOKENS)
        .await?;

    Ok(match extract_json_object(&content) {
        Ok(value) => SpeakerIdentificationOutcome::Suggestions(value),
        Err(e) => SpeakerIdentificationOutcome::ParseError(format!("speaker identification failed: {e}")),
    })
}

/// JSON-extraction ladder: direct parse, then fenced code block, then the
/// first `{...}` substring.
fn extract_json_object(content: &str) -> Result<HashMap<String, String>, String> {
    if let Ok(value) = serde_json::from_str(content) {
        return Ok(value);
    }

    if let Some(fenced) = extract_fenced(content, "```json") {
        if let Ok(value) = serde_json::from_str(&fenced) {
            return Ok(value);
        }
    }
    if let Some(fenced) = extract_fenced(content, "```") {
        if let Ok(value) = serde_json::from_str(&fenced) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str(&content[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(format!("could not extract a JSON object from response: {content}"))
}

fn extract_fenced(content: &str, marker: &str) -> Option<String> {
    let start = content.find(marker)? + marker.len();
    let rest = &content[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim().to_string())
}

/// Map `SPEAKER_<nn>` labels to `Speaker N` (N = nn + 1) for LLM input,
/// honoring any user rename, skipping segments with empty text, joined with
/// blank lines (spec.md §4.8 transcript formatting).
#[must_use]
pub fn format_transcript_for_llm(
    segments: &[(String, String)],
    overrides: &HashMap<String, String>,
) -> String {
    segments
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(speaker, text)| {
            let display = meetflow_align::display_speaker(speaker, overrides);
            format!("{display}: {text}")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_direct_json() {
        let parsed = extract_json_object(r#"{"SPEAKER_00": "John"}"#).unwrap();
        assert_eq!(parsed.get("SPEAKER_00").unwrap(), "John");
    }

    #[test]
    fn extracts_fenced_json() {
        let content = "Sure, here you go:\n```json\n{\"SPEAKER_00\": \"John\"}\n```";
        let parsed = extract_json_object(content).unwrap();
        assert_eq!(parsed.get("SPEAKER_00").unwrap(), "John");
    }

    #[test]
    fn extracts_first_brace_substring() {
        let content = "The answer is {\"SPEAKER_00\": \"John\"} and that's final.";
        let parsed = extract_json_object(content).unwrap();
        assert_eq!(parsed.get("SPEAKER_00").unwrap(), "John");
    }

    #[test]
    fn reports_error_on_unparsable_content() {
        assert!(extract_json_object("no json here").is_err());
    }

    #[test]
    fn format_transcript_skips_empty_segments() {
        let segments = vec![
            ("SPEAKER_00".to_string(), "hello".to_string()),
            ("SPEAKER_01".to_string(), "   ".to_string()),
        ];
        let out = format_transcript_for_llm(&segments, &HashMap::new());
        assert_eq!(out, "Speaker 1: hello");
    }
}
