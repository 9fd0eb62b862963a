//! Summary Service (C8): LLM-backed summarization and speaker
//! identification with filesystem summary caching.

pub mod cache;
pub mod client;
pub mod summary;

pub use cache::{delete_summary, get_cached_summary, save_summary};
pub use client::LlmClient;
pub use summary::{format_transcript_for_llm, identify_speakers, summarize, SpeakerIdentificationOutcome};
