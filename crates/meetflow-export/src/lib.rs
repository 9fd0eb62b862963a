//! Export Subsystem (C9): a parallel state machine producing downloadable
//! Markdown/PDF bytes from a completed job's canonical transcript and
//! cached (or freshly generated) summary.

pub mod filenames;
pub mod generator;
pub mod markdown;
pub mod pdf;

pub use filenames::generate_professional_filename;
pub use generator::{create_export, download_filename, run_export};
