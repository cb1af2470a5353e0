//! Service modules for business logic

pub mod company_query;
pub mod letter_composer;

// Re-export service types
pub use letter_composer::{ComposedLetter, LetterComposer};
