//! Listing and pagination constants

/// Size of the top-ranked company list
pub const TOP_COMPANIES_LIMIT: usize = 20;

/// Page echoed when the caller does not ask for one
pub const DEFAULT_PAGE: u32 = 1;

/// Limit echoed when the caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size the listing endpoints accept
pub const MAX_LIMIT: u32 = 100;

/// Scores are normalised to 0..=100
pub const MAX_SCORE: f64 = 100.0;
