//! Triage Core Library
//!
//! Client-side orchestration for partner triage: reviewing companies
//! ranked from job listings, drafting and reviewing outreach letters
//! and sending them. Talks to the REST backend or to an in-memory
//! stand-in through the same transport seam.

pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod services;
pub mod store;
pub mod validation;
pub mod workflow;

// Re-export main types for easy access
pub use config::{DataSource, TriageConfig};
pub use error::{Result, TriageError};

pub use clients::{ApiRequest, HttpTransport, InMemoryTransport, Operation, Transport};
pub use services::{ComposedLetter, LetterComposer};
pub use store::{FixtureSet, InMemoryStore};
pub use workflow::{SendOptions, TriageClient};

use std::sync::Arc;
use std::time::Duration;

/// Build the transport selected by the configuration
pub fn transport_from_config(config: &TriageConfig) -> Result<Arc<dyn Transport>> {
    match config.data_source {
        DataSource::Remote => {
            log::info!("Using REST backend at {}", config.api.base_url);
            Ok(Arc::new(HttpTransport::new(&config.api)?))
        }
        DataSource::Mock => {
            let composer = LetterComposer::new(config.sender.clone());
            let store = match &config.mock.fixtures_path {
                Some(path) => InMemoryStore::from_fixture_file(path, composer)?,
                None => InMemoryStore::seeded(composer)?,
            };

            log::info!("Using in-memory backend");
            Ok(Arc::new(
                InMemoryTransport::new(Arc::new(store))
                    .with_latency(Duration::from_millis(config.mock.latency_ms)),
            ))
        }
    }
}
