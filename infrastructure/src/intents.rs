//! Intent catalog loading
//!
//! The built-in catalog can be replaced by a JSON file: an array of
//! `{"intent": "...", "description": "...", "example_prompts": [...]}`.

use std::path::Path;
use switchboard_domain::IntentCatalog;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum IntentCatalogError {
    #[error("Cannot read intent catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid intent catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Intent catalog {0} defines no intents")]
    Empty(String),
}

/// The configured catalog, or the built-in one when no file is set.
pub fn load_intent_catalog(path: Option<&Path>) -> Result<IntentCatalog, IntentCatalogError> {
    let Some(path) = path else {
        return Ok(IntentCatalog::default());
    };
    let display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|source| IntentCatalogError::Read {
        path: display.clone(),
        source,
    })?;
    let catalog: IntentCatalog =
        serde_json::from_str(&raw).map_err(|source| IntentCatalogError::Parse {
            path: display.clone(),
            source,
        })?;

    if catalog.definitions().is_empty() {
        return Err(IntentCatalogError::Empty(display));
    }
    info!("Loaded {} intents from {}", catalog.definitions().len(), path.display());
    Ok(catalog)
}
