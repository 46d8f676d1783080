/**
 * Server Initialization
 *
 * Builds the storage collaborators from the configuration, assembles the
 * application state and hands it to the router.
 *
 * # Initialization Process
 *
 * 1. Create the rendition cache directory
 * 2. Load the shares manifest, if one is configured
 * 3. Create the document store
 * 4. Create app state and router
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::document::{LocalDocumentStore, ShareRegistry};
use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::shared::GatewayConfig;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the cache directory cannot be created or the shares manifest
/// cannot be read or parsed.
pub async fn create_app(config: GatewayConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("Initializing xfdocs gateway");

    // Step 1: Rendition cache
    tokio::fs::create_dir_all(&config.cache_dir).await?;

    // Step 2: Share tokens
    let shares = match &config.shares_manifest {
        Some(manifest) => ShareRegistry::load(config.storage_root.clone(), manifest).await?,
        None => {
            tracing::warn!(
                "No shares manifest configured. No document can be opened until tokens are issued."
            );
            ShareRegistry::new(config.storage_root.clone())
        }
    };

    // Step 3: Document store
    if config.converter.is_none() {
        tracing::warn!(
            "No converter configured. Documents are served in their stored format only."
        );
    }
    let store = LocalDocumentStore::new(config.cache_dir.clone(), config.converter.clone());

    // Step 4: State and router
    let app_state = AppState::new(config, Arc::new(shares), Arc::new(store));
    let app = create_router(app_state);

    tracing::info!("Router configured");
    Ok(app)
}
