//! Provider data shared with resources and data sources

use std::sync::{Arc, OnceLock};

use crate::api::Client;

#[derive(Clone)]
pub struct ProviderData {
    pub client: Client,
}

impl ProviderData {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Resources and data sources are registered before the provider is
/// configured, so each holds this shared cell and resolves the client at
/// operation time.
pub type SharedProviderData = Arc<OnceLock<ProviderData>>;
