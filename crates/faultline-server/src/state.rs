use std::sync::Arc;

use faultline_config::ErrorPolicyConfig;
use faultline_core::{Catalog, Translator};

/// Shared state for API handlers and the error boundary
#[derive(Clone)]
pub(crate) struct AppState {
    pub catalog: Arc<Catalog>,
    pub translator: Arc<Translator>,
    pub policy: ErrorPolicyConfig,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, policy: ErrorPolicyConfig) -> Self {
        let translator = Arc::new(catalog.translator());
        Self {
            catalog,
            translator,
            policy,
        }
    }
}
