use std::sync::Arc;

use lib_gps::MarkerCache;

#[derive(Clone)]
pub struct AppState {
    // Written by the refresh loop, read by the handlers
    pub cache: Arc<MarkerCache>,
}

impl AppState {
    pub fn new(cache: Arc<MarkerCache>) -> Self {
        Self { cache }
    }
}
