use exponentiator::Exponentiator;
use tokio::sync::Mutex;

/// Shared application state for the trigger server.
pub struct AppState {
    /// Locked for the whole of a request so two POSTs never overlap cycles.
    pub exponentiator: Mutex<Exponentiator>,
    pub service_name: String,
}

impl AppState {
    pub fn new(exponentiator: Exponentiator) -> Self {
        let service_name = exponentiator.service_name().to_string();
        Self {
            exponentiator: Mutex::new(exponentiator),
            service_name,
        }
    }
}
