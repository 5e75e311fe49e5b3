use services::{AppServices, Clock};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
    pub clock: Clock,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices, clock: Clock) -> Self {
        Self { services, clock }
    }
}
