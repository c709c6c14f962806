use crate::calendar::Clock;
use crate::service::HabitService;
use crate::storage::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub habits: HabitService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Clock) -> Self {
        Self {
            habits: HabitService::new(store, clock),
        }
    }
}
