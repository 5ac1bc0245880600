use crate::config::Config;
use crate::database::DatabaseManager;
use crate::event_store::PostgresEventStore;
use std::sync::Arc;

/// 핸들러 공유 상태
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub event_store: Arc<PostgresEventStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseManager>,
        event_store: Arc<PostgresEventStore>,
        config: Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            event_store,
            config,
        })
    }
}
