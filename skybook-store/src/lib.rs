pub mod app_config;
pub mod file_slot;
pub mod redis_repo;

pub use file_slot::FileSessionSlot;
pub use redis_repo::RedisSessionSlot;

use app_config::{SessionBackend, SessionConfig};
use skybook_core::repository::{InMemorySessionSlot, SessionSlot};
use skybook_core::BoxError;
use std::sync::Arc;

/// Build the session slot selected by `session.backend`.
pub fn open_session_slot(config: &SessionConfig) -> Result<Arc<dyn SessionSlot>, BoxError> {
    let slot: Arc<dyn SessionSlot> = match config.backend {
        SessionBackend::File => Arc::new(FileSessionSlot::new(&config.dir, &config.key)),
        SessionBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or("session.redis_url is required for the redis backend")?;
            Arc::new(RedisSessionSlot::new(url, &config.key, config.ttl_seconds)?)
        }
        SessionBackend::Memory => Arc::new(InMemorySessionSlot::new(config.key.clone())),
    };
    tracing::info!("Session slot '{}' using {:?} backend", config.key, config.backend);
    Ok(slot)
}
