use skybook_booking::FlowRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically drop booking flows nobody has touched for `max_idle`.
pub async fn start_flow_cleanup(flows: Arc<Mutex<FlowRegistry>>, every: Duration, max_idle: chrono::Duration) {
    let every = if every < MIN_CLEANUP_INTERVAL {
        warn!("Flow cleanup interval {:?} too short, using {:?}", every, MIN_CLEANUP_INTERVAL);
        MIN_CLEANUP_INTERVAL
    } else {
        every
    };
    info!("Flow cleanup worker started (every {:?}, idle limit {})", every, max_idle);
    let mut ticker = interval(every);

    loop {
        ticker.tick().await;
        let removed = flows.lock().await.cleanup_idle(max_idle);
        if removed > 0 {
            info!("Cleaned up {} idle booking flow(s)", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cleanup_removes_expired_flows() {
        let flows = Arc::new(Mutex::new(FlowRegistry::new()));
        flows.lock().await.create();

        let handle = tokio::spawn(start_flow_cleanup(
            flows.clone(),
            Duration::from_secs(60),
            chrono::Duration::minutes(-1),
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(flows.lock().await.is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn test_zero_interval_keeps_worker_alive() {
        let flows = Arc::new(Mutex::new(FlowRegistry::new()));
        flows.lock().await.create();

        let handle = tokio::spawn(start_flow_cleanup(
            flows.clone(),
            Duration::ZERO,
            chrono::Duration::minutes(30),
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        assert_eq!(flows.lock().await.len(), 1);
        handle.abort();
    }
}
