//! Background worker persisting click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::infrastructure::metrics::CLICKS_RECORDED_TOTAL;

const MAX_RETRIES: usize = 3;

/// Drains the click channel until every sender is dropped.
///
/// Each event is written on its own task, at most `concurrency` at a time.
/// Transient (internal) failures are retried with jittered exponential
/// backoff; anything still failing is logged and dropped. Pending writes are
/// awaited before the function returns.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn ClickRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            persist_click(repository, event).await;
            drop(permit);
        });
    }

    // Wait for in-flight writes.
    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Click worker stopped");
}

async fn persist_click(repository: Arc<dyn ClickRepository>, event: ClickEvent) {
    let code = event.short_code.clone();
    let new_click = NewClick {
        short_code: event.short_code,
        ip: event.ip,
        user_agent: event.user_agent,
        referer: event.referer,
        clicked_at: event.timestamp,
    };

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::spawn(
        strategy,
        || {
            let repository = repository.clone();
            let new_click = new_click.clone();
            async move { repository.record_click(new_click).await }
        },
        |e: &AppError| matches!(e, AppError::Internal { .. }),
    )
    .await;

    match result {
        Ok(_) => {
            metrics::counter!(CLICKS_RECORDED_TOTAL).increment(1);
            debug!("Recorded click for {}", code);
        }
        Err(e) => warn!("Dropping click for {} after retries: {}", code, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::click_event::ClickInfo;
    use crate::domain::entities::Click;
    use crate::domain::repositories::MockClickRepository;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stored(new_click: &NewClick) -> Click {
        Click {
            id: 1,
            short_code: new_click.short_code.clone(),
            ip: new_click.ip.clone(),
            user_agent: new_click.user_agent.clone(),
            referer: new_click.referer.clone(),
            clicked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_worker_records_every_event() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_record_click()
            .times(3)
            .returning(|c| Ok(stored(&c)));

        let (tx, rx) = mpsc::channel(10);
        for code in ["a", "b", "c"] {
            tx.send(ClickEvent::new(code, ClickInfo::default()))
                .await
                .unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(mock_repo), 2).await;
    }

    #[tokio::test]
    async fn test_worker_retries_internal_errors() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let mut mock_repo = MockClickRepository::new();
        mock_repo.expect_record_click().times(2).returning(move |c| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(stored(&c))
            }
        });

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new("retry", ClickInfo::default()))
            .await
            .unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(mock_repo), 1).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_worker_does_not_retry_non_transient_errors() {
        let mut mock_repo = MockClickRepository::new();
        mock_repo
            .expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::bad_request("bad click", json!({}))));

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new("bad", ClickInfo::default()))
            .await
            .unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(mock_repo), 1).await;
    }
}
