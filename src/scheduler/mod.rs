/// 경매 만료 스케줄러
/// 종료 시간이 지난 진행 중 상품을 정리한다.
/// 입찰이 있으면 최고 입찰자에게 낙찰(closed), 없으면 만료(expired).
/// 설정으로 켰을 때만 동작한다.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::listing::commands::{handle_finish_listing, Finish};
use crate::query::handlers;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Expiry Scheduler
/// 경매 만료 스케줄러
pub struct ExpiryScheduler<S> {
    db_manager: Arc<DatabaseManager>,
    event_store: Arc<S>,
    period: Duration,
}

impl<S> ExpiryScheduler<S>
where
    S: EventStore + 'static,
{
    /// 주기가 0이면 스케줄러를 만들지 않는다
    pub fn new(
        db_manager: Arc<DatabaseManager>,
        event_store: Arc<S>,
        period_secs: u64,
    ) -> Option<Self> {
        if period_secs == 0 {
            return None;
        }
        Some(Self {
            db_manager,
            event_store,
            period: Duration::from_secs(period_secs),
        })
    }

    /// 백그라운드 작업으로 시작
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        info!(
            "{:<12} --> 만료 스케줄러 시작 ({}초 간격)",
            "Scheduler",
            self.period.as_secs()
        );
        tokio::spawn(async move {
            let mut interval = interval(self.period);
            loop {
                interval.tick().await;
                if let Err(e) = self.expire_ended_listings().await {
                    error!(
                        "{:<12} --> 만료 처리 중 오류 발생: {:?}",
                        "Scheduler", e
                    );
                }
            }
        })
    }

    /// 종료 시간이 지난 상품 정리. 처리한 개수를 반환
    pub async fn expire_ended_listings(&self) -> Result<usize, AppError> {
        let ids = handlers::get_ended_active_listing_ids(&self.db_manager, Utc::now()).await?;
        let mut finished = 0;

        for listing_id in ids {
            match handle_finish_listing(
                listing_id,
                Finish::Expired,
                self.event_store.as_ref(),
                &self.db_manager,
            )
            .await
            {
                Ok(_) => finished += 1,
                // 판매자가 먼저 종료한 경우
                Err(AppError::NotActive) => {
                    debug!("{:<12} --> 이미 종료된 상품 id: {}", "Scheduler", listing_id)
                }
                Err(e) => warn!(
                    "{:<12} --> 상품 만료 실패 id: {}: {:?}",
                    "Scheduler", listing_id, e
                ),
            }
        }

        if finished > 0 {
            info!("{:<12} --> 만료 처리 {}건", "Scheduler", finished);
        }
        Ok(finished)
    }
}
// endregion: --- Expiry Scheduler

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_store::PostgresEventStore;
    use crate::message_broker::KafkaProducer;
    use sqlx::postgres::PgPoolOptions;

    fn scheduler_parts() -> (Arc<DatabaseManager>, Arc<PostgresEventStore>) {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/auction")
            .unwrap();
        let producer = Arc::new(KafkaProducer::new("localhost:9092").unwrap());
        (
            Arc::new(DatabaseManager::from_pool(pool)),
            Arc::new(PostgresEventStore::new(producer, "listing-events")),
        )
    }

    #[tokio::test]
    async fn test_zero_period_disables_scheduler() {
        let (db_manager, event_store) = scheduler_parts();
        let disabled = ExpiryScheduler::new(Arc::clone(&db_manager), Arc::clone(&event_store), 0);
        assert!(disabled.is_none());

        let scheduler = ExpiryScheduler::new(db_manager, event_store, 30).unwrap();
        assert_eq!(scheduler.period, Duration::from_secs(30));
    }
}
