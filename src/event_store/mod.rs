// region:    --- Imports
use crate::listing::events::ListingEvent;
use crate::message_broker::KafkaProducer;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use std::sync::Arc;
use tracing::{error, info};

// endregion: --- Imports

/// 버전 충돌 시 최대 재시도 횟수
pub const MAX_RETRIES: i32 = 100;

// region:    --- Event Model
/// 이벤트 저장소에 저장되는 이벤트 모델
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: i64,
    pub aggregate_id: i64,
    pub event_type: String,
    pub data: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: i64,
}

impl Event {
    /// 저장된 데이터를 상품 이벤트로 복원
    pub fn listing_event(&self) -> Result<ListingEvent, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}
// endregion: --- Event Model

// region:    --- Event Store Trait
/// 이벤트 저장소 트레이트
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 상품의 현재 이벤트 버전
    async fn current_version(
        &self,
        conn: &mut PgConnection,
        aggregate_id: i64,
    ) -> Result<i64, sqlx::Error>;

    /// `expected_version + 1`로 이벤트 추가. 다른 쓰기가 먼저 커밋했으면 `None`
    async fn append_event(
        &self,
        conn: &mut PgConnection,
        expected_version: i64,
        event: &ListingEvent,
    ) -> Result<Option<Event>, sqlx::Error>;

    /// 커밋된 이벤트 발행. 실패는 로그만 남긴다
    async fn publish_event(&self, event: &Event);
}

/// 이벤트 저장소 구현체
pub struct PostgresEventStore {
    kafka_producer: Arc<KafkaProducer>,
    topic: String,
}

/// 이벤트 저장소 생성
impl PostgresEventStore {
    pub fn new(kafka_producer: Arc<KafkaProducer>, topic: impl Into<String>) -> Self {
        Self {
            kafka_producer,
            topic: topic.into(),
        }
    }
}

/// 이벤트 저장소 구현체 메서드 구현
#[async_trait]
impl EventStore for PostgresEventStore {
    async fn current_version(
        &self,
        conn: &mut PgConnection,
        aggregate_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(version), 0) FROM events WHERE aggregate_id = $1",
        )
        .bind(aggregate_id)
        .fetch_one(&mut *conn)
        .await
    }

    async fn append_event(
        &self,
        conn: &mut PgConnection,
        expected_version: i64,
        event: &ListingEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let data = serde_json::to_value(event).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        sqlx::query_as::<_, Event>(
            "INSERT INTO events (aggregate_id, event_type, data, timestamp, version)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (aggregate_id, version) DO NOTHING
            RETURNING id, aggregate_id, event_type, data, timestamp, version",
        )
        .bind(event.listing_id())
        .bind(event.event_type())
        .bind(&data)
        .bind(event.timestamp())
        .bind(expected_version + 1)
        .fetch_optional(&mut *conn)
        .await
    }

    async fn publish_event(&self, event: &Event) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("{:<12} --> 이벤트 직렬화 실패: {:?}", "EventStore", e);
                return;
            }
        };

        // 같은 상품의 이벤트가 같은 파티션으로 가도록 상품 id를 키로 사용
        match self
            .kafka_producer
            .send_message(&self.topic, &event.aggregate_id.to_string(), &payload)
            .await
        {
            Ok(_) => info!(
                "{:<12} --> {} 발행 (listing={}, version={})",
                "EventStore", event.event_type, event.aggregate_id, event.version
            ),
            Err(e) => error!(
                "{:<12} --> {} 발행 실패 (id={}): {:?}",
                "EventStore", event.event_type, event.id, e
            ),
        }
    }
}

// endregion: --- Event Store Trait

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_event_data_restores_listing_event() {
        let original = ListingEvent::BidPlaced {
            listing_id: 7,
            bidder_id: 3,
            amount: 2500,
            timestamp: Utc::now(),
        };
        let event = Event {
            id: 1,
            aggregate_id: 7,
            event_type: original.event_type().to_string(),
            data: serde_json::to_value(&original).unwrap(),
            timestamp: original.timestamp(),
            version: 4,
        };

        // Kafka 페이로드 형태로 한번 거친 뒤 복원
        let wire = serde_json::to_string(&event).unwrap();
        let received: Event = serde_json::from_str(&wire).unwrap();
        assert_eq!(received.event_type, "BidPlaced");
        assert_eq!(received.listing_event().unwrap(), original);
    }

    #[test]
    fn test_unknown_payload_is_rejected() {
        let event = Event {
            id: 1,
            aggregate_id: 7,
            event_type: "ItemShipped".to_string(),
            data: serde_json::json!({"ItemShipped": {"listing_id": 7}}),
            timestamp: Utc::now(),
            version: 1,
        };
        assert!(event.listing_event().is_err());
    }
}
