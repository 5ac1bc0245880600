use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub bidder_username: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

// 입찰 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidReceipt {
    pub bid_id: i64,
    pub listing_id: i64,
    pub amount: i64,
    pub current_price: i64,
    pub timestamp: DateTime<Utc>,
}
