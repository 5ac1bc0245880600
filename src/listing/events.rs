use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ListingEvent {
    // 상품 등록
    ListingCreated {
        listing_id: i64,
        seller_id: i64,
        title: String,
        starting_bid: i64,
        timestamp: DateTime<Utc>,
    },
    // 입찰
    BidPlaced {
        listing_id: i64,
        bidder_id: i64,
        amount: i64,
        timestamp: DateTime<Utc>,
    },
    // 댓글
    CommentAdded {
        listing_id: i64,
        comment_id: i64,
        commenter_id: i64,
        timestamp: DateTime<Utc>,
    },
    // 경매 종료 (판매자 종료 또는 입찰이 있는 상태로 기간 만료)
    AuctionClosed {
        listing_id: i64,
        closed_by: Option<i64>,
        winner_id: Option<i64>,
        final_price: i64,
        timestamp: DateTime<Utc>,
    },
    // 입찰 없이 기간 만료
    AuctionExpired {
        listing_id: i64,
        timestamp: DateTime<Utc>,
    },
}

impl ListingEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ListingEvent::ListingCreated { .. } => "ListingCreated",
            ListingEvent::BidPlaced { .. } => "BidPlaced",
            ListingEvent::CommentAdded { .. } => "CommentAdded",
            ListingEvent::AuctionClosed { .. } => "AuctionClosed",
            ListingEvent::AuctionExpired { .. } => "AuctionExpired",
        }
    }

    pub fn listing_id(&self) -> i64 {
        match self {
            ListingEvent::ListingCreated { listing_id, .. }
            | ListingEvent::BidPlaced { listing_id, .. }
            | ListingEvent::CommentAdded { listing_id, .. }
            | ListingEvent::AuctionClosed { listing_id, .. }
            | ListingEvent::AuctionExpired { listing_id, .. } => *listing_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ListingEvent::ListingCreated { timestamp, .. }
            | ListingEvent::BidPlaced { timestamp, .. }
            | ListingEvent::CommentAdded { timestamp, .. }
            | ListingEvent::AuctionClosed { timestamp, .. }
            | ListingEvent::AuctionExpired { timestamp, .. } => *timestamp,
        }
    }

    /// 이벤트를 일으킨 사용자 (스케줄러에 의한 이벤트는 없음)
    pub fn actor_id(&self) -> Option<i64> {
        match self {
            ListingEvent::ListingCreated { seller_id, .. } => Some(*seller_id),
            ListingEvent::BidPlaced { bidder_id, .. } => Some(*bidder_id),
            ListingEvent::CommentAdded { commenter_id, .. } => Some(*commenter_id),
            ListingEvent::AuctionClosed { closed_by, .. } => *closed_by,
            ListingEvent::AuctionExpired { .. } => None,
        }
    }
}
