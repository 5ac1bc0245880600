/// 상품 조회 공통 SELECT (판매자 이름 포함)
macro_rules! listing_select {
    () => {
        "SELECT l.id, l.title, l.description, l.start_time, l.end_time, l.starting_bid, \
         l.current_price, l.category, l.image_url, l.status, l.seller_id, \
         u.username AS seller_username, l.winner_id, l.created_at \
         FROM listings l JOIN users u ON u.id = l.seller_id"
    };
}

/// 입찰 조회 공통 SELECT (입찰자 이름 포함)
macro_rules! bid_select {
    () => {
        "SELECT b.id, b.listing_id, b.bidder_id, u.username AS bidder_username, \
                b.amount, b.timestamp \
         FROM bids b JOIN users u ON u.id = b.bidder_id"
    };
}

/// 상품 조회
pub const GET_LISTING: &str = concat!(listing_select!(), " WHERE l.id = $1");

/// 진행 중인 상품 조회 (카테고리 필터는 NULL이면 무시)
pub const GET_ACTIVE_LISTINGS: &str = concat!(
    listing_select!(),
    " WHERE l.status = 'active' AND ($1::TEXT IS NULL OR l.category = $1)",
    " ORDER BY l.created_at DESC, l.id DESC"
);

/// 관심 목록 조회
pub const GET_WATCHLIST: &str = concat!(
    listing_select!(),
    " JOIN watchlist w ON w.listing_id = l.id",
    " WHERE w.user_id = $1",
    " ORDER BY w.added_at DESC, l.id DESC"
);

/// 진행 중인 상품의 카테고리 목록
pub const GET_CATEGORIES: &str = r#"
    SELECT DISTINCT category
    FROM listings
    WHERE status = 'active' AND category <> ''
    ORDER BY category
"#;

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = concat!(
    bid_select!(),
    " WHERE b.listing_id = $1",
    " ORDER BY b.timestamp DESC, b.id DESC"
);

/// 최고 입찰 조회
pub const GET_HIGHEST_BID: &str = concat!(
    bid_select!(),
    " WHERE b.listing_id = $1",
    " ORDER BY b.amount DESC, b.id ASC LIMIT 1"
);

/// 입찰 수 조회
pub const GET_BID_COUNT: &str = "SELECT COUNT(*) FROM bids WHERE listing_id = $1";

/// 댓글 조회
pub const GET_COMMENTS: &str = r#"
    SELECT c.id, c.listing_id, c.commenter_id, u.username AS commenter_username,
           c.content, c.timestamp
    FROM comments c JOIN users u ON u.id = c.commenter_id
    WHERE c.listing_id = $1
    ORDER BY c.timestamp ASC, c.id ASC
"#;

/// 댓글 단건 조회
pub const GET_COMMENT: &str = r#"
    SELECT c.id, c.listing_id, c.commenter_id, u.username AS commenter_username,
           c.content, c.timestamp
    FROM comments c JOIN users u ON u.id = c.commenter_id
    WHERE c.id = $1
"#;

/// 관심 목록 포함 여부
pub const IS_WATCHING: &str =
    "SELECT EXISTS (SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2)";

/// 상품 존재 여부
pub const LISTING_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM listings WHERE id = $1)";

/// 상품 이벤트 버전 조회
pub const GET_LISTING_VERSION: &str =
    "SELECT COALESCE(MAX(version), 0) AS version FROM events WHERE aggregate_id = $1";

/// 종료 시간이 지난 진행 중 상품
pub const GET_ENDED_ACTIVE_LISTING_IDS: &str =
    "SELECT id FROM listings WHERE status = 'active' AND end_time <= $1 ORDER BY end_time";

/// 알림 조회
pub const GET_NOTIFICATIONS: &str = r#"
    SELECT id, user_id, listing_id, message, read, created_at
    FROM notifications
    WHERE user_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT $2
"#;
