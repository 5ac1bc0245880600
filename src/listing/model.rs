use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LEN: usize = 100;
pub const CATEGORY_MAX_LEN: usize = 50;

// 상품 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Closed,
    Expired,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Closed => "closed",
            ListingStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ListingStatus::Active),
            "closed" => Some(ListingStatus::Closed),
            "expired" => Some(ListingStatus::Expired),
            _ => None,
        }
    }
}

// 경매 상품 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub starting_bid: i64,
    pub current_price: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub status: String,
    pub seller_id: i64,
    pub seller_username: String,
    pub winner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn status(&self) -> Option<ListingStatus> {
        ListingStatus::parse(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.status() == Some(ListingStatus::Active)
    }
}

// 상품 등록 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingCommand {
    pub title: String,
    pub description: String,
    pub starting_bid: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateListingCommand {
    /// 입력값 정리 및 검증
    pub fn normalized(self) -> Result<Self, AppError> {
        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();
        let category = self.category.trim().to_string();
        let image_url = self
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if title.is_empty() {
            return Err(AppError::Validation("Title is required.".to_string()));
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Title must be at most {} characters.",
                TITLE_MAX_LEN
            )));
        }
        if description.is_empty() {
            return Err(AppError::Validation("Description is required.".to_string()));
        }
        if self.starting_bid <= 0 {
            return Err(AppError::Validation(
                "Starting bid must be a positive amount.".to_string(),
            ));
        }
        if category.chars().count() > CATEGORY_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Category must be at most {} characters.",
                CATEGORY_MAX_LEN
            )));
        }
        if let Some(url) = &image_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Validation(
                    "Image URL must start with http:// or https://.".to_string(),
                ));
            }
        }

        Ok(Self {
            title,
            description,
            starting_bid: self.starting_bid,
            category,
            image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> CreateListingCommand {
        CreateListingCommand {
            title: "  Vintage camera ".to_string(),
            description: "Works fine".to_string(),
            starting_bid: 5000,
            category: " Electronics ".to_string(),
            image_url: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_normalized_trims_fields() {
        let cmd = command().normalized().unwrap();
        assert_eq!(cmd.title, "Vintage camera");
        assert_eq!(cmd.category, "Electronics");
        assert_eq!(cmd.image_url, None);
    }

    #[test]
    fn test_normalized_rejects_bad_input() {
        let mut cmd = command();
        cmd.title = "x".repeat(TITLE_MAX_LEN + 1);
        assert!(matches!(cmd.normalized(), Err(AppError::Validation(_))));

        let mut cmd = command();
        cmd.starting_bid = 0;
        assert!(matches!(cmd.normalized(), Err(AppError::Validation(_))));

        let mut cmd = command();
        cmd.description = "   ".to_string();
        assert!(matches!(cmd.normalized(), Err(AppError::Validation(_))));

        let mut cmd = command();
        cmd.image_url = Some("ftp://example.com/a.png".to_string());
        assert!(matches!(cmd.normalized(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ListingStatus::Active,
            ListingStatus::Closed,
            ListingStatus::Expired,
        ] {
            assert_eq!(ListingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ListingStatus::parse("COMPLETED"), None);
    }
}
