// region:    --- Imports
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- App Error
/// 요청 처리 중 발생하는 오류
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Bid must be greater than the starting bid and any previous bids.")]
    LowBid { amount: i64, current_price: i64 },

    #[error("You cannot bid on your own listing.")]
    SelfBid,

    #[error("This auction is not active.")]
    NotActive,

    #[error("This auction has already ended.")]
    AlreadyEnded,

    #[error("Too many concurrent updates on this listing, try again.")]
    MaxRetriesExceeded,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION",
            AppError::Conflict(_) => "CONFLICT",
            AppError::LowBid { .. } => "LOW_BID",
            AppError::SelfBid => "SELF_BID",
            AppError::NotActive => "NOT_ACTIVE",
            AppError::AlreadyEnded => "ALREADY_ENDED",
            AppError::MaxRetriesExceeded => "MAX_RETRIES_EXCEEDED",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_)
            | AppError::LowBid { .. }
            | AppError::SelfBid
            | AppError::NotActive
            | AppError::AlreadyEnded => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::MaxRetriesExceeded => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            AppError::Database(_) | AppError::Internal(_) => json!({
                "error": "Internal server error.",
                "code": self.code(),
            }),
            AppError::LowBid {
                amount,
                current_price,
            } => json!({
                "error": self.to_string(),
                "code": self.code(),
                "amount": amount,
                "current_price": current_price,
            }),
            _ => json!({
                "error": self.to_string(),
                "code": self.code(),
            }),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Not found.".to_string()),
            other => AppError::Database(other),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{:<12} --> 요청 처리 실패: {:?}", "Error", self);
        }
        (status, Json(self.body())).into_response()
    }
}
// endregion: --- App Error

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Internal("connection refused on 10.0.0.3".to_string());
        let body = err.body();
        assert_eq!(body["code"], "INTERNAL");
        assert_eq!(body["error"], "Internal server error.");
    }

    #[test]
    fn test_low_bid_body_carries_prices() {
        let err = AppError::LowBid {
            amount: 900,
            current_price: 1000,
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body["code"], "LOW_BID");
        assert_eq!(body["amount"], 900);
        assert_eq!(body["current_price"], 1000);
        assert_eq!(
            body["error"],
            "Bid must be greater than the starting bid and any previous bids."
        );
    }

    #[derive(Debug, serde::Deserialize)]
    struct Amount {
        #[allow(dead_code)]
        amount: i64,
    }

    #[tokio::test]
    async fn test_malformed_json_maps_to_validation() {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::{header, Request};

        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"amount\": \"lots\"}"))
            .unwrap();
        let rejection = Json::<Amount>::from_request(request, &()).await.unwrap_err();

        let err = AppError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION");
        assert!(err.body()["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn test_bad_query_maps_to_validation() {
        use axum::extract::Query;
        use axum::http::Uri;

        let uri: Uri = "/listings?amount=abc".parse().unwrap();
        let rejection = Query::<Amount>::try_from_uri(&uri).unwrap_err();

        let err = AppError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body()["code"], "VALIDATION");
    }
}
// endregion: --- Tests
