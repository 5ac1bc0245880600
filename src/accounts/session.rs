// region:    --- Imports
use super::model::User;
use crate::config::hours_after;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

// endregion: --- Imports

pub const SESSION_COOKIE: &str = "session";

// region:    --- Session Store
/// 세션 생성 후 토큰 반환
pub async fn create_session(
    db_manager: &DatabaseManager,
    user_id: i64,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let token = Uuid::new_v4().simple().to_string();
    let now = Utc::now();
    let expires_at = hours_after(now, ttl_hours)
        .ok_or_else(|| AppError::Internal(format!("session ttl out of range: {}h", ttl_hours)))?;

    sqlx::query(
        "INSERT INTO sessions (token, user_id, created_at, expires_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(&token)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .execute(db_manager.pool())
    .await?;

    // 같은 사용자의 만료된 세션 정리
    sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= $2")
        .bind(user_id)
        .bind(now)
        .execute(db_manager.pool())
        .await?;

    debug!("{:<12} --> 세션 생성 user_id: {}", "Session", user_id);
    Ok(token)
}

/// 세션 삭제
pub async fn delete_session(db_manager: &DatabaseManager, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(db_manager.pool())
        .await?;
    Ok(())
}

/// 만료되지 않은 세션의 사용자 조회
pub async fn find_user_by_token(
    db_manager: &DatabaseManager,
    token: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT u.id, u.username, u.email, u.created_at
         FROM sessions s JOIN users u ON u.id = s.user_id
         WHERE s.token = $1 AND s.expires_at > $2",
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(db_manager.pool())
    .await?;
    Ok(user)
}

/// 세션 쿠키
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// 세션 쿠키 삭제용
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

// endregion: --- Session Store

// region:    --- Current User Extractor
/// 로그인한 사용자. 로그인이 필요 없는 핸들러는 `Option<CurrentUser>`로 받는다
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| AppError::Unauthorized("Login required.".to_string()))?;

        find_user_by_token(&state.db, &token)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::Unauthorized("Session expired, please log in again.".to_string())
            })
    }
}
// endregion: --- Current User Extractor

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc123".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_removal_cookie_matches_path() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
    }
}
