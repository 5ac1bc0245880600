/// 계정 관련 커맨드 처리
/// 1. 회원가입
/// 2. 로그인
/// 3. 로그아웃
// region:    --- Imports
use super::model::{LoginCommand, RegisterCommand, User};
use super::password::{hash_password, verify_password};
use super::session;
use crate::database::DatabaseManager;
use crate::error::AppError;
use tracing::{info, warn};

// endregion: --- Imports

const INVALID_CREDENTIALS: &str = "Invalid username and/or password.";

// region:    --- Commands
/// 1. 회원가입 후 세션 토큰 발급
pub async fn handle_register(
    cmd: RegisterCommand,
    db_manager: &DatabaseManager,
    session_ttl_hours: i64,
) -> Result<(User, String), AppError> {
    info!("{:<12} --> 회원가입 요청: {:?}", "Command", cmd);
    cmd.validate()?;

    let password_hash = hash_password(&cmd.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING id, username, email, created_at",
    )
    .bind(cmd.username.trim())
    .bind(cmd.email.trim())
    .bind(&password_hash)
    .fetch_one(db_manager.pool())
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Username already taken.".to_string())
        }
        other => AppError::from(other),
    })?;

    let token = session::create_session(db_manager, user.id, session_ttl_hours).await?;
    info!("{:<12} --> 회원가입 완료 user_id: {}", "Command", user.id);
    Ok((user, token))
}

/// 2. 로그인 후 세션 토큰 발급
pub async fn handle_login(
    cmd: LoginCommand,
    db_manager: &DatabaseManager,
    session_ttl_hours: i64,
) -> Result<(User, String), AppError> {
    info!("{:<12} --> 로그인 요청: {:?}", "Command", cmd);

    let credentials = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, password_hash FROM users WHERE username = $1",
    )
    .bind(cmd.username.trim())
    .fetch_optional(db_manager.pool())
    .await?;

    let user_id = match credentials {
        Some((id, hash)) if verify_password(&cmd.password, &hash) => id,
        _ => {
            warn!("{:<12} --> 로그인 실패: {}", "Command", cmd.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(db_manager.pool())
    .await?;

    let token = session::create_session(db_manager, user.id, session_ttl_hours).await?;
    Ok((user, token))
}

/// 3. 로그아웃
pub async fn handle_logout(
    token: Option<&str>,
    db_manager: &DatabaseManager,
) -> Result<(), AppError> {
    if let Some(token) = token {
        session::delete_session(db_manager, token).await?;
        info!("{:<12} --> 로그아웃", "Command");
    }
    Ok(())
}

// endregion: --- Commands
