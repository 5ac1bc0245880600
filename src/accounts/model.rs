use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LEN: usize = 150;

// 사용자 모델 (비밀번호 해시 제외)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// 회원가입 요청
#[derive(Deserialize)]
pub struct RegisterCommand {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirmation: String,
}

impl std::fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegisterCommand {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.password != self.confirmation {
            return Err(AppError::Validation("Passwords must match.".to_string()));
        }
        let username = self.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username is required.".to_string()));
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Username must be at most {} characters.",
                USERNAME_MAX_LEN
            )));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("Password is required.".to_string()));
        }
        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            return Err(AppError::Validation("Enter a valid email address.".to_string()));
        }
        Ok(())
    }
}

// 로그인 요청
#[derive(Deserialize)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
