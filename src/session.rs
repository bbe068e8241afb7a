use std::path::Path;
use std::{env, fs};
use jsonwebtoken::dangerous::insecure_decode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const TOKEN_ENV: &str = "EDUCONNECT_TOKEN";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Không tìm thấy token đăng nhập")]
    MissingToken,
    #[error("Token không hợp lệ: {0}")]
    Malformed(String),
    #[error("Token thiếu trường `{0}`")]
    MissingClaim(&'static str),
}

/// Identity of the signed-in tutor, taken from the token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub tutor_id: String,
    pub email: String,
}

#[derive(Deserialize)]
struct Claims {
    sub: Option<String>,
    id: Option<Value>,
}

/// Reads the claims of a compact JWT without checking its signature.
pub fn decode_token(token: &str) -> Result<Session, SessionError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SessionError::MissingToken);
    }
    let claims = insecure_decode::<Claims>(token)
        .map_err(|e| SessionError::Malformed(e.to_string()))?
        .claims;

    let tutor_id = match claims.id {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(SessionError::MissingClaim("id")),
    };
    let email = claims.sub.ok_or(SessionError::MissingClaim("sub"))?;

    Ok(Session { tutor_id, email })
}

/// Resolves the token from the environment first, then from `token_file`.
pub fn load_session(token_file: &Path) -> Result<Session, SessionError> {
    let token = match env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => token,
        _ => fs::read_to_string(token_file).map_err(|_| SessionError::MissingToken)?,
    };
    decode_token(&token)
}
