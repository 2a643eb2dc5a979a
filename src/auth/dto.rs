use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{Region, Role};
use crate::error::AuthError;

const MAX_IDENTIFIER_LEN: usize = 50;

/// Request body for `POST /sign-up`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[serde(alias = "id")]
    pub identifier: String,
    pub nickname: String,
    pub password: String,
    pub password_repeat: String,
    pub region_id: i64,
    pub phone_number: String,
}

/// Request body for `POST /sign-in`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    #[serde(alias = "userId")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
}

/// Public view of an account, returned by `GET /me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub identifier: String,
    pub nickname: String,
    pub region: Region,
    pub phone_number: String,
    pub roles: Vec<Role>,
}

fn is_valid_phone(phone: &str) -> bool {
    lazy_static! {
        static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9\-]{7,20}$").unwrap();
    }
    PHONE_RE.is_match(phone)
}

fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

impl SignUpRequest {
    /// Shape checks done at the HTTP boundary, before the sign-up workflow runs.
    pub fn validate(&self) -> Result<(), AuthError> {
        require("identifier", &self.identifier)?;
        if self.identifier.chars().count() > MAX_IDENTIFIER_LEN {
            return Err(AuthError::Validation(format!(
                "identifier must be at most {MAX_IDENTIFIER_LEN} characters"
            )));
        }
        require("nickname", &self.nickname)?;
        require("password", &self.password)?;
        require("phoneNumber", &self.phone_number)?;
        if !is_valid_phone(&self.phone_number) {
            return Err(AuthError::Validation("phoneNumber is malformed".into()));
        }
        Ok(())
    }
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        require("identifier", &self.identifier)?;
        require("password", &self.password)
    }
}
