use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Authorization role carried by a user and encoded into issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
}

impl Role {
    /// Role set assigned to every account at sign-up.
    pub fn defaults() -> Vec<Role> {
        vec![Role::User]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub user_id: String,
    pub nickname: String,
    pub region_id: i64,
    pub password_hash: String,
    pub phone_number: String,
    pub roles: Vec<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,                   // internal storage key
    pub user_id: String,            // external login identifier, unique
    pub nickname: String,
    pub region_id: i64,
    pub password_hash: String,      // Argon2 PHC string, never plaintext
    pub phone_number: String,
    pub roles: Vec<Role>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let roles = r
            .roles
            .iter()
            .map(|s| s.parse())
            .collect::<anyhow::Result<Vec<Role>>>()?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            nickname: r.nickname,
            region_id: r.region_id,
            password_hash: r.password_hash,
            phone_number: r.phone_number,
            roles,
            created_at: r.created_at,
        })
    }
}

/// A fully validated account waiting to be persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub nickname: String,
    pub region_id: i64,
    pub password_hash: String,
    pub phone_number: String,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(roles: Vec<&str>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            user_id: "alice".into(),
            nickname: "Alice".into(),
            region_id: 1,
            password_hash: "$argon2id$stub".into(),
            phone_number: "010-1234-5678".into(),
            roles: roles.into_iter().map(String::from).collect(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn role_text_form_matches_serde() {
        assert_eq!(Role::User.to_string(), "USER");
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
    }

    #[test]
    fn row_converts_into_user() {
        let user = User::try_from(row(vec!["USER"])).unwrap();
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.roles, vec![Role::User]);
    }

    #[test]
    fn row_with_unknown_role_is_rejected() {
        let err = User::try_from(row(vec!["ADMIN"])).unwrap_err();
        assert!(err.to_string().contains("ADMIN"));
    }
}
