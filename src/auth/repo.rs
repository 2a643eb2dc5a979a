use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, Region, User, UserRow};

/// Why an insert was refused by the store.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("identifier already taken")]
    DuplicateIdentifier,
    #[error("referenced region does not exist")]
    MissingRegion,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Persistence seen by the account workflows.
///
/// `insert_user` must be atomic and must itself reject a duplicate
/// identifier: the lookup done beforehand by the caller is only a fast path.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>>;
    async fn find_region(&self, region_id: i64) -> anyhow::Result<Option<Region>>;
    async fn insert_user(&self, user: NewUser) -> Result<User, InsertError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_id, nickname, region_id, password_hash, phone_number, roles, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find user by user_id")?;
        row.map(User::try_from).transpose()
    }

    async fn find_region(&self, region_id: i64) -> anyhow::Result<Option<Region>> {
        let region = sqlx::query_as::<_, Region>(
            r#"
            SELECT id, name
            FROM regions
            WHERE id = $1
            "#,
        )
        .bind(region_id)
        .fetch_optional(&self.db)
        .await
        .context("find region")?;
        Ok(region)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, InsertError> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        // Hold the region row until commit so it cannot vanish under the new user.
        let region = sqlx::query_scalar::<_, i64>(
            r#"SELECT id FROM regions WHERE id = $1 FOR KEY SHARE"#,
        )
        .bind(user.region_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock region")?;
        if region.is_none() {
            return Err(InsertError::MissingRegion);
        }

        let roles: Vec<String> = user.roles.iter().map(|r| r.to_string()).collect();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, user_id, nickname, region_id, password_hash, phone_number, roles)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, nickname, region_id, password_hash, phone_number, roles, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.user_id)
        .bind(&user.nickname)
        .bind(user.region_id)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(roles)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_insert_error)?;

        tx.commit().await.map_err(classify_insert_error)?;

        Ok(User::try_from(row)?)
    }
}

fn classify_insert_error(e: sqlx::Error) -> InsertError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return InsertError::DuplicateIdentifier;
        }
        if db.is_foreign_key_violation() {
            return InsertError::MissingRegion;
        }
    }
    InsertError::Storage(anyhow::Error::new(e).context("insert user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use sqlx::postgres::PgPoolOptions;

    #[test]
    fn non_database_errors_are_storage_failures() {
        let err = classify_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, InsertError::Storage(_)));
    }

    // Runs only when DATABASE_URL points at a scratch Postgres.
    async fn scratch_db() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let db = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");
        crate::db::migrate(&db).await.expect("migrate");
        Some(db)
    }

    fn new_user(region_id: i64) -> NewUser {
        NewUser {
            user_id: format!("u-{}", Uuid::new_v4()),
            nickname: "nick".into(),
            region_id,
            password_hash: "$argon2id$stub".into(),
            phone_number: "010-1234-5678".into(),
            roles: Role::defaults(),
        }
    }

    #[tokio::test]
    async fn postgres_constraint_violations_are_classified() {
        let Some(db) = scratch_db().await else {
            return;
        };
        let store = PgAccountStore::new(db.clone());
        let region_id: i64 =
            sqlx::query_scalar("INSERT INTO regions (name) VALUES ('test') RETURNING id")
                .fetch_one(&db)
                .await
                .unwrap();

        let user = new_user(region_id);
        let created = store.insert_user(user.clone()).await.expect("first insert");
        assert_eq!(created.roles, vec![Role::User]);
        let err = store.insert_user(user).await.unwrap_err();
        assert!(matches!(err, InsertError::DuplicateIdentifier));

        let err = store.insert_user(new_user(-1)).await.unwrap_err();
        assert!(matches!(err, InsertError::MissingRegion));

        let fk = sqlx::query(
            r#"
            INSERT INTO users (id, user_id, nickname, region_id, password_hash, phone_number)
            VALUES ($1, $2, 'nick', -1, 'hash', '010-1234-5678')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(format!("u-{}", Uuid::new_v4()))
        .execute(&db)
        .await
        .unwrap_err();
        assert!(matches!(classify_insert_error(fk), InsertError::MissingRegion));
    }
}
