//! In-memory account store used by the test suite.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::{AccountStore, InsertError};
use crate::auth::repo_types::{NewUser, Region, User};

#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    regions: Arc<RwLock<HashMap<i64, Region>>>,
}

impl InMemoryAccountStore {
    pub fn with_regions(regions: Vec<Region>) -> Self {
        let regions = regions.into_iter().map(|r| (r.id, r)).collect();
        Self {
            users: Arc::default(),
            regions: Arc::new(RwLock::new(regions)),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_region(&self, region_id: i64) -> anyhow::Result<Option<Region>> {
        Ok(self.regions.read().await.get(&region_id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, InsertError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(InsertError::DuplicateIdentifier);
        }
        if !self.regions.read().await.contains_key(&user.region_id) {
            return Err(InsertError::MissingRegion);
        }

        let created = User {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            nickname: user.nickname,
            region_id: user.region_id,
            password_hash: user.password_hash,
            phone_number: user.phone_number,
            roles: user.roles,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(created.user_id.clone(), created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;

    fn store() -> InMemoryAccountStore {
        InMemoryAccountStore::with_regions(vec![Region {
            id: 1,
            name: "Seoul".into(),
        }])
    }

    fn new_user(user_id: &str, region_id: i64) -> NewUser {
        NewUser {
            user_id: user_id.into(),
            nickname: "nick".into(),
            region_id,
            password_hash: "$argon2id$stub".into(),
            phone_number: "010-1234-5678".into(),
            roles: Role::defaults(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_identifier() {
        let store = store();
        store.insert_user(new_user("alice", 1)).await.expect("first insert");

        let err = store.insert_user(new_user("alice", 1)).await.unwrap_err();
        assert!(matches!(err, InsertError::DuplicateIdentifier));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_unknown_region() {
        let store = store();
        let err = store.insert_user(new_user("bob", 999)).await.unwrap_err();
        assert!(matches!(err, InsertError::MissingRegion));
        assert_eq!(store.user_count().await, 0);
    }
}
