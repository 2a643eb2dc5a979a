use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{Profile, SignInRequest, SignUpRequest},
        jwt::TokenIssuer,
        password::PasswordHasher,
        repo::AccountStore,
        repo_types::{NewUser, Role},
    },
    error::AuthError,
};

/// Sign-up and sign-in workflows over injected collaborators.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
        }
    }

    /// Creates an account. Checks run in a fixed order (password repeat,
    /// identifier uniqueness, region existence) and nothing is written unless
    /// all of them pass.
    #[instrument(skip(self, req), fields(user_id = %req.identifier))]
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<(), AuthError> {
        if req.password != req.password_repeat {
            warn!("passwords not equal");
            return Err(AuthError::PasswordsNotEqual);
        }

        if self.store.find_user(&req.identifier).await?.is_some() {
            warn!("identifier already registered");
            return Err(AuthError::AlreadyExistId);
        }

        let region = self
            .store
            .find_region(req.region_id)
            .await?
            .ok_or_else(|| {
                warn!(region_id = req.region_id, "region not found");
                AuthError::RegionNotFound
            })?;

        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .store
            .insert_user(NewUser {
                user_id: req.identifier,
                nickname: req.nickname,
                region_id: region.id,
                password_hash,
                phone_number: req.phone_number,
                roles: Role::defaults(),
            })
            .await?;

        info!(id = %user.id, region_id = user.region_id, "user registered");
        Ok(())
    }

    /// Verifies credentials and returns a signed token for the account.
    #[instrument(skip(self, req), fields(user_id = %req.identifier))]
    pub async fn sign_in(&self, req: SignInRequest) -> Result<String, AuthError> {
        let user = self
            .store
            .find_user(&req.identifier)
            .await?
            .ok_or_else(|| {
                warn!("sign-in unknown identifier");
                AuthError::NotRegisteredId
            })?;

        if !self.hasher.verify(&req.password, &user.password_hash) {
            warn!("sign-in invalid password");
            return Err(AuthError::InvalidPassword);
        }

        let token = self.issuer.issue(&user.user_id, &user.roles)?;
        info!("user signed in");
        Ok(token)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: &str) -> Result<Profile, AuthError> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or(AuthError::NotRegisteredId)?;
        let region = self
            .store
            .find_region(user.region_id)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "user {} references missing region {}",
                    user.user_id,
                    user.region_id
                )
            })?;

        Ok(Profile {
            identifier: user.user_id,
            nickname: user.nickname,
            region,
            phone_number: user.phone_number,
            roles: user.roles,
        })
    }
}
