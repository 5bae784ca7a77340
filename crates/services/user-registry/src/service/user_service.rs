//! User service - the public surface of the registry.
//!
//! Every keyed operation takes a [`UserKey`] and reports a miss as
//! `AppError::NotFound`, whichever key variant was used.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use common::{AppError, AppResult, OptionExt};
use domain::{
    encode_data, normalize, CredentialCodec, ListQuery, NewUser, Secret, User, UserKey, UserStatus,
    UserUpdate,
};

use crate::repository::{SingleColumn, UserRepository};

/// Outcome of a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    /// The extension payload could not be encoded and was not written
    pub data_dropped: bool,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a new user; the secret is hashed under a fresh salt
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Get user by id, username or email
    async fn get_user(&self, key: &UserKey) -> AppResult<User>;

    /// Apply a partial update
    async fn update_user(&self, key: &UserKey, update: UserUpdate) -> AppResult<UpdateReport>;

    /// Permanently delete user
    async fn delete_user(&self, key: &UserKey) -> AppResult<()>;

    /// Check a secret against the stored credential.
    ///
    /// `NotFound` and `InvalidCredentials` are distinct so the host can
    /// choose whether to collapse them. `Disabled` is only reported once the
    /// secret has matched.
    async fn verify_password(&self, key: &UserKey, secret: &Secret) -> AppResult<()>;

    async fn enable_user(&self, key: &UserKey) -> AppResult<()>;

    async fn disable_user(&self, key: &UserKey) -> AppResult<()>;

    /// Set the status label; any status may follow any other
    async fn set_status(&self, key: &UserKey, status: UserStatus) -> AppResult<()>;

    /// List users with filtering, ordering and pagination.
    ///
    /// At most `MAX_PAGE_SIZE` (100) rows come back per call, whatever
    /// `query.limit` asks for.
    async fn list_users(&self, query: &ListQuery) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    codec: CredentialCodec,
}

impl UserManager {
    /// Create new user service instance with repository and credential codec
    pub fn new(repo: Arc<dyn UserRepository>, codec: CredentialCodec) -> Self {
        Self { repo, codec }
    }

    fn expect_affected(affected: u64) -> AppResult<()> {
        if affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        new_user
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let credential = self.codec.resolve(new_user.credential.clone())?;
        let mut user = new_user.into_user(credential, Utc::now());

        // Same lossy policy as updates: an unencodable payload is stored empty
        if let Err(e) = encode_data(&user.data) {
            tracing::warn!("Dropping extension payload for new user {}: {}", user.id, e);
            user.data.clear();
        }

        let user = self.repo.insert(user).await?;
        tracing::debug!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn get_user(&self, key: &UserKey) -> AppResult<User> {
        self.repo.find_one(key).await?.ok_or_not_found()
    }

    async fn update_user(&self, key: &UserKey, update: UserUpdate) -> AppResult<UpdateReport> {
        let normalized = normalize(update, &self.codec)?;
        let rotated = normalized.changes.credential.is_some();

        let affected = self.repo.apply_change_set(key, normalized.changes).await?;
        Self::expect_affected(affected)?;

        tracing::debug!(
            key_kind = key.kind(),
            user_id = ?key.as_id(),
            credential_rotated = rotated,
            "User updated"
        );
        Ok(UpdateReport {
            data_dropped: normalized.data_dropped,
        })
    }

    async fn delete_user(&self, key: &UserKey) -> AppResult<()> {
        let affected = self.repo.delete(key).await?;
        Self::expect_affected(affected)?;

        tracing::debug!(key_kind = key.kind(), user_id = ?key.as_id(), "User deleted");
        Ok(())
    }

    async fn verify_password(&self, key: &UserKey, secret: &Secret) -> AppResult<()> {
        let record = self
            .repo
            .find_credential(key)
            .await?
            .ok_or_not_found()?;

        if !self.codec.verify(secret, &record.credential) {
            return Err(AppError::InvalidCredentials);
        }
        if !record.enabled {
            return Err(AppError::Disabled);
        }
        Ok(())
    }

    async fn enable_user(&self, key: &UserKey) -> AppResult<()> {
        let affected = self.repo.set_column(key, SingleColumn::Enabled(true)).await?;
        Self::expect_affected(affected)
    }

    async fn disable_user(&self, key: &UserKey) -> AppResult<()> {
        let affected = self.repo.set_column(key, SingleColumn::Enabled(false)).await?;
        Self::expect_affected(affected)
    }

    async fn set_status(&self, key: &UserKey, status: UserStatus) -> AppResult<()> {
        let affected = self.repo.set_column(key, SingleColumn::Status(status)).await?;
        Self::expect_affected(affected)?;

        tracing::debug!(
            key_kind = key.kind(),
            user_id = ?key.as_id(),
            %status,
            "User status set"
        );
        Ok(())
    }

    async fn list_users(&self, query: &ListQuery) -> AppResult<Vec<User>> {
        self.repo.find_many(query).await
    }
}
