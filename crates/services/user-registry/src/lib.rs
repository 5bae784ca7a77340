//! User Registry Library
//!
//! This crate manages the lifecycle of user accounts (creation, lookup,
//! partial updates, status changes, deletion) and verifies their salted
//! credentials against a relational store. It is meant to be embedded by a
//! host application that owns transport, sessions and authorization.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

pub use common::{AppError, AppResult};
pub use domain::{
    DataValue, ExtData, ListQuery, NewCredential, NewUser, Secret, SortField, StoredCredential, User,
    UserFilter, UserKey, UserStatus, UserUpdate,
};

use crate::config::UserRegistryConfig;
use crate::infra::Database;
use crate::repository::UserStore;
use crate::service::UserManager;

/// Connect to the configured database, apply pending migrations and build
/// the user manager on top of it.
pub async fn connect(config: &UserRegistryConfig) -> AppResult<UserManager> {
    let codec = config.codec()?;
    let db = Database::connect(&config.database).await?;

    let user_repo = Arc::new(UserStore::new(db.get_connection()));
    Ok(UserManager::new(user_repo, codec))
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> AppResult<()> {
    let config = UserRegistryConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
