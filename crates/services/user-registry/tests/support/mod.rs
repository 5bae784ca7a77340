//! Shared setup for registry integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use common::DatabaseConfig;
use domain::CredentialCodec;
use user_registry::infra::Database;
use user_registry::repository::UserStore;
use user_registry::service::{UserManager, UserService};
use user_registry::{NewUser, Secret, User};

/// Cheap Argon2 parameters so tests stay fast
pub fn test_codec() -> CredentialCodec {
    CredentialCodec::with_params(64, 1, 1).expect("valid test parameters")
}

/// Fresh in-memory database with migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn setup() -> (UserManager, Database) {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let db = Database::connect(&config)
        .await
        .expect("Failed to connect to database");

    let repo = Arc::new(UserStore::new(db.get_connection()));
    (UserManager::new(repo, test_codec()), db)
}

/// File-backed database shared by a pool of `max_connections`, so
/// concurrent callers really run on separate connections.
///
/// The returned `TempDir` owns the database file; keep it alive for the
/// whole test.
pub async fn setup_pooled(max_connections: u32) -> (Arc<UserManager>, Database, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("registry.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections,
        min_connections: 1,
    };
    let db = Database::connect(&config)
        .await
        .expect("Failed to connect to database");

    let repo = Arc::new(UserStore::new(db.get_connection()));
    (Arc::new(UserManager::new(repo, test_codec())), db, dir)
}

pub fn user_request(username: &str, email: &str, phone: &str, password: &str) -> NewUser {
    NewUser::new("Test User", username, email, phone, Secret::new(password))
}

pub async fn create_test_user(manager: &UserManager) -> User {
    manager
        .create_user(user_request("testuser", "test@example.com", "1234567890", "password123"))
        .await
        .expect("Failed to create test user")
}
