//! Service layer - user lifecycle and credential verification.

mod user_service;

pub use user_service::{UpdateReport, UserManager, UserService};
