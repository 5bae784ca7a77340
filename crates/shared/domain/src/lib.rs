//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user record, the credential codec, the update normalizer and the
//! query types used to address and list users.

pub mod constants;
pub mod credential;
pub mod data;
pub mod error;
pub mod query;
pub mod update;
pub mod user;

pub use constants::*;
pub use credential::{generate_salt, CredentialCodec, NewCredential, Secret, StoredCredential};
pub use data::{decode_data, encode_data, DataValue, ExtData};
pub use error::{DomainError, DomainResult};
pub use query::{ListQuery, SortField, UserFilter, UserKey};
pub use update::{normalize, ChangeSet, NormalizedUpdate, UserUpdate};
pub use user::{NewUser, User, UserStatus};
