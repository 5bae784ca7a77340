//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{STATUS_ACTIVE, STATUS_INACTIVE, STATUS_LOCKED, STATUS_SUSPENDED};
use crate::credential::{NewCredential, StoredCredential};
use crate::data::ExtData;
use crate::error::DomainError;

/// Account status label.
///
/// Any status can be set from any other; the host decides what each one
/// means. `enabled` on [`User`] is a separate gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Suspended,
    Locked,
    #[default]
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Suspended => STATUS_SUSPENDED,
            UserStatus::Locked => STATUS_LOCKED,
            UserStatus::Inactive => STATUS_INACTIVE,
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_ACTIVE => Ok(UserStatus::Active),
            STATUS_SUSPENDED => Ok(UserStatus::Suspended),
            STATUS_LOCKED => Ok(UserStatus::Locked),
            STATUS_INACTIVE => Ok(UserStatus::Inactive),
            other => Err(DomainError::validation(format!("Unknown status '{}'", other))),
        }
    }
}

/// Lenient conversion for values read back from storage.
impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<UserStatus> for String {
    fn from(status: UserStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    /// Digest and salt; never serialized
    #[serde(skip)]
    pub credential: StoredCredential,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub enabled: bool,
    pub status: UserStatus,
    #[serde(default)]
    pub data: ExtData,
}

impl User {
    /// Check if the account is enabled and active
    pub fn is_active(&self) -> bool {
        self.enabled && self.status == UserStatus::Active
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    /// Explicit identifier; generated when absent
    pub id: Option<Uuid>,
    /// User display name
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub credential: NewCredential,
    #[validate(length(min = 1))]
    pub phone: String,
    pub enabled: bool,
    /// Initial status; `Inactive` when absent
    pub status: Option<UserStatus>,
    pub data: ExtData,
}

impl NewUser {
    /// Start a creation request with the required identity fields.
    ///
    /// The account starts enabled, with no explicit status and an empty
    /// extension payload.
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        credential: impl Into<NewCredential>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            credential: credential.into(),
            phone: phone.into(),
            enabled: true,
            status: None,
            data: ExtData::new(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_data(mut self, data: ExtData) -> Self {
        self.data = data;
        self
    }

    /// Build the record to persist from this request and its resolved credential.
    pub fn into_user(self, credential: StoredCredential, created_at: DateTime<Utc>) -> User {
        User {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            username: self.username,
            email: self.email,
            credential,
            phone: self.phone,
            created_at,
            enabled: self.enabled,
            status: self.status.unwrap_or_default(),
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Secret;

    fn request() -> NewUser {
        NewUser::new("Alice", "alice", "a@x.com", "1234567890", Secret::new("p1"))
    }

    #[test]
    fn test_status_parse_and_display() {
        for status in [
            UserStatus::Active,
            UserStatus::Suspended,
            UserStatus::Locked,
            UserStatus::Inactive,
        ] {
            assert_eq!(status.as_str().parse::<UserStatus>().unwrap(), status);
            assert_eq!(status.to_string(), status.as_str());
        }
        assert!("deleted".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_status_lenient_from_storage() {
        assert_eq!(UserStatus::from("locked"), UserStatus::Locked);
        assert_eq!(UserStatus::from("garbage"), UserStatus::Inactive);
    }

    #[test]
    fn test_default_status_is_inactive() {
        let user = request().into_user(StoredCredential::default(), Utc::now());
        assert_eq!(user.status, UserStatus::Inactive);
        assert!(user.enabled);
        assert!(user.data.is_empty());
        assert!(!user.is_active());
    }

    #[test]
    fn test_explicit_id_and_status_kept() {
        let id = Uuid::new_v4();
        let user = request()
            .with_id(id)
            .with_status(UserStatus::Active)
            .into_user(StoredCredential::default(), Utc::now());
        assert_eq!(user.id, id);
        assert!(user.is_active());
    }

    #[test]
    fn test_new_user_validation() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.email = "not-an-email".to_string();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.username = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_serialized_user_hides_credential() {
        let credential = StoredCredential::from_parts("d".repeat(64), "s".repeat(32));
        let user = request().into_user(credential, Utc::now());
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains(&"d".repeat(64)));
        assert!(!json.contains(&"s".repeat(32)));
        assert!(json.contains("\"status\":\"inactive\""));
    }
}
