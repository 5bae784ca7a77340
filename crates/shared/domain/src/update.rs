//! Partial updates - change requests and their normalization.
//!
//! [`UserUpdate`] names every mutable field explicitly. [`normalize`] turns
//! it into a storage-ready [`ChangeSet`]:
//!
//! - a credential is always resolved into a fresh digest/salt pair;
//! - the extension payload is encoded to its stored JSON form. If encoding
//!   fails the payload is **dropped** from the change-set instead of failing
//!   the whole update, and [`NormalizedUpdate::data_dropped`] is set so the
//!   caller can tell.

use serde_json::Value;

use crate::credential::{CredentialCodec, NewCredential, StoredCredential};
use crate::data::{encode_data, ExtData};
use crate::error::{DomainError, DomainResult};
use crate::user::UserStatus;

/// Change request for an existing user. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub credential: Option<NewCredential>,
    pub status: Option<UserStatus>,
    pub enabled: Option<bool>,
    pub data: Option<ExtData>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn credential(mut self, credential: impl Into<NewCredential>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn data(mut self, data: ExtData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.credential.is_none()
            && self.status.is_none()
            && self.enabled.is_none()
            && self.data.is_none()
    }
}

/// Validated, storage-ready change-set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Digest and salt, written together
    pub credential: Option<StoredCredential>,
    pub status: Option<UserStatus>,
    pub enabled: Option<bool>,
    /// Encoded extension payload
    pub data: Option<Value>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.credential.is_none()
            && self.status.is_none()
            && self.enabled.is_none()
            && self.data.is_none()
    }
}

/// Result of normalizing a [`UserUpdate`].
#[derive(Debug, Clone)]
pub struct NormalizedUpdate {
    pub changes: ChangeSet,
    /// The extension payload failed to encode and was left out
    pub data_dropped: bool,
}

/// Validate an update request and compute derived fields.
///
/// # Errors
/// - `Validation` if the request changes nothing or a field is blank
/// - `RandomnessUnavailable` if a new salt cannot be generated
pub fn normalize(update: UserUpdate, codec: &CredentialCodec) -> DomainResult<NormalizedUpdate> {
    if update.is_empty() {
        return Err(DomainError::validation("Update contains no changes"));
    }
    if matches!(&update.name, Some(name) if name.is_empty()) {
        return Err(DomainError::validation("Name must not be empty"));
    }
    if matches!(&update.phone, Some(phone) if phone.is_empty()) {
        return Err(DomainError::validation("Phone must not be empty"));
    }

    let credential = update
        .credential
        .map(|credential| codec.resolve(credential))
        .transpose()?;

    let mut data_dropped = false;
    let data = match update.data {
        Some(data) => match encode_data(&data) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                tracing::warn!("Dropping extension payload from update: {}", e);
                data_dropped = true;
                None
            }
        },
        None => None,
    };

    Ok(NormalizedUpdate {
        changes: ChangeSet {
            name: update.name,
            phone: update.phone,
            credential,
            status: update.status,
            enabled: update.enabled,
            data,
        },
        data_dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DIGEST_LEN;
    use crate::credential::{generate_salt, Secret};
    use crate::data::DataValue;
    use serde_json::json;

    fn codec() -> CredentialCodec {
        CredentialCodec::with_params(64, 1, 1).unwrap()
    }

    #[test]
    fn test_empty_update_rejected() {
        let result = normalize(UserUpdate::new(), &codec());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_blank_fields_rejected() {
        assert!(normalize(UserUpdate::new().name(""), &codec()).is_err());
        assert!(normalize(UserUpdate::new().phone(""), &codec()).is_err());
    }

    #[test]
    fn test_plain_fields_pass_through() {
        let normalized = normalize(
            UserUpdate::new()
                .name("Renamed")
                .status(UserStatus::Locked)
                .enabled(false),
            &codec(),
        )
        .unwrap();

        assert_eq!(normalized.changes.name.as_deref(), Some("Renamed"));
        assert_eq!(normalized.changes.status, Some(UserStatus::Locked));
        assert_eq!(normalized.changes.enabled, Some(false));
        assert!(normalized.changes.credential.is_none());
        assert!(normalized.changes.data.is_none());
        assert!(!normalized.data_dropped);
    }

    #[test]
    fn test_secret_is_hashed_with_new_salt() {
        let codec = codec();
        let normalized = normalize(UserUpdate::new().credential(Secret::new("p2")), &codec).unwrap();
        let credential = normalized.changes.credential.unwrap();

        assert_eq!(credential.digest().len(), DIGEST_LEN);
        assert_ne!(credential.digest(), "p2");
        assert!(!credential.salt().is_empty());
        assert!(codec.verify(&Secret::new("p2"), &credential));
    }

    #[test]
    fn test_digest_length_secret_still_hashed() {
        let codec = codec();
        let looks_hashed = "f".repeat(DIGEST_LEN);
        let normalized =
            normalize(UserUpdate::new().credential(Secret::new(looks_hashed.clone())), &codec).unwrap();
        let credential = normalized.changes.credential.unwrap();

        assert_ne!(credential.digest(), looks_hashed);
        assert!(codec.verify(&Secret::new(looks_hashed), &credential));
    }

    #[test]
    fn test_imported_pair_kept_together() {
        let codec = codec();
        let salt = generate_salt().unwrap();
        let digest = codec.hash("imported", &salt).unwrap();
        let pair = StoredCredential::import(digest, salt).unwrap();

        let normalized =
            normalize(UserUpdate::new().credential(NewCredential::Hashed(pair.clone())), &codec).unwrap();
        assert_eq!(normalized.changes.credential, Some(pair));
    }

    #[test]
    fn test_data_encoded() {
        let mut data = ExtData::new();
        data.insert("theme".to_string(), DataValue::from("dark"));

        let normalized = normalize(UserUpdate::new().data(data), &codec()).unwrap();
        assert_eq!(normalized.changes.data, Some(json!({ "theme": "dark" })));
        assert!(!normalized.data_dropped);
    }

    #[test]
    fn test_unencodable_data_dropped_not_fatal() {
        let mut data = ExtData::new();
        data.insert("score".to_string(), DataValue::Number(f64::NAN));

        let normalized = normalize(UserUpdate::new().name("Still Applied").data(data), &codec()).unwrap();
        assert!(normalized.data_dropped);
        assert!(normalized.changes.data.is_none());
        assert_eq!(normalized.changes.name.as_deref(), Some("Still Applied"));
    }

    #[test]
    fn test_only_unencodable_data_leaves_empty_change_set() {
        let mut data = ExtData::new();
        data.insert("score".to_string(), DataValue::Number(f64::INFINITY));

        let normalized = normalize(UserUpdate::new().data(data), &codec()).unwrap();
        assert!(normalized.data_dropped);
        assert!(normalized.changes.is_empty());
    }
}
