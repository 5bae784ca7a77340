//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::{decode_data, StoredCredential, User, UserStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_digest: String,
    pub salt: String,
    #[sea_orm(unique)]
    pub phone: String,
    pub created_at: DateTimeUtc,
    pub enabled: bool,
    pub status: String,
    /// Encoded extension payload (`{}` when absent)
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            username: model.username,
            email: model.email,
            credential: StoredCredential::from_parts(model.password_digest, model.salt),
            phone: model.phone,
            created_at: model.created_at,
            enabled: model.enabled,
            status: UserStatus::from(model.status.as_str()),
            data: decode_data(model.data),
        }
    }
}

impl ActiveModel {
    /// Build an insertable model from a domain user and its encoded payload.
    pub fn from_user(user: User, data: Json) -> Self {
        let (password_digest, salt) = user.credential.into_parts();
        ActiveModel {
            id: Set(user.id),
            name: Set(user.name),
            username: Set(user.username),
            email: Set(user.email),
            password_digest: Set(password_digest),
            salt: Set(salt),
            phone: Set(user.phone),
            created_at: Set(user.created_at),
            enabled: Set(user.enabled),
            status: Set(user.status.to_string()),
            data: Set(data),
        }
    }
}
