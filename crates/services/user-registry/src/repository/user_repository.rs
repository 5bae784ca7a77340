//! User repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Order, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{
    encode_data, ChangeSet, ListQuery, SortField, StoredCredential, User, UserFilter, UserKey,
    UserStatus,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Credential columns of a single user, read for password verification.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub credential: StoredCredential,
    pub enabled: bool,
}

/// Single well-known column written outside the full update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleColumn {
    Enabled(bool),
    Status(UserStatus),
}

/// User repository trait for dependency injection.
///
/// Keyed writes return the number of affected rows; the caller decides what
/// zero means.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id, username or email
    async fn find_one(&self, key: &UserKey) -> AppResult<Option<User>>;

    /// Read only the credential columns and the enabled flag
    async fn find_credential(&self, key: &UserKey) -> AppResult<Option<CredentialRecord>>;

    /// Filtered, ordered, paginated listing
    async fn find_many(&self, query: &ListQuery) -> AppResult<Vec<User>>;

    /// Insert a new user, failing with `Conflict` on any duplicate identity
    async fn insert(&self, user: User) -> AppResult<User>;

    /// Apply a normalized change-set as one keyed update
    async fn apply_change_set(&self, key: &UserKey, changes: ChangeSet) -> AppResult<u64>;

    /// Write a single column
    async fn set_column(&self, key: &UserKey, value: SingleColumn) -> AppResult<u64>;

    /// Delete by key
    async fn delete(&self, key: &UserKey) -> AppResult<u64>;

    /// Count rows matching a key (0 or 1)
    async fn count_matching(&self, key: &UserKey) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn identity_taken(&self, user: &User) -> AppResult<bool> {
        let existing = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(user.username.as_str()))
                    .add(user::Column::Email.eq(user.email.as_str()))
                    .add(user::Column::Phone.eq(user.phone.as_str())),
            )
            .count(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(existing > 0)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_one(&self, key: &UserKey) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(key_condition(key))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_credential(&self, key: &UserKey) -> AppResult<Option<CredentialRecord>> {
        let row = UserEntity::find()
            .select_only()
            .column(user::Column::PasswordDigest)
            .column(user::Column::Salt)
            .column(user::Column::Enabled)
            .filter(key_condition(key))
            .into_tuple::<(String, String, bool)>()
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(row.map(|(digest, salt, enabled)| CredentialRecord {
            credential: StoredCredential::from_parts(digest, salt),
            enabled,
        }))
    }

    async fn find_many(&self, query: &ListQuery) -> AppResult<Vec<User>> {
        let mut select = UserEntity::find();
        for filter in &query.filters {
            select = select.filter(filter_condition(filter));
        }
        if let Some(field) = query.order_by {
            let order = if query.descending { Order::Desc } else { Order::Asc };
            select = select.order_by(sort_column(field), order);
        }

        let models = select
            .limit(query.limit())
            .offset(query.offset)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn insert(&self, user: User) -> AppResult<User> {
        // Early exit only; the unique indexes decide between concurrent
        // creators. No surrounding transaction: the count must not hold a
        // read lock the INSERT has to upgrade.
        if self.identity_taken(&user).await? {
            return Err(AppError::conflict("User"));
        }

        let data = encode_data(&user.data)?;
        UserEntity::insert(ActiveModel::from_user(user.clone(), data))
            .exec_without_returning(&self.db)
            .await
            .map_err(map_write_err)?;

        Ok(user)
    }

    async fn apply_change_set(&self, key: &UserKey, changes: ChangeSet) -> AppResult<u64> {
        if changes.is_empty() {
            return self.count_matching(key).await;
        }

        let mut update = UserEntity::update_many().filter(key_condition(key));

        if let Some(name) = changes.name {
            update = update.col_expr(user::Column::Name, Expr::value(name));
        }
        if let Some(phone) = changes.phone {
            update = update.col_expr(user::Column::Phone, Expr::value(phone));
        }
        if let Some(credential) = changes.credential {
            // Same statement, so digest and salt land together or not at all
            let (digest, salt) = credential.into_parts();
            update = update
                .col_expr(user::Column::PasswordDigest, Expr::value(digest))
                .col_expr(user::Column::Salt, Expr::value(salt));
        }
        if let Some(status) = changes.status {
            update = update.col_expr(user::Column::Status, Expr::value(status.to_string()));
        }
        if let Some(enabled) = changes.enabled {
            update = update.col_expr(user::Column::Enabled, Expr::value(enabled));
        }
        if let Some(data) = changes.data {
            update = update.col_expr(user::Column::Data, Expr::value(data));
        }

        let result = update.exec(&self.db).await.map_err(map_write_err)?;
        Ok(result.rows_affected)
    }

    async fn set_column(&self, key: &UserKey, value: SingleColumn) -> AppResult<u64> {
        let (column, expr) = match value {
            SingleColumn::Enabled(enabled) => (user::Column::Enabled, Expr::value(enabled)),
            SingleColumn::Status(status) => (user::Column::Status, Expr::value(status.to_string())),
        };

        let result = UserEntity::update_many()
            .col_expr(column, expr)
            .filter(key_condition(key))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, key: &UserKey) -> AppResult<u64> {
        let result = UserEntity::delete_many()
            .filter(key_condition(key))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn count_matching(&self, key: &UserKey) -> AppResult<u64> {
        UserEntity::find()
            .filter(key_condition(key))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }
}

fn key_condition(key: &UserKey) -> SimpleExpr {
    match key {
        UserKey::Id(id) => user::Column::Id.eq(*id),
        UserKey::Username(username) => user::Column::Username.eq(username.as_str()),
        UserKey::Email(email) => user::Column::Email.eq(email.as_str()),
    }
}

fn filter_condition(filter: &UserFilter) -> SimpleExpr {
    match filter {
        UserFilter::Name(name) => user::Column::Name.eq(name.as_str()),
        UserFilter::Username(username) => user::Column::Username.eq(username.as_str()),
        UserFilter::Email(email) => user::Column::Email.eq(email.as_str()),
        UserFilter::Phone(phone) => user::Column::Phone.eq(phone.as_str()),
        UserFilter::Status(status) => user::Column::Status.eq(status.as_str()),
        UserFilter::Enabled(enabled) => user::Column::Enabled.eq(*enabled),
    }
}

fn sort_column(field: SortField) -> user::Column {
    match field {
        SortField::Id => user::Column::Id,
        SortField::Name => user::Column::Name,
        SortField::Username => user::Column::Username,
        SortField::Email => user::Column::Email,
        SortField::Phone => user::Column::Phone,
        SortField::CreatedAt => user::Column::CreatedAt,
        SortField::Status => user::Column::Status,
        SortField::Enabled => user::Column::Enabled,
    }
}

/// Unique-constraint violations become `Conflict`; everything else is a
/// storage error.
fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("User"),
        _ => AppError::from(err),
    }
}
