use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::{Column, ColumnKind, Ownership, Resource, ResourceDescriptor};

/// A registered identity. Every other record belongs to exactly one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    // Returned to callers as-is; existing clients read this field.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static ACCOUNT: ResourceDescriptor = ResourceDescriptor {
    table: "users",
    id_column: "user_id",
    ownership: Ownership::SelfRecord,
    singular: "user",
    plural: "users",
    noun: "user",
    noun_plural: "users",
    columns: &[
        Column::required("username", ColumnKind::Text { max_len: 50 }),
        Column::required("email", ColumnKind::Email),
        Column::secret("password_hash", "password"),
    ],
    touches_updated_at: true,
};

impl Resource for Account {
    fn descriptor() -> &'static ResourceDescriptor {
        &ACCOUNT
    }
}
