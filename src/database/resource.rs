use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow};

use crate::database::models::Account;

/// How records of a table relate to the requesting account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Every row carries the owning account id in this column.
    Column(&'static str),
    /// The row is the account itself. Reads are unscoped; writes and listings are
    /// restricted to the caller's own row through the id column.
    SelfRecord,
}

/// Value domain accepted for a writable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text { max_len: usize },
    Email,
    /// Strictly positive decimal.
    Amount,
    /// Non-negative decimal.
    Balance,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    Date,
    TransactionKind,
    /// Plaintext secret supplied under `Column::input`, stored as its digest.
    Secret,
}

/// Writable column of a resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    /// Payload key carrying the value; differs from `name` only for secrets.
    pub input: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
    pub nullable: bool,
}

impl Column {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, input: name, kind, required: true, nullable: false }
    }

    pub const fn optional(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, input: name, kind, required: false, nullable: true }
    }

    pub const fn secret(name: &'static str, input: &'static str) -> Self {
        Self { name, input, kind: ColumnKind::Secret, required: true, nullable: false }
    }

    /// Optional on input, but an explicit null is rejected.
    pub const fn not_null(self) -> Self {
        Self { nullable: false, ..self }
    }
}

/// Table metadata for one entity served by the generic CRUD engine.
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub table: &'static str,
    pub id_column: &'static str,
    pub ownership: Ownership,
    /// Lowercase names used in messages and route segments (`get_<singular>`, `get_<plural>`).
    pub singular: &'static str,
    pub plural: &'static str,
    /// Human-readable names for response messages, e.g. `savings goal`.
    pub noun: &'static str,
    pub noun_plural: &'static str,
    pub columns: &'static [Column],
    /// Whether updates also refresh an `updated_at` column.
    pub touches_updated_at: bool,
}

impl ResourceDescriptor {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Query-string key holding the JSON id list for `get_many`, e.g. `income_ids`.
    pub fn ids_param(&self) -> String {
        format!("{}s", self.id_column)
    }

    /// Capitalised noun for messages, e.g. `Savings goal`.
    pub fn label(&self) -> String {
        capitalize(self.noun)
    }

    pub fn plural_label(&self) -> String {
        capitalize(self.noun_plural)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A persisted entity served by the generic CRUD engine.
pub trait Resource: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static {
    fn descriptor() -> &'static ResourceDescriptor;
}

/// Kind of access an operation performs, used to derive its row scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    List,
    Write,
}

/// Row restriction applied to every statement of an operation.
///
/// A row outside the scope is indistinguishable from a missing row: both yield not-found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Unscoped,
    OwnedBy { column: &'static str, user_id: i32 },
}

impl Scope {
    /// Authorize `account` for `access` on `descriptor`, producing the filter every
    /// statement of the operation must carry.
    pub fn authorize(descriptor: &ResourceDescriptor, account: &Account, access: Access) -> Self {
        match (descriptor.ownership, access) {
            (Ownership::Column(column), _) => Scope::OwnedBy { column, user_id: account.user_id },
            (Ownership::SelfRecord, Access::Read) => Scope::Unscoped,
            (Ownership::SelfRecord, Access::List | Access::Write) => Scope::OwnedBy {
                column: descriptor.id_column,
                user_id: account.user_id,
            },
        }
    }

    /// Column that must be stamped with the caller's id on insert, if any.
    pub fn owner_stamp(descriptor: &ResourceDescriptor, account: &Account) -> Option<(&'static str, i32)> {
        match descriptor.ownership {
            Ownership::Column(column) => Some((column, account.user_id)),
            Ownership::SelfRecord => None,
        }
    }
}
