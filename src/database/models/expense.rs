use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::{Column, ColumnKind, Ownership, Resource, ResourceDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub expense_id: i32,
    pub user_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

static EXPENSE: ResourceDescriptor = ResourceDescriptor {
    table: "expenses",
    id_column: "expense_id",
    ownership: Ownership::Column("user_id"),
    singular: "expense",
    plural: "expenses",
    noun: "expense",
    noun_plural: "expenses",
    columns: &[
        Column::required("amount", ColumnKind::Amount),
        Column::optional("description", ColumnKind::Text { max_len: 255 }),
        Column::required("expense_date", ColumnKind::Date),
    ],
    touches_updated_at: false,
};

impl Resource for Expense {
    fn descriptor() -> &'static ResourceDescriptor {
        &EXPENSE
    }
}
