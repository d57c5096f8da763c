use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::{Column, ColumnKind, Ownership, Resource, ResourceDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Income {
    pub income_id: i32,
    pub user_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: Option<String>,
    pub income_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

static INCOME: ResourceDescriptor = ResourceDescriptor {
    table: "income",
    id_column: "income_id",
    ownership: Ownership::Column("user_id"),
    singular: "income",
    plural: "incomes",
    noun: "income",
    noun_plural: "incomes",
    columns: &[
        Column::required("amount", ColumnKind::Amount),
        Column::optional("description", ColumnKind::Text { max_len: 255 }),
        Column::required("income_date", ColumnKind::Date),
    ],
    touches_updated_at: false,
};

impl Resource for Income {
    fn descriptor() -> &'static ResourceDescriptor {
        &INCOME
    }
}
