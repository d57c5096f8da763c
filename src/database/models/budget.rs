use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::{Column, ColumnKind, Ownership, Resource, ResourceDescriptor};

/// Spending limit over a date range. `end_date > start_date` is a table CHECK, not validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Budget {
    pub budget_id: i32,
    pub user_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

static BUDGET: ResourceDescriptor = ResourceDescriptor {
    table: "budgets",
    id_column: "budget_id",
    ownership: Ownership::Column("user_id"),
    singular: "budget",
    plural: "budgets",
    noun: "budget",
    noun_plural: "budgets",
    columns: &[
        Column::required("amount", ColumnKind::Amount),
        Column::required("start_date", ColumnKind::Date),
        Column::required("end_date", ColumnKind::Date),
    ],
    touches_updated_at: false,
};

impl Resource for Budget {
    fn descriptor() -> &'static ResourceDescriptor {
        &BUDGET
    }
}
