use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::{Column, ColumnKind, Ownership, Resource, ResourceDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SavingsGoal {
    pub goal_id: i32,
    pub user_id: i32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static SAVINGS_GOAL: ResourceDescriptor = ResourceDescriptor {
    table: "savings_goals",
    id_column: "goal_id",
    ownership: Ownership::Column("user_id"),
    singular: "goal",
    plural: "goals",
    noun: "savings goal",
    noun_plural: "savings goals",
    columns: &[
        Column::required("name", ColumnKind::Text { max_len: 100 }),
        Column::required("target_amount", ColumnKind::Balance),
        // Omitted on create falls back to the column default of 0
        Column::optional("current_amount", ColumnKind::Balance).not_null(),
        Column::optional("target_date", ColumnKind::Date),
    ],
    touches_updated_at: true,
};

impl Resource for SavingsGoal {
    fn descriptor() -> &'static ResourceDescriptor {
        &SAVINGS_GOAL
    }
}
