use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::resource::{Column, ColumnKind, Ownership, Resource, ResourceDescriptor};

/// Direction of a transaction. Stored as the `transaction_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("'{}' is not one of 'income', 'expense'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub transaction_id: i32,
    pub user_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

static TRANSACTION: ResourceDescriptor = ResourceDescriptor {
    table: "transactions",
    id_column: "transaction_id",
    ownership: Ownership::Column("user_id"),
    singular: "transaction",
    plural: "transactions",
    noun: "transaction",
    noun_plural: "transactions",
    columns: &[
        Column::required("amount", ColumnKind::Amount),
        Column::optional("description", ColumnKind::Text { max_len: 255 }),
        Column::required("transaction_date", ColumnKind::Date),
        Column::required("type", ColumnKind::TransactionKind),
    ],
    touches_updated_at: false,
};

impl Resource for Transaction {
    fn descriptor() -> &'static ResourceDescriptor {
        &TRANSACTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_closed_set() {
        assert_eq!("income".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse::<TransactionKind>(), Ok(TransactionKind::Expense));
        assert!("transfer".parse::<TransactionKind>().is_err());
        assert!("Income".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn serializes_kind_under_type_key() {
        let tx = Transaction {
            transaction_id: 3,
            user_id: 1,
            amount: Decimal::new(1250, 2),
            description: None,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            kind: TransactionKind::Expense,
            created_at: Utc::now(),
        };

        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["type"], "expense");
        assert_eq!(v["amount"], 12.5);
        assert_eq!(v["transaction_date"], "2024-03-01");
        assert!(v.get("kind").is_none());
    }
}
