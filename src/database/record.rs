use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::auth::hash_password;
use crate::database::models::TransactionKind;
use crate::database::resource::{Column, ColumnKind, ResourceDescriptor};

/// Typed value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i32),
    IntList(Vec<i32>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
    Date(Option<NaiveDate>),
    Kind(TransactionKind),
}

/// Errors that can occur while validating an API payload against a resource descriptor
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    #[error("Expected a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("{0} is required")]
    MissingId(String),
    #[error("No fields provided to update")]
    NoFieldsToUpdate,
    #[error("Invalid id list for '{param}': {reason}")]
    InvalidIdList { param: String, reason: String },
}

impl RecordError {
    /// Field the error is attached to, for per-field error reporting.
    pub fn field(&self) -> Option<&str> {
        match self {
            RecordError::MissingRequiredField(field) => Some(field),
            RecordError::InvalidValue { field, .. } => Some(field),
            RecordError::MissingId(field) => Some(field),
            RecordError::InvalidIdList { param, .. } => Some(param),
            RecordError::NotAnObject | RecordError::NoFieldsToUpdate => None,
        }
    }
}

/// Validated column values ready to be written, in descriptor column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(&'static str, SqlValue)>,
}

/// Validated partial update: target id plus the columns to change.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub id: i32,
    pub record: Record,
}

impl Record {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.iter().find(|(name, _)| *name == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> + '_ {
        self.values.iter().map(|(_, v)| v)
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) -> &mut Self {
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((column, value)),
        }
        self
    }

    /// Validate a create payload.
    ///
    /// Every required column must be present and non-null. Optional columns may be omitted
    /// (the table default applies) or null when nullable. Keys that are not writable
    /// columns, including ids, owner ids and timestamps, are ignored.
    pub fn for_create(descriptor: &ResourceDescriptor, payload: &Value) -> Result<Self, RecordError> {
        let map = as_object(payload)?;
        let mut record = Record::default();

        for column in descriptor.columns {
            match map.get(column.input) {
                None | Some(Value::Null) if column.required => {
                    return Err(RecordError::MissingRequiredField(column.input.to_string()));
                }
                None => continue,
                Some(Value::Null) if !column.nullable => {
                    return Err(invalid(column, "must not be null"));
                }
                Some(value) => {
                    record.set(column.name, convert(column, value)?);
                }
            }
        }

        Ok(record)
    }

    /// Validate an update payload carrying the descriptor's id column plus a subset of fields.
    ///
    /// Null values are treated as "not supplied", matching how partial updates are sent by
    /// clients. Fails when the id is absent or when no writable field remains.
    pub fn for_update(descriptor: &ResourceDescriptor, payload: &Value) -> Result<RecordUpdate, RecordError> {
        let map = as_object(payload)?;

        let id = match map.get(descriptor.id_column) {
            None | Some(Value::Null) => return Err(RecordError::MissingId(descriptor.id_column.to_string())),
            Some(value) => parse_id(value).ok_or_else(|| RecordError::InvalidValue {
                field: descriptor.id_column.to_string(),
                reason: "expected an integer id".to_string(),
            })?,
        };

        let mut record = Record::default();
        for column in descriptor.columns {
            match map.get(column.input) {
                None | Some(Value::Null) => continue,
                Some(value) => {
                    record.set(column.name, convert(column, value)?);
                }
            }
        }

        if record.is_empty() {
            return Err(RecordError::NoFieldsToUpdate);
        }

        Ok(RecordUpdate { id, record })
    }
}

/// Parse the JSON-encoded id array passed in a query string, e.g. `[1,2,3]`.
pub fn parse_id_list(param: &str, raw: &str) -> Result<Vec<i32>, RecordError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| RecordError::InvalidIdList {
        param: param.to_string(),
        reason: e.to_string(),
    })?;

    let items = value.as_array().ok_or_else(|| RecordError::InvalidIdList {
        param: param.to_string(),
        reason: "expected a JSON array".to_string(),
    })?;

    items
        .iter()
        .map(|item| {
            parse_id(item).ok_or_else(|| RecordError::InvalidIdList {
                param: param.to_string(),
                reason: format!("{} is not an integer id", item),
            })
        })
        .collect()
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, RecordError> {
    payload.as_object().ok_or(RecordError::NotAnObject)
}

fn parse_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid(column: &Column, reason: impl Into<String>) -> RecordError {
    RecordError::InvalidValue {
        field: column.input.to_string(),
        reason: reason.into(),
    }
}

fn convert(column: &Column, value: &Value) -> Result<SqlValue, RecordError> {
    if value.is_null() {
        return Ok(match column.kind {
            ColumnKind::Amount | ColumnKind::Balance => SqlValue::Decimal(None),
            ColumnKind::Date => SqlValue::Date(None),
            _ => SqlValue::Text(None),
        });
    }

    match column.kind {
        ColumnKind::Text { max_len } => {
            let s = expect_str(column, value)?;
            if s.chars().count() > max_len {
                return Err(invalid(column, format!("must be at most {} characters", max_len)));
            }
            Ok(SqlValue::Text(Some(s.to_string())))
        }
        ColumnKind::Email => {
            let s = expect_str(column, value)?;
            validate_email_format(s).map_err(|reason| invalid(column, reason))?;
            Ok(SqlValue::Text(Some(s.to_string())))
        }
        ColumnKind::Amount => {
            let amount = expect_money(column, value)?;
            if amount <= Decimal::ZERO {
                return Err(invalid(column, "must be greater than 0"));
            }
            Ok(SqlValue::Decimal(Some(amount)))
        }
        ColumnKind::Balance => {
            let amount = expect_money(column, value)?;
            if amount < Decimal::ZERO {
                return Err(invalid(column, "must not be negative"));
            }
            Ok(SqlValue::Decimal(Some(amount)))
        }
        ColumnKind::Date => {
            let s = expect_str(column, value)?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| SqlValue::Date(Some(d)))
                .map_err(|_| invalid(column, "expected a date formatted YYYY-MM-DD"))
        }
        ColumnKind::TransactionKind => {
            let s = expect_str(column, value)?;
            s.parse::<TransactionKind>()
                .map(SqlValue::Kind)
                .map_err(|reason| invalid(column, reason))
        }
        ColumnKind::Secret => {
            let s = expect_str(column, value)?;
            if s.is_empty() {
                return Err(invalid(column, "must not be empty"));
            }
            Ok(SqlValue::Text(Some(hash_password(s))))
        }
    }
}

fn expect_str<'v>(column: &Column, value: &'v Value) -> Result<&'v str, RecordError> {
    value.as_str().ok_or_else(|| invalid(column, "expected a string"))
}

fn expect_decimal(column: &Column, value: &Value) -> Result<Decimal, RecordError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(invalid(column, "expected a number")),
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| invalid(column, "expected a decimal number"))
}

/// Largest value a `NUMERIC(10,2)` column holds, 99999999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// A decimal that fits `NUMERIC(10,2)` without rounding.
fn expect_money(column: &Column, value: &Value) -> Result<Decimal, RecordError> {
    let amount = expect_decimal(column, value)?.normalize();
    if amount.scale() > 2 {
        return Err(invalid(column, "must have at most 2 decimal places"));
    }
    if amount.abs() > MAX_MONEY {
        return Err(invalid(column, format!("must not exceed {}", MAX_MONEY)));
    }
    Ok(amount)
}

/// Basic structural email check: one `@` with non-empty local and domain parts, and a dotted domain.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.chars().count() > 100 {
        return Err("Email must be at most 100 characters".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Account, Budget, Income, SavingsGoal, Transaction};
    use crate::database::resource::Resource;
    use serde_json::json;

    #[test]
    fn create_income_converts_typed_values() {
        let payload = json!({
            "user_id": 99,
            "amount": 1500.25,
            "description": "salary",
            "income_date": "2024-05-01",
            "created_at": "ignored"
        });

        let record = Record::for_create(Income::descriptor(), &payload).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("amount"), Some(&SqlValue::Decimal(Some(Decimal::new(150025, 2)))));
        assert_eq!(record.get("description"), Some(&SqlValue::Text(Some("salary".into()))));
        assert_eq!(
            record.get("income_date"),
            Some(&SqlValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1)))
        );
        // Owner comes from the authenticated caller, never the payload
        assert!(record.get("user_id").is_none());
    }

    #[test]
    fn create_requires_required_columns() {
        let payload = json!({ "amount": 10 });
        assert_eq!(
            Record::for_create(Income::descriptor(), &payload),
            Err(RecordError::MissingRequiredField("income_date".into()))
        );

        let payload = json!({ "amount": null, "income_date": "2024-01-01" });
        assert_eq!(
            Record::for_create(Income::descriptor(), &payload),
            Err(RecordError::MissingRequiredField("amount".into()))
        );
    }

    #[test]
    fn create_allows_null_description_and_omitted_defaults() {
        let payload = json!({ "amount": "12.00", "description": null, "expense_date": "2024-01-02" });
        let record = Record::for_create(crate::database::models::Expense::descriptor(), &payload).unwrap();
        assert_eq!(record.get("description"), Some(&SqlValue::Text(None)));

        let goal = json!({ "name": "bike", "target_amount": 500 });
        let record = Record::for_create(SavingsGoal::descriptor(), &goal).unwrap();
        assert!(record.get("current_amount").is_none());
        assert!(record.get("target_date").is_none());

        let goal = json!({ "name": "bike", "target_amount": 500, "current_amount": null });
        assert!(matches!(
            Record::for_create(SavingsGoal::descriptor(), &goal),
            Err(RecordError::InvalidValue { field, .. }) if field == "current_amount"
        ));
    }

    #[test]
    fn amounts_must_be_positive_and_balances_non_negative() {
        let payload = json!({ "amount": 0, "start_date": "2024-01-01", "end_date": "2024-02-01" });
        assert!(matches!(
            Record::for_create(Budget::descriptor(), &payload),
            Err(RecordError::InvalidValue { field, .. }) if field == "amount"
        ));

        let goal = json!({ "name": "car", "target_amount": 0, "current_amount": -1 });
        assert!(matches!(
            Record::for_create(SavingsGoal::descriptor(), &goal),
            Err(RecordError::InvalidValue { field, .. }) if field == "current_amount"
        ));
    }

    #[test]
    fn money_is_limited_to_cents() {
        let payload = json!({ "amount": 10.005, "income_date": "2024-01-01" });
        assert!(matches!(
            Record::for_create(Income::descriptor(), &payload),
            Err(RecordError::InvalidValue { field, reason })
                if field == "amount" && reason == "must have at most 2 decimal places"
        ));

        let goal = json!({ "goal_id": 1, "current_amount": "0.001" });
        assert!(matches!(
            Record::for_update(SavingsGoal::descriptor(), &goal),
            Err(RecordError::InvalidValue { field, .. }) if field == "current_amount"
        ));

        // Trailing zeros are not extra precision
        let payload = json!({ "amount": "10.5000", "income_date": "2024-01-01" });
        let record = Record::for_create(Income::descriptor(), &payload).unwrap();
        assert_eq!(record.get("amount"), Some(&SqlValue::Decimal(Some(Decimal::new(105, 1)))));
    }

    #[test]
    fn money_is_limited_to_the_column_range() {
        let payload = json!({ "amount": "99999999.99", "income_date": "2024-01-01" });
        let record = Record::for_create(Income::descriptor(), &payload).unwrap();
        assert_eq!(record.get("amount"), Some(&SqlValue::Decimal(Some(MAX_MONEY))));

        for amount in [json!("100000000"), json!(100000000.5), json!(1e12)] {
            let payload = json!({ "amount": amount, "income_date": "2024-01-01" });
            assert!(matches!(
                Record::for_create(Income::descriptor(), &payload),
                Err(RecordError::InvalidValue { field, .. }) if field == "amount"
            ));
        }

        let goal = json!({ "name": "moon", "target_amount": 1, "current_amount": 123456789012u64 });
        assert!(matches!(
            Record::for_create(SavingsGoal::descriptor(), &goal),
            Err(RecordError::InvalidValue { field, .. }) if field == "current_amount"
        ));
    }

    #[test]
    fn budget_date_order_is_left_to_the_store() {
        let payload = json!({ "amount": 100, "start_date": "2024-01-01", "end_date": "2024-01-01" });
        assert!(Record::for_create(Budget::descriptor(), &payload).is_ok());
    }

    #[test]
    fn transaction_kind_is_closed() {
        let payload = json!({ "amount": 5, "transaction_date": "2024-01-01", "type": "transfer" });
        assert!(matches!(
            Record::for_create(Transaction::descriptor(), &payload),
            Err(RecordError::InvalidValue { field, .. }) if field == "type"
        ));

        let payload = json!({ "amount": 5, "transaction_date": "2024-01-01", "type": "expense" });
        let record = Record::for_create(Transaction::descriptor(), &payload).unwrap();
        assert_eq!(record.get("type"), Some(&SqlValue::Kind(TransactionKind::Expense)));
    }

    #[test]
    fn account_password_is_hashed_into_password_hash() {
        let payload = json!({ "username": "a", "email": "a@x.com", "password": "p" });
        let record = Record::for_create(Account::descriptor(), &payload).unwrap();
        assert_eq!(record.get("password_hash"), Some(&SqlValue::Text(Some(hash_password("p")))));
        assert!(record.get("password").is_none());

        let payload = json!({ "username": "a", "email": "not-an-email", "password": "p" });
        assert!(matches!(
            Record::for_create(Account::descriptor(), &payload),
            Err(RecordError::InvalidValue { field, .. }) if field == "email"
        ));
    }

    #[test]
    fn update_requires_id_and_at_least_one_field() {
        let d = Income::descriptor();
        assert_eq!(
            Record::for_update(d, &json!({ "amount": 3 })),
            Err(RecordError::MissingId("income_id".into()))
        );
        assert_eq!(
            Record::for_update(d, &json!({ "income_id": 4 })),
            Err(RecordError::NoFieldsToUpdate)
        );
        // Owner and unknown keys never count as updatable fields
        assert_eq!(
            Record::for_update(d, &json!({ "income_id": 4, "user_id": 2, "bogus": true })),
            Err(RecordError::NoFieldsToUpdate)
        );
        assert_eq!(
            Record::for_update(d, &json!({ "income_id": 4, "description": null })),
            Err(RecordError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let update = Record::for_update(Income::descriptor(), &json!({ "income_id": 4, "description": "bonus" })).unwrap();
        assert_eq!(update.id, 4);
        assert_eq!(update.record.columns().collect::<Vec<_>>(), vec!["description"]);
    }

    #[test]
    fn update_rejects_non_integer_id() {
        assert!(matches!(
            Record::for_update(Income::descriptor(), &json!({ "income_id": "abc", "amount": 1 })),
            Err(RecordError::InvalidValue { field, .. }) if field == "income_id"
        ));
    }

    #[test]
    fn payload_must_be_object() {
        assert_eq!(
            Record::for_create(Income::descriptor(), &json!([1, 2])),
            Err(RecordError::NotAnObject)
        );
    }

    #[test]
    fn id_list_parsing() {
        assert_eq!(parse_id_list("income_ids", "[1, 2, 999]").unwrap(), vec![1, 2, 999]);
        assert_eq!(parse_id_list("income_ids", "[]").unwrap(), Vec::<i32>::new());
        assert!(parse_id_list("income_ids", "1,2").is_err());
        assert!(parse_id_list("income_ids", "{\"a\":1}").is_err());
        assert!(parse_id_list("income_ids", "[1.5]").is_err());
    }

    #[test]
    fn email_format() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("a@x").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@@x.com").is_err());
    }
}
