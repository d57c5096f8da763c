use sqlx::{self, postgres::PgArguments, FromRow, Postgres};

use crate::database::record::{Record, SqlValue};
use crate::database::resource::{ResourceDescriptor, Scope};

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn query_as<'q, O>(&'q self) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.params
            .iter()
            .fold(sqlx::query_as::<_, O>(&self.sql), |q, v| bind_param_query_as(q, v))
    }

    pub fn query_scalar<'q>(&'q self) -> sqlx::query::QueryScalar<'q, Postgres, i32, PgArguments> {
        self.params
            .iter()
            .fold(sqlx::query_scalar::<_, i32>(&self.sql), |q, v| bind_param_query_scalar(q, v))
    }

    pub fn query(&self) -> sqlx::query::Query<'_, Postgres, PgArguments> {
        self.params.iter().fold(sqlx::query(&self.sql), |q, v| bind_param_query(q, v))
    }
}

/// Builds the statement shapes used by the generic CRUD engine for one table.
pub struct QueryBuilder<'d> {
    descriptor: &'d ResourceDescriptor,
    params: Vec<SqlValue>,
}

impl<'d> QueryBuilder<'d> {
    pub fn new(descriptor: &'d ResourceDescriptor) -> Self {
        Self { descriptor, params: Vec::new() }
    }

    fn push(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn finish(self, sql: String) -> Statement {
        tracing::debug!(table = self.descriptor.table, sql = %sql, "built statement");
        Statement { sql, params: self.params }
    }

    fn scope_clause(&mut self, scope: &Scope) -> String {
        match scope {
            Scope::Unscoped => String::new(),
            Scope::OwnedBy { column, user_id } => {
                let p = self.push(SqlValue::Int(*user_id));
                format!(" AND {} = {}", quote_identifier(column), p)
            }
        }
    }

    /// `SELECT * ... WHERE id = $1 [AND owner = $2]`
    pub fn select_by_id(mut self, id: i32, scope: &Scope) -> Statement {
        let p = self.push(SqlValue::Int(id));
        let scope = self.scope_clause(scope);
        let sql = format!(
            "SELECT * FROM {} WHERE {} = {}{}",
            quote_identifier(self.descriptor.table),
            quote_identifier(self.descriptor.id_column),
            p,
            scope
        );
        self.finish(sql)
    }

    /// `SELECT * ... WHERE id = ANY($1) [AND owner = $2] ORDER BY id`
    pub fn select_by_ids(mut self, ids: &[i32], scope: &Scope) -> Statement {
        let p = self.push(SqlValue::IntList(ids.to_vec()));
        let scope = self.scope_clause(scope);
        let id = quote_identifier(self.descriptor.id_column);
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ANY({}){} ORDER BY {}",
            quote_identifier(self.descriptor.table),
            id,
            p,
            scope,
            id
        );
        self.finish(sql)
    }

    /// `SELECT * ... WHERE TRUE [AND owner = $1] ORDER BY id`
    pub fn select_all(mut self, scope: &Scope) -> Statement {
        let scope = self.scope_clause(scope);
        let sql = format!(
            "SELECT * FROM {} WHERE TRUE{} ORDER BY {}",
            quote_identifier(self.descriptor.table),
            scope,
            quote_identifier(self.descriptor.id_column)
        );
        self.finish(sql)
    }

    /// `INSERT INTO ... (cols) VALUES (...) RETURNING id`
    pub fn insert(mut self, record: &Record, owner: Option<(&'static str, i32)>) -> Statement {
        let mut columns = Vec::with_capacity(record.len() + 1);
        let mut placeholders = Vec::with_capacity(record.len() + 1);

        for (column, value) in record.columns().zip(record.values()) {
            columns.push(quote_identifier(column));
            placeholders.push(self.push(value.clone()));
        }
        if let Some((column, user_id)) = owner {
            columns.push(quote_identifier(column));
            placeholders.push(self.push(SqlValue::Int(user_id)));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quote_identifier(self.descriptor.table),
            columns.join(", "),
            placeholders.join(", "),
            quote_identifier(self.descriptor.id_column)
        );
        self.finish(sql)
    }

    /// `UPDATE ... SET col = $n, ... WHERE id = $m [AND owner = $k] AND (cols) IS DISTINCT FROM ($n, ...)`
    ///
    /// The row only matches when at least one supplied column actually changes, so the
    /// affected count is zero for a no-op update. `updated_at` is not part of the comparison.
    pub fn update(mut self, id: i32, record: &Record, scope: &Scope) -> Statement {
        let mut assignments: Vec<String> = Vec::with_capacity(record.len() + 1);
        let mut columns: Vec<String> = Vec::with_capacity(record.len());
        let mut placeholders: Vec<String> = Vec::with_capacity(record.len());
        for (column, value) in record.columns().zip(record.values()) {
            let p = self.push(value.clone());
            assignments.push(format!("{} = {}", quote_identifier(column), p));
            columns.push(quote_identifier(column));
            placeholders.push(p);
        }
        if self.descriptor.touches_updated_at {
            assignments.push(format!("{} = NOW()", quote_identifier("updated_at")));
        }

        let p = self.push(SqlValue::Int(id));
        let scope = self.scope_clause(scope);
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}{} AND ({}) IS DISTINCT FROM ({})",
            quote_identifier(self.descriptor.table),
            assignments.join(", "),
            quote_identifier(self.descriptor.id_column),
            p,
            scope,
            columns.join(", "),
            placeholders.join(", ")
        );
        self.finish(sql)
    }

    /// `DELETE FROM ... WHERE id = $1 [AND owner = $2]`
    pub fn delete(mut self, id: i32, scope: &Scope) -> Statement {
        let p = self.push(SqlValue::Int(id));
        let scope = self.scope_clause(scope);
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}{}",
            quote_identifier(self.descriptor.table),
            quote_identifier(self.descriptor.id_column),
            p,
            scope
        );
        self.finish(sql)
    }
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::IntList(ids) => q.bind(ids.clone()),
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Date(d) => q.bind(*d),
        SqlValue::Kind(k) => q.bind(*k),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::IntList(ids) => q.bind(ids.clone()),
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Date(d) => q.bind(*d),
        SqlValue::Kind(k) => q.bind(*k),
    }
}

fn bind_param_query_scalar<'q>(
    q: sqlx::query::QueryScalar<'q, Postgres, i32, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::QueryScalar<'q, Postgres, i32, PgArguments> {
    match v {
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::IntList(ids) => q.bind(ids.clone()),
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Date(d) => q.bind(*d),
        SqlValue::Kind(k) => q.bind(*k),
    }
}
