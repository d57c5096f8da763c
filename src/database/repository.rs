use sqlx::PgPool;
use tracing::{debug, warn};

use crate::database::manager::DatabaseError;
use crate::database::models::Account;
use crate::database::query_builder::QueryBuilder;
use crate::database::record::{Record, RecordUpdate};
use crate::database::resource::{Access, Resource, ResourceDescriptor, Scope};

/// Generic CRUD engine for one resource table.
///
/// Every operation first authorizes the caller into a [`Scope`] and then carries that scope
/// in the WHERE clause of each statement, so rows owned by another account surface as
/// `NotFound` exactly like ids that do not exist. Multi-statement operations run in one
/// transaction so the returned row is the one written.
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: Resource> Repository<T> {
    fn descriptor(&self) -> &'static ResourceDescriptor {
        T::descriptor()
    }

    fn not_found(&self, id: i32) -> DatabaseError {
        DatabaseError::NotFound(format!("{} with ID {} not found", self.descriptor().label(), id))
    }

    pub async fn get_one(&self, id: i32, account: &Account) -> Result<T, DatabaseError> {
        let scope = Scope::authorize(self.descriptor(), account, Access::Read);
        let stmt = QueryBuilder::new(self.descriptor()).select_by_id(id, &scope);

        stmt.query_as::<T>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                warn!(table = self.descriptor().table, id, user_id = account.user_id, "record not found");
                self.not_found(id)
            })
    }

    /// Rows whose id is in `ids`. Partial hits succeed; only an empty result is `NotFound`.
    pub async fn get_many(&self, ids: &[i32], account: &Account) -> Result<Vec<T>, DatabaseError> {
        let scope = Scope::authorize(self.descriptor(), account, Access::Read);
        let stmt = QueryBuilder::new(self.descriptor()).select_by_ids(ids, &scope);

        let rows = stmt.query_as::<T>().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Err(DatabaseError::NotFound(format!(
                "No {} found for IDs {:?}",
                self.descriptor().noun_plural,
                ids
            )));
        }

        debug!(table = self.descriptor().table, requested = ids.len(), found = rows.len(), "fetched records by id");
        Ok(rows)
    }

    pub async fn get_all(&self, account: &Account) -> Result<Vec<T>, DatabaseError> {
        let scope = Scope::authorize(self.descriptor(), account, Access::List);
        let stmt = QueryBuilder::new(self.descriptor()).select_all(&scope);

        let rows = stmt.query_as::<T>().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Err(DatabaseError::NotFound(format!(
                "No {} found for the user.",
                self.descriptor().noun_plural
            )));
        }
        Ok(rows)
    }

    /// Insert a validated record and return it as stored.
    ///
    /// `owner` is the authenticated caller; its id is stamped into the owner column of
    /// owned resources. Account rows are created without one.
    pub async fn create(&self, record: &Record, owner: Option<&Account>) -> Result<T, DatabaseError> {
        let descriptor = self.descriptor();
        let stamp = owner.and_then(|account| Scope::owner_stamp(descriptor, account));

        let mut tx = self.pool.begin().await?;

        let insert = QueryBuilder::new(descriptor).insert(record, stamp);
        let id: i32 = insert.query_scalar().fetch_one(&mut *tx).await?;

        let select = QueryBuilder::new(descriptor).select_by_id(id, &Scope::Unscoped);
        let row = select.query_as::<T>().fetch_one(&mut *tx).await?;

        tx.commit().await?;

        debug!(table = descriptor.table, id, "record created");
        Ok(row)
    }

    /// Apply a partial update. Zero affected rows is `NotFound`: the id is unknown, owned by
    /// someone else, or every supplied value already matches the stored row.
    pub async fn update(&self, update: &RecordUpdate, account: &Account) -> Result<T, DatabaseError> {
        let descriptor = self.descriptor();
        let scope = Scope::authorize(descriptor, account, Access::Write);

        let mut tx = self.pool.begin().await?;

        let stmt = QueryBuilder::new(descriptor).update(update.id, &update.record, &scope);
        let affected = stmt.query().execute(&mut *tx).await?.rows_affected();
        if affected == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::NotFound(format!(
                "{} with ID {} not found or nothing to update.",
                descriptor.label(),
                update.id
            )));
        }

        let select = QueryBuilder::new(descriptor).select_by_id(update.id, &scope);
        let row = select.query_as::<T>().fetch_one(&mut *tx).await?;

        tx.commit().await?;

        debug!(table = descriptor.table, id = update.id, fields = update.record.len(), "record updated");
        Ok(row)
    }

    /// Delete a row and return its pre-deletion snapshot.
    pub async fn delete(&self, id: i32, account: &Account) -> Result<T, DatabaseError> {
        let descriptor = self.descriptor();
        let scope = Scope::authorize(descriptor, account, Access::Write);

        let mut tx = self.pool.begin().await?;

        let select = QueryBuilder::new(descriptor).select_by_id(id, &scope);
        let row = match select.query_as::<T>().fetch_optional(&mut *tx).await? {
            Some(row) => row,
            None => {
                tx.rollback().await?;
                return Err(self.not_found(id));
            }
        };

        QueryBuilder::new(descriptor)
            .delete(id, &scope)
            .query()
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(table = descriptor.table, id, "record deleted");
        Ok(row)
    }
}

/// Account lookups used by authentication.
impl Repository<Account> {
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// Match `identifier` against either the username or the email column.
    pub async fn find_by_login(&self, identifier: &str) -> Result<Option<Account>, DatabaseError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM users WHERE username = $1 OR email = $1 ORDER BY user_id LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Whether an account already uses this username or this email.
    pub async fn exists(&self, username: &str, email: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
