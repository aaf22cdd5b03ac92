use std::{sync::Arc, time::Duration};

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, RuntimeErr,
    SqlErr, TransactionTrait, Value, sea_query::Expr,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    changes::MovieChanges,
    entities::movie,
    error::AppResult,
    id_allocator::{format_movie_id, next_id_number},
    models::MovieDraft,
};

/// Attempts at allocating a batch of ids before a conflict is reported.
const MAX_ALLOCATION_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// SQLite primary result codes for a writer that lost the lock.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Persistence for the `movies` table. Cloning shares the connection pool
/// and the allocation lock.
#[derive(Clone)]
pub struct MovieRepository {
    db: DatabaseConnection,
    allocation: Arc<Mutex<()>>,
}

impl MovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, allocation: Arc::new(Mutex::new(())) }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Assigns sequential ids to `drafts` and inserts them as one batch.
    ///
    /// Creates within this process run one at a time. Allocation and insert
    /// share a transaction; if another process claimed the same ids first or
    /// held the write lock, the batch is rolled back and allocation starts over.
    pub async fn create_many(&self, drafts: &[MovieDraft]) -> AppResult<Vec<movie::Model>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self.allocation.lock().await;
        let mut attempt = 1;
        loop {
            match self.try_create_many(drafts).await {
                Ok(created) => return Ok(created),
                Err(err) if attempt < MAX_ALLOCATION_ATTEMPTS && is_retryable(&err) => {
                    warn!(attempt, error = %err, "movie id allocation conflict, reallocating");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn try_create_many(&self, drafts: &[MovieDraft]) -> Result<Vec<movie::Model>, DbErr> {
        let txn = self.db.begin().await?;

        let first = next_id_number(&txn).await?;
        let last = first
            .checked_add(drafts.len() as u64 - 1)
            .ok_or_else(|| DbErr::Custom("movie id sequence exhausted".into()))?;
        let movies: Vec<movie::Model> = drafts
            .iter()
            .cloned()
            .zip(first..=last)
            .map(|(draft, n)| draft.into_model(format_movie_id(n)))
            .collect();

        movie::Entity::insert_many(movies.iter().cloned().map(movie::ActiveModel::from))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        debug!(count = movies.len(), first_id = %movies[0].id, "inserted movies");
        Ok(movies)
    }

    /// Records matching `condition`, in storage order.
    pub async fn find(&self, condition: Condition) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find().filter(condition).all(&self.db).await?;
        Ok(movies)
    }

    pub async fn find_one(
        &self,
        column: movie::Column,
        value: impl Into<Value>,
    ) -> AppResult<Option<movie::Model>> {
        let movie = movie::Entity::find().filter(column.eq(value)).one(&self.db).await?;
        Ok(movie)
    }

    /// Writes the changed fields of the movie with `id`. Returns the matched row count.
    pub async fn update_one(&self, id: &str, changes: &MovieChanges) -> AppResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut update = movie::Entity::update_many().filter(movie::Column::Id.eq(id));
        for (field, value) in changes.iter() {
            update = update.col_expr(field.column(), Expr::value(value.clone()));
        }
        if let Some(title) = changes.title() {
            update = update.col_expr(movie::Column::TitleFolded, Expr::value(movie::fold_title(title)));
        }

        let res = update.exec(&self.db).await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_one(&self, id: &str) -> AppResult<u64> {
        let res = movie::Entity::delete_many()
            .filter(movie::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn delete_all(&self) -> AppResult<u64> {
        let res = movie::Entity::delete_many().exec(&self.db).await?;
        Ok(res.rows_affected)
    }
}

/// Key conflicts and lost write locks; both leave nothing behind once the
/// transaction is dropped.
fn is_retryable(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) || is_busy(err)
}

fn is_busy(err: &DbErr) -> bool {
    let sqlx_err = match err {
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };
    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .and_then(|code| code.parse::<i32>().ok())
        // extended codes (e.g. SQLITE_BUSY_SNAPSHOT = 517) carry the primary code in the low byte
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_errors_are_not_retried() {
        assert!(!is_retryable(&DbErr::Custom("movie id sequence exhausted".into())));
        assert!(!is_retryable(&DbErr::RecordNotInserted));
    }
}
