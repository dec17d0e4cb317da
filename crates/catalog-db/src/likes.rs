//! The like ledger and its paired counter updates.
//!
//! A like is two writes with no transaction spanning them: insert into the
//! ledger, then bump the subject's counter. The ledger's unique constraint
//! on `(subject, user_id)` is the authoritative duplicate guard — the insert
//! itself rejects a concurrent duplicate, there is no check-then-insert
//! window. When the counter update matches no row (the subject was deleted
//! in between), the just-made ledger change is reversed before the error is
//! surfaced, so a ledger record never outlives its subject.

use sqlx::PgPool;

use crate::DbError;

/// The target of a like: a product or a brand. Selects which subject table,
/// ledger table, and ledger foreign-key column an operation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    Product,
    Brand,
}

impl SubjectKind {
    fn subject_table(self) -> &'static str {
        match self {
            SubjectKind::Product => "products",
            SubjectKind::Brand => "brands",
        }
    }

    fn ledger_table(self) -> &'static str {
        match self {
            SubjectKind::Product => "product_likes",
            SubjectKind::Brand => "brand_likes",
        }
    }

    fn ledger_fk(self) -> &'static str {
        match self {
            SubjectKind::Product => "product_id",
            SubjectKind::Brand => "brand_id",
        }
    }
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectKind::Product => write!(f, "product"),
            SubjectKind::Brand => write!(f, "brand"),
        }
    }
}

/// Records a like for `(subject_id, user_id)` and increments the subject's
/// `like_count`.
///
/// # Errors
///
/// - [`DbError::AlreadyLiked`] if a ledger record for the pair already
///   exists (including one inserted by a concurrent request).
/// - [`DbError::SubjectNotFound`] if the subject row is gone; the ledger
///   insert is rolled back first.
/// - [`DbError::Sqlx`] on any other database failure.
pub async fn like(
    pool: &PgPool,
    kind: SubjectKind,
    subject_id: i64,
    user_id: &str,
) -> Result<(), DbError> {
    let inserted = insert_ledger_record(pool, kind, subject_id, user_id).await?;
    if inserted == 0 {
        return Err(DbError::AlreadyLiked(kind));
    }

    if !adjust_counter(pool, kind, subject_id, 1).await? {
        // Compensation: the subject vanished after the ledger insert.
        delete_ledger_record(pool, kind, subject_id, user_id).await?;
        return Err(DbError::SubjectNotFound(kind));
    }

    Ok(())
}

/// Removes the like for `(subject_id, user_id)` and decrements the subject's
/// `like_count`.
///
/// # Errors
///
/// - [`DbError::NotLiked`] if no ledger record exists for the pair.
/// - [`DbError::SubjectNotFound`] if the subject row is gone; the ledger
///   record is re-inserted first.
/// - [`DbError::Sqlx`] on any other database failure.
pub async fn unlike(
    pool: &PgPool,
    kind: SubjectKind,
    subject_id: i64,
    user_id: &str,
) -> Result<(), DbError> {
    let deleted = delete_ledger_record(pool, kind, subject_id, user_id).await?;
    if deleted == 0 {
        return Err(DbError::NotLiked(kind));
    }

    if !adjust_counter(pool, kind, subject_id, -1).await? {
        // Compensation: restore the ledger record we just removed.
        insert_ledger_record(pool, kind, subject_id, user_id).await?;
        return Err(DbError::SubjectNotFound(kind));
    }

    Ok(())
}

/// Applies an atomic signed delta to the subject's `like_count`, clamped at
/// zero. Returns whether a subject row was matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn adjust_counter(
    pool: &PgPool,
    kind: SubjectKind,
    subject_id: i64,
    delta: i64,
) -> Result<bool, DbError> {
    let matched = sqlx::query(&format!(
        "UPDATE {} SET like_count = GREATEST(like_count + $2, 0) WHERE id = $1",
        kind.subject_table(),
    ))
    .bind(subject_id)
    .bind(delta)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(matched > 0)
}

/// Returns the ids of all subjects the user has liked, in the order the
/// likes were recorded. Empty when the user has no likes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn liked_subject_ids(
    pool: &PgPool,
    kind: SubjectKind,
    user_id: &str,
) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(&format!(
        "SELECT {} FROM {} WHERE user_id = $1 ORDER BY id",
        kind.ledger_fk(),
        kind.ledger_table(),
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

async fn insert_ledger_record(
    pool: &PgPool,
    kind: SubjectKind,
    subject_id: i64,
    user_id: &str,
) -> Result<u64, DbError> {
    let inserted = sqlx::query(&format!(
        "INSERT INTO {} ({}, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.ledger_table(),
        kind.ledger_fk(),
    ))
    .bind(subject_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(inserted)
}

async fn delete_ledger_record(
    pool: &PgPool,
    kind: SubjectKind,
    subject_id: i64,
    user_id: &str,
) -> Result<u64, DbError> {
    let deleted = sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
        kind.ledger_table(),
        kind.ledger_fk(),
    ))
    .bind(subject_id)
    .bind(user_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(deleted)
}
