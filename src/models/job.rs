//! Job entity gateway: CRUD against the `jobs` table, one statement per call.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use crate::sql::{self, SqlBuildError};

/// Errors raised by the gateway; the route layer maps these onto HTTP codes.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<SqlBuildError> for JobStoreError {
    fn from(err: SqlBuildError) -> Self {
        JobStoreError::InvalidInput(err.to_string())
    }
}

/// A job row. `equity` serializes as a JSON number in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Creation payload. `id` is generated by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    /// Shape validation for request bodies. Returns every violation, not just
    /// the first.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        }
        if self.company_handle.trim().is_empty() {
            errors.push("companyHandle must not be empty".to_string());
        }
        if matches!(self.salary, Some(s) if s < 0) {
            errors.push("salary must not be negative".to_string());
        }
        if matches!(self.equity, Some(e) if !(Decimal::ZERO..=Decimal::ONE).contains(&e)) {
            errors.push("equity must be between 0 and 1".to_string());
        }
        errors
    }
}

/// Partial-update payload. Only title/salary/equity are updatable; other body
/// keys (notably `id` and `companyHandle`) are silently discarded during
/// deserialization rather than rejected. Outer `Option` = key present, inner
/// `Option` = the value itself, so an explicit JSON `null` is distinguishable
/// from an absent key and gets rejected by validation instead of being
/// silently dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present_equity")]
    pub equity: Option<Option<Decimal>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn present_equity<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(Some)
}

impl JobUpdate {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match &self.title {
            Some(None) => errors.push("title must not be null".to_string()),
            Some(Some(t)) if t.trim().is_empty() => {
                errors.push("title must not be empty".to_string())
            }
            _ => {}
        }
        match self.salary {
            Some(None) => errors.push("salary must not be null".to_string()),
            Some(Some(s)) if s < 0 => errors.push("salary must not be negative".to_string()),
            _ => {}
        }
        match self.equity {
            Some(None) => errors.push("equity must not be null".to_string()),
            Some(Some(e)) if !(Decimal::ZERO..=Decimal::ONE).contains(&e) => {
                errors.push("equity must be between 0 and 1".to_string())
            }
            _ => {}
        }
        errors
    }

    /// Present fields as ordered `(column, value)` pairs for the update
    /// compiler. Column order is statically declared, so placeholder
    /// numbering is stable.
    fn changed_fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = Vec::new();
        if let Some(Some(title)) = &self.title {
            fields.push(("title", json!(title)));
        }
        if let Some(Some(salary)) = self.salary {
            fields.push(("salary", json!(salary)));
        }
        if let Some(Some(equity)) = self.equity {
            fields.push(("equity", json!(equity.to_f64())));
        }
        fields
    }
}

/// Optional list filters, AND-combined.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
    pub title: Option<String>,
}

impl JobFilter {
    /// Build the `WHERE` fragment plus its ordered parameter values. Empty
    /// filter set yields an empty fragment (all rows).
    ///
    /// Filter values pass through unvalidated; out-of-range values simply
    /// match nothing.
    fn predicate(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(min) = self.min_salary {
            values.push(json!(min));
            conditions.push(format!("salary >= ${}", values.len()));
        }
        if self.has_equity == Some(true) {
            values.push(json!(0));
            conditions.push(format!("equity > ${}", values.len()));
        }
        if let Some(title) = &self.title {
            values.push(json!(format!("%{}%", title)));
            conditions.push(format!("title ILIKE ${}", values.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (where_clause, values)
    }
}

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Gateway over the `jobs` table. Holds the injected pool and nothing else;
/// every call is a single round trip.
#[derive(Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a job, returning it with its generated id.
    ///
    /// A best-effort duplicate pre-check rejects rows matching all four
    /// fields exactly (NULLs compare equal). The check and the insert are not
    /// one transaction; concurrent identical creates can both pass the check.
    pub async fn create(&self, data: &NewJob) -> Result<Job, JobStoreError> {
        let duplicate = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM jobs
              WHERE title = $1
                AND salary IS NOT DISTINCT FROM $2
                AND equity IS NOT DISTINCT FROM $3
                AND company_handle = $4",
        )
        .bind(&data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(&data.company_handle)
        .fetch_optional(&self.pool)
        .await?;

        if duplicate.is_some() {
            return Err(JobStoreError::InvalidInput(format!(
                "Job already exists: {} at {}",
                data.title, data.company_handle
            )));
        }

        let query = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::warn!("job insert rejected: {}", e);
                JobStoreError::InvalidInput(format!("Invalid job input: {}", data.title))
            })
    }

    /// List jobs matching the filter set, ordered by title ascending.
    pub async fn find_all(&self, filter: &JobFilter) -> Result<Vec<Job>, JobStoreError> {
        let (where_clause, params) = filter.predicate();
        let query =
            format!("SELECT {JOB_COLUMNS} FROM jobs {where_clause} ORDER BY title");

        let mut q = sqlx::query_as::<_, Job>(&query);
        for p in params.iter() {
            q = sql::bind_value(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Job, JobStoreError> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| JobStoreError::NotFound(format!("No job id: {}", id)))
    }

    /// Apply a partial update and return the full post-update record. An
    /// update with no present fields is rejected before any round trip.
    pub async fn update(&self, id: i32, data: &JobUpdate) -> Result<Job, JobStoreError> {
        let fields = data.changed_fields();
        let descriptor = sql::for_partial_update(&fields, &[])?;

        let query = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
            descriptor.set_clause,
            descriptor.values.len() + 1
        );

        let mut q = sqlx::query_as::<_, Job>(&query);
        for v in descriptor.values.iter() {
            q = sql::bind_value(q, v);
        }
        q.bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| JobStoreError::NotFound(format!("No job id: {}", id)))
    }

    pub async fn remove(&self, id: i32) -> Result<(), JobStoreError> {
        let deleted = sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(JobStoreError::NotFound(format!("No job id: {}", id))),
        }
    }
}
