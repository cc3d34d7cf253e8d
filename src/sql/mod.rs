//! Dynamic SQL fragments for partial updates and filtered queries.
//!
//! The update compiler turns an ordered set of changed fields into a
//! parameterized `SET` clause; placeholder numbering always follows input
//! order, so the caller binds values in the same order it supplied them.

use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlBuildError {
    #[error("no data to update")]
    NoFields,
}

/// A compiled partial update: `"title" = $1, "salary" = $2` plus the values
/// bound to each placeholder, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDescriptor {
    pub set_clause: String,
    pub values: Vec<Value>,
}

/// Compile an ordered list of `(field, value)` pairs into a `SET` clause.
///
/// `column_map` renames external field names to their column names; fields
/// without an entry pass through unchanged. Values are not validated here.
pub fn for_partial_update(
    fields: &[(&str, Value)],
    column_map: &[(&str, &str)],
) -> Result<UpdateDescriptor, SqlBuildError> {
    if fields.is_empty() {
        return Err(SqlBuildError::NoFields);
    }

    let cols: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(idx, (name, _))| {
            let column = column_map
                .iter()
                .find(|(external, _)| external == name)
                .map(|(_, internal)| *internal)
                .unwrap_or(name);
            format!("\"{}\" = ${}", column, idx + 1)
        })
        .collect();

    Ok(UpdateDescriptor {
        set_clause: cols.join(", "),
        values: fields.iter().map(|(_, v)| v.clone()).collect(),
    })
}

/// Bind a JSON value as the next positional parameter of a `query_as`.
pub fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // Arrays/objects never appear in job fields; bind as JSONB if they do
        other => q.bind(other.clone()),
    }
}
