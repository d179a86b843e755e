use serde_json::{Map, Value};
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow};

use super::manager::DatabaseError;

/// Field name accepted from clients -> storage column name.
pub type ColumnMap = &'static [(&'static str, &'static str)];

/// Column assignments and their positionally matched values for an
/// `UPDATE ... SET` targeting a single row.
///
/// Placeholders run `$1..=$n` in the order the fields were supplied; the
/// caller binds the row key last, as `$n+1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub assignments: Vec<String>,
    pub values: Vec<Value>,
}

/// Translate a sparse field map into a parameterized SET clause.
///
/// Names missing from `columns` are used as their own column name; callers
/// constrain the input upstream (request types reject unknown fields).
pub fn sql_for_partial_update(
    data: Map<String, Value>,
    columns: ColumnMap,
) -> Result<PartialUpdate, DatabaseError> {
    if data.is_empty() {
        return Err(DatabaseError::EmptyUpdate);
    }

    let mut assignments = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());

    for (i, (field, value)) in data.into_iter().enumerate() {
        let column = columns
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
            .unwrap_or(field.as_str());
        assignments.push(format!("{}=${}", quote_identifier(column), i + 1));
        values.push(value);
    }

    Ok(PartialUpdate { assignments, values })
}

impl PartialUpdate {
    pub fn set_clause(&self) -> String {
        self.assignments.join(", ")
    }

    /// Placeholder index reserved for the row key
    pub fn key_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// `UPDATE <table> SET ... WHERE <key_column> = $n+1 RETURNING <returning>`
    pub fn to_sql(&self, table: &str, key_column: &str, returning: &str) -> String {
        format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            quote_identifier(table),
            self.set_clause(),
            quote_identifier(key_column),
            self.key_placeholder(),
            returning
        )
    }

    /// Bind the update values in placeholder order
    pub fn bind<'q, O>(
        &'q self,
        mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        for value in &self.values {
            q = bind_param(q, value);
        }
        q
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_param<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Every numeric column here is INTEGER
                match i32::try_from(i) {
                    Ok(small) => q.bind(small),
                    Err(_) => q.bind(i),
                }
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}
