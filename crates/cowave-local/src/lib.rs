//! In-process SQLite implementation of the backend port.
//!
//! Used by tests and the smoke CLI. Keeps the parts the repositories depend
//! on — composite-cursor pagination, uniqueness conflicts, the room-proposal
//! quota policy — behaviorally identical to the managed backend so the same
//! code paths can be exercised without a network.

pub mod migrations;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use cowave_backend::{Backend, BackendError, BackendResult, Filter, Row, SelectQuery};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

/// Canonical timestamp encoding for stored rows. Fixed-width RFC 3339 UTC
/// with microseconds, so lexicographic order equals chronological order and
/// a parsed-then-reserialized cursor matches the stored text exactly.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn now_timestamp() -> String {
    timestamp(Utc::now())
}

impl SqliteBackend {
    pub fn open(path: &Path) -> BackendResult<Self> {
        let conn = Connection::open(path).map_err(db_error)?;
        Self::init(conn, &path.display().to_string())
    }

    pub fn open_in_memory() -> BackendResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::init(conn, ":memory:")
    }

    fn init(conn: Connection, label: &str) -> BackendResult<Self> {
        conn.pragma_update(None, "journal_mode", "WAL").map_err(db_error)?;
        conn.pragma_update(None, "foreign_keys", "ON").map_err(db_error)?;
        migrations::run(&conn).map_err(db_error)?;
        info!("Local backend opened at {}", label);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> BackendResult<T>
    where
        F: FnOnce(&Connection) -> BackendResult<T>,
    {
        let conn = self.conn.lock().map_err(|e| BackendError::Rejected {
            status: 500,
            code: None,
            message: format!("local backend lock poisoned: {e}"),
        })?;
        f(&conn)
    }
}

fn db_error(e: rusqlite::Error) -> BackendError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &e {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            return BackendError::Rejected {
                status: 409,
                code: Some("23505".to_string()),
                message: message.clone().unwrap_or_else(|| e.to_string()),
            };
        }
    }
    BackendError::Rejected {
        status: 500,
        code: None,
        message: e.to_string(),
    }
}

fn to_sql_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Sql::Integer(i)
            } else {
                Sql::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Sql::Text(s.clone()),
        // Arrays/objects are not stored by this schema.
        other => Sql::Text(other.to_string()),
    }
}

fn row_to_json(row: &rusqlite::Row<'_>, cols: &[String]) -> rusqlite::Result<Row> {
    let mut out = Row::new();
    for (i, col) in cols.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::from(n),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            // Blobs only live in the objects table and are fetched through
            // the storage methods, never through generic select.
            ValueRef::Blob(_) => Value::Null,
        };
        out.insert(col.clone(), value);
    }
    Ok(out)
}

fn as_object(value: Value) -> BackendResult<Row> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::Decode(format!(
            "expected a JSON object row, got {other}"
        ))),
    }
}

/// Builds WHERE clauses for the given filters, appending bind values.
fn push_filters(filters: &[Filter], clauses: &mut Vec<String>, params: &mut Vec<rusqlite::types::Value>) {
    for filter in filters {
        match filter {
            Filter::Eq(col, value) => {
                params.push(to_sql_value(value));
                clauses.push(format!("{col} = ?{}", params.len()));
            }
            Filter::In(col, values) => {
                if values.is_empty() {
                    clauses.push("1 = 0".to_string());
                    continue;
                }
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    params.push(to_sql_value(value));
                    placeholders.push(format!("?{}", params.len()));
                }
                clauses.push(format!("{col} IN ({})", placeholders.join(", ")));
            }
        }
    }
}

impl Backend for SqliteBackend {
    async fn select(&self, query: SelectQuery) -> BackendResult<Vec<Row>> {
        self.with_conn(|conn| {
            let mut clauses = Vec::new();
            let mut params: Vec<rusqlite::types::Value> = Vec::new();
            push_filters(&query.filters, &mut clauses, &mut params);

            if let Some(cursor) = &query.before {
                let t = timestamp(cursor.created_at);
                params.push(rusqlite::types::Value::Text(t.clone()));
                let p_lt = params.len();
                params.push(rusqlite::types::Value::Text(t));
                let p_eq = params.len();
                params.push(rusqlite::types::Value::Text(cursor.id.clone()));
                let p_id = params.len();
                clauses.push(format!(
                    "(created_at < ?{p_lt} OR (created_at = ?{p_eq} AND id < ?{p_id}))"
                ));
            }

            let mut sql = format!("SELECT * FROM {}", query.table);
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            if query.newest_first {
                sql.push_str(" ORDER BY created_at DESC, id DESC");
            }
            if let Some(limit) = query.limit {
                sql.push_str(&format!(" LIMIT {limit}"));
            }

            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let cols: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), |row| {
                    row_to_json(row, &cols)
                })
                .map_err(db_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_error)?;
            Ok(rows)
        })
    }

    async fn insert(&self, table: &'static str, row: Value) -> BackendResult<Row> {
        let mut map = as_object(row)?;
        map.entry("id".to_string())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        map.entry("created_at".to_string())
            .or_insert_with(|| Value::String(now_timestamp()));

        self.with_conn(|conn| {
            let cols: Vec<&String> = map.keys().collect();
            let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
                cols.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", "),
                placeholders.join(", ")
            );
            let params: Vec<rusqlite::types::Value> = map.values().map(to_sql_value).collect();

            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let out_cols: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            stmt.query_row(rusqlite::params_from_iter(params), |r| {
                row_to_json(r, &out_cols)
            })
            .map_err(db_error)
        })
    }

    async fn upsert(
        &self,
        table: &'static str,
        row: Value,
        on_conflict: &'static [&'static str],
    ) -> BackendResult<Row> {
        let mut map = as_object(row)?;
        map.entry("id".to_string())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        map.entry("created_at".to_string())
            .or_insert_with(|| Value::String(now_timestamp()));

        // On conflict, key columns and the original identity stay put.
        let sets: Vec<String> = map
            .keys()
            .filter(|c| {
                !on_conflict.contains(&c.as_str()) && c.as_str() != "id" && c.as_str() != "created_at"
            })
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();
        if sets.is_empty() {
            return Err(BackendError::Decode(
                "upsert requires at least one non-key column".to_string(),
            ));
        }

        self.with_conn(|conn| {
            let cols: Vec<&String> = map.keys().collect();
            let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {} RETURNING *",
                cols.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", "),
                placeholders.join(", "),
                on_conflict.join(", "),
                sets.join(", ")
            );
            let params: Vec<rusqlite::types::Value> = map.values().map(to_sql_value).collect();

            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let out_cols: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            stmt.query_row(rusqlite::params_from_iter(params), |r| {
                row_to_json(r, &out_cols)
            })
            .map_err(db_error)
        })
    }

    async fn update(
        &self,
        table: &'static str,
        filters: Vec<Filter>,
        patch: Value,
    ) -> BackendResult<Vec<Row>> {
        let map = as_object(patch)?;
        if map.is_empty() {
            return Err(BackendError::Decode("empty update patch".to_string()));
        }

        self.with_conn(|conn| {
            let mut params: Vec<rusqlite::types::Value> = Vec::new();
            let mut sets = Vec::with_capacity(map.len());
            for (col, value) in &map {
                params.push(to_sql_value(value));
                sets.push(format!("{col} = ?{}", params.len()));
            }
            let mut clauses = Vec::new();
            push_filters(&filters, &mut clauses, &mut params);

            let mut sql = format!("UPDATE {table} SET {}", sets.join(", "));
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" RETURNING *");

            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let out_cols: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), |r| {
                    row_to_json(r, &out_cols)
                })
                .map_err(db_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_error)?;
            Ok(rows)
        })
    }

    async fn delete(&self, table: &'static str, filters: Vec<Filter>) -> BackendResult<()> {
        self.with_conn(|conn| {
            let mut clauses = Vec::new();
            let mut params: Vec<rusqlite::types::Value> = Vec::new();
            push_filters(&filters, &mut clauses, &mut params);

            let mut sql = format!("DELETE FROM {table}");
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            conn.execute(&sql, rusqlite::params_from_iter(params))
                .map_err(db_error)?;
            Ok(())
        })
    }

    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO objects (bucket, path, mime_type, bytes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![bucket, path, mime, bytes, now_timestamp()],
            )
            .map_err(db_error)?;
            Ok(())
        })
    }

    async fn remove_object(&self, bucket: &str, path: &str) -> BackendResult<()> {
        // Removing an already-gone object is not an error.
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM objects WHERE bucket = ?1 AND path = ?2",
                rusqlite::params![bucket, path],
            )
            .map_err(db_error)?;
            Ok(())
        })
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_secs: u32,
    ) -> BackendResult<String> {
        self.with_conn(|conn| {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM objects WHERE bucket = ?1 AND path = ?2",
                    rusqlite::params![bucket, path],
                    |r| r.get(0),
                )
                .map_err(db_error)?;
            if exists == 0 {
                return Err(BackendError::Rejected {
                    status: 404,
                    code: None,
                    message: format!("object not found: {bucket}/{path}"),
                });
            }
            Ok(format!(
                "local://{bucket}/{path}?token={}&expires_in={expires_in_secs}",
                Uuid::new_v4()
            ))
        })
    }
}
