//! Armazenamento de documentos sobre SQLite.
//!
//! Cada documento é uma linha da tabela `documents` com o corpo em JSON;
//! filtros e ordenação usam `json_extract`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;

use crate::{HermesError, HermesResult};

use super::{merge_fields, Direction, Document, DocumentStore, Query};

/// Banco de documentos em um arquivo SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Cria ou abre o banco de documentos.
    pub fn open(db_path: &Path) -> HermesResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Banco SQLite em memória.
    pub fn in_memory() -> HermesResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> HermesResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id TEXT NOT NULL UNIQUE,
                body TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> HermesResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| HermesError::store("conexão SQLite envenenada"))
    }
}

/// Caminho JSON de um campo de topo. Só aceita identificadores simples.
fn json_path(field: &str) -> HermesResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(format!("$.{}", field))
    } else {
        Err(HermesError::store(format!("nome de campo inválido: {:?}", field)))
    }
}

/// Converte um valor JSON para o que `json_extract` devolve.
fn to_sql_value(value: &Value) -> HermesResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(SqlValue::Integer(i)),
            None => Ok(SqlValue::Real(n.as_f64().unwrap_or(0.0))),
        },
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(HermesError::store(
            "filtros de igualdade só aceitam valores escalares",
        )),
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, collection: &str, body: Value) -> HermesResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)",
            params![collection, &id, serde_json::to_string(&body)?],
        )?;
        Ok(id)
    }

    async fn query(&self, collection: &str, query: &Query) -> HermesResult<Vec<Document>> {
        let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?");
        let mut args: Vec<SqlValue> = vec![SqlValue::Text(collection.to_string())];

        for (field, value) in &query.filters {
            let path = json_path(field)?;
            match to_sql_value(value)? {
                SqlValue::Null => {
                    sql.push_str(&format!(" AND json_extract(body, '{}') IS NULL", path));
                }
                v => {
                    sql.push_str(&format!(" AND json_extract(body, '{}') = ?", path));
                    args.push(v);
                }
            }
        }

        match &query.order_by {
            Some(order) => {
                let direction = match order.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                sql.push_str(&format!(
                    " ORDER BY json_extract(body, '{}') {}, seq ASC",
                    json_path(&order.field)?,
                    direction
                ));
            }
            None => sql.push_str(" ORDER BY seq ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::Integer(limit as i64));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, body)| {
                Ok(Document {
                    id,
                    body: serde_json::from_str(&body)?,
                })
            })
            .collect()
    }

    async fn update(&self, collection: &str, id: &str, partial: Value) -> HermesResult<()> {
        let conn = self.lock()?;

        let current: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ? AND id = ?",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(current) = current else {
            return Err(HermesError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        let mut body: Value = serde_json::from_str(&current)?;
        merge_fields(&mut body, partial);

        conn.execute(
            "UPDATE documents SET body = ? WHERE collection = ? AND id = ?",
            params![serde_json::to_string(&body)?, collection, id],
        )?;

        Ok(())
    }
}
