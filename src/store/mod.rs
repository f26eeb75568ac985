//! Armazenamento de documentos.
//!
//! O pipeline de aprendizado só conversa com o banco através do trait
//! [`DocumentStore`]: inserir, consultar com filtros de igualdade e
//! atualizar parcialmente. Não há joins nem transações.
//!
//! ## Implementações
//!
//! - [`MemoryStore`]: coleções em memória, usada em testes e no backend `memory`
//! - [`SqliteStore`]: documentos JSON em uma tabela SQLite (feature `sqlite`)

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::HermesResult;

/// Documento lido de uma coleção.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// Direção da ordenação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Ordenação por um campo de topo do documento.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Consulta sobre uma coleção.
///
/// Empates na ordenação (ou ausência dela) seguem a ordem de inserção.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona um filtro `campo == valor`.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Verifica se um documento satisfaz todos os filtros.
    pub fn matches(&self, body: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| body.get(field) == Some(expected))
    }
}

/// Contrato mínimo com o banco de documentos.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Nome do backend (para logs e status).
    fn name(&self) -> &str;

    /// Insere um documento e retorna o identificador gerado.
    async fn insert(&self, collection: &str, body: Value) -> HermesResult<String>;

    /// Consulta documentos de uma coleção.
    async fn query(&self, collection: &str, query: &Query) -> HermesResult<Vec<Document>>;

    /// Atualiza campos de topo de um documento existente.
    ///
    /// Campos ausentes em `partial` são preservados.
    async fn update(&self, collection: &str, id: &str, partial: Value) -> HermesResult<()>;
}

/// Mescla os campos de topo de `partial` em `target`.
pub(crate) fn merge_fields(target: &mut Value, partial: Value) {
    match (target.as_object_mut(), partial) {
        (Some(obj), Value::Object(fields)) => {
            for (key, value) in fields {
                obj.insert(key, value);
            }
        }
        (_, other) => *target = other,
    }
}
