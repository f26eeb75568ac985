//! Registros persistidos pelo pipeline de aprendizado.
//!
//! Os nomes de campo (camelCase) fazem parte do contrato com os dados já
//! armazenados. Datas são gravadas em milissegundos desde a época para que a
//! ordenação no armazenamento seja numérica.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::learning::Topic;
use crate::store::Document;
use crate::{HermesError, HermesResult};

/// Nomes das coleções usadas no armazenamento de documentos.
pub mod collections {
    pub const CONVERSATIONS: &str = "conversations";
    pub const PATTERNS: &str = "patterns";
    pub const KNOWLEDGE: &str = "knowledge";
}

/// Um tipo que vive em uma coleção do armazenamento.
pub trait Record: Serialize + DeserializeOwned {
    /// Coleção onde o registro é gravado.
    const COLLECTION: &'static str;

    /// Serializa o registro para o formato de documento.
    fn to_document(&self) -> HermesResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Reconstrói o registro a partir de um documento lido.
    fn from_document(doc: Document) -> HermesResult<Stored<Self>> {
        let record = serde_json::from_value(doc.body).map_err(|e| HermesError::InvalidRecord {
            collection: Self::COLLECTION.to_string(),
            reason: format!("{} ({})", e, doc.id),
        })?;
        Ok(Stored { id: doc.id, record })
    }
}

/// Registro acompanhado do seu identificador no armazenamento.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub id: String,
    pub record: T,
}

/// Texto com o instante em que foi produzido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedText {
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Um turno de conversa capturado para aprendizado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user_message: TimedText,
    pub ai_response: TimedText,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub analyzed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Cria uma conversa ainda não analisada.
    pub fn new(
        user_message: impl Into<String>,
        ai_response: impl Into<String>,
        context: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_message: TimedText {
                text: user_message.into(),
                timestamp: now,
            },
            ai_response: TimedText {
                text: ai_response.into(),
                timestamp: now,
            },
            context,
            analyzed: false,
            created_at: now,
        }
    }

    /// Par pergunta/resposta usado como exemplo.
    pub fn to_example(&self) -> Example {
        Example {
            user_message: self.user_message.text.clone(),
            ai_response: self.ai_response.text.clone(),
        }
    }
}

impl Record for Conversation {
    const COLLECTION: &'static str = collections::CONVERSATIONS;
}

/// Par mensagem do usuário / resposta da IA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub user_message: String,
    pub ai_response: String,
}

impl Example {
    pub fn new(user_message: impl Into<String>, ai_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ai_response: ai_response.into(),
        }
    }
}

/// Agrupamento transitório de conversas de um mesmo tópico, produzido por
/// uma execução da extração.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub topic: Topic,
    pub examples: Vec<Example>,
    pub frequency: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record for Pattern {
    const COLLECTION: &'static str = collections::PATTERNS;
}

/// Conhecimento durável de um tópico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knowledge {
    pub topic: Topic,
    #[serde(default)]
    pub responses: Vec<String>,
    #[serde(default)]
    pub examples: Vec<Example>,
    pub confidence: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Record for Knowledge {
    const COLLECTION: &'static str = collections::KNOWLEDGE;
}

/// Resposta pré-computada encontrada na base de conhecimento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    pub text: String,
    pub confidence: f64,
    pub topic: Topic,
}
