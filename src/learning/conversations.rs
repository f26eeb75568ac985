//! Armazenamento de conversas para aprendizado.

use std::sync::Arc;

use serde_json::Value;

use crate::store::{Direction, DocumentStore, Query};
use crate::types::records::{collections, Conversation, Record, Stored};
use crate::{HermesError, HermesResult};

use super::clock::Clock;

/// Conversas brutas com a marca `analyzed`.
///
/// Uma conversa é criada com `analyzed = false` e só muda uma vez, quando a
/// extração a marca como analisada. Nunca é removida.
#[derive(Clone)]
pub struct ConversationStore {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Grava um turno de conversa e retorna o identificador.
    pub async fn insert(
        &self,
        user_message: &str,
        ai_response: &str,
        context: Value,
    ) -> HermesResult<String> {
        let conversation = Conversation::new(user_message, ai_response, context, self.clock.now());
        let id = self
            .store
            .insert(Conversation::COLLECTION, conversation.to_document()?)
            .await?;

        tracing::debug!(id = %id, "Conversation saved");
        Ok(id)
    }

    /// Conversas ainda não analisadas, das mais antigas para as mais novas.
    pub async fn fetch_unanalyzed(&self, limit: usize) -> HermesResult<Vec<Stored<Conversation>>> {
        let query = Query::new()
            .where_eq("analyzed", false)
            .order_by("createdAt", Direction::Asc)
            .limit(limit);

        self.store
            .query(collections::CONVERSATIONS, &query)
            .await?
            .into_iter()
            .map(Conversation::from_document)
            .collect()
    }

    /// Marca as conversas como analisadas.
    ///
    /// Tenta todas; se alguma falhar, as demais continuam marcadas e o erro
    /// informa quantas ficaram pendentes (serão relidas na próxima execução).
    pub async fn mark_analyzed(&self, ids: &[String]) -> HermesResult<usize> {
        let mut marked = 0;
        let mut failed = Vec::new();

        for id in ids {
            match self
                .store
                .update(collections::CONVERSATIONS, id, serde_json::json!({ "analyzed": true }))
                .await
            {
                Ok(()) => marked += 1,
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Failed to mark conversation as analyzed");
                    failed.push(id.clone());
                }
            }
        }

        if failed.is_empty() {
            Ok(marked)
        } else {
            Err(HermesError::store(format!(
                "{} de {} conversas não foram marcadas como analisadas",
                failed.len(),
                ids.len()
            )))
        }
    }

    /// Total de conversas gravadas.
    pub async fn count(&self) -> HermesResult<usize> {
        Ok(self
            .store
            .query(collections::CONVERSATIONS, &Query::new())
            .await?
            .len())
    }

    /// Total de conversas aguardando análise.
    pub async fn count_unanalyzed(&self) -> HermesResult<usize> {
        Ok(self
            .store
            .query(
                collections::CONVERSATIONS,
                &Query::new().where_eq("analyzed", false),
            )
            .await?
            .len())
    }
}
