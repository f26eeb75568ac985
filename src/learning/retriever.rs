//! Busca de respostas pré-computadas na base de conhecimento.

use rand::Rng;

use crate::types::records::{Knowledge, KnowledgeResponse};
use crate::HermesResult;

use super::knowledge::KnowledgeBase;
use super::topics::{classify, Topic};

/// Recupera respostas aprendidas para uma mensagem nova.
///
/// Diferente da extração, aqui não existe o balde `outros`: mensagem sem
/// tópico reconhecido não tem resposta.
#[derive(Clone)]
pub struct KnowledgeRetriever {
    knowledge: KnowledgeBase,
}

impl KnowledgeRetriever {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self { knowledge }
    }

    /// Busca uma resposta, sorteando entre as candidatas do tópico.
    pub async fn retrieve(&self, message: &str) -> HermesResult<Option<KnowledgeResponse>> {
        let Some((topic, knowledge)) = self.candidates(message).await? else {
            return Ok(None);
        };

        let idx = rand::rng().random_range(0..knowledge.responses.len());
        Ok(Some(pick(topic, knowledge, idx)))
    }

    /// Como [`retrieve`](Self::retrieve), com gerador aleatório injetado.
    pub async fn retrieve_with<R: Rng + Send>(
        &self,
        message: &str,
        rng: &mut R,
    ) -> HermesResult<Option<KnowledgeResponse>> {
        let Some((topic, knowledge)) = self.candidates(message).await? else {
            return Ok(None);
        };

        let idx = rng.random_range(0..knowledge.responses.len());
        Ok(Some(pick(topic, knowledge, idx)))
    }

    /// Tópico e conhecimento com pelo menos uma resposta, se houver.
    async fn candidates(&self, message: &str) -> HermesResult<Option<(Topic, Knowledge)>> {
        let Some(topic) = classify(message) else {
            return Ok(None);
        };

        let found = self.knowledge.find(topic).await?;
        Ok(found
            .map(|stored| stored.record)
            .filter(|k| !k.responses.is_empty())
            .map(|k| (topic, k)))
    }
}

fn pick(topic: Topic, mut knowledge: Knowledge, idx: usize) -> KnowledgeResponse {
    KnowledgeResponse {
        text: knowledge.responses.swap_remove(idx),
        confidence: knowledge.confidence,
        topic,
    }
}
