//! Extração de patterns a partir de conversas não analisadas.
//!
//! Uma execução lê até `batch_size` conversas pendentes (mais antigas
//! primeiro), agrupa por tópico, grava um [`Pattern`] por tópico, marca as
//! conversas como analisadas e mescla os patterns na base de conhecimento.
//!
//! Não há transação envolvendo essas etapas: o processamento é
//! "pelo menos uma vez". Duas execuções que leiam o mesmo lote antes de
//! qualquer uma marcá-lo gravam patterns duplicados e mesclam o lote duas
//! vezes na base.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::DocumentStore;
use crate::types::records::{Conversation, Example, Pattern, Record, Stored};
use crate::HermesResult;

use super::clock::Clock;
use super::conversations::ConversationStore;
use super::knowledge::KnowledgeBase;
use super::topics::{classify_or_other, Topic};

/// Resultado de uma execução da extração.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub conversations_analyzed: usize,
    pub patterns_extracted: usize,
    pub knowledge_created: usize,
    pub knowledge_updated: usize,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.conversations_analyzed == 0
    }
}

/// Extrator de patterns.
#[derive(Clone)]
pub struct PatternExtractor {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    conversations: ConversationStore,
    knowledge: KnowledgeBase,
    batch_size: usize,
}

impl PatternExtractor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        conversations: ConversationStore,
        knowledge: KnowledgeBase,
    ) -> Self {
        let batch_size = knowledge.config().batch_size;
        Self {
            store,
            clock,
            conversations,
            knowledge,
            batch_size,
        }
    }

    /// Executa uma extração completa.
    pub async fn extract(&self) -> HermesResult<ExtractionReport> {
        let batch = self.fetch_unanalyzed().await?;
        self.process_batch(batch).await
    }

    /// Lê o próximo lote de conversas pendentes.
    pub async fn fetch_unanalyzed(&self) -> HermesResult<Vec<Stored<Conversation>>> {
        self.conversations.fetch_unanalyzed(self.batch_size).await
    }

    /// Processa um lote já lido.
    pub async fn process_batch(
        &self,
        batch: Vec<Stored<Conversation>>,
    ) -> HermesResult<ExtractionReport> {
        if batch.is_empty() {
            tracing::info!("No new conversations to analyze");
            return Ok(ExtractionReport::default());
        }

        let now = self.clock.now();
        let records: Vec<Conversation> = batch.iter().map(|s| s.record.clone()).collect();
        let patterns = extract_patterns(&records, now);

        for pattern in &patterns {
            self.store
                .insert(Pattern::COLLECTION, pattern.to_document()?)
                .await?;
        }

        let ids: Vec<String> = batch.into_iter().map(|s| s.id).collect();
        let analyzed = self.conversations.mark_analyzed(&ids).await?;

        tracing::info!(
            analyzed,
            patterns = patterns.len(),
            "Conversations analyzed"
        );

        let summary = self.knowledge.update(&patterns).await?;

        Ok(ExtractionReport {
            conversations_analyzed: analyzed,
            patterns_extracted: patterns.len(),
            knowledge_created: summary.created,
            knowledge_updated: summary.updated,
        })
    }
}

/// Agrupa conversas por tópico.
///
/// Os patterns saem na ordem em que cada tópico aparece pela primeira vez
/// no lote; os exemplos de cada um mantêm a ordem do lote.
pub fn extract_patterns(conversations: &[Conversation], now: DateTime<Utc>) -> Vec<Pattern> {
    let mut groups: Vec<(Topic, Vec<Example>)> = Vec::new();

    for conv in conversations {
        let topic = classify_or_other(&conv.user_message.text);
        let example = conv.to_example();

        match groups.iter_mut().find(|(t, _)| *t == topic) {
            Some((_, examples)) => examples.push(example),
            None => groups.push((topic, vec![example])),
        }
    }

    groups
        .into_iter()
        .map(|(topic, examples)| Pattern {
            topic,
            frequency: examples.len(),
            examples,
            last_updated: now,
            created_at: now,
        })
        .collect()
}
