//! Base de conhecimento por tópico.
//!
//! Cada tópico tem no máximo um registro de [`Knowledge`]. Ele é criado no
//! primeiro pattern do tópico e, a partir daí, mesclado no lugar: exemplos
//! concatenados e limitados, respostas recalculadas e limitadas, confiança
//! incrementada até o teto. Não há controle de versão: duas mesclagens
//! concorrentes resultam em "última escrita vence".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::store::{DocumentStore, Query};
use crate::types::config::{ExampleEviction, LearningConfig};
use crate::types::records::{Example, Knowledge, Pattern, Record, Stored};
use crate::HermesResult;

use super::clock::Clock;
use super::topics::Topic;

/// Resumo de uma atualização da base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub created: usize,
    pub updated: usize,
}

/// Base de conhecimento sobre um [`DocumentStore`].
#[derive(Clone)]
pub struct KnowledgeBase {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: LearningConfig,
}

impl KnowledgeBase {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, config: LearningConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Mescla um lote de patterns na base.
    ///
    /// Para no primeiro erro de armazenamento; patterns já aplicados
    /// permanecem aplicados.
    pub async fn update(&self, patterns: &[Pattern]) -> HermesResult<UpdateSummary> {
        let mut summary = UpdateSummary::default();

        for pattern in patterns {
            let now = self.clock.now();

            match self.find(pattern.topic).await? {
                None => {
                    let knowledge = self.create_from(pattern, now);
                    self.store
                        .insert(Knowledge::COLLECTION, knowledge.to_document()?)
                        .await?;
                    tracing::debug!(topic = %pattern.topic, "Knowledge created");
                    summary.created += 1;
                }
                Some(existing) => {
                    let merged = self.merge(&existing.record, pattern, now);
                    self.store
                        .update(
                            Knowledge::COLLECTION,
                            &existing.id,
                            json!({
                                "examples": merged.examples,
                                "responses": merged.responses,
                                "confidence": merged.confidence,
                                "updatedAt": merged.updated_at.timestamp_millis(),
                            }),
                        )
                        .await?;
                    tracing::debug!(
                        topic = %pattern.topic,
                        confidence = merged.confidence,
                        examples = merged.examples.len(),
                        "Knowledge updated"
                    );
                    summary.updated += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Busca o conhecimento de um tópico (o primeiro, se houver duplicatas).
    pub async fn find(&self, topic: Topic) -> HermesResult<Option<Stored<Knowledge>>> {
        let docs = self
            .store
            .query(
                Knowledge::COLLECTION,
                &Query::new().where_eq("topic", topic.as_str()).limit(1),
            )
            .await?;

        docs.into_iter()
            .next()
            .map(Knowledge::from_document)
            .transpose()
    }

    /// Todos os registros da base, na ordem de criação.
    pub async fn all(&self) -> HermesResult<Vec<Stored<Knowledge>>> {
        self.store
            .query(Knowledge::COLLECTION, &Query::new())
            .await?
            .into_iter()
            .map(Knowledge::from_document)
            .collect()
    }

    /// Registro novo a partir do primeiro pattern de um tópico.
    pub fn create_from(&self, pattern: &Pattern, now: DateTime<Utc>) -> Knowledge {
        Knowledge {
            topic: pattern.topic,
            responses: generate_responses(pattern, &[], &self.config),
            examples: cap_examples(pattern.examples.clone(), &self.config),
            confidence: self.config.initial_confidence,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mescla um pattern em um registro existente.
    pub fn merge(&self, existing: &Knowledge, pattern: &Pattern, now: DateTime<Utc>) -> Knowledge {
        let mut examples = existing.examples.clone();
        examples.extend(pattern.examples.iter().cloned());

        Knowledge {
            topic: existing.topic,
            responses: generate_responses(pattern, &existing.responses, &self.config),
            examples: cap_examples(examples, &self.config),
            confidence: step_confidence(existing.confidence, &self.config),
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

/// Próxima confiança: `min(max, atual + passo)`, nunca abaixo da atual.
pub fn step_confidence(current: f64, config: &LearningConfig) -> f64 {
    (current + config.confidence_step)
        .min(config.max_confidence)
        .max(current.min(config.max_confidence))
}

/// Limita a lista de exemplos conforme a política de descarte.
///
/// Com [`ExampleEviction::DropNewest`] (padrão) ficam os primeiros
/// `max_examples` de `existentes ++ novos`, ou seja, exemplos novos são
/// descartados quando a base já está cheia.
pub fn cap_examples(mut examples: Vec<Example>, config: &LearningConfig) -> Vec<Example> {
    let max = config.max_examples;
    if examples.len() > max {
        match config.example_eviction {
            ExampleEviction::DropNewest => examples.truncate(max),
            ExampleEviction::DropOldest => {
                let excess = examples.len() - max;
                examples.drain(..excess);
            }
        }
    }
    examples
}

/// Regra de geração de respostas.
///
/// Parte das respostas existentes e acrescenta até `max_new_responses`
/// respostas dos exemplos do pattern que tenham mais que
/// `min_response_chars` unidades UTF-16 e não contenham frases genéricas. O total
/// fica limitado a `max_responses`, mantendo o início da lista.
pub fn generate_responses(
    pattern: &Pattern,
    existing: &[String],
    config: &LearningConfig,
) -> Vec<String> {
    let mut responses = existing.to_vec();

    if pattern.examples.is_empty() {
        return responses;
    }

    let fresh = pattern
        .examples
        .iter()
        .map(|ex| &ex.ai_response)
        .filter(|response| {
            response.encode_utf16().count() > config.min_response_chars
                && !config
                    .boilerplate_phrases
                    .iter()
                    .any(|phrase| response.contains(phrase.as_str()))
        })
        .take(config.max_new_responses)
        .cloned();

    responses.extend(fresh);
    responses.truncate(config.max_responses);
    responses
}
