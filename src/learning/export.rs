//! Export/Import da base de conhecimento.
//!
//! Permite levar o conhecimento aprendido de uma instalação do Hermes para
//! outra. O arquivo carrega um digest SHA-256 dos registros; importações
//! com digest divergente são recusadas.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::types::records::{Knowledge, Record};
use crate::{HermesError, HermesResult};

use super::knowledge::{cap_examples, KnowledgeBase};

/// Versão do formato de exportação.
pub const EXPORT_VERSION: &str = "1.0";

/// Estrutura de exportação da base de conhecimento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeExport {
    /// Versão do formato de exportação.
    pub version: String,
    /// Data/hora da exportação.
    pub exported_at: DateTime<Utc>,
    /// SHA-256 (hex) de `knowledge` serializado.
    pub digest: String,
    /// Registros exportados.
    pub knowledge: Vec<Knowledge>,
}

/// Resultado de uma importação.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Tópicos novos.
    pub imported: usize,
    /// Tópicos existentes que receberam dados novos.
    pub merged: usize,
    /// Tópicos existentes sem nada a acrescentar.
    pub skipped: usize,
}

/// Digest dos registros exportados.
pub fn knowledge_digest(knowledge: &[Knowledge]) -> HermesResult<String> {
    let payload = serde_json::to_vec(knowledge)?;
    let mut hasher = Sha256::new();
    hasher.update(&payload);
    Ok(hex::encode(hasher.finalize()))
}

impl KnowledgeBase {
    /// Exporta a base para arquivo JSON; retorna quantos tópicos saíram.
    pub async fn export(&self, path: &Path) -> HermesResult<usize> {
        let knowledge: Vec<Knowledge> = self.all().await?.into_iter().map(|s| s.record).collect();

        let export = KnowledgeExport {
            version: EXPORT_VERSION.to_string(),
            exported_at: self.clock.now(),
            digest: knowledge_digest(&knowledge)?,
            knowledge,
        };

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, json)?;

        tracing::info!(
            path = %path.display(),
            topics = export.knowledge.len(),
            "Knowledge base exported"
        );

        Ok(export.knowledge.len())
    }

    /// Importa conhecimento de arquivo JSON.
    pub async fn import(&self, path: &Path) -> HermesResult<ImportResult> {
        let json = std::fs::read_to_string(path)?;
        let export: KnowledgeExport = serde_json::from_str(&json)?;

        if knowledge_digest(&export.knowledge)? != export.digest {
            return Err(HermesError::Import(format!(
                "digest não confere em {}",
                path.display()
            )));
        }

        let mut result = ImportResult::default();

        for incoming in export.knowledge {
            match self.find(incoming.topic).await? {
                None => {
                    let record = self.normalize_imported(incoming);
                    self.store
                        .insert(Knowledge::COLLECTION, record.to_document()?)
                        .await?;
                    result.imported += 1;
                }
                Some(existing) => match self.merge_imported(&existing.record, &incoming) {
                    Some(merged) => {
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
                        result.merged += 1;
                    }
                    None => result.skipped += 1,
                },
            }
        }

        tracing::info!(
            path = %path.display(),
            imported = result.imported,
            merged = result.merged,
            skipped = result.skipped,
            "Knowledge base imported"
        );

        Ok(result)
    }

    /// Ajusta um registro importado aos limites locais.
    fn normalize_imported(&self, mut record: Knowledge) -> Knowledge {
        let config = &self.config;
        record.examples = cap_examples(record.examples, config);
        record.responses.truncate(config.max_responses);
        record.confidence = record
            .confidence
            .clamp(config.initial_confidence, config.max_confidence);
        record
    }

    /// Mescla um registro importado; `None` se não há nada novo.
    fn merge_imported(&self, existing: &Knowledge, incoming: &Knowledge) -> Option<Knowledge> {
        let config = &self.config;

        let new_examples: Vec<_> = incoming
            .examples
            .iter()
            .filter(|ex| !existing.examples.contains(ex))
            .cloned()
            .collect();
        let new_responses: Vec<_> = incoming
            .responses
            .iter()
            .filter(|r| !existing.responses.contains(r))
            .cloned()
            .collect();
        let confidence = incoming
            .confidence
            .min(config.max_confidence)
            .max(existing.confidence);

        if new_examples.is_empty() && new_responses.is_empty() && confidence <= existing.confidence {
            return None;
        }

        let mut examples = existing.examples.clone();
        examples.extend(new_examples);
        let mut responses = existing.responses.clone();
        responses.extend(new_responses);
        responses.truncate(config.max_responses);

        Some(Knowledge {
            topic: existing.topic,
            responses,
            examples: cap_examples(examples, config),
            confidence,
            created_at: existing.created_at,
            updated_at: self.clock.now(),
        })
    }
}
