//! Pipeline de aprendizado.
//!
//! Ponto de entrada para quem conduz os turnos de chat: grava conversas,
//! passa pelo portão de agendamento e consulta a base de conhecimento. Todas
//! as falhas de armazenamento são registradas em log e convertidas em
//! `None`; nenhuma delas interrompe o turno de chat.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::store::{DocumentStore, Query};
use crate::types::config::LearningConfig;
use crate::types::records::{collections, KnowledgeResponse};
use crate::HermesResult;

use super::clock::{Clock, SystemClock};
use super::conversations::ConversationStore;
use super::extractor::{ExtractionReport, PatternExtractor};
use super::knowledge::KnowledgeBase;
use super::retriever::KnowledgeRetriever;
use super::scheduler::SchedulerGate;

/// Contagens do estado do aprendizado.
#[derive(Debug, Clone, Serialize)]
pub struct LearningStatus {
    pub enabled: bool,
    pub backend: String,
    pub conversations: usize,
    pub unanalyzed: usize,
    pub patterns: usize,
    pub topics: usize,
    pub last_analysis: Option<chrono::DateTime<chrono::Utc>>,
}

/// Pipeline de aprendizado com dependências explícitas.
pub struct LearningPipeline {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    gate: Arc<SchedulerGate>,
    enabled: AtomicBool,
    conversations: ConversationStore,
    knowledge: KnowledgeBase,
    extractor: PatternExtractor,
    retriever: KnowledgeRetriever,
}

impl LearningPipeline {
    /// Cria o pipeline.
    ///
    /// O portão é recebido de fora para que várias instâncias possam
    /// compartilhar (ou não) o mesmo estado de agendamento.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        gate: Arc<SchedulerGate>,
        config: LearningConfig,
    ) -> Self {
        let enabled = AtomicBool::new(config.enabled);
        let conversations = ConversationStore::new(store.clone(), clock.clone());
        let knowledge = KnowledgeBase::new(store.clone(), clock.clone(), config);
        let extractor = PatternExtractor::new(
            store.clone(),
            clock.clone(),
            conversations.clone(),
            knowledge.clone(),
        );
        let retriever = KnowledgeRetriever::new(knowledge.clone());

        Self {
            store,
            clock,
            gate,
            enabled,
            conversations,
            knowledge,
            extractor,
            retriever,
        }
    }

    /// Pipeline com relógio de parede e portão próprio.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: LearningConfig) -> Self {
        let gate = Arc::new(SchedulerGate::new(config.analysis_interval()));
        Self::new(store, Arc::new(SystemClock), gate, config)
    }

    /// Grava um turno de conversa para aprendizado.
    ///
    /// Depois de gravar, passa pelo portão de agendamento e, se liberado,
    /// roda a extração antes de retornar. Retorna `None` quando o
    /// aprendizado está desligado ou a gravação falhou; o chamador não
    /// precisa tratar a falha.
    pub async fn save_conversation(
        &self,
        user_message: &str,
        ai_response: &str,
        context: Value,
    ) -> Option<String> {
        if !self.is_learning_enabled() {
            return None;
        }

        let id = match self
            .conversations
            .insert(user_message, ai_response, context)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save conversation for learning");
                return None;
            }
        };

        self.maybe_run_extraction().await;
        Some(id)
    }

    /// Roda a extração se o portão permitir.
    pub async fn maybe_run_extraction(&self) -> Option<ExtractionReport> {
        let now = self.clock.now();
        if !self.gate.should_run(now) {
            return None;
        }

        let report = self.run_extraction().await;
        self.gate.mark_run(now);
        report
    }

    /// Roda a extração imediatamente, ignorando o portão.
    pub async fn run_extraction(&self) -> Option<ExtractionReport> {
        match self.extractor.extract().await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!(error = %e, "Failed to analyze conversations");
                None
            }
        }
    }

    /// Consulta a base de conhecimento para uma mensagem.
    pub async fn respond(&self, message: &str) -> Option<KnowledgeResponse> {
        match self.retriever.retrieve(message).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch response from knowledge base");
                None
            }
        }
    }

    /// Liga ou desliga o aprendizado; retorna o novo estado.
    pub fn set_learning_enabled(&self, enabled: bool) -> bool {
        self.enabled.store(enabled, Ordering::SeqCst);
        enabled
    }

    pub fn is_learning_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Contagens atuais do armazenamento.
    pub async fn status(&self) -> HermesResult<LearningStatus> {
        let patterns = self
            .store
            .query(collections::PATTERNS, &Query::new())
            .await?
            .len();

        Ok(LearningStatus {
            enabled: self.is_learning_enabled(),
            backend: self.store.name().to_string(),
            conversations: self.conversations.count().await?,
            unanalyzed: self.conversations.count_unanalyzed().await?,
            patterns,
            topics: self.knowledge.all().await?.len(),
            last_analysis: self.gate.last_run(),
        })
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn extractor(&self) -> &PatternExtractor {
        &self.extractor
    }

    pub fn retriever(&self) -> &KnowledgeRetriever {
        &self.retriever
    }

    pub fn gate(&self) -> &SchedulerGate {
        &self.gate
    }
}
