//! Turno de chat do Hermes.
//!
//! Cada mensagem tenta primeiro uma resposta aprendida; ela só é usada se a
//! confiança do tópico passar do limiar configurado. Caso contrário, um
//! [`FallbackResponder`] responde. Em seguida o turno é gravado para
//! aprendizado.

mod fallback;

pub use fallback::{FallbackResponder, StaticResponder, DEFAULT_REPLY};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::learning::{LearningPipeline, Topic};
use crate::types::config::ChatConfig;

/// Mensagem de boas-vindas exibida ao abrir o chat.
pub const WELCOME_MESSAGE: &str = "Olá! Eu sou Hermes, sua IA evolutiva. Estou aqui para conversar, aprender e evoluir com você. Como posso ajudar hoje?";

/// Resposta usada quando o respondedor falha.
pub const ERROR_REPLY: &str =
    "Desculpe, ocorreu um erro ao processar sua mensagem. Poderia tentar novamente?";

/// Origem de uma resposta.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplySource {
    /// Resposta aprendida.
    Knowledge { topic: Topic, confidence: f64 },
    /// Resposta do respondedor de fallback.
    Fallback { responder: String },
    /// O respondedor falhou.
    Error,
}

/// Resposta de um turno.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
    /// Identificador da conversa gravada, se o aprendizado gravou.
    pub conversation_id: Option<String>,
}

/// Conduz turnos de chat sobre o pipeline de aprendizado.
pub struct ChatService {
    pipeline: Arc<LearningPipeline>,
    fallback: Box<dyn FallbackResponder>,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(
        pipeline: Arc<LearningPipeline>,
        fallback: Box<dyn FallbackResponder>,
        config: ChatConfig,
    ) -> Self {
        Self {
            pipeline,
            fallback,
            config,
        }
    }

    /// Serviço com o respondedor estático.
    pub fn with_static_fallback(pipeline: Arc<LearningPipeline>, config: ChatConfig) -> Self {
        Self::new(pipeline, Box::new(StaticResponder::new()), config)
    }

    /// Processa uma mensagem do usuário.
    pub async fn send(&self, message: &str, context: Value) -> ChatReply {
        let (text, source) = self.answer(message).await;

        let conversation_id = self
            .pipeline
            .save_conversation(message, &text, context)
            .await;

        ChatReply {
            text,
            source,
            conversation_id,
        }
    }

    async fn answer(&self, message: &str) -> (String, ReplySource) {
        if let Some(learned) = self.pipeline.respond(message).await {
            if learned.confidence > self.config.response_threshold {
                tracing::debug!(
                    topic = %learned.topic,
                    confidence = learned.confidence,
                    "Using learned response"
                );
                return (
                    learned.text,
                    ReplySource::Knowledge {
                        topic: learned.topic,
                        confidence: learned.confidence,
                    },
                );
            }
        }

        match self.fallback.reply(message).await {
            Ok(text) => (
                text,
                ReplySource::Fallback {
                    responder: self.fallback.name().to_string(),
                },
            ),
            Err(e) => {
                tracing::error!(error = %e, responder = self.fallback.name(), "Fallback responder failed");
                (ERROR_REPLY.to_string(), ReplySource::Error)
            }
        }
    }

    pub fn pipeline(&self) -> &LearningPipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::{ManualClock, SchedulerGate};
    use crate::store::MemoryStore;
    use crate::types::config::LearningConfig;
    use crate::{HermesError, HermesResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    struct Broken;

    #[async_trait]
    impl FallbackResponder for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn reply(&self, _message: &str) -> HermesResult<String> {
            Err(HermesError::other("sem resposta"))
        }
    }

    fn pipeline() -> Arc<LearningPipeline> {
        Arc::new(LearningPipeline::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(Utc::now())),
            Arc::new(SchedulerGate::daily()),
            LearningConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_fallback_when_nothing_learned() {
        let chat = ChatService::with_static_fallback(pipeline(), ChatConfig::default());
        let reply = chat.send("Oi, tudo bem?", json!({})).await;

        assert!(reply.text.starts_with("Olá! Eu sou Hermes"));
        assert_eq!(
            reply.source,
            ReplySource::Fallback {
                responder: "static".to_string()
            }
        );
        assert!(reply.conversation_id.is_some());
    }

    #[tokio::test]
    async fn test_failing_fallback_yields_error_reply() {
        let chat = ChatService::new(pipeline(), Box::new(Broken), ChatConfig::default());
        let reply = chat.send("qualquer coisa", json!({})).await;

        assert_eq!(reply.text, ERROR_REPLY);
        assert_eq!(reply.source, ReplySource::Error);
    }

    #[tokio::test]
    async fn test_low_confidence_knowledge_is_ignored() {
        let pipeline = pipeline();
        let long = "Posso responder por voz usando tecnologia Text-to-Speech quando você preferir.";
        // cria conhecimento de "voz" com confiança inicial (0.70 < 0.75)
        pipeline.save_conversation("voz", long, json!({})).await;

        let chat = ChatService::with_static_fallback(pipeline, ChatConfig::default());
        let reply = chat.send("ativa a voz", json!({})).await;
        assert!(matches!(reply.source, ReplySource::Fallback { .. }));
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        let pipeline = pipeline();
        let long = "Posso responder por voz usando tecnologia Text-to-Speech quando você preferir.";
        pipeline.save_conversation("voz", long, json!({})).await;

        let chat = ChatService::with_static_fallback(
            pipeline,
            ChatConfig {
                response_threshold: 0.5,
            },
        );
        let reply = chat.send("ativa a voz", json!({})).await;

        assert_eq!(reply.text, long);
        assert!(matches!(
            reply.source,
            ReplySource::Knowledge { topic: Topic::Voz, .. }
        ));
    }
}
