//! Testes de integração para o pipeline de aprendizado do Hermes.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use hermes::learning::{
    classify, classify_or_other, extract_patterns, LearningPipeline, ManualClock, SchedulerGate,
    Topic, TOPIC_TABLE,
};
use hermes::store::{DocumentStore, MemoryStore, Query};
use hermes::types::config::{ExampleEviction, LearningConfig};
use hermes::types::records::{collections, Conversation};

const LONG_GREETING: &str =
    "Olá! Eu sou Hermes, sua IA evolutiva. Como posso ajudar você hoje? Pergunte o que quiser.";

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ))
}

fn pipeline_with(config: LearningConfig) -> (LearningPipeline, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = clock();
    let gate = Arc::new(SchedulerGate::new(config.analysis_interval()));
    let pipeline = LearningPipeline::new(store.clone(), clock.clone(), gate, config);
    (pipeline, store, clock)
}

fn pipeline() -> (LearningPipeline, Arc<MemoryStore>, Arc<ManualClock>) {
    pipeline_with(LearningConfig::default())
}

/// Grava conversas sem passar pelo portão de agendamento.
async fn insert_many(pipeline: &LearningPipeline, user: &str, ai: &str, count: usize) {
    for i in 0..count {
        pipeline
            .conversations()
            .insert(&format!("{} {}", user, i), ai, json!({}))
            .await
            .expect("insert conversation");
    }
}

// Classificação de tópicos
mod classification_tests {
    use super::*;

    #[test]
    fn test_each_keyword_classifies_as_its_topic_unless_shadowed() {
        for (idx, rule) in TOPIC_TABLE.iter().enumerate() {
            for keyword in rule.keywords {
                let message = format!("então, {} aqui", keyword);
                let shadowed = TOPIC_TABLE[..idx]
                    .iter()
                    .any(|earlier| earlier.matches(&message.to_lowercase()));

                if !shadowed {
                    assert_eq!(
                        classify(&message),
                        Some(rule.topic),
                        "keyword {:?} should classify as {}",
                        keyword,
                        rule.topic
                    );
                }
            }
        }
    }

    #[test]
    fn test_earlier_topic_wins() {
        assert_eq!(classify("oi, quem é você?"), Some(Topic::Saudacao));
        assert_eq!(classify("quem é você e o que pode fazer?"), Some(Topic::Identidade));
        assert_eq!(classify("manda minha voz no telegram"), Some(Topic::Telegram));
    }

    #[tokio::test]
    async fn test_unmatched_message_is_outros_for_extraction_and_none_for_retrieval() {
        let message = "qual a capital da frança";
        assert_eq!(classify(message), None);
        assert_eq!(classify_or_other(message), Topic::Outros);

        let (pipeline, _store, _clock) = pipeline();
        pipeline.save_conversation(message, LONG_GREETING, json!({})).await;

        // existe conhecimento de "outros", mas a recuperação nunca o consulta
        let outros = pipeline.knowledge().find(Topic::Outros).await.unwrap();
        assert!(outros.is_some());
        assert!(pipeline.respond(message).await.is_none());
    }
}

// Invariantes da base de conhecimento
mod knowledge_invariant_tests {
    use super::*;

    #[tokio::test]
    async fn test_caps_hold_after_many_cycles() {
        let (pipeline, _store, _clock) = pipeline();

        for cycle in 0..8 {
            for i in 0..12 {
                let response = format!(
                    "Resposta longa número {} do ciclo {} sobre privacidade e segurança dos dados.",
                    i, cycle
                );
                pipeline
                    .conversations()
                    .insert("meus dados estão seguros?", &response, json!({}))
                    .await
                    .unwrap();
            }
            pipeline.extractor().extract().await.unwrap();

            let knowledge = pipeline
                .knowledge()
                .find(Topic::Seguranca)
                .await
                .unwrap()
                .expect("knowledge exists")
                .record;
            assert!(knowledge.responses.len() <= 5);
            assert!(knowledge.examples.len() <= 50);
        }
    }

    #[tokio::test]
    async fn test_confidence_is_monotonic_and_bounded() {
        let (pipeline, _store, _clock) = pipeline();
        let mut previous = 0.0;

        for cycle in 0..40 {
            pipeline
                .conversations()
                .insert("fala comigo por voz", &format!("ok {}", cycle), json!({}))
                .await
                .unwrap();
            pipeline.extractor().extract().await.unwrap();

            let confidence = pipeline
                .knowledge()
                .find(Topic::Voz)
                .await
                .unwrap()
                .unwrap()
                .record
                .confidence;

            assert!(confidence >= 0.70);
            assert!(confidence <= 0.95 + f64::EPSILON);
            assert!(confidence >= previous);
            previous = confidence;
        }

        assert!((previous - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_extraction_is_idempotent_without_new_conversations() {
        let (pipeline, store, _clock) = pipeline();
        insert_many(&pipeline, "olá", LONG_GREETING, 3).await;

        let first = pipeline.extractor().extract().await.unwrap();
        assert_eq!(first.conversations_analyzed, 3);

        let patterns_before = store.len(collections::PATTERNS).await;
        let knowledge_before = pipeline.knowledge().all().await.unwrap();

        let second = pipeline.extractor().extract().await.unwrap();
        assert!(second.is_empty());
        assert_eq!(store.len(collections::PATTERNS).await, patterns_before);

        let knowledge_after = pipeline.knowledge().all().await.unwrap();
        assert_eq!(knowledge_before.len(), knowledge_after.len());
        for (before, after) in knowledge_before.iter().zip(&knowledge_after) {
            assert_eq!(before.record, after.record);
        }
    }

    #[test]
    fn test_patterns_follow_first_seen_order() {
        let now = Utc::now();
        let batch = vec![
            Conversation::new("ativa a voz", "ok", json!({}), now),
            Conversation::new("olá", "oi", json!({}), now),
            Conversation::new("som alto", "ok", json!({}), now),
        ];

        let patterns = extract_patterns(&batch, now);
        let topics: Vec<Topic> = patterns.iter().map(|p| p.topic).collect();
        assert_eq!(topics, vec![Topic::Voz, Topic::Saudacao]);
        assert_eq!(patterns[0].frequency, 2);
    }
}

// Cenários ponta a ponta
mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_scenario_greeting_creates_knowledge() {
        let (pipeline, _store, _clock) = pipeline();

        pipeline
            .save_conversation("Olá", "Oi! Como posso ajudar?", json!({}))
            .await
            .expect("conversation saved");

        let knowledge = pipeline
            .knowledge()
            .find(Topic::Saudacao)
            .await
            .unwrap()
            .expect("knowledge for saudação")
            .record;

        assert!((knowledge.confidence - 0.70).abs() < 1e-9);
        // resposta curta (< 50 caracteres) não entra na lista
        assert!(knowledge.responses.is_empty());
        assert_eq!(knowledge.examples.len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_long_greeting_is_learned() {
        let (pipeline, _store, _clock) = pipeline();

        pipeline.save_conversation("Olá", LONG_GREETING, json!({})).await;

        let knowledge = pipeline
            .knowledge()
            .find(Topic::Saudacao)
            .await
            .unwrap()
            .unwrap()
            .record;
        assert_eq!(knowledge.responses, vec![LONG_GREETING.to_string()]);
    }

    #[tokio::test]
    async fn test_scenario_retrieve_before_any_knowledge() {
        let (pipeline, _store, _clock) = pipeline();
        assert!(pipeline.respond("Oi, tudo bem?").await.is_none());
    }

    #[tokio::test]
    async fn test_scenario_sixty_examples_capped_at_fifty() {
        let (pipeline, _store, _clock) = pipeline();

        insert_many(&pipeline, "olá", LONG_GREETING, 30).await;
        pipeline.extractor().extract().await.unwrap();
        insert_many(&pipeline, "bom dia", LONG_GREETING, 30).await;
        pipeline.extractor().extract().await.unwrap();

        let knowledge = pipeline
            .knowledge()
            .find(Topic::Saudacao)
            .await
            .unwrap()
            .unwrap()
            .record;
        assert_eq!(knowledge.examples.len(), 50);

        // descarte padrão mantém os mais antigos: os novos se perdem
        assert!(knowledge.examples[0].user_message.starts_with("olá"));
        assert!(knowledge.examples[49].user_message.starts_with("bom dia"));
        assert_eq!(
            knowledge
                .examples
                .iter()
                .filter(|e| e.user_message.starts_with("bom dia"))
                .count(),
            20
        );
    }

    #[tokio::test]
    async fn test_scenario_sixty_examples_drop_oldest_opt_in() {
        let config = LearningConfig {
            example_eviction: ExampleEviction::DropOldest,
            ..LearningConfig::default()
        };
        let (pipeline, _store, _clock) = pipeline_with(config);

        insert_many(&pipeline, "olá", LONG_GREETING, 30).await;
        pipeline.extractor().extract().await.unwrap();
        insert_many(&pipeline, "bom dia", LONG_GREETING, 30).await;
        pipeline.extractor().extract().await.unwrap();

        let knowledge = pipeline
            .knowledge()
            .find(Topic::Saudacao)
            .await
            .unwrap()
            .unwrap()
            .record;
        assert_eq!(knowledge.examples.len(), 50);
        assert!(knowledge.examples[49].user_message.starts_with("bom dia 29"));
    }

    #[tokio::test]
    async fn test_scenario_concurrent_runs_are_at_least_once() {
        let (pipeline, store, _clock) = pipeline();
        insert_many(&pipeline, "olá", LONG_GREETING, 4).await;

        // duas execuções leem o mesmo lote antes de qualquer marcação
        let batch_a = pipeline.extractor().fetch_unanalyzed().await.unwrap();
        let batch_b = pipeline.extractor().fetch_unanalyzed().await.unwrap();
        assert_eq!(batch_a.len(), 4);
        assert_eq!(batch_b.len(), 4);

        let report_a = pipeline.extractor().process_batch(batch_a).await.unwrap();
        let report_b = pipeline.extractor().process_batch(batch_b).await.unwrap();
        assert_eq!(report_a.knowledge_created, 1);
        assert_eq!(report_b.knowledge_updated, 1);

        let conversations = pipeline.conversations();
        assert_eq!(conversations.count().await.unwrap(), 4);
        assert_eq!(conversations.count_unanalyzed().await.unwrap(), 0);

        // o lote foi contado duas vezes, mas os registros continuam válidos
        assert_eq!(store.len(collections::PATTERNS).await, 2);
        let knowledge = pipeline.knowledge().all().await.unwrap();
        assert_eq!(knowledge.len(), 1);
        let record = &knowledge[0].record;
        assert_eq!(record.topic, Topic::Saudacao);
        assert_eq!(record.examples.len(), 8);
        assert!(record.responses.len() <= 5);
        assert!((record.confidence - 0.71).abs() < 1e-9);
    }
}

// Portão de agendamento
mod scheduling_tests {
    use super::*;

    #[tokio::test]
    async fn test_saves_inside_window_wait_for_next_day() {
        let (pipeline, _store, clock) = pipeline();

        pipeline.save_conversation("olá", LONG_GREETING, json!({})).await;
        pipeline.save_conversation("ativa a voz", LONG_GREETING, json!({})).await;

        assert!(pipeline.knowledge().find(Topic::Voz).await.unwrap().is_none());
        assert_eq!(pipeline.conversations().count_unanalyzed().await.unwrap(), 1);

        clock.advance(Duration::hours(24) + Duration::seconds(1));
        pipeline.save_conversation("e o som?", LONG_GREETING, json!({})).await;

        assert!(pipeline.knowledge().find(Topic::Voz).await.unwrap().is_some());
        assert_eq!(pipeline.conversations().count_unanalyzed().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_separate_gates_are_independent() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let clock = clock();
        let config = LearningConfig::default();

        let a = LearningPipeline::new(
            store.clone(),
            clock.clone(),
            Arc::new(SchedulerGate::daily()),
            config.clone(),
        );
        let b = LearningPipeline::new(
            store.clone(),
            clock.clone(),
            Arc::new(SchedulerGate::daily()),
            config,
        );

        a.save_conversation("olá", LONG_GREETING, json!({})).await;
        b.save_conversation("ativa a voz", LONG_GREETING, json!({})).await;

        // cada instância roda sua primeira extração
        assert!(a.gate().last_run().is_some());
        assert!(b.gate().last_run().is_some());
        assert_eq!(a.conversations().count_unanalyzed().await.unwrap(), 0);
    }
}

// Mesmo fluxo sobre SQLite
#[cfg(feature = "sqlite")]
mod sqlite_tests {
    use super::*;
    use hermes::store::SqliteStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pipeline_on_sqlite_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("hermes.db");
        let store: Arc<dyn DocumentStore> =
            Arc::new(SqliteStore::open(&db_path).expect("Failed to open store"));

        let pipeline = LearningPipeline::new(
            store.clone(),
            clock(),
            Arc::new(SchedulerGate::daily()),
            LearningConfig::default(),
        );

        pipeline
            .save_conversation("Olá", LONG_GREETING, json!({ "channel": "test" }))
            .await
            .expect("conversation saved");

        assert!(db_path.exists());
        let reply = pipeline.respond("oi de novo").await.expect("learned reply");
        assert_eq!(reply.text, LONG_GREETING);
        assert_eq!(reply.topic, Topic::Saudacao);

        let patterns = store
            .query(collections::PATTERNS, &Query::new())
            .await
            .unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].body["topic"], "saudação");
    }
}
