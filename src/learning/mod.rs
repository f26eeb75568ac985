//! Pipeline de aprendizado do Hermes.
//!
//! Captura de conversas → extração de patterns → atualização da base de
//! conhecimento → recuperação de respostas.
//!
//! ## Componentes
//!
//! - **ConversationStore**: conversas brutas com a marca `analyzed`
//! - **PatternExtractor**: agrupa conversas pendentes por tópico
//! - **KnowledgeBase**: mescla patterns em registros por tópico
//! - **KnowledgeRetriever**: sorteia uma resposta aprendida para uma mensagem
//! - **SchedulerGate**: decide se já é hora de rodar a extração
//! - **LearningPipeline**: liga tudo com armazenamento, relógio e configuração
//! - **Export/Import**: compartilhamento da base entre instalações

mod clock;
mod conversations;
mod export;
mod extractor;
mod knowledge;
mod pipeline;
mod retriever;
mod scheduler;
mod topics;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conversations::ConversationStore;
pub use export::{knowledge_digest, ImportResult, KnowledgeExport, EXPORT_VERSION};
pub use extractor::{extract_patterns, ExtractionReport, PatternExtractor};
pub use knowledge::{cap_examples, generate_responses, step_confidence, KnowledgeBase, UpdateSummary};
pub use pipeline::{LearningPipeline, LearningStatus};
pub use retriever::KnowledgeRetriever;
pub use scheduler::SchedulerGate;
pub use topics::{classify, classify_or_other, Topic, TopicRule, TOPIC_TABLE};
