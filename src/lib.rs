//! # Hermes
//!
//! Pipeline de aprendizado do chat HermesVerse.
//!
//! Cada turno de conversa é gravado; periodicamente as conversas pendentes
//! são agrupadas por tópico e mescladas em uma base de conhecimento, que é
//! consultada antes do respondedor padrão nos turnos seguintes.
//!
//! ## Módulos
//!
//! - [`cli`] - Interface de linha de comando
//! - [`learning`] - Captura, extração, base de conhecimento e recuperação
//! - [`chat`] - Turno de chat (conhecimento aprendido ou respostas fixas)
//! - [`store`] - Armazenamento de documentos (memória e SQLite)
//! - [`types`] - Tipos compartilhados

pub mod chat;
#[cfg(feature = "cli")]
pub mod cli;
pub mod learning;
pub mod store;
pub mod types;

pub use types::config::Config;
pub use types::errors::{HermesError, HermesResult};
