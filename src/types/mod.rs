//! Tipos compartilhados do Hermes.

pub mod config;
pub mod errors;
pub mod records;
