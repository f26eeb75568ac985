//! Tipos de erro do Hermes.

use thiserror::Error;

/// Tipo de resultado padrão do Hermes.
pub type HermesResult<T> = Result<T, HermesError>;

/// Erros possíveis no Hermes.
#[derive(Error, Debug)]
pub enum HermesError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("Erro no banco SQLite: {0}")]
    Database(#[from] rusqlite::Error),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Erro no armazenamento de documentos: {0}")]
    Store(String),

    #[error("Documento '{id}' não encontrado na coleção '{collection}'")]
    DocumentNotFound { collection: String, id: String },

    #[error("Registro inválido na coleção '{collection}': {reason}")]
    InvalidRecord { collection: String, reason: String },

    #[error("Falha na importação: {0}")]
    Import(String),

    #[error("{0}")]
    Other(String),
}

impl HermesError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de armazenamento.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }
}
