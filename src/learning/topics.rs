//! Classificação de mensagens em tópicos.
//!
//! A tabela de tópicos é ordenada e a classificação para no primeiro tópico
//! cuja lista de palavras-chave aparece (como substring) na mensagem em
//! minúsculas. A ordem de declaração é o critério de desempate: uma
//! mensagem com palavras de dois tópicos fica com o primeiro.

use serde::{Deserialize, Serialize};

/// Tópicos conhecidos, mais o balde `outros`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "saudação")]
    Saudacao,
    #[serde(rename = "identidade")]
    Identidade,
    #[serde(rename = "capacidades")]
    Capacidades,
    #[serde(rename = "telegram")]
    Telegram,
    #[serde(rename = "voz")]
    Voz,
    #[serde(rename = "aprendizado")]
    Aprendizado,
    #[serde(rename = "segurança")]
    Seguranca,
    #[serde(rename = "outros")]
    Outros,
}

impl Topic {
    /// Chave do tópico no armazenamento.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Saudacao => "saudação",
            Topic::Identidade => "identidade",
            Topic::Capacidades => "capacidades",
            Topic::Telegram => "telegram",
            Topic::Voz => "voz",
            Topic::Aprendizado => "aprendizado",
            Topic::Seguranca => "segurança",
            Topic::Outros => "outros",
        }
    }

    /// Converte a chave armazenada de volta para o tópico.
    pub fn from_key(key: &str) -> Option<Self> {
        ALL_TOPICS.iter().copied().find(|t| t.as_str() == key)
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_TOPICS: [Topic; 8] = [
    Topic::Saudacao,
    Topic::Identidade,
    Topic::Capacidades,
    Topic::Telegram,
    Topic::Voz,
    Topic::Aprendizado,
    Topic::Seguranca,
    Topic::Outros,
];

/// Uma regra da tabela: o tópico e suas palavras-chave.
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

impl TopicRule {
    /// `text` já deve estar em minúsculas.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| text.contains(kw))
    }
}

/// Tabela ordenada de tópicos. A ordem é contrato.
pub const TOPIC_TABLE: &[TopicRule] = &[
    TopicRule {
        topic: Topic::Saudacao,
        keywords: &["olá", "oi", "bom dia", "boa tarde", "boa noite", "hey"],
    },
    TopicRule {
        topic: Topic::Identidade,
        keywords: &["quem é você", "o que você é", "sua função", "seu nome"],
    },
    TopicRule {
        topic: Topic::Capacidades,
        keywords: &["o que pode fazer", "suas habilidades", "consegue", "pode me ajudar"],
    },
    TopicRule {
        topic: Topic::Telegram,
        keywords: &["telegram", "notificação", "mensagem", "celular"],
    },
    TopicRule {
        topic: Topic::Voz,
        keywords: &["voz", "falar", "audio", "som"],
    },
    TopicRule {
        topic: Topic::Aprendizado,
        keywords: &["aprende", "aprendizado", "evolui", "melhora"],
    },
    TopicRule {
        topic: Topic::Seguranca,
        keywords: &["seguro", "segurança", "privacidade", "dados"],
    },
];

/// Classifica uma mensagem; `None` quando nenhuma regra casa.
pub fn classify(message: &str) -> Option<Topic> {
    let text = message.to_lowercase();
    TOPIC_TABLE
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.topic)
}

/// Classifica uma mensagem, caindo em [`Topic::Outros`] sem match.
pub fn classify_or_other(message: &str) -> Topic {
    classify(message).unwrap_or(Topic::Outros)
}
