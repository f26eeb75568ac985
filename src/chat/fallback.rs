//! Respondedores usados quando a base de conhecimento não responde.

use async_trait::async_trait;

use crate::HermesResult;

/// Produz uma resposta para a mensagem do usuário.
#[async_trait]
pub trait FallbackResponder: Send + Sync {
    /// Nome do respondedor.
    fn name(&self) -> &str;

    /// Gera a resposta.
    async fn reply(&self, message: &str) -> HermesResult<String>;
}

/// Resposta padrão quando nenhuma regra casa.
pub const DEFAULT_REPLY: &str = "Entendi sua mensagem. Estou em fase inicial de aprendizado e evoluindo continuamente para oferecer respostas mais precisas e úteis. Há algo específico em que posso ajudar?";

struct ReplyRule {
    keywords: &'static [&'static str],
    reply: &'static str,
}

// Ordem importa: a primeira regra que casa responde.
const RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["olá", "oi"],
        reply: "Olá! Eu sou Hermes, sua IA evolutiva. Como posso ajudar você hoje?",
    },
    ReplyRule {
        keywords: &["quem é você", "o que você é"],
        reply: "Eu sou Hermes, uma IA evolutiva projetada para aprender e me adaptar às suas necessidades. Posso conversar, responder perguntas e, com sua permissão, evoluir para oferecer funcionalidades cada vez mais avançadas.",
    },
    ReplyRule {
        keywords: &["telegram"],
        reply: "Posso me conectar ao Telegram para enviar notificações e permitir que você interaja comigo remotamente. Deseja configurar essa integração agora?",
    },
    ReplyRule {
        keywords: &["voz"],
        reply: "Posso responder por voz usando tecnologia Text-to-Speech. Você pode ativar ou desativar essa função a qualquer momento usando o botão de microfone no chat.",
    },
    ReplyRule {
        keywords: &["aprend"],
        reply: "Estou constantemente aprendendo com nossas interações. Cada conversa me ajuda a entender melhor suas preferências e necessidades, permitindo que eu evolua para servi-lo melhor.",
    },
    ReplyRule {
        keywords: &["evolu"],
        reply: "Fui projetado para evoluir continuamente. Com sua autorização, posso modificar meu próprio código para adicionar novas funcionalidades e melhorar meu desempenho, tornando-me cada vez mais útil para você.",
    },
    ReplyRule {
        keywords: &["banco de dados", "armazen"],
        reply: "Armazeno nossas conversas e suas preferências em um banco de documentos. Os dados ficam acessíveis apenas com sua autorização.",
    },
    ReplyRule {
        keywords: &["segurança", "privacidade"],
        reply: "Sua segurança e privacidade são minhas prioridades. Todas as comunicações são criptografadas, e nunca compartilho seus dados sem autorização explícita. Você tem controle total sobre quais informações são armazenadas.",
    },
    ReplyRule {
        keywords: &["ajuda", "comandos"],
        reply: "Você pode interagir comigo naturalmente através de texto. Alguns tópicos que posso ajudar incluem: informações sobre mim, configurações de voz, integrações com Telegram, segurança e privacidade, e minha capacidade de evolução.",
    },
];

/// Respostas fixas escolhidas por palavra-chave.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticResponder;

impl StaticResponder {
    pub fn new() -> Self {
        Self
    }

    /// Resposta para a mensagem, sem I/O.
    pub fn reply_for(message: &str) -> &'static str {
        let text = message.to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| text.contains(kw)))
            .map(|rule| rule.reply)
            .unwrap_or(DEFAULT_REPLY)
    }
}

#[async_trait]
impl FallbackResponder for StaticResponder {
    fn name(&self) -> &str {
        "static"
    }

    async fn reply(&self, message: &str) -> HermesResult<String> {
        Ok(Self::reply_for(message).to_string())
    }
}
