//! Interface de linha de comando do Hermes.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hermes - pipeline de aprendizado do chat HermesVerse.
#[derive(Parser, Debug)]
#[command(name = "hermes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "hermes.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Envia uma mensagem e mostra a resposta.
    Ask {
        /// Mensagem do usuário.
        message: String,
    },

    /// Abre um chat interativo.
    Chat,

    /// Analisa as conversas pendentes agora, ignorando o intervalo.
    Analyze,

    /// Lista a base de conhecimento.
    Knowledge {
        /// Número máximo de respostas mostradas por tópico.
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Mostra contagens do aprendizado.
    Status,

    /// Exporta a base de conhecimento para JSON.
    Export {
        /// Arquivo de saída.
        output: PathBuf,
    },

    /// Importa uma base de conhecimento de JSON.
    Import {
        /// Arquivo de entrada.
        input: PathBuf,
    },

    /// Configura opções interativamente.
    Config,

    /// Mostra versão.
    Version,
}
