//! Interação no terminal: chat e configuração.
//!
//! Este módulo usa dialoguer para os prompts.

use std::path::{Path, PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::chat::{ChatService, ReplySource, WELCOME_MESSAGE};
use crate::types::config::{Config, ExampleEviction, StorageBackend};
use crate::HermesResult;

/// Palavras que encerram o chat.
const EXIT_WORDS: [&str; 3] = ["sair", "exit", "quit"];

/// Executa o chat interativo até o usuário sair.
pub async fn run_chat(chat: &ChatService) -> HermesResult<()> {
    let theme = ColorfulTheme::default();

    println!("\nHermes: {}\n", WELCOME_MESSAGE);
    println!("(digite 'sair' para encerrar)\n");

    loop {
        let message: String = Input::with_theme(&theme)
            .with_prompt("Você")
            .interact_text()?;

        let trimmed = message.trim();
        if EXIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
            println!("\nAté logo!\n");
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let reply = chat
            .send(trimmed, serde_json::json!({ "channel": "cli-chat" }))
            .await;

        let marker = match &reply.source {
            ReplySource::Knowledge { topic, confidence } => {
                format!(" [aprendido: {}, {:.0}%]", topic, confidence * 100.0)
            }
            _ => String::new(),
        };
        println!("Hermes{}: {}\n", marker, reply.text);
    }

    Ok(())
}

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> HermesResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Configuração Interativa do Hermes\n");

    // Carrega config existente ou cria nova
    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Criando nova configuração...\n");
        Config::default_config()
    };

    loop {
        let options = vec![
            "Configurações Gerais",
            "Armazenamento",
            "Aprendizado",
            "Chat",
            "Salvar e Sair",
            "Sair sem Salvar",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("O que deseja configurar?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_storage(&theme, &mut config)?,
            2 => configure_learning(&theme, &mut config)?,
            3 => configure_chat(&theme, &mut config)?,
            4 => {
                config.save(config_path)?;
                println!("\n✓ Configuração salva em: {}\n", config_path.display());
                break;
            }
            5 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Deseja realmente sair sem salvar?")
                    .default(false)
                    .interact()?
                {
                    println!("\nSaindo sem salvar.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Configura opções gerais.
fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> HermesResult<()> {
    println!("\n📋 Configurações Gerais\n");

    let log_levels = vec!["error", "warn", "info", "debug", "trace"];
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Nível de log")
        .items(&log_levels)
        .default(current_idx)
        .interact()?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    let log_formats = vec!["text", "json"];
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Formato de log")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ Configurações gerais atualizadas.\n");
    Ok(())
}

/// Configura o armazenamento.
fn configure_storage(theme: &ColorfulTheme, config: &mut Config) -> HermesResult<()> {
    println!("\n💾 Configuração do Armazenamento\n");

    let backends = vec!["SQLite (arquivo)", "Memória (descartado ao sair)"];
    let current_idx = match config.storage.backend {
        StorageBackend::Sqlite => 0,
        StorageBackend::Memory => 1,
    };

    let backend_idx = Select::with_theme(theme)
        .with_prompt("Backend")
        .items(&backends)
        .default(current_idx)
        .interact()?;

    config.storage.backend = match backend_idx {
        0 => StorageBackend::Sqlite,
        _ => StorageBackend::Memory,
    };

    if config.storage.backend == StorageBackend::Sqlite {
        let db_path: String = Input::with_theme(theme)
            .with_prompt("Caminho do banco de dados")
            .default(config.storage.db_path.display().to_string())
            .interact_text()?;

        config.storage.db_path = PathBuf::from(db_path);
    }

    println!("\n✓ Armazenamento configurado.\n");
    Ok(())
}

/// Configura o aprendizado.
fn configure_learning(theme: &ColorfulTheme, config: &mut Config) -> HermesResult<()> {
    println!("\n🧠 Configuração do Aprendizado\n");

    config.learning.enabled = Confirm::with_theme(theme)
        .with_prompt("Aprendizado habilitado?")
        .default(config.learning.enabled)
        .interact()?;

    if !config.learning.enabled {
        println!("Aprendizado desabilitado.\n");
        return Ok(());
    }

    let interval: u64 = Input::with_theme(theme)
        .with_prompt("Intervalo entre análises (horas)")
        .default(config.learning.analysis_interval_hours)
        .interact_text()?;

    config.learning.analysis_interval_hours = interval;

    let batch_size: usize = Input::with_theme(theme)
        .with_prompt("Conversas por análise")
        .default(config.learning.batch_size)
        .interact_text()?;

    config.learning.batch_size = batch_size.max(1);

    let evictions = vec![
        "Descartar exemplos novos quando cheio",
        "Descartar exemplos antigos quando cheio",
    ];
    let current_idx = match config.learning.example_eviction {
        ExampleEviction::DropNewest => 0,
        ExampleEviction::DropOldest => 1,
    };

    let eviction_idx = Select::with_theme(theme)
        .with_prompt(format!(
            "Limite de {} exemplos por tópico",
            config.learning.max_examples
        ))
        .items(&evictions)
        .default(current_idx)
        .interact()?;

    config.learning.example_eviction = match eviction_idx {
        0 => ExampleEviction::DropNewest,
        _ => ExampleEviction::DropOldest,
    };

    println!("\n✓ Aprendizado configurado.\n");
    Ok(())
}

/// Configura o chat.
fn configure_chat(theme: &ColorfulTheme, config: &mut Config) -> HermesResult<()> {
    println!("\n💬 Configuração do Chat\n");

    let threshold: f64 = Input::with_theme(theme)
        .with_prompt("Confiança mínima para usar respostas aprendidas (0-1)")
        .default(config.chat.response_threshold)
        .interact_text()?;

    config.chat.response_threshold = threshold.clamp(0.0, 1.0);

    println!("\n✓ Chat configurado.\n");
    Ok(())
}

/// Mostra resumo da configuração.
pub fn show_config_summary(config: &Config) {
    println!("\n📊 Resumo da Configuração\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ Geral                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Armazenamento                           │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Backend: {:<30} │",
        format!("{:?}", config.storage.backend)
    );
    if config.storage.backend == StorageBackend::Sqlite {
        println!(
            "│ Banco: {:<32} │",
            config.storage.db_path.display().to_string()
        );
    }
    println!("├─────────────────────────────────────────┤");
    println!("│ Aprendizado                             │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Habilitado: {:<27} │",
        if config.learning.enabled { "Sim" } else { "Não" }
    );
    if config.learning.enabled {
        println!(
            "│ Análise: a cada {:<22} │",
            format!("{}h", config.learning.analysis_interval_hours)
        );
        println!("│ Lote: {:<33} │", config.learning.batch_size);
        println!(
            "│ Descarte: {:<29} │",
            format!("{:?}", config.learning.example_eviction)
        );
    }
    println!("├─────────────────────────────────────────┤");
    println!("│ Chat                                    │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Limiar de confiança: {:<18} │",
        format!("{:.2}", config.chat.response_threshold)
    );
    println!("└─────────────────────────────────────────┘");
    println!();
}
