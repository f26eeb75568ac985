//! Implementação dos comandos CLI do Hermes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chat::{ChatService, ReplySource};
use crate::learning::LearningPipeline;
use crate::store::{DocumentStore, MemoryStore};
use crate::types::config::{Config, StorageBackend};
use crate::HermesResult;

/// Abre o armazenamento configurado.
pub fn open_store(config: &Config) -> HermesResult<Arc<dyn DocumentStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => Ok(Arc::new(crate::store::SqliteStore::open(
            &config.storage.db_path,
        )?)),
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => Err(crate::HermesError::config(
            "backend sqlite indisponível: compile com a feature `sqlite`",
        )),
    }
}

/// Monta o pipeline de aprendizado a partir da configuração.
pub fn open_pipeline(config: &Config) -> HermesResult<Arc<LearningPipeline>> {
    let store = open_store(config)?;
    tracing::debug!(backend = store.name(), "Document store opened");
    Ok(Arc::new(LearningPipeline::with_config(
        store,
        config.learning.clone(),
    )))
}

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> HermesResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    // Create directory if it doesn't exist
    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("hermes.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'hermes config' to modify.");
        return Ok(());
    }

    // Create .hermes/ directory for the database
    let hermes_dir = target_dir.join(".hermes");
    if !hermes_dir.exists() {
        std::fs::create_dir_all(&hermes_dir)?;
        tracing::info!(".hermes/ directory created");
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Hermes initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Data directory: .hermes/");
    println!();
    println!("Next steps:");
    println!("  1. Talk to Hermes: hermes chat");
    println!("  2. Check what was learned: hermes knowledge");

    Ok(())
}

/// Updates or creates .gitignore to include .hermes/
fn update_gitignore(target_dir: &Path) -> HermesResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".hermes/";
    let comment = "# Hermes - local learning database";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content.lines().any(|line| line.trim() == entry || line.trim() == ".hermes") {
            tracing::debug!(".gitignore already contains .hermes/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .hermes/");
    } else {
        let content = format!("{}\n{}\n", comment, entry);
        std::fs::write(&gitignore_path, content)?;
        println!(".gitignore created with .hermes/");
    }

    Ok(())
}

/// Envia uma única mensagem.
pub async fn ask(message: &str, config: &Config) -> HermesResult<()> {
    let pipeline = open_pipeline(config)?;
    let chat = ChatService::with_static_fallback(pipeline, config.chat.clone());

    let reply = chat.send(message, serde_json::json!({ "channel": "cli" })).await;
    println!("{}", reply.text);
    match &reply.source {
        ReplySource::Knowledge { topic, confidence } => {
            println!("\n(aprendido: {}, confiança {:.0}%)", topic, confidence * 100.0)
        }
        ReplySource::Fallback { responder } => println!("\n(respondedor: {})", responder),
        ReplySource::Error => println!("\n(erro ao responder)"),
    }
    tracing::debug!(conversation = ?reply.conversation_id, "Reply sent");

    Ok(())
}

/// Abre o chat interativo.
pub async fn chat(config: &Config) -> HermesResult<()> {
    let pipeline = open_pipeline(config)?;
    let chat = ChatService::with_static_fallback(pipeline, config.chat.clone());
    super::interactive::run_chat(&chat).await
}

/// Roda a extração imediatamente.
pub async fn analyze(config: &Config) -> HermesResult<()> {
    let pipeline = open_pipeline(config)?;

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("Analisando conversas...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = pipeline.extractor().extract().await;
    spinner.finish_and_clear();

    let report = report?;
    if report.is_empty() {
        println!("Nenhuma conversa nova para analisar.");
        return Ok(());
    }

    println!("Análise concluída:");
    println!("  Conversas analisadas: {}", report.conversations_analyzed);
    println!("  Patterns extraídos: {}", report.patterns_extracted);
    println!("  Tópicos criados: {}", report.knowledge_created);
    println!("  Tópicos atualizados: {}", report.knowledge_updated);

    Ok(())
}

/// Lista a base de conhecimento.
pub async fn knowledge(limit: usize, config: &Config) -> HermesResult<()> {
    let pipeline = open_pipeline(config)?;
    let records = pipeline.knowledge().all().await?;

    if records.is_empty() {
        println!("A base de conhecimento ainda está vazia.");
        println!("Converse com 'hermes chat' e rode 'hermes analyze'.");
        return Ok(());
    }

    println!("Base de conhecimento - {} tópicos\n", records.len());

    for stored in &records {
        let k = &stored.record;
        println!(
            "{} - confiança {:.0}%, {} exemplos, {} respostas (atualizado {})",
            k.topic,
            k.confidence * 100.0,
            k.examples.len(),
            k.responses.len(),
            k.updated_at.format("%Y-%m-%d %H:%M")
        );
        for (i, response) in k.responses.iter().take(limit).enumerate() {
            println!("  {}. {}", i + 1, response);
        }
    }

    Ok(())
}

/// Mostra contagens do aprendizado.
pub async fn status(config: &Config) -> HermesResult<()> {
    let pipeline = open_pipeline(config)?;
    let status = pipeline.status().await?;

    println!("Status do aprendizado\n");
    println!(
        "  Aprendizado: {}",
        if status.enabled { "ativado" } else { "desativado" }
    );
    println!("  Armazenamento: {}", status.backend);
    println!("  Conversas: {} ({} pendentes)", status.conversations, status.unanalyzed);
    println!("  Patterns: {}", status.patterns);
    println!("  Tópicos conhecidos: {}", status.topics);

    Ok(())
}

/// Exporta a base de conhecimento.
pub async fn export_knowledge(output: &Path, config: &Config) -> HermesResult<()> {
    let pipeline = open_pipeline(config)?;
    let count = pipeline.knowledge().export(output).await?;

    println!("{} tópicos exportados para: {}", count, output.display());

    Ok(())
}

/// Importa uma base de conhecimento.
pub async fn import_knowledge(input: &Path, config: &Config) -> HermesResult<()> {
    if !input.exists() {
        println!("Arquivo não encontrado: {}", input.display());
        return Ok(());
    }

    let pipeline = open_pipeline(config)?;
    let result = pipeline.knowledge().import(input).await?;

    println!("Importação concluída:");
    println!("  Tópicos importados: {}", result.imported);
    println!("  Tópicos mesclados: {}", result.merged);
    println!("  Tópicos ignorados (sem novidade): {}", result.skipped);

    Ok(())
}

/// Configura opções interativamente.
pub async fn config_cmd(config_path: &Path) -> HermesResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Mostra versão.
pub fn version() {
    println!("hermes {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Pipeline de aprendizado do chat HermesVerse");
}
