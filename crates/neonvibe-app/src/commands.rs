//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use neonvibe_ai::{AdapterConfig, GenerationSession, SessionRecord, TurnOutcome};
use neonvibe_common::{
    EventBus, NeonvibeError, ProviderKind, Role, SessionEvent, SessionId, StorageError,
};
use neonvibe_config::{AiConfig, NeonvibeConfig};
use neonvibe_project::export::{write_dir, write_zip_file};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use crate::store::SessionStore;

/// File the bundled preview is written to next to the project files.
pub const PREVIEW_FILE: &str = "preview.html";

/// Exit status of a cancelled turn, as for SIGINT.
const EXIT_CANCELLED: u8 = 130;

pub struct GenerateOptions {
    pub prompt: String,
    pub session: Option<String>,
    pub out: PathBuf,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
}

/// Adapter settings from the `[ai]` section plus command-line overrides.
///
/// Overriding the provider also drops the configured model and key, which
/// belong to the other provider; the key then comes from the overriding
/// provider's environment variable.
pub fn adapter_config(
    ai: &AiConfig,
    provider: Option<ProviderKind>,
    model: Option<String>,
) -> AdapterConfig {
    let mut ai = ai.clone();
    if let Some(provider) = provider.filter(|p| *p != ai.provider) {
        ai.provider = provider;
        ai.model.clear();
        ai.api_key.clear();
    }
    if let Some(model) = model {
        ai.model = model;
    }

    AdapterConfig::new(ai.provider, ai.resolve_api_key(), ai.effective_model())
        .with_endpoint(ai.endpoint())
        .with_timeouts(
            Duration::from_secs(u64::from(ai.http.connect_timeout_secs)),
            Duration::from_secs(u64::from(ai.http.request_timeout_secs)),
        )
}

pub async fn generate(
    config: &NeonvibeConfig,
    config_path: Option<&Path>,
    store: &SessionStore,
    opts: GenerateOptions,
) -> Result<ExitCode, NeonvibeError> {
    let adapter = adapter_config(&config.ai, opts.provider, opts.model);
    let mut session = match &opts.session {
        Some(id) => GenerationSession::from_record(store.get(&SessionId::from(id.as_str()))?),
        None => GenerationSession::new(),
    };
    info!(session = %session.id(), provider = %adapter.provider, model = adapter.effective_model(), "Starting generation");

    let bus = EventBus::default();
    let printer = tokio::spawn(print_transcript(bus.subscribe()));

    let cancel = session.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling generation");
            cancel.cancel();
        }
    });

    let outcome = session
        .generate(&adapter, &opts.prompt, &bus)
        .await
        .map_err(|e| NeonvibeError::Other(e.to_string()))?;
    interrupt.abort();
    drop(bus);
    if let Err(e) = printer.await {
        debug!("Transcript printer ended abnormally: {e}");
    }

    store.upsert(session.to_record())?;
    let written = write_project(&session, &opts.out)?;

    println!();
    println!(
        "Session {} ({}): {} file(s) written to {}",
        session.id(),
        outcome.state().as_str(),
        written,
        opts.out.display()
    );

    Ok(match &outcome {
        TurnOutcome::Complete => ExitCode::SUCCESS,
        TurnOutcome::Cancelled => ExitCode::from(EXIT_CANCELLED),
        TurnOutcome::Errored(error) => {
            if error.needs_configuration() {
                eprintln!("{}", configuration_hint(adapter.provider, config_path));
            }
            ExitCode::FAILURE
        }
    })
}

/// Stream model text to stdout as it arrives.
async fn print_transcript(mut rx: tokio::sync::broadcast::Receiver<SessionEvent>) {
    let mut stdout = tokio::io::stdout();
    let mut printed = 0usize;
    loop {
        match rx.recv().await {
            Ok(SessionEvent::TranscriptUpdated { content, .. }) => {
                if let Some(delta) = content.get(printed..) {
                    let _ = stdout.write_all(delta.as_bytes()).await;
                    let _ = stdout.flush().await;
                }
                printed = content.len();
            }
            Ok(SessionEvent::PreviewUpdated { files, preview, .. }) => {
                debug!(files = files.len(), preview_bytes = preview.len(), "Preview updated");
            }
            Ok(SessionEvent::TurnFinished { message, .. }) => {
                if let Some(message) = message {
                    let _ = stdout.write_all(format!("\n\nError: {message}\n").as_bytes()).await;
                }
                break;
            }
            Ok(SessionEvent::TurnStarted { .. }) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Transcript printer lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Write the project files and the bundled preview under `out`.
///
/// Returns the number of project files written.
pub fn write_project(session: &GenerationSession, out: &Path) -> Result<usize, StorageError> {
    let written = write_dir(session.files(), out)?;
    if !session.preview().is_empty() {
        let path = out.join(PREVIEW_FILE);
        std::fs::write(&path, session.preview())
            .map_err(|source| StorageError::Io { path, source })?;
    }
    Ok(written.len())
}

fn configuration_hint(provider: ProviderKind, config_path: Option<&Path>) -> String {
    let location = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "the neonvibe config file".to_string());
    format!(
        "No API key for {provider}. Set `api_key` under [ai] in {location} or export {}.",
        provider.api_key_env()
    )
}

pub fn list_sessions(store: &SessionStore) -> Result<(), NeonvibeError> {
    let records = store.list()?;
    if records.is_empty() {
        println!("No saved sessions.");
        return Ok(());
    }
    for record in &records {
        println!("{}", session_line(record));
    }
    Ok(())
}

fn session_line(record: &SessionRecord) -> String {
    let modified = chrono::DateTime::from_timestamp_millis(record.last_modified)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {}  {:>3} file(s)  {}",
        record.id,
        modified,
        record.files.len(),
        record.title
    )
}

pub fn show_session(store: &SessionStore, id: &str) -> Result<(), NeonvibeError> {
    let record = store.get(&SessionId::from(id))?;
    println!("{}", record.title);
    println!();
    for message in &record.messages {
        let who = match message.role {
            Role::User => "you",
            Role::Model => "model",
        };
        println!("[{who}]\n{}\n", message.content);
    }
    println!("Files:");
    for (name, content) in &record.files {
        println!("  {name} ({} bytes)", content.len());
    }
    Ok(())
}

pub fn delete_session(store: &SessionStore, id: &str) -> Result<(), NeonvibeError> {
    store.delete(&SessionId::from(id))?;
    println!("Deleted session {id}");
    Ok(())
}

pub fn export_session(
    store: &SessionStore,
    id: &str,
    zip: Option<PathBuf>,
) -> Result<(), NeonvibeError> {
    let record = store.get(&SessionId::from(id))?;
    let path = zip.unwrap_or_else(|| PathBuf::from(format!("{id}.zip")));
    write_zip_file(&record.files, &path)?;
    println!("Exported {} file(s) to {}", record.files.len(), path.display());
    Ok(())
}

/// `[ai]` fields to change before printing the configuration.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl ConfigUpdate {
    fn is_empty(&self) -> bool {
        self.provider.is_none() && self.model.is_none() && self.api_key.is_none()
    }

    /// Apply to `config`, rejecting a result that fails validation.
    pub fn apply(self, config: &mut NeonvibeConfig) -> Result<(), NeonvibeError> {
        if let Some(provider) = self.provider {
            config.ai.provider = provider;
        }
        if let Some(model) = self.model {
            config.ai.model = model.trim().to_string();
        }
        if let Some(key) = self.api_key {
            config.ai.api_key = key.trim().to_string();
        }
        neonvibe_config::validation::validate(config)?;
        Ok(())
    }
}

pub fn config(
    mut config: NeonvibeConfig,
    config_path: Option<&Path>,
    store: &SessionStore,
    update: ConfigUpdate,
) -> Result<(), NeonvibeError> {
    if !update.is_empty() {
        update.apply(&mut config)?;
        match config_path {
            Some(path) => neonvibe_config::save_config_to_path(&config, path)?,
            None => neonvibe_config::save_config(&config)?,
        }
        info!(provider = %config.ai.provider, "Configuration saved");
    }
    println!("{}", neonvibe_config::config_to_json(&config));
    println!("history: {}", store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neonvibe_common::{FileMap, Message};
    use tempfile::TempDir;

    #[test]
    fn adapter_config_uses_configured_provider_and_key() {
        let mut ai = AiConfig::default();
        ai.provider = ProviderKind::OpenRouter;
        ai.api_key = "sk-or".into();
        ai.http.request_timeout_secs = 42;

        let adapter = adapter_config(&ai, None, None);
        assert_eq!(adapter.provider, ProviderKind::OpenRouter);
        assert_eq!(adapter.api_key.as_deref(), Some("sk-or"));
        assert_eq!(adapter.effective_model(), "anthropic/claude-3.5-sonnet");
        assert_eq!(
            adapter.endpoint.as_deref(),
            Some("https://openrouter.ai/api/v1/chat/completions")
        );
        assert_eq!(adapter.request_timeout, Duration::from_secs(42));
    }

    #[test]
    fn model_override_wins() {
        let adapter = adapter_config(&AiConfig::default(), None, Some("gemini-2.5-pro".into()));
        assert_eq!(adapter.effective_model(), "gemini-2.5-pro");
    }

    #[test]
    fn provider_override_drops_other_providers_model_and_key() {
        let mut ai = AiConfig::default();
        ai.model = "gemini-2.5-pro".into();
        ai.api_key = "AIza-gemini".into();

        let adapter = adapter_config(&ai, Some(ProviderKind::OpenRouter), None);
        assert_eq!(adapter.provider, ProviderKind::OpenRouter);
        assert_eq!(adapter.effective_model(), "anthropic/claude-3.5-sonnet");
        assert_ne!(adapter.api_key.as_deref(), Some("AIza-gemini"));
    }

    #[test]
    fn hint_names_the_environment_variable() {
        let hint = configuration_hint(ProviderKind::Gemini, Some(Path::new("/x/config.toml")));
        assert!(hint.contains("GEMINI_API_KEY"));
        assert!(hint.contains("/x/config.toml"));
    }

    #[test]
    fn write_project_writes_files_and_preview() {
        let dir = TempDir::new().unwrap();
        let mut session = GenerationSession::new();
        session.begin_turn("x").unwrap();
        session.apply_fragment(
            "<file name=\"index.html\"><link rel=\"stylesheet\" href=\"css/app.css\"></file>\
             <file name=\"css/app.css\">p{}</file>",
        );
        session.finish_complete();

        let written = write_project(&session, dir.path()).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("css/app.css")).unwrap(),
            "p{}"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(PREVIEW_FILE)).unwrap(),
            "<style>\np{}\n</style>"
        );
    }

    #[test]
    fn config_update_applies_and_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let store = SessionStore::new(dir.path().join("history.json"), 10);
        let update = ConfigUpdate {
            provider: Some(ProviderKind::OpenRouter),
            model: Some(" openai/gpt-4o ".into()),
            api_key: Some("sk-or".into()),
        };

        config(NeonvibeConfig::default(), Some(path.as_path()), &store, update).unwrap();

        let saved = neonvibe_config::load_config_from(Some(path.as_path())).unwrap();
        assert_eq!(saved.ai.provider, ProviderKind::OpenRouter);
        assert_eq!(saved.ai.model, "openai/gpt-4o");
        assert_eq!(saved.ai.api_key, "sk-or");
    }

    #[test]
    fn empty_update_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let store = SessionStore::new(dir.path().join("history.json"), 10);

        config(NeonvibeConfig::default(), Some(path.as_path()), &store, ConfigUpdate::default()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn session_line_shows_title_and_file_count() {
        let record = SessionRecord {
            id: SessionId::from("abc"),
            title: "todo app".into(),
            messages: vec![Message::user("todo app")],
            files: FileMap::from([("index.html".to_string(), String::new())]),
            preview: String::new(),
            last_modified: 0,
        };
        let line = session_line(&record);
        assert!(line.starts_with("abc  "));
        assert!(line.contains("  1 file(s)"));
        assert!(line.ends_with("todo app"));
    }
}
