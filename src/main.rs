//! Spec Mentor - terminal front end
//!
//! Reads user messages from stdin and prints the mentor's replies together
//! with the current confidence scores.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spec_mentor::models::setup::{Language, Theme, Tool, SETUP_STATE_KEY};
use spec_mentor::services::onboarding::register_api_key;
use spec_mentor::services::prompt::WELCOME_MESSAGE;
use spec_mentor::storage::API_KEY_STORE_KEY;
use spec_mentor::{
    AppConfig, ConfigService, LocalStore, ReplySource, SessionState, SettingsUpdate, SetupState,
    SpecMentor, TurnOutcome,
};
use spec_mentor_core::{CategoryStatus, ConfidenceCategory, ConfidenceMetrics};
use spec_mentor_llm::{AnthropicProvider, LlmProvider};

#[derive(Parser)]
#[command(name = "spec-mentor", about = "Conversational software specification mentor", version)]
struct Cli {
    /// Config file (defaults to ~/.spec-mentor/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Anthropic API key; overrides the stored key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Passphrase protecting sensitive entries in the local store
    #[arg(long, env = "SPEC_MENTOR_STORE_PASSPHRASE", hide_env_values = true)]
    store_passphrase: Option<String>,

    /// Verify and store an API key, then exit
    #[arg(long, value_name = "KEY")]
    set_api_key: Option<String>,

    /// Verify the configured API key, then exit
    #[arg(long)]
    verify: bool,

    /// Remove everything this application keeps in the local store, then exit
    #[arg(long)]
    clear_store: bool,

    /// Restore the default configuration, then exit
    #[arg(long)]
    reset_config: bool,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Record a developer tool as installed (repeatable), then exit
    #[arg(long, value_enum, value_name = "TOOL")]
    tool_installed: Vec<Tool>,

    /// Record a developer tool as not installed (repeatable), then exit
    #[arg(long, value_enum, value_name = "TOOL")]
    tool_missing: Vec<Tool>,

    /// Save the preferred language, then exit
    #[arg(long, value_enum)]
    language: Option<Language>,

    /// Save the preferred theme, then exit
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "spec_mentor=info")]
    log_level: String,
}

/// Changes written to the config file; any of them saves and exits
#[derive(Args)]
struct SettingsArgs {
    /// Claude model for replies and extraction
    #[arg(long, value_name = "MODEL")]
    set_model: Option<String>,

    /// Messages API endpoint; an empty value restores the default
    #[arg(long, value_name = "URL")]
    set_base_url: Option<String>,

    #[arg(long, value_name = "TEMPERATURE")]
    set_reply_temperature: Option<f32>,

    #[arg(long, value_name = "TOKENS")]
    set_reply_max_tokens: Option<u32>,

    #[arg(long, value_name = "TEMPERATURE")]
    set_extraction_temperature: Option<f32>,

    #[arg(long, value_name = "TOKENS")]
    set_extraction_max_tokens: Option<u32>,

    /// Number of recent turns sent for extraction
    #[arg(long, value_name = "TURNS")]
    set_extraction_window: Option<usize>,

    /// Local store file
    #[arg(long, value_name = "PATH")]
    set_store_path: Option<PathBuf>,

    /// Debug logging for this application
    #[arg(long, value_name = "BOOL")]
    set_debug: Option<bool>,
}

impl SettingsArgs {
    fn into_update(self) -> SettingsUpdate {
        SettingsUpdate {
            model: self.set_model,
            base_url: self.set_base_url,
            reply_temperature: self.set_reply_temperature,
            reply_max_tokens: self.set_reply_max_tokens,
            extraction_temperature: self.set_extraction_temperature,
            extraction_max_tokens: self.set_extraction_max_tokens,
            extraction_window: self.set_extraction_window,
            store_path: self.set_store_path,
            debug_mode: self.set_debug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config_service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("failed to load configuration")?;
    let config = config_service.get_config().clone();

    let default_directive = if config.debug_mode {
        "spec_mentor=debug"
    } else {
        cli.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.reset_config {
        config_service
            .reset()
            .context("failed to reset configuration")?;
        println!(
            "Configuration reset to defaults in {}.",
            config_service.path().display()
        );
        return Ok(());
    }

    let update = cli.settings.into_update();
    if !update.is_empty() {
        config_service
            .update_config(update)
            .context("failed to update configuration")?;
        println!("Configuration saved to {}.", config_service.path().display());
        return Ok(());
    }

    let store = match &config.store_path {
        Some(path) => LocalStore::open(path, cli.store_passphrase.clone()),
        None => LocalStore::open_default(cli.store_passphrase.clone())?,
    };
    if !store.is_available() {
        warn!(path = %store.path().display(), "Local store is not writable");
    }

    if cli.clear_store {
        store.clear_all()?;
        println!("Local store cleared.");
        return Ok(());
    }

    let mut setup: SetupState = store.load_or_default(SETUP_STATE_KEY);

    let onboarding_update = !cli.tool_installed.is_empty()
        || !cli.tool_missing.is_empty()
        || cli.language.is_some()
        || cli.theme.is_some();
    if onboarding_update {
        for tool in &cli.tool_installed {
            setup.set_tool_installed(*tool, true);
        }
        for tool in &cli.tool_missing {
            setup.set_tool_installed(*tool, false);
        }
        if let Some(language) = cli.language {
            setup.preferences.language = language;
        }
        if let Some(theme) = cli.theme {
            setup.preferences.theme = theme;
        }
        store.save(SETUP_STATE_KEY, &setup)?;
        print_setup(&setup);
        return Ok(());
    }

    if let Some(key) = cli.set_api_key {
        let verifier = SpecMentor::new(build_provider(&config, Some(key.clone()))?);
        let valid = register_api_key(&store, &mut setup, &verifier, &key)
            .await
            .context("failed to register the API key")?;
        if !valid {
            anyhow::bail!("the API key was rejected; it has not been stored");
        }
        println!("API key verified and stored.");
        print_setup(&setup);
        return Ok(());
    }

    let api_key = cli.api_key.or_else(|| {
        store
            .load::<String>(API_KEY_STORE_KEY)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Could not read stored API key");
                None
            })
    });
    let provider = build_provider(&config, api_key)?;
    let mentor = SpecMentor::from_config(&config, provider);

    if cli.verify {
        let valid = mentor.verify_credentials().await;
        setup.record_validation(valid, Utc::now());
        store.save(SETUP_STATE_KEY, &setup)?;
        println!("API key {}", if valid { "is valid." } else { "is not valid." });
        print_setup(&setup);
        return Ok(());
    }

    setup.mark_welcome_seen();
    if let Err(e) = store.save(SETUP_STATE_KEY, &setup) {
        warn!(error = %e, "Could not save setup state");
    }
    if !setup.is_ready() {
        warn!(pending = ?setup.pending_steps(), "Starting before setup is complete");
        println!("Setup is not complete; run with --set-api-key or --verify to finish.");
        print_setup(&setup);
        println!();
    }

    run_repl(&mentor).await
}

fn print_setup(setup: &SetupState) {
    let pending = setup.pending_steps();
    if pending.is_empty() {
        println!("Setup complete.");
    } else {
        println!("Pending setup steps: {}", pending.join(", "));
    }
}

fn build_provider(
    config: &AppConfig,
    api_key: Option<String>,
) -> Result<Option<Arc<dyn LlmProvider>>> {
    let provider_config = config.provider_config(api_key);
    if !provider_config.has_api_key() {
        return Ok(None);
    }
    let provider = AnthropicProvider::new(provider_config)?;
    Ok(Some(Arc::new(provider)))
}

async fn run_repl(mentor: &SpecMentor) -> Result<()> {
    let mut session = SessionState::new();
    info!(provider = mentor.has_provider(), "Session started");

    println!("{}\n", WELCOME_MESSAGE);
    println!("(type /status for confidence scores, /quit to exit)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/status" => {
                print_confidence(&session.confidence);
                continue;
            }
            _ => {}
        }

        let outcome = mentor.send(&mut session, line).await?;
        print_turn(&outcome);
    }

    Ok(())
}

fn print_turn(outcome: &TurnOutcome) {
    println!("\n{}\n", outcome.reply);
    if let ReplySource::Fallback(error) = &outcome.reply_source {
        println!("[reply unavailable: {}]", error);
    }
    println!(
        "Overall confidence: {}%{}",
        outcome.overall,
        if outcome.can_generate_spec {
            " - ready to generate a specification"
        } else {
            ""
        }
    );
    println!();
}

fn print_confidence(metrics: &ConfidenceMetrics) {
    for category in ConfidenceCategory::ALL {
        let value = metrics.get(category);
        println!(
            "{:<24} {:>3}%  {:<12} {}",
            category.label(),
            value,
            CategoryStatus::from_score(value).label(),
            category.description()
        );
    }
    println!("{:<24} {:>3}%", "Overall", metrics.overall());
}
