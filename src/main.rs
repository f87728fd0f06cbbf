// ============================================================================
// PriceWatch - Suivi de prix en continu
// ============================================================================
// Programme console : recherche une ou plusieurs cryptomonnaies, puis
// affiche leur prix à intervalle régulier jusqu'à "quit"
//
// CONCEPTS RUST CLÉS :
// 1. Async dans sync : tokio::runtime::Runtime pour la phase de recherche
// 2. Deux threads pendant le suivi : rafraîchissement + écoute de "quit"
// 3. Logs vers fichier : stdout est réservé à l'utilisateur
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use pricewatch::api::coincap::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use pricewatch::api::CoinCapClient;
use pricewatch::preferences::{default_config_path, PreferenceStore, RefreshInterval};
use pricewatch::tracker;
use pricewatch::ui::commands::{FAREWELL, TRACKING_HINT};
use pricewatch::ui::{ConsolePresenter, Prompt, Selection};

// ============================================================================
// Arguments de ligne de commande
// ============================================================================

/// Suivi en continu du prix de cryptomonnaies
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Fichier de configuration INI (sinon $PRICEWATCH_CONFIG ou le répertoire de config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Nouvelle fréquence de mise à jour en secondes, enregistrée avant le suivi
    #[arg(long)]
    interval: Option<RefreshInterval>,

    /// Actifs à suivre (nom ou symbole) ; sans argument, la saisie est demandée
    assets: Vec<String>,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app console interactive
// - stdout affiche les prix et les questions
// - Les logs vont dans un fichier à rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans ./logs/pricewatch.log.<date>
///
/// # Utilisation
/// ```bash
/// tail -f logs/pricewatch.log.*
/// RUST_LOG=pricewatch=trace cargo run -- bitcoin
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = PathBuf::from("./logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "pricewatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true) // "refresh" vs "main"
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour pricewatch, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricewatch=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    let args = Args::parse();

    println!("Suivi de prix de cryptomonnaies");
    info!("PriceWatch starting up");

    // Préférences : jamais fatal, valeurs par défaut si besoin
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let preferences = Arc::new(PreferenceStore::open(config_path));

    if let Some(interval) = args.interval {
        match preferences.set(interval) {
            Ok(()) => println!("Fréquence enregistrée : {}", interval),
            Err(e) => {
                warn!(error = ?e, "Failed to save --interval");
                eprintln!("Impossible d'enregistrer la fréquence : {:#}", e);
            }
        }
    }

    let base_url = preferences
        .api_base_url()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout = preferences.api_timeout().unwrap_or(DEFAULT_TIMEOUT);
    let client = CoinCapClient::new(&base_url, timeout)?;
    info!(base_url = %client.base_url(), ?timeout, "Quote client ready");

    // ========================================
    // 1. SÉLECTION : recherche des actifs
    // ========================================
    // CONCEPT RUST : Exécuter du code async dans du code sync
    // - block_on() attend la fin de la phase de recherche
    let initial = (!args.assets.is_empty()).then(|| args.assets.join(","));
    let mut prompt = Prompt::new(io::stdin().lock(), io::stdout());

    let runtime = tokio::runtime::Runtime::new()?;
    let selection = runtime.block_on(prompt.select_assets(&client, &preferences, initial));
    drop(runtime);

    let tracked = match selection {
        Selection::Track(tracked) => tracked,
        Selection::Exit => {
            info!("Exiting without tracking");
            return Ok(());
        }
    };

    // ========================================
    // 2. SUIVI : jusqu'à "quit"
    // ========================================
    println!("Suivi de : {} (toutes les {})", tracked.joined(), preferences.get());
    println!("{}", TRACKING_HINT);

    let (input, output) = prompt.into_parts();
    let result = tracker::track(
        tracked,
        client,
        ConsolePresenter::stdout(),
        preferences,
        input,
        output,
    );

    match &result {
        Ok(summary) => {
            info!(cycles = summary.cycles, reason = ?summary.stop_reason, "Application exited normally");
            println!("{}", FAREWELL);
        }
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result.map(|_| ())
}
