// ============================================================================
// Session de suivi
// ============================================================================
// Assemble les deux côtés d'une session :
// - thread "refresh" : RefreshLoop dans son propre runtime tokio
// - thread principal : CommandListener bloqué sur l'entrée
// puis attend (join) la fin de la boucle avant de rendre la main.
//
// CONCEPT RUST : Thread + runtime async
// - std::thread::Builder : thread OS nommé
// - Runtime current_thread : la boucle async tourne sur CE thread
// - JoinHandle::join() : pas de thread orphelin ni de sortie tronquée
// ============================================================================

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use tracing::{error, info};

use crate::api::QuoteSource;
use crate::models::TrackedSet;
use crate::preferences::PreferenceStore;
use crate::tracker::{CancellationSignal, CommandListener, RefreshLoop, StopReason};
use crate::ui::Presenter;

/// Résumé d'une session terminée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub cycles: u64,
    pub stop_reason: StopReason,
}

/// Déclenche le signal quand il est détruit
///
/// CONCEPT RUST : RAII
/// - Si le thread principal panique pendant l'écoute, le Drop s'exécute
///   quand même et la boucle de rafraîchissement s'arrête
struct CancelOnDrop(CancellationSignal);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.set();
    }
}

/// Lance la boucle de rafraîchissement sur un thread dédié
///
/// Le runtime est construit ici (sur le thread appelant) pour que
/// l'erreur remonte avec ?, puis déplacé dans le thread.
pub fn spawn_refresh_thread<Q, P>(refresh: RefreshLoop<Q, P>) -> Result<thread::JoinHandle<u64>>
where
    Q: QuoteSource + 'static,
    P: Presenter + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Échec de la création du runtime tokio")?;

    thread::Builder::new()
        .name("refresh".to_string())
        .spawn(move || runtime.block_on(refresh.run()))
        .context("Échec du lancement du thread de rafraîchissement")
}

/// Exécute une session complète, jusqu'à l'annulation
///
/// `input`/`output` : lignes de commande pendant le suivi (stdin/stdout
/// dans le binaire).
pub fn track<Q, P, R, W>(
    tracked: TrackedSet,
    source: Q,
    presenter: P,
    preferences: Arc<PreferenceStore>,
    input: R,
    output: W,
) -> Result<SessionSummary>
where
    Q: QuoteSource + 'static,
    P: Presenter + Send + 'static,
    R: BufRead,
    W: Write,
{
    let signal = CancellationSignal::new();
    let guard = CancelOnDrop(signal.clone());

    info!(assets = %tracked.joined(), interval = %preferences.get(), "Starting tracking session");
    let refresh = RefreshLoop::new(tracked, source, presenter, preferences, signal.clone());
    let handle = spawn_refresh_thread(refresh)?;

    let stop_reason = CommandListener::new(input, output, signal).run();
    drop(guard);

    let cycles = handle.join().map_err(|_| {
        error!("Refresh thread panicked");
        anyhow!("Le thread de rafraîchissement a paniqué")
    })?;

    info!(cycles, ?stop_reason, "Tracking session finished");
    Ok(SessionSummary {
        cycles,
        stop_reason,
    })
}
