// ============================================================================
// RefreshLoop : boucle de rafraîchissement des prix
// ============================================================================
// Tourne sur son propre thread. À chaque cycle :
//   1. vérifie le signal d'annulation
//   2. récupère le prix de chaque actif suivi (un échec n'arrête pas le cycle)
//   3. affiche les cotations obtenues
//   4. relit l'intervalle dans les préférences
//   5. attend max(0, intervalle - durée du cycle), ou l'annulation
//
// CONCEPTS RUST :
// 1. Générique sur QuoteSource et Presenter : testable avec des faux
// 2. tokio::select! : l'attente se termine sur le premier des deux
//    événements (timer ou annulation), pas de sleep suivi d'un test
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::QuoteSource;
use crate::models::TrackedSet;
use crate::preferences::PreferenceStore;
use crate::tracker::CancellationSignal;
use crate::ui::Presenter;

/// Résultat d'un cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    /// Cotations affichées
    Rendered,
    /// Annulation observée en cours de cycle : rien n'est affiché
    Cancelled,
}

pub struct RefreshLoop<Q, P> {
    tracked: TrackedSet,
    source: Q,
    presenter: P,
    preferences: Arc<PreferenceStore>,
    signal: CancellationSignal,
}

impl<Q: QuoteSource, P: Presenter> RefreshLoop<Q, P> {
    pub fn new(
        tracked: TrackedSet,
        source: Q,
        presenter: P,
        preferences: Arc<PreferenceStore>,
        signal: CancellationSignal,
    ) -> Self {
        Self {
            tracked,
            source,
            presenter,
            preferences,
            signal,
        }
    }

    /// Exécute les cycles jusqu'à l'annulation
    ///
    /// Seule condition de sortie : le signal d'annulation. Les erreurs de
    /// récupération sont par actif et jamais fatales.
    /// Retourne le nombre de cycles affichés.
    pub async fn run(mut self) -> u64 {
        info!(assets = %self.tracked.joined(), "Refresh loop started");
        let mut cycles = 0u64;

        while !self.signal.is_set() {
            let started = Instant::now();

            if self.run_cycle().await == CycleOutcome::Cancelled {
                break;
            }
            cycles += 1;

            // Relu à chaque cycle : un set() récent est pris en compte ici
            let interval = self.preferences.get();
            let remaining = interval.as_duration().saturating_sub(started.elapsed());
            debug!(cycle = cycles, %interval, remaining_ms = remaining.as_millis() as u64, "Cycle done, waiting");

            if !self.wait(remaining).await {
                break;
            }
        }

        info!(cycles, "Refresh loop stopped");
        cycles
    }

    async fn run_cycle(&mut self) -> CycleOutcome {
        let mut quotes = Vec::with_capacity(self.tracked.len());

        for asset in self.tracked.iter() {
            // Entre deux actifs : pas de nouveau fetch après une annulation
            if self.signal.is_set() {
                return CycleOutcome::Cancelled;
            }

            match self.source.fetch(asset).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    // Pas de nouvel essai dans ce cycle : prochain cycle
                    warn!(asset = %asset, error = %e, "Fetch failed, no data for this cycle");
                    if self.signal.is_set() {
                        return CycleOutcome::Cancelled;
                    }
                    self.presenter.report_failure(asset, &e);
                }
            }
        }

        // Aucune cotation ne doit être affichée après l'annulation
        if self.signal.is_set() {
            return CycleOutcome::Cancelled;
        }

        debug!(quotes = quotes.len(), "Rendering quotes");
        self.presenter.render(&quotes);
        CycleOutcome::Rendered
    }

    /// Attente interruptible
    ///
    /// Retourne true si le délai s'est écoulé, false si l'annulation
    /// a interrompu l'attente.
    async fn wait(&self, remaining: Duration) -> bool {
        // CONCEPT RUST : tokio::select!
        // - biased : l'annulation est testée en premier, même pour un délai nul
        // - la branche perdante est abandonnée (drop du sleep)
        tokio::select! {
            biased;
            _ = self.signal.cancelled() => false,
            _ = tokio::time::sleep(remaining) => true,
        }
    }
}
