// ============================================================================
// CancellationSignal
// ============================================================================
// Drapeau d'arrêt partagé entre la boucle de rafraîchissement et l'écoute
// des commandes. Passé explicitement aux deux côtés (pas de global).
//
// CONCEPTS RUST :
// 1. CancellationToken (tokio-util) : cancel() depuis n'importe quel
//    thread, cancelled().await se réveille immédiatement, sans réveil perdu.
// 2. AtomicBool + compare_exchange : désigne l'unique appel à set() qui a
//    effectué la transition (le token ne le dit pas).
// 3. Arc : clone bon marché, tous les clones partagent le même état.
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Signal d'annulation à usage unique (non réinitialisable)
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
    transitioned: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Déclenche l'annulation depuis n'importe quel thread
    ///
    /// Idempotent : retourne true uniquement pour l'appel qui a effectué
    /// la transition "non déclenché" -> "déclenché".
    pub fn set(&self) -> bool {
        let won = self
            .transitioned
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        self.token.cancel();
        won
    }

    /// Lecture non bloquante
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Se termine dès que le signal est déclenché (immédiatement s'il l'est déjà)
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
