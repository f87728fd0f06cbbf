// ============================================================================
// Module : tracker
// ============================================================================
// Cœur du suivi en continu :
// - signal   : drapeau d'annulation partagé (CancellationSignal)
// - refresh  : boucle de rafraîchissement (thread dédié)
// - listener : écoute de "quit" sur le thread principal
// - session  : lancement des deux côtés et join final
// ============================================================================

pub mod listener;
pub mod refresh;
pub mod session;
pub mod signal;

#[cfg(test)]
pub(crate) mod testing;

pub use listener::{CommandListener, StopReason};
pub use refresh::RefreshLoop;
pub use session::{spawn_refresh_thread, track, SessionSummary};
pub use signal::CancellationSignal;
