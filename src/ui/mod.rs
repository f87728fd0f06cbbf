// ============================================================================
// Module : ui
// ============================================================================
// Interaction console : affichage des prix, commandes, saisie
// ============================================================================

pub mod commands;  // Commandes littérales (help, quit, set)
pub mod presenter; // Rendu des cotations
pub mod prompt;    // Phase de sélection des actifs

// Re-exports pour simplifier les imports
pub use presenter::{ConsolePresenter, Presenter};
pub use prompt::{Prompt, Selection};
