// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données du suivi de prix
// ============================================================================

pub mod quote;       // AssetId et Quote
pub mod tracked_set; // Ensemble des actifs suivis pendant une session

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use pricewatch::models::quote::Quote;
// On peut faire : use pricewatch::models::Quote;
pub use quote::{AssetId, Quote};
pub use tracked_set::TrackedSet;
