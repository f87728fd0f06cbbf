// ============================================================================
// PriceWatch - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;         // Client du service de cotation
pub mod models;      // Structures de données
pub mod preferences; // Préférences persistées (fréquence de mise à jour)
pub mod tracker;     // Boucle de rafraîchissement, annulation, session
pub mod ui;          // Affichage et saisie utilisateur
