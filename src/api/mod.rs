// ============================================================================
// Module : api
// ============================================================================
// Clients du service de cotation distant et trait commun QuoteSource
//
// CONCEPT RUST : Trait comme frontière
// - La boucle de rafraîchissement ne connaît que QuoteSource
// - Le binaire branche CoinCapClient, les tests branchent des faux clients
// ============================================================================

pub mod coincap; // Client API CoinCap

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AssetId, Quote};

// Re-export des éléments principaux
pub use coincap::CoinCapClient;

/// Erreurs du client de cotation
///
/// CONCEPT RUST : thiserror
/// - #[derive(Error)] implémente std::error::Error
/// - #[error("...")] génère Display
/// - Une variante par cause, pour que l'appelant puisse distinguer
///   une panne réseau d'un identifiant inconnu
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Échec de transport : connexion refusée, DNS, timeout...
    #[error("erreur réseau : {0}")]
    Network(#[source] reqwest::Error),

    /// Le service ne connaît pas cet identifiant
    #[error("actif inconnu : {0}")]
    UnknownAsset(String),

    /// La recherche n'a retourné aucun résultat
    #[error("aucun résultat pour '{0}'")]
    NotFound(String),

    /// Réponse HTTP hors 2xx (autre que 404)
    #[error("le service a retourné HTTP {0}")]
    Http(u16),

    /// Corps de réponse illisible ou incomplet
    #[error("réponse invalide : {0}")]
    Malformed(String),
}

/// Source de cotations : recherche et récupération de prix
///
/// Les deux opérations sont sans état et peuvent être appelées en parallèle.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Résout une recherche libre ("btc", "Bitcoin") en identifiant canonique
    async fn resolve(&self, query: &str) -> Result<AssetId, QuoteError>;

    /// Récupère le prix courant d'un actif
    async fn fetch(&self, asset: &AssetId) -> Result<Quote, QuoteError>;
}

/// Permet de partager une source entre le thread principal et la boucle
#[async_trait]
impl<T: QuoteSource + ?Sized> QuoteSource for Arc<T> {
    async fn resolve(&self, query: &str) -> Result<AssetId, QuoteError> {
        (**self).resolve(query).await
    }

    async fn fetch(&self, asset: &AssetId) -> Result<Quote, QuoteError> {
        (**self).fetch(asset).await
    }
}
