// ============================================================================
// API Client : CoinCap
// ============================================================================
// Recherche un actif par nom/symbole et récupère son prix courant
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : les appels réseau ne bloquent pas le thread
// 2. thiserror : chaque type d'échec a sa propre variante (QuoteError)
// 3. Serde : désérialisation JSON automatique
// 4. Request-scoped : aucun état conservé entre deux appels
// ============================================================================

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::api::{QuoteError, QuoteSource};
use crate::models::{AssetId, Quote};

/// URL de base par défaut de l'API CoinCap
pub const DEFAULT_BASE_URL: &str = "https://api.coincap.io/v2";

/// Délai maximal d'une requête (borne la latence d'arrêt pendant un fetch)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Structures pour parser les réponses JSON de CoinCap
// ============================================================================
// CONCEPT RUST : #[serde(rename_all = "camelCase")]
// - "priceUsd" (JSON) -> price_usd (Rust)
// - Les champs inconnus sont ignorés par défaut
// ============================================================================

/// Réponse de GET /assets?search=...
#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
struct AssetEntry {
    id: String,
}

/// Réponse de GET /assets/{id}
#[derive(Debug, Deserialize)]
struct AssetResponse {
    data: Option<AssetDetail>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetDetail {
    price_usd: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP vers l'API CoinCap
///
/// CONCEPT : Pas d'état réseau conservé
/// - Un reqwest::Client est créé pour chaque requête
/// - Le client peut donc être cloné et utilisé depuis n'importe quel thread
///   ou runtime tokio (thread principal et thread de rafraîchissement)
#[derive(Debug, Clone)]
pub struct CoinCapClient {
    base_url: Url,
    timeout: Duration,
}

impl CoinCapClient {
    /// Crée un client vers `base_url` (ex: "https://api.coincap.io/v2")
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("URL de l'API invalide : {}", base_url))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("URL de l'API invalide : {}", base_url);
        }

        Ok(Self { base_url, timeout })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Construit une URL d'endpoint en ajoutant des segments de chemin
    ///
    /// Les segments sont encodés par Url (un id contenant "/" ne peut pas
    /// sortir du chemin /assets).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Ne peut pas échouer : cannot_be_a_base() est vérifié dans new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn http_client(&self) -> Result<reqwest::Client, QuoteError> {
        reqwest::Client::builder()
            .user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(QuoteError::Network)
    }

    /// Envoie un GET et retourne (status, corps)
    async fn get(&self, url: Url) -> Result<(StatusCode, String), QuoteError> {
        let client = self.http_client()?;

        debug!(url = %url, "Sending HTTP request");
        let response = client.get(url).send().await.map_err(QuoteError::Network)?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response.text().await.map_err(QuoteError::Network)?;
        Ok((status, body))
    }
}

#[async_trait]
impl QuoteSource for CoinCapClient {
    /// Recherche un actif et retourne l'identifiant du premier résultat
    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<AssetId, QuoteError> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(QuoteError::NotFound(query));
        }

        let mut url = self.endpoint(&["assets"]);
        url.query_pairs_mut().append_pair("search", &query);

        let (status, body) = self.get(url).await?;
        if !status.is_success() {
            warn!(status = %status, "Search request failed");
            return Err(QuoteError::Http(status.as_u16()));
        }

        let asset = parse_search_body(&body, &query)?;
        info!(asset = %asset, "Query resolved");
        Ok(asset)
    }

    /// Récupère le dernier prix connu d'un actif
    #[instrument(skip(self, asset), fields(asset = %asset))]
    async fn fetch(&self, asset: &AssetId) -> Result<Quote, QuoteError> {
        let url = self.endpoint(&["assets", asset.as_str()]);

        let (status, body) = self.get(url).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(QuoteError::UnknownAsset(asset.to_string()));
        }
        if !status.is_success() {
            warn!(status = %status, "Price request failed");
            return Err(QuoteError::Http(status.as_u16()));
        }

        let price = parse_asset_body(&body, asset)?;
        debug!(price = %price, "Price fetched");
        Ok(Quote::observed_now(asset.clone(), price))
    }
}

// ============================================================================
// Parsing des corps de réponse
// ============================================================================
// Séparé du transport pour être testé sans réseau
// ============================================================================

/// Extrait l'id du premier résultat de recherche
fn parse_search_body(body: &str, query: &str) -> Result<AssetId, QuoteError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| QuoteError::Malformed(e.to_string()))?;

    response
        .data
        .into_iter()
        .next()
        .map(|entry| AssetId::new(entry.id))
        .ok_or_else(|| QuoteError::NotFound(query.to_string()))
}

/// Extrait le prix en USD (chaîne décimale) d'une réponse /assets/{id}
fn parse_asset_body(body: &str, asset: &AssetId) -> Result<String, QuoteError> {
    let response: AssetResponse =
        serde_json::from_str(body).map_err(|e| QuoteError::Malformed(e.to_string()))?;

    let detail = match response.data {
        Some(detail) => detail,
        None => {
            if let Some(error) = response.error {
                debug!(error = %error, "Service reported an error for asset");
            }
            return Err(QuoteError::UnknownAsset(asset.to_string()));
        }
    };

    detail
        .price_usd
        .filter(|price| !price.trim().is_empty())
        .ok_or_else(|| QuoteError::Malformed(format!("pas de prix pour {}", asset)))
}

// ============================================================================
// Tests unitaires
// ============================================================================
