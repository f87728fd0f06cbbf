// ============================================================================
// Structures : AssetId et Quote
// ============================================================================
// Représente un actif suivi et une cotation observée à un instant donné
//
// CONCEPTS RUST :
// 1. Newtype pattern : AssetId enveloppe une String pour ne pas la confondre
//    avec une requête de recherche brute
// 2. Immutabilité : une Quote n'a pas de méthode &mut self, elle est
//    remplacée (jamais modifiée) au cycle suivant
// ============================================================================

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Identifiant canonique d'un actif dans l'espace de noms du service distant
/// (ex: "bitcoin", "ethereum")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nom affichable : première lettre en majuscule ("bitcoin" -> "Bitcoin")
    ///
    /// CONCEPT RUST : chars() et Unicode
    /// - On ne peut pas indexer une String par octet en toute sécurité
    /// - chars() itère sur les caractères Unicode
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cotation d'un actif à un instant donné
///
/// Le prix reste une chaîne décimale telle que renvoyée par l'API :
/// pas de conversion en f64, donc pas d'arrondi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub asset: AssetId,
    pub price: String,
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(asset: AssetId, price: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            asset,
            price: price.into(),
            observed_at,
        }
    }

    /// Crée une cotation horodatée maintenant
    pub fn observed_now(asset: AssetId, price: impl Into<String>) -> Self {
        Self::new(asset, price, Utc::now())
    }

    /// Horodatage en heure locale, format "2024-01-15 14:03:27"
    pub fn local_time_label(&self) -> String {
        self.observed_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_capitalizes() {
        assert_eq!(AssetId::new("bitcoin").display_name(), "Bitcoin");
        assert_eq!(AssetId::new("usd-coin").display_name(), "Usd-coin");
        assert_eq!(AssetId::new("").display_name(), "");
    }

    #[test]
    fn test_quote_keeps_price_string() {
        let quote = Quote::observed_now(AssetId::new("bitcoin"), "50000.123456789");
        assert_eq!(quote.price, "50000.123456789");
        assert_eq!(quote.asset.as_str(), "bitcoin");
    }

    #[test]
    fn test_local_time_label_format() {
        let quote = Quote::observed_now(AssetId::new("bitcoin"), "1");
        let label = quote.local_time_label();
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(label.len(), 19);
        assert_eq!(&label[4..5], "-");
        assert_eq!(&label[10..11], " ");
    }
}
