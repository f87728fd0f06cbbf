// ============================================================================
// Structure : TrackedSet
// ============================================================================
// Ensemble ordonné des actifs suivis pendant une session
//
// CONCEPTS RUST :
// 1. Invariant garanti par le constructeur : un TrackedSet n'est jamais vide
// 2. Pas de méthode de modification : l'ensemble est figé pour la session,
//    il peut donc être déplacé (move) dans le thread de rafraîchissement
//    sans aucune synchronisation
// ============================================================================

use std::collections::HashSet;

use crate::models::AssetId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSet {
    assets: Vec<AssetId>,
}

impl TrackedSet {
    /// Construit l'ensemble à partir des actifs résolus
    ///
    /// Les doublons sont retirés (la première occurrence garde sa position).
    /// Retourne None si aucun actif n'est fourni.
    pub fn new(assets: impl IntoIterator<Item = AssetId>) -> Option<Self> {
        let mut seen = HashSet::new();
        let assets: Vec<AssetId> = assets
            .into_iter()
            .filter(|asset| seen.insert(asset.clone()))
            .collect();

        if assets.is_empty() {
            None
        } else {
            Some(Self { assets })
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetId> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Toujours false (invariant du constructeur), fourni pour clippy
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Liste lisible : "bitcoin, ethereum"
    pub fn joined(&self) -> String {
        self.assets
            .iter()
            .map(AssetId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
