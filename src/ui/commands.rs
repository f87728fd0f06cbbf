// ============================================================================
// Commandes utilisateur
// ============================================================================
// Reconnaît les commandes littérales saisies au clavier
//
// CONCEPT RUST : Enum + parsing
// - Une ligne saisie devient une variante de Command
// - Tout ce qui n'est pas une commande connue est une recherche
// ============================================================================

/// Commande saisie par l'utilisateur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Affiche l'aide
    Help,
    /// Quitte le programme (ou arrête le suivi)
    Quit,
    /// Modifie la fréquence de mise à jour
    Set,
    /// Recherche d'un ou plusieurs actifs ("bitcoin, eth")
    Search(String),
}

impl Command {
    /// Parse une ligne saisie (insensible à la casse pour les commandes)
    ///
    /// Retourne None pour une ligne vide.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let command = match line.to_lowercase().as_str() {
            "help" => Command::Help,
            "quit" => Command::Quit,
            "set" => Command::Set,
            _ => Command::Search(line.to_string()),
        };
        Some(command)
    }
}

/// Découpe une recherche "bitcoin, eth" en requêtes individuelles
pub fn split_queries(search: &str) -> Vec<String> {
    search
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

/// Texte de la commande help
pub const HELP_TEXT: &str = "\
Commandes disponibles :
  - help : affiche ce message
  - quit : quitte le programme
  - set  : modifie la fréquence de mise à jour (en secondes)
Toute autre saisie est une recherche d'actif par nom ou symbole
(plusieurs actifs séparés par des virgules : bitcoin, eth).";

/// Rappel affiché pendant le suivi
pub const TRACKING_HINT: &str = "Tapez 'quit' pour arrêter le suivi.";

/// Dernière ligne affichée quand l'utilisateur arrête le suivi
pub const FAREWELL: &str = "Tracking stopped by user.";
