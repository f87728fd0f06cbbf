// ============================================================================
// Prompt : phase de sélection avant le suivi
// ============================================================================
// Boucle de saisie :
//   help -> affiche l'aide
//   quit -> quitte sans suivi
//   set  -> demande et enregistre une nouvelle fréquence
//   autre -> recherche d'actif(s), puis suivi
// Une recherche sans résultat propose de réessayer (yes/no).
//
// CONCEPT RUST : Générique sur BufRead/Write
// - stdin/stdout dans le binaire
// - Cursor/Vec<u8> dans les tests
// ============================================================================

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::api::{QuoteError, QuoteSource};
use crate::models::TrackedSet;
use crate::preferences::{PreferenceStore, RefreshInterval};
use crate::ui::commands::{split_queries, Command, HELP_TEXT};

/// Issue de la phase de sélection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Actifs résolus : lancer le suivi
    Track(TrackedSet),
    /// Quitter sans suivi (quit, refus de réessayer, fin de l'entrée)
    Exit,
}

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Rend l'entrée et la sortie (le listener du suivi les reprend)
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Boucle de saisie jusqu'à une sélection d'actifs ou une sortie
    ///
    /// `initial` : recherche fournie en ligne de commande, traitée comme
    /// la première saisie.
    pub async fn select_assets<Q: QuoteSource>(
        &mut self,
        source: &Q,
        preferences: &PreferenceStore,
        initial: Option<String>,
    ) -> Selection {
        let mut pending = initial;

        loop {
            let line = match pending.take() {
                Some(line) => line,
                None => match self.ask(
                    "Entrez le nom ou le symbole d'une cryptomonnaie (tapez 'help' pour l'aide) : ",
                ) {
                    Some(line) => line,
                    None => return Selection::Exit,
                },
            };

            match Command::parse(&line) {
                None => continue,
                Some(Command::Help) => self.say(HELP_TEXT),
                Some(Command::Quit) => {
                    self.say("Fin du programme.");
                    return Selection::Exit;
                }
                Some(Command::Set) => self.update_frequency(preferences),
                Some(Command::Search(search)) => {
                    if let Some(tracked) = self.resolve_all(source, &search).await {
                        return Selection::Track(tracked);
                    }

                    let retry = self
                        .ask("Voulez-vous réessayer ? (yes/no) : ")
                        .unwrap_or_default();
                    if retry.trim().to_lowercase() != "yes" {
                        info!("User declined retry");
                        return Selection::Exit;
                    }
                }
            }
        }
    }

    /// Résout chaque requête ; None si au moins une a échoué
    async fn resolve_all<Q: QuoteSource>(&mut self, source: &Q, search: &str) -> Option<TrackedSet> {
        let queries = split_queries(search);
        if queries.is_empty() {
            self.say("Saisie vide.");
            return None;
        }

        let mut resolved = Vec::new();
        let mut failed = false;

        for query in queries {
            match source.resolve(&query).await {
                Ok(asset) => resolved.push(asset),
                Err(QuoteError::NotFound(_)) => {
                    failed = true;
                    self.say(&format!(
                        "Aucun résultat pour '{}'. Vérifiez votre saisie.",
                        query
                    ));
                }
                Err(e) => {
                    failed = true;
                    warn!(query = %query, error = %e, "Search failed");
                    self.say(&format!("Erreur lors de la recherche de '{}' : {}", query, e));
                }
            }
        }

        if failed {
            return None;
        }
        TrackedSet::new(resolved)
    }

    /// Commande "set" : demande et persiste une nouvelle fréquence
    fn update_frequency(&mut self, preferences: &PreferenceStore) {
        self.say(&format!(
            "Fréquence de mise à jour actuelle : {}",
            preferences.get()
        ));

        let Some(answer) = self.ask("Entrez la fréquence de mise à jour en secondes : ") else {
            return;
        };

        match answer.parse::<RefreshInterval>() {
            Ok(interval) => match preferences.set(interval) {
                Ok(()) => self.say(&format!("Fréquence enregistrée : {}", interval)),
                Err(e) => {
                    warn!(error = ?e, "Failed to save update frequency");
                    self.say(&format!("Impossible d'enregistrer la fréquence : {:#}", e));
                }
            },
            Err(e) => self.say(&e.to_string()),
        }
    }

    /// Affiche une question et lit une ligne ; None en fin d'entrée
    fn ask(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{}", question);
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read user input");
                None
            }
        }
    }

    fn say(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message);
    }
}
