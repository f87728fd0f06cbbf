// ============================================================================
// Presenter : affichage des cotations
// ============================================================================
// Transforme un lot de cotations en lignes de texte pour la console
//
// CONCEPTS RUST :
// 1. Trait Presenter : la boucle de rafraîchissement ne sait pas OÙ on
//    affiche (console, buffer de test...)
// 2. Générique sur io::Write : ConsolePresenter<Vec<u8>> dans les tests,
//    ConsolePresenter<Stdout> dans le binaire
// 3. Crossterm Stylize : couleurs ANSI quand la sortie est un terminal
// ============================================================================

use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::style::Stylize;

use crate::api::QuoteError;
use crate::models::{AssetId, Quote};

/// Destination d'affichage des résultats d'un cycle
pub trait Presenter {
    /// Affiche les cotations d'un cycle (éventuellement un sous-ensemble, voire aucune)
    fn render(&mut self, quotes: &[Quote]);

    /// Signale qu'un actif n'a pas de données pour ce cycle
    fn report_failure(&mut self, _asset: &AssetId, _error: &QuoteError) {}
}

/// Ligne affichée pour une cotation
///
/// Format : "At 2024-01-15 14:03:27, the current price of Bitcoin is $50000.00"
pub fn format_quote(quote: &Quote) -> String {
    format!(
        "At {}, the current price of {} is ${}",
        quote.local_time_label(),
        quote.asset.display_name(),
        quote.price
    )
}

/// Ligne affichée quand un actif n'a pas pu être récupéré
pub fn format_failure(asset: &AssetId, error: &QuoteError) -> String {
    format!(
        "No data for {} this cycle ({})",
        asset.display_name(),
        error
    )
}

/// Presenter qui écrit dans un flux texte
pub struct ConsolePresenter<W: Write> {
    out: W,
    styled: bool,
}

impl ConsolePresenter<Stdout> {
    /// Sortie standard, en couleur si c'est un terminal
    pub fn stdout() -> Self {
        let out = io::stdout();
        let styled = out.is_terminal();
        Self { out, styled }
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W, styled: bool) -> Self {
        Self { out, styled }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled_quote(quote: &Quote) -> String {
        format!(
            "At {}, the current price of {} is {}",
            quote.local_time_label().dark_grey(),
            quote.asset.display_name().bold(),
            format!("${}", quote.price).green()
        )
    }

    // Les erreurs d'écriture sur la console sont ignorées : rien de mieux
    // à faire que de continuer le cycle suivant
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn render(&mut self, quotes: &[Quote]) {
        for quote in quotes {
            let line = if self.styled {
                Self::styled_quote(quote)
            } else {
                format_quote(quote)
            };
            self.write_line(&line);
        }
        let _ = self.out.flush();
    }

    fn report_failure(&mut self, asset: &AssetId, error: &QuoteError) {
        let line = format_failure(asset, error);
        let line = if self.styled {
            line.dark_grey().to_string()
        } else {
            line
        };
        self.write_line(&line);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(asset: &str, price: &str) -> Quote {
        Quote::observed_now(AssetId::new(asset), price)
    }

    #[test]
    fn test_format_quote() {
        let line = format_quote(&quote("bitcoin", "50000.00"));
        assert!(line.starts_with("At "));
        assert!(line.ends_with(", the current price of Bitcoin is $50000.00"));
    }

    #[test]
    fn test_plain_render_one_line_per_quote() {
        let mut presenter = ConsolePresenter::new(Vec::new(), false);
        presenter.render(&[quote("bitcoin", "50000.00"), quote("ethereum", "3000.5")]);

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("price of Bitcoin is $50000.00"));
        assert!(lines[1].contains("price of Ethereum is $3000.5"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let mut presenter = ConsolePresenter::new(Vec::new(), false);
        presenter.render(&[]);
        assert!(presenter.into_inner().is_empty());
    }

    #[test]
    fn test_styled_render_keeps_price() {
        let mut presenter = ConsolePresenter::new(Vec::new(), true);
        presenter.render(&[quote("bitcoin", "50000.00")]);

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains('\u{1b}'));
        assert!(text.contains("$50000.00"));
        assert!(text.contains("the current price of"));
    }

    #[test]
    fn test_failure_line() {
        let mut presenter = ConsolePresenter::new(Vec::new(), false);
        presenter.report_failure(
            &AssetId::new("dogecoin"),
            &QuoteError::UnknownAsset("dogecoin".to_string()),
        );

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(
            text,
            "No data for Dogecoin this cycle (actif inconnu : dogecoin)\n"
        );
    }
}
