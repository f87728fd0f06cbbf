// ============================================================================
// CommandListener : écoute des commandes pendant le suivi
// ============================================================================
// Tourne sur le thread principal, bloqué sur la lecture d'une ligne.
// "quit" (ou la fin de l'entrée) déclenche le signal d'annulation.
//
// CONCEPT : Pas d'interblocage
// - Le listener ne partage que le CancellationSignal avec la boucle
// - Aucun verrou n'est tenu pendant la lecture bloquante
// - La boucle n'attend jamais le listener pour progresser
// ============================================================================

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::tracker::CancellationSignal;
use crate::ui::commands::{Command, TRACKING_HINT};

/// Raison de l'arrêt du listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// L'utilisateur a tapé "quit"
    Quit,
    /// Entrée fermée (EOF) : traité comme "quit"
    EndOfInput,
    /// Erreur de lecture : traité comme "quit"
    InputError,
    /// Le signal avait déjà été déclenché ailleurs
    AlreadyCancelled,
}

pub struct CommandListener<R, W> {
    input: R,
    output: W,
    signal: CancellationSignal,
}

impl<R: BufRead, W: Write> CommandListener<R, W> {
    pub fn new(input: R, output: W, signal: CancellationSignal) -> Self {
        Self {
            input,
            output,
            signal,
        }
    }

    /// Lit les lignes jusqu'à "quit", EOF ou erreur
    ///
    /// Garantit que le signal est déclenché au retour.
    pub fn run(mut self) -> StopReason {
        let mut line = String::new();

        loop {
            line.clear();
            let stop = match self.input.read_line(&mut line) {
                Ok(0) => Some(StopReason::EndOfInput),
                Ok(_) => self.handle_line(&line),
                Err(e) => {
                    warn!(error = %e, "Failed to read command");
                    Some(StopReason::InputError)
                }
            };

            if let Some(reason) = stop {
                let first = self.signal.set();
                info!(?reason, first, "Cancellation requested by command listener");
                return reason;
            }

            if self.signal.is_set() {
                debug!("Signal already set, command listener exiting");
                return StopReason::AlreadyCancelled;
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Option<StopReason> {
        match Command::parse(line) {
            Some(Command::Quit) => Some(StopReason::Quit),
            Some(command) => {
                debug!(?command, "Ignoring command during tracking");
                let _ = writeln!(self.output, "{}", TRACKING_HINT);
                let _ = self.output.flush();
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::testing::ChannelReader;
    use std::io::{self, Cursor, Read};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn listen(input: &str) -> (StopReason, CancellationSignal, String) {
        let signal = CancellationSignal::new();
        let mut output = Vec::new();
        let reason = CommandListener::new(Cursor::new(input.to_string()), &mut output, signal.clone()).run();
        (reason, signal, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_quit_sets_signal() {
        let (reason, signal, _) = listen("QUIT\n");
        assert_eq!(reason, StopReason::Quit);
        assert!(signal.is_set());
    }

    #[test]
    fn test_other_lines_print_hint_then_quit() {
        let (reason, signal, output) = listen("hello\n\nhelp\n  quit  \nignored\n");
        assert_eq!(reason, StopReason::Quit);
        assert!(signal.is_set());
        assert_eq!(output.matches(TRACKING_HINT).count(), 2);
    }

    #[test]
    fn test_end_of_input_acts_as_quit() {
        let (reason, signal, _) = listen("bitcoin\n");
        assert_eq!(reason, StopReason::EndOfInput);
        assert!(signal.is_set());
    }

    /// Lecteur qui échoue toujours
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "stdin closed"))
        }
    }

    #[test]
    fn test_read_error_acts_as_quit() {
        let signal = CancellationSignal::new();
        let reason =
            CommandListener::new(io::BufReader::new(Broken), io::sink(), signal.clone()).run();
        assert_eq!(reason, StopReason::InputError);
        assert!(signal.is_set());
    }

    #[test]
    fn test_signal_set_elsewhere_stops_after_next_line() {
        let (tx, rx) = mpsc::channel();
        let signal = CancellationSignal::new();

        let listener = {
            let signal = signal.clone();
            thread::spawn(move || {
                let reader = io::BufReader::new(ChannelReader::new(rx));
                CommandListener::new(reader, io::sink(), signal).run()
            })
        };

        // L'autre côté annule, puis une ligne quelconque arrive
        signal.set();
        thread::sleep(Duration::from_millis(20));
        tx.send("status\n".to_string()).unwrap();

        assert_eq!(listener.join().unwrap(), StopReason::AlreadyCancelled);
    }
}
