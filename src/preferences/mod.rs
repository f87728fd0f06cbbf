// ============================================================================
// Module : preferences
// ============================================================================
// Préférences utilisateur persistées dans un fichier INI (crate rust-ini)
//
//   [Preferences]
//   UpdateFrequency = 60
//
// CONCEPTS RUST :
// 1. AtomicU64 : lecture sans verrou, jamais "déchirée", depuis n'importe
//    quel thread (la boucle de rafraîchissement lit à chaque cycle)
// 2. Mutex : un seul écrivain à la fois pour le fichier
// 3. Écriture atomique : fichier temporaire + fsync + rename
// ============================================================================

use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use ini::{Ini, WriteOption};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fréquence de mise à jour par défaut (secondes)
pub const DEFAULT_UPDATE_FREQUENCY: u64 = 60;

/// Variable d'environnement pour choisir le fichier de configuration
pub const CONFIG_ENV_VAR: &str = "PRICEWATCH_CONFIG";

const PREFERENCES_SECTION: &str = "Preferences";
const UPDATE_FREQUENCY_KEY: &str = "UpdateFrequency";
const API_SECTION: &str = "Api";
const BASE_URL_KEY: &str = "BaseUrl";
const TIMEOUT_KEY: &str = "TimeoutSecs";

// ============================================================================
// RefreshInterval
// ============================================================================

/// Intervalle de rafraîchissement, en secondes entières (toujours >= 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    pub const DEFAULT: RefreshInterval = RefreshInterval(DEFAULT_UPDATE_FREQUENCY);

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Valeur saisie qui n'est pas un nombre de secondes valide
#[derive(Debug, Error, PartialEq, Eq)]
#[error("fréquence invalide '{0}' : nombre entier de secondes attendu")]
pub struct InvalidInterval(pub String);

impl FromStr for RefreshInterval {
    type Err = InvalidInterval;

    /// "120" -> 120s ; les valeurs négatives ou non numériques sont refusées
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| InvalidInterval(s.trim().to_string()))
    }
}

// ============================================================================
// PreferenceStore
// ============================================================================

/// Magasin de préférences partagé entre threads
///
/// CONCEPT : Lecteurs multiples / écrivain unique
/// - get() : simple load atomique (Acquire), jamais bloquant
/// - set() : sérialisé par le Mutex, persiste sur disque AVANT de publier
///   la nouvelle valeur (Release). Un lecteur voit donc l'ancienne ou la
///   nouvelle valeur, jamais un état intermédiaire.
///
/// Partagé via Arc<PreferenceStore> entre le thread principal et la boucle.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    current: AtomicU64,
    document: Mutex<Ini>,
}

impl PreferenceStore {
    /// Ouvre le fichier de configuration
    ///
    /// N'échoue jamais : un fichier absent ou illisible donne les valeurs
    /// par défaut (avec un warning dans les logs).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let document = match fs::read_to_string(&path) {
            Ok(text) => Ini::load_from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
                Ini::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ini::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                Ini::new()
            }
        };

        let interval = match document.get_from(Some(PREFERENCES_SECTION), UPDATE_FREQUENCY_KEY) {
            Some(raw) => raw.parse::<RefreshInterval>().unwrap_or_else(|e| {
                warn!(error = %e, "Invalid update frequency in config, using default");
                RefreshInterval::DEFAULT
            }),
            None => RefreshInterval::DEFAULT,
        };

        info!(path = %path.display(), %interval, "Preferences loaded");

        Self {
            path,
            current: AtomicU64::new(interval.as_secs()),
            document: Mutex::new(document),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Intervalle courant (dernière valeur validée par set())
    pub fn get(&self) -> RefreshInterval {
        RefreshInterval(self.current.load(Ordering::Acquire))
    }

    /// Enregistre un nouvel intervalle
    ///
    /// Quand set() retourne Ok, la valeur est sur disque (fsync).
    /// En cas d'erreur, l'ancienne valeur reste active.
    pub fn set(&self, interval: RefreshInterval) -> Result<()> {
        let mut document = self
            .document
            .lock()
            .map_err(|_| anyhow!("Verrou des préférences empoisonné"))?;

        let mut updated = document.clone();
        updated
            .with_section(Some(PREFERENCES_SECTION))
            .set(UPDATE_FREQUENCY_KEY, interval.as_secs().to_string());

        write_durably(&self.path, &render(&updated)?)?;

        *document = updated;
        self.current.store(interval.as_secs(), Ordering::Release);

        info!(path = %self.path.display(), %interval, "Update frequency saved");
        Ok(())
    }

    /// URL de l'API si configurée ([Api] BaseUrl)
    pub fn api_base_url(&self) -> Option<String> {
        let document = self.document.lock().ok()?;
        document
            .get_from(Some(API_SECTION), BASE_URL_KEY)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    /// Timeout HTTP si configuré ([Api] TimeoutSecs)
    pub fn api_timeout(&self) -> Option<Duration> {
        let document = self.document.lock().ok()?;
        let raw = document.get_from(Some(API_SECTION), TIMEOUT_KEY)?;
        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                warn!(value = raw, "Invalid API timeout in config, ignoring");
                None
            }
        }
    }
}

/// Sérialise le document ("clé = valeur", comme configparser)
fn render(document: &Ini) -> Result<String> {
    let mut buffer = Vec::new();
    let options = WriteOption {
        kv_separator: " = ",
        ..WriteOption::default()
    };
    document
        .write_to_opt(&mut buffer, options)
        .context("Échec de la sérialisation de la configuration")?;
    String::from_utf8(buffer).context("Configuration non UTF-8")
}

/// Chemin du fichier de configuration par défaut
///
/// Ordre : $PRICEWATCH_CONFIG, puis <config_dir>/pricewatch/config.ini,
/// puis ./config.ini
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pricewatch").join("config.ini"))
        .unwrap_or_else(|| PathBuf::from("config.ini"))
}

/// Écrit le fichier de façon atomique et durable
///
/// CONCEPT : Crash safety
/// - On écrit dans un fichier temporaire du même répertoire
/// - sync_all() force l'écriture sur disque
/// - rename() remplace l'ancien fichier en une seule opération
fn write_durably(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Échec de la création du répertoire {}", dir.display()))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Chemin de configuration invalide : {}", path.display()))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    {
        let mut file = File::create(&tmp_path)
            .with_context(|| format!("Échec de la création de {}", tmp_path.display()))?;
        file.write_all(contents.as_bytes())
            .context("Échec de l'écriture de la configuration")?;
        file.sync_all()
            .context("Échec de la synchronisation de la configuration")?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Échec du remplacement de {}", path.display()))?;

    // Rend le rename lui-même durable (répertoire non ouvrable hors Unix)
    if cfg!(unix) {
        if let Ok(dir) = File::open(&dir) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_interval_parsing() {
        assert_eq!("120".parse::<RefreshInterval>(), Ok(RefreshInterval::from_secs(120)));
        assert_eq!(" 0 ".parse::<RefreshInterval>(), Ok(RefreshInterval::from_secs(0)));
        assert!("-5".parse::<RefreshInterval>().is_err());
        assert!("abc".parse::<RefreshInterval>().is_err());
        assert!("".parse::<RefreshInterval>().is_err());
    }

    #[test]
    fn test_missing_file_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("config.ini"));
        assert_eq!(store.get(), RefreshInterval::DEFAULT);
        assert_eq!(store.get().as_secs(), 60);
    }

    #[test]
    fn test_reads_existing_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[Preferences]\nupdatefrequency = 30\n").unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.get().as_secs(), 30);
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[Preferences]\nUpdateFrequency = soon\n").unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.get(), RefreshInterval::DEFAULT);
    }

    #[test]
    fn test_set_then_get_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ini");
        let store = PreferenceStore::open(&path);

        store.set(RefreshInterval::from_secs(120)).unwrap();
        assert_eq!(store.get().as_secs(), 120);

        // Relu depuis le disque
        let reopened = PreferenceStore::open(&path);
        assert_eq!(reopened.get().as_secs(), 120);
        assert!(!dir.path().join("nested").join(".config.ini.tmp").exists());
    }

    #[test]
    fn test_set_preserves_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[Api]\nBaseUrl = http://localhost:9/v2\nTimeoutSecs = 3\n").unwrap();

        let store = PreferenceStore::open(&path);
        store.set(RefreshInterval::from_secs(15)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("BaseUrl = http://localhost:9/v2"));
        assert!(text.contains("UpdateFrequency = 15"));
        assert_eq!(store.api_base_url().as_deref(), Some("http://localhost:9/v2"));
        assert_eq!(store.api_timeout(), Some(Duration::from_secs(3)));

        let reopened = PreferenceStore::open(&path);
        assert_eq!(reopened.get().as_secs(), 15);
        assert_eq!(reopened.api_base_url().as_deref(), Some("http://localhost:9/v2"));
    }

    #[test]
    fn test_section_header_with_trailing_comment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(
            &path,
            "[Api]\nBaseUrl = http://x/v2\n[Preferences] ; seconds\nUpdateFrequency = 30\n",
        )
        .unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.get().as_secs(), 30);
        assert_eq!(store.api_base_url().as_deref(), Some("http://x/v2"));
    }

    #[test]
    fn test_comment_lines_and_colon_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "# réglages\n[Preferences]\n; en secondes\nUpdateFrequency: 45\n").unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.get().as_secs(), 45);
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        // Le "répertoire parent" est un fichier : l'écriture doit échouer
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = PreferenceStore::open(blocker.join("config.ini"));

        assert!(store.set(RefreshInterval::from_secs(5)).is_err());
        assert_eq!(store.get(), RefreshInterval::DEFAULT);
    }

    #[test]
    fn test_concurrent_reads_never_see_partial_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PreferenceStore::open(dir.path().join("config.ini")));

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let secs = if i % 2 == 0 { 10 } else { 20 };
                    store.set(RefreshInterval::from_secs(secs)).unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..5_000 {
                        let secs = store.get().as_secs();
                        assert!(secs == 60 || secs == 10 || secs == 20, "torn value {}", secs);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.get().as_secs(), 20);
    }
}
