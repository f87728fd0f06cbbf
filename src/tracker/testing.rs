// Faux collaborateurs partagés par les tests du suivi

use std::collections::{HashMap, HashSet};
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::api::{QuoteError, QuoteSource};
use crate::models::{AssetId, Quote};
use crate::preferences::{PreferenceStore, RefreshInterval};
use crate::ui::Presenter;

/// Source de cotations en mémoire
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    prices: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Duration,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_price(mut self, id: &str, price: &str) -> Self {
        self.prices.insert(id.to_string(), price.to_string());
        self
    }

    /// Cet actif échoue toujours (HTTP 503)
    pub(crate) fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Durée de chaque fetch
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    async fn resolve(&self, query: &str) -> Result<AssetId, QuoteError> {
        let query = query.trim().to_lowercase();
        if self.prices.contains_key(&query) || self.failing.contains(&query) {
            Ok(AssetId::new(query))
        } else {
            Err(QuoteError::NotFound(query))
        }
    }

    async fn fetch(&self, asset: &AssetId) -> Result<Quote, QuoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing.contains(asset.as_str()) {
            return Err(QuoteError::Http(503));
        }
        match self.prices.get(asset.as_str()) {
            Some(price) => Ok(Quote::observed_now(asset.clone(), price.clone())),
            None => Err(QuoteError::UnknownAsset(asset.to_string())),
        }
    }
}

/// Un appel à render()
#[derive(Debug, Clone)]
pub(crate) struct Render {
    pub(crate) at: Instant,
    pub(crate) quotes: Vec<Quote>,
}

/// Presenter qui enregistre tout ce qu'on lui donne
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingPresenter {
    renders: Arc<Mutex<Vec<Render>>>,
    failures: Arc<Mutex<Vec<AssetId>>>,
}

impl RecordingPresenter {
    pub(crate) fn renders(&self) -> Vec<Render> {
        self.renders.lock().unwrap().clone()
    }

    pub(crate) fn failures(&self) -> Vec<AssetId> {
        self.failures.lock().unwrap().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, quotes: &[Quote]) {
        self.renders.lock().unwrap().push(Render {
            at: Instant::now(),
            quotes: quotes.to_vec(),
        });
    }

    fn report_failure(&mut self, asset: &AssetId, _error: &QuoteError) {
        self.failures.lock().unwrap().push(asset.clone());
    }
}

/// stdin simulé : chaque message du channel est une ligne,
/// la fermeture du channel est un EOF
pub(crate) struct ChannelReader {
    rx: mpsc::Receiver<String>,
    pending: Vec<u8>,
}

impl ChannelReader {
    pub(crate) fn new(rx: mpsc::Receiver<String>) -> Self {
        Self {
            rx,
            pending: Vec::new(),
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(line) => self.pending = line.into_bytes(),
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// Préférences dans un répertoire temporaire, initialisées à `secs`
///
/// Le TempDir doit rester vivant pendant le test.
pub(crate) fn preferences_with(secs: u64) -> (TempDir, Arc<PreferenceStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = PreferenceStore::open(dir.path().join("config.ini"));
    if secs != store.get().as_secs() {
        store.set(RefreshInterval::from_secs(secs)).unwrap();
    }
    (dir, Arc::new(store))
}
