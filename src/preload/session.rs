//! Sessão de pré-carga de uma tela.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use crate::cache::{ImageCache, LoadOutcome};

/// Limite padrão de cargas simultâneas por sessão.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Resultado de uma rodada de pré-carga.
#[derive(Debug, Clone, Default)]
pub struct PreloadReport {
    /// `(url, resultado)` na ordem em que terminaram.
    pub outcomes: Vec<(String, LoadOutcome)>,
}

impl PreloadReport {
    /// Quantas URLs carregaram.
    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_loaded()).count()
    }

    /// Quantas URLs falharam.
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.loaded_count()
    }
}

/// Visão de uma tela sobre o cache compartilhado.
///
/// Mantém o conjunto local de URLs confirmadas como carregadas. Quem
/// precisa reagir a mudanças assina com [`PreloadSession::subscribe`].
pub struct PreloadSession {
    cache: ImageCache,
    loaded: watch::Sender<HashSet<String>>,
    last_uris: Mutex<Option<Arc<[String]>>>,
    max_concurrent: usize,
}

impl PreloadSession {
    /// Cria uma sessão sobre o cache.
    pub fn new(cache: ImageCache) -> Self {
        let (loaded, _) = watch::channel(HashSet::new());
        Self {
            cache,
            loaded,
            last_uris: Mutex::new(None),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Define o limite de cargas simultâneas (mínimo 1).
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Pré-carrega a lista se ela for outra instância.
    ///
    /// A identidade é o ponteiro do `Arc`: reenviar o mesmo `Arc` não dispara
    /// nada, mesmo conteúdo em outro `Arc` dispara. Retorna `None` quando
    /// não houve rodada.
    pub async fn watch_uris(&self, uris: Arc<[String]>) -> Option<PreloadReport> {
        {
            let mut last = self.last_uris.lock().unwrap_or_else(PoisonError::into_inner);
            if last.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &uris)) {
                return None;
            }
            *last = Some(Arc::clone(&uris));
        }

        Some(self.preload_all(&uris).await)
    }

    /// Pré-carrega todas as URLs.
    pub async fn preload_all(&self, uris: &[String]) -> PreloadReport {
        self.preload_all_with_progress(uris, |_, _| {}).await
    }

    /// Igual a [`preload_all`](Self::preload_all), chamando `on_done` a cada URL concluída.
    ///
    /// URLs já no cache respondem na hora; as que falharam antes não são
    /// tentadas de novo até expirarem.
    pub async fn preload_all_with_progress<F>(&self, uris: &[String], on_done: F) -> PreloadReport
    where
        F: Fn(&str, LoadOutcome),
    {
        debug!(
            count = uris.len(),
            max_concurrent = self.max_concurrent,
            "iniciando pré-carga"
        );

        let on_done = &on_done;
        let outcomes: Vec<(String, LoadOutcome)> = stream::iter(uris)
            .map(|uri| async move {
                let outcome = match self.cache.get(uri) {
                    Some(loaded) => LoadOutcome::from(loaded),
                    None => LoadOutcome::from(self.cache.preload(uri).await),
                };
                if outcome.is_loaded() {
                    self.mark_loaded(uri);
                }
                on_done(uri.as_str(), outcome);
                (uri.clone(), outcome)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let report = PreloadReport { outcomes };
        debug!(
            loaded = report.loaded_count(),
            failed = report.failed_count(),
            "pré-carga concluída"
        );
        report
    }

    /// `true` se a URL está no conjunto local de carregadas.
    pub fn is_image_loaded(&self, uri: &str) -> bool {
        self.loaded.borrow().contains(uri)
    }

    /// Repassa para [`ImageCache::preload`] sem tocar o conjunto local.
    pub async fn preload_image(&self, uri: &str) -> bool {
        self.cache.preload(uri).await
    }

    /// Limpa o cache compartilhado e o conjunto local.
    ///
    /// Afeta todas as sessões que usam o mesmo cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.loaded.send_if_modified(|set| {
            let changed = !set.is_empty();
            set.clear();
            changed
        });
    }

    /// Cópia do conjunto local.
    pub fn loaded_images(&self) -> HashSet<String> {
        self.loaded.borrow().clone()
    }

    /// Recebe o conjunto local a cada mudança.
    pub fn subscribe(&self) -> watch::Receiver<HashSet<String>> {
        self.loaded.subscribe()
    }

    /// Cache compartilhado.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    fn mark_loaded(&self, uri: &str) {
        self.loaded
            .send_if_modified(|set| set.insert(uri.to_string()));
    }
}

impl std::fmt::Debug for PreloadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadSession")
            .field("max_concurrent", &self.max_concurrent)
            .field("loaded", &self.loaded.borrow().len())
            .finish_non_exhaustive()
    }
}
