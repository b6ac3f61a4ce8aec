//! Cache de imagens pré-carregadas.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use tracing::{debug, trace, warn};

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, CacheStats, LoadOutcome};
use crate::fetch::ImageFetcher;
use crate::types::config::{CacheConfig, EvictionPolicy, FetcherConfig};
use crate::CidadeError;

/// Capacidade padrão (número de URLs).
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Idade máxima padrão de uma entrada.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// Carga em andamento, compartilhada por quem pedir a mesma URL.
type Flight = Shared<BoxFuture<'static, bool>>;

/// Cache em memória de "esta URL de imagem carregou?".
///
/// Limitado por tamanho e por idade. Clonar é barato e todos os clones
/// enxergam o mesmo estado, então a raiz de composição cria um e distribui.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<LruCache<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, Flight>>,
    fetcher: Arc<dyn ImageFetcher>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
    policy: EvictionPolicy,
    fetch_timeout: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    fetches: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Monta um [`ImageCache`].
pub struct ImageCacheBuilder {
    fetcher: Arc<dyn ImageFetcher>,
    clock: Arc<dyn Clock>,
    max_size: usize,
    max_age: Duration,
    policy: EvictionPolicy,
    fetch_timeout: Option<Duration>,
}

impl ImageCacheBuilder {
    /// Número máximo de entradas. Zero vira um.
    #[must_use]
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Idade máxima de uma entrada.
    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Política de remoção quando o cache enche.
    #[must_use]
    pub fn eviction(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Limite de tempo por carga; `None` espera para sempre.
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Fonte de tempo.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cria o cache.
    pub fn build(self) -> ImageCache {
        let cap = NonZeroUsize::new(self.max_size).unwrap_or(NonZeroUsize::MIN);
        ImageCache {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(LruCache::new(cap)),
                in_flight: Mutex::new(HashMap::new()),
                fetcher: self.fetcher,
                clock: self.clock,
                max_age: self.max_age,
                policy: self.policy,
                fetch_timeout: self.fetch_timeout,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
                expirations: AtomicU64::new(0),
                fetches: AtomicU64::new(0),
            }),
        }
    }
}

impl ImageCache {
    /// Cria um cache com 100 entradas, 30 minutos de validade e remoção FIFO.
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self::builder(fetcher).build()
    }

    /// Começa a montar um cache com os valores padrão.
    pub fn builder(fetcher: Arc<dyn ImageFetcher>) -> ImageCacheBuilder {
        ImageCacheBuilder {
            fetcher,
            clock: Arc::new(SystemClock),
            max_size: DEFAULT_MAX_SIZE,
            max_age: DEFAULT_MAX_AGE,
            policy: EvictionPolicy::default(),
            fetch_timeout: None,
        }
    }

    /// Cria um cache a partir da configuração.
    pub fn from_config(
        cache: &CacheConfig,
        fetcher_config: &FetcherConfig,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self::builder(fetcher)
            .max_size(cache.max_size)
            .max_age(cache.max_age())
            .eviction(cache.eviction)
            .fetch_timeout(fetcher_config.timeout())
            .build()
    }

    /// Pré-carrega a imagem e informa se ela carregou.
    ///
    /// Entrada válida responde sem tocar a rede. Caso contrário dispara o
    /// fetcher e grava o resultado. Nunca falha: erro vira `false`.
    /// Chamadas simultâneas para a mesma URL compartilham uma única carga.
    ///
    /// A carga roda em uma task própria do tokio, então continua mesmo se
    /// quem chamou desistir de esperar.
    pub async fn preload(&self, uri: &str) -> bool {
        let flight = {
            let mut in_flight = lock(&self.inner.in_flight);

            if let Some(loaded) = self.inner.lookup(uri) {
                trace!(uri, loaded, "preload respondido pelo cache");
                return loaded;
            }

            match in_flight.get(uri) {
                Some(flight) => {
                    trace!(uri, "aguardando carga já em andamento");
                    flight.clone()
                }
                None => {
                    let flight = self.inner.spawn_fetch(uri);
                    in_flight.insert(uri.to_string(), flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Consulta síncrona.
    ///
    /// `None` se a URL não está no cache ou expirou (a entrada expirada é
    /// removida aqui). Caso contrário, o resultado gravado.
    pub fn get(&self, uri: &str) -> Option<bool> {
        self.inner.lookup(uri)
    }

    /// Esvazia o cache inteiro.
    ///
    /// Cargas em andamento não são canceladas e gravam o resultado ao terminar.
    pub fn clear(&self) {
        let mut entries = lock(&self.inner.entries);
        let removed = entries.len();
        entries.clear();
        debug!(removed, "cache de imagens limpo");
    }

    /// Remove todas as entradas expiradas e retorna quantas saíram.
    pub fn purge_expired(&self) -> usize {
        let now = self.inner.clock.now();
        let mut entries = lock(&self.inner.entries);

        let expired_keys: Vec<String> = entries
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.is_expired(now, self.inner.max_age))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired_keys {
            entries.pop(key);
        }

        let removed = expired_keys.len();
        self.inner
            .expirations
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// URLs presentes, da próxima a ser removida para a mais nova.
    ///
    /// Não aplica expiração.
    pub fn keys(&self) -> Vec<String> {
        lock(&self.inner.entries)
            .iter()
            .rev()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Número atual de entradas (incluindo expiradas ainda não vistas).
    pub fn len(&self) -> usize {
        lock(&self.inner.entries).len()
    }

    /// Retorna `true` se não há entradas.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacidade máxima.
    pub fn capacity(&self) -> usize {
        lock(&self.inner.entries).cap().get()
    }

    /// Idade máxima de uma entrada.
    pub fn max_age(&self) -> Duration {
        self.inner.max_age
    }

    /// Política de remoção em uso.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.inner.policy
    }

    /// Número de cargas em andamento.
    pub fn in_flight(&self) -> usize {
        lock(&self.inner.in_flight).len()
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        let entries = lock(&self.inner.entries);
        CacheStats {
            size: entries.len(),
            capacity: entries.cap().get(),
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
            expirations: self.inner.expirations.load(Ordering::Relaxed),
            fetches: self.inner.fetches.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub(crate) fn insert(&self, uri: &str, outcome: LoadOutcome) {
        self.inner.store(uri, outcome);
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("fetcher", &self.inner.fetcher.name())
            .field("max_age", &self.inner.max_age)
            .field("policy", &self.inner.policy)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl CacheInner {
    /// Busca com expiração preguiçosa.
    fn lookup(&self, uri: &str) -> Option<bool> {
        let now = self.clock.now();
        let mut entries = lock(&self.entries);

        // peek para não mexer na ordem
        let is_expired = entries.peek(uri).map(|e| e.is_expired(now, self.max_age));

        match is_expired {
            Some(true) => {
                entries.pop(uri);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(uri, "entrada expirada removida");
                None
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let entry = match self.policy {
                    EvictionPolicy::Fifo => entries.peek(uri),
                    EvictionPolicy::Lru => entries.get(uri),
                };
                entry.map(CacheEntry::loaded)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Grava o resultado; se a URL é nova e o cache está cheio, remove a
    /// primeira da fila.
    fn store(&self, uri: &str, outcome: LoadOutcome) {
        let entry = CacheEntry::new(uri, outcome, self.clock.now());
        let mut entries = lock(&self.entries);

        // Reinserir uma URL existente não mantém a posição: ela vai para o fim da fila de remoção.
        if let Some((_, evicted)) = entries.push(uri.to_string(), entry) {
            if evicted.key != uri {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(
                    evicted = %evicted.key,
                    age_secs = (self.clock.now() - evicted.inserted_at).num_seconds(),
                    "cache cheio, entrada mais antiga removida"
                );
            }
        }
    }

    /// Grava e libera a URL para novas cargas.
    fn finish(&self, uri: &str, outcome: LoadOutcome) {
        self.store(uri, outcome);
        lock(&self.in_flight).remove(uri);
    }

    /// Chamado com `in_flight` travado: a task só consegue se remover
    /// depois que a entrada foi inserida.
    fn spawn_fetch(self: &Arc<Self>, uri: &str) -> Flight {
        let task_inner = Arc::clone(self);
        let task_key = uri.to_string();
        let handle = tokio::spawn(async move { task_inner.fetch_and_store(task_key).await });

        let inner = Arc::clone(self);
        let key = uri.to_string();
        async move {
            match handle.await {
                Ok(loaded) => loaded,
                Err(e) => {
                    warn!(uri = %key, error = %e, "tarefa de pré-carga abortou");
                    inner.finish(&key, LoadOutcome::Failed);
                    false
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn fetch_and_store(&self, uri: String) -> bool {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(uri = %uri, fetcher = self.fetcher.name(), "pré-carregando imagem");

        let result = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch_and_decode(&uri))
                .await
                .unwrap_or_else(|_| Err(CidadeError::FetchTimeout(uri.clone()))),
            None => self.fetcher.fetch_and_decode(&uri).await,
        };

        let outcome = match result {
            Ok(()) => LoadOutcome::Loaded,
            Err(e) => {
                debug!(uri = %uri, error = %e, "falha ao pré-carregar imagem");
                LoadOutcome::Failed
            }
        };

        self.finish(&uri, outcome);
        outcome.is_loaded()
    }
}
