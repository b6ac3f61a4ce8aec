//! Entradas, resultados de carga e estatísticas do cache.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resultado de uma tentativa de carga.
///
/// Não distingue 404, erro de rede ou imagem corrompida: tudo vira `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Baixada e decodificada com sucesso.
    Loaded,
    /// Qualquer falha.
    Failed,
}

impl LoadOutcome {
    /// `true` para `Loaded`.
    pub fn is_loaded(self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

impl From<bool> for LoadOutcome {
    fn from(loaded: bool) -> Self {
        if loaded {
            LoadOutcome::Loaded
        } else {
            LoadOutcome::Failed
        }
    }
}

impl From<LoadOutcome> for bool {
    fn from(outcome: LoadOutcome) -> Self {
        outcome.is_loaded()
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Loaded => write!(f, "loaded"),
            LoadOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Entrada do cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// URL da imagem.
    pub key: String,

    /// Momento da inserção. Nunca muda; reinserir cria outra entrada.
    pub inserted_at: DateTime<Utc>,

    /// Resultado da carga.
    pub outcome: LoadOutcome,
}

impl CacheEntry {
    /// Cria uma nova entrada.
    pub fn new(key: impl Into<String>, outcome: LoadOutcome, inserted_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            inserted_at,
            outcome,
        }
    }

    /// Valor exposto por `get`.
    pub fn loaded(&self) -> bool {
        self.outcome.is_loaded()
    }

    /// Verifica se a entrada expirou em `now`.
    ///
    /// Se o relógio voltou e `inserted_at` ficou no futuro, a idade conta como zero.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let elapsed = now
            .signed_duration_since(self.inserted_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        elapsed > max_age
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    /// Consultas respondidas pelo cache.
    pub hits: u64,

    /// Consultas sem entrada válida.
    pub misses: u64,

    /// Entradas removidas por capacidade.
    pub evictions: u64,

    /// Entradas removidas por idade.
    pub expirations: u64,

    /// Cargas realmente disparadas no fetcher.
    pub fetches: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
