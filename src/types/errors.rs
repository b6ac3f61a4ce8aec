//! Tipos de erro do Cidade Conectada.

use thiserror::Error;

/// Tipo de resultado padrão do crate.
pub type CidadeResult<T> = Result<T, CidadeError>;

/// Erros possíveis fora da fronteira do cache.
///
/// O cache de imagens nunca devolve estes erros para quem chama `preload`:
/// qualquer falha vira `false`. Eles circulam entre o fetcher, a
/// configuração e a CLI.
#[derive(Error, Debug)]
pub enum CidadeError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "http")]
    #[error("Erro de HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resposta HTTP {status} para '{uri}'")]
    HttpStatus { uri: String, status: u16 },

    #[error("Falha ao decodificar imagem '{0}': {1}")]
    Decode(String, String),

    #[error("Timeout ao carregar '{0}'")]
    FetchTimeout(String),

    #[error("URI inválida: '{0}'")]
    InvalidUri(String),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl CidadeError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
