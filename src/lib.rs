//! # Cidade Conectada
//!
//! Cache de pré-carga de imagens do app Cidade Conectada.
//!
//! As telas do app (saúde, educação, sugestões, serviços urbanos) exibem
//! muitas imagens remotas repetidas. Este crate guarda, por URL, se a
//! imagem já carregou, para evitar downloads redundantes e o "pisca" do
//! layout ao remontar uma tela.
//!
//! ## Módulos
//!
//! - [`cache`] - Cache limitado por tamanho e idade, com carga única por URL
//! - [`preload`] - Sessão de pré-carga por tela
//! - [`fetch`] - Carregadores de imagem (HTTP, arquivo)
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Configuração e erros
//!
//! ## Exemplo
//!
//! ```no_run
//! use std::sync::Arc;
//! use cidade_conectada::cache::ImageCache;
//! use cidade_conectada::fetch::HttpImageFetcher;
//! use cidade_conectada::preload::PreloadSession;
//!
//! # async fn demo() -> cidade_conectada::CidadeResult<()> {
//! let cache = ImageCache::new(Arc::new(HttpImageFetcher::new()?));
//! let session = PreloadSession::new(cache.clone());
//!
//! let uris = vec!["https://cidade.gov/banner.png".to_string()];
//! session.preload_all(&uris).await;
//!
//! if session.is_image_loaded(&uris[0]) {
//!     // exibe sem placeholder
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod fetch;
pub mod preload;
pub mod types;

pub use types::config::Config;
pub use types::errors::{CidadeError, CidadeResult};
