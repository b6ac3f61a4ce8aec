//! Carregadores de imagem.
//!
//! O cache delega o download e a decodificação a um [`ImageFetcher`].
//! A implementação HTTP fica atrás da feature `http`.

mod base;
#[cfg(feature = "http")]
mod http;

pub use base::ImageFetcher;
#[cfg(feature = "http")]
pub use http::HttpImageFetcher;
