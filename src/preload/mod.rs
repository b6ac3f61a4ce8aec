//! Pré-carga por tela.
//!
//! Uma [`PreloadSession`] recebe a lista de URLs que uma tela vai exibir,
//! dispara as cargas com concorrência limitada e mantém o conjunto local
//! de imagens prontas.

mod session;

pub use session::{PreloadReport, PreloadSession, DEFAULT_MAX_CONCURRENT};
