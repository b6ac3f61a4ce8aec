//! Cache de pré-carga de imagens.
//!
//! Guarda, por URL, se a imagem carregou com sucesso, para que telas que
//! montam a mesma imagem várias vezes não repitam o download. O cache é
//! limitado em número de entradas (remoção FIFO por padrão) e em idade
//! (expiração preguiçosa na consulta).

mod clock;
mod entry;
mod image_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CacheStats, LoadOutcome};
pub use image_cache::{ImageCache, ImageCacheBuilder, DEFAULT_MAX_AGE, DEFAULT_MAX_SIZE};
