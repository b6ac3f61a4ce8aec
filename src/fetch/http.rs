//! Fetcher HTTP(S) com decodificação via crate `image`.

use async_trait::async_trait;
use reqwest::Url;
use tracing::trace;

use super::base::ImageFetcher;
use crate::types::config::FetcherConfig;
use crate::{CidadeError, CidadeResult};

/// Baixa imagens por HTTP(S) e confirma que decodificam.
///
/// Também aceita `file://`, útil para rodar a CLI contra arquivos locais.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Cria um fetcher com a configuração padrão.
    pub fn new() -> CidadeResult<Self> {
        Self::from_config(&FetcherConfig::default())
    }

    /// Cria um fetcher a partir da configuração.
    pub fn from_config(config: &FetcherConfig) -> CidadeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    async fn download(&self, uri: &str, url: Url) -> CidadeResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CidadeError::HttpStatus {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_and_decode(&self, uri: &str) -> CidadeResult<()> {
        let url = Url::parse(uri).map_err(|_| CidadeError::InvalidUri(uri.to_string()))?;

        let bytes = match url.scheme() {
            "http" | "https" => self.download(uri, url).await?,
            "file" => {
                // `to_file_path` decodifica `%20` e aceita o host `localhost`.
                let path = url
                    .to_file_path()
                    .map_err(|_| CidadeError::InvalidUri(uri.to_string()))?;
                tokio::fs::read(path).await?
            }
            _ => return Err(CidadeError::InvalidUri(uri.to_string())),
        };

        trace!(uri, bytes = bytes.len(), "imagem baixada, decodificando");
        decode(uri, bytes).await
    }
}

/// Decodifica fora do runtime assíncrono.
async fn decode(uri: &str, bytes: Vec<u8>) -> CidadeResult<()> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|_| ()))
        .await
        .map_err(|e| CidadeError::other(format!("decodificação abortada: {}", e)))?
        .map_err(|e| CidadeError::Decode(uri.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &std::path::Path) -> String {
        let path = dir.join("pixel.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();
        format!("file://{}", path.display())
    }

    #[tokio::test]
    async fn test_file_uri_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let uri = write_png(dir.path());
        let fetcher = HttpImageFetcher::new().unwrap();

        assert!(fetcher.fetch_and_decode(&uri).await.is_ok());
    }

    #[tokio::test]
    async fn test_garbage_fails_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-an-image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let fetcher = HttpImageFetcher::new().unwrap();

        let result = fetcher
            .fetch_and_decode(&format!("file://{}", path.display()))
            .await;

        assert!(matches!(result, Err(CidadeError::Decode(_, _))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let fetcher = HttpImageFetcher::new().unwrap();

        let result = fetcher
            .fetch_and_decode("file:///nonexistent/cidade/pixel.png")
            .await;

        assert!(matches!(result, Err(CidadeError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_uri_with_localhost_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();
        let fetcher = HttpImageFetcher::new().unwrap();

        let uri = format!("file://localhost{}", path.display());

        assert!(fetcher.fetch_and_decode(&uri).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_uri_percent_encoded_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foto posto.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();
        let fetcher = HttpImageFetcher::new().unwrap();

        let encoded = Url::from_file_path(&path).unwrap();
        assert!(encoded.as_str().contains("foto%20posto.png"));

        assert!(fetcher.fetch_and_decode(encoded.as_str()).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_uri_with_remote_host_rejected() {
        let fetcher = HttpImageFetcher::new().unwrap();

        let result = fetcher
            .fetch_and_decode("file://servidor/imagens/pixel.png")
            .await;

        assert!(matches!(result, Err(CidadeError::InvalidUri(_))));
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let fetcher = HttpImageFetcher::new().unwrap();

        for uri in ["ftp://host/a.png", "no-scheme.png", ""] {
            let result = fetcher.fetch_and_decode(uri).await;
            assert!(matches!(result, Err(CidadeError::InvalidUri(_))), "{uri}");
        }
    }
}
