//! Trait base para carregadores de imagem.

use async_trait::async_trait;

use crate::CidadeResult;

/// Capacidade de baixar e decodificar uma imagem.
///
/// O cache só quer saber se a imagem ficou pronta para exibição:
/// `Ok(())` vira `true`, qualquer `Err` vira `false`.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Nome do fetcher, usado nos logs.
    fn name(&self) -> &str;

    /// Baixa e decodifica o recurso em `uri`.
    async fn fetch_and_decode(&self, uri: &str) -> CidadeResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CidadeError;

    struct RejectAll;

    #[async_trait]
    impl ImageFetcher for RejectAll {
        fn name(&self) -> &str {
            "reject"
        }

        async fn fetch_and_decode(&self, uri: &str) -> CidadeResult<()> {
            Err(CidadeError::InvalidUri(uri.to_string()))
        }
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let fetcher: Box<dyn ImageFetcher> = Box::new(RejectAll);

        let result = fetcher.fetch_and_decode("ftp://x").await;

        assert_eq!(fetcher.name(), "reject");
        assert!(matches!(result, Err(CidadeError::InvalidUri(_))));
    }
}
