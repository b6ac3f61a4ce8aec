//! Implementação dos comandos CLI.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::{ImageCache, LoadOutcome};
use crate::fetch::HttpImageFetcher;
use crate::preload::{PreloadReport, PreloadSession};
use crate::types::config::{Config, CONFIG_FILE_NAME};
use crate::{CidadeError, CidadeResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> CidadeResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        // Sem terminal não há quem responda ao prompt.
        if !std::io::stdin().is_terminal() {
            println!("Configuration already exists at: {}", config_path.display());
            return Ok(());
        }
        if !super::interactive::confirm_overwrite(&config_path)? {
            println!("Configuration kept at: {}", config_path.display());
            return Ok(());
        }
    }

    Config::default_config().save(&config_path)?;

    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Adjust options: cidade config");
    println!("  2. Warm the cache: cidade preload https://.../banner.png");

    Ok(())
}

/// Configura opções interativamente.
pub async fn config_cmd(config_path: &Path) -> CidadeResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Pré-carrega as URLs informadas e imprime o resultado.
pub async fn preload(
    urls: Vec<String>,
    file: Option<PathBuf>,
    json: bool,
    max_concurrent: Option<usize>,
    config: &Config,
) -> CidadeResult<()> {
    let mut uris = urls;
    if let Some(path) = file {
        uris.extend(read_url_list(&path)?);
    }
    if uris.is_empty() {
        return Err(CidadeError::other(
            "Nenhuma URL informada (use argumentos ou --file)",
        ));
    }

    // Raiz de composição: um cache, uma sessão
    let fetcher = Arc::new(HttpImageFetcher::from_config(&config.fetcher)?);
    let cache = ImageCache::from_config(&config.cache, &config.fetcher, fetcher);
    let session = PreloadSession::new(cache.clone())
        .with_max_concurrent(max_concurrent.unwrap_or(config.preload.max_concurrent));

    tracing::debug!(
        "Cache: max_size={}, max_age={}s, eviction={}",
        cache.capacity(),
        cache.max_age().as_secs(),
        cache.eviction_policy()
    );

    let bar = if json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(uris.len() as u64);
        let style = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .map_err(|e| CidadeError::other(format!("template de progresso inválido: {}", e)))?;
        bar.set_style(style);
        bar
    };

    let report = session
        .preload_all_with_progress(&uris, |uri, _| {
            bar.set_message(uri.to_string());
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    if json {
        println!("{}", render_json(&report, &cache)?);
    } else {
        print_report(&report, &cache);
    }

    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("cidade {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Cache de pré-carga de imagens do Cidade Conectada");
}

/// Lê uma URL por linha, ignorando linhas vazias e comentários.
pub fn read_url_list(path: &Path) -> CidadeResult<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

fn render_json(report: &PreloadReport, cache: &ImageCache) -> CidadeResult<String> {
    let results: Vec<serde_json::Value> = report
        .outcomes
        .iter()
        .map(|(uri, outcome)| serde_json::json!({ "uri": uri, "outcome": outcome }))
        .collect();

    let body = serde_json::json!({
        "loaded": report.loaded_count(),
        "failed": report.failed_count(),
        "results": results,
        "cache": {
            "max_age_secs": cache.max_age().as_secs(),
            "eviction": cache.eviction_policy(),
        },
        "stats": cache.stats(),
    });

    Ok(serde_json::to_string_pretty(&body)?)
}

fn print_report(report: &PreloadReport, cache: &ImageCache) {
    let stats = cache.stats();
    for (uri, outcome) in &report.outcomes {
        let icon = match outcome {
            LoadOutcome::Loaded => "✓",
            LoadOutcome::Failed => "✗",
        };
        println!("  {} {}", icon, uri);
    }

    println!();
    println!(
        "{} carregadas, {} falharam",
        report.loaded_count(),
        report.failed_count()
    );
    println!(
        "Cache: {}/{} entradas, {} downloads, {} acertos, {} remoções",
        stats.size, stats.capacity, stats.fetches, stats.hits, stats.evictions
    );
    println!(
        "Validade: {}s, remoção {}",
        cache.max_age().as_secs(),
        cache.eviction_policy()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::EvictionPolicy;

    #[test]
    fn test_read_url_list_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(
            &path,
            "# banners da home\nhttps://cidade.gov/a.png\n\n   https://cidade.gov/b.png  \n#fim\n",
        )
        .unwrap();

        let urls = read_url_list(&path).unwrap();

        assert_eq!(urls, vec!["https://cidade.gov/a.png", "https://cidade.gov/b.png"]);
    }

    #[test]
    fn test_render_json_shape() {
        let report = PreloadReport {
            outcomes: vec![
                ("a".to_string(), LoadOutcome::Loaded),
                ("b".to_string(), LoadOutcome::Failed),
            ],
        };
        let fetcher = Arc::new(HttpImageFetcher::new().unwrap());
        let cache = ImageCache::builder(fetcher)
            .max_size(50)
            .max_age(std::time::Duration::from_secs(600))
            .eviction(EvictionPolicy::Lru)
            .build();

        let rendered = render_json(&report, &cache).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["loaded"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["results"][1]["outcome"], "failed");
        assert_eq!(value["cache"]["max_age_secs"], 600);
        assert_eq!(value["cache"]["eviction"], "lru");
        assert_eq!(value["stats"]["capacity"], 50);
        assert_eq!(value["stats"]["size"], 0);
    }
}
