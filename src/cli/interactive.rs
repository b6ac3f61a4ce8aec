//! Configuração interativa.
//!
//! Este módulo implementa a configuração interativa usando dialoguer.

use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::types::config::{Config, EvictionPolicy};
use crate::CidadeResult;

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> CidadeResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Configuração Interativa do Cidade Conectada\n");

    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Criando nova configuração...\n");
        Config::default_config()
    };

    loop {
        let options = vec![
            "Configurações Gerais",
            "Cache de Imagens",
            "Download",
            "Pré-carga",
            "Salvar e Sair",
            "Sair sem Salvar",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("O que deseja configurar?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_cache(&theme, &mut config)?,
            2 => configure_fetcher(&theme, &mut config)?,
            3 => configure_preload(&theme, &mut config)?,
            4 => {
                config.validate()?;
                config.save(config_path)?;
                println!("\n✓ Configuração salva em: {}\n", config_path.display());
                break;
            }
            5 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Deseja realmente sair sem salvar?")
                    .default(false)
                    .interact()?
                {
                    println!("\nSaindo sem salvar.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Pergunta se um arquivo existente pode ser sobrescrito.
pub fn confirm_overwrite(path: &Path) -> CidadeResult<bool> {
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} já existe. Sobrescrever?", path.display()))
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Configura opções gerais.
fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> CidadeResult<()> {
    println!("\n📋 Configurações Gerais\n");

    let log_levels = vec!["error", "warn", "info", "debug", "trace"];
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Nível de log")
        .items(&log_levels)
        .default(current_idx)
        .interact()?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    let log_formats = vec!["text", "json"];
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Formato de log")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ Configurações gerais atualizadas.\n");
    Ok(())
}

/// Configura o cache.
fn configure_cache(theme: &ColorfulTheme, config: &mut Config) -> CidadeResult<()> {
    println!("\n🖼️  Cache de Imagens\n");

    let max_size: usize = Input::with_theme(theme)
        .with_prompt("Máximo de imagens no cache")
        .default(config.cache.max_size)
        .validate_with(|n: &usize| if *n > 0 { Ok(()) } else { Err("deve ser maior que zero") })
        .interact_text()?;

    config.cache.max_size = max_size;

    let max_age_mins: u64 = Input::with_theme(theme)
        .with_prompt("Validade de cada entrada (minutos)")
        .default(config.cache.max_age_secs / 60)
        .interact_text()?;

    config.cache.max_age_secs = max_age_mins * 60;

    let policies = [EvictionPolicy::Fifo, EvictionPolicy::Lru];
    let labels = vec![
        "fifo - remove a mais antiga inserida",
        "lru - remove a menos acessada",
    ];
    let current = policies
        .iter()
        .position(|p| *p == config.cache.eviction)
        .unwrap_or(0);

    let idx = Select::with_theme(theme)
        .with_prompt("Política de remoção")
        .items(&labels)
        .default(current)
        .interact()?;

    config.cache.eviction = policies[idx];

    println!("\n✓ Cache configurado.\n");
    Ok(())
}

/// Configura o download.
fn configure_fetcher(theme: &ColorfulTheme, config: &mut Config) -> CidadeResult<()> {
    println!("\n🌐 Download\n");

    let timeout: u64 = Input::with_theme(theme)
        .with_prompt("Timeout por imagem (segundos, 0 = sem limite)")
        .default(config.fetcher.timeout_secs)
        .interact_text()?;

    config.fetcher.timeout_secs = timeout;

    let user_agent: String = Input::with_theme(theme)
        .with_prompt("User-Agent")
        .default(config.fetcher.user_agent.clone())
        .interact_text()?;

    config.fetcher.user_agent = user_agent;

    println!("\n✓ Download configurado.\n");
    Ok(())
}

/// Configura a pré-carga.
fn configure_preload(theme: &ColorfulTheme, config: &mut Config) -> CidadeResult<()> {
    println!("\n⚡ Pré-carga\n");

    let max_concurrent: usize = Input::with_theme(theme)
        .with_prompt("Cargas simultâneas por sessão")
        .default(config.preload.max_concurrent)
        .interact_text()?;

    config.preload.max_concurrent = max_concurrent.max(1);

    println!("\n✓ Pré-carga configurada.\n");
    Ok(())
}

/// Mostra um resumo da configuração atual.
pub fn show_config_summary(config: &Config) {
    println!("\n📊 Resumo da Configuração\n");

    println!("Geral:");
    println!("  Log: {} ({})", config.general.log_level, config.general.log_format);

    println!("\nCache:");
    println!("  Máximo: {} imagens", config.cache.max_size);
    println!("  Validade: {} min", config.cache.max_age_secs / 60);
    println!("  Remoção: {}", config.cache.eviction);

    println!("\nDownload:");
    match config.fetcher.timeout() {
        Some(t) => println!("  Timeout: {}s", t.as_secs()),
        None => println!("  Timeout: sem limite"),
    }
    println!("  User-Agent: {}", config.fetcher.user_agent);

    println!("\nPré-carga:");
    println!("  Simultâneas: {}", config.preload.max_concurrent);

    println!();
}
