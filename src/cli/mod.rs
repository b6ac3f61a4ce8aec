//! Interface de linha de comando do Cidade Conectada.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::CONFIG_FILE_NAME;

/// cidade - pré-carga e cache de imagens do Cidade Conectada.
#[derive(Parser, Debug)]
#[command(name = "cidade")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Configura opções interativamente.
    Config,

    /// Pré-carrega imagens e mostra o resultado de cada URL.
    Preload {
        /// URLs (http, https ou file).
        urls: Vec<String>,

        /// Arquivo com uma URL por linha (`#` comenta).
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Saída em JSON.
        #[arg(long)]
        json: bool,

        /// Cargas simultâneas (sobrescreve o config).
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Mostra versão.
    Version,
}
