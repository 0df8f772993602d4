// Server configuration: command-line flags with environment fallbacks

use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram recipe sharing API server")]
pub struct ServerConfig {
    /// SQLite database file
    #[arg(long, env = "FOODGRAM_DATABASE", default_value = "foodgram.db")]
    pub database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "FOODGRAM_BIND", default_value = "0.0.0.0:8000")]
    pub bind: String,

    /// Default number of results per page
    #[arg(long, env = "FOODGRAM_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: i64,

    /// Emit logs as JSON lines
    #[arg(long, env = "FOODGRAM_LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    /// Page size clamped to what the paginator accepts
    pub fn effective_page_size(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}
