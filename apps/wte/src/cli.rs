use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wte_common::{GlobalConfig, GlobalConfigError, GlobalConfigPatch, RunMode};

#[derive(Parser)]
#[command(name = "wte", about = "Picks a random, decently rated restaurant near you")]
pub(crate) struct Cli {
    /// JSON config file; flags and env vars override its values.
    #[arg(long, env = "WTE_CONFIG", global = true)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, env = "MAPS_API_KEY", global = true, hide_env_values = true)]
    pub(crate) api_key: Option<String>,
    /// `tests` allows the provider registry to be reconfigured.
    #[arg(long, env = "ENV", global = true)]
    pub(crate) env: Option<RunMode>,
    #[arg(long, env = "WTE_PROXY", global = true)]
    pub(crate) proxy: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve the HTTP API and the web page.
    Serve(ServeArgs),
    /// Locate this machine over WiFi and print one restaurant.
    Find(FindArgs),
}

#[derive(Args)]
pub(crate) struct ServeArgs {
    #[arg(long, env = "HOST")]
    pub(crate) host: Option<String>,
    #[arg(long, env = "PORT")]
    pub(crate) port: Option<u16>,
}

#[derive(Args)]
pub(crate) struct FindArgs {
    /// Search radius in meters.
    #[arg(long, default_value_t = 3000)]
    pub(crate) radius: u32,
    /// Minimum price level, 0..=4.
    #[arg(long)]
    pub(crate) min_price: Option<i32>,
    #[arg(long, default_value_t = 2000)]
    pub(crate) page_delay_ms: u64,
    #[arg(long, default_value_t = 3)]
    pub(crate) max_pages: usize,
}

impl Cli {
    fn patch(&self) -> GlobalConfigPatch {
        let mut patch = GlobalConfigPatch {
            api_key: self.api_key.clone(),
            mode: self.env,
            proxy: self.proxy.clone(),
            ..Default::default()
        };
        if let Command::Serve(serve) = &self.command {
            patch.host = serve.host.clone();
            patch.port = serve.port;
        }
        patch
    }

    pub(crate) fn load_config(&self) -> Result<GlobalConfig, GlobalConfigError> {
        let mut merged = match &self.config {
            Some(path) => GlobalConfigPatch::from_json_file(path)?,
            None => GlobalConfigPatch::default(),
        };
        merged.overlay(self.patch());
        merged.into_config()
    }
}
