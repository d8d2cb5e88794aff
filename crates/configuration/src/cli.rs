use crate::settings::Settings;
use clap::Args;
use std::path::PathBuf;

/// Command-line overrides for the HTTP server. Flags win over both
/// `config.toml` and the environment.
#[derive(Debug, Clone, Default, Args)]
pub struct ServerArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Allowed CORS origin(s), comma-separated, or * (overrides CORS_ORIGIN).
    #[arg(long)]
    pub cors_origin: Option<String>,

    /// Directory of static assets (overrides STATIC_DIR).
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

impl ServerArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(origin) = &self.cors_origin {
            settings.server.cors_origin = origin.clone();
        }
        if let Some(dir) = &self.static_dir {
            settings.server.static_dir = dir.clone();
        }
    }
}
