use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::{AppState, error::UpstreamError, ocm, ocm::OcmClient, ors, ors::OrsClient};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Routing, geocoding and charging-station API")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// OpenRouteService key, required for geocoding and routing
    #[arg(long, env = "ORS_API_KEY", hide_env_values = true)]
    pub ors_api_key: Option<String>,

    /// OpenChargeMap key, optional
    #[arg(long, env = "OCM_API_KEY", hide_env_values = true)]
    pub ocm_api_key: Option<String>,

    #[arg(long, env = "ORS_BASE_URL", default_value = ors::DEFAULT_BASE_URL)]
    pub ors_base_url: String,

    #[arg(long, env = "OCM_BASE_URL", default_value = ocm::DEFAULT_BASE_URL)]
    pub ocm_base_url: String,

    /// Directory with the built frontend, served for every non-API path
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn app_state(&self) -> Result<AppState, UpstreamError> {
        let ocm_api_key = self
            .ocm_api_key
            .clone()
            .or_else(|| std::env::var("OPENCHARGEMAP_API_KEY").ok());
        Ok(AppState {
            ors: OrsClient::new(&self.ors_base_url, self.ors_api_key.clone())?,
            ocm: OcmClient::new(&self.ocm_base_url, ocm_api_key)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["backend"]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.ors_base_url, ors::DEFAULT_BASE_URL);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "backend",
            "--addr",
            "127.0.0.1:3000",
            "--ors-api-key",
            "secret",
            "--ocm-base-url",
            "http://localhost:9000",
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.ors_api_key.as_deref(), Some("secret"));
        assert!(config.app_state().unwrap().ors.has_api_key());
    }
}
