use std::{
    fs::File,
    io::BufReader,
    net::{Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use crate::foundation::{
    core::AnimationParams,
    error::{LissajousError, LissajousResult},
};

/// Process configuration for the HTTP server.
///
/// Loaded once at start-up from an optional JSON file; CLI flags override individual fields.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen: SocketAddr,
    /// How long in-flight responses may run after a termination signal, in milliseconds.
    pub grace_period_ms: u64,
    /// Animation constants shared by every request.
    pub animation: AnimationParams,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000)),
            grace_period_ms: 5_000,
            animation: AnimationParams::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> LissajousResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| LissajousError::validation(format!("parse server config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> LissajousResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LissajousError::validation(format!("open server config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> LissajousResult<()> {
        self.animation.validate()
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}
