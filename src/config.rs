//! Server configuration from the environment.
//!
//! `HOST` (default 0.0.0.0), `PORT` (default 8080) and optional `TOURNAMENT_SEED`, which
//! makes bracket draws and group splits reproducible. Log filtering uses `RUST_LOG`.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            seed: lookup("TOURNAMENT_SEED").and_then(|s| s.parse().ok()),
        }
    }

    /// Random source for the hub: seeded when configured, else from OS entropy.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
