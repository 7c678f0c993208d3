//! Environment configuration.

use rand::Rng;
use std::collections::HashMap;
use tournament_hub::ServerConfig;

fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn defaults_when_unset() {
    let config = config_from(&[]);
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.seed, None);
}

#[test]
fn reads_host_port_and_seed() {
    let config = config_from(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "9000"),
        ("TOURNAMENT_SEED", "7"),
    ]);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9000);
    assert_eq!(config.seed, Some(7));
}

#[test]
fn bad_port_falls_back() {
    assert_eq!(config_from(&[("PORT", "eighty")]).port, 8080);
}

#[test]
fn same_seed_same_draws() {
    let config = config_from(&[("TOURNAMENT_SEED", "99")]);
    let mut first = config.rng();
    let mut second = config.rng();
    let a: Vec<u64> = (0..4).map(|_| first.gen()).collect();
    let b: Vec<u64> = (0..4).map(|_| second.gen()).collect();
    assert_eq!(a, b);
}
