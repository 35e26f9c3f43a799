use std::{collections::HashMap, fs, time::Duration};

use algo_store::{ActivityOdds, DEFAULT_ORDER_PROBABILITY, DEFAULT_TRADE_PROBABILITY};

use crate::simulator::SimulatorConfig;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_bind: String,
    pub seed_file: Option<String>,
    pub tick_interval_ms: u64,
    pub rng_seed: Option<u64>,
    pub order_probability: f64,
    pub trade_probability: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            seed_file: None,
            tick_interval_ms: 1000,
            rng_seed: None,
            order_probability: DEFAULT_ORDER_PROBABILITY,
            trade_probability: DEFAULT_TRADE_PROBABILITY,
        }
    }
}

impl Settings {
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            odds: ActivityOdds::new(self.order_probability, self.trade_probability),
            rng_seed: self.rng_seed,
        }
    }
}

pub fn load_settings() -> Settings {
    let file_cfg = fs::read_to_string(SETTINGS_FILE)
        .ok()
        .and_then(|raw| parse_settings_file(&raw));
    resolve_settings(file_cfg.as_ref(), |key| std::env::var(key).ok())
}

/// Flattens `server.toml` into strings so file values and env values share
/// one parsing path. Returns `None` when the file is not valid TOML.
pub fn parse_settings_file(raw: &str) -> Option<HashMap<String, String>> {
    let table = toml::from_str::<HashMap<String, toml::Value>>(raw).ok()?;
    Some(
        table
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
    )
}

/// Defaults, then the settings file, then environment. Later sources win;
/// unparsable numbers are ignored.
pub fn resolve_settings(
    file_cfg: Option<&HashMap<String, String>>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(file_cfg) = file_cfg {
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("seed_file") {
            settings.seed_file = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("tick_interval_ms") {
            set_parsed(&mut settings.tick_interval_ms, v);
        }
        if let Some(v) = file_cfg.get("rng_seed") {
            if let Ok(parsed) = v.parse::<u64>() {
                settings.rng_seed = Some(parsed);
            }
        }
        if let Some(v) = file_cfg.get("order_probability") {
            set_parsed(&mut settings.order_probability, v);
        }
        if let Some(v) = file_cfg.get("trade_probability") {
            set_parsed(&mut settings.trade_probability, v);
        }
    }

    if let Some(v) = env("PORT") {
        if let Ok(port) = v.trim().parse::<u16>() {
            settings.server_bind = with_port(&settings.server_bind, port);
        }
    }
    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__SEED_FILE") {
        settings.seed_file = Some(v);
    }

    if let Some(v) = env("APP__TICK_INTERVAL_MS") {
        set_parsed(&mut settings.tick_interval_ms, &v);
    }

    if let Some(v) = env("APP__RNG_SEED") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.rng_seed = Some(parsed);
        }
    }

    if let Some(v) = env("APP__ORDER_PROBABILITY") {
        set_parsed(&mut settings.order_probability, &v);
    }
    if let Some(v) = env("APP__TRADE_PROBABILITY") {
        set_parsed(&mut settings.trade_probability, &v);
    }

    settings
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, raw: &str) {
    if let Ok(parsed) = raw.trim().parse::<T>() {
        *slot = parsed;
    }
}

fn with_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None => format!("{bind}:{port}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
