//! Render context for config templates

use camino::Utf8Path;
use dotkeep_core::{get_home_dir, recursive_merge, Config};
use serde_json::{json, Map, Value};

/// Key under which the runtime description is exposed to templates
pub const DEFAULT_DATA_KEY: &str = "dotkeep";

/// Runtime description available to every template as `dotkeep.*`
pub fn default_data(config: &Config, config_dir: &Utf8Path, version: &str) -> Map<String, Value> {
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default();
    let home_dir = get_home_dir().map(|p| p.into_string()).unwrap_or_default();

    let mut data = Map::new();
    data.insert(
        DEFAULT_DATA_KEY.to_string(),
        json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "username": username,
            "home_dir": home_dir,
            "source_dir": config.source_dir,
            "dest_dir": config.dest_dir,
            "config_dir": config_dir,
            "version": version,
        }),
    );
    data
}

/// Default data with the user's `data` table merged over it
pub fn template_data(config: &Config, config_dir: &Utf8Path, version: &str) -> Map<String, Value> {
    let mut data = default_data(config, config_dir, version);
    recursive_merge(&mut data, &config.data);
    data
}
