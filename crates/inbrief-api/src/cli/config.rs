//! `inbrief config` -- print the effective configuration.

use std::path::Path;

use inbrief_types::config::AppConfig;

pub fn show_config(config: &AppConfig, data_dir: &Path, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "data_dir": data_dir.display().to_string(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("# data dir: {}", data_dir.display());
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}
