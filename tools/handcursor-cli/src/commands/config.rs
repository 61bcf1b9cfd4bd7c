//! Show or initialise the configuration file.

use handcursor_common::config::{config_file_path, AppConfig};

pub fn show(config: &AppConfig) -> anyhow::Result<()> {
    println!("# {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn init(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    let written = AppConfig::default().save()?;
    println!("Wrote default config to {}", written.display());
    Ok(())
}
