use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

pub fn validate_tsv_or_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

pub fn write_bytes_to_file(path: &str, bytes: &[u8]) -> std::io::Result<()> {
    let path = Path::new(path);
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}

/// Read a JSON config file into a loose value so missing fields can fall
/// back to defaults one by one.
pub fn read_partial_config(path: &Path) -> Result<serde_json::Value> {
    let config_json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    serde_json::from_str(&config_json)
        .with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Print the default config when no config file was given.
pub fn print_config_template<T: Serialize>(config: &T) -> Result<()> {
    eprintln!("No config file provided; using defaults. Template:");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Overwrite `$config.$field` with the value from `$partial` when present and
/// valid, warning otherwise.
macro_rules! load_or_default {
    ($config:ident, $partial:ident, $field:ident) => {
        if let Some(val) = $partial.get(stringify!($field)) {
            if let Ok(parsed) = serde_json::from_value(val.clone()) {
                $config.$field = parsed;
            } else {
                log::warn!(
                    "Config Invalid value for '{}', using default: {:?}",
                    stringify!($field),
                    $config.$field
                );
            }
        } else {
            log::warn!(
                "Config Missing field '{}', using default: {:?}",
                stringify!($field),
                $config.$field
            );
        }
    };
}

pub(crate) use load_or_default;

#[cfg(test)]
mod tests {
    #[derive(Debug, Default)]
    struct Sample {
        port: u16,
        host: String,
    }

    #[test]
    fn load_or_default_keeps_default_on_bad_value() {
        let partial = serde_json::json!({"port": "not a port", "host": "0.0.0.0"});
        let mut config = Sample {
            port: 5000,
            ..Default::default()
        };
        load_or_default!(config, partial, port);
        load_or_default!(config, partial, host);
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
    }
}
