//! Server configuration: a TOML file layered under `MASIL_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use masil_core::region::RegionSeed;
use serde::Deserialize;

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  /// Region hierarchy seeded into the store at startup.
  #[serde(default)]
  pub regions:    Vec<RegionSeed>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

/// Read `path` (optional) and the environment into a [`ServerConfig`].
pub fn load(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("MASIL"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn parses_region_seeds() {
    let cfg = parse(
      r#"
      store_path = "/tmp/masil.db"

      [[regions]]
      name      = "Gyeonggi"
      districts = ["Suwon", "Seongnam"]

      [[regions]]
      name = "Sejong"
      "#,
    );

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.regions, vec![
      RegionSeed::new("Gyeonggi", ["Suwon", "Seongnam"]),
      RegionSeed::new("Sejong", Vec::<String>::new()),
    ]);
  }

  #[test]
  fn explicit_host_and_port_win() {
    let cfg = parse(
      r#"
      host       = "0.0.0.0"
      port       = 9000
      store_path = "masil.db"
      "#,
    );
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 9000);
    assert!(cfg.regions.is_empty());
  }

  #[test]
  fn tilde_is_left_alone_mid_path() {
    assert_eq!(expand_tilde(Path::new("data/~/x.db")), PathBuf::from("data/~/x.db"));
  }
}
