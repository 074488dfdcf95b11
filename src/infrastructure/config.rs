use super::assets::DEFAULT_ASSET_BASE_URL;
use anyhow::{Result, anyhow, bail};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    /// Prefix for asset paths while remote storage is enabled.
    pub asset_base_url: String,
    pub remote_storage: bool,
    pub save_dir: PathBuf,
    pub log_file: PathBuf,
    /// OD CSV to load at startup, relative to the asset base when remote.
    pub od_path: Option<String>,
    /// Routing response to load at startup, resolved the same way.
    pub route_path: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            remote_storage: true,
            save_dir: PathBuf::from("."),
            log_file: PathBuf::from("mapstack.log"),
            od_path: None,
            route_path: None,
        }
    }
}

const USAGE: &str = "Usage: mapstack [--assets <base-url>] [--save-dir <dir>] \
[--log <file>] [--od <path>] [--route <path>] [--local]";

impl EditorConfig {
    /// Parses command line arguments; `args[0]` is the program name.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Self::default();

        let mut idx = 1;
        while idx < args.len() {
            let flag = args[idx].as_str();
            match flag {
                "--assets" | "--save-dir" | "--log" | "--od" | "--route" => {
                    let value = args
                        .get(idx + 1)
                        .ok_or_else(|| anyhow!("{} requires a value\n\n{}", flag, USAGE))?
                        .clone();
                    match flag {
                        "--assets" => config.asset_base_url = value,
                        "--save-dir" => config.save_dir = PathBuf::from(value),
                        "--log" => config.log_file = PathBuf::from(value),
                        "--od" => config.od_path = Some(value),
                        _ => config.route_path = Some(value),
                    }
                    idx += 2;
                }
                "--local" => {
                    config.remote_storage = false;
                    idx += 1;
                }
                "-h" | "--help" => bail!(USAGE),
                other => bail!("Unknown argument: {}\n\n{}", other, USAGE),
            }
        }

        if config.asset_base_url.is_empty() {
            bail!("--assets must not be empty");
        }
        Ok(config)
    }
}
