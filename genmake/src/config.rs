use std::path::Path;

use anyhow::bail;
use figment::{
    providers::{Format, Json, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::logging::LevelFilter;

/// The main struct holding all the possible config options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub general: General,
    pub toolchain: Toolchain,
    pub flags: Flags,
}

/// Which project to generate.
///
/// The values are passed on to the resolver unchecked, so that unsupported
/// values are reported the same way as unsupported command line arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    pub language: String,
    pub kind: String,
    pub extension: String,
    pub log_level: Option<LevelFilter>,
}

/// The cross compiler used by the generated Makefile.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Toolchain {
    /// Prepended to `gcc`, `g++`, `ar`, `objcopy`, `objdump` and `size`.
    pub prefix: String,
}

/// Compiler flags that do not depend on the device.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Flags {
    pub optimization: String,
    pub c_standard: String,
    pub cxx_standard: String,
}

const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// Config files searched in the working directory, without extension.
const CONFIG_FILES: &[&str] = &[".genmake", ".genmake.local"];

impl Config {
    /// Merges the built-in defaults, the config files found in `dir` and
    /// `extra`, in that order.
    pub fn load(dir: &Path, extra: Option<&Path>) -> anyhow::Result<Config> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        for file in CONFIG_FILES {
            figment = figment
                .merge(Toml::file(dir.join(format!("{file}.toml"))))
                .merge(Json::file(dir.join(format!("{file}.json"))))
                .merge(Yaml::file(dir.join(format!("{file}.yaml"))))
                .merge(Yaml::file(dir.join(format!("{file}.yml"))));
        }

        if let Some(extra) = extra {
            if !extra.is_file() {
                bail!("Config file '{}' does not exist.", extra.display());
            }
            figment = match extra.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(extra)),
                Some("json") => figment.merge(Json::file(extra)),
                Some("yml" | "yaml") => figment.merge(Yaml::file(extra)),
                _ => bail!(
                    "File format not recognized from extension (supported: .toml, .json, .yaml / .yml)"
                ),
            };
        }

        match figment.extract::<Config>() {
            Ok(config) => Ok(config),
            Err(errors) => bail!(
                "Failed to parse supplied configuration:\n{}",
                errors
                    .into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join("\n")
            ),
        }
    }
}
