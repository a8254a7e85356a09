//! # Configuration
//!
//! Genesis configuration for the oracle module, loaded from TOML.
//!
//! ```toml
//! authority = "0x0101010101010101010101010101010101010101"
//!
//! [params]
//! max_calldata_size = 1024
//! max_data_source_count_per_request = 16
//! end_block_execute_gas_limit = 1000000
//! expiration_block_count = 100
//!
//! [[oracle_scripts]]
//! id = 1
//! owner = "0x0202020202020202020202020202020202020202"
//! name = "median price"
//! code = "0061736d"
//!
//! [[data_sources]]
//! id = 1
//! owner = "0x0202020202020202020202020202020202020202"
//! name = "exchange a"
//! executable = "2321"
//! ```
//!
//! Omitted `params` fields take their defaults. `code` and `executable` are
//! hex, with or without a `0x` prefix.

use crate::domain::{Address, DataSource, DataSourceId, OracleScript, OracleScriptId, Params};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid address {value:?}: {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: String, reason: String },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },
}

/// Registry entries and params written at genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenesisState {
    pub params: Params,
    pub oracle_scripts: Vec<(OracleScriptId, OracleScript)>,
    pub data_sources: Vec<(DataSourceId, DataSource)>,
}

/// Oracle module configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleConfig {
    /// Only this address may update params.
    pub authority: Address,
    pub genesis: GenesisState,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            authority: [0u8; 20],
            genesis: GenesisState::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    authority: String,
    #[serde(default)]
    params: Params,
    #[serde(default)]
    oracle_scripts: Vec<OracleScriptEntry>,
    #[serde(default)]
    data_sources: Vec<DataSourceEntry>,
}

#[derive(Debug, Deserialize)]
struct OracleScriptEntry {
    id: u64,
    owner: String,
    name: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct DataSourceEntry {
    id: u64,
    owner: String,
    name: String,
    #[serde(default)]
    executable: String,
}

impl OracleConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        file.params.validate().map_err(ConfigError::InvalidParams)?;
        let authority = parse_address(&file.authority)?;

        let mut oracle_scripts = Vec::with_capacity(file.oracle_scripts.len());
        for entry in file.oracle_scripts {
            if oracle_scripts.iter().any(|(id, _)| *id == OracleScriptId(entry.id)) {
                return Err(ConfigError::DuplicateId {
                    kind: "oracle script",
                    id: entry.id,
                });
            }
            let script = OracleScript {
                owner: parse_address(&entry.owner)?,
                name: entry.name,
                code: parse_hex("code", &entry.code)?,
            };
            oracle_scripts.push((OracleScriptId(entry.id), script));
        }

        let mut data_sources = Vec::with_capacity(file.data_sources.len());
        for entry in file.data_sources {
            if data_sources.iter().any(|(id, _)| *id == DataSourceId(entry.id)) {
                return Err(ConfigError::DuplicateId {
                    kind: "data source",
                    id: entry.id,
                });
            }
            let source = DataSource {
                owner: parse_address(&entry.owner)?,
                name: entry.name,
                executable: parse_hex("executable", &entry.executable)?,
            };
            data_sources.push((DataSourceId(entry.id), source));
        }

        Ok(Self {
            authority,
            genesis: GenesisState {
                params: file.params,
                oracle_scripts,
                data_sources,
            },
        })
    }
}

fn strip_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

fn parse_hex(field: &str, value: &str) -> Result<Vec<u8>, ConfigError> {
    hex::decode(strip_prefix(value)).map_err(|e| ConfigError::InvalidHex {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a 20-byte hex address.
fn parse_address(value: &str) -> Result<Address, ConfigError> {
    let bytes = hex::decode(strip_prefix(value)).map_err(|e| ConfigError::InvalidAddress {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::InvalidAddress {
            value: value.to_string(),
            reason: format!("expected 20 bytes, got {}", bytes.len()),
        })
}
