//! Runner configuration
//!
//! Covers the pieces that vary per machine rather than per script: which
//! shader tool binaries to invoke, the SPIR-V target environment and
//! whether to dump disassembly. Loadable from TOML or RON by file
//! extension; every field has a sensible default so no file is required.

use serde::{Deserialize, Serialize};

use thiserror::Error;

/// Configuration load/store errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// File contents did not parse
    #[error("parse error: {0}")]
    Parse(String),
    /// Extension is neither `.toml` nor `.ron`
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Tunable runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// GLSL compiler binary
    pub glslang_validator: String,
    /// SPIR-V assembler binary
    pub spirv_as: String,
    /// SPIR-V disassembler binary
    pub spirv_dis: String,
    /// `--target-env` value passed to the tools
    pub target_env: String,
    /// Dump disassembly of every compiled stage
    pub dump_disassembly: bool,
}

impl Default for RunnerConfig {
    fn default() -> RunnerConfig {
        RunnerConfig {
            glslang_validator: "glslangValidator".to_string(),
            spirv_as: "spirv-as".to_string(),
            spirv_dis: "spirv-dis".to_string(),
            target_env: "vulkan1.0".to_string(),
            dump_disassembly: false,
        }
    }
}

impl RunnerConfig {
    /// Load from a `.toml` or `.ron` file
    pub fn load_from_file(path: &str) -> Result<RunnerConfig, ConfigError> {
        if !path.ends_with(".toml") && !path.ends_with(".ron") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Save to a `.toml` or `.ron` file
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.glslang_validator, "glslangValidator");
        assert_eq!(config.target_env, "vulkan1.0");
        assert!(!config.dump_disassembly);
    }

    #[test]
    fn test_partial_toml() {
        let config: RunnerConfig =
            toml::from_str("target_env = \"vulkan1.1\"").unwrap();
        assert_eq!(config.target_env, "vulkan1.1");
        assert_eq!(config.spirv_as, "spirv-as");
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            RunnerConfig::load_from_file("config.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
