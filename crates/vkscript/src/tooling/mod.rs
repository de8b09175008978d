//! External shader toolchain
//!
//! GLSL sections are compiled with `glslangValidator` and SPIR-V assembly
//! sections with `spirv-as`, both invoked as child processes over temp
//! files. Binary names come from the runner configuration and can be
//! overridden per run with the `PIGLIT_GLSLANG_VALIDATOR_BINARY`,
//! `PIGLIT_SPIRV_AS_BINARY` and `PIGLIT_SPIRV_DIS_BINARY` environment
//! variables.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::config::RunnerConfig;
use crate::script::ShaderCode;
use crate::stage::Stage;

/// Failure while running an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool exited unsuccessfully; stderr is included verbatim
    #[error("{tool} failed: {stderr}")]
    Subprocess {
        /// Binary name as invoked
        tool: String,
        /// Captured standard error
        stderr: String,
    },
    /// A temp file or tool output could not be read or written
    #[error("{path}: {source}")]
    Io {
        /// The path involved
        path: PathBuf,
        /// The OS error
        source: io::Error,
    },
    /// Tool output was not valid SPIR-V
    #[error("{path}: output is not a whole number of SPIR-V words")]
    TruncatedSpirv {
        /// The output file
        path: PathBuf,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ToolError + '_ {
    move |source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Resolved tool binaries and target environment
#[derive(Debug, Clone)]
pub struct Toolchain {
    glslang_validator: String,
    spirv_as: String,
    spirv_dis: String,
    target_env: String,
}

fn env_override(var: &str, configured: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| configured.to_string())
}

impl Toolchain {
    /// Resolve binaries from the configuration plus environment overrides
    pub fn from_config(config: &RunnerConfig) -> Toolchain {
        Toolchain {
            glslang_validator: env_override(
                "PIGLIT_GLSLANG_VALIDATOR_BINARY",
                &config.glslang_validator,
            ),
            spirv_as: env_override("PIGLIT_SPIRV_AS_BINARY", &config.spirv_as),
            spirv_dis: env_override("PIGLIT_SPIRV_DIS_BINARY", &config.spirv_dis),
            target_env: config.target_env.clone(),
        }
    }

    /// Compile one stage's sections into SPIR-V words.
    ///
    /// GLSL fragments become separate compiler inputs and link into one
    /// module; assembly and binary stages hold exactly one section (the
    /// parser enforces this).
    pub fn compile_stage(&self, stage: Stage, code: &[ShaderCode]) -> Result<Vec<u32>, ToolError> {
        match code {
            [ShaderCode::SpirvBinary(words)] => Ok(words.clone()),
            [ShaderCode::SpirvAssembly(text)] => self.assemble(stage, text),
            _ => self.compile_glsl(stage, code),
        }
    }

    fn compile_glsl(&self, stage: Stage, code: &[ShaderCode]) -> Result<Vec<u32>, ToolError> {
        let mut temp = TempFiles::new();
        let mut inputs = Vec::new();
        for (i, section) in code.iter().enumerate() {
            let ShaderCode::Glsl(text) = section else {
                unreachable!("mixed source types in one stage");
            };
            let path = temp.create(&format!("{}-{}", i, stage.glsl_extension()), text)?;
            inputs.push(path);
        }
        let output = temp.path("out.spv");
        let mut command = Command::new(&self.glslang_validator);
        command
            .arg("-V")
            .arg("--target-env")
            .arg(&self.target_env)
            .arg("-S")
            .arg(stage.glsl_extension())
            .arg("-o")
            .arg(&output)
            .args(&inputs);
        self.run(command, &self.glslang_validator)?;
        read_spirv_words(&output)
    }

    fn assemble(&self, stage: Stage, text: &str) -> Result<Vec<u32>, ToolError> {
        let mut temp = TempFiles::new();
        let input = temp.create(&format!("{}.spvasm", stage.glsl_extension()), text)?;
        let output = temp.path("out.spv");
        let mut command = Command::new(&self.spirv_as);
        command
            .arg("--target-env")
            .arg(&self.target_env)
            .arg("-o")
            .arg(&output)
            .arg(&input);
        self.run(command, &self.spirv_as)?;
        read_spirv_words(&output)
    }

    /// Disassemble SPIR-V words for `-d` style dumps
    pub fn disassemble(&self, words: &[u32]) -> Result<String, ToolError> {
        let mut temp = TempFiles::new();
        let mut bytes = Vec::with_capacity(words.len() * 4);
        for word in words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let input = temp.path("dis.spv");
        std::fs::write(&input, &bytes).map_err(io_error(&input))?;
        temp.track(input.clone());
        let mut command = Command::new(&self.spirv_dis);
        command.arg(&input);
        let output = self.run(command, &self.spirv_dis)?;
        Ok(output)
    }

    fn run(&self, mut command: Command, tool: &str) -> Result<String, ToolError> {
        log::debug!("[TOOL] Running {:?}", command);
        let output = command.output().map_err(|source| ToolError::Io {
            path: PathBuf::from(tool),
            source,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            // glslangValidator reports errors on stdout
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            log::error!("[TOOL] {} failed: {}", tool, detail.trim());
            return Err(ToolError::Subprocess {
                tool: tool.to_string(),
                stderr: detail,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn read_spirv_words(path: &Path) -> Result<Vec<u32>, ToolError> {
    let bytes = std::fs::read(path).map_err(io_error(path))?;
    if bytes.len() % 4 != 0 {
        return Err(ToolError::TruncatedSpirv {
            path: path.to_path_buf(),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temp files removed again when the compile step ends
struct TempFiles {
    base: PathBuf,
    serial: u64,
    files: Vec<PathBuf>,
}

impl TempFiles {
    fn new() -> TempFiles {
        TempFiles {
            base: std::env::temp_dir(),
            serial: TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            files: Vec::new(),
        }
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.base.join(format!(
            "vkscript-{}-{}-{}",
            std::process::id(),
            self.serial,
            suffix
        ))
    }

    fn create(&mut self, suffix: &str, contents: &str) -> Result<PathBuf, ToolError> {
        let path = self.path(suffix);
        std::fs::write(&path, contents).map_err(io_error(&path))?;
        self.files.push(path.clone());
        Ok(path)
    }

    fn track(&mut self, path: PathBuf) {
        self.files.push(path);
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.files {
            let _ = std::fs::remove_file(path);
        }
        // the output file is created by the tool, not by us
        let _ = std::fs::remove_file(self.path("out.spv"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_passes_through() {
        let toolchain = Toolchain::from_config(&RunnerConfig::default());
        let words = toolchain
            .compile_stage(
                Stage::Fragment,
                &[ShaderCode::SpirvBinary(vec![0x0723_0203, 0x0001_0000])],
            )
            .unwrap();
        assert_eq!(words, vec![0x0723_0203, 0x0001_0000]);
    }

    #[test]
    fn test_missing_tool_is_io_error() {
        let config = RunnerConfig {
            glslang_validator: "vkscript-no-such-binary".to_string(),
            ..RunnerConfig::default()
        };
        let toolchain = Toolchain::from_config(&config);
        let result = toolchain.compile_stage(
            Stage::Vertex,
            &[ShaderCode::Glsl("void main() {}\n".to_string())],
        );
        match result {
            Err(ToolError::Io { .. }) => (),
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_temp_paths_are_distinct() {
        let a = TempFiles::new();
        let b = TempFiles::new();
        assert_ne!(a.path("x"), b.path("x"));
    }
}
