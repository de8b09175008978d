//! Script model and parsing
//!
//! A script is a self-contained experiment: required device capabilities,
//! shader sources, vertex and index data, buffer declarations and the
//! command list. [`parser`] turns source text into an immutable [`Script`];
//! the pipeline assembler and the command executor consume it.

pub mod base64;
pub mod command;
pub mod data_type;
pub mod parse;
pub mod parser;
pub mod passthrough;
pub mod stream;
pub mod vbo;

use std::io;

use ash::vk;
use thiserror::Error;

use crate::features::FeatureSet;
use crate::pipeline::PipelineKey;
use crate::stage::Stage;
use command::Command;
use vbo::Vbo;

pub use parser::{parse_file, parse_string};

/// Framebuffer configuration, adjustable from the `[require]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFormat {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Colour attachment format
    pub color_format: vk::Format,
    /// Optional depth/stencil attachment format
    pub depth_stencil_format: Option<vk::Format>,
}

impl Default for WindowFormat {
    fn default() -> WindowFormat {
        WindowFormat {
            width: 250,
            height: 250,
            color_format: vk::Format::B8G8R8A8_UNORM,
            depth_stencil_format: None,
        }
    }
}

/// How a shader section's body is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// GLSL text handed to `glslangValidator`
    Glsl,
    /// SPIR-V assembly handed to `spirv-as`
    SpirvAssembly,
    /// Hex words used verbatim
    SpirvBinary,
}

/// One shader section body
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderCode {
    /// GLSL source text
    Glsl(String),
    /// SPIR-V assembly text
    SpirvAssembly(String),
    /// Pre-assembled SPIR-V words
    SpirvBinary(Vec<u32>),
}

impl ShaderCode {
    /// The section's source type
    pub fn source_type(&self) -> SourceType {
        match self {
            ShaderCode::Glsl(_) => SourceType::Glsl,
            ShaderCode::SpirvAssembly(_) => SourceType::SpirvAssembly,
            ShaderCode::SpirvBinary(_) => SourceType::SpirvBinary,
        }
    }
}

/// Buffer kind a script can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    /// Uniform buffer (`uniform ubo`)
    Ubo,
    /// Storage buffer (`ssbo`)
    Ssbo,
}

/// A buffer the runtime must allocate and bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferRequirement {
    /// Descriptor set
    pub desc_set: u32,
    /// Binding within the set
    pub binding: u32,
    /// Uniform or storage
    pub buffer_type: BufferType,
    /// Minimum byte size covering every declared write
    pub size: usize,
}

/// A parsed script, immutable once the parser returns it
#[derive(Debug)]
pub struct Script {
    /// Source path or fixture name, used in diagnostics
    pub filename: String,
    /// Framebuffer configuration
    pub window_format: WindowFormat,
    /// Required `VkPhysicalDeviceFeatures` bits
    pub required_features: FeatureSet,
    /// Required device extensions, in declaration order
    pub extensions: Vec<String>,
    /// Shader sources per stage
    pub stages: [Vec<ShaderCode>; Stage::COUNT],
    /// Optional `[vertex data]` buffer
    pub vertex_data: Option<Vbo>,
    /// `[indices]` contents
    pub indices: Vec<u16>,
    /// Declared buffers, sorted by `(desc_set, binding)`
    pub buffers: Vec<BufferRequirement>,
    /// The `[test]` command list, in source order
    pub commands: Vec<Command>,
    /// Deduplicated pipeline keys, in first-use order
    pub pipeline_keys: Vec<PipelineKey>,
}

impl Script {
    /// Shader code for one stage
    pub fn stage_code(&self, stage: Stage) -> &[ShaderCode] {
        &self.stages[stage.index()]
    }

    /// True when any stage other than compute has code
    pub fn has_graphics_stages(&self) -> bool {
        Stage::ALL
            .iter()
            .any(|s| *s != Stage::Compute && !self.stages[s.index()].is_empty())
    }

    /// Index buffer bytes, ready for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Largest `offset + size` over every push-constant write
    pub fn push_constant_size(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match &c.op {
                command::Operation::SetPushConstant { offset, data } => offset + data.len(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

/// What went wrong, without the source position
#[derive(Error, Debug)]
pub enum ParseErrorKind {
    /// Section name not recognised
    #[error("unknown section \"[{0}]\"")]
    UnknownSection(String),
    /// `[require]` after another section
    #[error("[require] must appear before any other section")]
    RequireNotFirst,
    /// Second `[vertex data]` section
    #[error("duplicate [vertex data] section")]
    DuplicateVertexData,
    /// Format name not in the format table
    #[error("unknown format \"{0}\"")]
    UnknownFormat(String),
    /// Malformed section header or directive shape
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// Same `(set, binding)` declared as both UBO and SSBO
    #[error("buffer {desc_set}:{binding} is already declared with a different type")]
    BufferBindingTypeMismatch {
        /// Descriptor set
        desc_set: u32,
        /// Binding
        binding: u32,
    },
    /// A value or command body that does not parse
    #[error("{0}")]
    InvalidValue(String),
    /// Token substitution did not terminate
    #[error("token replacement applied more than 1000 times on one line")]
    InfiniteRecursion,
    /// Script text was not valid UTF-8
    #[error("script source is not valid UTF-8")]
    InvalidUtf8,
    /// Underlying read failed
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

impl From<stream::StreamError> for ParseErrorKind {
    fn from(e: stream::StreamError) -> ParseErrorKind {
        match e {
            stream::StreamError::Io(io) => ParseErrorKind::Io(io),
            stream::StreamError::InvalidUtf8 => ParseErrorKind::InvalidUtf8,
            stream::StreamError::InfiniteRecursion => ParseErrorKind::InfiniteRecursion,
        }
    }
}

/// A parse failure pinned to its source position
#[derive(Error, Debug)]
#[error("{file}:{line}: {kind}")]
pub struct ParseError {
    /// Script path or fixture name
    pub file: String,
    /// 1-based line number
    pub line: u32,
    /// The failure
    pub kind: ParseErrorKind,
}
