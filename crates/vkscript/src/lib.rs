//! # vkscript
//!
//! Declarative Vulkan shader testing: parse a `.shader_test` script into an
//! immutable [`script::Script`], compile its shaders through the external
//! SPIR-V toolchain, and assemble the Vulkan pipeline objects the test
//! needs: descriptor set layouts, pipeline layout, cache, and one pipeline
//! per deduplicated state key.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use vkscript::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let script = vkscript::script::parse_file("fill.shader_test")?;
//!     println!(
//!         "{}: {} commands, {} pipelines",
//!         script.filename,
//!         script.commands.len(),
//!         script.pipeline_keys.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Device bring-up, command execution and probe comparison live outside this
//! crate; it hands them a [`vulkan::PipelineSet`] and the script's command
//! list and stays a synchronous batch transformer.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod features;
pub mod formats;
pub mod pipeline;
pub mod script;
pub mod stage;
pub mod test_result;
pub mod tooling;
pub mod vulkan;

pub use test_result::TestResult;

/// Common imports for crate users
pub mod prelude {
    pub use crate::config::RunnerConfig;
    pub use crate::pipeline::{PipelineKey, PipelineType, VertexSource};
    pub use crate::script::{
        parse_file, parse_string, parser::parse_stream, stream::LineStream, BufferType,
        ParseError, Script, ShaderCode, SourceType, WindowFormat,
    };
    pub use crate::stage::Stage;
    pub use crate::test_result::TestResult;
    pub use crate::tooling::Toolchain;
    pub use crate::vulkan::{PipelineSet, StageModules};
}
