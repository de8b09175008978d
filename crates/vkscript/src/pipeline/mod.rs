//! Declarative pipeline state
//!
//! The pipeline key mirrors the scalar fields of the Vulkan graphics
//! pipeline create-info tree as a flat property bag; the enum table resolves
//! the enumerant names scripts use as property values.

pub mod enums;
pub mod key;
pub mod properties;

pub use key::{KeyError, PipelineKey, PipelineType, VertexSource};
pub use properties::{FixedFunctionState, PropKind, PropValue};
