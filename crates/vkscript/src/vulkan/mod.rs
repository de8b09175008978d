//! Vulkan object construction
//!
//! Consumes a parsed [`Script`](crate::script::Script) plus compiled shader
//! modules and produces the concrete pipeline objects the command executor
//! binds. Everything here owns its handles RAII-style and destroys them in
//! reverse construction order.

pub mod assembler;
pub mod shader;

use ash::vk;
use thiserror::Error;

pub use assembler::PipelineSet;
pub use shader::StageModules;

/// Failure while creating Vulkan objects
#[derive(Error, Debug)]
pub enum VulkanError {
    /// A `vkCreate*` call failed; `object` names what was being created
    #[error("failed to create {object}: {result:?}")]
    CreateFailure {
        /// Object kind, e.g. `"pipeline layout"`
        object: &'static str,
        /// The Vulkan result code
        result: vk::Result,
    },
}

/// Result type for Vulkan object construction
pub type VulkanResult<T> = Result<T, VulkanError>;

/// Vertex layout consumed by `draw rect` pipelines.
///
/// The executor expands each rectangle into four of these; scripts using
/// `[vertex data]` bypass this struct entirely.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RectVertex {
    /// X in normalised device coordinates
    pub x: f32,
    /// Y in normalised device coordinates
    pub y: f32,
    /// Z, constant zero
    pub z: f32,
}

impl RectVertex {
    /// The four corners of a rectangle as a triangle strip / quad patch
    pub fn corners(x: f32, y: f32, w: f32, h: f32) -> [RectVertex; 4] {
        [
            RectVertex { x, y, z: 0.0 },
            RectVertex { x: x + w, y, z: 0.0 },
            RectVertex { x, y: y + h, z: 0.0 },
            RectVertex { x: x + w, y: y + h, z: 0.0 },
        ]
    }

    /// Raw bytes of a vertex slice, ready for buffer upload
    pub fn bytes(vertices: &[RectVertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_vertex_layout() {
        assert_eq!(std::mem::size_of::<RectVertex>(), 12);
        let corners = RectVertex::corners(-1.0, -1.0, 2.0, 2.0);
        assert_eq!(corners[3], RectVertex { x: 1.0, y: 1.0, z: 0.0 });
        assert_eq!(RectVertex::bytes(&corners).len(), 48);
    }
}
