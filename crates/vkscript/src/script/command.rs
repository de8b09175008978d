//! Commands recorded from the `[test]` section
//!
//! Commands execute in source order. Draw and dispatch operations reference
//! their pipeline variant by index into the script's deduplicated key list;
//! payload-carrying operations own their bytes.

use crate::script::data_type::{CompareOp, DataType, Tolerance};

/// One `[test]` line, tagged with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// 1-based source line
    pub line: u32,
    /// What to do
    pub op: Operation,
}

/// The operation of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Draw a screen-space rectangle with generated vertices
    DrawRect {
        /// Pipeline key index
        key: usize,
        /// Left edge
        x: f32,
        /// Top edge
        y: f32,
        /// Width
        w: f32,
        /// Height
        h: f32,
    },
    /// Draw from the `[vertex data]` buffer
    DrawArrays {
        /// Pipeline key index (carries the topology)
        key: usize,
        /// Use the `[indices]` buffer
        indexed: bool,
        /// First vertex
        first_vertex: u32,
        /// Vertex count
        vertex_count: u32,
        /// Instance count, 1 unless `instanced`
        instance_count: u32,
    },
    /// Dispatch a compute grid
    DispatchCompute {
        /// Pipeline key index
        key: usize,
        /// Workgroups in x
        x: u32,
        /// Workgroups in y
        y: u32,
        /// Workgroups in z
        z: u32,
    },
    /// Assert framebuffer contents over a rectangle
    ProbeRect {
        /// 3 for `rgb`, 4 for `rgba`
        n_components: u32,
        /// Left edge in pixels, origin top-left
        x: u32,
        /// Top edge in pixels
        y: u32,
        /// Width in pixels
        w: u32,
        /// Height in pixels
        h: u32,
        /// Expected colour, unused channels zero
        color: [f64; 4],
        /// Per-channel deviation in effect at the probe line
        tolerance: Tolerance,
    },
    /// Assert storage buffer contents
    ProbeSsbo {
        /// Descriptor set
        desc_set: u32,
        /// Binding
        binding: u32,
        /// Byte offset into the buffer
        offset: usize,
        /// Comparison operator
        op: CompareOp,
        /// Value type of the reference data
        data_type: DataType,
        /// Tight-packed reference values
        data: Vec<u8>,
        /// Tolerance for the `~=` operator
        tolerance: Tolerance,
    },
    /// Write bytes into a uniform or storage buffer
    SetBufferSubdata {
        /// Descriptor set
        desc_set: u32,
        /// Binding
        binding: u32,
        /// Byte offset of the write
        offset: usize,
        /// Encoded payload
        data: Vec<u8>,
    },
    /// Write bytes into the push-constant range
    SetPushConstant {
        /// Byte offset of the write
        offset: usize,
        /// Encoded payload
        data: Vec<u8>,
    },
    /// Clear the framebuffer with the captured clear state
    Clear {
        /// Clear colour
        color: [f32; 4],
        /// Depth clear value
        depth: f32,
        /// Stencil clear value
        stencil: u32,
    },
}

impl Operation {
    /// Pipeline key index, for operations that bind a pipeline
    pub fn key_index(&self) -> Option<usize> {
        match self {
            Operation::DrawRect { key, .. }
            | Operation::DrawArrays { key, .. }
            | Operation::DispatchCompute { key, .. } => Some(*key),
            _ => None,
        }
    }
}
