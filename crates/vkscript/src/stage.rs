//! Shader pipeline stages

use ash::vk;

/// The six shader stages a script can provide code for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Vertex shader
    Vertex,
    /// Tessellation control shader
    TessCtrl,
    /// Tessellation evaluation shader
    TessEval,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
    /// Compute shader
    Compute,
}

impl Stage {
    /// Number of stages
    pub const COUNT: usize = 6;

    /// All stages in pipeline order
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Vertex,
        Stage::TessCtrl,
        Stage::TessEval,
        Stage::Geometry,
        Stage::Fragment,
        Stage::Compute,
    ];

    /// Stable index for per-stage arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in section headers and entrypoint lines
    pub fn script_name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::TessCtrl => "tessellation control",
            Stage::TessEval => "tessellation evaluation",
            Stage::Geometry => "geometry",
            Stage::Fragment => "fragment",
            Stage::Compute => "compute",
        }
    }

    /// File extension `glslangValidator` infers the stage from
    pub fn glsl_extension(self) -> &'static str {
        match self {
            Stage::Vertex => "vert",
            Stage::TessCtrl => "tesc",
            Stage::TessEval => "tese",
            Stage::Geometry => "geom",
            Stage::Fragment => "frag",
            Stage::Compute => "comp",
        }
    }

    /// The matching Vulkan stage bit
    pub fn vk_flags(self) -> vk::ShaderStageFlags {
        match self {
            Stage::Vertex => vk::ShaderStageFlags::VERTEX,
            Stage::TessCtrl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            Stage::TessEval => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            Stage::Geometry => vk::ShaderStageFlags::GEOMETRY,
            Stage::Fragment => vk::ShaderStageFlags::FRAGMENT,
            Stage::Compute => vk::ShaderStageFlags::COMPUTE,
        }
    }

    /// True for the tessellation pair
    pub fn is_tessellation(self) -> bool {
        matches!(self, Stage::TessCtrl | Stage::TessEval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Stage::TessEval.glsl_extension(), "tese");
        assert_eq!(Stage::Compute.glsl_extension(), "comp");
    }
}
