//! Fixed-function pipeline state as a flat property table
//!
//! Scripts set pipeline state by flat field name (`topology`,
//! `front.compareOp`, ...). Each table entry knows its value kind, its
//! baseline default and how to write its slot into the owning Vulkan
//! create-info struct. The slot array in a pipeline key is parallel to this
//! table, so equality of keys is equality of slots, and two equal keys
//! serialise to byte-equal create-infos.

use ash::vk;

/// Value kinds a property slot can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    /// `true` / `false` / integer
    Bool,
    /// Integer or `|`-combined enumerant names
    Int,
    /// Float with hex-exact support
    Float,
}

/// One property slot value
#[derive(Debug, Clone, Copy)]
pub enum PropValue {
    /// Boolean state toggle
    Bool(bool),
    /// Raw integer / enum / flag bits
    Int(u32),
    /// Float state value
    Float(f32),
}

impl PropValue {
    /// The integer payload; internal misuse is a programming error
    pub fn as_int(self) -> u32 {
        match self {
            PropValue::Int(v) => v,
            _ => unreachable!("property slot is not an int"),
        }
    }

    /// The boolean payload as a Vulkan bool
    pub fn as_bool32(self) -> vk::Bool32 {
        match self {
            PropValue::Bool(true) => vk::TRUE,
            PropValue::Bool(false) => vk::FALSE,
            _ => unreachable!("property slot is not a bool"),
        }
    }

    /// The float payload
    pub fn as_float(self) -> f32 {
        match self {
            PropValue::Float(v) => v,
            _ => unreachable!("property slot is not a float"),
        }
    }
}

// Floats compare by bit pattern so key equality stays reflexive even for
// NaN patterns pinned with the hex form.
impl PartialEq for PropValue {
    fn eq(&self, other: &PropValue) -> bool {
        match (self, other) {
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for PropValue {}

/// The fixed-function sub-structs a key serialises into.
///
/// `color_blend` does not point at `blend_attachment` here; the assembler
/// wires `pAttachments` when it owns both at a stable address.
pub struct FixedFunctionState {
    /// `VkPipelineInputAssemblyStateCreateInfo`
    pub input_assembly: vk::PipelineInputAssemblyStateCreateInfo,
    /// `VkPipelineTessellationStateCreateInfo`
    pub tessellation: vk::PipelineTessellationStateCreateInfo,
    /// `VkPipelineRasterizationStateCreateInfo`
    pub rasterization: vk::PipelineRasterizationStateCreateInfo,
    /// `VkPipelineColorBlendStateCreateInfo` (single attachment)
    pub color_blend: vk::PipelineColorBlendStateCreateInfo,
    /// The one `VkPipelineColorBlendAttachmentState`
    pub blend_attachment: vk::PipelineColorBlendAttachmentState,
    /// `VkPipelineDepthStencilStateCreateInfo`
    pub depth_stencil: vk::PipelineDepthStencilStateCreateInfo,
}

impl Default for FixedFunctionState {
    fn default() -> FixedFunctionState {
        FixedFunctionState {
            input_assembly: vk::PipelineInputAssemblyStateCreateInfo::default(),
            tessellation: vk::PipelineTessellationStateCreateInfo::default(),
            rasterization: vk::PipelineRasterizationStateCreateInfo::default(),
            color_blend: vk::PipelineColorBlendStateCreateInfo::default(),
            blend_attachment: vk::PipelineColorBlendAttachmentState::default(),
            depth_stencil: vk::PipelineDepthStencilStateCreateInfo::default(),
        }
    }
}

/// A registered pipeline property
pub struct Property {
    /// Flat name as written in scripts
    pub name: &'static str,
    /// Accepted value kind
    pub kind: PropKind,
    /// Baseline value before any script line touches the key
    pub default: PropValue,
    /// Write the slot into the create-info tree
    pub apply: fn(&mut FixedFunctionState, PropValue),
}

macro_rules! properties {
    ($( $name:literal : $kind:ident = $default:expr => $apply:expr ),+ $(,)?) => {
        /// Every settable fixed-function property, in registration order
        pub static PROPERTIES: &[Property] = &[
            $(
                Property {
                    name: $name,
                    kind: PropKind::$kind,
                    default: $default,
                    apply: $apply,
                }
            ),+
        ];
    };
}

const fn int(v: i32) -> PropValue {
    PropValue::Int(v as u32)
}

const fn bits(v: u32) -> PropValue {
    PropValue::Int(v)
}

properties! {
    // VkPipelineInputAssemblyStateCreateInfo
    "topology": Int = int(vk::PrimitiveTopology::TRIANGLE_STRIP.as_raw())
        => |s, v| s.input_assembly.topology = vk::PrimitiveTopology::from_raw(v.as_int() as i32),
    "primitiveRestartEnable": Bool = PropValue::Bool(false)
        => |s, v| s.input_assembly.primitive_restart_enable = v.as_bool32(),

    // VkPipelineTessellationStateCreateInfo
    "patchControlPoints": Int = bits(0)
        => |s, v| s.tessellation.patch_control_points = v.as_int(),

    // VkPipelineRasterizationStateCreateInfo
    "depthClampEnable": Bool = PropValue::Bool(false)
        => |s, v| s.rasterization.depth_clamp_enable = v.as_bool32(),
    "rasterizerDiscardEnable": Bool = PropValue::Bool(false)
        => |s, v| s.rasterization.rasterizer_discard_enable = v.as_bool32(),
    "polygonMode": Int = int(vk::PolygonMode::FILL.as_raw())
        => |s, v| s.rasterization.polygon_mode = vk::PolygonMode::from_raw(v.as_int() as i32),
    "cullMode": Int = bits(vk::CullModeFlags::NONE.as_raw())
        => |s, v| s.rasterization.cull_mode = vk::CullModeFlags::from_raw(v.as_int()),
    "frontFace": Int = int(vk::FrontFace::COUNTER_CLOCKWISE.as_raw())
        => |s, v| s.rasterization.front_face = vk::FrontFace::from_raw(v.as_int() as i32),
    "depthBiasEnable": Bool = PropValue::Bool(false)
        => |s, v| s.rasterization.depth_bias_enable = v.as_bool32(),
    "depthBiasConstantFactor": Float = PropValue::Float(0.0)
        => |s, v| s.rasterization.depth_bias_constant_factor = v.as_float(),
    "depthBiasClamp": Float = PropValue::Float(0.0)
        => |s, v| s.rasterization.depth_bias_clamp = v.as_float(),
    "depthBiasSlopeFactor": Float = PropValue::Float(0.0)
        => |s, v| s.rasterization.depth_bias_slope_factor = v.as_float(),
    "lineWidth": Float = PropValue::Float(1.0)
        => |s, v| s.rasterization.line_width = v.as_float(),

    // VkPipelineColorBlendStateCreateInfo
    "logicOpEnable": Bool = PropValue::Bool(false)
        => |s, v| s.color_blend.logic_op_enable = v.as_bool32(),
    "logicOp": Int = int(vk::LogicOp::COPY.as_raw())
        => |s, v| s.color_blend.logic_op = vk::LogicOp::from_raw(v.as_int() as i32),

    // VkPipelineColorBlendAttachmentState, single attachment
    "blendEnable": Bool = PropValue::Bool(false)
        => |s, v| s.blend_attachment.blend_enable = v.as_bool32(),
    "srcColorBlendFactor": Int = int(vk::BlendFactor::ONE.as_raw())
        => |s, v| s.blend_attachment.src_color_blend_factor = vk::BlendFactor::from_raw(v.as_int() as i32),
    "dstColorBlendFactor": Int = int(vk::BlendFactor::ZERO.as_raw())
        => |s, v| s.blend_attachment.dst_color_blend_factor = vk::BlendFactor::from_raw(v.as_int() as i32),
    "colorBlendOp": Int = int(vk::BlendOp::ADD.as_raw())
        => |s, v| s.blend_attachment.color_blend_op = vk::BlendOp::from_raw(v.as_int() as i32),
    "srcAlphaBlendFactor": Int = int(vk::BlendFactor::ONE.as_raw())
        => |s, v| s.blend_attachment.src_alpha_blend_factor = vk::BlendFactor::from_raw(v.as_int() as i32),
    "dstAlphaBlendFactor": Int = int(vk::BlendFactor::ZERO.as_raw())
        => |s, v| s.blend_attachment.dst_alpha_blend_factor = vk::BlendFactor::from_raw(v.as_int() as i32),
    "alphaBlendOp": Int = int(vk::BlendOp::ADD.as_raw())
        => |s, v| s.blend_attachment.alpha_blend_op = vk::BlendOp::from_raw(v.as_int() as i32),
    "colorWriteMask": Int = bits(vk::ColorComponentFlags::RGBA.as_raw())
        => |s, v| s.blend_attachment.color_write_mask = vk::ColorComponentFlags::from_raw(v.as_int()),

    // VkPipelineDepthStencilStateCreateInfo
    "depthTestEnable": Bool = PropValue::Bool(false)
        => |s, v| s.depth_stencil.depth_test_enable = v.as_bool32(),
    "depthWriteEnable": Bool = PropValue::Bool(false)
        => |s, v| s.depth_stencil.depth_write_enable = v.as_bool32(),
    "depthCompareOp": Int = int(vk::CompareOp::LESS.as_raw())
        => |s, v| s.depth_stencil.depth_compare_op = vk::CompareOp::from_raw(v.as_int() as i32),
    "depthBoundsTestEnable": Bool = PropValue::Bool(false)
        => |s, v| s.depth_stencil.depth_bounds_test_enable = v.as_bool32(),
    "stencilTestEnable": Bool = PropValue::Bool(false)
        => |s, v| s.depth_stencil.stencil_test_enable = v.as_bool32(),
    "front.failOp": Int = int(vk::StencilOp::KEEP.as_raw())
        => |s, v| s.depth_stencil.front.fail_op = vk::StencilOp::from_raw(v.as_int() as i32),
    "front.passOp": Int = int(vk::StencilOp::KEEP.as_raw())
        => |s, v| s.depth_stencil.front.pass_op = vk::StencilOp::from_raw(v.as_int() as i32),
    "front.depthFailOp": Int = int(vk::StencilOp::KEEP.as_raw())
        => |s, v| s.depth_stencil.front.depth_fail_op = vk::StencilOp::from_raw(v.as_int() as i32),
    "front.compareOp": Int = int(vk::CompareOp::ALWAYS.as_raw())
        => |s, v| s.depth_stencil.front.compare_op = vk::CompareOp::from_raw(v.as_int() as i32),
    "front.compareMask": Int = bits(0xffff_ffff)
        => |s, v| s.depth_stencil.front.compare_mask = v.as_int(),
    "front.writeMask": Int = bits(0xffff_ffff)
        => |s, v| s.depth_stencil.front.write_mask = v.as_int(),
    "front.reference": Int = bits(0)
        => |s, v| s.depth_stencil.front.reference = v.as_int(),
    "back.failOp": Int = int(vk::StencilOp::KEEP.as_raw())
        => |s, v| s.depth_stencil.back.fail_op = vk::StencilOp::from_raw(v.as_int() as i32),
    "back.passOp": Int = int(vk::StencilOp::KEEP.as_raw())
        => |s, v| s.depth_stencil.back.pass_op = vk::StencilOp::from_raw(v.as_int() as i32),
    "back.depthFailOp": Int = int(vk::StencilOp::KEEP.as_raw())
        => |s, v| s.depth_stencil.back.depth_fail_op = vk::StencilOp::from_raw(v.as_int() as i32),
    "back.compareOp": Int = int(vk::CompareOp::ALWAYS.as_raw())
        => |s, v| s.depth_stencil.back.compare_op = vk::CompareOp::from_raw(v.as_int() as i32),
    "back.compareMask": Int = bits(0xffff_ffff)
        => |s, v| s.depth_stencil.back.compare_mask = v.as_int(),
    "back.writeMask": Int = bits(0xffff_ffff)
        => |s, v| s.depth_stencil.back.write_mask = v.as_int(),
    "back.reference": Int = bits(0)
        => |s, v| s.depth_stencil.back.reference = v.as_int(),
    "minDepthBounds": Float = PropValue::Float(0.0)
        => |s, v| s.depth_stencil.min_depth_bounds = v.as_float(),
    "maxDepthBounds": Float = PropValue::Float(0.0)
        => |s, v| s.depth_stencil.max_depth_bounds = v.as_float(),
}

/// Index of a property by flat name, case-sensitive
pub fn lookup(name: &str) -> Option<usize> {
    PROPERTIES.iter().position(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup("topology").is_some());
        assert!(lookup("Topology").is_none());
        assert!(lookup("front.compareOp").is_some());
        assert!(lookup("front.compareop").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        for (i, a) in PROPERTIES.iter().enumerate() {
            for b in &PROPERTIES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_defaults_match_kind() {
        for p in PROPERTIES {
            let matches = matches!(
                (p.kind, p.default),
                (PropKind::Bool, PropValue::Bool(_))
                    | (PropKind::Int, PropValue::Int(_))
                    | (PropKind::Float, PropValue::Float(_))
            );
            assert!(matches, "default kind mismatch for {}", p.name);
        }
    }

    #[test]
    fn test_apply_defaults() {
        let mut state = FixedFunctionState::default();
        for p in PROPERTIES {
            (p.apply)(&mut state, p.default);
        }
        assert_eq!(
            state.input_assembly.topology,
            vk::PrimitiveTopology::TRIANGLE_STRIP
        );
        assert_eq!(state.rasterization.line_width, 1.0);
        assert_eq!(state.rasterization.cull_mode, vk::CullModeFlags::NONE);
        assert_eq!(
            state.blend_attachment.color_write_mask,
            vk::ColorComponentFlags::RGBA
        );
        assert_eq!(state.depth_stencil.front.compare_op, vk::CompareOp::ALWAYS);
        assert_eq!(state.depth_stencil.back.write_mask, 0xffff_ffff);
        assert_eq!(state.depth_stencil.depth_compare_op, vk::CompareOp::LESS);
    }

    #[test]
    fn test_float_slot_equality_is_reflexive() {
        let nan = PropValue::Float(f32::from_bits(0x7fc0_0001));
        assert_eq!(nan, nan);
        assert_ne!(nan, PropValue::Float(1.0));
    }
}
