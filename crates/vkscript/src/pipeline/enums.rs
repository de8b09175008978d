//! Vulkan enum name lookup
//!
//! Integer pipeline properties accept enumerant names (`topology
//! VK_PRIMITIVE_TOPOLOGY_PATCH_LIST`, `cullMode VK_CULL_MODE_FRONT_BIT |
//! VK_CULL_MODE_BACK_BIT`). The table below holds every accepted name in
//! ascending byte order so lookup is a binary search; `test_table_is_sorted`
//! guards the ordering.

use ash::vk;

/// Name to raw value, sorted by name
pub static ENUM_VALUES: &[(&str, i32)] = &[
    ("VK_BLEND_FACTOR_CONSTANT_ALPHA", 12),
    ("VK_BLEND_FACTOR_CONSTANT_COLOR", 10),
    ("VK_BLEND_FACTOR_DST_ALPHA", 8),
    ("VK_BLEND_FACTOR_DST_COLOR", 4),
    ("VK_BLEND_FACTOR_ONE", 1),
    ("VK_BLEND_FACTOR_ONE_MINUS_CONSTANT_ALPHA", 13),
    ("VK_BLEND_FACTOR_ONE_MINUS_CONSTANT_COLOR", 11),
    ("VK_BLEND_FACTOR_ONE_MINUS_DST_ALPHA", 9),
    ("VK_BLEND_FACTOR_ONE_MINUS_DST_COLOR", 5),
    ("VK_BLEND_FACTOR_ONE_MINUS_SRC1_ALPHA", 18),
    ("VK_BLEND_FACTOR_ONE_MINUS_SRC1_COLOR", 16),
    ("VK_BLEND_FACTOR_ONE_MINUS_SRC_ALPHA", 7),
    ("VK_BLEND_FACTOR_ONE_MINUS_SRC_COLOR", 3),
    ("VK_BLEND_FACTOR_SRC1_ALPHA", 17),
    ("VK_BLEND_FACTOR_SRC1_COLOR", 15),
    ("VK_BLEND_FACTOR_SRC_ALPHA", 6),
    ("VK_BLEND_FACTOR_SRC_ALPHA_SATURATE", 14),
    ("VK_BLEND_FACTOR_SRC_COLOR", 2),
    ("VK_BLEND_FACTOR_ZERO", 0),
    ("VK_BLEND_OP_ADD", 0),
    ("VK_BLEND_OP_MAX", 4),
    ("VK_BLEND_OP_MIN", 3),
    ("VK_BLEND_OP_REVERSE_SUBTRACT", 2),
    ("VK_BLEND_OP_SUBTRACT", 1),
    ("VK_COLOR_COMPONENT_A_BIT", 8),
    ("VK_COLOR_COMPONENT_B_BIT", 4),
    ("VK_COLOR_COMPONENT_G_BIT", 2),
    ("VK_COLOR_COMPONENT_R_BIT", 1),
    ("VK_COMPARE_OP_ALWAYS", 7),
    ("VK_COMPARE_OP_EQUAL", 2),
    ("VK_COMPARE_OP_GREATER", 4),
    ("VK_COMPARE_OP_GREATER_OR_EQUAL", 6),
    ("VK_COMPARE_OP_LESS", 1),
    ("VK_COMPARE_OP_LESS_OR_EQUAL", 3),
    ("VK_COMPARE_OP_NEVER", 0),
    ("VK_COMPARE_OP_NOT_EQUAL", 5),
    ("VK_CULL_MODE_BACK_BIT", 2),
    ("VK_CULL_MODE_FRONT_AND_BACK", 3),
    ("VK_CULL_MODE_FRONT_BIT", 1),
    ("VK_CULL_MODE_NONE", 0),
    ("VK_FALSE", 0),
    ("VK_FRONT_FACE_CLOCKWISE", 1),
    ("VK_FRONT_FACE_COUNTER_CLOCKWISE", 0),
    ("VK_LOGIC_OP_AND", 1),
    ("VK_LOGIC_OP_AND_INVERTED", 4),
    ("VK_LOGIC_OP_AND_REVERSE", 2),
    ("VK_LOGIC_OP_CLEAR", 0),
    ("VK_LOGIC_OP_COPY", 3),
    ("VK_LOGIC_OP_COPY_INVERTED", 12),
    ("VK_LOGIC_OP_EQUIVALENT", 9),
    ("VK_LOGIC_OP_INVERT", 10),
    ("VK_LOGIC_OP_NAND", 14),
    ("VK_LOGIC_OP_NOR", 8),
    ("VK_LOGIC_OP_NO_OP", 5),
    ("VK_LOGIC_OP_OR", 7),
    ("VK_LOGIC_OP_OR_INVERTED", 13),
    ("VK_LOGIC_OP_OR_REVERSE", 11),
    ("VK_LOGIC_OP_SET", 15),
    ("VK_LOGIC_OP_XOR", 6),
    ("VK_POLYGON_MODE_FILL", 0),
    ("VK_POLYGON_MODE_LINE", 1),
    ("VK_POLYGON_MODE_POINT", 2),
    ("VK_PRIMITIVE_TOPOLOGY_LINE_LIST", 1),
    ("VK_PRIMITIVE_TOPOLOGY_LINE_LIST_WITH_ADJACENCY", 6),
    ("VK_PRIMITIVE_TOPOLOGY_LINE_STRIP", 2),
    ("VK_PRIMITIVE_TOPOLOGY_LINE_STRIP_WITH_ADJACENCY", 7),
    ("VK_PRIMITIVE_TOPOLOGY_PATCH_LIST", 10),
    ("VK_PRIMITIVE_TOPOLOGY_POINT_LIST", 0),
    ("VK_PRIMITIVE_TOPOLOGY_TRIANGLE_FAN", 5),
    ("VK_PRIMITIVE_TOPOLOGY_TRIANGLE_LIST", 3),
    ("VK_PRIMITIVE_TOPOLOGY_TRIANGLE_LIST_WITH_ADJACENCY", 8),
    ("VK_PRIMITIVE_TOPOLOGY_TRIANGLE_STRIP", 4),
    ("VK_PRIMITIVE_TOPOLOGY_TRIANGLE_STRIP_WITH_ADJACENCY", 9),
    ("VK_STENCIL_OP_DECREMENT_AND_CLAMP", 4),
    ("VK_STENCIL_OP_DECREMENT_AND_WRAP", 7),
    ("VK_STENCIL_OP_INCREMENT_AND_CLAMP", 3),
    ("VK_STENCIL_OP_INCREMENT_AND_WRAP", 6),
    ("VK_STENCIL_OP_INVERT", 5),
    ("VK_STENCIL_OP_KEEP", 0),
    ("VK_STENCIL_OP_REPLACE", 2),
    ("VK_STENCIL_OP_ZERO", 1),
    ("VK_TRUE", 1),
];

/// Resolve an enumerant name to its raw value
pub fn lookup(name: &str) -> Option<i32> {
    ENUM_VALUES
        .binary_search_by(|(entry, _)| entry.cmp(&name))
        .ok()
        .map(|index| ENUM_VALUES[index].1)
}

/// Topology names accepted by `draw arrays`: the GL name (piglit
/// compatibility) or the Vulkan enumerant suffix
pub static TOPOLOGY_NAMES: &[(&str, vk::PrimitiveTopology)] = &[
    ("GL_POINTS", vk::PrimitiveTopology::POINT_LIST),
    ("GL_LINES", vk::PrimitiveTopology::LINE_LIST),
    ("GL_LINE_STRIP", vk::PrimitiveTopology::LINE_STRIP),
    ("GL_TRIANGLES", vk::PrimitiveTopology::TRIANGLE_LIST),
    ("GL_TRIANGLE_STRIP", vk::PrimitiveTopology::TRIANGLE_STRIP),
    ("GL_TRIANGLE_FAN", vk::PrimitiveTopology::TRIANGLE_FAN),
    ("GL_LINES_ADJACENCY", vk::PrimitiveTopology::LINE_LIST_WITH_ADJACENCY),
    ("GL_LINE_STRIP_ADJACENCY", vk::PrimitiveTopology::LINE_STRIP_WITH_ADJACENCY),
    ("GL_TRIANGLES_ADJACENCY", vk::PrimitiveTopology::TRIANGLE_LIST_WITH_ADJACENCY),
    ("GL_TRIANGLE_STRIP_ADJACENCY", vk::PrimitiveTopology::TRIANGLE_STRIP_WITH_ADJACENCY),
    ("GL_PATCHES", vk::PrimitiveTopology::PATCH_LIST),
    ("POINT_LIST", vk::PrimitiveTopology::POINT_LIST),
    ("LINE_LIST", vk::PrimitiveTopology::LINE_LIST),
    ("LINE_STRIP", vk::PrimitiveTopology::LINE_STRIP),
    ("TRIANGLE_LIST", vk::PrimitiveTopology::TRIANGLE_LIST),
    ("TRIANGLE_STRIP", vk::PrimitiveTopology::TRIANGLE_STRIP),
    ("TRIANGLE_FAN", vk::PrimitiveTopology::TRIANGLE_FAN),
    ("LINE_LIST_WITH_ADJACENCY", vk::PrimitiveTopology::LINE_LIST_WITH_ADJACENCY),
    ("LINE_STRIP_WITH_ADJACENCY", vk::PrimitiveTopology::LINE_STRIP_WITH_ADJACENCY),
    ("TRIANGLE_LIST_WITH_ADJACENCY", vk::PrimitiveTopology::TRIANGLE_LIST_WITH_ADJACENCY),
    ("TRIANGLE_STRIP_WITH_ADJACENCY", vk::PrimitiveTopology::TRIANGLE_STRIP_WITH_ADJACENCY),
    ("PATCH_LIST", vk::PrimitiveTopology::PATCH_LIST),
];

/// Resolve a `draw arrays` topology name
pub fn lookup_topology(name: &str) -> Option<vk::PrimitiveTopology> {
    TOPOLOGY_NAMES
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, topology)| *topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in ENUM_VALUES.windows(2) {
            assert!(
                pair[0].0 < pair[1].0,
                "{} must sort before {}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("VK_PRIMITIVE_TOPOLOGY_PATCH_LIST"), Some(10));
        assert_eq!(lookup("VK_BLEND_FACTOR_ONE_MINUS_SRC_ALPHA"), Some(7));
        assert_eq!(lookup("VK_CULL_MODE_FRONT_AND_BACK"), Some(3));
        assert_eq!(lookup("VK_TRUE"), Some(1));
        assert_eq!(lookup("VK_BLEND_FACTOR_ZERO"), Some(0));
        assert_eq!(lookup("VK_NOT_A_THING"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_values_match_ash() {
        assert_eq!(
            lookup("VK_STENCIL_OP_DECREMENT_AND_WRAP"),
            Some(vk::StencilOp::DECREMENT_AND_WRAP.as_raw())
        );
        assert_eq!(
            lookup("VK_COMPARE_OP_GREATER_OR_EQUAL"),
            Some(vk::CompareOp::GREATER_OR_EQUAL.as_raw())
        );
        assert_eq!(
            lookup("VK_LOGIC_OP_NO_OP"),
            Some(vk::LogicOp::NO_OP.as_raw())
        );
        assert_eq!(
            lookup("VK_COLOR_COMPONENT_A_BIT"),
            Some(vk::ColorComponentFlags::A.as_raw() as i32)
        );
    }

    #[test]
    fn test_topology_names() {
        assert_eq!(
            lookup_topology("GL_TRIANGLES"),
            Some(vk::PrimitiveTopology::TRIANGLE_LIST)
        );
        assert_eq!(
            lookup_topology("TRIANGLE_FAN"),
            Some(vk::PrimitiveTopology::TRIANGLE_FAN)
        );
        assert_eq!(lookup_topology("GL_QUADS"), None);
    }
}
