//! Pipeline keys: the declarative identity of one pipeline variant
//!
//! A key captures everything that distinguishes one pipeline from another:
//! graphics vs compute, how vertices are sourced, every fixed-function
//! property and the per-stage entrypoints. Commands reference keys by index
//! into the script's deduplicated key list, so key equality is what keeps
//! two identical `draw rect` lines on one Vulkan pipeline.

use thiserror::Error;

use crate::pipeline::enums;
use crate::pipeline::properties::{self, FixedFunctionState, PropKind, PropValue, PROPERTIES};
use crate::script::parse;
use crate::stage::Stage;

/// Whether a key describes a graphics or a compute pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineType {
    /// Graphics pipeline with the full fixed-function state
    Graphics,
    /// Compute pipeline; fixed-function slots are ignored
    Compute,
}

/// Where a graphics pipeline's vertices come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexSource {
    /// Positions generated by `draw rect`
    Rectangle,
    /// The script's `[vertex data]` section
    VertexData,
}

/// Failure while setting a property from script text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The value text does not parse for the property's kind
    #[error("invalid value for property {0}")]
    InvalidValue(&'static str),
}

/// Declarative pipeline identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineKey {
    pipeline_type: PipelineType,
    source: VertexSource,
    slots: Vec<PropValue>,
    entrypoints: [Option<String>; Stage::COUNT],
}

impl Default for PipelineKey {
    fn default() -> PipelineKey {
        PipelineKey {
            pipeline_type: PipelineType::Graphics,
            source: VertexSource::Rectangle,
            slots: PROPERTIES.iter().map(|p| p.default).collect(),
            entrypoints: Default::default(),
        }
    }
}

impl PipelineKey {
    /// The pipeline type
    pub fn pipeline_type(&self) -> PipelineType {
        self.pipeline_type
    }

    /// Select graphics or compute
    pub fn set_pipeline_type(&mut self, pipeline_type: PipelineType) {
        self.pipeline_type = pipeline_type;
    }

    /// The vertex source (meaningful for graphics keys only)
    pub fn source(&self) -> VertexSource {
        self.source
    }

    /// Select the vertex source
    pub fn set_source(&mut self, source: VertexSource) {
        self.source = source;
    }

    /// Entrypoint for `stage`, defaulting to `main`
    pub fn entrypoint(&self, stage: Stage) -> &str {
        self.entrypoints[stage.index()]
            .as_deref()
            .unwrap_or("main")
    }

    /// Override the entrypoint for `stage`
    pub fn set_entrypoint(&mut self, stage: Stage, name: impl Into<String>) {
        self.entrypoints[stage.index()] = Some(name.into());
    }

    /// Set a property from script text.
    ///
    /// Returns `Ok(false)` when `name` is not a registered property (the
    /// test-line dispatcher then tries the remaining command forms), and an
    /// error when the name matched but the value text did not.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<bool, KeyError> {
        let Some(index) = properties::lookup(name) else {
            return Ok(false);
        };
        let property = &PROPERTIES[index];
        let parsed = match property.kind {
            PropKind::Bool => parse_bool(value),
            PropKind::Int => parse_int_terms(value),
            PropKind::Float => parse_float(value),
        };
        match parsed {
            Some(slot) => {
                self.slots[index] = slot;
                Ok(true)
            }
            None => Err(KeyError::InvalidValue(property.name)),
        }
    }

    /// Set an integer property by name; the name must be in the table
    pub(crate) fn set_int(&mut self, name: &str, value: u32) {
        let index = properties::lookup(name).expect("registered property name");
        self.slots[index] = PropValue::Int(value);
    }

    /// Serialise the slots into a fresh create-info tree.
    ///
    /// Equal keys produce byte-equal state; the assembler adds viewport,
    /// multisample and vertex-input state on top.
    pub fn to_fixed_function_state(&self) -> FixedFunctionState {
        let mut state = FixedFunctionState::default();
        for (property, slot) in PROPERTIES.iter().zip(&self.slots) {
            (property.apply)(&mut state, *slot);
        }
        state
    }
}

fn parse_bool(text: &str) -> Option<PropValue> {
    let mut cursor = text;
    let value = if parse::looking_at_word(&mut cursor, "true") {
        true
    } else if parse::looking_at_word(&mut cursor, "false") {
        false
    } else {
        parse::parse_i64(&mut cursor).ok()? != 0
    };
    parse::is_end(cursor).then_some(PropValue::Bool(value))
}

fn parse_int_terms(text: &str) -> Option<PropValue> {
    let mut value = 0u32;
    for term in text.split('|') {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        let term_value = if term.bytes().next()?.is_ascii_digit() || term.starts_with('-') {
            let mut cursor = term;
            let parsed = parse::parse_i64(&mut cursor).ok()?;
            if !parse::is_end(cursor) {
                return None;
            }
            parsed as u32
        } else {
            enums::lookup(term)? as u32
        };
        value |= term_value;
    }
    Some(PropValue::Int(value))
}

fn parse_float(text: &str) -> Option<PropValue> {
    let mut cursor = text;
    let value = parse::parse_f32(&mut cursor).ok()?;
    parse::is_end(cursor).then_some(PropValue::Float(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;

    #[test]
    fn test_default_key_baseline() {
        let key = PipelineKey::default();
        assert_eq!(key.pipeline_type(), PipelineType::Graphics);
        let state = key.to_fixed_function_state();
        assert_eq!(
            state.input_assembly.topology,
            vk::PrimitiveTopology::TRIANGLE_STRIP
        );
        assert_eq!(state.rasterization.polygon_mode, vk::PolygonMode::FILL);
        assert_eq!(
            state.rasterization.front_face,
            vk::FrontFace::COUNTER_CLOCKWISE
        );
        assert_eq!(state.rasterization.line_width, 1.0);
        assert_eq!(state.blend_attachment.blend_enable, vk::FALSE);
        assert_eq!(state.depth_stencil.depth_test_enable, vk::FALSE);
        assert_eq!(state.depth_stencil.front.reference, 0);
        assert_eq!(key.entrypoint(Stage::Vertex), "main");
    }

    #[test]
    fn test_set_property_by_enum_name() {
        let mut key = PipelineKey::default();
        assert_eq!(
            key.set_property("topology", "VK_PRIMITIVE_TOPOLOGY_LINE_STRIP"),
            Ok(true)
        );
        let state = key.to_fixed_function_state();
        assert_eq!(
            state.input_assembly.topology,
            vk::PrimitiveTopology::LINE_STRIP
        );
    }

    #[test]
    fn test_set_property_or_terms() {
        let mut key = PipelineKey::default();
        assert_eq!(
            key.set_property(
                "cullMode",
                "VK_CULL_MODE_FRONT_BIT | VK_CULL_MODE_BACK_BIT"
            ),
            Ok(true)
        );
        let state = key.to_fixed_function_state();
        assert_eq!(
            state.rasterization.cull_mode,
            vk::CullModeFlags::FRONT_AND_BACK
        );
    }

    #[test]
    fn test_set_bool_property() {
        let mut key = PipelineKey::default();
        assert_eq!(key.set_property("depthTestEnable", "true"), Ok(true));
        assert_eq!(key.set_property("depthWriteEnable", "1"), Ok(true));
        let state = key.to_fixed_function_state();
        assert_eq!(state.depth_stencil.depth_test_enable, vk::TRUE);
        assert_eq!(state.depth_stencil.depth_write_enable, vk::TRUE);

        assert_eq!(
            key.set_property("depthTestEnable", "true false"),
            Err(KeyError::InvalidValue("depthTestEnable"))
        );
    }

    #[test]
    fn test_set_float_property_hex() {
        let mut key = PipelineKey::default();
        assert_eq!(key.set_property("lineWidth", "0x40000000"), Ok(true));
        let state = key.to_fixed_function_state();
        assert_eq!(state.rasterization.line_width, 2.0);
    }

    #[test]
    fn test_unknown_name_falls_through() {
        let mut key = PipelineKey::default();
        assert_eq!(key.set_property("draw", "rect 0 0 1 1"), Ok(false));
    }

    #[test]
    fn test_equality_tracks_slots_and_entrypoints() {
        let a = PipelineKey::default();
        let mut b = PipelineKey::default();
        assert_eq!(a, b);

        b.set_property("lineWidth", "2.0").unwrap();
        assert_ne!(a, b);

        let mut c = PipelineKey::default();
        c.set_entrypoint(Stage::Fragment, "other");
        assert_ne!(a, c);

        // same mutations, same key
        let mut d = PipelineKey::default();
        d.set_property("lineWidth", "2.0").unwrap();
        assert_eq!(b, d);
    }

    #[test]
    fn test_equal_keys_serialise_identically() {
        let mut a = PipelineKey::default();
        let mut b = PipelineKey::default();
        for key in [&mut a, &mut b] {
            key.set_property("topology", "VK_PRIMITIVE_TOPOLOGY_PATCH_LIST")
                .unwrap();
            key.set_property("front.compareMask", "255").unwrap();
            key.set_property("stencilTestEnable", "true").unwrap();
        }
        assert_eq!(a, b);
        let sa = a.to_fixed_function_state();
        let sb = b.to_fixed_function_state();
        assert_eq!(sa.input_assembly.topology, sb.input_assembly.topology);
        assert_eq!(
            sa.depth_stencil.front.compare_mask,
            sb.depth_stencil.front.compare_mask
        );
        assert_eq!(sa.depth_stencil.front.compare_mask, 255);
    }
}
