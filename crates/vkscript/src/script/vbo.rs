//! `[vertex data]` section parsing
//!
//! The first content line is a header of `location/FORMAT` columns; every
//! following line is one vertex with a value per format component. Attribute
//! offsets are packed in header order, each aligned to its format, and the
//! encoded rows land in one interleaved buffer with a fixed stride.
//!
//! ```text
//! 0/R32G32B32_SFLOAT  1/R8G8B8A8_UNORM
//! -1 -1 0             255 0 0 255
//!  1 -1 0             0 255 0 255
//! ```

use crate::formats::{ComponentMode, FormatInfo};
use crate::script::parse;

/// One attribute column of the vertex buffer
#[derive(Debug, Clone)]
pub struct VboAttribute {
    /// Shader input location
    pub location: u32,
    /// Component layout and Vulkan format
    pub format: &'static FormatInfo,
    /// Byte offset within one vertex
    pub offset: usize,
}

/// Parsed vertex data: layout plus the interleaved bytes
#[derive(Debug, Clone)]
pub struct Vbo {
    /// Byte distance between consecutive vertices
    pub stride: usize,
    /// Attribute columns in header order
    pub attributes: Vec<VboAttribute>,
    /// `num_vertices * stride` encoded bytes
    pub data: Vec<u8>,
    /// Number of data rows
    pub num_vertices: usize,
}

/// Incremental section parser fed one line at a time
#[derive(Debug, Default)]
pub struct VboBuilder {
    attributes: Vec<VboAttribute>,
    stride: usize,
    data: Vec<u8>,
    num_vertices: usize,
}

impl VboBuilder {
    /// Fresh builder with no header yet
    pub fn new() -> VboBuilder {
        VboBuilder::default()
    }

    /// Feed the next section line; blank lines and `#` comments are skipped
    pub fn add_line(&mut self, line: &str) -> Result<(), String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        if self.attributes.is_empty() {
            self.parse_header(trimmed)
        } else {
            self.parse_row(trimmed)
        }
    }

    /// Close the section
    pub fn finish(self) -> Result<Vbo, String> {
        if self.attributes.is_empty() {
            return Err("vertex data section has no header".to_string());
        }
        Ok(Vbo {
            stride: self.stride,
            attributes: self.attributes,
            data: self.data,
            num_vertices: self.num_vertices,
        })
    }

    fn parse_header(&mut self, line: &str) -> Result<(), String> {
        let mut offset = 0usize;
        let mut max_alignment = 1usize;
        let mut cursor = line;
        while let Some(word) = parse::next_word(&mut cursor) {
            let (location, format_name) = word
                .split_once('/')
                .ok_or_else(|| format!("expected location/format, got {:?}", word))?;
            let location = location
                .parse::<u32>()
                .map_err(|_| format!("invalid attribute location {:?}", location))?;
            let format = crate::formats::lookup(format_name)
                .ok_or_else(|| format!("unknown format {:?}", format_name))?;
            let alignment = format.alignment();
            offset = (offset + alignment - 1) / alignment * alignment;
            max_alignment = max_alignment.max(alignment);
            self.attributes.push(VboAttribute {
                location,
                format,
                offset,
            });
            offset += format.byte_size();
        }
        if self.attributes.is_empty() {
            return Err("vertex data header has no attributes".to_string());
        }
        self.stride = (offset + max_alignment - 1) / max_alignment * max_alignment;
        Ok(())
    }

    fn parse_row(&mut self, line: &str) -> Result<(), String> {
        let mut row = vec![0u8; self.stride];
        let mut cursor = line;
        for attribute in &self.attributes {
            let out = &mut row[attribute.offset..];
            if attribute.format.packed_bits > 0 {
                let mut word = 0u64;
                for component in attribute.format.components {
                    let value = parse_component(&mut cursor, component.mode, component.bits)?;
                    word = (word << component.bits) | (value & mask(component.bits));
                }
                let n_bytes = (attribute.format.packed_bits / 8) as usize;
                out[..n_bytes].copy_from_slice(&word.to_le_bytes()[..n_bytes]);
            } else {
                let mut at = 0usize;
                for component in attribute.format.components {
                    let value = parse_component(&mut cursor, component.mode, component.bits)?;
                    let n_bytes = (component.bits / 8) as usize;
                    out[at..at + n_bytes].copy_from_slice(&value.to_le_bytes()[..n_bytes]);
                    at += n_bytes;
                }
            }
        }
        if !parse::is_end(cursor) {
            return Err(format!("trailing data in vertex row: {:?}", cursor.trim()));
        }
        self.data.extend_from_slice(&row);
        self.num_vertices += 1;
        Ok(())
    }
}

fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn scalar_error(e: parse::ScalarError) -> String {
    format!("invalid vertex value: {}", e)
}

fn parse_component(cursor: &mut &str, mode: ComponentMode, bits: u32) -> Result<u64, String> {
    match mode {
        ComponentMode::Uint | ComponentMode::Uscaled => {
            let value = parse::parse_u64(cursor).map_err(scalar_error)?;
            if value > mask(bits) {
                return Err(format!("value {} does not fit in {} bits", value, bits));
            }
            Ok(value)
        }
        ComponentMode::Sint | ComponentMode::Sscaled => {
            let value = parse::parse_i64(cursor).map_err(scalar_error)?;
            if bits < 64 {
                let limit = 1i64 << (bits - 1);
                if value < -limit || value >= limit {
                    return Err(format!(
                        "value {} does not fit in {} signed bits",
                        value, bits
                    ));
                }
            }
            Ok(value as u64)
        }
        ComponentMode::Sfloat => match bits {
            16 => parse::parse_f16(cursor)
                .map(u64::from)
                .map_err(scalar_error),
            32 => parse::parse_f32(cursor)
                .map(|v| u64::from(v.to_bits()))
                .map_err(scalar_error),
            64 => parse::parse_f64(cursor)
                .map(f64::to_bits)
                .map_err(scalar_error),
            other => Err(format!("unsupported float width {}", other)),
        },
        ComponentMode::Unorm | ComponentMode::Srgb => {
            let value = parse::parse_f64(cursor).map_err(scalar_error)?;
            let max = mask(bits) as f64;
            Ok((value.clamp(0.0, 1.0) * max).round() as u64)
        }
        ComponentMode::Snorm => {
            let value = parse::parse_f64(cursor).map_err(scalar_error)?;
            let max = (mask(bits - 1)) as f64;
            Ok(((value.clamp(-1.0, 1.0) * max).round() as i64) as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;

    fn build(lines: &[&str]) -> Result<Vbo, String> {
        let mut builder = VboBuilder::new();
        for line in lines {
            builder.add_line(line)?;
        }
        builder.finish()
    }

    #[test]
    fn test_float_positions() {
        let vbo = build(&[
            "0/R32G32_SFLOAT",
            "# corner",
            "-1 -1",
            "1 1",
        ])
        .unwrap();
        assert_eq!(vbo.stride, 8);
        assert_eq!(vbo.num_vertices, 2);
        assert_eq!(vbo.attributes[0].format.format, vk::Format::R32G32_SFLOAT);
        let x0 = f32::from_le_bytes(vbo.data[0..4].try_into().unwrap());
        assert_eq!(x0, -1.0);
        let y1 = f32::from_le_bytes(vbo.data[12..16].try_into().unwrap());
        assert_eq!(y1, 1.0);
    }

    #[test]
    fn test_interleaved_offsets_align() {
        let vbo = build(&[
            "1/R8G8B8_UNORM 0/R32G32_SFLOAT",
            "1.0 0 0  -1 -1",
        ])
        .unwrap();
        // the vec2 float column is pushed from offset 3 up to 4
        assert_eq!(vbo.attributes[0].offset, 0);
        assert_eq!(vbo.attributes[1].offset, 4);
        assert_eq!(vbo.stride, 12);
        assert_eq!(vbo.data[0], 255);
        assert_eq!(vbo.data[1], 0);
        let x = f32::from_le_bytes(vbo.data[4..8].try_into().unwrap());
        assert_eq!(x, -1.0);
    }

    #[test]
    fn test_signed_and_unsigned_ints() {
        let vbo = build(&["0/R16G16_SINT 1/R8_UINT", "-2 3 200"]).unwrap();
        assert_eq!(
            i16::from_le_bytes(vbo.data[0..2].try_into().unwrap()),
            -2
        );
        assert_eq!(
            i16::from_le_bytes(vbo.data[2..4].try_into().unwrap()),
            3
        );
        assert_eq!(vbo.data[4], 200);
    }

    #[test]
    fn test_packed_format() {
        // A2B10G10R10: A in the top two bits, R in the bottom ten
        let vbo = build(&["0/A2B10G10R10_UNORM_PACK32", "1.0 0 0 1.0"]).unwrap();
        let word = u32::from_le_bytes(vbo.data[0..4].try_into().unwrap());
        assert_eq!(word >> 30, 3);
        assert_eq!(word & 0x3ff, 1023);
        assert_eq!((word >> 10) & 0x3ff, 0);
    }

    #[test]
    fn test_half_float_column() {
        let vbo = build(&["0/R16_SFLOAT", "1.0"]).unwrap();
        assert_eq!(u16::from_le_bytes(vbo.data[0..2].try_into().unwrap()), 0x3c00);
    }

    #[test]
    fn test_errors() {
        assert!(build(&["0-R32_SFLOAT", "1"]).is_err());
        assert!(build(&["0/R32G32B32_NOPE", "1 2 3"]).is_err());
        assert!(build(&["0/R8_UINT", "256"]).is_err());
        assert!(build(&["0/R32_SFLOAT", "1.0 2.0"]).is_err());
        assert!(build(&[]).is_err());
    }
}
