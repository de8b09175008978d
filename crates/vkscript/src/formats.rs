//! Vulkan format name table
//!
//! Maps script format names (the `VkFormat` enumerant without the
//! `VK_FORMAT_` prefix) to the ash constant plus enough per-component
//! information for the vertex-data parser to encode values: component order,
//! bit widths, numeric mode and whether the whole texel is a packed word.

use ash::vk;

/// Numeric interpretation of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentMode {
    /// Unsigned normalised to [0, 1]
    Unorm,
    /// Signed normalised to [-1, 1]
    Snorm,
    /// Unsigned integer converted to float by the fetch
    Uscaled,
    /// Signed integer converted to float by the fetch
    Sscaled,
    /// Unsigned integer
    Uint,
    /// Signed integer
    Sint,
    /// IEEE float
    Sfloat,
    /// Unsigned normalised with sRGB transfer
    Srgb,
}

/// One component of a format, most-significant first for packed formats
#[derive(Debug, Clone, Copy)]
pub struct Component {
    /// Bit width
    pub bits: u32,
    /// Numeric mode
    pub mode: ComponentMode,
}

/// A format table entry
#[derive(Debug)]
pub struct FormatInfo {
    /// Name as written in scripts (no `VK_FORMAT_` prefix)
    pub name: &'static str,
    /// The ash constant
    pub format: vk::Format,
    /// Bit size of the packed texel word, or 0 for component arrays
    pub packed_bits: u32,
    /// Components in memory / packing order
    pub components: &'static [Component],
}

impl FormatInfo {
    /// Total size of one texel or vertex attribute in bytes
    pub fn byte_size(&self) -> usize {
        if self.packed_bits > 0 {
            (self.packed_bits / 8) as usize
        } else {
            self.components.iter().map(|c| (c.bits / 8) as usize).sum()
        }
    }

    /// Required offset alignment when laid out in a vertex buffer
    pub fn alignment(&self) -> usize {
        if self.packed_bits > 0 {
            (self.packed_bits / 8) as usize
        } else {
            self.components
                .iter()
                .map(|c| (c.bits / 8) as usize)
                .max()
                .unwrap_or(1)
        }
    }
}

macro_rules! component {
    ($bits:literal $mode:ident) => {
        Component {
            bits: $bits,
            mode: ComponentMode::$mode,
        }
    };
}

macro_rules! format_table {
    ($( $name:ident / $packed:literal: $( $bits:literal $mode:ident ),+ );+ $(;)?) => {
        /// Every format a script may name
        pub static FORMATS: &[FormatInfo] = &[
            $(
                FormatInfo {
                    name: stringify!($name),
                    format: vk::Format::$name,
                    packed_bits: $packed,
                    components: &[ $( component!($bits $mode) ),+ ],
                }
            ),+
        ];
    };
}

format_table! {
    R4G4_UNORM_PACK8 / 8: 4 Unorm, 4 Unorm;
    R4G4B4A4_UNORM_PACK16 / 16: 4 Unorm, 4 Unorm, 4 Unorm, 4 Unorm;
    B4G4R4A4_UNORM_PACK16 / 16: 4 Unorm, 4 Unorm, 4 Unorm, 4 Unorm;
    R5G6B5_UNORM_PACK16 / 16: 5 Unorm, 6 Unorm, 5 Unorm;
    B5G6R5_UNORM_PACK16 / 16: 5 Unorm, 6 Unorm, 5 Unorm;
    R5G5B5A1_UNORM_PACK16 / 16: 5 Unorm, 5 Unorm, 5 Unorm, 1 Unorm;
    B5G5R5A1_UNORM_PACK16 / 16: 5 Unorm, 5 Unorm, 5 Unorm, 1 Unorm;
    A1R5G5B5_UNORM_PACK16 / 16: 1 Unorm, 5 Unorm, 5 Unorm, 5 Unorm;
    R8_UNORM / 0: 8 Unorm;
    R8_SNORM / 0: 8 Snorm;
    R8_USCALED / 0: 8 Uscaled;
    R8_SSCALED / 0: 8 Sscaled;
    R8_UINT / 0: 8 Uint;
    R8_SINT / 0: 8 Sint;
    R8_SRGB / 0: 8 Srgb;
    R8G8_UNORM / 0: 8 Unorm, 8 Unorm;
    R8G8_SNORM / 0: 8 Snorm, 8 Snorm;
    R8G8_USCALED / 0: 8 Uscaled, 8 Uscaled;
    R8G8_SSCALED / 0: 8 Sscaled, 8 Sscaled;
    R8G8_UINT / 0: 8 Uint, 8 Uint;
    R8G8_SINT / 0: 8 Sint, 8 Sint;
    R8G8_SRGB / 0: 8 Srgb, 8 Srgb;
    R8G8B8_UNORM / 0: 8 Unorm, 8 Unorm, 8 Unorm;
    R8G8B8_SNORM / 0: 8 Snorm, 8 Snorm, 8 Snorm;
    R8G8B8_USCALED / 0: 8 Uscaled, 8 Uscaled, 8 Uscaled;
    R8G8B8_SSCALED / 0: 8 Sscaled, 8 Sscaled, 8 Sscaled;
    R8G8B8_UINT / 0: 8 Uint, 8 Uint, 8 Uint;
    R8G8B8_SINT / 0: 8 Sint, 8 Sint, 8 Sint;
    R8G8B8_SRGB / 0: 8 Srgb, 8 Srgb, 8 Srgb;
    B8G8R8_UNORM / 0: 8 Unorm, 8 Unorm, 8 Unorm;
    B8G8R8_SNORM / 0: 8 Snorm, 8 Snorm, 8 Snorm;
    B8G8R8_UINT / 0: 8 Uint, 8 Uint, 8 Uint;
    B8G8R8_SINT / 0: 8 Sint, 8 Sint, 8 Sint;
    B8G8R8_SRGB / 0: 8 Srgb, 8 Srgb, 8 Srgb;
    R8G8B8A8_UNORM / 0: 8 Unorm, 8 Unorm, 8 Unorm, 8 Unorm;
    R8G8B8A8_SNORM / 0: 8 Snorm, 8 Snorm, 8 Snorm, 8 Snorm;
    R8G8B8A8_USCALED / 0: 8 Uscaled, 8 Uscaled, 8 Uscaled, 8 Uscaled;
    R8G8B8A8_SSCALED / 0: 8 Sscaled, 8 Sscaled, 8 Sscaled, 8 Sscaled;
    R8G8B8A8_UINT / 0: 8 Uint, 8 Uint, 8 Uint, 8 Uint;
    R8G8B8A8_SINT / 0: 8 Sint, 8 Sint, 8 Sint, 8 Sint;
    R8G8B8A8_SRGB / 0: 8 Srgb, 8 Srgb, 8 Srgb, 8 Srgb;
    B8G8R8A8_UNORM / 0: 8 Unorm, 8 Unorm, 8 Unorm, 8 Unorm;
    B8G8R8A8_SNORM / 0: 8 Snorm, 8 Snorm, 8 Snorm, 8 Snorm;
    B8G8R8A8_UINT / 0: 8 Uint, 8 Uint, 8 Uint, 8 Uint;
    B8G8R8A8_SINT / 0: 8 Sint, 8 Sint, 8 Sint, 8 Sint;
    B8G8R8A8_SRGB / 0: 8 Srgb, 8 Srgb, 8 Srgb, 8 Srgb;
    A8B8G8R8_UNORM_PACK32 / 32: 8 Unorm, 8 Unorm, 8 Unorm, 8 Unorm;
    A8B8G8R8_SNORM_PACK32 / 32: 8 Snorm, 8 Snorm, 8 Snorm, 8 Snorm;
    A8B8G8R8_UINT_PACK32 / 32: 8 Uint, 8 Uint, 8 Uint, 8 Uint;
    A8B8G8R8_SINT_PACK32 / 32: 8 Sint, 8 Sint, 8 Sint, 8 Sint;
    A8B8G8R8_SRGB_PACK32 / 32: 8 Srgb, 8 Srgb, 8 Srgb, 8 Srgb;
    A2R10G10B10_UNORM_PACK32 / 32: 2 Unorm, 10 Unorm, 10 Unorm, 10 Unorm;
    A2R10G10B10_UINT_PACK32 / 32: 2 Uint, 10 Uint, 10 Uint, 10 Uint;
    A2B10G10R10_UNORM_PACK32 / 32: 2 Unorm, 10 Unorm, 10 Unorm, 10 Unorm;
    A2B10G10R10_UINT_PACK32 / 32: 2 Uint, 10 Uint, 10 Uint, 10 Uint;
    R16_UNORM / 0: 16 Unorm;
    R16_SNORM / 0: 16 Snorm;
    R16_USCALED / 0: 16 Uscaled;
    R16_SSCALED / 0: 16 Sscaled;
    R16_UINT / 0: 16 Uint;
    R16_SINT / 0: 16 Sint;
    R16_SFLOAT / 0: 16 Sfloat;
    R16G16_UNORM / 0: 16 Unorm, 16 Unorm;
    R16G16_SNORM / 0: 16 Snorm, 16 Snorm;
    R16G16_UINT / 0: 16 Uint, 16 Uint;
    R16G16_SINT / 0: 16 Sint, 16 Sint;
    R16G16_SFLOAT / 0: 16 Sfloat, 16 Sfloat;
    R16G16B16_UNORM / 0: 16 Unorm, 16 Unorm, 16 Unorm;
    R16G16B16_SNORM / 0: 16 Snorm, 16 Snorm, 16 Snorm;
    R16G16B16_UINT / 0: 16 Uint, 16 Uint, 16 Uint;
    R16G16B16_SINT / 0: 16 Sint, 16 Sint, 16 Sint;
    R16G16B16_SFLOAT / 0: 16 Sfloat, 16 Sfloat, 16 Sfloat;
    R16G16B16A16_UNORM / 0: 16 Unorm, 16 Unorm, 16 Unorm, 16 Unorm;
    R16G16B16A16_SNORM / 0: 16 Snorm, 16 Snorm, 16 Snorm, 16 Snorm;
    R16G16B16A16_UINT / 0: 16 Uint, 16 Uint, 16 Uint, 16 Uint;
    R16G16B16A16_SINT / 0: 16 Sint, 16 Sint, 16 Sint, 16 Sint;
    R16G16B16A16_SFLOAT / 0: 16 Sfloat, 16 Sfloat, 16 Sfloat, 16 Sfloat;
    R32_UINT / 0: 32 Uint;
    R32_SINT / 0: 32 Sint;
    R32_SFLOAT / 0: 32 Sfloat;
    R32G32_UINT / 0: 32 Uint, 32 Uint;
    R32G32_SINT / 0: 32 Sint, 32 Sint;
    R32G32_SFLOAT / 0: 32 Sfloat, 32 Sfloat;
    R32G32B32_UINT / 0: 32 Uint, 32 Uint, 32 Uint;
    R32G32B32_SINT / 0: 32 Sint, 32 Sint, 32 Sint;
    R32G32B32_SFLOAT / 0: 32 Sfloat, 32 Sfloat, 32 Sfloat;
    R32G32B32A32_UINT / 0: 32 Uint, 32 Uint, 32 Uint, 32 Uint;
    R32G32B32A32_SINT / 0: 32 Sint, 32 Sint, 32 Sint, 32 Sint;
    R32G32B32A32_SFLOAT / 0: 32 Sfloat, 32 Sfloat, 32 Sfloat, 32 Sfloat;
    R64_UINT / 0: 64 Uint;
    R64_SINT / 0: 64 Sint;
    R64_SFLOAT / 0: 64 Sfloat;
    R64G64_UINT / 0: 64 Uint, 64 Uint;
    R64G64_SINT / 0: 64 Sint, 64 Sint;
    R64G64_SFLOAT / 0: 64 Sfloat, 64 Sfloat;
    R64G64B64_UINT / 0: 64 Uint, 64 Uint, 64 Uint;
    R64G64B64_SINT / 0: 64 Sint, 64 Sint, 64 Sint;
    R64G64B64_SFLOAT / 0: 64 Sfloat, 64 Sfloat, 64 Sfloat;
    R64G64B64A64_UINT / 0: 64 Uint, 64 Uint, 64 Uint, 64 Uint;
    R64G64B64A64_SINT / 0: 64 Sint, 64 Sint, 64 Sint, 64 Sint;
    R64G64B64A64_SFLOAT / 0: 64 Sfloat, 64 Sfloat, 64 Sfloat, 64 Sfloat;
    D16_UNORM / 0: 16 Unorm;
    X8_D24_UNORM_PACK32 / 32: 8 Unorm, 24 Unorm;
    D32_SFLOAT / 0: 32 Sfloat;
    S8_UINT / 0: 8 Uint;
    D16_UNORM_S8_UINT / 0: 16 Unorm, 8 Uint;
    D24_UNORM_S8_UINT / 32: 24 Unorm, 8 Uint;
    D32_SFLOAT_S8_UINT / 0: 32 Sfloat, 8 Uint;
}

/// Look up a format by script name
pub fn lookup(name: &str) -> Option<&'static FormatInfo> {
    FORMATS.iter().find(|info| info.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let info = lookup("R32G32B32_SFLOAT").unwrap();
        assert_eq!(info.format, vk::Format::R32G32B32_SFLOAT);
        assert_eq!(info.byte_size(), 12);
        assert_eq!(info.alignment(), 4);
        assert!(lookup("R32G32B32_NONSENSE").is_none());
    }

    #[test]
    fn test_packed_sizes() {
        let info = lookup("R5G6B5_UNORM_PACK16").unwrap();
        assert_eq!(info.byte_size(), 2);
        assert_eq!(info.alignment(), 2);
        let info = lookup("A2B10G10R10_UNORM_PACK32").unwrap();
        assert_eq!(info.byte_size(), 4);
    }

    #[test]
    fn test_names_match_ash_constants() {
        for info in FORMATS {
            // Every table name is exactly the ash constant name
            assert_eq!(
                format!("{:?}", info.format),
                info.name,
                "table name mismatch"
            );
        }
    }

    #[test]
    fn test_depth_stencil() {
        assert_eq!(
            lookup("D24_UNORM_S8_UINT").unwrap().format,
            vk::Format::D24_UNORM_S8_UINT
        );
        assert_eq!(lookup("D32_SFLOAT").unwrap().byte_size(), 4);
    }
}
