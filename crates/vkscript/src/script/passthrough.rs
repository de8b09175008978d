//! The `[vertex shader passthrough]` SPIR-V binary
//!
//! Equivalent GLSL:
//!
//! ```glsl
//! layout(location = 0) in vec4 position;
//! void main() { gl_Position = position; }
//! ```
//!
//! Kept as pre-assembled words so scripts can use the stock vertex stage
//! without the SPIR-V assembler being installed.

/// SPIR-V 1.0 module reading location 0 and writing `gl_Position`
pub static PASSTHROUGH_VERTEX_SHADER: &[u32] = &[
    0x0723_0203, // magic
    0x0001_0000, // version 1.0
    0x0000_0000, // generator
    0x0000_0011, // id bound
    0x0000_0000, // schema
    // OpCapability Shader
    0x0002_0011, 0x0000_0001,
    // OpMemoryModel Logical GLSL450
    0x0003_000e, 0x0000_0000, 0x0000_0001,
    // OpEntryPoint Vertex %1 "main" %8 %10
    0x0007_000f, 0x0000_0000, 0x0000_0001, 0x6e69_616d, 0x0000_0000, 0x0000_0008,
    0x0000_000a,
    // OpMemberDecorate %6 0 BuiltIn Position
    0x0005_0048, 0x0000_0006, 0x0000_0000, 0x0000_000b, 0x0000_0000,
    // OpDecorate %6 Block
    0x0003_0047, 0x0000_0006, 0x0000_0002,
    // OpDecorate %10 Location 0
    0x0004_0047, 0x0000_000a, 0x0000_001e, 0x0000_0000,
    // %2 = OpTypeVoid
    0x0002_0013, 0x0000_0002,
    // %3 = OpTypeFunction %2
    0x0003_0021, 0x0000_0003, 0x0000_0002,
    // %4 = OpTypeFloat 32
    0x0003_0016, 0x0000_0004, 0x0000_0020,
    // %5 = OpTypeVector %4 4
    0x0004_0017, 0x0000_0005, 0x0000_0004, 0x0000_0004,
    // %6 = OpTypeStruct %5
    0x0003_001e, 0x0000_0006, 0x0000_0005,
    // %7 = OpTypePointer Output %6
    0x0004_0020, 0x0000_0007, 0x0000_0003, 0x0000_0006,
    // %8 = OpVariable %7 Output
    0x0004_003b, 0x0000_0007, 0x0000_0008, 0x0000_0003,
    // %9 = OpTypePointer Input %5
    0x0004_0020, 0x0000_0009, 0x0000_0001, 0x0000_0005,
    // %10 = OpVariable %9 Input
    0x0004_003b, 0x0000_0009, 0x0000_000a, 0x0000_0001,
    // %11 = OpTypeInt 32 1
    0x0004_0015, 0x0000_000b, 0x0000_0020, 0x0000_0001,
    // %12 = OpConstant %11 0
    0x0004_002b, 0x0000_000b, 0x0000_000c, 0x0000_0000,
    // %13 = OpTypePointer Output %5
    0x0004_0020, 0x0000_000d, 0x0000_0003, 0x0000_0005,
    // %1 = OpFunction %2 None %3
    0x0005_0036, 0x0000_0002, 0x0000_0001, 0x0000_0000, 0x0000_0003,
    // %14 = OpLabel
    0x0002_00f8, 0x0000_000e,
    // %15 = OpLoad %5 %10
    0x0004_003d, 0x0000_0005, 0x0000_000f, 0x0000_000a,
    // %16 = OpAccessChain %13 %8 %12
    0x0005_0041, 0x0000_000d, 0x0000_0010, 0x0000_0008, 0x0000_000c,
    // OpStore %16 %15
    0x0003_003e, 0x0000_0010, 0x0000_000f,
    // OpReturn
    0x0001_00fd,
    // OpFunctionEnd
    0x0001_0038,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        assert_eq!(PASSTHROUGH_VERTEX_SHADER[0], 0x0723_0203);
        assert_eq!(PASSTHROUGH_VERTEX_SHADER[1], 0x0001_0000);
    }

    #[test]
    fn test_word_counts_are_consistent() {
        // walk the instruction stream; every opcode's word count must land
        // exactly on the end of the module
        let mut at = 5;
        while at < PASSTHROUGH_VERTEX_SHADER.len() {
            let word_count = (PASSTHROUGH_VERTEX_SHADER[at] >> 16) as usize;
            assert!(word_count > 0);
            at += word_count;
        }
        assert_eq!(at, PASSTHROUGH_VERTEX_SHADER.len());
    }
}
