//! GLSL value types for uniform, push-constant and probe payloads
//!
//! A [`DataType`] is a base scalar type crossed with a column and row count
//! (`vec3`, `dmat2x4`, `i64vec2`, ...). The layout rules follow the std140
//! family: a column of a matrix is padded to the alignment of a vector with
//! the same row count, so `mat3` columns are 16 bytes apart.

use thiserror::Error;

use crate::script::parse::{self, ScalarError};

/// Scalar base of a GLSL value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    /// `int`
    Int,
    /// `uint`
    Uint,
    /// `int8_t`
    Int8,
    /// `uint8_t`
    Uint8,
    /// `int16_t`
    Int16,
    /// `uint16_t`
    Uint16,
    /// `int64_t`
    Int64,
    /// `uint64_t`
    Uint64,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl BaseType {
    /// Size of one scalar in bytes
    pub fn size(self) -> usize {
        match self {
            BaseType::Int8 | BaseType::Uint8 => 1,
            BaseType::Int16 | BaseType::Uint16 => 2,
            BaseType::Int | BaseType::Uint | BaseType::Float => 4,
            BaseType::Int64 | BaseType::Uint64 | BaseType::Double => 8,
        }
    }
}

/// Value layout derived from a [`DataType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Size of the scalar base type in bytes
    pub base_size: usize,
    /// Required alignment of one value
    pub base_alignment: usize,
    /// Byte distance between matrix columns (equals the column vector
    /// alignment; meaningless for non-matrices)
    pub matrix_stride: usize,
    /// Total size of one value in bytes
    pub size: usize,
}

/// A GLSL scalar, vector or matrix type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataType {
    /// Scalar base type
    pub base: BaseType,
    /// Column count, 1 for scalars and vectors
    pub cols: usize,
    /// Row count, 1 for scalars
    pub rows: usize,
}

/// Failure while parsing typed values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A scalar could not be read
    #[error("{0}")]
    Scalar(#[from] ScalarError),
    /// No values where at least one was required
    #[error("expected at least one value")]
    Empty,
}

fn vector_alignment(base: BaseType, rows: usize) -> usize {
    // Vectors of 3 round up to the next power of two, like std140/std430
    let padded_rows = match rows {
        1 => 1,
        2 => 2,
        _ => 4,
    };
    base.size() * padded_rows
}

impl DataType {
    /// Look up a type by its GLSL name, e.g. `vec4` or `dmat2x3`
    pub fn from_name(name: &str) -> Option<DataType> {
        let scalar = |base| Some(DataType { base, cols: 1, rows: 1 });
        match name {
            "int" => return scalar(BaseType::Int),
            "uint" => return scalar(BaseType::Uint),
            "int8_t" => return scalar(BaseType::Int8),
            "uint8_t" => return scalar(BaseType::Uint8),
            "int16_t" => return scalar(BaseType::Int16),
            "uint16_t" => return scalar(BaseType::Uint16),
            "int64_t" => return scalar(BaseType::Int64),
            "uint64_t" => return scalar(BaseType::Uint64),
            "float" => return scalar(BaseType::Float),
            "double" => return scalar(BaseType::Double),
            _ => (),
        }

        if let Some(rest) = name.strip_suffix(|c: char| c.is_ascii_digit()) {
            let rows = name.as_bytes()[name.len() - 1] - b'0';
            if !(2..=4).contains(&rows) {
                return None;
            }
            let rows = rows as usize;
            let base = match rest {
                "vec" => BaseType::Float,
                "dvec" => BaseType::Double,
                "ivec" => BaseType::Int,
                "uvec" => BaseType::Uint,
                "i8vec" => BaseType::Int8,
                "u8vec" => BaseType::Uint8,
                "i16vec" => BaseType::Int16,
                "u16vec" => BaseType::Uint16,
                "i64vec" => BaseType::Int64,
                "u64vec" => BaseType::Uint64,
                _ => return Self::matrix_from_name(name),
            };
            return Some(DataType { base, cols: 1, rows });
        }
        None
    }

    fn matrix_from_name(name: &str) -> Option<DataType> {
        let (base, dims) = if let Some(rest) = name.strip_prefix("dmat") {
            (BaseType::Double, rest)
        } else if let Some(rest) = name.strip_prefix("mat") {
            (BaseType::Float, rest)
        } else {
            return None;
        };
        let bytes = dims.as_bytes();
        let (cols, rows) = match bytes {
            [c] => (c - b'0', c - b'0'),
            [c, b'x', r] => (c - b'0', r - b'0'),
            _ => return None,
        };
        if !(2..=4).contains(&cols) || !(2..=4).contains(&rows) {
            return None;
        }
        Some(DataType {
            base,
            cols: cols as usize,
            rows: rows as usize,
        })
    }

    /// Compute the value layout
    pub fn layout(&self) -> Layout {
        let base_size = self.base.size();
        let column_alignment = vector_alignment(self.base, self.rows);
        let (base_alignment, size) = if self.cols > 1 {
            (column_alignment, column_alignment * self.cols)
        } else {
            (column_alignment, base_size * self.rows)
        };
        Layout {
            base_size,
            base_alignment,
            matrix_stride: column_alignment,
            size,
        }
    }

    fn parse_scalar(&self, input: &mut &str, out: &mut [u8]) -> Result<(), ScalarError> {
        match self.base {
            BaseType::Int => out.copy_from_slice(&parse::parse_i32(input)?.to_le_bytes()),
            BaseType::Uint => out.copy_from_slice(&parse::parse_u32(input)?.to_le_bytes()),
            BaseType::Int8 => out.copy_from_slice(&parse::parse_i8(input)?.to_le_bytes()),
            BaseType::Uint8 => out.copy_from_slice(&parse::parse_u8(input)?.to_le_bytes()),
            BaseType::Int16 => out.copy_from_slice(&parse::parse_i16(input)?.to_le_bytes()),
            BaseType::Uint16 => out.copy_from_slice(&parse::parse_u16(input)?.to_le_bytes()),
            BaseType::Int64 => out.copy_from_slice(&parse::parse_i64(input)?.to_le_bytes()),
            BaseType::Uint64 => out.copy_from_slice(&parse::parse_u64(input)?.to_le_bytes()),
            BaseType::Float => out.copy_from_slice(&parse::parse_f32(input)?.to_le_bytes()),
            BaseType::Double => out.copy_from_slice(&parse::parse_f64(input)?.to_le_bytes()),
        }
        Ok(())
    }

    /// Parse one value: `cols * rows` scalars in column-major order.
    ///
    /// The result is `layout().size` bytes with each column placed at
    /// `col * matrix_stride`.
    pub fn parse_value(&self, input: &mut &str) -> Result<Vec<u8>, ValueError> {
        let layout = self.layout();
        let mut out = vec![0u8; layout.size];
        for col in 0..self.cols {
            for row in 0..self.rows {
                let offset = col * layout.matrix_stride + row * layout.base_size;
                self.parse_scalar(input, &mut out[offset..offset + layout.base_size])?;
            }
        }
        Ok(out)
    }

    /// Parse values until end of line, appending each at the next
    /// `base_alignment` boundary. At least one value is required.
    pub fn parse_values(&self, input: &mut &str) -> Result<Vec<u8>, ValueError> {
        if parse::is_end(input) {
            return Err(ValueError::Empty);
        }
        let layout = self.layout();
        let mut out = Vec::new();
        loop {
            let value = self.parse_value(input)?;
            let aligned = (out.len() + layout.base_alignment - 1) / layout.base_alignment
                * layout.base_alignment;
            out.resize(aligned, 0);
            out.extend_from_slice(&value);
            if parse::is_end(input) {
                return Ok(out);
            }
        }
    }

    /// Parse values until end of line, tight-packed with no inter-value
    /// padding (probe payloads compare against raw buffer bytes).
    pub fn parse_values_packed(&self, input: &mut &str) -> Result<Vec<u8>, ValueError> {
        if parse::is_end(input) {
            return Err(ValueError::Empty);
        }
        let mut out = Vec::new();
        loop {
            out.extend_from_slice(&self.parse_value(input)?);
            if parse::is_end(input) {
                return Ok(out);
            }
        }
    }

    fn read_scalar_f64(&self, bytes: &[u8]) -> f64 {
        let take = |n: usize| -> [u8; 8] {
            let mut buf = [0u8; 8];
            buf[..n].copy_from_slice(&bytes[..n]);
            buf
        };
        match self.base {
            BaseType::Int => i32::from_le_bytes(bytes[..4].try_into().unwrap()) as f64,
            BaseType::Uint => u32::from_le_bytes(bytes[..4].try_into().unwrap()) as f64,
            BaseType::Int8 => i8::from_le_bytes(bytes[..1].try_into().unwrap()) as f64,
            BaseType::Uint8 => f64::from(bytes[0]),
            BaseType::Int16 => i16::from_le_bytes(bytes[..2].try_into().unwrap()) as f64,
            BaseType::Uint16 => u16::from_le_bytes(bytes[..2].try_into().unwrap()) as f64,
            BaseType::Int64 => i64::from_le_bytes(take(8)) as f64,
            BaseType::Uint64 => u64::from_le_bytes(take(8)) as f64,
            BaseType::Float => f64::from(f32::from_le_bytes(bytes[..4].try_into().unwrap())),
            BaseType::Double => f64::from_le_bytes(take(8)),
        }
    }

    /// Compare one observed value against one reference value.
    ///
    /// Every scalar must satisfy the operator. The fuzzy operator `~=`
    /// applies the per-channel tolerance, indexed by row.
    pub fn compare(
        &self,
        op: CompareOp,
        observed: &[u8],
        reference: &[u8],
        tolerance: &Tolerance,
    ) -> bool {
        let layout = self.layout();
        for col in 0..self.cols {
            for row in 0..self.rows {
                let offset = col * layout.matrix_stride + row * layout.base_size;
                let a = self.read_scalar_f64(&observed[offset..]);
                let b = self.read_scalar_f64(&reference[offset..]);
                let ok = match op {
                    CompareOp::Equal => a == b,
                    CompareOp::FuzzyEqual => tolerance.in_range(a, b, row % 4),
                    CompareOp::NotEqual => a != b,
                    CompareOp::Less => a < b,
                    CompareOp::GreaterEqual => a >= b,
                    CompareOp::Greater => a > b,
                    CompareOp::LessEqual => a <= b,
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }
}

/// Comparison operator of an SSBO probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `~=`
    FuzzyEqual,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>=`
    GreaterEqual,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
}

impl CompareOp {
    /// Two-character operators come first so `>=` is never read as `>`
    const TABLE: [(&'static str, CompareOp); 7] = [
        ("==", CompareOp::Equal),
        ("~=", CompareOp::FuzzyEqual),
        ("!=", CompareOp::NotEqual),
        ("<=", CompareOp::LessEqual),
        (">=", CompareOp::GreaterEqual),
        ("<", CompareOp::Less),
        (">", CompareOp::Greater),
    ];

    /// Consume an operator token from the cursor
    pub fn parse(input: &mut &str) -> Option<CompareOp> {
        parse::skip_whitespace(input);
        for (token, op) in CompareOp::TABLE {
            if let Some(rest) = input.strip_prefix(token) {
                *input = rest;
                return Some(op);
            }
        }
        None
    }
}

/// Per-channel allowable deviation for fuzzy probes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// One entry per colour channel / vector row
    pub values: [f64; 4],
    /// Interpret entries as percentages of the reference value
    pub is_percent: bool,
}

impl Default for Tolerance {
    fn default() -> Tolerance {
        Tolerance {
            values: [0.01; 4],
            is_percent: false,
        }
    }
}

impl Tolerance {
    /// True when `observed` is within the channel's deviation of `reference`
    pub fn in_range(&self, observed: f64, reference: f64, channel: usize) -> bool {
        let limit = if self.is_percent {
            reference.abs() * self.values[channel] / 100.0
        } else {
            self.values[channel]
        };
        (observed - reference).abs() <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        let vec3 = DataType::from_name("vec3").unwrap();
        assert_eq!(vec3.base, BaseType::Float);
        assert_eq!((vec3.cols, vec3.rows), (1, 3));

        let m = DataType::from_name("dmat2x4").unwrap();
        assert_eq!(m.base, BaseType::Double);
        assert_eq!((m.cols, m.rows), (2, 4));

        let m = DataType::from_name("mat3").unwrap();
        assert_eq!((m.cols, m.rows), (3, 3));

        assert_eq!(
            DataType::from_name("i64vec2").unwrap().base,
            BaseType::Int64
        );
        assert_eq!(DataType::from_name("uint8_t").unwrap().base, BaseType::Uint8);
        assert!(DataType::from_name("vec5").is_none());
        assert!(DataType::from_name("mat1").is_none());
        assert!(DataType::from_name("texel").is_none());
    }

    #[test]
    fn test_layouts() {
        let vec3 = DataType::from_name("vec3").unwrap().layout();
        assert_eq!(vec3.base_alignment, 16);
        assert_eq!(vec3.size, 12);

        let mat3 = DataType::from_name("mat3").unwrap().layout();
        assert_eq!(mat3.matrix_stride, 16);
        assert_eq!(mat3.size, 48);

        let mat2 = DataType::from_name("mat2").unwrap().layout();
        assert_eq!(mat2.matrix_stride, 8);
        assert_eq!(mat2.size, 16);

        let dvec2 = DataType::from_name("dvec2").unwrap().layout();
        assert_eq!(dvec2.base_alignment, 16);
        assert_eq!(dvec2.size, 16);

        let scalar = DataType::from_name("uint16_t").unwrap().layout();
        assert_eq!(scalar.base_alignment, 2);
        assert_eq!(scalar.size, 2);
    }

    #[test]
    fn test_parse_scalar_float() {
        use approx::assert_relative_eq;

        let float = DataType::from_name("float").unwrap();
        let mut input = "3.14159265";
        let bytes = float.parse_value(&mut input).unwrap();
        let value = f32::from_le_bytes(bytes[..4].try_into().unwrap());
        assert_relative_eq!(value, std::f32::consts::PI, epsilon = 1e-6);

        let double = DataType::from_name("double").unwrap();
        let mut input = "2.718281828459045";
        let bytes = double.parse_value(&mut input).unwrap();
        let value = f64::from_le_bytes(bytes[..8].try_into().unwrap());
        assert_relative_eq!(value, std::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_value_column_major() {
        let mat2 = DataType::from_name("mat2").unwrap();
        let mut input = "1 2 3 4";
        let bytes = mat2.parse_value(&mut input).unwrap();
        let floats: Vec<f32> = bytes
            .chunks(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(floats, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_mat3_column_padding() {
        let mat3x2 = DataType::from_name("mat3x2").unwrap();
        // three columns of vec2, stride 8: no padding between columns
        assert_eq!(mat3x2.layout().size, 24);

        let mat2x3 = DataType::from_name("mat2x3").unwrap();
        let mut input = "1 2 3 4 5 6";
        let bytes = mat2x3.parse_value(&mut input).unwrap();
        assert_eq!(bytes.len(), 32);
        let read = |i: usize| f32::from_le_bytes(bytes[i..i + 4].try_into().unwrap());
        // second column starts at the 16-byte stride
        assert_eq!(read(0), 1.0);
        assert_eq!(read(8), 3.0);
        assert_eq!(read(16), 4.0);
        assert_eq!(read(24), 6.0);
    }

    #[test]
    fn test_parse_values_aligned() {
        let vec3 = DataType::from_name("vec3").unwrap();
        let mut input = "1 0 0  0 1 0";
        let bytes = vec3.parse_values(&mut input).unwrap();
        // second element starts at the 16-byte alignment boundary
        assert_eq!(bytes.len(), 16 + 12);
        assert_eq!(
            f32::from_le_bytes(bytes[16..20].try_into().unwrap()),
            0.0
        );
        assert_eq!(
            f32::from_le_bytes(bytes[20..24].try_into().unwrap()),
            1.0
        );
    }

    #[test]
    fn test_parse_values_packed() {
        let vec3 = DataType::from_name("vec3").unwrap();
        let mut input = "1 0 0  0 1 0";
        let bytes = vec3.parse_values_packed(&mut input).unwrap();
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_compare_ops() {
        let t = DataType::from_name("float").unwrap();
        let tol = Tolerance::default();
        let one = 1.0f32.to_le_bytes();
        let two = 2.0f32.to_le_bytes();
        assert!(t.compare(CompareOp::Less, &one, &two, &tol));
        assert!(!t.compare(CompareOp::GreaterEqual, &one, &two, &tol));
        assert!(t.compare(CompareOp::NotEqual, &one, &two, &tol));
        assert!(t.compare(CompareOp::Equal, &one, &one, &tol));

        let near = 1.005f32.to_le_bytes();
        assert!(t.compare(CompareOp::FuzzyEqual, &near, &one, &tol));
        assert!(!t.compare(CompareOp::Equal, &near, &one, &tol));
    }

    #[test]
    fn test_compare_percent_tolerance() {
        let t = DataType::from_name("float").unwrap();
        let tol = Tolerance {
            values: [1.0; 4],
            is_percent: true,
        };
        let base = 100.0f32.to_le_bytes();
        let near = 100.9f32.to_le_bytes();
        let far = 101.1f32.to_le_bytes();
        assert!(t.compare(CompareOp::FuzzyEqual, &near, &base, &tol));
        assert!(!t.compare(CompareOp::FuzzyEqual, &far, &base, &tol));
    }

    #[test]
    fn test_compare_op_longest_match() {
        let mut s = ">= 4";
        assert_eq!(CompareOp::parse(&mut s), Some(CompareOp::GreaterEqual));
        let mut s = "> 4";
        assert_eq!(CompareOp::parse(&mut s), Some(CompareOp::Greater));
        let mut s = "<= 4";
        assert_eq!(CompareOp::parse(&mut s), Some(CompareOp::LessEqual));
        let mut s = "&&";
        assert_eq!(CompareOp::parse(&mut s), None);
    }
}
