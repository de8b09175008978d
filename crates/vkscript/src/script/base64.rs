//! Streaming base-64 decoder for raw buffer payloads
//!
//! Scripts can supply buffer contents as base-64 text spanning several
//! tokens or lines, so decoding is incremental: feed chunks as they arrive
//! and finalise once the section ends. Three output bytes are produced for
//! every four alphabet characters; at most two trailing `=` are accepted.

use thiserror::Error;

/// Failure while decoding base-64 text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Base64Error {
    /// Character outside the base-64 alphabet
    #[error("invalid base64 character {0:?}")]
    InvalidChar(char),
    /// More than two `=` pad characters
    #[error("too much base64 padding")]
    TooMuchPadding,
    /// Alphabet character after a `=` pad
    #[error("base64 data after padding")]
    DataAfterPadding,
    /// Stream ended in the middle of a group, or with nonzero spare bits
    #[error("incomplete base64 group")]
    IncompleteGroup,
}

fn digit_value(c: u8) -> Option<u32> {
    match c {
        b'A'..=b'Z' => Some(u32::from(c - b'A')),
        b'a'..=b'z' => Some(u32::from(c - b'a') + 26),
        b'0'..=b'9' => Some(u32::from(c - b'0') + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Incremental base-64 decoder
#[derive(Debug, Default)]
pub struct Decoder {
    value: u32,
    n_chars: u32,
    n_padding: u32,
}

impl Decoder {
    /// Start a fresh decode
    pub fn new() -> Decoder {
        Decoder::default()
    }

    /// Feed a chunk of text, appending decoded bytes to `out`.
    ///
    /// ASCII whitespace is skipped so payloads may be split across lines.
    pub fn add_bytes(&mut self, text: &str, out: &mut Vec<u8>) -> Result<(), Base64Error> {
        for c in text.bytes() {
            if c.is_ascii_whitespace() {
                continue;
            }
            if c == b'=' {
                self.n_padding += 1;
                if self.n_padding > 2 {
                    return Err(Base64Error::TooMuchPadding);
                }
                continue;
            }
            let digit = digit_value(c).ok_or(Base64Error::InvalidChar(c as char))?;
            if self.n_padding > 0 {
                return Err(Base64Error::DataAfterPadding);
            }
            self.value = (self.value << 6) | digit;
            self.n_chars += 1;
            if self.n_chars == 4 {
                out.push((self.value >> 16) as u8);
                out.push((self.value >> 8) as u8);
                out.push(self.value as u8);
                self.value = 0;
                self.n_chars = 0;
            }
        }
        Ok(())
    }

    /// Validate the final group and emit its remaining bytes.
    ///
    /// A residue of three characters carries 18 bits (two bytes plus two
    /// spare bits), two characters carry 12 bits (one byte plus four spare
    /// bits); the spare bits must be zero. Any other residue is an error.
    pub fn finish(self, out: &mut Vec<u8>) -> Result<(), Base64Error> {
        match self.n_chars {
            0 => Ok(()),
            3 if self.value & 0x3 == 0 => {
                out.push((self.value >> 10) as u8);
                out.push((self.value >> 2) as u8);
                Ok(())
            }
            2 if self.value & 0xf == 0 => {
                out.push((self.value >> 4) as u8);
                Ok(())
            }
            _ => Err(Base64Error::IncompleteGroup),
        }
    }

    /// Decode a complete payload in one call
    pub fn decode_all(text: &str) -> Result<Vec<u8>, Base64Error> {
        let mut decoder = Decoder::new();
        let mut out = Vec::new();
        decoder.add_bytes(text, &mut out)?;
        decoder.finish(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(data: &[u8]) -> String {
        const ALPHABET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
        let mut out = String::new();
        for chunk in data.chunks(3) {
            let mut group = 0u32;
            for (i, b) in chunk.iter().enumerate() {
                group |= u32::from(*b) << (16 - 8 * i);
            }
            for i in 0..4 {
                if i <= chunk.len() {
                    out.push(ALPHABET[(group >> (18 - 6 * i)) as usize & 0x3f] as char);
                } else {
                    out.push('=');
                }
            }
        }
        out
    }

    #[test]
    fn test_round_trip() {
        for len in 0..32 {
            let data: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            let encoded = encode(&data);
            assert_eq!(Decoder::decode_all(&encoded).unwrap(), data, "len {}", len);
        }
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(Decoder::decode_all("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(Decoder::decode_all("aGk=").unwrap(), b"hi");
        assert_eq!(Decoder::decode_all("aA==").unwrap(), b"h".to_vec());
        assert_eq!(Decoder::decode_all("YQ==").unwrap(), b"a".to_vec());
        assert_eq!(Decoder::decode_all("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_whitespace_split() {
        assert_eq!(
            Decoder::decode_all("aGVs\n bG8=").unwrap(),
            b"hello".to_vec()
        );
    }

    #[test]
    fn test_streaming_chunks() {
        let mut decoder = Decoder::new();
        let mut out = Vec::new();
        decoder.add_bytes("aGV", &mut out).unwrap();
        decoder.add_bytes("sbG8=", &mut out).unwrap();
        decoder.finish(&mut out).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Decoder::decode_all("aGVsbG8!"),
            Err(Base64Error::InvalidChar('!'))
        );
        assert_eq!(
            Decoder::decode_all("aA===="),
            Err(Base64Error::TooMuchPadding)
        );
        assert_eq!(
            Decoder::decode_all("aA==bb"),
            Err(Base64Error::DataAfterPadding)
        );
        // One residual character can never form a byte
        assert_eq!(
            Decoder::decode_all("aGVsa"),
            Err(Base64Error::IncompleteGroup)
        );
        // Residual spare bits must be zero: 'B' = 1 leaves a low bit set
        assert_eq!(
            Decoder::decode_all("aGB"),
            Err(Base64Error::IncompleteGroup)
        );
    }
}
