//! Structured-value decoder

use super::MAX_NESTING_DEPTH;
use crate::error::{DecodeError, DecodeResult};
use crate::value::StructuredValue;

/// Decode exactly one structured value from `input`
///
/// The whole input must be consumed; trailing bytes after the top-level
/// value are an error.
pub fn decode(input: &[u8]) -> DecodeResult<StructuredValue> {
    let mut decoder = Decoder::new(input);
    let value = decoder.value()?;
    if decoder.pos != input.len() {
        return Err(DecodeError::new(
            decoder.pos,
            format!(
                "{} trailing bytes after value",
                input.len() - decoder.pos
            ),
        ));
    }
    Ok(value)
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    fn next_byte(&mut self) -> DecodeResult<u8> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or_else(|| DecodeError::new(self.pos, "unexpected end of input"))?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, want: u8) -> DecodeResult<()> {
        let at = self.pos;
        let got = self.next_byte()?;
        if got != want {
            return Err(DecodeError::new(
                at,
                format!(
                    "expected '{}', found {}",
                    want as char,
                    describe_byte(got)
                ),
            ));
        }
        Ok(())
    }

    /// Take the header text up to (not including) `terminator`, consuming both.
    fn header(&mut self, terminator: u8) -> DecodeResult<&'a [u8]> {
        let input = self.input;
        let start = self.pos;
        let len = input[start..]
            .iter()
            .position(|&b| b == terminator)
            .ok_or_else(|| {
                DecodeError::new(
                    start,
                    format!("unterminated node: missing '{}'", terminator as char),
                )
            })?;
        self.pos = start + len + 1;
        Ok(&input[start..start + len])
    }

    fn length_header(&mut self, terminator: u8) -> DecodeResult<usize> {
        let at = self.pos;
        let text = self.header(terminator)?;
        if text.is_empty() || !text.iter().all(u8::is_ascii_digit) {
            return Err(DecodeError::new(
                at,
                format!("malformed header: {:?} is not a length", lossy(text)),
            ));
        }
        lossy(text)
            .parse::<usize>()
            .map_err(|e| DecodeError::new(at, format!("malformed header: {}", e)))
    }

    fn value(&mut self) -> DecodeResult<StructuredValue> {
        let at = self.pos;
        match self.next_byte()? {
            b'N' => {
                self.expect(b';')?;
                Ok(StructuredValue::Null)
            }
            b'b' => {
                self.expect(b':')?;
                let at = self.pos;
                match self.header(b';')? {
                    b"0" => Ok(StructuredValue::Bool(false)),
                    b"1" => Ok(StructuredValue::Bool(true)),
                    other => Err(DecodeError::new(
                        at,
                        format!("malformed bool {:?}", lossy(other)),
                    )),
                }
            }
            b'i' => {
                self.expect(b':')?;
                let at = self.pos;
                let text = self.header(b';')?;
                parse_int(text)
                    .map(StructuredValue::Int)
                    .ok_or_else(|| {
                        DecodeError::new(at, format!("malformed int {:?}", lossy(text)))
                    })
            }
            b'd' => {
                self.expect(b':')?;
                let at = self.pos;
                let text = self.header(b';')?;
                parse_float(text)
                    .map(StructuredValue::Float)
                    .ok_or_else(|| {
                        DecodeError::new(at, format!("malformed float {:?}", lossy(text)))
                    })
            }
            b's' => {
                self.expect(b':')?;
                let len = self.length_header(b':')?;
                self.expect(b'"')?;
                if len > self.remaining() {
                    return Err(DecodeError::new(
                        self.pos,
                        format!(
                            "truncated string: declared length {} exceeds remaining {} bytes",
                            len,
                            self.remaining()
                        ),
                    ));
                }
                let data = self.input[self.pos..self.pos + len].to_vec();
                self.pos += len;
                self.expect(b'"')?;
                self.expect(b';')?;
                Ok(StructuredValue::Bytes(data))
            }
            b'a' => {
                self.expect(b':')?;
                let count = self.length_header(b':')?;
                self.expect(b'{')?;
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(DecodeError::new(
                        at,
                        format!("nesting deeper than {} maps", MAX_NESTING_DEPTH),
                    ));
                }
                self.depth += 1;
                // Each pair needs at least four bytes ("N;N;"), so a huge
                // declared count cannot force a huge allocation.
                let mut pairs = Vec::with_capacity(count.min(self.remaining() / 4));
                for _ in 0..count {
                    let key_at = self.pos;
                    let key = self.value()?;
                    if !key.is_valid_key() {
                        return Err(DecodeError::new(
                            key_at,
                            format!("map key must be Int or Bytes, found {}", key.type_name()),
                        ));
                    }
                    let value = self.value()?;
                    pairs.push((key, value));
                }
                self.depth -= 1;
                self.expect(b'}')?;
                Ok(StructuredValue::Map(pairs))
            }
            other => Err(DecodeError::new(
                at,
                format!("unsupported tag {}", describe_byte(other)),
            )),
        }
    }
}

fn parse_int(text: &[u8]) -> Option<i64> {
    // PHP's unserialize also takes an explicit plus sign
    let digits = match text.first() {
        Some(b'-') | Some(b'+') => &text[1..],
        _ => text,
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    lossy(text).parse().ok()
}

fn parse_float(text: &[u8]) -> Option<f64> {
    match text {
        b"INF" => return Some(f64::INFINITY),
        b"-INF" => return Some(f64::NEG_INFINITY),
        b"NAN" => return Some(f64::NAN),
        _ => {}
    }
    // Rust also accepts "inf" and "nan" spellings PHP never writes
    if text.is_empty()
        || !text
            .iter()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    lossy(text).parse().ok()
}

fn lossy(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn describe_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("byte 0x{:02x}", b)
    }
}
