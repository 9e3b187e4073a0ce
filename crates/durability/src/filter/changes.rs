//! Change-log redactor
//!
//! Change logs hold one tab-separated record per line:
//!
//! ```text
//! <timestamp>\t<ip>\t<type>\t<page>\t<user>\t<summary>...
//! ```
//!
//! Each line is split into at most three fields and the second one is
//! replaced unconditionally. Line order and line terminators (including a
//! missing final newline or `\r\n`) are kept as they are.

use super::{FilterError, FilterResult};

/// Replace the second field of every line with `sentinel`
///
/// A line with fewer than three fields fails the whole file.
pub fn redact_changes(input: &[u8], sentinel: &[u8]) -> FilterResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    for (index, line) in input.split_inclusive(|&b| b == b'\n').enumerate() {
        let mut fields = line.splitn(3, |&b| b == b'\t');
        let (Some(timestamp), Some(_), Some(rest)) = (fields.next(), fields.next(), fields.next())
        else {
            let found = line.iter().filter(|&&b| b == b'\t').count() + 1;
            return Err(FilterError::malformed(
                index + 1,
                format!("expected at least 3 tab-separated fields, found {}", found),
            ));
        };
        out.extend_from_slice(timestamp);
        out.push(b'\t');
        out.extend_from_slice(sentinel);
        out.push(b'\t');
        out.extend_from_slice(rest);
    }
    Ok(out)
}
