//! Page-metadata redactor
//!
//! Metadata files are serialized maps with two state snapshots:
//!
//! ```text
//! current    => { ..., last_change => { date, ip, type, id, user, sum, ... } }
//! persistent => { ..., last_change => { ... } }
//! ```
//!
//! Only `<snapshot>.last_change.ip` is touched. Other IP-looking fields are
//! left alone, as are key order, every other field and any other top-level
//! key.

use wikivault_core::{decode, encode, StructuredValue};

use super::FilterResult;
use crate::policy::{RedactionPolicy, LOOPBACK_IP};

/// Top-level keys holding a state snapshot
pub const STATE_KEYS: [&[u8]; 2] = [b"current", b"persistent"];

/// Decode, redact and re-encode a metadata file
pub fn redact_meta(input: &[u8], policy: &RedactionPolicy) -> FilterResult<Vec<u8>> {
    let mut value = decode(input)?;
    redact_meta_value(&mut value, policy);
    Ok(encode(&value))
}

/// Redact `last_change.ip` in place, returning how many fields were replaced
///
/// A snapshot, `last_change` or `ip` that is missing or not a map is
/// skipped. Duplicate keys are all visited, so no earlier copy of an
/// address survives. The loopback address is kept; any other `ip` value,
/// whatever its type, becomes the sentinel.
pub fn redact_meta_value(value: &mut StructuredValue, policy: &RedactionPolicy) -> usize {
    let mut replaced = 0;
    for key in STATE_KEYS {
        for snapshot in value.get_all_mut(key) {
            for change in snapshot.get_all_mut(b"last_change") {
                for ip in change.get_all_mut(b"ip") {
                    if ip.as_bytes() != Some(LOOPBACK_IP) {
                        *ip = StructuredValue::bytes(policy.sentinel_bytes());
                        replaced += 1;
                    }
                }
            }
        }
    }
    replaced
}
