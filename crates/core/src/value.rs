//! Value types for the structured serialization format
//!
//! `StructuredValue` mirrors the node kinds of PHP's `serialize()` output:
//! - Null, Bool, Int, Float, Bytes, Map
//!
//! ## Maps are ordered pair lists
//!
//! PHP encodes both arrays and dictionaries as `a:<n>:{...}` with explicit
//! keys. A `Map` is therefore a `Vec` of `(key, value)` pairs, not a hash
//! map: key order and key type (`Int(0)` vs `Bytes(b"0")`) survive a
//! decode/encode cycle exactly as read.
//!
//! Keys are always `Int` or `Bytes`. The decoder rejects anything else, and
//! values built in memory must follow the same rule to stay decodable.
//!
//! ## Float equality
//!
//! Floats compare by bit pattern, so `-0.0 != 0.0`. Every NaN equals every
//! other NaN: the format spells them all `NAN` and keeps no payload or sign.

/// One decoded node of the structured serialization format
#[derive(Debug, Clone)]
pub enum StructuredValue {
    /// `N;`
    Null,
    /// `b:0;` or `b:1;`
    Bool(bool),
    /// `i:<n>;`
    Int(i64),
    /// `d:<n>;`
    Float(f64),
    /// `s:<len>:"<bytes>";`, raw bytes with no encoding assumed
    Bytes(Vec<u8>),
    /// `a:<count>:{<key><value>...}`, pairs in stored order
    Map(Vec<(StructuredValue, StructuredValue)>),
}

impl StructuredValue {
    /// Build a byte-string node
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        StructuredValue::Bytes(data.into())
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            StructuredValue::Null => "Null",
            StructuredValue::Bool(_) => "Bool",
            StructuredValue::Int(_) => "Int",
            StructuredValue::Float(_) => "Float",
            StructuredValue::Bytes(_) => "Bytes",
            StructuredValue::Map(_) => "Map",
        }
    }

    /// Whether this node may appear as a map key
    pub fn is_valid_key(&self) -> bool {
        matches!(self, StructuredValue::Int(_) | StructuredValue::Bytes(_))
    }

    /// Borrow the raw bytes of a `Bytes` node
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            StructuredValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow the pairs of a `Map` node
    pub fn as_map(&self) -> Option<&[(StructuredValue, StructuredValue)]> {
        match self {
            StructuredValue::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a byte-string key in a `Map` node
    ///
    /// When a key occurs more than once the last occurrence wins, which is
    /// how PHP itself resolves duplicates on unserialize. Returns `None` for
    /// non-map nodes.
    pub fn get(&self, key: &[u8]) -> Option<&StructuredValue> {
        self.as_map()?
            .iter()
            .rev()
            .find(|(k, _)| k.as_bytes() == Some(key))
            .map(|(_, v)| v)
    }

    /// Mutable counterpart of [`StructuredValue::get`]
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut StructuredValue> {
        match self {
            StructuredValue::Map(pairs) => pairs
                .iter_mut()
                .rev()
                .find(|(k, _)| k.as_bytes() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Every value stored under a byte-string key, duplicates included
    ///
    /// Yields nothing for non-map nodes.
    pub fn get_all_mut<'a>(
        &'a mut self,
        key: &'a [u8],
    ) -> impl Iterator<Item = &'a mut StructuredValue> + 'a {
        let pairs = match self {
            StructuredValue::Map(pairs) => Some(pairs),
            _ => None,
        };
        pairs
            .into_iter()
            .flat_map(|pairs| pairs.iter_mut())
            .filter(move |(k, _)| k.as_bytes() == Some(key))
            .map(|(_, v)| v)
    }
}

impl PartialEq for StructuredValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StructuredValue::Null, StructuredValue::Null) => true,
            (StructuredValue::Bool(a), StructuredValue::Bool(b)) => a == b,
            (StructuredValue::Int(a), StructuredValue::Int(b)) => a == b,
            (StructuredValue::Float(a), StructuredValue::Float(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (StructuredValue::Bytes(a), StructuredValue::Bytes(b)) => a == b,
            (StructuredValue::Map(a), StructuredValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for StructuredValue {
    fn from(b: bool) -> Self {
        StructuredValue::Bool(b)
    }
}

impl From<i64> for StructuredValue {
    fn from(n: i64) -> Self {
        StructuredValue::Int(n)
    }
}

impl From<f64> for StructuredValue {
    fn from(f: f64) -> Self {
        StructuredValue::Float(f)
    }
}

impl From<&str> for StructuredValue {
    fn from(s: &str) -> Self {
        StructuredValue::Bytes(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for StructuredValue {
    fn from(b: &[u8]) -> Self {
        StructuredValue::Bytes(b.to_vec())
    }
}
