//! EIP-712 typed structured data.
//!
//! Implements `encodeType`, `encodeData` and `hashStruct` as specified by
//! EIP-712 and as implemented by `eth_signTypedData_v4` wallets:
//!
//! - referenced struct types are appended to `encodeType` sorted by name;
//! - `string` and `bytes` values are Keccak-hashed;
//! - arrays hash the concatenation of their encoded elements;
//! - a missing or `null` struct value encodes as 32 zero bytes, while a
//!   missing atomic value is an error;
//! - message fields that the type does not declare are ignored.
//!
//! [`TypeTable`] keeps insertion order so that a serialized [`TypedData`] is
//! reproducible byte for byte.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::CryptoError;
use crate::hashing::{keccak256, Hash};

/// Name of the type describing the signing domain.
pub const EIP712_DOMAIN_TYPE_NAME: &str = "EIP712Domain";

type Word = [u8; 32];

/// One `{name, type}` member of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Ordered mapping from struct type name to its member list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTable {
    entries: Vec<(String, Vec<TypedDataField>)>,
}

impl TypeTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a type. Re-inserting an existing name replaces its members in
    /// place and keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, fields: Vec<TypedDataField>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = fields,
            None => self.entries.push((name, fields)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, fields: Vec<TypedDataField>) -> Self {
        self.insert(name, fields);
        self
    }

    /// Members of the named type, if declared.
    pub fn get(&self, name: &str) -> Option<&[TypedDataField]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fields)| fields.as_slice())
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of declared types, the domain type included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TypedDataField])> {
        self.entries
            .iter()
            .map(|(n, fields)| (n.as_str(), fields.as_slice()))
    }

    /// Struct types reachable from `root` (inclusive), in depth-first order
    /// of first reference.
    ///
    /// Fails with [`CryptoError::UnknownType`] if any reachable member type
    /// is neither atomic nor declared in the table.
    pub fn dependencies(&self, root: &str) -> Result<Vec<&str>, CryptoError> {
        let mut found = Vec::new();
        self.collect_dependencies(root, &mut found)?;
        Ok(found)
    }

    fn collect_dependencies<'a>(
        &'a self,
        type_name: &str,
        found: &mut Vec<&'a str>,
    ) -> Result<(), CryptoError> {
        let base = base_type(type_name);
        if found.contains(&base) {
            return Ok(());
        }
        match self.entries.iter().find(|(n, _)| n == base) {
            Some((name, fields)) => {
                found.push(name.as_str());
                for field in fields {
                    self.collect_dependencies(&field.type_name, found)?;
                }
                Ok(())
            }
            None if is_atomic_type(base) => Ok(()),
            None => Err(CryptoError::UnknownType(base.to_string())),
        }
    }

    /// `encodeType`: the primary type followed by its dependencies sorted
    /// by name, e.g. `Mail(Person from,Person to,string contents)Person(...)`.
    pub fn encode_type(&self, primary: &str) -> Result<String, CryptoError> {
        let mut deps = self.dependencies(primary)?;
        if deps.is_empty() {
            return Err(CryptoError::UnknownType(primary.to_string()));
        }
        let primary = deps.remove(0);
        deps.sort_unstable();

        let mut out = String::new();
        for name in std::iter::once(primary).chain(deps) {
            let fields = self
                .get(name)
                .ok_or_else(|| CryptoError::UnknownType(name.to_string()))?;
            out.push_str(name);
            out.push('(');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&field.type_name);
                out.push(' ');
                out.push_str(&field.name);
            }
            out.push(')');
        }
        Ok(out)
    }

    /// `typeHash = keccak256(encodeType(primary))`.
    pub fn type_hash(&self, primary: &str) -> Result<Hash, CryptoError> {
        Ok(keccak256(self.encode_type(primary)?.as_bytes()))
    }

    /// `encodeData`: the type hash followed by one 32-byte word per member.
    pub fn encode_data(&self, primary: &str, value: &Value) -> Result<Vec<u8>, CryptoError> {
        let fields = self
            .get(primary)
            .ok_or_else(|| CryptoError::UnknownType(primary.to_string()))?;
        let object = value.as_object().ok_or_else(|| CryptoError::InvalidValue {
            type_name: primary.to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(value)),
        })?;

        let mut out = Vec::with_capacity(32 * (fields.len() + 1));
        out.extend_from_slice(&self.type_hash(primary)?);
        for field in fields {
            let word = self.encode_field(&field.name, &field.type_name, object.get(&field.name))?;
            out.extend_from_slice(&word);
        }
        Ok(out)
    }

    /// `hashStruct = keccak256(encodeData(primary, value))`.
    pub fn hash_struct(&self, primary: &str, value: &Value) -> Result<Hash, CryptoError> {
        Ok(keccak256(&self.encode_data(primary, value)?))
    }

    fn encode_field(
        &self,
        field: &str,
        type_name: &str,
        value: Option<&Value>,
    ) -> Result<Word, CryptoError> {
        if self.contains(type_name) {
            return match value {
                None | Some(Value::Null) => Ok([0u8; 32]),
                Some(v) => self.hash_struct(type_name, v),
            };
        }

        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => {
                return Err(CryptoError::MissingValue {
                    field: field.to_string(),
                    type_name: type_name.to_string(),
                })
            }
        };

        if let Some((element, fixed_len)) = split_array_type(type_name) {
            let items = value.as_array().ok_or_else(|| CryptoError::InvalidValue {
                type_name: type_name.to_string(),
                reason: format!("expected a JSON array, got {}", json_kind(value)),
            })?;
            if let Some(len) = fixed_len {
                if items.len() != len {
                    return Err(CryptoError::InvalidValue {
                        type_name: type_name.to_string(),
                        reason: format!("expected {} elements, got {}", len, items.len()),
                    });
                }
            }
            let mut buf = Vec::with_capacity(items.len() * 32);
            for item in items {
                buf.extend_from_slice(&self.encode_field(field, element, Some(item))?);
            }
            return Ok(keccak256(&buf));
        }

        encode_atomic(type_name, value)
    }
}

impl Serialize for TypeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, fields) in &self.entries {
            map.serialize_entry(name, fields)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TypeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = TypeTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from type name to a list of {name, type} members")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TypeTable, A::Error> {
                let mut table = TypeTable::new();
                while let Some((name, fields)) =
                    access.next_entry::<String, Vec<TypedDataField>>()?
                {
                    table.insert(name, fields);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// The `EIP712Domain` value. Field order is part of the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: String,
}

/// A complete `eth_signTypedData_v4` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub domain: Eip712Domain,
    pub primary_type: String,
    pub message: Value,
    pub types: TypeTable,
}

impl TypedData {
    /// Check that the domain type is declared and that every type reachable
    /// from the primary type is known.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if !self.types.contains(EIP712_DOMAIN_TYPE_NAME) {
            return Err(CryptoError::UnknownType(EIP712_DOMAIN_TYPE_NAME.to_string()));
        }
        self.types.dependencies(EIP712_DOMAIN_TYPE_NAME)?;
        if self.types.dependencies(&self.primary_type)?.is_empty() {
            return Err(CryptoError::UnknownType(self.primary_type.clone()));
        }
        Ok(())
    }

    /// `hashStruct(EIP712Domain, domain)`.
    pub fn domain_separator(&self) -> Result<Hash, CryptoError> {
        let domain = serde_json::to_value(&self.domain)?;
        self.types.hash_struct(EIP712_DOMAIN_TYPE_NAME, &domain)
    }

    /// `hashStruct(primaryType, message)`.
    pub fn message_hash(&self) -> Result<Hash, CryptoError> {
        self.types.hash_struct(&self.primary_type, &self.message)
    }

    /// The digest a wallet signs:
    /// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(message))`.
    pub fn signing_hash(&self) -> Result<Hash, CryptoError> {
        self.validate()?;
        let mut buf = Vec::with_capacity(66);
        buf.extend_from_slice(&[0x19, 0x01]);
        buf.extend_from_slice(&self.domain_separator()?);
        if self.primary_type != EIP712_DOMAIN_TYPE_NAME {
            buf.extend_from_slice(&self.message_hash()?);
        }
        Ok(keccak256(&buf))
    }

    /// Compact JSON in the field order wallets receive it.
    pub fn to_json_string(&self) -> Result<String, CryptoError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Element type of a (possibly nested) array type: `Item[][2]` → `Item`.
pub fn base_type(type_name: &str) -> &str {
    let mut base = type_name;
    while let Some((element, _)) = split_array_type(base) {
        base = element;
    }
    base
}

/// `T[]` → `(T, None)`, `T[3]` → `(T, Some(3))`.
fn split_array_type(type_name: &str) -> Option<(&str, Option<usize>)> {
    let inner = type_name.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let len = &inner[open + 1..];
    let fixed = if len.is_empty() {
        None
    } else {
        Some(len.parse().ok()?)
    };
    Some((&inner[..open], fixed))
}

fn int_bits(type_name: &str, prefix: &str) -> Option<usize> {
    let bits: usize = type_name.strip_prefix(prefix)?.parse().ok()?;
    (bits >= 8 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

fn fixed_bytes_len(type_name: &str) -> Option<usize> {
    let len: usize = type_name.strip_prefix("bytes")?.parse().ok()?;
    (1..=32).contains(&len).then_some(len)
}

/// Whether `type_name` is an EIP-712 atomic or dynamic primitive type.
pub fn is_atomic_type(type_name: &str) -> bool {
    matches!(type_name, "string" | "bytes" | "bool" | "address")
        || int_bits(type_name, "uint").is_some()
        || int_bits(type_name, "int").is_some()
        || fixed_bytes_len(type_name).is_some()
}

fn encode_atomic(type_name: &str, value: &Value) -> Result<Word, CryptoError> {
    let invalid = |reason: String| CryptoError::InvalidValue {
        type_name: type_name.to_string(),
        reason,
    };

    match type_name {
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid(format!("expected a string, got {}", json_kind(value))))?;
            Ok(keccak256(s.as_bytes()))
        }
        "bytes" => Ok(keccak256(&decode_hex_value(type_name, value)?)),
        "bool" => {
            let b = value
                .as_bool()
                .ok_or_else(|| invalid(format!("expected a boolean, got {}", json_kind(value))))?;
            let mut word = [0u8; 32];
            word[31] = u8::from(b);
            Ok(word)
        }
        "address" => {
            let s = value
                .as_str()
                .ok_or_else(|| invalid(format!("expected a hex string, got {}", json_kind(value))))?;
            address_word(s).ok_or_else(|| invalid(format!("not a 160-bit hex address: {}", s)))
        }
        _ => {
            if let Some(bits) = int_bits(type_name, "uint") {
                let (negative, magnitude) = integer_parts(value).map_err(invalid)?;
                if negative && magnitude != [0u8; 32] {
                    return Err(invalid("negative value for unsigned type".into()));
                }
                if !fits_bits(&magnitude, bits) {
                    return Err(invalid(format!("value exceeds {} bits", bits)));
                }
                return Ok(magnitude);
            }
            if let Some(bits) = int_bits(type_name, "int") {
                let (negative, magnitude) = integer_parts(value).map_err(invalid)?;
                let in_range = fits_bits(&magnitude, bits - 1)
                    || (negative && magnitude == pow2_word(bits - 1));
                if !in_range {
                    return Err(invalid(format!("value exceeds {} bits", bits)));
                }
                return Ok(if negative {
                    negate(magnitude)
                } else {
                    magnitude
                });
            }
            if let Some(len) = fixed_bytes_len(type_name) {
                let bytes = decode_hex_value(type_name, value)?;
                if bytes.len() > len {
                    return Err(invalid(format!(
                        "expected at most {} bytes, got {}",
                        len,
                        bytes.len()
                    )));
                }
                let mut word = [0u8; 32];
                word[..bytes.len()].copy_from_slice(&bytes);
                return Ok(word);
            }
            Err(CryptoError::UnknownType(type_name.to_string()))
        }
    }
}

fn decode_hex_value(type_name: &str, value: &Value) -> Result<Vec<u8>, CryptoError> {
    let s = value.as_str().ok_or_else(|| CryptoError::InvalidValue {
        type_name: type_name.to_string(),
        reason: format!("expected a 0x-prefixed hex string, got {}", json_kind(value)),
    })?;
    decode_prefixed_hex(s).ok_or_else(|| CryptoError::InvalidValue {
        type_name: type_name.to_string(),
        reason: format!("not a 0x-prefixed hex string: {}", s),
    })
}

fn decode_prefixed_hex(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{}", digits)).ok()
    } else {
        hex::decode(digits).ok()
    }
}

/// Parse an address as an unsigned integer of at most 160 bits. Leading
/// zeros are permitted, so over-long zero placeholders still encode.
fn address_word(s: &str) -> Option<Word> {
    let bytes = decode_prefixed_hex(s)?;
    if bytes.is_empty() {
        return None;
    }
    let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[first_nonzero..];
    if significant.len() > 20 {
        return None;
    }
    let mut word = [0u8; 32];
    word[32 - significant.len()..].copy_from_slice(significant);
    Some(word)
}

/// Split a JSON integer (number, decimal string or 0x hex string) into a
/// sign and a 256-bit big-endian magnitude.
fn integer_parts(value: &Value) -> Result<(bool, Word), String> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(format!("expected an integer, got {}", json_kind(other))),
    };
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let magnitude = if digits.starts_with("0x") || digits.starts_with("0X") {
        let bytes = decode_prefixed_hex(digits).ok_or_else(|| format!("invalid hex integer: {}", text))?;
        let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let significant = &bytes[first_nonzero..];
        if significant.len() > 32 {
            return Err(format!("integer exceeds 256 bits: {}", text));
        }
        let mut word = [0u8; 32];
        word[32 - significant.len()..].copy_from_slice(significant);
        word
    } else {
        decimal_word(digits).ok_or_else(|| format!("invalid integer: {}", text))?
    };
    Ok((negative, magnitude))
}

fn decimal_word(digits: &str) -> Option<Word> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut word = [0u8; 32];
    for d in digits.bytes() {
        let mut carry = u32::from(d - b'0');
        for byte in word.iter_mut().rev() {
            let v = u32::from(*byte) * 10 + carry;
            *byte = (v & 0xff) as u8;
            carry = v >> 8;
        }
        if carry != 0 {
            return None;
        }
    }
    Some(word)
}

/// Whether `word < 2^bits`.
fn fits_bits(word: &Word, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let high_bytes = 32 - bits.div_ceil(8);
    if word[..high_bytes].iter().any(|b| *b != 0) {
        return false;
    }
    let rem = bits % 8;
    rem == 0 || word[high_bytes] >> rem == 0
}

fn pow2_word(exp: usize) -> Word {
    let mut word = [0u8; 32];
    word[31 - exp / 8] = 1 << (exp % 8);
    word
}

/// Two's-complement negation.
fn negate(mut word: Word) -> Word {
    for byte in word.iter_mut() {
        *byte = !*byte;
    }
    for byte in word.iter_mut().rev() {
        let (v, overflow) = byte.overflowing_add(1);
        *byte = v;
        if !overflow {
            break;
        }
    }
    word
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
