use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::combinator::{map, map_opt};
use nom::sequence::pair;
use serde::{Serialize, Serializer};

use crate::internal::common::parser::{NomResult, consume_all, p_i64};

/// Byte-family display units of a size value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeUnit {
    B,
    Kb,
    Mb,
    Gb,
    Tb,
    Pb,
}

impl SizeUnit {
    #[inline]
    fn shift(self) -> u32 {
        match self {
            SizeUnit::B => 0,
            SizeUnit::Kb => 10,
            SizeUnit::Mb => 20,
            SizeUnit::Gb => 30,
            SizeUnit::Tb => 40,
            SizeUnit::Pb => 50,
        }
    }

    #[inline]
    pub fn multiplier(self) -> i64 {
        1i64 << self.shift()
    }

    pub fn suffix(self) -> &'static str {
        match self {
            SizeUnit::B => "b",
            SizeUnit::Kb => "kb",
            SizeUnit::Mb => "mb",
            SizeUnit::Gb => "gb",
            SizeUnit::Tb => "tb",
            SizeUnit::Pb => "pb",
        }
    }

    fn smaller(self) -> Option<SizeUnit> {
        match self {
            SizeUnit::B => None,
            SizeUnit::Kb => Some(SizeUnit::B),
            SizeUnit::Mb => Some(SizeUnit::Kb),
            SizeUnit::Gb => Some(SizeUnit::Mb),
            SizeUnit::Tb => Some(SizeUnit::Gb),
            SizeUnit::Pb => Some(SizeUnit::Tb),
        }
    }
}

/// A decoded memory-like amount.
///
/// Two sizes are equal when they describe the same number of bytes, regardless
/// of the unit they were written in (`1gb == 1024mb`).
#[derive(Debug, Clone, Copy)]
pub struct SizeValue {
    bytes: i64,
    unit: SizeUnit,
}

impl SizeValue {
    /// Creates a size displayed in `preferred` unit, or in the largest smaller
    /// unit that represents `bytes` exactly.
    pub fn new(bytes: i64, preferred: SizeUnit) -> Self {
        let mut unit = preferred;
        while bytes % unit.multiplier() != 0 {
            match unit.smaller() {
                Some(smaller) => unit = smaller,
                None => break,
            }
        }
        SizeValue { bytes, unit }
    }

    #[inline]
    pub fn bytes(&self) -> i64 {
        self.bytes
    }

    #[inline]
    pub fn unit(&self) -> SizeUnit {
        self.unit
    }
}

impl PartialEq for SizeValue {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for SizeValue {}

impl Hash for SizeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state)
    }
}

impl Display for SizeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.bytes / self.unit.multiplier(),
            self.unit.suffix()
        )
    }
}

impl Serialize for SizeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decoded form of a raw attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Int(i64),
    Size(SizeValue),
    Str(String),
}

impl TypedValue {
    /// Numeric amount of the value: the integer itself or the byte count of a size.
    pub fn as_amount(&self) -> Option<i64> {
        match self {
            TypedValue::Int(value) => Some(*value),
            TypedValue::Size(size) => Some(size.bytes()),
            TypedValue::Str(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_amount() == Some(0)
    }

    /// Negative amounts become zero of the same kind; strings are kept.
    pub fn non_negative(self) -> TypedValue {
        match self {
            TypedValue::Int(value) if value < 0 => TypedValue::Int(0),
            TypedValue::Size(size) if size.bytes() < 0 => {
                TypedValue::Size(SizeValue::new(0, size.unit()))
            }
            value => value,
        }
    }
}

impl Display for TypedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::Int(value) => write!(f, "{value}"),
            TypedValue::Size(size) => write!(f, "{size}"),
            TypedValue::Str(value) => f.write_str(value),
        }
    }
}

/// Platform facts needed to interpret raw attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext {
    word_size: u64,
}

impl DecodeContext {
    /// `word_size` is the number of bytes per word reported by the cluster.
    /// When it is unknown, a word counts as a single byte.
    pub fn new(word_size: Option<u64>) -> Self {
        DecodeContext {
            word_size: word_size.filter(|&size| size > 0).unwrap_or(1),
        }
    }

    #[inline]
    pub fn word_size(&self) -> u64 {
        self.word_size
    }
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Clone, Copy)]
enum UnitKind {
    Bytes,
    Words,
}

fn p_unit_token<'a>(
    text: &'static str,
    unit: SizeUnit,
    kind: UnitKind,
) -> impl FnMut(&'a str) -> NomResult<'a, (SizeUnit, UnitKind)> {
    map(tag_no_case(text), move |_| (unit, kind))
}

fn p_unit(input: &str) -> NomResult<(SizeUnit, UnitKind)> {
    alt((
        p_unit_token("kb", SizeUnit::Kb, UnitKind::Bytes),
        p_unit_token("kw", SizeUnit::Kb, UnitKind::Words),
        p_unit_token("mb", SizeUnit::Mb, UnitKind::Bytes),
        p_unit_token("mw", SizeUnit::Mb, UnitKind::Words),
        p_unit_token("gb", SizeUnit::Gb, UnitKind::Bytes),
        p_unit_token("gw", SizeUnit::Gb, UnitKind::Words),
        p_unit_token("tb", SizeUnit::Tb, UnitKind::Bytes),
        p_unit_token("tw", SizeUnit::Tb, UnitKind::Words),
        p_unit_token("pb", SizeUnit::Pb, UnitKind::Bytes),
        p_unit_token("pw", SizeUnit::Pb, UnitKind::Words),
        p_unit_token("b", SizeUnit::B, UnitKind::Bytes),
        p_unit_token("w", SizeUnit::B, UnitKind::Words),
    ))(input)
}

fn p_size(input: &str, word_size: u64) -> NomResult<SizeValue> {
    map_opt(pair(p_i64, p_unit), |(count, (unit, kind))| {
        let factor = match kind {
            UnitKind::Bytes => 1,
            UnitKind::Words => i64::try_from(word_size).ok()?,
        };
        let bytes = count
            .checked_mul(unit.multiplier())?
            .checked_mul(factor)?;
        Some(SizeValue::new(bytes, unit))
    })(input)
}

/// Decodes a raw attribute value into an integer, a size or an opaque string.
///
/// Never fails: anything that is not a well-formed integer or size (including
/// numbers that overflow) is kept as the original string.
pub fn decode(raw: &str, ctx: &DecodeContext) -> TypedValue {
    if let Ok(value) = consume_all(p_i64, raw) {
        return TypedValue::Int(value);
    }
    if let Ok(size) = consume_all(|input| p_size(input, ctx.word_size()), raw) {
        return TypedValue::Size(size);
    }
    TypedValue::Str(raw.to_string())
}

/// Resources holding memory-like amounts, e.g. `mem` or `vmem`.
pub fn is_size_resource(resource: &str) -> bool {
    resource.ends_with("mem")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> TypedValue {
        decode(raw, &DecodeContext::default())
    }

    fn size(raw: &str) -> SizeValue {
        match dec(raw) {
            TypedValue::Size(size) => size,
            value => panic!("{raw} decoded as {value:?}"),
        }
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(dec("4"), TypedValue::Int(4));
        assert_eq!(dec("0"), TypedValue::Int(0));
        assert_eq!(dec("-2"), TypedValue::Int(-2));
    }

    #[test]
    fn test_decode_size_units() {
        assert_eq!(size("10b").bytes(), 10);
        assert_eq!(size("1kb").bytes(), 1024);
        assert_eq!(size("3MB").bytes(), 3 * 1024 * 1024);
        assert_eq!(size("2gb").bytes(), 2 << 30);
        assert_eq!(size("1Tb").bytes(), 1 << 40);
        assert_eq!(size("1pb").bytes(), 1 << 50);
        assert_eq!(size("-1gb").bytes(), -(1 << 30));
    }

    #[test]
    fn test_decode_words() {
        let ctx = DecodeContext::new(Some(8));
        match decode("2kw", &ctx) {
            TypedValue::Size(size) => {
                assert_eq!(size.bytes(), 2 * 1024 * 8);
                assert_eq!(size.to_string(), "16kb");
            }
            value => panic!("unexpected {value:?}"),
        }
        assert_eq!(size("5w").bytes(), 5);
    }

    #[test]
    fn test_decode_unknown_word_size() {
        assert_eq!(DecodeContext::new(None).word_size(), 1);
        assert_eq!(DecodeContext::new(Some(0)).word_size(), 1);
    }

    #[test]
    fn test_decode_fallback_to_string() {
        assert_eq!(dec("free"), TypedValue::Str("free".to_string()));
        assert_eq!(dec("4 kb"), TypedValue::Str("4 kb".to_string()));
        assert_eq!(dec("kb"), TypedValue::Str("kb".to_string()));
        assert_eq!(dec("1.5gb"), TypedValue::Str("1.5gb".to_string()));
        assert_eq!(dec(""), TypedValue::Str(String::new()));
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(dec("-3").non_negative(), TypedValue::Int(0));
        assert_eq!(dec("5").non_negative(), TypedValue::Int(5));
        assert_eq!(dec("-1gb").non_negative().to_string(), "0gb");
        assert_eq!(dec("2mb").non_negative().to_string(), "2mb");
        assert_eq!(dec("free").non_negative(), TypedValue::Str("free".to_string()));
    }

    #[test]
    fn test_decode_overflow_is_string() {
        let raw = "99999999999999999999";
        assert_eq!(dec(raw), TypedValue::Str(raw.to_string()));
        assert_eq!(dec("9000000pb"), TypedValue::Str("9000000pb".to_string()));
    }

    #[test]
    fn test_size_equality_ignores_unit() {
        assert_eq!(dec("1gb"), dec("1024mb"));
        assert_ne!(dec("1gb"), dec("1000mb"));
    }

    #[test]
    fn test_size_display_keeps_exact_unit() {
        assert_eq!(SizeValue::new(4 << 30, SizeUnit::Gb).to_string(), "4gb");
        assert_eq!(SizeValue::new(3 << 29, SizeUnit::Gb).to_string(), "1536mb");
        assert_eq!(SizeValue::new(1025, SizeUnit::Kb).to_string(), "1025b");
        assert_eq!(SizeValue::new(0, SizeUnit::Gb).to_string(), "0gb");
        assert_eq!(SizeValue::new(-(1 << 30), SizeUnit::Gb).to_string(), "-1gb");
    }

    #[test]
    fn test_size_redecodes_from_display() {
        let value = SizeValue::new(-(3 << 20), SizeUnit::Gb);
        assert_eq!(dec(&value.to_string()), TypedValue::Size(value));
    }

    #[test]
    fn test_size_resource_names() {
        assert!(is_size_resource("mem"));
        assert!(is_size_resource("vmem"));
        assert!(!is_size_resource("ncpus"));
        assert!(!is_size_resource("memory_type"));
    }
}
