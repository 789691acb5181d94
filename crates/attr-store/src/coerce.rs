// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared coercion rules between native primitive widths and every requested
//! representation.
//!
//! Rules (identical for every primitive store):
//! - numeric ↔ numeric: `as` conversions. Integral narrowing wraps
//!   (two's complement); float → integral truncates toward zero and saturates,
//!   and float → `byte`/`short` narrows through `int` first.
//! - boolean → numeric: `true` = 1, `false` = 0. numeric → boolean: nonzero.
//! - char → numeric: the code point. numeric → char: truncate to a 16-bit
//!   code unit; surrogate code units read back as `U+FFFD`.
//! - text → numeric: parse the native grammar; empty or unparseable text
//!   yields the caller's fallback (type-zero for stores). numeric → text: canonical decimal text
//!   (floats keep a fractional part, e.g. `1.0`).
//! - generic value → native: dispatch on the value's kind with the rules
//!   above; `Null` and object values yield the fallback.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::unnecessary_cast
)]

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::NativeKind;
use crate::value::AttrValue;

/// A primitive native width backing a dense store.
///
/// Implementations define the conversions out of and into the native value;
/// the store layer never converts on its own.
pub trait NativeScalar:
    Copy + PartialEq + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Registered attribute type name.
    const TYPE_NAME: &'static str;
    /// Cross-type ordering rank used for deterministic serialization order.
    const ORDERING: i32;
    /// Native representation tag.
    const KIND: NativeKind;
    /// Type-zero, the built-in default.
    const ZERO: Self;

    /// Converts from an integral source (byte, short, int, long).
    fn from_i64(value: i64) -> Self;
    /// Converts from a floating-point source.
    fn from_f64(value: f64) -> Self;
    /// Converts from a boolean source (`true` = 1).
    fn from_bool(value: bool) -> Self {
        Self::from_i64(i64::from(value))
    }
    /// Converts from a character source (its code point).
    fn from_char(value: char) -> Self {
        Self::from_i64(i64::from(u32::from(value)))
    }
    /// Parses the native textual grammar; `None` on failure.
    fn parse(text: &str) -> Option<Self>;

    /// Reads as `int`.
    fn to_i32(self) -> i32;
    /// Reads as `long`.
    fn to_i64(self) -> i64;
    /// Reads as `float`.
    fn to_f32(self) -> f32;
    /// Reads as `double`.
    fn to_f64(self) -> f64;
    /// Reads as `boolean` (nonzero is `true`).
    fn to_bool(self) -> bool;
    /// Canonical text.
    fn to_text(self) -> String;
    /// Reads as `byte` (narrowed through `int`).
    fn to_i8(self) -> i8 {
        self.to_i32() as i8
    }
    /// Reads as `short` (narrowed through `int`).
    fn to_i16(self) -> i16 {
        self.to_i32() as i16
    }
    /// Reads as `char` (16-bit code unit).
    fn to_char(self) -> char {
        code_unit_to_char(self.to_i32() as u16)
    }

    /// Packs the native value into the `i64` undo channel, bit-exact.
    fn to_undo_bits(self) -> i64;
    /// Unpacks a value produced by [`NativeScalar::to_undo_bits`].
    fn from_undo_bits(bits: i64) -> Self;

    /// 32-bit value hash.
    fn hash32(self) -> i32;
    /// Native value equality. Floats compare by bit pattern so that equality
    /// stays reflexive for NaN.
    fn same(self, other: Self) -> bool;

    /// Wraps the native value as a generic value.
    fn to_value(self) -> AttrValue;
}

/// Maps a 16-bit code unit to a `char`; surrogates become `U+FFFD`.
#[must_use]
pub fn code_unit_to_char(unit: u16) -> char {
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Parses `text` into `T`, yielding `fallback` for empty or unparseable input.
pub fn text_to_native<T: NativeScalar>(text: &str, fallback: T) -> T {
    if text.is_empty() {
        return fallback;
    }
    T::parse(text).unwrap_or(fallback)
}

/// Converts a generic value into `T` by dispatching on its dynamic kind.
///
/// `Null`, object values, and unparseable text yield `fallback`.
pub fn value_to_native<T: NativeScalar>(value: &AttrValue, fallback: T) -> T {
    match value {
        AttrValue::Byte(v) => T::from_i64(i64::from(*v)),
        AttrValue::Short(v) => T::from_i64(i64::from(*v)),
        AttrValue::Int(v) => T::from_i64(i64::from(*v)),
        AttrValue::Long(v) => T::from_i64(*v),
        AttrValue::Float(v) => T::from_f64(f64::from(*v)),
        AttrValue::Double(v) => T::from_f64(*v),
        AttrValue::Bool(v) => T::from_bool(*v),
        AttrValue::Char(v) => T::from_char(*v),
        AttrValue::Str(s) => text_to_native(s, fallback),
        AttrValue::Null | AttrValue::Object(_) => fallback,
    }
}

macro_rules! integral_scalar {
    ($ty:ty, $name:literal, $ordering:literal, $kind:ident, $variant:ident, via $via:ty) => {
        impl NativeScalar for $ty {
            const TYPE_NAME: &'static str = $name;
            const ORDERING: i32 = $ordering;
            const KIND: NativeKind = NativeKind::$kind;
            const ZERO: Self = 0;

            fn from_i64(value: i64) -> Self {
                value as $ty
            }
            fn from_f64(value: f64) -> Self {
                (value as $via) as $ty
            }
            fn parse(text: &str) -> Option<Self> {
                text.parse::<$ty>().ok()
            }
            fn to_i32(self) -> i32 {
                self as i32
            }
            fn to_i64(self) -> i64 {
                self as i64
            }
            fn to_f32(self) -> f32 {
                self as f32
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn to_bool(self) -> bool {
                self != 0
            }
            fn to_text(self) -> String {
                self.to_string()
            }
            fn to_undo_bits(self) -> i64 {
                self as i64
            }
            fn from_undo_bits(bits: i64) -> Self {
                bits as $ty
            }
            fn hash32(self) -> i32 {
                self as i32
            }
            fn same(self, other: Self) -> bool {
                self == other
            }
            fn to_value(self) -> AttrValue {
                AttrValue::$variant(self)
            }
        }
    };
}

integral_scalar!(i8, "byte", 1, Byte, Byte, via i32);
integral_scalar!(i16, "short", 2, Short, Short, via i32);
integral_scalar!(i32, "integer", 3, Int, Int, via i32);
integral_scalar!(i64, "long", 4, Long, Long, via i64);

impl NativeScalar for f32 {
    const TYPE_NAME: &'static str = "float";
    const ORDERING: i32 = 5;
    const KIND: NativeKind = NativeKind::Float;
    const ZERO: Self = 0.0;

    fn from_i64(value: i64) -> Self {
        value as f32
    }
    fn from_f64(value: f64) -> Self {
        value as f32
    }
    fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<f32>().ok()
    }
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn to_i64(self) -> i64 {
        self as i64
    }
    fn to_f32(self) -> f32 {
        self
    }
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
    fn to_bool(self) -> bool {
        self != 0.0
    }
    fn to_text(self) -> String {
        format!("{self:?}")
    }
    fn to_undo_bits(self) -> i64 {
        i64::from(self.to_bits())
    }
    fn from_undo_bits(bits: i64) -> Self {
        f32::from_bits(bits as u32)
    }
    fn hash32(self) -> i32 {
        self.to_bits() as i32
    }
    fn same(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
    fn to_value(self) -> AttrValue {
        AttrValue::Float(self)
    }
}

impl NativeScalar for f64 {
    const TYPE_NAME: &'static str = "double";
    const ORDERING: i32 = 6;
    const KIND: NativeKind = NativeKind::Double;
    const ZERO: Self = 0.0;

    fn from_i64(value: i64) -> Self {
        value as f64
    }
    fn from_f64(value: f64) -> Self {
        value
    }
    fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<f64>().ok()
    }
    fn to_i32(self) -> i32 {
        self as i32
    }
    fn to_i64(self) -> i64 {
        self as i64
    }
    fn to_f32(self) -> f32 {
        self as f32
    }
    fn to_f64(self) -> f64 {
        self
    }
    fn to_bool(self) -> bool {
        self != 0.0
    }
    fn to_text(self) -> String {
        format!("{self:?}")
    }
    fn to_undo_bits(self) -> i64 {
        self.to_bits() as i64
    }
    fn from_undo_bits(bits: i64) -> Self {
        f64::from_bits(bits as u64)
    }
    fn hash32(self) -> i32 {
        let bits = self.to_bits();
        (bits ^ (bits >> 32)) as i32
    }
    fn same(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
    fn to_value(self) -> AttrValue {
        AttrValue::Double(self)
    }
}

impl NativeScalar for bool {
    const TYPE_NAME: &'static str = "boolean";
    const ORDERING: i32 = 0;
    const KIND: NativeKind = NativeKind::Boolean;
    const ZERO: Self = false;

    fn from_i64(value: i64) -> Self {
        value != 0
    }
    fn from_f64(value: f64) -> Self {
        value != 0.0
    }
    fn from_bool(value: bool) -> Self {
        value
    }
    fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
    fn to_i32(self) -> i32 {
        i32::from(self)
    }
    fn to_i64(self) -> i64 {
        i64::from(self)
    }
    fn to_f32(self) -> f32 {
        f32::from(u8::from(self))
    }
    fn to_f64(self) -> f64 {
        f64::from(u8::from(self))
    }
    fn to_bool(self) -> bool {
        self
    }
    fn to_text(self) -> String {
        self.to_string()
    }
    fn to_undo_bits(self) -> i64 {
        i64::from(self)
    }
    fn from_undo_bits(bits: i64) -> Self {
        bits != 0
    }
    fn hash32(self) -> i32 {
        i32::from(self)
    }
    fn same(self, other: Self) -> bool {
        self == other
    }
    fn to_value(self) -> AttrValue {
        AttrValue::Bool(self)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn float_to_narrow_integral_goes_through_int() {
        // 300 as int is 300; narrowing to byte wraps to 44.
        assert_eq!(300.7_f64.to_i8(), 44);
        assert_eq!(i8::from_f64(300.7), 44);
        // Saturating at the int boundary, then wrapping to short.
        assert_eq!(3.0e10_f64.to_i32(), i32::MAX);
        assert_eq!(3.0e10_f64.to_i16(), -1);
        assert_eq!(f64::NAN.to_i64(), 0);
        assert_eq!((-2.9_f32).to_i64(), -2);
    }

    #[test]
    fn integral_narrowing_wraps() {
        assert_eq!(0x1_0000_0001_i64.to_i32(), 1);
        assert_eq!(257_i64.to_i8(), 1);
        assert_eq!((-1_i64).to_i16(), -1);
        assert_eq!(i16::from_i64(65_537), 1);
    }

    #[test]
    fn char_rules() {
        assert_eq!(i64::from_char('A'), 65);
        assert_eq!(65_i64.to_char(), 'A');
        // Code point above the BMP truncates to its low 16 bits.
        assert_eq!(i64::from_char('\u{1F600}'), 0x1F600);
        assert_eq!(0x1F600_i64.to_char(), '\u{F600}');
        // Surrogate code units cannot be represented.
        assert_eq!(0xD800_i64.to_char(), char::REPLACEMENT_CHARACTER);
        assert_eq!(true.to_char(), '\u{1}');
    }

    #[test]
    fn text_rules() {
        assert_eq!(text_to_native("42", 7_i64), 42);
        assert_eq!(text_to_native("+42", 7_i64), 42);
        assert_eq!(text_to_native("4.2", 7_i64), 7);
        assert_eq!(text_to_native("", 7_i64), 7);
        assert_eq!(text_to_native(" 2.5 ", 0.0_f32), 2.5);
        assert!(text_to_native("TRUE", false));
        assert!(text_to_native("yes", true));
        assert!(!text_to_native("yes", false));
        assert_eq!(1.0_f32.to_text(), "1.0");
        assert_eq!((-3_i64).to_text(), "-3");
    }

    #[test]
    fn generic_dispatch() {
        assert_eq!(value_to_native(&AttrValue::Bool(true), 9_i32), 1);
        assert_eq!(value_to_native(&AttrValue::Double(-7.9), 0_i64), -7);
        assert_eq!(value_to_native(&AttrValue::Char('a'), 0_i16), 97);
        assert_eq!(value_to_native(&AttrValue::Null, 5_i64), 5);
        assert!(!value_to_native(&AttrValue::Long(0), true));
        assert_eq!(value_to_native(&AttrValue::Str("x".into()), 3.5_f64), 3.5);
    }

    #[test]
    fn undo_bits_are_exact_for_floats() {
        let odd = f64::from_bits(0x7ff8_0000_dead_beef);
        assert_eq!(f64::from_undo_bits(odd.to_undo_bits()).to_bits(), odd.to_bits());
        let neg_zero = -0.0_f32;
        assert_eq!(
            f32::from_undo_bits(neg_zero.to_undo_bits()).to_bits(),
            neg_zero.to_bits()
        );
        assert!(f32::NAN.same(f32::NAN));
    }
}
