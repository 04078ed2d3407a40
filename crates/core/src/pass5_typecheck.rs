//! Pass 5: validate declared type tags against the resolved, evaluated
//! value texts.
//!
//! Untyped items are never checked. Typed items with an empty text are
//! declarations (abstract type anchors), not classifications, and are
//! skipped. Every mismatch in a run is reported, not just the first.

use crate::ast::{Glut, TypeTag};
use crate::error::{Code, Diagnostics};

pub fn check_types(glut: &Glut, diags: &mut Diagnostics) {
    for scope in glut.values() {
        for value in scope.llut.values() {
            if value.placeholder || value.text.is_empty() {
                continue;
            }
            if let Some(tag) = value.type_tag {
                if !accepts(tag, &value.text) {
                    diags.report(Code::E07, &value.trace, tag.name());
                }
            }
        }
    }
}

/// Whether `text` is a legal literal for the given tag.
pub fn accepts(tag: TypeTag, text: &str) -> bool {
    match tag {
        TypeTag::Str => true,
        TypeTag::Bool => text == "True" || text == "False",
        TypeTag::Int => parse_int(text).is_some(),
        TypeTag::I8 => fits(text, i8::MIN as i64, i8::MAX as i64),
        TypeTag::I16 => fits(text, i16::MIN as i64, i16::MAX as i64),
        TypeTag::I32 => fits(text, i32::MIN as i64, i32::MAX as i64),
        TypeTag::I64 => parse_int(text).is_some(),
        TypeTag::U8 => fits(text, 0, u8::MAX as i64),
        TypeTag::Float | TypeTag::F64 => as_numeric(text).is_some(),
        TypeTag::F32 => matches!(as_numeric(text), Some(v) if (v as f32).is_finite()),
    }
}

fn fits(text: &str, min: i64, max: i64) -> bool {
    matches!(parse_int(text), Some(v) if (min..=max).contains(&v))
}

/// Parse an integer literal: decimal, `0x` hex, `0o` octal, or `0b`
/// binary, with an optional sign. Radix digits are an unsigned magnitude,
/// so `0b10000000` is 128, not -128.
fn parse_int(text: &str) -> Option<i64> {
    let t = text.trim();
    let (sign, body) = match t.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", t.strip_prefix('+').unwrap_or(t)),
    };
    let (radix, digits) = if let Some(d) = body.strip_prefix("0x").or(body.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = body.strip_prefix("0o").or(body.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = body.strip_prefix("0b").or(body.strip_prefix("0B")) {
        (2, d)
    } else {
        (10, body)
    };
    if digits.is_empty() {
        return None;
    }
    i64::from_str_radix(&format!("{}{}", sign, digits), radix).ok()
}

fn parse_float(text: &str) -> Option<f64> {
    let t = text.trim();
    if !t.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    t.parse::<f64>().ok()
}

/// A numeric literal of either shape, as f64.
fn as_numeric(text: &str) -> Option<f64> {
    if let Some(i) = parse_int(text) {
        return Some(i as f64);
    }
    parse_float(text)
}
