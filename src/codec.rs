//! TypedValue codec — bidirectional conversion between engine-native
//! attribute values and their JSON-compatible wire form.
//!
//! Encoding is total over the closed `AttrValue` set: anything else is a hard
//! `UnsupportedType` error, never a silent fallback. Decoding is the exact
//! inverse for known kinds; unknown kind tags (records written by a newer
//! schema) go through a documented last-resort path that rebuilds the node's
//! current attribute shape positionally from the payload's numeric elements.

use serde_json::{Value as Json, json};

use crate::model::{AttrValue, Mat3, Mat4, Material, TypedValue, ValueKind};
use crate::{Error, Result};

// ============================================================================
// Encode
// ============================================================================

/// Encode one attribute value. `attribute` is only used for error context.
pub fn encode(attribute: &str, value: &AttrValue) -> Result<TypedValue> {
    let kind = value.kind().ok_or_else(|| Error::UnsupportedType {
        attribute: attribute.to_owned(),
        type_name: value.type_name().to_owned(),
    })?;

    let payload = match value {
        AttrValue::String(s) => json!(s),
        AttrValue::Int(i) => json!(i),
        AttrValue::Float(f) => json!(f),
        AttrValue::Bool(b) => json!(b),
        AttrValue::Vec3(v) | AttrValue::Color(v) => json!(v),
        AttrValue::Vec4(v) | AttrValue::Quat(v) => json!(v),
        AttrValue::Mat3(m) => json!(m.to_row_major()),
        AttrValue::Mat4(m) => json!(m.to_row_major()),
        // Exactly three fields survive; the rest of a host material does not
        // round-trip.
        AttrValue::Material(m) => json!({
            "name": m.name,
            "shader_name": m.shader_name,
            "backface_culling": m.backface_culling,
        }),
        AttrValue::StringList(items) => json!(items),
        AttrValue::FloatList(items) => json!(items),
        AttrValue::Opaque { .. } => unreachable!("rejected above"),
    };

    Ok(TypedValue { kind: kind.as_str().to_owned(), payload })
}

// ============================================================================
// Decode
// ============================================================================

/// Decode one typed value back to an engine-native attribute value.
///
/// `current` is the kind of the attribute as it exists on the freshly
/// instantiated node, when the node already has it. A known declared kind
/// that contradicts `current` is a `TypeMismatch`; a payload whose shape does
/// not fit the declared kind is a `MalformedPayload`.
pub fn decode(
    attribute: &str,
    value: &TypedValue,
    current: Option<ValueKind>,
) -> Result<AttrValue> {
    let Some(declared) = ValueKind::parse(&value.kind) else {
        return decode_fallback(attribute, value, current);
    };

    let decoded = decode_known(attribute, declared, &value.payload)?;

    if let (Some(current), Some(got)) = (current, decoded.kind()) {
        if got != current {
            return Err(Error::TypeMismatch {
                attribute: attribute.to_owned(),
                expected: current.as_str().to_owned(),
                got: got.as_str().to_owned(),
            });
        }
    }

    Ok(decoded)
}

fn decode_known(attribute: &str, kind: ValueKind, payload: &Json) -> Result<AttrValue> {
    let malformed = |detail: &str| Error::MalformedPayload {
        attribute: attribute.to_owned(),
        kind: kind.as_str().to_owned(),
        detail: detail.to_owned(),
    };

    Ok(match kind {
        ValueKind::String => AttrValue::String(
            payload.as_str().ok_or_else(|| malformed("expected a string"))?.to_owned(),
        ),
        ValueKind::Int => {
            AttrValue::Int(payload.as_i64().ok_or_else(|| malformed("expected an integer"))?)
        }
        ValueKind::Float => {
            AttrValue::Float(payload.as_f64().ok_or_else(|| malformed("expected a number"))?)
        }
        ValueKind::Bool => {
            AttrValue::Bool(payload.as_bool().ok_or_else(|| malformed("expected a boolean"))?)
        }
        ValueKind::Vec3 => AttrValue::Vec3(
            triple(payload).ok_or_else(|| malformed("expected [x, y, z]"))?,
        ),
        ValueKind::Vec4 => AttrValue::Vec4(
            quadruple(payload).ok_or_else(|| malformed("expected [x, y, z, w]"))?,
        ),
        ValueKind::Quat => AttrValue::Quat(
            quadruple(payload).ok_or_else(|| malformed("expected [x, y, z, w]"))?,
        ),
        ValueKind::Color => AttrValue::Color(
            triple(payload).ok_or_else(|| malformed("expected [r, g, b]"))?,
        ),
        // Matrices are length-driven: 16 elements build a 4x4, 9 build a 3x3,
        // in the same rows-outer order encode used.
        ValueKind::Mat3 | ValueKind::Mat4 => {
            let elements =
                float_elements(payload).ok_or_else(|| malformed("expected a number list"))?;
            match elements.len() {
                16 => AttrValue::Mat4(Mat4::from_row_major(&elements).unwrap_or_default()),
                9 => AttrValue::Mat3(Mat3::from_row_major(&elements).unwrap_or_default()),
                n => {
                    return Err(malformed(&format!(
                        "a list of length {n} cannot be a matrix"
                    )));
                }
            }
        }
        ValueKind::Material => {
            let obj = payload.as_object().ok_or_else(|| malformed("expected an object"))?;
            let field = |name: &str| -> Result<&Json> {
                obj.get(name).ok_or_else(|| malformed(&format!("missing field `{name}`")))
            };
            AttrValue::Material(Material {
                name: field("name")?
                    .as_str()
                    .ok_or_else(|| malformed("`name` must be a string"))?
                    .to_owned(),
                shader_name: field("shader_name")?
                    .as_str()
                    .ok_or_else(|| malformed("`shader_name` must be a string"))?
                    .to_owned(),
                backface_culling: field("backface_culling")?
                    .as_bool()
                    .ok_or_else(|| malformed("`backface_culling` must be a boolean"))?,
            })
        }
        ValueKind::StringList => {
            let items = payload.as_array().ok_or_else(|| malformed("expected a list"))?;
            AttrValue::StringList(
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_owned))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| malformed("expected a list of strings"))?,
            )
        }
        ValueKind::FloatList => AttrValue::FloatList(
            float_elements(payload).ok_or_else(|| malformed("expected a list of numbers"))?,
        ),
    })
}

/// Last-resort adapter for kind tags this build does not know: rebuild the
/// node's current attribute shape positionally from the payload's numeric
/// elements. Lossy and best-effort — without a current shape to target there
/// is nothing to construct, which is `UnknownFieldType`.
fn decode_fallback(
    attribute: &str,
    value: &TypedValue,
    current: Option<ValueKind>,
) -> Result<AttrValue> {
    let unknown = || Error::UnknownFieldType {
        attribute: attribute.to_owned(),
        kind: value.kind.clone(),
    };

    let target = current.ok_or_else(unknown)?;
    let elements = float_elements(&value.payload).ok_or_else(unknown)?;

    if target == ValueKind::FloatList {
        return Ok(AttrValue::FloatList(elements));
    }
    match (target, elements.as_slice()) {
        (ValueKind::Float, [f]) => Ok(AttrValue::Float(*f)),
        (ValueKind::Vec3, &[x, y, z]) => Ok(AttrValue::Vec3([x, y, z])),
        (ValueKind::Vec4, &[x, y, z, w]) => Ok(AttrValue::Vec4([x, y, z, w])),
        (ValueKind::Quat, &[x, y, z, w]) => Ok(AttrValue::Quat([x, y, z, w])),
        (ValueKind::Color, &[r, g, b]) => Ok(AttrValue::Color([r, g, b])),
        (ValueKind::Mat3, e) => Mat3::from_row_major(e).map(AttrValue::Mat3).ok_or_else(unknown),
        (ValueKind::Mat4, e) => Mat4::from_row_major(e).map(AttrValue::Mat4).ok_or_else(unknown),
        _ => Err(unknown()),
    }
}

// ============================================================================
// Payload helpers
// ============================================================================

fn float_elements(payload: &Json) -> Option<Vec<f64>> {
    payload.as_array()?.iter().map(Json::as_f64).collect()
}

fn triple(payload: &Json) -> Option<[f64; 3]> {
    match float_elements(payload)?.as_slice() {
        &[a, b, c] => Some([a, b, c]),
        _ => None,
    }
}

fn quadruple(payload: &Json) -> Option<[f64; 4]> {
    match float_elements(payload)?.as_slice() {
        &[a, b, c, d] => Some([a, b, c, d]),
        _ => None,
    }
}
