//! Engine-native attribute values and their kind tags.
//!
//! `AttrValue` is the closed set of value kinds the codec knows how to move
//! across the host boundary:
//! - Scalars: String, Int, Float, Bool
//! - Math: Vec3, Vec4, Quat, Mat3, Mat4
//! - Appearance: Color, Material
//! - Containers: StringList, FloatList
//!
//! Anything the host exposes outside this set crosses the seam as
//! `AttrValue::Opaque` and is rejected loudly at encode time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind tag for an attribute value. This is the qualified tag written into
/// every record, so its string form is part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
    Vec3,
    Vec4,
    Quat,
    Mat3,
    Mat4,
    Color,
    Material,
    StringList,
    FloatList,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "String",
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::Bool => "Bool",
            ValueKind::Vec3 => "Vec3",
            ValueKind::Vec4 => "Vec4",
            ValueKind::Quat => "Quat",
            ValueKind::Mat3 => "Mat3",
            ValueKind::Mat4 => "Mat4",
            ValueKind::Color => "Color",
            ValueKind::Material => "Material",
            ValueKind::StringList => "StringList",
            ValueKind::FloatList => "FloatList",
        }
    }

    /// Parse a wire tag. Returns None for tags from newer schemas — the
    /// codec handles those through its last-resort path, not here.
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "String" => ValueKind::String,
            "Int" => ValueKind::Int,
            "Float" => ValueKind::Float,
            "Bool" => ValueKind::Bool,
            "Vec3" => ValueKind::Vec3,
            "Vec4" => ValueKind::Vec4,
            "Quat" => ValueKind::Quat,
            "Mat3" => ValueKind::Mat3,
            "Mat4" => ValueKind::Mat4,
            "Color" => ValueKind::Color,
            "Material" => ValueKind::Material,
            "StringList" => ValueKind::StringList,
            "FloatList" => ValueKind::FloatList,
            _ => return None,
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 3x3 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3(pub [[f64; 3]; 3]);

/// 4x4 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4(pub [[f64; 4]; 4]);

macro_rules! impl_matrix {
    ($name:ident, $size:expr) => {
        impl $name {
            pub const SIZE: usize = $size;

            pub fn identity() -> Self {
                let mut m = [[0.0; $size]; $size];
                let mut i = 0;
                while i < $size {
                    m[i][i] = 1.0;
                    i += 1;
                }
                Self(m)
            }

            pub fn element(&self, row: usize, col: usize) -> f64 {
                self.0[row][col]
            }

            pub fn set_element(&mut self, row: usize, col: usize, value: f64) {
                self.0[row][col] = value;
            }

            /// Flatten rows-outer, columns-inner.
            pub fn to_row_major(&self) -> Vec<f64> {
                self.0.iter().flat_map(|row| row.iter().copied()).collect()
            }

            /// Inverse of `to_row_major`. None unless exactly SIZE² elements.
            pub fn from_row_major(elements: &[f64]) -> Option<Self> {
                if elements.len() != $size * $size {
                    return None;
                }
                let mut m = Self([[0.0; $size]; $size]);
                for (i, value) in elements.iter().enumerate() {
                    m.set_element(i / $size, i % $size, *value);
                }
                Some(m)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::identity()
            }
        }
    };
}

impl_matrix!(Mat3, 3);
impl_matrix!(Mat4, 4);

/// Surface material reference. Only the three fields below survive
/// serialization; everything else a host material carries is dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub shader_name: String,
    pub backface_culling: bool,
}

/// An engine-native attribute value as handed across the host seam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    Quat([f64; 4]),
    Mat3(Mat3),
    Mat4(Mat4),
    /// RGB, each channel 0.0..=1.0 by host convention.
    Color([f64; 3]),
    Material(Material),
    StringList(Vec<String>),
    FloatList(Vec<f64>),
    /// A host attribute whose runtime kind is outside the closed set.
    /// Carries only the host's type name; encoding it is a hard error.
    Opaque { type_name: String },
}

impl AttrValue {
    /// The kind tag for this value, or None for `Opaque`.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            AttrValue::String(_) => ValueKind::String,
            AttrValue::Int(_) => ValueKind::Int,
            AttrValue::Float(_) => ValueKind::Float,
            AttrValue::Bool(_) => ValueKind::Bool,
            AttrValue::Vec3(_) => ValueKind::Vec3,
            AttrValue::Vec4(_) => ValueKind::Vec4,
            AttrValue::Quat(_) => ValueKind::Quat,
            AttrValue::Mat3(_) => ValueKind::Mat3,
            AttrValue::Mat4(_) => ValueKind::Mat4,
            AttrValue::Color(_) => ValueKind::Color,
            AttrValue::Material(_) => ValueKind::Material,
            AttrValue::StringList(_) => ValueKind::StringList,
            AttrValue::FloatList(_) => ValueKind::FloatList,
            AttrValue::Opaque { .. } => return None,
        })
    }

    /// Host-facing type name, including opaque kinds.
    pub fn type_name(&self) -> &str {
        match self {
            AttrValue::Opaque { type_name } => type_name,
            other => other.kind().map(|k| k.as_str()).unwrap_or("Opaque"),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for AttrValue { fn from(v: bool) -> Self { AttrValue::Bool(v) } }
impl From<i32> for AttrValue { fn from(v: i32) -> Self { AttrValue::Int(v as i64) } }
impl From<i64> for AttrValue { fn from(v: i64) -> Self { AttrValue::Int(v) } }
impl From<f64> for AttrValue { fn from(v: f64) -> Self { AttrValue::Float(v) } }
impl From<String> for AttrValue { fn from(v: String) -> Self { AttrValue::String(v) } }
impl From<&str> for AttrValue { fn from(v: &str) -> Self { AttrValue::String(v.to_owned()) } }
impl From<[f64; 3]> for AttrValue { fn from(v: [f64; 3]) -> Self { AttrValue::Vec3(v) } }
impl From<Mat3> for AttrValue { fn from(v: Mat3) -> Self { AttrValue::Mat3(v) } }
impl From<Mat4> for AttrValue { fn from(v: Mat4) -> Self { AttrValue::Mat4(v) } }
impl From<Material> for AttrValue { fn from(v: Material) -> Self { AttrValue::Material(v) } }
impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self { AttrValue::StringList(v) }
}
impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self { AttrValue::FloatList(v) }
}
