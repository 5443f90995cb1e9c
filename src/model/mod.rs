//! # Scene Record Model
//!
//! Pure DTOs for serialized scene nodes. These types cross every boundary:
//! host seam ↔ codec ↔ export ↔ import ↔ wire.
//!
//! Design rule: no host types, no I/O, no state in this module — records and
//! values are plain data.

pub mod record;
pub mod transform;
pub mod value;

pub use record::{NodeClass, NodeRecord, TypedValue};
pub use transform::Transform;
pub use value::{AttrValue, Mat3, Mat4, Material, ValueKind};
