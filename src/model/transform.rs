//! Node transform — always serialized structurally, never as a generic
//! attribute.

use serde::{Deserialize, Serialize};

/// Decomposed local transform of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation as `[x, y, z]`.
    pub translation: [f64; 3],
    /// Rotation quaternion as `[x, y, z, w]`.
    pub rotation: [f64; 4],
    /// Per-axis scale as `[x, y, z]`.
    pub scale: [f64; 3],
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
