#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Tunables for the binned SAH tree builder.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildSettings {
    /// Number of evenly spaced split positions sampled per axis, endpoints included.
    pub split_sample_count: usize,
    /// Nodes holding this many triangles or fewer are never subdivided.
    pub maximum_leaf_size: usize,
    /// Multiplier on a node's own `area * triangle_count` cost. A split is taken only when its cost is
    /// strictly lower than the scaled no-split cost.
    pub leaf_cost_scale: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            split_sample_count: 90,
            maximum_leaf_size: 2,
            leaf_cost_scale: 1.0,
        }
    }
}

impl BuildSettings {
    /// Checks that the settings can produce a valid tree.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.split_sample_count < 2 {
            return Err(SettingsError::TooFewSplitSamples {
                count: self.split_sample_count,
            });
        }
        if self.maximum_leaf_size == 0 {
            return Err(SettingsError::ZeroLeafSize);
        }
        if !self.leaf_cost_scale.is_finite() || self.leaf_cost_scale <= 0.0 {
            return Err(SettingsError::InvalidLeafCostScale {
                scale: self.leaf_cost_scale,
            });
        }
        Ok(())
    }
}
