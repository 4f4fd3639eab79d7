use crate::constraint::{ConstraintSet, JointConstraint};
use crate::math::BoneBasis;
use crate::skeleton::{Finger, Hand, Pose, ReferenceHand};
use glam::{Quat, Vec3};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read rig config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse rig config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bone basis is degenerate (forward and up are parallel)")]
    DegenerateBasis,
    #[error("canonical axes are degenerate (finger pointing and palm facing are parallel)")]
    DegenerateCanonicalAxes,
    #[error("source skeleton has {source_count} finger chains, target has {target}")]
    FingerCountMismatch { source_count: usize, target: usize },
    #[error("{finger:?} chain length mismatch: source has {source_count} joints, target has {target}")]
    ChainLengthMismatch {
        finger: Finger,
        source_count: usize,
        target: usize,
    },
}

/// Which finger chain a constraint entry attaches to.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub finger: Finger,
    /// Chain depth: 0 metacarpal, 1 proximal, 2 intermediate, 3 distal.
    pub depth: usize,
    #[serde(flatten)]
    pub constraint: JointConstraint,
}

/// A wrist offset for one controller model, authored per hand. Extracted
/// from the platform's render-model grip values.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct GripOffset {
    pub translation: Vec3,
    /// Euler XYZ, degrees.
    pub rotation_deg: Vec3,
}

impl GripOffset {
    pub fn pose(&self) -> Pose {
        Pose::new(
            self.translation,
            Quat::from_euler(
                glam::EulerRot::XYZ,
                self.rotation_deg.x.to_radians(),
                self.rotation_deg.y.to_radians(),
                self.rotation_deg.z.to_radians(),
            ),
        )
    }
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct GripOffsets {
    pub left: GripOffset,
    pub right: GripOffset,
}

impl GripOffsets {
    pub fn get(&self, hand: Hand) -> &GripOffset {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }
}

/// Static per-scene rig description: bone bases, joint constraint ranges and
/// controller offsets. Authored offline, loaded once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub basis: BoneBasis,
    pub finger_pointing: Vec3,
    pub palm_facing: Vec3,
    pub constraints: Vec<ConstraintEntry>,
    /// Keyed by controller type name ("knuckles", "oculus_touch", "vive").
    pub grip_offsets: HashMap<String, GripOffsets>,
    /// Minimum index curl held while the trigger is touched but no pinch is
    /// active, keeping the finger visually curled at low trigger depression.
    pub index_curl_floor: f32,
    pub reference_hand: ReferenceHand,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            basis: BoneBasis::CANONICAL,
            finger_pointing: Vec3::Z,
            palm_facing: Vec3::Y,
            constraints: Vec::new(),
            grip_offsets: HashMap::new(),
            index_curl_floor: 0.3,
            reference_hand: ReferenceHand::default(),
        }
    }
}

impl RigConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: RigConfig = serde_json::from_str(&data)?;
        info!(
            "loaded rig config from {path:?} ({} constraints, {} controller offsets)",
            config.constraints.len(),
            config.grip_offsets.len()
        );
        config.validate()
    }

    /// Checks the authored data that would otherwise only fail deep inside
    /// the tick loop. Fatal here, before any ticking starts.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.basis.validate().is_none() {
            return Err(ConfigError::DegenerateBasis);
        }
        if crate::math::look_rotation(self.finger_pointing, self.palm_facing).is_none() {
            return Err(ConfigError::DegenerateCanonicalAxes);
        }
        Ok(self)
    }

    pub fn constraint_set(&self) -> ConstraintSet {
        let mut set = ConstraintSet::default();
        for entry in &self.constraints {
            let chain = crate::skeleton::FINGER_CHAINS[entry.finger as usize];
            if let Some(joint) = chain.get(entry.depth) {
                set.set(*joint, entry.constraint);
            }
        }
        set
    }
}
