use crate::config::ConfigError;
use crate::constraint::ConstraintSet;
use crate::math::BoneBasis;
use crate::skeleton::{
    Finger, HandJoint, Pose, SourceSkeleton, TargetSkeleton, FINGER_CHAINS,
};
use glam::Quat;
use log::debug;

/// Maps a tracking source's bone hierarchy onto the canonical hand skeleton,
/// bone by bone, with basis conversion and joint constraints.
///
/// The retargeter is the only writer of the target skeleton; it runs exactly
/// once per hand per tick, strictly before any frame consumer.
pub struct SkeletonRetargeter {
    basis: BoneBasis,
    constraints: ConstraintSet,
    /// Last good desired rotation per joint, the fallback when a tracking
    /// glitch degenerates the basis vectors for a tick.
    last_rotations: [Quat; HandJoint::COUNT],
    degenerate_this_episode: bool,
}

impl SkeletonRetargeter {
    pub fn new(basis: BoneBasis, constraints: ConstraintSet) -> Result<Self, ConfigError> {
        let basis = basis.validate().ok_or(ConfigError::DegenerateBasis)?;
        Ok(Self {
            basis,
            constraints,
            last_rotations: [Quat::IDENTITY; HandJoint::COUNT],
            degenerate_this_episode: false,
        })
    }

    /// Chain-length validation, run once at setup. A mismatch is a fatal
    /// configuration error; it never surfaces per tick.
    pub fn validate_topology(
        source: &SourceSkeleton,
        _target: &TargetSkeleton,
    ) -> Result<(), ConfigError> {
        if source.fingers.len() != FINGER_CHAINS.len() {
            return Err(ConfigError::FingerCountMismatch {
                source_count: source.fingers.len(),
                target: FINGER_CHAINS.len(),
            });
        }
        for (finger, chain) in Finger::ALL.iter().zip(FINGER_CHAINS) {
            let source_len = source.fingers[*finger as usize].len();
            if source_len != chain.len() {
                return Err(ConfigError::ChainLengthMismatch {
                    finger: *finger,
                    source_count: source_len,
                    target: chain.len(),
                });
            }
        }
        Ok(())
    }

    /// Copy one tick's source pose onto the target skeleton. Pure in the
    /// source: applying the same pose twice yields identical transforms.
    pub fn retarget(&mut self, source: &SourceSkeleton, target: &mut TargetSkeleton) {
        debug_assert!(Self::validate_topology(source, target).is_ok());

        let mut saw_degenerate = false;
        let bind_offset = target.bind_offset();

        let wrist_rotation = self.desired_rotation(
            HandJoint::Wrist,
            &source.wrist,
            bind_offset,
            &mut saw_degenerate,
        );
        target.set_joint(
            HandJoint::Wrist,
            Pose::new(source.wrist.position, wrist_rotation),
        );

        // Chains walk root to tip so each joint's parent already holds this
        // tick's transform when the constraint decomposes against it.
        for (finger_idx, chain) in FINGER_CHAINS.iter().enumerate() {
            let source_chain = &source.fingers[finger_idx];
            for (bone, joint) in source_chain.iter().zip(*chain) {
                let desired =
                    self.desired_rotation(*joint, bone, bind_offset, &mut saw_degenerate);

                let pose = match self.constraints.get(*joint) {
                    Some(constraint) => {
                        // Chain joints always have a parent.
                        let parent = target.joint(joint.parent().unwrap_or(HandJoint::Wrist));
                        constraint.apply(parent, bone.position, desired)
                    }
                    None => Pose::new(bone.position, desired),
                };
                target.set_joint(*joint, pose);
            }
        }

        if !saw_degenerate {
            self.degenerate_this_episode = false;
        }
    }

    /// The basis-converted world rotation for one bone, composed with the
    /// canonical bind orientation. Falls back to the joint's last good
    /// rotation when the transformed basis vectors degenerate.
    fn desired_rotation(
        &mut self,
        joint: HandJoint,
        bone: &Pose,
        bind_offset: Quat,
        saw_degenerate: &mut bool,
    ) -> Quat {
        match self.basis.world_rotation(bone.orientation) {
            Some(look) => {
                let desired = look * bind_offset;
                self.last_rotations[joint as usize] = desired;
                desired
            }
            None => {
                *saw_degenerate = true;
                if !self.degenerate_this_episode {
                    self.degenerate_this_episode = true;
                    debug!("degenerate bone orientation on {joint:?}, holding previous rotation");
                }
                self.last_rotations[joint as usize]
            }
        }
    }
}
