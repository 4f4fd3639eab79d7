use crate::math::look_rotation;
use glam::{Quat, Vec3};
use paste::paste;
use serde::{Deserialize, Serialize};
use HandJoint::*;

/// One joint of the canonical hand, wrist + 5 fingers x 4 joints.
///
/// The thumb carries a (zero-length) metacarpal like every other finger so
/// all chains have the same depth.
#[repr(usize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist = 0,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbIntermediate,
    ThumbDistal,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    PinkyMetacarpal,
    PinkyProximal,
    PinkyIntermediate,
    PinkyDistal,
}

impl HandJoint {
    pub const COUNT: usize = 21;

    pub fn parent(self) -> Option<HandJoint> {
        match self {
            Wrist => None,
            ThumbMetacarpal | IndexMetacarpal | MiddleMetacarpal | RingMetacarpal
            | PinkyMetacarpal => Some(Wrist),
            // Chains are laid out contiguously, so every non-metacarpal
            // joint's parent is the previous discriminant.
            other => Some(JOINT_ORDER[other as usize - 1]),
        }
    }
}

macro_rules! joints_for_finger {
    ($finger:ident) => {
        paste! {[
            HandJoint::[<$finger Metacarpal>],
            HandJoint::[<$finger Proximal>],
            HandJoint::[<$finger Intermediate>],
            HandJoint::[<$finger Distal>],
        ].as_slice()}
    };
}

/// Root-to-tip joint chain per finger, in [`Finger`] order.
pub static FINGER_CHAINS: &[&[HandJoint]] = &[
    joints_for_finger!(Thumb),
    joints_for_finger!(Index),
    joints_for_finger!(Middle),
    joints_for_finger!(Ring),
    joints_for_finger!(Pinky),
];

static JOINT_ORDER: [HandJoint; HandJoint::COUNT] = [
    Wrist,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbIntermediate,
    ThumbDistal,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    PinkyMetacarpal,
    PinkyProximal,
    PinkyIntermediate,
    PinkyDistal,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Finger {
    Thumb = 0,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const COUNT: usize = 5;
    pub const ALL: [Finger; Self::COUNT] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Hand {
    Left = 0,
    Right,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];
}

/// A world (or wrist-local, where documented) bone transform.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// `self * local`, treating self as a rigid transform.
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.orientation * local.position,
            orientation: self.orientation * local.orientation,
        }
    }
}

/// Per-bone world transforms as delivered by a tracking backend. The chains
/// mirror [`FINGER_CHAINS`] root-to-tip; chain lengths are validated against
/// the target topology once at setup, never per tick.
#[derive(Clone, Debug, Default)]
pub struct SourceSkeleton {
    pub wrist: Pose,
    pub fingers: Vec<Vec<Pose>>,
}

impl SourceSkeleton {
    /// A skeleton with the canonical 5x4 chain layout, all joints at identity.
    pub fn with_canonical_topology() -> Self {
        Self {
            wrist: Pose::IDENTITY,
            fingers: FINGER_CHAINS.iter().map(|c| vec![Pose::IDENTITY; c.len()]).collect(),
        }
    }
}

/// The canonical "Leap hand" the retargeter writes into.
///
/// Owned by the embodiment layer; joints hold world transforms and are
/// overwritten every tick.
pub struct TargetSkeleton {
    joints: [Pose; HandJoint::COUNT],
    /// Canonical axis fingers point along in the wrist frame.
    finger_pointing: Vec3,
    /// Canonical axis the palm faces along in the wrist frame.
    palm_facing: Vec3,
    /// Intrinsic bind orientation of the canonical skeleton, composed onto
    /// every retargeted rotation.
    bind_offset: Quat,
    reference: ReferenceHand,
}

impl TargetSkeleton {
    pub fn new(finger_pointing: Vec3, palm_facing: Vec3, reference: ReferenceHand) -> Option<Self> {
        // The canonical axes double as a basis; reject degenerate authoring.
        // bind_offset carries the canonical +Z/+Y frame onto the authored
        // finger-pointing/palm-facing axes.
        let canonical = look_rotation(finger_pointing, palm_facing)?;
        let mut skeleton = Self {
            joints: [Pose::IDENTITY; HandJoint::COUNT],
            finger_pointing: finger_pointing.normalize(),
            palm_facing: palm_facing.normalize(),
            bind_offset: canonical,
            reference,
        };
        skeleton.reset_to_bind_pose();
        Some(skeleton)
    }

    pub fn joint(&self, joint: HandJoint) -> &Pose {
        &self.joints[joint as usize]
    }

    pub fn joints(&self) -> &[Pose; HandJoint::COUNT] {
        &self.joints
    }

    pub(crate) fn set_joint(&mut self, joint: HandJoint, pose: Pose) {
        self.joints[joint as usize] = pose;
    }

    pub fn finger_pointing(&self) -> Vec3 {
        self.finger_pointing
    }

    pub fn palm_facing(&self) -> Vec3 {
        self.palm_facing
    }

    pub fn bind_offset(&self) -> Quat {
        self.bind_offset
    }

    /// World direction the bone at `joint` currently points along.
    pub fn bone_forward(&self, joint: HandJoint) -> Vec3 {
        (self.joints[joint as usize].orientation * self.bind_offset.inverse()) * Vec3::Z
    }

    pub fn reference(&self) -> &ReferenceHand {
        &self.reference
    }

    pub fn reset_to_bind_pose(&mut self) {
        let bind = self.reference.joints_local(&FingerCurls::default());
        self.joints = bind;
    }
}

/// Smoothed per-finger curl amounts in [0, 1]; 0 is the open hand, 1 a fist.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FingerCurls {
    pub thumb: f32,
    pub index: f32,
    pub middle: f32,
    pub ring: f32,
    pub pinky: f32,
}

impl FingerCurls {
    pub fn get(&self, finger: Finger) -> f32 {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }
}

/// Authored dimensions of the canonical hand, in meters. Joint poses for
/// any curl state are computed from these rather than tabulated per pose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReferenceHand {
    /// Wrist-local positions of each finger's metacarpal root.
    pub metacarpal_roots: [Vec3; Finger::COUNT],
    /// Proximal, intermediate and distal segment lengths per finger.
    pub segment_lengths: [[f32; 3]; Finger::COUNT],
    /// Sideways splay of each finger off the finger-pointing axis, degrees.
    pub spread_deg: [f32; Finger::COUNT],
    pub finger_widths: [f32; Finger::COUNT],
    pub forearm_length: f32,
}

impl Default for ReferenceHand {
    fn default() -> Self {
        Self {
            metacarpal_roots: [
                Vec3::new(-0.025, 0.0, 0.015),
                Vec3::new(-0.012, 0.0, 0.028),
                Vec3::new(0.0, 0.0, 0.030),
                Vec3::new(0.012, 0.0, 0.028),
                Vec3::new(0.024, 0.0, 0.022),
            ],
            segment_lengths: [
                [0.046, 0.032, 0.030],
                [0.040, 0.025, 0.022],
                [0.044, 0.028, 0.024],
                [0.040, 0.026, 0.023],
                [0.031, 0.020, 0.021],
            ],
            spread_deg: [-35.0, -8.0, 0.0, 8.0, 17.0],
            finger_widths: [0.020, 0.017, 0.017, 0.016, 0.014],
            forearm_length: 0.25,
        }
    }
}

// Full-fist bend per chain joint, degrees. Metacarpals stay rigid.
const CURL_BEND_DEG: [f32; 4] = [0.0, 70.0, 100.0, 65.0];
// The thumb's proximal chain bends far less than the fingers'.
const THUMB_BEND_DEG: [f32; 4] = [0.0, 30.0, 45.0, 55.0];

impl ReferenceHand {
    /// Wrist-local joint poses for the given curl state, wrist at identity.
    ///
    /// Joint orientations follow the canonical basis: +Z along the bone,
    /// +Y out of the palm. Curling rotates each chain joint about its local
    /// right axis so fingertips sweep towards the palm.
    pub fn joints_local(&self, curls: &FingerCurls) -> [Pose; HandJoint::COUNT] {
        let mut joints = [Pose::IDENTITY; HandJoint::COUNT];

        for finger in Finger::ALL {
            let chain = FINGER_CHAINS[finger as usize];
            let root = self.metacarpal_roots[finger as usize];
            let lengths = self.segment_lengths[finger as usize];
            let spread = Quat::from_rotation_y(self.spread_deg[finger as usize].to_radians());
            let bends = if finger == Finger::Thumb {
                &THUMB_BEND_DEG
            } else {
                &CURL_BEND_DEG
            };
            let curl = curls.get(finger);

            let mut cursor = Pose::new(root, spread);
            for (depth, joint) in chain.iter().enumerate() {
                // Negative pitch sweeps +Z towards +Y, the palm-facing side.
                let bend = Quat::from_rotation_x(-(curl * bends[depth].to_radians()));
                cursor.orientation *= bend;
                joints[*joint as usize] = cursor;

                // Advance to the next joint along the bent bone. The
                // metacarpal contributes no length; its segment is folded
                // into the root offset.
                let advance = if depth == 0 { 0.0 } else { lengths[depth - 1] };
                cursor.position += cursor.orientation * Vec3::Z * advance;
            }
        }

        joints
    }

    /// World-space source skeleton for the given wrist pose and curls, used
    /// by the controller-emulation paths.
    pub fn fill_world(&self, wrist: &Pose, curls: &FingerCurls, out: &mut SourceSkeleton) {
        let local = self.joints_local(curls);
        out.wrist = *wrist;
        out.fingers.resize(Finger::COUNT, Vec::new());
        for finger in Finger::ALL {
            let chain = FINGER_CHAINS[finger as usize];
            let bones = &mut out.fingers[finger as usize];
            bones.clear();
            bones.extend(chain.iter().map(|j| wrist.transform(&local[*j as usize])));
        }
    }

    pub fn distal_length(&self, finger: Finger) -> f32 {
        self.segment_lengths[finger as usize][2]
    }

    pub fn finger_length(&self, finger: Finger) -> f32 {
        self.segment_lengths[finger as usize].iter().sum()
    }
}
