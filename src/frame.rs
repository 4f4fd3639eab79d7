use crate::events::ObserverList;
use crate::skeleton::{Finger, Hand, HandJoint, Pose, TargetSkeleton, FINGER_CHAINS};
use glam::{Quat, Vec3};

/// Derived per-finger summary data.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FingerData {
    pub tip: Vec3,
    pub length: f32,
}

/// The frame-ready flattening of one hand's target skeleton: everything an
/// interaction or grasping consumer reads, with no reference back into the
/// skeleton itself. Rebuilt in place once per tick.
#[derive(Clone, Debug)]
pub struct CanonicalHandPose {
    pub hand: Hand,
    pub joints: [Pose; HandJoint::COUNT],
    pub fingers: [FingerData; Finger::COUNT],
    pub finger_widths: [f32; Finger::COUNT],
    pub palm_position: Vec3,
    pub palm_normal: Vec3,
    pub palm_rotation: Quat,
    /// Synthetic forearm segment extruded backwards from the wrist; no
    /// tracking source reports a real elbow.
    pub forearm: Pose,
    pub forearm_length: f32,
    pub confidence: f32,
}

impl CanonicalHandPose {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            joints: [Pose::IDENTITY; HandJoint::COUNT],
            fingers: [FingerData::default(); Finger::COUNT],
            finger_widths: [0.0; Finger::COUNT],
            palm_position: Vec3::ZERO,
            palm_normal: Vec3::Y,
            palm_rotation: Quat::IDENTITY,
            forearm: Pose::IDENTITY,
            forearm_length: 0.0,
            confidence: 0.0,
        }
    }

    /// Flatten the skeleton's current world transforms into this pose.
    pub fn rebuild_from(&mut self, skeleton: &TargetSkeleton, confidence: f32) {
        let wrist = *skeleton.joint(HandJoint::Wrist);
        let reference = skeleton.reference();

        self.joints = *skeleton.joints();
        self.confidence = confidence;

        self.palm_rotation = wrist.orientation;
        self.palm_normal = wrist.orientation * skeleton.palm_facing();
        // Palm center sits between the wrist and the middle finger's knuckle.
        let middle_proximal = skeleton.joint(HandJoint::MiddleProximal).position;
        self.palm_position = wrist.position.lerp(middle_proximal, 0.5);

        for finger in Finger::ALL {
            let chain = FINGER_CHAINS[finger as usize];
            let distal = skeleton.joint(chain[3]);
            let distal_len = reference.distal_length(finger);
            self.fingers[finger as usize] = FingerData {
                tip: distal.position + skeleton.bone_forward(chain[3]) * distal_len,
                length: chain
                    .windows(2)
                    .map(|pair| {
                        skeleton
                            .joint(pair[1])
                            .position
                            .distance(skeleton.joint(pair[0]).position)
                    })
                    .sum::<f32>()
                    + distal_len,
            };
            self.finger_widths[finger as usize] = reference.finger_widths[finger as usize];
        }

        let wrist_forward = skeleton.bone_forward(HandJoint::Wrist);
        self.forearm_length = reference.forearm_length;
        self.forearm = Pose::new(
            wrist.position - wrist_forward * reference.forearm_length,
            wrist.orientation,
        );
    }
}

/// One tick's aggregated snapshot of all tracked hands.
///
/// Consumers treat it as immutable; the provider overwrites the fields in
/// place each tick rather than allocating a fresh frame.
#[derive(Clone)]
pub struct Frame {
    id: u64,
    timestamp: u64,
    hands: [Option<CanonicalHandPose>; 2],
}

impl Frame {
    fn new() -> Self {
        Self {
            id: 0,
            timestamp: 0,
            hands: [None, None],
        }
    }

    /// Monotonically increasing, +1 per published frame, no gaps.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Tick counter, not wall-clock time.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn hand(&self, hand: Hand) -> Option<&CanonicalHandPose> {
        self.hands[hand as usize].as_ref()
    }
}

/// Assembles canonical hand poses into the per-tick [`Frame`] and fans it out
/// to consumers.
///
/// Two dispatch channels exist, one fired on the variable-rate render tick
/// and one on the fixed-rate physics tick, and both point at the *same*
/// underlying frame; there is no double buffering. A consumer reading from a
/// fixed-tick handler after the render tick already published will observe
/// that tick's post-publish state.
pub struct FrameProvider {
    frame: Frame,
    pub on_frame: ObserverList<Frame>,
    pub on_fixed_frame: ObserverList<Frame>,
}

impl Default for FrameProvider {
    fn default() -> Self {
        Self {
            frame: Frame::new(),
            on_frame: ObserverList::new(),
            on_fixed_frame: ObserverList::new(),
        }
    }
}

impl FrameProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull access to the most recently published frame.
    pub fn current(&self) -> &Frame {
        &self.frame
    }

    /// Finalize this tick's frame and fire the render-tick channel once.
    pub fn publish(&mut self, left: Option<&CanonicalHandPose>, right: Option<&CanonicalHandPose>) {
        self.frame.id += 1;
        self.frame.timestamp += 1;
        Self::store_hand(&mut self.frame.hands[Hand::Left as usize], left);
        Self::store_hand(&mut self.frame.hands[Hand::Right as usize], right);
        self.on_frame.emit(&self.frame);
    }

    /// Fire the physics-tick channel against the current frame. May run 0, 1
    /// or multiple times between publishes.
    pub fn dispatch_fixed(&mut self) {
        self.on_fixed_frame.emit(&self.frame);
    }

    fn store_hand(slot: &mut Option<CanonicalHandPose>, pose: Option<&CanonicalHandPose>) {
        match (slot.as_mut(), pose) {
            (Some(stored), Some(pose)) => stored.clone_from(pose),
            (None, Some(pose)) => *slot = Some(pose.clone()),
            // A hand that stops being published keeps its last pose; the
            // tracking monitor is the signal for loss, not the frame.
            (_, None) => {}
        }
    }
}
