use super::{TrackingKind, TrackingSource};
use crate::config::RigConfig;
use crate::skeleton::{FingerCurls, Hand, Pose, ReferenceHand, SourceSkeleton};

/// Raw controller input for one hand, as sampled from the platform runtime.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ControllerInputState {
    pub connected: bool,
    /// Index trigger axis, 0..1.
    pub trigger: f32,
    pub trigger_touched: bool,
    /// Grip axis, 0..1.
    pub grip: f32,
    pub grip_touched: bool,
    pub thumb_rest_touched: bool,
}

/// What the Oculus runtime provides for Touch controllers.
pub trait TouchRuntime {
    fn input_state(&self, hand: Hand) -> ControllerInputState;
    /// World grip pose for the controller, None while not yet tracked.
    fn grip_pose(&self, hand: Hand) -> Option<Pose>;
}

// Smoothing rate for all curl blends; roughly an 87% step towards the
// target every eighth of a second.
const BLEND_RATE: f32 = 8.0;
// Where the thumb settles when it is merely resting on the controller.
const THUMB_REST_CEILING: f32 = 0.5;

/// Pinch/grip gesture inference for controllers without skeletal data.
///
/// Produces smoothed per-finger curls from trigger/grip axes and touch
/// booleans. The sympathetic curl of middle/ring/pinky follows the index to
/// mimic how human fingers move together.
#[derive(Clone, Debug)]
pub struct TouchEmulation {
    thumb: f32,
    index: f32,
    rest: f32,
    pinching: bool,
    index_floor: f32,
}

impl TouchEmulation {
    pub fn new(index_floor: f32) -> Self {
        Self {
            thumb: 0.0,
            index: 0.0,
            rest: 0.0,
            pinching: false,
            index_floor,
        }
    }

    pub fn is_pinching(&self) -> bool {
        self.pinching
    }

    pub fn update(&mut self, dt: f32, input: &ControllerInputState) {
        let t = (dt * BLEND_RATE).min(1.0);
        let blend = |current: &mut f32, target: f32| *current += (target - *current) * t;

        self.pinching =
            input.trigger_touched && !input.thumb_rest_touched && !input.grip_touched;

        let thumb_target = if !input.thumb_rest_touched {
            0.0
        } else if input.trigger_touched && input.grip_touched && !self.pinching {
            1.0
        } else {
            THUMB_REST_CEILING
        };
        blend(&mut self.thumb, thumb_target);

        blend(&mut self.rest, input.grip);

        if self.pinching {
            // Pinches track the trigger axis directly, no floor and no lag.
            self.index = input.trigger;
        } else {
            let target = if input.trigger_touched {
                // Keep the finger visually curled even at low trigger
                // depression.
                input.trigger.max(self.index_floor)
            } else {
                input.trigger
            };
            blend(&mut self.index, target);
        }
    }

    pub fn curls(&self) -> FingerCurls {
        FingerCurls {
            thumb: self.thumb,
            index: self.index,
            middle: self.rest.max(self.index / 2.0),
            ring: self.rest.max(self.index / 4.0),
            pinky: self.rest.max(self.index / 6.0),
        }
    }
}

struct HandState {
    kind: TrackingKind,
    skeleton: SourceSkeleton,
    emulation: TouchEmulation,
    grip_offset: Pose,
}

/// Touch controllers as a tracking source: always emulation, never skeletal.
pub struct OculusTouchSource<R> {
    runtime: R,
    reference: ReferenceHand,
    hands: [HandState; 2],
}

impl<R: TouchRuntime> OculusTouchSource<R> {
    pub fn new(config: &RigConfig, runtime: R) -> Self {
        let offsets = config
            .grip_offsets
            .get(super::ControllerType::Touch.config_key())
            .copied()
            .unwrap_or_default();
        let hand_state = |hand: Hand| HandState {
            kind: TrackingKind::None,
            skeleton: SourceSkeleton::with_canonical_topology(),
            emulation: TouchEmulation::new(config.index_curl_floor),
            grip_offset: offsets.get(hand).pose(),
        };
        Self {
            runtime,
            reference: config.reference_hand.clone(),
            hands: [hand_state(Hand::Left), hand_state(Hand::Right)],
        }
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}

impl<R: TouchRuntime> TrackingSource for OculusTouchSource<R> {
    fn update(&mut self, dt: f32) {
        for hand in Hand::BOTH {
            let state = &mut self.hands[hand as usize];
            let input = self.runtime.input_state(hand);
            let grip = self.runtime.grip_pose(hand);

            let grip = match (input.connected, grip) {
                (true, Some(grip)) => grip,
                _ => {
                    // Leave the prior joint poses in place.
                    state.kind = TrackingKind::None;
                    continue;
                }
            };

            state.kind = TrackingKind::Emulation;
            state.emulation.update(dt, &input);
            let wrist = grip.transform(&state.grip_offset);
            self.reference
                .fill_world(&wrist, &state.emulation.curls(), &mut state.skeleton);
        }
    }

    fn kind(&self, hand: Hand) -> TrackingKind {
        self.hands[hand as usize].kind
    }

    fn confidence(&self, hand: Hand) -> f32 {
        match self.hands[hand as usize].kind {
            TrackingKind::None => 0.0,
            _ => 1.0,
        }
    }

    fn skeleton(&self, hand: Hand) -> &SourceSkeleton {
        &self.hands[hand as usize].skeleton
    }
}
