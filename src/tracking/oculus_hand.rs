use super::{TrackingKind, TrackingSource};
use crate::skeleton::{Hand, SourceSkeleton};

/// What the Oculus runtime provides for optical hand tracking.
pub trait OculusHandRuntime {
    fn hand_active(&self, hand: Hand) -> bool;
    /// Write this tick's world joint poses into `out`. False when the hand
    /// skeleton isn't ready, in which case `out` is left untouched.
    fn joint_poses(&self, hand: Hand, out: &mut SourceSkeleton) -> bool;
    /// Tracking confidence in [0, 1].
    fn confidence(&self, hand: Hand) -> f32;
}

struct HandState {
    kind: TrackingKind,
    confidence: f32,
    skeleton: SourceSkeleton,
}

/// Oculus optical hand skeletons as a tracking source.
pub struct OculusHandSource<R> {
    runtime: R,
    hands: [HandState; 2],
}

impl<R: OculusHandRuntime> OculusHandSource<R> {
    pub fn new(runtime: R) -> Self {
        let hand_state = || HandState {
            kind: TrackingKind::None,
            confidence: 0.0,
            skeleton: SourceSkeleton::with_canonical_topology(),
        };
        Self {
            runtime,
            hands: [hand_state(), hand_state()],
        }
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }
}

impl<R: OculusHandRuntime> TrackingSource for OculusHandSource<R> {
    fn update(&mut self, _dt: f32) {
        for hand in Hand::BOTH {
            let state = &mut self.hands[hand as usize];
            if !self.runtime.hand_active(hand) {
                state.kind = TrackingKind::None;
                state.confidence = 0.0;
                continue;
            }

            // Missing joints with an active hand means the SDK isn't ready
            // yet; treat it the same as not tracking and keep the old pose.
            if self.runtime.joint_poses(hand, &mut state.skeleton) {
                state.kind = TrackingKind::Skeletal;
                state.confidence = self.runtime.confidence(hand).clamp(0.0, 1.0);
            } else {
                state.kind = TrackingKind::None;
                state.confidence = 0.0;
            }
        }
    }

    fn kind(&self, hand: Hand) -> TrackingKind {
        self.hands[hand as usize].kind
    }

    fn confidence(&self, hand: Hand) -> f32 {
        self.hands[hand as usize].confidence
    }

    fn skeleton(&self, hand: Hand) -> &SourceSkeleton {
        &self.hands[hand as usize].skeleton
    }
}
