use super::oculus_touch::{ControllerInputState, TouchEmulation};
use super::{classify_controller, ControllerType, TrackingKind, TrackingSource};
use crate::config::RigConfig;
use crate::skeleton::{Hand, Pose, ReferenceHand, SourceSkeleton};
use log::info;

/// What the SteamVR runtime provides: device strings for classification, the
/// skeletal action when the controller supports it, and raw input state for
/// the estimated path.
pub trait SteamVrRuntime {
    fn controller_connected(&self, hand: Hand) -> bool;
    /// Prop_ManufacturerName_String, None until the device is ready.
    fn manufacturer(&self, hand: Hand) -> Option<String>;
    /// RenderModelName_String, None until the device is ready.
    fn render_model_name(&self, hand: Hand) -> Option<String>;
    /// Write the skeletal action's world joint poses into `out`. False when
    /// the controller has no skeletal data this tick.
    fn skeletal_pose(&self, hand: Hand, out: &mut SourceSkeleton) -> bool;
    /// Confidence of the skeletal estimate in [0, 1].
    fn skeletal_confidence(&self, hand: Hand) -> f32;
    fn input_state(&self, hand: Hand) -> ControllerInputState;
    /// World grip pose for the controller, None while not yet tracked.
    fn grip_pose(&self, hand: Hand) -> Option<Pose>;
}

struct HandState {
    controller: ControllerType,
    kind: TrackingKind,
    confidence: f32,
    skeleton: SourceSkeleton,
    emulation: TouchEmulation,
    grip_offset: Pose,
}

/// SteamVR controllers as a tracking source.
///
/// Controllers with a skeletal action (Knuckles, and Touch through SteamVR)
/// report `Skeletal`; anything else falls back to button/axis emulation the
/// same way the plain Touch path does.
pub struct SteamVrSource<R> {
    runtime: R,
    reference: ReferenceHand,
    grip_offsets: std::collections::HashMap<String, crate::config::GripOffsets>,
    hands: [HandState; 2],
}

impl<R: SteamVrRuntime> SteamVrSource<R> {
    pub fn new(config: &RigConfig, runtime: R) -> Self {
        let hand_state = || HandState {
            controller: ControllerType::Unknown,
            kind: TrackingKind::None,
            confidence: 0.0,
            skeleton: SourceSkeleton::with_canonical_topology(),
            emulation: TouchEmulation::new(config.index_curl_floor),
            grip_offset: Pose::IDENTITY,
        };
        Self {
            runtime,
            reference: config.reference_hand.clone(),
            grip_offsets: config.grip_offsets.clone(),
            hands: [hand_state(), hand_state()],
        }
    }

    pub fn controller_type(&self, hand: Hand) -> ControllerType {
        self.hands[hand as usize].controller
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Session-cached controller classification; only re-queried while the
    /// previous answer was Unknown (device strings not ready yet).
    fn classify(&mut self, hand: Hand) {
        if self.hands[hand as usize].controller != ControllerType::Unknown {
            return;
        }

        let manufacturer = self.runtime.manufacturer(hand);
        let render_model = self.runtime.render_model_name(hand);
        let classified =
            classify_controller(manufacturer.as_deref(), render_model.as_deref());
        if classified == ControllerType::Unknown {
            return;
        }

        info!("{hand:?} controller classified as {classified:?} (model {render_model:?})");
        let state = &mut self.hands[hand as usize];
        state.controller = classified;
        state.grip_offset = self
            .grip_offsets
            .get(classified.config_key())
            .map(|offsets| offsets.get(hand).pose())
            .unwrap_or_default();
    }
}

impl<R: SteamVrRuntime> TrackingSource for SteamVrSource<R> {
    fn update(&mut self, dt: f32) {
        for hand in Hand::BOTH {
            if !self.runtime.controller_connected(hand) {
                let state = &mut self.hands[hand as usize];
                state.kind = TrackingKind::None;
                state.confidence = 0.0;
                continue;
            }

            self.classify(hand);

            let state = &mut self.hands[hand as usize];
            if self.runtime.skeletal_pose(hand, &mut state.skeleton) {
                state.kind = TrackingKind::Skeletal;
                state.confidence = self.runtime.skeletal_confidence(hand).clamp(0.0, 1.0);
                continue;
            }

            // No skeletal action: estimate a pose from buttons and axes.
            let Some(grip) = self.runtime.grip_pose(hand) else {
                state.kind = TrackingKind::None;
                state.confidence = 0.0;
                continue;
            };
            let input = self.runtime.input_state(hand);
            state.kind = TrackingKind::Emulation;
            state.confidence = 1.0;
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
        self.hands[hand as usize].confidence
    }

    fn skeleton(&self, hand: Hand) -> &SourceSkeleton {
        &self.hands[hand as usize].skeleton
    }
}
