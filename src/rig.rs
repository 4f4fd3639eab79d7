use crate::config::{ConfigError, RigConfig};
use crate::frame::{CanonicalHandPose, FrameProvider};
use crate::haptics::{HapticBackend, HapticPulse, HapticRouter};
use crate::retarget::SkeletonRetargeter;
use crate::scheduler::Tickable;
use crate::skeleton::{Hand, TargetSkeleton};
use crate::tracking::{TrackingKind, TrackingMonitor, TrackingSource};

/// Everything constructed once at startup and threaded through explicitly.
/// Components take this by reference instead of reaching into globals.
pub struct RigContext {
    pub config: RigConfig,
}

impl RigContext {
    pub fn new(config: RigConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validate()?,
        })
    }
}

/// The assembled per-user hand pipeline: tracking source in, retargeted
/// canonical skeletons and frames out, haptics back.
///
/// One `tick` runs the whole producer chain in order — poll tracking,
/// retarget both hands, rebuild the canonical poses, publish the frame — so
/// that a consumer scheduled after the rig always reads this tick's data.
pub struct HandRig<S> {
    source: S,
    retargeters: [SkeletonRetargeter; 2],
    targets: [TargetSkeleton; 2],
    poses: [CanonicalHandPose; 2],
    /// A hand enters the frame after its first valid pose and then never
    /// leaves; tracking loss holds the last pose.
    tracked_once: [bool; 2],
    pub monitor: TrackingMonitor,
    pub frames: FrameProvider,
    pub haptics: HapticRouter,
}

impl<S: TrackingSource> HandRig<S> {
    pub fn new(
        context: &RigContext,
        source: S,
        haptic_backend: Box<dyn HapticBackend>,
    ) -> Result<Self, ConfigError> {
        let config = &context.config;
        let retargeter = || SkeletonRetargeter::new(config.basis, config.constraint_set());
        let target = || {
            TargetSkeleton::new(
                config.finger_pointing,
                config.palm_facing,
                config.reference_hand.clone(),
            )
            .ok_or(ConfigError::DegenerateCanonicalAxes)
        };

        Ok(Self {
            source,
            retargeters: [retargeter()?, retargeter()?],
            targets: [target()?, target()?],
            poses: [
                CanonicalHandPose::new(Hand::Left),
                CanonicalHandPose::new(Hand::Right),
            ],
            tracked_once: [false; 2],
            monitor: TrackingMonitor::new(),
            frames: FrameProvider::new(),
            haptics: HapticRouter::new(haptic_backend),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn target(&self, hand: Hand) -> &TargetSkeleton {
        &self.targets[hand as usize]
    }

    /// The haptics boundary: clamped and routed to the active backend, a
    /// no-op while the hand's tracking is invalid.
    pub fn pulse(&mut self, hand: Hand, pulse: HapticPulse) {
        self.haptics.pulse(hand, pulse);
    }
}

impl<S: TrackingSource> Tickable for HandRig<S> {
    /// Chain-length validation against the source's topology, before the
    /// first tick ever runs.
    fn initialize(&mut self) -> Result<(), ConfigError> {
        for hand in Hand::BOTH {
            SkeletonRetargeter::validate_topology(
                self.source.skeleton(hand),
                &self.targets[hand as usize],
            )?;
        }
        Ok(())
    }

    fn tick(&mut self, dt: f32) {
        self.source.update(dt);

        for hand in Hand::BOTH {
            let index = hand as usize;
            let kind = self.source.kind(hand);
            self.monitor.observe(hand, kind);
            self.haptics
                .set_tracking_valid(hand, kind != TrackingKind::None);

            if kind == TrackingKind::None {
                // Hold last pose: no update, previous transforms stay valid
                // for consumers.
                continue;
            }

            self.retargeters[index].retarget(self.source.skeleton(hand), &mut self.targets[index]);
            self.poses[index].rebuild_from(&self.targets[index], self.source.confidence(hand));
            self.tracked_once[index] = true;
        }

        let left = self.tracked_once[Hand::Left as usize].then_some(&self.poses[0]);
        let right = self.tracked_once[Hand::Right as usize].then_some(&self.poses[1]);
        self.frames.publish(left, right);
    }

    fn fixed_tick(&mut self, _dt: f32) {
        self.frames.dispatch_fixed();
    }
}
