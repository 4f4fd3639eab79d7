#![deny(clippy::all)]

//! Skeletal hand retargeting for VR embodiment.
//!
//! Converts a tracking source's bone hierarchy (SteamVR skeletal actions,
//! Oculus hand skeletons, or controller-driven emulation) into a canonical
//! hand skeleton with per-joint basis remapping and constrained joint
//! limits, then aggregates both hands into per-tick frames for interaction
//! consumers.

pub mod config;
pub mod constraint;
pub mod events;
pub mod frame;
pub mod haptics;
pub mod math;
pub mod retarget;
pub mod rig;
pub mod scheduler;
pub mod skeleton;
pub mod tracking;

pub use config::{ConfigError, RigConfig};
pub use frame::{CanonicalHandPose, Frame, FrameProvider};
pub use haptics::{HapticBackend, HapticPulse, HapticRouter};
pub use math::BoneBasis;
pub use retarget::SkeletonRetargeter;
pub use rig::{HandRig, RigContext};
pub use scheduler::{Phase, TickScheduler, Tickable};
pub use skeleton::{Finger, Hand, HandJoint, Pose, SourceSkeleton, TargetSkeleton};
pub use tracking::{TrackingKind, TrackingMonitor, TrackingSource};

pub fn init_logging() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .is_test(cfg!(test))
            .format(|buf, record| {
                use std::io::Write;
                use time::macros::format_description;

                let style = buf.default_level_style(record.level());
                let now = time::OffsetDateTime::now_utc();
                let now = now
                    .format(format_description!(
                        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
                    ))
                    .unwrap_or_default();

                write!(buf, "[{now} {style}{:5}{style:#}", record.level())?;
                if let Some(path) = record.module_path() {
                    write!(buf, " {}", path)?;
                }
                writeln!(buf, "] {}", record.args())
            })
            .init();
    });
}
