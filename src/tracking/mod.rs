pub mod oculus_hand;
pub mod oculus_touch;
pub mod steamvr;


use crate::events::ObserverList;
use crate::skeleton::{Hand, SourceSkeleton};
use log::info;

/// How a hand's pose is being sourced this tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrackingKind {
    /// No controller or hand is active; consumers hold the last pose.
    #[default]
    None,
    /// Full skeletal tracking from the platform.
    Skeletal,
    /// Pose synthesized from controller buttons and axes.
    Emulation,
}

/// Uniform per-tick hand input: a kind classification, a confidence scalar
/// in [0, 1] and the world joint poses.
///
/// `skeleton` always has valid topology; when `kind` is `None` its contents
/// are simply last tick's (the hold-last policy lives downstream, in whether
/// the retargeter runs at all).
pub trait TrackingSource {
    /// Poll the backend. Called exactly once per variable tick, strictly
    /// before any consumer reads.
    fn update(&mut self, dt: f32);
    fn kind(&self, hand: Hand) -> TrackingKind;
    fn confidence(&self, hand: Hand) -> f32;
    fn skeleton(&self, hand: Hand) -> &SourceSkeleton;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ControllerType {
    #[default]
    Unknown,
    Knuckles,
    Touch,
    ViveWand,
}

impl ControllerType {
    /// Key into the rig config's grip offset table.
    pub fn config_key(&self) -> &'static str {
        match self {
            ControllerType::Unknown => "unknown",
            ControllerType::Knuckles => "knuckles",
            ControllerType::Touch => "oculus_touch",
            ControllerType::ViveWand => "vive",
        }
    }
}

/// One-time controller classification from device strings.
///
/// Manufacturer wins outright: "Oculus" means Touch-like regardless of the
/// render model. Otherwise a render model containing "index" (any case) is a
/// Knuckles, and anything else defaults to a Vive-like wand. Missing strings
/// mean the device isn't ready; the caller retries next tick instead of
/// caching the failure.
pub fn classify_controller(
    manufacturer: Option<&str>,
    render_model: Option<&str>,
) -> ControllerType {
    let Some(manufacturer) = manufacturer else {
        return ControllerType::Unknown;
    };
    if manufacturer == "Oculus" {
        return ControllerType::Touch;
    }
    match render_model {
        Some(model) if model.to_ascii_lowercase().contains("index") => ControllerType::Knuckles,
        Some(_) => ControllerType::ViveWand,
        None => ControllerType::Unknown,
    }
}

pub struct ProfileProperties {
    pub model: &'static str,
    pub manufacturer: &'static str,
    pub render_model_name: &'static str,
}

/// Static registry of the controller models this crate knows how to drive.
pub struct Profiles {
    list: &'static [(ControllerType, &'static ProfileProperties)],
}

impl Profiles {
    #[inline]
    pub fn get() -> &'static Self {
        // Add supported controllers here.
        static P: Profiles = Profiles {
            list: &[
                (
                    ControllerType::Knuckles,
                    &ProfileProperties {
                        model: "Knuckles",
                        manufacturer: "Valve",
                        render_model_name: "{indexcontroller}valve_controller_knu_1_0",
                    },
                ),
                (
                    ControllerType::Touch,
                    &ProfileProperties {
                        model: "Miramar",
                        manufacturer: "Oculus",
                        render_model_name: "oculus_quest2_controller",
                    },
                ),
                (
                    ControllerType::ViveWand,
                    &ProfileProperties {
                        model: "Vive. Controller MV",
                        manufacturer: "HTC",
                        render_model_name: "vr_controller_vive_1_5",
                    },
                ),
            ],
        };
        &P
    }

    pub fn properties(&self, controller: ControllerType) -> Option<&'static ProfileProperties> {
        self.list
            .iter()
            .find_map(|(ty, props)| (*ty == controller).then_some(*props))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrackingEvent {
    pub hand: Hand,
    pub kind: TrackingKind,
}

/// Edge-triggered tracking notifications.
///
/// `observe` is called once per hand per tick; each event fires at most once
/// per tick, only when the kind differs from the previous tick's cached
/// value.
#[derive(Default)]
pub struct TrackingMonitor {
    previous: [TrackingKind; 2],
    pub kind_changed: ObserverList<TrackingEvent>,
    pub gained: ObserverList<TrackingEvent>,
    pub lost: ObserverList<TrackingEvent>,
}

impl TrackingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self, hand: Hand) -> TrackingKind {
        self.previous[hand as usize]
    }

    pub fn observe(&mut self, hand: Hand, kind: TrackingKind) {
        let previous = self.previous[hand as usize];
        if previous == kind {
            return;
        }
        self.previous[hand as usize] = kind;
        info!("{hand:?} tracking changed: {previous:?} -> {kind:?}");

        let event = TrackingEvent { hand, kind };
        self.kind_changed.emit(&event);
        if previous == TrackingKind::None {
            self.gained.emit(&event);
        } else if kind == TrackingKind::None {
            self.lost.emit(&event);
        }
    }
}
