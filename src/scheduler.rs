use crate::config::ConfigError;
use log::warn;

/// Update phases in execution order. Pose producers run strictly before any
/// consumer reads the tick's frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Tracking = 0,
    Retarget,
    FrameDispatch,
    Consumer,
}

/// A scheduled component. `initialize` runs once before the first tick and
/// is the only place configuration errors can surface; the tick methods are
/// infallible by design.
pub trait Tickable {
    fn initialize(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }
    /// Variable-rate update, once per rendered frame.
    fn tick(&mut self, dt: f32);
    /// Fixed-rate update; may run 0, 1 or multiple times per rendered frame.
    fn fixed_tick(&mut self, _dt: f32) {}
}

/// Cooperative single-threaded tick loop driver.
///
/// Components register with a phase; within a phase, registration order is
/// preserved. `start` initializes everything front to back and refuses to
/// run a rig whose configuration failed validation.
#[derive(Default)]
pub struct TickScheduler {
    entries: Vec<(Phase, Box<dyn Tickable>)>,
    started: bool,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, phase: Phase, component: Box<dyn Tickable>) {
        self.entries.push((phase, component));
    }

    /// Sort into phase order and initialize every component, failing fast on
    /// the first configuration error.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        // Stable: registration order survives within a phase.
        self.entries.sort_by_key(|(phase, _)| *phase);
        for (_, component) in &mut self.entries {
            component.initialize()?;
        }
        self.started = true;
        Ok(())
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.started {
            warn!("tick before start, ignoring");
            return;
        }
        for (_, component) in &mut self.entries {
            component.tick(dt);
        }
    }

    pub fn fixed_tick(&mut self, dt: f32) {
        if !self.started {
            return;
        }
        for (_, component) in &mut self.entries {
            component.fixed_tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
        fail_init: bool,
    }

    impl Tickable for Probe {
        fn initialize(&mut self) -> Result<(), ConfigError> {
            if self.fail_init {
                return Err(ConfigError::DegenerateBasis);
            }
            Ok(())
        }
        fn tick(&mut self, _dt: f32) {
            self.log.borrow_mut().push(self.tag);
        }
    }

    #[test]
    fn phases_run_in_order_registration_breaks_ties() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let probe = |tag, log: &Rc<RefCell<Vec<&'static str>>>| {
            Box::new(Probe {
                tag,
                log: log.clone(),
                fail_init: false,
            })
        };

        let mut scheduler = TickScheduler::new();
        scheduler.register(Phase::Consumer, probe("consumer-a", &log));
        scheduler.register(Phase::Tracking, probe("tracking", &log));
        scheduler.register(Phase::Consumer, probe("consumer-b", &log));
        scheduler.register(Phase::Retarget, probe("retarget", &log));
        scheduler.register(Phase::FrameDispatch, probe("frames", &log));

        scheduler.start().unwrap();
        scheduler.tick(0.016);

        assert_eq!(
            *log.borrow(),
            ["tracking", "retarget", "frames", "consumer-a", "consumer-b"]
        );
    }

    #[test]
    fn start_fails_fast_and_blocks_ticking() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = TickScheduler::new();
        scheduler.register(
            Phase::Tracking,
            Box::new(Probe {
                tag: "bad",
                log: log.clone(),
                fail_init: true,
            }),
        );

        assert!(scheduler.start().is_err());
        scheduler.tick(0.016);
        assert!(log.borrow().is_empty());
    }
}
