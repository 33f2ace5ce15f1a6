//! Integration test: a healthy reference run logs no warnings.
//!
//! The controller pins Δt to the diffusion bound for most of the run.
//! Sitting exactly at the bound is ordinary operation and must stay
//! below `warn`. Lives in its own test binary because the logger is
//! process-global.

use std::sync::atomic::{AtomicUsize, Ordering};

use dendrite_engine::{SimulationConfig, SimulationDriver};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct CountingLogger {
    warnings: AtomicUsize,
}

impl Log for CountingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record<'_>) {
        if record.level() <= Level::Warn {
            self.warnings.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn flush(&self) {}
}

static LOGGER: CountingLogger = CountingLogger {
    warnings: AtomicUsize::new(0),
};

#[test]
fn reference_run_at_the_diffusion_bound_is_quiet() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let mut driver = SimulationDriver::new(SimulationConfig::default()).unwrap();
    let summary = driver.run().unwrap();
    assert_eq!(summary.steps, 400);
    // The bound governed at least the last step.
    assert_eq!(driver.dt(), driver.controller().diffusion_limit());
    assert_eq!(LOGGER.warnings.load(Ordering::Relaxed), 0);
}
