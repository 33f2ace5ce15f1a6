//! Benchmark profiles for the dendrite solidification engine.
//!
//! - [`reference_profile`]: the 75x75 reference scenario
//! - [`stress_profile`]: 300x300 grid (90K cells)
//! - [`grown_state`]: a state with a developed crystal to benchmark on

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dendrite_core::{StepError, StepId};
use dendrite_engine::{ConfigError, SimulationConfig, SimulationDriver, Termination};
use dendrite_propagator::{GridState, Propagator, StepContext, StepScratch, WriteMode};

/// The reference scenario: 75x75 cells, Al–Cu, 15 K, 400 steps.
pub fn reference_profile() -> SimulationConfig {
    SimulationConfig::default()
}

/// Same physics as [`reference_profile`] on a 300x300 grid.
pub fn stress_profile() -> SimulationConfig {
    let mut cfg = SimulationConfig::default();
    cfg.domain.sizex = 300;
    cfg.domain.sizey = 300;
    cfg
}

/// Errors from preparing a benchmark state.
#[derive(Debug)]
pub enum ProfileError {
    /// The profile failed validation.
    Config(ConfigError),
    /// The warm-up run failed.
    Step(StepError),
}

impl From<ConfigError> for ProfileError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StepError> for ProfileError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

/// Run `config` for `steps` steps and return the resulting state.
///
/// Gives the benches a crystal with a realistic interface length
/// instead of a lone seed.
pub fn grown_state(mut config: SimulationConfig, steps: u64) -> Result<GridState, ProfileError> {
    config.time.termination = Termination::Steps(steps.max(1));
    let mut driver = SimulationDriver::new(config)?;
    driver.run()?;
    Ok(driver.state().clone())
}

/// Run every stage of `pipeline` once on `state`, resetting full-mode
/// outputs first the way the driver does.
pub fn run_pipeline_once(
    state: &mut GridState,
    scratch: &mut StepScratch,
    pipeline: &[Box<dyn Propagator>],
    dt: f64,
) -> Result<(), StepError> {
    scratch.reset();
    for prop in pipeline {
        for (field, mode) in prop.writes() {
            if mode == WriteMode::Full {
                state.reset_field(field);
            }
        }
        let mut ctx = StepContext::new(state, scratch, StepId(1), dt);
        prop.step(&mut ctx)
            .map_err(|e| StepError::from_propagator(StepId(1), prop.name(), e))?;
    }
    Ok(())
}
