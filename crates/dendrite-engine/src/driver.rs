//! Simulation driver: the single-threaded step loop.
//!
//! [`SimulationDriver`] owns the grid state, the propagator pipeline and
//! the timestep controller. Each [`step()`](SimulationDriver::step) runs
//! every propagator in order, scans what each one wrote for NaN/Inf,
//! chooses the next Δt and advances the clock. The first fatal error
//! leaves the driver aborted; every later call returns
//! [`StepError::RunAborted`].

use std::time::Instant;

use dendrite_core::{Instability, StepError, StepId};
use dendrite_propagator::{
    validate_pipeline, GridState, Propagator, StepContext, StepScratch, WriteMode,
};

use crate::config::{ConfigError, SimulationConfig, Termination};
use crate::metrics::StepMetrics;
use crate::pipeline::standard_pipeline;
use crate::snapshot::FieldSnapshot;
use crate::summary::RunSummary;
use crate::timestep::TimeStepController;

/// Runs a solidification simulation step by step.
pub struct SimulationDriver {
    config: SimulationConfig,
    state: GridState,
    scratch: StepScratch,
    propagators: Vec<Box<dyn Propagator>>,
    controller: TimeStepController,
    step_id: StepId,
    time: f64,
    dt: f64,
    aborted_at: Option<StepId>,
    velocity_history: Vec<f64>,
    solid_fraction_history: Vec<f64>,
    snapshots: Vec<FieldSnapshot>,
    last_metrics: StepMetrics,
}

impl SimulationDriver {
    /// Construct a driver running the standard pipeline.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pipeline = standard_pipeline(&config)?;
        Self::with_pipeline(config, pipeline)
    }

    /// Construct a driver running a caller-supplied pipeline.
    ///
    /// Validates the configuration, then the pipeline against the
    /// initial Δt, then allocates the grid with its seed.
    pub fn with_pipeline(
        config: SimulationConfig,
        propagators: Vec<Box<dyn Propagator>>,
    ) -> Result<Self, ConfigError> {
        // 1. Configuration.
        config.validate()?;

        // 2. Pipeline, including every propagator's max_dt.
        validate_pipeline(&propagators, config.time.initial_dt)?;

        // 3. State.
        let grid = config.grid()?;
        let seed = config.resolve_seed(grid)?;
        let state = GridState::new(
            grid,
            config.material.nominal_concentration,
            seed,
            config.nucleation.crystal_angle_deg,
        )?;

        let controller = TimeStepController::new(
            config.domain.cell_size,
            config.time.cfl_factor,
            config.material.max_diffusivity(),
            config.time.dt_cap,
        );

        log::info!(
            "{}x{} grid, Lc {:e} m, seed ({}, {}), crystal angle {}°, {} propagators",
            grid.sizex(),
            grid.sizey(),
            config.domain.cell_size,
            seed.0,
            seed.1,
            config.nucleation.crystal_angle_deg,
            propagators.len()
        );

        let capacity = config.time.termination.max_steps().min(1 << 16) as usize;
        Ok(Self {
            scratch: StepScratch::new(state.cell_count()),
            dt: config.time.initial_dt,
            state,
            propagators,
            controller,
            step_id: StepId(0),
            time: 0.0,
            aborted_at: None,
            velocity_history: Vec::with_capacity(capacity),
            solid_fraction_history: Vec::with_capacity(capacity),
            snapshots: Vec::new(),
            last_metrics: StepMetrics::default(),
            config,
        })
    }

    /// Execute one step.
    ///
    /// On error the driver is aborted and the state is left as the
    /// failing propagator found it.
    pub fn step(&mut self) -> Result<&StepMetrics, StepError> {
        if let Some(at) = self.aborted_at {
            return Err(StepError::RunAborted { at });
        }
        match self.execute_step() {
            Ok(metrics) => {
                self.last_metrics = metrics;
                Ok(&self.last_metrics)
            }
            Err(e) => {
                let at = self.step_id.next();
                log::error!("step {at} failed, aborting run: {e}");
                self.aborted_at = Some(at);
                Err(e)
            }
        }
    }

    fn execute_step(&mut self) -> Result<StepMetrics, StepError> {
        let step_start = Instant::now();
        let step = self.step_id.next();
        let dt = self.dt;

        // 1. Clear per-step scratch.
        self.scratch.reset();

        // 2. Run the pipeline.
        let mut propagator_us = Vec::with_capacity(self.propagators.len());
        for prop in &self.propagators {
            let prop_start = Instant::now();
            let writes = prop.writes();

            // 2a. Full-mode outputs start from their empty value.
            for &(field, mode) in &writes {
                if mode == WriteMode::Full {
                    self.state.reset_field(field);
                }
            }

            // 2b. Step.
            {
                let mut ctx = StepContext::new(&mut self.state, &mut self.scratch, step, dt);
                prop.step(&mut ctx)
                    .map_err(|e| StepError::from_propagator(step, prop.name(), e))?;
            }

            // 2c. Sentinel scan of everything it wrote.
            for &(field, _) in &writes {
                if let Some((cell, value)) = self.state.first_non_finite(field) {
                    return Err(StepError::NumericalInstability {
                        step,
                        field,
                        kind: Instability::NonFinite {
                            cell: Some(cell),
                            value,
                        },
                    });
                }
            }

            let us = prop_start.elapsed().as_micros() as u64;
            log::trace!("step {step}: {} took {us} us", prop.name());
            propagator_us.push((prop.name().to_string(), us));
        }

        // 3. Next timestep.
        let max_velocity = self.scratch.max_velocity();
        let next_dt = self
            .controller
            .next_dt(max_velocity)
            .map_err(|e| e.into_step_error(step))?;

        // 4. Advance the clock.
        self.step_id = step;
        self.time += dt;
        self.dt = next_dt;

        // 5. Record.
        let solid_count = self.state.solid_count();
        let solid_fraction = solid_count as f64 / self.state.cell_count() as f64;
        self.velocity_history.push(max_velocity);
        self.solid_fraction_history.push(solid_fraction);
        if let Some(every) = self.config.output.snapshot_interval {
            if step.0 % every == 0 {
                self.snapshots
                    .push(FieldSnapshot::from_state(&self.state, step, self.time));
            }
        }

        let metrics = StepMetrics {
            step,
            dt,
            next_dt,
            time: self.time,
            max_velocity,
            solid_count,
            solid_fraction,
            mean_fraction_solid: self.state.mean_fraction_solid(),
            interface_cells: self.scratch.interface_cells().len(),
            captured_cells: self.scratch.captured_cells().len(),
            total_us: step_start.elapsed().as_micros() as u64,
            propagator_us,
        };

        log::debug!(
            "step {step}: dt {dt:.3e} s, v_max {max_velocity:.3e} m/s, {solid_count} solid, {} captured",
            metrics.captured_cells
        );
        if step.0 == 1 || step.0 % self.config.output.progress_interval == 0 {
            log::info!(
                "step {step}: solid fraction {solid_fraction:.4}, v_max {max_velocity:.3e} m/s, dt {dt:.3e} s"
            );
        }

        Ok(metrics)
    }

    /// Step until the configured termination condition holds.
    ///
    /// Counts steps already taken by [`step()`](Self::step). The
    /// condition is only checked between steps.
    pub fn run(&mut self) -> Result<RunSummary, StepError> {
        let termination = self.config.time.termination;
        let max_steps = termination.max_steps();
        while self.step_id.0 < max_steps {
            if let Termination::SolidFraction { target, .. } = termination {
                if self.state.solid_fraction() >= target {
                    break;
                }
            }
            self.step()?;
        }
        let summary = self.summary();
        log::info!(
            "finished after {} steps ({:.4e} s): solid fraction {:.4}, v_max {:.3e} m/s, dt {:.3e} s",
            summary.steps,
            summary.time,
            summary.solid_fraction,
            summary.final_max_velocity,
            self.dt
        );
        Ok(summary)
    }

    /// Statistics of the current state.
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_state(
            &self.state,
            self.step_id.0,
            self.time,
            &self.velocity_history,
            self.config.material.partition_coefficient,
            self.config.material.nominal_concentration,
        )
    }

    /// Live state.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Copy of the persistent fields as of the last completed step.
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::from_state(&self.state, self.step_id, self.time)
    }

    /// Snapshots retained at the configured interval.
    pub fn snapshots(&self) -> &[FieldSnapshot] {
        &self.snapshots
    }

    /// Max velocity of every completed step.
    pub fn velocity_history(&self) -> &[f64] {
        &self.velocity_history
    }

    /// Solid fraction after every completed step.
    pub fn solid_fraction_history(&self) -> &[f64] {
        &self.solid_fraction_history
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Δt the next step will use.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Last completed step; `StepId(0)` before the first.
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Whether a fatal error has stopped the run.
    pub fn is_aborted(&self) -> bool {
        self.aborted_at.is_some()
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The configuration the driver was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The timestep controller.
    pub fn controller(&self) -> &TimeStepController {
        &self.controller
    }
}
