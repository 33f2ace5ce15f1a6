//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is an immutable value handed to the driver at
//! construction. [`validate()`](SimulationConfig::validate) checks every
//! physical and numerical precondition before the first step; pipeline
//! checks run when the driver assembles its propagators.

use std::error::Error;
use std::fmt;

use dendrite_propagator::PipelineError;
use dendrite_space::{Grid2D, SpaceError};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::preset::Preset;

// ── MaterialConstants ──────────────────────────────────────────────

/// Thermophysical constants of the alloy.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialConstants {
    /// Gibbs–Thomson coefficient Γ, K·m.
    pub gibbs_thomson: f64,
    /// Interface kinetic coefficient μ_k, m/(s·K).
    pub kinetic_coefficient: f64,
    /// Nominal composition C0, wt%.
    pub nominal_concentration: f64,
    /// Liquidus slope m_l, K/wt%.
    pub liquidus_slope: f64,
    /// Equilibrium partition coefficient k.
    pub partition_coefficient: f64,
    /// Solute diffusivity in the liquid, m²/s.
    pub diffusivity_liquid: f64,
    /// Solute diffusivity in the solid, m²/s.
    pub diffusivity_solid: f64,
}

impl MaterialConstants {
    /// Al–3 wt% Cu.
    pub fn al_cu() -> Self {
        Self {
            gibbs_thomson: 2.4e-7,
            kinetic_coefficient: 3e-4,
            nominal_concentration: 3.0,
            liquidus_slope: -3.36,
            partition_coefficient: 0.17,
            diffusivity_liquid: 3e-9,
            diffusivity_solid: 3e-13,
        }
    }

    /// The larger of the two diffusivities.
    pub fn max_diffusivity(&self) -> f64 {
        self.diffusivity_liquid.max(self.diffusivity_solid)
    }
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self::al_cu()
    }
}

// ── Domain and nucleation ──────────────────────────────────────────

/// Grid dimensions and cell size.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainConfig {
    /// Cells along x.
    pub sizex: u32,
    /// Cells along y.
    pub sizey: u32,
    /// Cell edge length Lc in metres.
    pub cell_size: f64,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            sizex: 75,
            sizey: 75,
            cell_size: 0.25e-6,
        }
    }
}

/// Where the initial solid seed is placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedSite {
    /// `(sizex / 2, sizey / 2)`.
    Center,
    /// An explicit cell.
    At {
        /// x index.
        i: i32,
        /// y index.
        j: i32,
    },
    /// A reproducible draw within the central half of each axis.
    Random {
        /// Seed for the ChaCha8 generator.
        rng_seed: u64,
    },
}

/// Seed placement and crystal orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct NucleationConfig {
    /// Seed placement.
    pub seed: SeedSite,
    /// Preferred growth direction in degrees from +x.
    pub crystal_angle_deg: f64,
}

impl Default for NucleationConfig {
    fn default() -> Self {
        Self {
            seed: SeedSite::Center,
            crystal_angle_deg: 0.0,
        }
    }
}

// ── Growth ─────────────────────────────────────────────────────────

/// Driving force and interface-shape parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthConfig {
    /// Imposed undercooling U_C in K.
    pub undercooling: f64,
    /// Interface-area scaling b0.
    pub geometric_factor: f64,
    /// Anisotropy strength δk, in `[0, 1]`.
    pub anisotropy: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            undercooling: 15.0,
            geometric_factor: 0.4,
            anisotropy: 0.3,
        }
    }
}

// ── Time ───────────────────────────────────────────────────────────

/// When [`SimulationDriver::run`](crate::SimulationDriver::run) stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Termination {
    /// After exactly this many steps.
    Steps(u64),
    /// Once the solid fraction reaches `target`, or after `max_steps`.
    SolidFraction {
        /// Target solid fraction in `(0, 1]`.
        target: f64,
        /// Upper bound on the step count.
        max_steps: u64,
    },
}

impl Termination {
    /// The most steps `run()` will take.
    pub fn max_steps(&self) -> u64 {
        match *self {
            Self::Steps(n) => n,
            Self::SolidFraction { max_steps, .. } => max_steps,
        }
    }
}

/// Timestep control and termination.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeConfig {
    /// Timestep of the first step, in seconds.
    pub initial_dt: f64,
    /// Safety factor on the kinetic bound `Lc / V_max`. At least 1.
    pub cfl_factor: f64,
    /// Optional upper bound on every timestep.
    pub dt_cap: Option<f64>,
    /// Stop condition.
    pub termination: Termination,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            initial_dt: 1e-6,
            cfl_factor: 5.0,
            dt_cap: None,
            termination: Termination::Steps(400),
        }
    }
}

// ── Output ─────────────────────────────────────────────────────────

/// Progress reporting and snapshot retention.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputConfig {
    /// Log progress every this many steps. Must be at least 1.
    pub progress_interval: u64,
    /// Retain a field snapshot every this many steps.
    pub snapshot_interval: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress_interval: 100,
            snapshot_interval: None,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationConfig::validate()`] or driver
/// construction.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Grid dimensions are invalid.
    Space(SpaceError),
    /// Propagator pipeline validation failed.
    Pipeline(PipelineError),
    /// Cell size is NaN, infinite, zero, or negative.
    InvalidCellSize {
        /// The invalid value.
        value: f64,
    },
    /// A material constant is out of range.
    InvalidMaterial {
        /// Which constant, and why.
        reason: String,
    },
    /// The undercooling cannot overcome the curvature of a single seed,
    /// so nothing would ever grow.
    NoDrivingForce {
        /// The configured undercooling in K.
        undercooling: f64,
        /// Curvature undercooling next to an isolated seed, in K.
        curvature_undercooling: f64,
    },
    /// The seed lies outside the grid.
    SeedOutOfBounds {
        /// Requested x index.
        i: i32,
        /// Requested y index.
        j: i32,
        /// Grid size along x.
        sizex: u32,
        /// Grid size along y.
        sizey: u32,
    },
    /// A growth or orientation parameter is out of range.
    InvalidGrowth {
        /// Which parameter, and why.
        reason: String,
    },
    /// A timestep parameter is out of range.
    InvalidTime {
        /// Which parameter, and why.
        reason: String,
    },
    /// The termination condition can never be met or is empty.
    InvalidTermination {
        /// Why.
        reason: String,
    },
    /// An output interval is zero.
    InvalidOutput {
        /// Which interval.
        reason: String,
    },
    /// A propagator rejected its parameters.
    InvalidPropagator {
        /// The builder's message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::InvalidCellSize { value } => {
                write!(f, "cell_size must be finite and positive, got {value}")
            }
            Self::InvalidMaterial { reason } => write!(f, "invalid material: {reason}"),
            Self::NoDrivingForce {
                undercooling,
                curvature_undercooling,
            } => write!(
                f,
                "undercooling {undercooling} K does not exceed the seed curvature \
                 undercooling {curvature_undercooling:.4} K; nothing can grow"
            ),
            Self::SeedOutOfBounds { i, j, sizex, sizey } => {
                write!(f, "seed ({i}, {j}) outside {sizex}x{sizey} grid")
            }
            Self::InvalidGrowth { reason } => write!(f, "invalid growth config: {reason}"),
            Self::InvalidTime { reason } => write!(f, "invalid time config: {reason}"),
            Self::InvalidTermination { reason } => write!(f, "invalid termination: {reason}"),
            Self::InvalidOutput { reason } => write!(f, "invalid output config: {reason}"),
            Self::InvalidPropagator { reason } => write!(f, "invalid propagator: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Complete input for one simulation run.
///
/// The default is the reference Al–Cu scenario: a 75x75 grid of
/// 0.25 µm cells, 15 K undercooling and 400 steps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationConfig {
    /// Grid dimensions and cell size.
    pub domain: DomainConfig,
    /// Seed placement and orientation.
    pub nucleation: NucleationConfig,
    /// Driving force and anisotropy.
    pub growth: GrowthConfig,
    /// Timestep control and termination.
    pub time: TimeConfig,
    /// Alloy constants.
    pub material: MaterialConstants,
    /// Progress and snapshots.
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Configuration for a named preset.
    pub fn preset(preset: Preset) -> Self {
        preset.config()
    }

    /// Largest stable diffusion timestep, `Lc² / (4 D_max)`.
    pub fn diffusion_limit(&self) -> f64 {
        let lc = self.domain.cell_size;
        lc * lc / (4.0 * self.material.max_diffusivity())
    }

    /// Curvature undercooling `Γ G` of a liquid cell touching an
    /// isolated seed, where `G = (1 − 2/9) / Lc`.
    pub fn seed_curvature_undercooling(&self) -> f64 {
        self.material.gibbs_thomson * (1.0 - 2.0 / 9.0) / self.domain.cell_size
    }

    /// Grid described by the domain config.
    pub fn grid(&self) -> Result<Grid2D, ConfigError> {
        Ok(Grid2D::new(self.domain.sizex, self.domain.sizey)?)
    }

    /// Seed cell on `grid`.
    ///
    /// [`SeedSite::Random`] draws each axis uniformly from
    /// `[size / 4, size − size / 4)` with a ChaCha8 generator, so the
    /// same `rng_seed` always gives the same cell.
    pub fn resolve_seed(&self, grid: Grid2D) -> Result<(i32, i32), ConfigError> {
        let (i, j) = match self.nucleation.seed {
            SeedSite::Center => grid.center(),
            SeedSite::At { i, j } => (i, j),
            SeedSite::Random { rng_seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
                let mut draw = |size: u32| -> i32 {
                    let lo = size / 4;
                    let span = (size - 2 * lo) as u64;
                    (lo as u64 + rng.next_u64() % span) as i32
                };
                let i = draw(grid.sizex());
                let j = draw(grid.sizey());
                (i, j)
            }
        };
        if !grid.contains(i, j) {
            return Err(ConfigError::SeedOutOfBounds {
                i,
                j,
                sizex: grid.sizex(),
                sizey: grid.sizey(),
            });
        }
        Ok((i, j))
    }

    /// Check every precondition that does not depend on the pipeline.
    ///
    /// Checks, in order:
    ///
    /// 1. Grid dimensions are valid.
    /// 2. Cell size is finite and positive.
    /// 3. Material constants are in range.
    /// 4. The undercooling can grow the seed.
    /// 5. The seed lies inside the grid.
    /// 6. Growth and orientation parameters are in range.
    /// 7. Timestep parameters are in range.
    /// 8. The termination condition is reachable.
    /// 9. Output intervals are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Grid
        let grid = self.grid()?;

        // 2. Cell size
        let lc = self.domain.cell_size;
        if !lc.is_finite() || lc <= 0.0 {
            return Err(ConfigError::InvalidCellSize { value: lc });
        }

        // 3. Materials
        let m = &self.material;
        for (name, value) in [
            ("diffusivity_liquid", m.diffusivity_liquid),
            ("diffusivity_solid", m.diffusivity_solid),
            ("kinetic_coefficient", m.kinetic_coefficient),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidMaterial {
                    reason: format!("{name} must be finite and positive, got {value}"),
                });
            }
        }
        let k = m.partition_coefficient;
        if !(k > 0.0 && k <= 1.0) {
            return Err(ConfigError::InvalidMaterial {
                reason: format!("partition_coefficient must lie in (0, 1], got {k}"),
            });
        }
        for (name, value) in [
            ("gibbs_thomson", m.gibbs_thomson),
            ("nominal_concentration", m.nominal_concentration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidMaterial {
                    reason: format!("{name} must be finite and >= 0, got {value}"),
                });
            }
        }
        if !m.liquidus_slope.is_finite() {
            return Err(ConfigError::InvalidMaterial {
                reason: format!("liquidus_slope must be finite, got {}", m.liquidus_slope),
            });
        }

        // 4. Driving force
        let u = self.growth.undercooling;
        let curvature_undercooling = self.seed_curvature_undercooling();
        if !u.is_finite() || u <= 0.0 || u - curvature_undercooling <= 0.0 {
            return Err(ConfigError::NoDrivingForce {
                undercooling: u,
                curvature_undercooling,
            });
        }

        // 5. Seed
        self.resolve_seed(grid)?;

        // 6. Growth and orientation
        let g = &self.growth;
        if !(0.0..=1.0).contains(&g.anisotropy) {
            return Err(ConfigError::InvalidGrowth {
                reason: format!("anisotropy must lie in [0, 1], got {}", g.anisotropy),
            });
        }
        if !g.geometric_factor.is_finite() || g.geometric_factor <= 0.0 {
            return Err(ConfigError::InvalidGrowth {
                reason: format!(
                    "geometric_factor must be finite and positive, got {}",
                    g.geometric_factor
                ),
            });
        }
        let angle = self.nucleation.crystal_angle_deg;
        if !angle.is_finite() {
            return Err(ConfigError::InvalidGrowth {
                reason: format!("crystal_angle_deg must be finite, got {angle}"),
            });
        }

        // 7. Time
        let t = &self.time;
        if !t.initial_dt.is_finite() || t.initial_dt <= 0.0 {
            return Err(ConfigError::InvalidTime {
                reason: format!("initial_dt must be finite and positive, got {}", t.initial_dt),
            });
        }
        if !t.cfl_factor.is_finite() || t.cfl_factor < 1.0 {
            return Err(ConfigError::InvalidTime {
                reason: format!("cfl_factor must be finite and >= 1, got {}", t.cfl_factor),
            });
        }
        if let Some(cap) = t.dt_cap {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(ConfigError::InvalidTime {
                    reason: format!("dt_cap must be finite and positive, got {cap}"),
                });
            }
        }

        // 8. Termination
        match t.termination {
            Termination::Steps(0) => {
                return Err(ConfigError::InvalidTermination {
                    reason: "step count must be at least 1".to_string(),
                });
            }
            Termination::SolidFraction { target, max_steps } => {
                if !(target > 0.0 && target <= 1.0) {
                    return Err(ConfigError::InvalidTermination {
                        reason: format!("target solid fraction must lie in (0, 1], got {target}"),
                    });
                }
                if max_steps == 0 {
                    return Err(ConfigError::InvalidTermination {
                        reason: "max_steps must be at least 1".to_string(),
                    });
                }
            }
            Termination::Steps(_) => {}
        }

        // 9. Output
        if self.output.progress_interval == 0 {
            return Err(ConfigError::InvalidOutput {
                reason: "progress_interval must be at least 1".to_string(),
            });
        }
        if self.output.snapshot_interval == Some(0) {
            return Err(ConfigError::InvalidOutput {
                reason: "snapshot_interval must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
