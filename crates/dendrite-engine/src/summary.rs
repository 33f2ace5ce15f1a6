//! End-of-run statistics.

use std::fmt;

use dendrite_propagator::GridState;

/// Descriptive statistics of a concentration array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConcentrationStats {
    /// Sum over all cells.
    pub sum: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl ConcentrationStats {
    /// Statistics of `values`, or `None` if it is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let mean = sum / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some(Self {
            sum,
            mean,
            std_dev: var.sqrt(),
            min,
            max,
        })
    }
}

/// What a completed run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps executed.
    pub steps: u64,
    /// Simulated time in seconds.
    pub time: f64,
    /// Captured cells.
    pub solid_count: usize,
    /// Total cells.
    pub cell_count: usize,
    /// `solid_count / cell_count`.
    pub solid_fraction: f64,
    /// Mean fraction solid.
    pub mean_fraction_solid: f64,
    /// Max velocity of the last step, m/s.
    pub final_max_velocity: f64,
    /// Largest max velocity of any step, m/s.
    pub peak_max_velocity: f64,
    /// Statistics of the equilibrium concentration field.
    pub equilibrium: ConcentrationStats,
    /// Mean equilibrium concentration of solid cells over C0.
    pub solid_segregation: Option<f64>,
    /// Mean equilibrium concentration of liquid cells over C0.
    pub liquid_segregation: Option<f64>,
}

impl RunSummary {
    /// Summarise `state` after `steps` steps.
    ///
    /// `velocity_history` holds one V_max per step. Segregation ratios
    /// are `None` when the phase is empty or `c0` is zero.
    pub fn from_state(
        state: &GridState,
        steps: u64,
        time: f64,
        velocity_history: &[f64],
        partition: f64,
        c0: f64,
    ) -> Self {
        let eq = state.equilibrium_concentration(partition);
        let mut solid = (0.0, 0usize);
        let mut liquid = (0.0, 0usize);
        for (idx, &c) in eq.iter().enumerate() {
            let acc = if state.is_solid(idx) {
                &mut solid
            } else {
                &mut liquid
            };
            acc.0 += c;
            acc.1 += 1;
        }
        let ratio = |(sum, n): (f64, usize)| {
            if n == 0 || c0 == 0.0 {
                None
            } else {
                Some(sum / n as f64 / c0)
            }
        };
        let equilibrium = ConcentrationStats::from_values(&eq).unwrap_or(ConcentrationStats {
            sum: 0.0,
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
        });

        Self {
            steps,
            time,
            solid_count: state.solid_count(),
            cell_count: state.cell_count(),
            solid_fraction: state.solid_fraction(),
            mean_fraction_solid: state.mean_fraction_solid(),
            final_max_velocity: velocity_history.last().copied().unwrap_or(0.0),
            peak_max_velocity: velocity_history.iter().copied().fold(0.0, f64::max),
            equilibrium,
            solid_segregation: ratio(solid),
            liquid_segregation: ratio(liquid),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "steps:               {}", self.steps)?;
        writeln!(f, "simulated time:      {:.4e} s", self.time)?;
        writeln!(
            f,
            "solid cells:         {}/{} ({:.4})",
            self.solid_count, self.cell_count, self.solid_fraction
        )?;
        writeln!(f, "mean Fs:             {:.4}", self.mean_fraction_solid)?;
        writeln!(
            f,
            "max velocity:        {:.4e} m/s (peak {:.4e})",
            self.final_max_velocity, self.peak_max_velocity
        )?;
        let eq = &self.equilibrium;
        write!(
            f,
            "equilibrium C:       mean {:.4}, std {:.4}, range [{:.4}, {:.4}]",
            eq.mean, eq.std_dev, eq.min, eq.max
        )?;
        if let Some(s) = self.solid_segregation {
            write!(f, "\nsolid segregation:   {s:.4}")?;
        }
        if let Some(l) = self.liquid_segregation {
            write!(f, "\nliquid segregation:  {l:.4}")?;
        }
        Ok(())
    }
}
