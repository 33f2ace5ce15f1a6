//! Integration test: full solidification runs on the reference scenario.
//!
//! **Workload:** 75x75 grid of 0.25 µm cells, centre seed, Al–Cu
//! material, 15 K undercooling, cfl 5, 400 steps.
//!
//! **Pass criteria:**
//! - final solid fraction in [0.10, 0.20] with every field finite;
//! - four axial arms equal to within a cell;
//! - δk = 0.3 grows axial arms at least 20% longer than diagonals, and
//!   δk = 0 keeps them within 25% of each other;
//! - 0° and 90° crystals are indistinguishable.

use dendrite_engine::{Preset, SimulationConfig, SimulationDriver, Termination};
use dendrite_propagator::GridState;

// ── Helpers ────────────────────────────────────────────────────────

fn run(config: SimulationConfig) -> SimulationDriver {
    let mut driver = SimulationDriver::new(config).unwrap();
    driver.run().unwrap();
    driver
}

/// Distance from the seed to the last solid cell of the unbroken run
/// along `(di, dj)`, in cell widths.
fn arm_length(state: &GridState, di: i32, dj: i32) -> f64 {
    let grid = state.grid();
    let (si, sj) = state.seed();
    let mut k = 0;
    while grid.contains(si + (k + 1) * di, sj + (k + 1) * dj)
        && state.is_solid(grid.index(si + (k + 1) * di, sj + (k + 1) * dj))
    {
        k += 1;
    }
    k as f64 * f64::from(di * di + dj * dj).sqrt()
}

fn axial_arms(state: &GridState) -> [f64; 4] {
    [
        arm_length(state, 1, 0),
        arm_length(state, -1, 0),
        arm_length(state, 0, 1),
        arm_length(state, 0, -1),
    ]
}

fn diagonal_arms(state: &GridState) -> [f64; 4] {
    [
        arm_length(state, 1, 1),
        arm_length(state, -1, 1),
        arm_length(state, 1, -1),
        arm_length(state, -1, -1),
    ]
}

fn mean(xs: [f64; 4]) -> f64 {
    xs.iter().sum::<f64>() / 4.0
}

// ── Reference scenario ─────────────────────────────────────────────

#[test]
fn reference_run_reaches_expected_solid_fraction() {
    let driver = run(SimulationConfig::default());
    let state = driver.state();
    let summary = driver.summary();

    assert_eq!(summary.steps, 400);
    assert!(
        (0.10..=0.20).contains(&summary.solid_fraction),
        "solid fraction {}",
        summary.solid_fraction
    );
    assert!(state.fraction_solid().iter().all(|v| v.is_finite()));
    assert!(state.concentration().iter().all(|v| v.is_finite()));
    assert!(driver.velocity_history().iter().all(|v| v.is_finite()));
    assert!(summary.time > 0.0);

    // Partitioning leaves solid depleted and liquid enriched.
    assert!(summary.solid_segregation.unwrap() < 1.0);
    assert!(summary.liquid_segregation.unwrap() > 1.0);

    // Four-fold anisotropy: axial arms agree and outgrow the diagonals.
    let axial = axial_arms(state);
    let spread = axial.iter().fold(0.0f64, |m, &a| m.max((a - axial[0]).abs()));
    assert!(spread <= 1.0, "axial arms {axial:?}");
    let diagonal = diagonal_arms(state);
    assert!(
        mean(axial) >= 1.2 * mean(diagonal),
        "axial {axial:?} vs diagonal {diagonal:?}"
    );
}

#[test]
fn isotropic_crystal_has_comparable_radii() {
    let mut cfg = SimulationConfig::default();
    cfg.growth.anisotropy = 0.0;
    let driver = run(cfg);
    let axial = mean(axial_arms(driver.state()));
    let diagonal = mean(diagonal_arms(driver.state()));
    assert!(axial > 0.0 && diagonal > 0.0);
    let rel = (axial - diagonal).abs() / axial.max(diagonal);
    assert!(rel <= 0.25, "axial {axial}, diagonal {diagonal}");
}

#[test]
fn quarter_turn_is_indistinguishable() {
    let mut a = Preset::QuickTest.config();
    a.time.termination = Termination::Steps(120);
    let mut b = a.clone();
    b.nucleation.crystal_angle_deg = 90.0;

    let da = run(a);
    let db = run(b);
    assert_eq!(da.solid_fraction_history(), db.solid_fraction_history());
    assert_eq!(da.state().occupancy(), db.state().occupancy());
    assert_eq!(da.state().fraction_solid(), db.state().fraction_solid());
    assert_eq!(da.state().concentration(), db.state().concentration());
}

#[test]
fn full_anisotropy_runs_and_grows() {
    let mut cfg = Preset::QuickTest.config();
    cfg.growth.anisotropy = 1.0;
    cfg.time.termination = Termination::Steps(60);
    let driver = run(cfg);
    let summary = driver.summary();
    assert_eq!(summary.steps, 60);
    assert!(summary.solid_count > 1);
    assert!(driver.velocity_history().iter().all(|&v| v.is_finite() && v >= 0.0));
    assert!(driver.state().fraction_solid().iter().all(|&fs| (0.0..=1.0).contains(&fs)));
}

// ── Presets ────────────────────────────────────────────────────────

#[test]
fn quick_test_preset_grows_a_crystal() {
    let driver = run(Preset::QuickTest.config());
    let summary = driver.summary();
    assert_eq!(summary.steps, 200);
    assert_eq!(summary.cell_count, 2500);
    assert!(
        (0.05..=0.25).contains(&summary.solid_fraction),
        "solid fraction {}",
        summary.solid_fraction
    );
    assert!(summary.peak_max_velocity >= summary.final_max_velocity);
}

#[test]
fn rotated_crystal_prefers_diagonals() {
    let driver = run(Preset::RotatedCrystal.config());
    let axial = mean(axial_arms(driver.state()));
    let diagonal = mean(diagonal_arms(driver.state()));
    assert!(diagonal > axial, "axial {axial}, diagonal {diagonal}");
}

#[test]
fn larger_undercooling_grows_faster() {
    let mut slow = Preset::QuickTest.config();
    slow.time.termination = Termination::Steps(100);
    let mut fast = slow.clone();
    fast.growth.undercooling = 30.0;

    let s = run(slow).summary();
    let f = run(fast).summary();
    assert!(
        f.solid_count > s.solid_count,
        "U=30: {} cells, U=15: {} cells",
        f.solid_count,
        s.solid_count
    );
}
