//! Property tests: physical invariants over full runs.
//!
//! For random small grids, seeds, undercoolings, anisotropies and
//! orientations, every step must keep:
//!
//! - Fs non-decreasing and occupancy never reverting to liquid;
//! - 0 ≤ Fs ≤ 1 and C ≥ 0;
//! - total solute equal to its initial value to 1e-9 relative.

use dendrite_core::Phase;
use dendrite_engine::{SeedSite, SimulationConfig, SimulationDriver, Termination};
use proptest::prelude::*;

fn arb_config() -> impl Strategy<Value = SimulationConfig> {
    (
        9u32..=21,
        9u32..=21,
        any::<u64>(),
        3.0f64..25.0,
        0.0f64..0.6,
        0.0f64..90.0,
        10u64..40,
    )
        .prop_map(|(sx, sy, rng_seed, undercooling, dk, angle, steps)| {
            let mut cfg = SimulationConfig::default();
            cfg.domain.sizex = sx;
            cfg.domain.sizey = sy;
            cfg.nucleation.seed = SeedSite::Random { rng_seed };
            cfg.nucleation.crystal_angle_deg = angle;
            cfg.growth.undercooling = undercooling;
            cfg.growth.anisotropy = dk;
            cfg.time.termination = Termination::Steps(steps);
            cfg
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn every_step_keeps_fields_physical(cfg in arb_config()) {
        let steps = cfg.time.termination.max_steps();
        let mut driver = SimulationDriver::new(cfg).unwrap();
        let initial_solute = driver.state().total_solute();

        for _ in 0..steps {
            let prev_fs = driver.state().fraction_solid().to_vec();
            let prev_occ = driver.state().occupancy().to_vec();
            driver.step().unwrap();
            let state = driver.state();

            for (idx, (&fs, &before)) in state.fraction_solid().iter().zip(&prev_fs).enumerate() {
                prop_assert!(fs >= before, "Fs fell at cell {}: {} -> {}", idx, before, fs);
                prop_assert!((0.0..=1.0).contains(&fs), "Fs {} at cell {}", fs, idx);
            }
            for (idx, (&now, &before)) in state.occupancy().iter().zip(&prev_occ).enumerate() {
                prop_assert!(
                    !(before == Phase::Solid && now == Phase::Liquid),
                    "cell {} melted",
                    idx
                );
            }
            prop_assert!(state.concentration().iter().all(|&c| c >= 0.0));

            let total = state.total_solute();
            prop_assert!(
                (total - initial_solute).abs() <= 1e-9 * initial_solute,
                "solute drifted from {} to {}",
                initial_solute,
                total
            );
        }
    }

    #[test]
    fn solid_cells_are_fully_solid(cfg in arb_config()) {
        let mut driver = SimulationDriver::new(cfg).unwrap();
        driver.run().unwrap();
        let state = driver.state();
        for idx in 0..state.cell_count() {
            if state.is_solid(idx) {
                prop_assert_eq!(state.fraction_solid()[idx], 1.0);
            } else {
                prop_assert!(state.fraction_solid()[idx] < 1.0);
            }
        }
    }
}
