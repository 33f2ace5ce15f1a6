//! Named scenario presets.

use std::fmt;

use crate::config::{DomainConfig, SimulationConfig, Termination};

/// A named variation on the reference scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// 50x50 grid, 200 steps.
    QuickTest,
    /// 150x150 grid of 0.1 µm cells, 600 steps.
    HighResolution,
    /// 30 K undercooling, 300 steps.
    FastGrowth,
    /// Crystal axes rotated by 45°.
    RotatedCrystal,
    /// Anisotropy strength 0.5.
    StrongAnisotropy,
}

impl Preset {
    /// Every preset, in declaration order.
    pub const ALL: [Preset; 5] = [
        Preset::QuickTest,
        Preset::HighResolution,
        Preset::FastGrowth,
        Preset::RotatedCrystal,
        Preset::StrongAnisotropy,
    ];

    /// Snake-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::QuickTest => "quick_test",
            Self::HighResolution => "high_resolution",
            Self::FastGrowth => "fast_growth",
            Self::RotatedCrystal => "rotated_crystal",
            Self::StrongAnisotropy => "strong_anisotropy",
        }
    }

    /// Look a preset up by [`name()`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The preset's configuration.
    pub fn config(self) -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        match self {
            Self::QuickTest => {
                cfg.domain.sizex = 50;
                cfg.domain.sizey = 50;
                cfg.time.termination = Termination::Steps(200);
            }
            Self::HighResolution => {
                cfg.domain = DomainConfig {
                    sizex: 150,
                    sizey: 150,
                    cell_size: 0.1e-6,
                };
                // Diffusion bound at 0.1 µm is about 8.3e-7 s.
                cfg.time.initial_dt = 1e-7;
                cfg.time.termination = Termination::Steps(600);
            }
            Self::FastGrowth => {
                cfg.growth.undercooling = 30.0;
                cfg.time.termination = Termination::Steps(300);
            }
            Self::RotatedCrystal => {
                cfg.nucleation.crystal_angle_deg = 45.0;
            }
            Self::StrongAnisotropy => {
                cfg.growth.anisotropy = 0.5;
            }
        }
        cfg
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
