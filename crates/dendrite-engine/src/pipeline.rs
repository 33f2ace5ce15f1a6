//! The standard five-stage solidification pipeline.

use dendrite_propagator::Propagator;
use dendrite_propagators::{
    GeometricFactor, GrowthKinetics, InterfaceClassifier, NormalEstimator, SoluteTransport,
};

use crate::config::{ConfigError, SimulationConfig};

/// Build classify → geometry → normal → kinetics → transport from
/// `config`.
pub fn standard_pipeline(config: &SimulationConfig) -> Result<Vec<Box<dyn Propagator>>, ConfigError> {
    let lc = config.domain.cell_size;
    let m = &config.material;
    let g = &config.growth;

    let geometry = GeometricFactor::new(lc, g.geometric_factor)
        .map_err(|reason| ConfigError::InvalidPropagator { reason })?;
    let kinetics = GrowthKinetics::builder()
        .cell_size(lc)
        .undercooling(g.undercooling)
        .anisotropy(g.anisotropy)
        .gibbs_thomson(m.gibbs_thomson)
        .kinetic_coefficient(m.kinetic_coefficient)
        .liquidus_slope(m.liquidus_slope)
        .nominal_concentration(m.nominal_concentration)
        .partition_coefficient(m.partition_coefficient)
        .build()
        .map_err(|reason| ConfigError::InvalidPropagator { reason })?;
    let transport = SoluteTransport::builder()
        .cell_size(lc)
        .diffusivity_liquid(m.diffusivity_liquid)
        .diffusivity_solid(m.diffusivity_solid)
        .build()
        .map_err(|reason| ConfigError::InvalidPropagator { reason })?;

    Ok(vec![
        Box::new(InterfaceClassifier),
        Box::new(geometry),
        Box::new(NormalEstimator),
        Box::new(kinetics),
        Box::new(transport),
    ])
}
