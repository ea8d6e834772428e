// Domain layer: core models, value normalization and ports (interfaces).

pub mod model;
pub mod normalize;
pub mod ports;
