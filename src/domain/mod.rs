// Domain layer: lottery records, run outcomes and the ports the pipeline talks to.

pub mod model;
pub mod ports;
pub mod report;
