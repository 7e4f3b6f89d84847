// Domain layer: step model and the command runner port.

pub mod model;
pub mod ports;
