// Domain layer: deal/bid models and the store ports the workflow talks to.

pub mod model;
pub mod ports;
