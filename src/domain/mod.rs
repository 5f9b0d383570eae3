// Domain layer: targets, catalog rows, normalized records and the catalog port.

pub mod model;
pub mod ports;
