pub mod ensemble;
pub mod path_simulator;
