//! Port traits decoupling the domain from I/O.

pub mod config_port;
pub mod history_port;
pub mod reference_port;
