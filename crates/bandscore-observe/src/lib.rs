//! Logging and trace export setup for Bandscore.

pub mod tracing_setup;
