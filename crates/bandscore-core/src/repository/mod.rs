//! Port trait definitions.
//!
//! These traits define the storage interface that bandscore-infra
//! implements. The core crate never touches the filesystem or environment
//! directly.

pub mod criteria;
pub mod secret;
