//! Pure computations over entity records.
//!
//! Nothing in this module holds state or performs I/O. The
//! [`crate::state::StateStore`] calls into these functions on every
//! recompute; they are also usable directly.

pub mod activity;
pub mod bolt_types;
pub mod dependencies;
pub mod status;
