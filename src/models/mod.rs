//! Entity records for the memory bank.
//!
//! # Hierarchy
//!
//! - [`Intent`]: a feature or capability. Owns ordered [`Unit`]s.
//! - [`Unit`]: a deliverable slice of an intent. Owns ordered [`Story`]s.
//! - [`Story`]: a single requirement with a MoSCoW priority.
//!
//! Intent and unit statuses are either declared in their own records or
//! rolled up from their children (see [`crate::engine::status`]).
//!
//! # Construction
//!
//! - [`Bolt`]: a construction session moving stories through ordered
//!   [`Stage`]s. Bolts depend on each other through `requires_bolts`.
//! - [`ActivityEvent`]: synthetic, rebuilt from bolt timestamps.
//!
//! # Other
//!
//! - [`Standard`]: a project standard document.
//! - [`MemoryBankModel`]: the full result of one scan.

mod activity;
mod bolt;
mod intent;
mod model;
mod standard;
mod status;

pub use activity::*;
pub use bolt::*;
pub use intent::*;
pub use model::*;
pub use standard::*;
pub use status::*;
