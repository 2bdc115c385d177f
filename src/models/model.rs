use serde::{Deserialize, Serialize};

use super::{Bolt, Intent, Standard};

/// Everything one scan of a memory bank produced.
///
/// This is the hand-off from the external parser to
/// [`crate::state::StateStore::load_from_model`]. Units and stories travel
/// nested inside their intents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryBankModel {
    pub intents: Vec<Intent>,
    pub bolts: Vec<Bolt>,
    pub standards: Vec<Standard>,
    /// Whether the scanned folder is a recognized project.
    pub is_project: bool,
}
