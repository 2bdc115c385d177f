use serde::{Deserialize, Serialize};

/// A project standard document. Standards carry no status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standard {
    /// File name without extension.
    pub name: String,
    pub path: String,
}
