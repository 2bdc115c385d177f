//! Plain-text tree rendering for the intent → unit → story hierarchy.

use crate::models::{ArtifactStatus, Intent, Story, Unit};

const DRAFT: char = '○';
const IN_PROGRESS: char = '◐';
const COMPLETE: char = '●';
const BLOCKED: char = '✗';
const UNKNOWN: char = '◇';

/// Get the status symbol for an artifact.
pub fn status_symbol(status: ArtifactStatus) -> char {
    match status {
        ArtifactStatus::Draft => DRAFT,
        ArtifactStatus::InProgress => IN_PROGRESS,
        ArtifactStatus::Complete => COMPLETE,
        ArtifactStatus::Blocked => BLOCKED,
        ArtifactStatus::Unknown => UNKNOWN,
    }
}

struct Node {
    symbol: char,
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn from_intent(intent: &Intent) -> Self {
        Self {
            symbol: status_symbol(intent.status),
            label: intent.key(),
            children: intent.units.iter().map(Self::from_unit).collect(),
        }
    }

    fn from_unit(unit: &Unit) -> Self {
        let done = unit.stories.iter().filter(|s| s.status.is_complete()).count();
        Self {
            symbol: status_symbol(unit.status),
            label: format!("{} ({}/{})", unit.name, done, unit.stories.len()),
            children: unit.stories.iter().map(Self::from_story).collect(),
        }
    }

    fn from_story(story: &Story) -> Self {
        Self {
            symbol: status_symbol(story.status),
            label: format!("{} {} [{}]", story.id, story.title, story.priority.as_str()),
            children: Vec::new(),
        }
    }
}

/// Render intents as a tree with status symbols.
///
/// Example output:
/// ```text
/// ◐ 001-user-auth
/// ├── ● login (2/2)
/// │   ├── ● 001 Password login [must]
/// │   └── ● 002 Remember me [could]
/// └── ○ oauth (0/1)
///     └── ○ 001 Google provider [should]
/// ```
pub fn render_tree(intents: &[Intent]) -> String {
    let mut output = String::new();
    for intent in intents {
        render_node(&mut output, &Node::from_intent(intent), "", true, true);
    }
    output
}

fn render_node(output: &mut String, node: &Node, prefix: &str, is_last: bool, is_root: bool) {
    if !is_root {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
    }
    output.push(node.symbol);
    output.push(' ');
    output.push_str(&node.label);
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}
