//! Stage templates per bolt type.
//!
//! A bolt's `type` selects an ordered list of stage names. Lookup is an exact
//! match on the type tag with a fallback to [`DEFAULT_BOLT_TYPE`]. Projects
//! can ship their own definitions; whoever reads them registers the result in
//! a [`StageTemplateCache`] keyed by workspace and type, and invalidates it
//! when the definition files change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::models::{ArtifactStatus, Stage};

pub const DEFAULT_BOLT_TYPE: &str = "simple-construction-bolt";

/// Stage names that refer to the same step.
const STAGE_ALIASES: &[&[&str]] = &[
    &["model", "domain-model"],
    &["design", "technical-design"],
    &["adr", "adr-analysis"],
    &["implement", "implementation"],
    &["test", "testing"],
    &["plan", "planning"],
];

/// Lookup table from bolt type tag to ordered stage names.
#[derive(Debug, Clone)]
pub struct BoltTypeTemplates {
    templates: HashMap<String, Vec<String>>,
}

impl Default for BoltTypeTemplates {
    fn default() -> Self {
        let mut templates = Self {
            templates: HashMap::new(),
        };
        templates.register(DEFAULT_BOLT_TYPE, ["plan", "implement", "test"]);
        templates.register(
            "ddd-construction-bolt",
            ["model", "design", "adr", "implement", "test"],
        );
        templates.register("spike-bolt", ["explore", "document"]);
        templates
    }
}

impl BoltTypeTemplates {
    /// Add or replace the template for `bolt_type`.
    pub fn register<I, S>(&mut self, bolt_type: &str, stages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates.insert(
            bolt_type.to_string(),
            stages.into_iter().map(Into::into).collect(),
        );
    }

    /// Stage names for `bolt_type`, falling back to the default type.
    pub fn stages_for(&self, bolt_type: &str) -> &[String] {
        if let Some(stages) = self.templates.get(bolt_type) {
            return stages;
        }

        tracing::warn!(bolt_type, "unknown bolt type, using default stages");
        self.templates
            .get(DEFAULT_BOLT_TYPE)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, bolt_type: &str) -> bool {
        self.templates.contains_key(bolt_type)
    }
}

/// Stage templates loaded from project definition files.
///
/// `None` entries record that a definition was looked up and not found, so
/// the caller does not retry on every scan.
#[derive(Debug, Default)]
pub struct StageTemplateCache {
    entries: HashMap<(PathBuf, String), Option<Vec<String>>>,
}

impl StageTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached template, loading it with `load` on a miss.
    pub fn get_or_load<F>(
        &mut self,
        workspace: &Path,
        bolt_type: &str,
        load: F,
    ) -> Option<&[String]>
    where
        F: FnOnce() -> Option<Vec<String>>,
    {
        self.entries
            .entry((workspace.to_path_buf(), bolt_type.to_string()))
            .or_insert_with(load)
            .as_deref()
    }

    /// Stages for `bolt_type` in `workspace`, preferring a cached project
    /// definition over the built-in table.
    pub fn resolve<'a>(
        &'a self,
        templates: &'a BoltTypeTemplates,
        workspace: &Path,
        bolt_type: &str,
    ) -> &'a [String] {
        self.entries
            .get(&(workspace.to_path_buf(), bolt_type.to_string()))
            .and_then(|entry| entry.as_deref())
            .unwrap_or_else(|| templates.stages_for(bolt_type))
    }

    /// Drop every cached template.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    /// Drop cached templates for one workspace.
    pub fn invalidate_workspace(&mut self, workspace: &Path) {
        self.entries.retain(|(path, _), _| path != workspace);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether `actual` (as written in a bolt record) names the template stage
/// `template`.
///
/// Case, `_` and spaces are ignored, known aliases match each other, and a
/// qualified name like `domain-model` matches `model`.
pub fn stage_matches(template: &str, actual: &str) -> bool {
    let template = normalize_stage_name(template);
    let actual = normalize_stage_name(actual);

    if template == actual {
        return true;
    }

    let aliased = STAGE_ALIASES.iter().any(|group| {
        group.contains(&template.as_str()) && group.contains(&actual.as_str())
    });

    aliased || actual.ends_with(&format!("-{}", template))
}

fn normalize_stage_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['_', ' '], "-")
}

/// A completed stage as written in a bolt record.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedStage {
    pub name: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub artifact: Option<String>,
}

/// Lay out a bolt's stages from its template.
///
/// A template stage is `Complete` when some completed entry matches it,
/// `InProgress` when it matches `current_stage`, `Draft` otherwise.
pub fn build_stages(
    template: &[String],
    completed: &[CompletedStage],
    current_stage: Option<&str>,
) -> Vec<Stage> {
    template
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let done = completed.iter().find(|c| stage_matches(name, &c.name));
            let is_current = current_stage.is_some_and(|current| stage_matches(name, current));

            let status = match (done, is_current) {
                (Some(_), _) => ArtifactStatus::Complete,
                (None, true) => ArtifactStatus::InProgress,
                (None, false) => ArtifactStatus::Draft,
            };

            Stage {
                name: name.clone(),
                order: index as u32 + 1,
                status,
                completed_at: done.and_then(|c| c.completed_at),
                artifact: done.and_then(|c| c.artifact.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_then_default() {
        let templates = BoltTypeTemplates::default();
        assert_eq!(templates.stages_for("spike-bolt"), ["explore", "document"]);
        assert_eq!(
            templates.stages_for("no-such-bolt"),
            ["plan", "implement", "test"]
        );
    }

    #[test]
    fn test_registered_template_replaces_builtin() {
        let mut templates = BoltTypeTemplates::default();
        templates.register("spike-bolt", ["explore"]);
        assert_eq!(templates.stages_for("spike-bolt"), ["explore"]);
    }

    #[test]
    fn test_stage_matching() {
        assert!(stage_matches("model", "Domain Model"));
        assert!(stage_matches("implement", "implementation"));
        assert!(stage_matches("adr", "adr_analysis"));
        assert!(stage_matches("test", "TEST"));
        assert!(!stage_matches("plan", "implement"));
    }

    #[test]
    fn test_alias_groups() {
        assert!(stage_matches("test", "testing"));
        assert!(stage_matches("plan", "planning"));
        assert!(stage_matches("design", "technical-design"));
        assert!(!stage_matches("test", "tests"));
    }

    #[test]
    fn test_cache_invalidation() {
        let mut cache = StageTemplateCache::new();
        let templates = BoltTypeTemplates::default();
        let workspace = Path::new("/work/a");

        let loaded = cache.get_or_load(workspace, "custom-bolt", || {
            Some(vec!["draft".to_string(), "review".to_string()])
        });
        assert_eq!(loaded, Some(&["draft".to_string(), "review".to_string()][..]));

        // A second lookup never calls the loader.
        let cached = cache.get_or_load(workspace, "custom-bolt", || panic!("reloaded"));
        assert!(cached.is_some());
        assert_eq!(cache.resolve(&templates, workspace, "custom-bolt"), ["draft", "review"]);

        cache.get_or_load(Path::new("/work/b"), "custom-bolt", || None);
        cache.invalidate_workspace(workspace);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.resolve(&templates, workspace, "custom-bolt"),
            ["plan", "implement", "test"]
        );

        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_build_stages() {
        let templates = BoltTypeTemplates::default();
        let completed = vec![CompletedStage {
            name: "domain-model".to_string(),
            completed_at: None,
            artifact: Some("model.md".to_string()),
        }];

        let stages = build_stages(
            templates.stages_for("ddd-construction-bolt"),
            &completed,
            Some("design"),
        );

        assert_eq!(stages.len(), 5);
        assert_eq!(stages[0].status, ArtifactStatus::Complete);
        assert_eq!(stages[0].artifact.as_deref(), Some("model.md"));
        assert_eq!(stages[1].status, ArtifactStatus::InProgress);
        assert_eq!(stages[2].status, ArtifactStatus::Draft);
        assert_eq!(stages[4].order, 5);
    }
}
