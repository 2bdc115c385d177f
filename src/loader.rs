//! Records hand-off from the memory-bank parser.
//!
//! The parser that walks the memory-bank folders and reads frontmatter lives
//! outside this crate. It writes what it found as a JSON records file: raw
//! status strings, stage completion lists and timestamps, exactly as the
//! artifacts declare them. This module turns those records into entity
//! records, applying status normalization, the status roll-up and bolt type
//! stage templates.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::bolt_types::{
    build_stages, BoltTypeTemplates, CompletedStage, StageTemplateCache, DEFAULT_BOLT_TYPE,
};
use crate::error::LoadError;
use crate::models::*;

/// Raw scan output, as written by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryBankRecords {
    #[serde(default)]
    pub intents: Vec<IntentRecord>,
    #[serde(default)]
    pub bolts: Vec<BoltRecord>,
    #[serde(default)]
    pub standards: Vec<Standard>,
    #[serde(default)]
    pub is_project: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentRecord {
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// Status from the intent's requirements frontmatter, if any.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// Status from the unit brief frontmatter, if any.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoltRecord {
    pub id: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub intent: String,
    #[serde(rename = "type", default)]
    pub bolt_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_stage: Option<String>,
    #[serde(default)]
    pub stages_completed: Vec<StageCompletionRecord>,
    #[serde(default)]
    pub stories: Vec<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requires_bolts: Vec<String>,
    #[serde(default)]
    pub enables_bolts: Vec<String>,
}

/// A `stages_completed` entry: either a bare stage name or a detailed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageCompletionRecord {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        completed: Option<DateTime<Utc>>,
        #[serde(default)]
        artifact: Option<String>,
    },
}

impl StageCompletionRecord {
    fn into_completed_stage(self) -> Option<CompletedStage> {
        let stage = match self {
            Self::Name(name) => CompletedStage {
                name,
                completed_at: None,
                artifact: None,
            },
            Self::Detailed {
                name,
                completed,
                artifact,
            } => CompletedStage {
                name,
                completed_at: completed,
                artifact,
            },
        };
        (!stage.name.trim().is_empty()).then_some(stage)
    }
}

/// Read a records file from disk.
pub fn read_records(path: &Path) -> Result<MemoryBankRecords, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert records using the built-in bolt type templates.
pub fn into_model(records: MemoryBankRecords) -> MemoryBankModel {
    ModelBuilder::new(&BoltTypeTemplates::default()).build(records)
}

/// Converts raw records into a [`MemoryBankModel`].
pub struct ModelBuilder<'a> {
    templates: &'a BoltTypeTemplates,
    project_templates: Option<(&'a StageTemplateCache, &'a Path)>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(templates: &'a BoltTypeTemplates) -> Self {
        Self {
            templates,
            project_templates: None,
        }
    }

    /// Prefer project-defined stage templates cached for `workspace`.
    pub fn with_project_templates(
        mut self,
        cache: &'a StageTemplateCache,
        workspace: &'a Path,
    ) -> Self {
        self.project_templates = Some((cache, workspace));
        self
    }

    pub fn build(&self, records: MemoryBankRecords) -> MemoryBankModel {
        if !records.is_project {
            return MemoryBankModel::default();
        }

        let mut intents: Vec<Intent> = records.intents.into_iter().map(build_intent).collect();
        intents.sort_by(|a, b| a.number.cmp(&b.number));

        let mut bolts: Vec<Bolt> = records
            .bolts
            .into_iter()
            .map(|record| self.build_bolt(record))
            .collect();
        bolts.sort_by(|a, b| {
            let a_active = a.status == ArtifactStatus::InProgress;
            let b_active = b.status == ArtifactStatus::InProgress;
            b_active.cmp(&a_active).then_with(|| a.id.cmp(&b.id))
        });

        tracing::debug!(
            intents = intents.len(),
            bolts = bolts.len(),
            standards = records.standards.len(),
            "built memory bank model"
        );

        MemoryBankModel {
            intents,
            bolts,
            standards: records.standards,
            is_project: true,
        }
    }

    fn stage_template(&self, bolt_type: &str) -> &'a [String] {
        match self.project_templates {
            Some((cache, workspace)) => cache.resolve(self.templates, workspace, bolt_type),
            None => self.templates.stages_for(bolt_type),
        }
    }

    fn build_bolt(&self, record: BoltRecord) -> Bolt {
        let bolt_type = record
            .bolt_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BOLT_TYPE.to_string());

        let completed: Vec<CompletedStage> = record
            .stages_completed
            .into_iter()
            .filter_map(StageCompletionRecord::into_completed_stage)
            .collect();

        let stages = build_stages(
            self.stage_template(&bolt_type),
            &completed,
            record.current_stage.as_deref(),
        );

        Bolt {
            id: record.id,
            unit: record.unit,
            intent: record.intent,
            bolt_type,
            status: ArtifactStatus::normalize(record.status.as_deref()),
            current_stage: record.current_stage,
            stages,
            stages_completed: completed.into_iter().map(|c| c.name).collect(),
            stories: record.stories,
            path: record.path,
            created_at: record.created,
            started_at: record.started,
            completed_at: record.completed,
            requires_bolts: record.requires_bolts,
            enables_bolts: record.enables_bolts,
            ..Default::default()
        }
    }
}

fn build_intent(record: IntentRecord) -> Intent {
    let intent_name = format!("{}-{}", record.number, record.name);

    let units = record
        .units
        .into_iter()
        .map(|unit| build_unit(unit, &intent_name))
        .collect();

    Intent::build(CreateIntentInput {
        number: record.number,
        name: record.name,
        path: record.path,
        declared_status: declared_status(record.status.as_deref()),
        units,
    })
}

fn build_unit(record: UnitRecord, intent_name: &str) -> Unit {
    let stories = record
        .stories
        .into_iter()
        .map(|story| Story {
            id: story.id,
            title: story.title,
            unit_name: record.name.clone(),
            intent_name: intent_name.to_string(),
            path: story.path,
            status: ArtifactStatus::normalize(story.status.as_deref()),
            priority: story
                .priority
                .as_deref()
                .and_then(StoryPriority::from_str)
                .unwrap_or_default(),
        })
        .collect();

    Unit::build(CreateUnitInput {
        name: record.name,
        intent_name: intent_name.to_string(),
        path: record.path,
        declared_status: declared_status(record.status.as_deref()),
        stories,
    })
}

/// A status written in the record itself. Blank values count as absent so
/// the roll-up applies.
fn declared_status(raw: Option<&str>) -> Option<ArtifactStatus> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| ArtifactStatus::normalize(Some(s)))
}
