//! Reactive state store for the dashboard.
//!
//! [`StateStore`] is the only stateful component. It indexes entity records,
//! keeps bolt dependency fields resolved, holds the derived
//! [`ComputedState`], and tells subscribers which top-level keys changed
//! after every mutation.
//!
//! # Recompute modes
//!
//! With `auto_recompute` on (the default) every entity mutation runs
//! dirty → recompute → publish before returning. With it off, mutations only
//! mark the store dirty and publish the entity paths; the caller batches
//! updates and then calls [`StateStore::recompute`] once.
//!
//! The store is single-threaded: it is neither `Send` nor `Sync`, and
//! callers with several producers must serialize their calls.

mod listeners;
mod selectors;
mod snapshot;
mod types;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Utc};

pub use listeners::{StateListener, Subscription};
pub use selectors::*;
pub use snapshot::*;
pub use types::*;

use crate::engine::dependencies::compute_bolt_dependencies;
use crate::models::*;
use listeners::ListenerRegistry;

/// Store behaviour knobs.
#[derive(Clone, Copy)]
pub struct StoreOptions {
    /// Recompute derived state after every entity mutation.
    pub auto_recompute: bool,
    pub compute: ComputeConfig,
    pub limits: SnapshotLimits,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            auto_recompute: true,
            compute: ComputeConfig::default(),
            limits: SnapshotLimits::default(),
        }
    }
}

pub struct StateStore {
    state: BoardState,
    options: StoreOptions,
    dirty: bool,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl StateStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            state: BoardState::default(),
            options,
            dirty: false,
            listeners: ListenerRegistry::shared(),
        }
    }

    /// Create a store already loaded with `model`.
    pub fn from_model(model: MemoryBankModel, workspace_path: &str, options: StoreOptions) -> Self {
        let mut store = Self::new(options);
        store.load_from_model(model, workspace_path);
        store
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Whether entities changed since the last recompute.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ============================================================
    // Writers
    // ============================================================

    pub fn set_workspace(&mut self, workspace: WorkspaceContext) {
        self.state.workspace = workspace;
        self.publish(&[StatePath::Workspace]);
    }

    /// Replace the given entity collections wholesale.
    ///
    /// Bolts are stored with their dependency fields resolved against the
    /// new collection.
    pub fn set_entities(&mut self, input: SetEntitiesInput) {
        let mut changed = Vec::new();

        if let Some(intents) = input.intents {
            self.state.replace_intents(intents);
            changed.push(StatePath::Intents);
        }
        if let Some(units) = input.units {
            self.state.units = index_units(units);
            changed.push(StatePath::Units);
        }
        if let Some(stories) = input.stories {
            self.state.stories = index_stories(stories);
            changed.push(StatePath::Stories);
        }
        if let Some(bolts) = input.bolts {
            self.state.bolts = index_bolts(compute_bolt_dependencies(&bolts));
            changed.push(StatePath::Bolts);
        }
        if let Some(standards) = input.standards {
            self.state.standards = index_standards(standards);
            changed.push(StatePath::Standards);
        }

        if changed.is_empty() {
            return;
        }
        self.entities_changed(changed);
    }

    /// Insert or replace one bolt, then re-resolve dependencies for the
    /// whole collection since other bolts' blocking facts may depend on it.
    pub fn update_bolt(&mut self, bolt: Bolt) {
        self.state.bolts.insert(bolt.id.clone(), bolt);

        let bolts: Vec<Bolt> = self.state.bolts.values().cloned().collect();
        self.state.bolts = index_bolts(compute_bolt_dependencies(&bolts));

        self.entities_changed(vec![StatePath::Bolts]);
    }

    pub fn set_ui_state(&mut self, input: UpdateUiStateInput) {
        self.state.ui.apply(input);
        self.publish(&[StatePath::Ui]);
    }

    /// Replace everything with the result of a full scan.
    ///
    /// Units and stories are pulled out of their intents into their own
    /// indices. The workspace name is the last component of
    /// `workspace_path`.
    pub fn load_from_model(&mut self, model: MemoryBankModel, workspace_path: &str) {
        let path = Path::new(workspace_path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.state.workspace = WorkspaceContext {
            name,
            path: workspace_path.to_string(),
            memory_bank_path: path.join("memory-bank").to_string_lossy().into_owned(),
            is_project: model.is_project,
        };

        let units: Vec<Unit> = model
            .intents
            .iter()
            .flat_map(|intent| intent.units.iter().cloned())
            .collect();
        let stories: Vec<Story> = units
            .iter()
            .flat_map(|unit| unit.stories.iter().cloned())
            .collect();

        self.state.replace_intents(model.intents);
        self.state.units = index_units(units);
        self.state.stories = index_stories(stories);
        self.state.bolts = index_bolts(compute_bolt_dependencies(&model.bolts));
        self.state.standards = index_standards(model.standards);

        tracing::debug!(
            workspace = %self.state.workspace.path,
            intents = self.state.intents.len(),
            bolts = self.state.bolts.len(),
            "loaded memory bank model"
        );

        self.entities_changed(vec![
            StatePath::Workspace,
            StatePath::Intents,
            StatePath::Units,
            StatePath::Stories,
            StatePath::Bolts,
            StatePath::Standards,
        ]);
    }

    /// Rebuild the computed state from the current indices and publish it.
    pub fn recompute(&mut self) {
        self.rebuild_computed();
        self.publish(&[StatePath::Computed]);
    }

    /// Recompute only if entities changed since the last recompute.
    ///
    /// Lets a one-shot reader get current derived state whatever the
    /// store's `auto_recompute` setting.
    pub fn recompute_if_dirty(&mut self) {
        if self.dirty {
            self.recompute();
        }
    }

    /// Drop all listeners and reset to an empty state.
    pub fn dispose(&mut self) {
        self.listeners.borrow_mut().clear();
        self.state = BoardState::default();
        self.dirty = false;
    }

    fn entities_changed(&mut self, mut changed: Vec<StatePath>) {
        self.dirty = true;
        if self.options.auto_recompute {
            self.rebuild_computed();
            changed.push(StatePath::Computed);
        }
        self.publish(&changed);
    }

    fn rebuild_computed(&mut self) {
        let intents: Vec<Intent> = self.state.ordered_intents().cloned().collect();
        let units: Vec<Unit> = self.state.units.values().cloned().collect();
        let stories: Vec<Story> = self.state.stories.values().cloned().collect();
        let bolts: Vec<Bolt> = self.state.bolts.values().cloned().collect();

        let computed = compute_state(&intents, &units, &stories, &bolts, &self.options.compute);

        tracing::debug!(
            active = computed.bolt_stats.active,
            queued = computed.bolt_stats.queued,
            blocked = computed.bolt_stats.blocked,
            done = computed.bolt_stats.done,
            events = computed.activity_feed.len(),
            "recomputed dashboard state"
        );

        self.state.computed = computed;
        self.dirty = false;
    }

    fn publish(&self, changed: &[StatePath]) {
        let event = StateChangeEvent {
            state: &self.state,
            changed_paths: changed,
        };
        listeners::notify(&self.listeners, &event);
    }

    // ============================================================
    // Readers
    // ============================================================

    /// The full state. Mutation goes through the store's writers only.
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn current_intent(&self) -> Option<&Intent> {
        self.state.computed.current_intent.as_ref()
    }

    pub fn current_intent_context(&self) -> IntentContext {
        self.state.computed.current_intent_context
    }

    pub fn active_bolts(&self) -> &[Bolt] {
        &self.state.computed.active_bolts
    }

    pub fn pending_bolts(&self) -> &[Bolt] {
        &self.state.computed.pending_bolts
    }

    pub fn completed_bolts(&self) -> &[Bolt] {
        &self.state.computed.completed_bolts
    }

    pub fn activity_feed(&self, filter: ActivityFilter) -> Vec<ActivityEvent> {
        crate::engine::activity::filter_activity_events(&self.state.computed.activity_feed, filter)
    }

    pub fn bolt_stats(&self) -> BoltStats {
        self.state.computed.bolt_stats
    }

    pub fn progress_metrics(&self) -> ProgressMetrics {
        self.state.computed.overall_progress
    }

    pub fn next_actions(&self) -> &[NextAction] {
        &self.state.computed.next_actions
    }

    pub fn top_next_action(&self) -> Option<&NextAction> {
        self.state.computed.next_actions.first()
    }

    pub fn webview_snapshot(&self) -> WebviewSnapshot {
        self.webview_snapshot_at(Utc::now())
    }

    /// Snapshot with relative times measured from `now`.
    pub fn webview_snapshot_at(&self, now: DateTime<Utc>) -> WebviewSnapshot {
        build_webview_snapshot(&self.state, self.options.limits, now)
    }

    // ============================================================
    // Subscriptions
    // ============================================================

    /// Register a listener called synchronously after every mutating call.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&StateChangeEvent<'_>) + 'static,
    {
        listeners::subscribe(&self.listeners, Box::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}
