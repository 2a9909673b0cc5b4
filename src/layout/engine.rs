use indexmap::IndexMap;
use serde::Serialize;

use super::host::RenderHost;
use super::policy::{self, FoldConversion};
use super::position::{self, StackLayout};
use super::reorganize::{self, Reorganization};
use super::scheduler::{Clock, LayoutScope, SystemClock, UpdateScheduler};
use super::scroll::{AnchorTransition, ScrollAnchors};
use super::transaction::{PendingRestore, with_preserved_layout};
use super::warning::LayoutWarning;
use crate::model::board::{Board, STACK_TAG};
use crate::model::config::{LayoutConfig, StickyMode};
use crate::model::fold::{ColumnFold, FoldSnapshot, FoldStateStore, GlobalFoldState, TaskFoldState};
use crate::model::stack::{StackId, StackMembership};

/// Outcome of one layout pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutReport {
    /// Stacks laid out and applied this pass
    pub layouts: Vec<StackLayout>,
    /// Policy corrections made before computing
    pub conversions: Vec<FoldConversion>,
    pub warnings: Vec<LayoutWarning>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// What happened at one frame boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    /// Scopes whose scroll positions were restored this frame
    pub restored: Vec<LayoutScope>,
    pub transitions: Vec<AnchorTransition>,
}

/// Owns the board, fold state and stack membership, and wires the fold
/// operations through the policy, scheduler, transactions and anchors.
///
/// Suspension points are explicit calls: `tick` for the debounce timer and
/// `on_animation_frame` for frame boundaries.
pub struct LayoutEngine<C: Clock = SystemClock> {
    config: LayoutConfig,
    board: Board,
    store: FoldStateStore,
    membership: StackMembership,
    scheduler: UpdateScheduler<C>,
    anchors: ScrollAnchors,
    /// At most one; later passes fold into it until it restores
    pending: Option<PendingRestore>,
    layouts: IndexMap<StackId, StackLayout>,
    last_scroll: Option<f64>,
}

impl LayoutEngine<SystemClock> {
    pub fn new(board: Board, config: LayoutConfig) -> Self {
        Self::with_clock(board, config, SystemClock)
    }
}

impl<C: Clock> LayoutEngine<C> {
    pub fn with_clock(board: Board, config: LayoutConfig, clock: C) -> Self {
        let membership = StackMembership::derive(&board);
        let scheduler = UpdateScheduler::new(clock, config.debounce());
        LayoutEngine {
            config,
            board,
            store: FoldStateStore::new(),
            membership,
            scheduler,
            anchors: ScrollAnchors::new(),
            pending: None,
            layouts: IndexMap::new(),
            last_scroll: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn store(&self) -> &FoldStateStore {
        &self.store
    }

    pub fn membership(&self) -> &StackMembership {
        &self.membership
    }

    pub fn scheduler(&self) -> &UpdateScheduler<C> {
        &self.scheduler
    }

    pub fn anchors(&self) -> &ScrollAnchors {
        &self.anchors
    }

    /// Last successful layout of every stack
    pub fn layouts(&self) -> impl Iterator<Item = &StackLayout> {
        self.layouts.values()
    }

    pub fn layout(&self, stack: &StackId) -> Option<&StackLayout> {
        self.layouts.get(stack)
    }

    /// Transactions still waiting on frame boundaries
    pub fn pending_restores(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    pub fn sticky_mode(&self) -> StickyMode {
        self.config.sticky_mode
    }

    pub fn set_sticky_mode(&mut self, mode: StickyMode) {
        if self.config.sticky_mode != mode {
            self.config.sticky_mode = mode;
            self.schedule_layout(LayoutScope::All);
        }
    }

    // -----------------------------------------------------------------------
    // Board and persisted state
    // -----------------------------------------------------------------------

    /// Swap in a freshly rendered board: stacks are derived again and the
    /// policy runs over all of them. Call `layout_now(All)` afterwards.
    pub fn replace_board(&mut self, board: Board) -> Vec<FoldConversion> {
        self.board = board;
        self.membership = StackMembership::derive(&self.board);
        let live = self.membership.ids();
        self.layouts.retain(|id, _| live.contains(id));
        self.anchors = ScrollAnchors::new();
        self.enforce_all()
    }

    pub fn fold_snapshot(&self) -> FoldSnapshot {
        self.store.snapshot()
    }

    /// Restore persisted fold state; runs before the first layout pass
    pub fn restore_fold_snapshot(&mut self, snapshot: &FoldSnapshot) -> Vec<FoldConversion> {
        self.store = FoldStateStore::from_snapshot(snapshot);
        self.anchors = ScrollAnchors::new();
        self.enforce_all()
    }

    fn enforce_all(&mut self) -> Vec<FoldConversion> {
        let mut conversions = Vec::new();
        for stack in &self.membership.stacks {
            conversions.extend(policy::enforce(&mut self.store, stack));
        }
        conversions
    }

    // -----------------------------------------------------------------------
    // Fold operations
    // -----------------------------------------------------------------------

    /// Fold or unfold a column. A fold uses the policy's orientation; `alt`
    /// picks the other orientation when the column is alone in its stack.
    pub fn toggle_column_fold(&mut self, column_id: &str, alt: bool) -> Result<ColumnFold, LayoutWarning> {
        if self.board.column(column_id).is_none() {
            return Err(LayoutWarning::MissingColumn {
                column: column_id.to_string(),
            }
            .logged());
        }

        let size = self.membership.stack_size(column_id).max(1);
        if self.store.is_collapsed(column_id) {
            self.store.expand(column_id);
        } else {
            let mut orientation = policy::decide_orientation(&self.store, column_id, size);
            if alt && size <= 1 {
                orientation = orientation.flipped();
            }
            self.store.collapse(column_id, orientation);
        }

        self.after_column_change(column_id);
        self.store.set_global(self.global_fold_state());
        Ok(self.store.column(column_id))
    }

    /// Aggregate fold state over columns that have tasks (all columns when
    /// none do)
    pub fn global_fold_state(&self) -> GlobalFoldState {
        let with_tasks: Vec<&str> = self
            .board
            .columns
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.id.as_str())
            .collect();
        let considered: Vec<&str> = if with_tasks.is_empty() {
            self.board.column_ids().collect()
        } else {
            with_tasks
        };

        let collapsed = considered
            .iter()
            .filter(|id| self.store.is_collapsed(id))
            .count();
        if considered.is_empty() || collapsed == 0 {
            GlobalFoldState::AllExpanded
        } else if collapsed == considered.len() {
            GlobalFoldState::AllCollapsed
        } else {
            GlobalFoldState::Mixed
        }
    }

    /// Expand everything if everything is collapsed, otherwise collapse
    /// every column. Returns the resulting global state.
    pub fn toggle_all_columns(&mut self) -> GlobalFoldState {
        let expand = self.global_fold_state() == GlobalFoldState::AllCollapsed;
        for stack in &self.membership.stacks {
            for column_id in &stack.columns {
                if expand {
                    self.store.expand(column_id);
                } else {
                    let orientation = policy::decide_orientation(&self.store, column_id, stack.len());
                    self.store.collapse(column_id, orientation);
                }
            }
        }
        self.enforce_all();
        self.anchors = ScrollAnchors::new();
        self.schedule_layout(LayoutScope::All);

        let state = self.global_fold_state();
        self.store.set_global(state);
        tracing::debug!(?state, "toggled all columns");
        state
    }

    /// Collapse every task in a column, or expand them all if they already
    /// are collapsed
    pub fn toggle_tasks_in_column(&mut self, column_id: &str) -> Result<TaskFoldState, LayoutWarning> {
        let Some(column) = self.board.column(column_id) else {
            return Err(LayoutWarning::MissingColumn {
                column: column_id.to_string(),
            }
            .logged());
        };
        if column.is_empty() {
            return Ok(self
                .store
                .task_fold_state(column_id)
                .unwrap_or(TaskFoldState::Expanded));
        }

        let task_ids: Vec<String> = column.tasks.iter().map(|t| t.id.clone()).collect();
        let collapse = !task_ids
            .iter()
            .all(|t| self.store.is_task_collapsed(column_id, t));
        for task_id in &task_ids {
            self.store.set_task_collapsed(column_id, task_id, collapse);
        }
        let state = if collapse {
            TaskFoldState::Collapsed
        } else {
            TaskFoldState::Expanded
        };
        self.store.set_task_fold_state(column_id, state);
        self.after_column_change(column_id);
        Ok(state)
    }

    /// Flip one task's fold flag. Returns whether it is now collapsed.
    pub fn toggle_task_fold(&mut self, column_id: &str, task_id: &str) -> Result<bool, LayoutWarning> {
        let exists = self
            .board
            .column(column_id)
            .is_some_and(|c| c.tasks.iter().any(|t| t.id == task_id));
        if !exists {
            return Err(LayoutWarning::MissingTask {
                column: column_id.to_string(),
                task: task_id.to_string(),
            }
            .logged());
        }
        let collapsed = !self.store.is_task_collapsed(column_id, task_id);
        self.store.set_task_collapsed(column_id, task_id, collapsed);
        self.after_column_change(column_id);
        Ok(collapsed)
    }

    /// Measurements of the column's stack are stale now: drop its anchors,
    /// correct fold modes and queue a debounced layout of that stack.
    fn after_column_change(&mut self, column_id: &str) {
        let Some(stack) = self.membership.stack_of(column_id) else {
            return;
        };
        self.anchors.invalidate(&stack.columns);
        policy::enforce(&mut self.store, stack);
        let id = stack.id();
        self.schedule_layout(LayoutScope::Stack(id));
    }

    // -----------------------------------------------------------------------
    // Stack restructuring
    // -----------------------------------------------------------------------

    /// Add or remove the stack tag on a column, then reorganize incrementally
    pub fn retag_column<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        column_id: &str,
        stacked: bool,
    ) -> Result<(Reorganization, LayoutReport), LayoutWarning> {
        let Some(column) = self.board.column_mut(column_id) else {
            return Err(LayoutWarning::MissingColumn {
                column: column_id.to_string(),
            }
            .logged());
        };
        column.set_tag(STACK_TAG, stacked);
        self.reorganize_stacks_for_column(host, column_id)
    }

    /// Move a column between stacks after its tag changed, then enforce the
    /// policy and lay out exactly the affected stacks
    pub fn reorganize_stacks_for_column<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        column_id: &str,
    ) -> Result<(Reorganization, LayoutReport), LayoutWarning> {
        let reorganization =
            reorganize::reorganize_for_column(&mut self.membership, &self.board, column_id)
                .map_err(LayoutWarning::logged)?;

        for removed in &reorganization.removed {
            self.layouts.shift_remove(removed);
        }
        for id in &reorganization.affected {
            if let Some(stack) = self.membership.get(id) {
                self.anchors.invalidate(&stack.columns);
            }
        }

        let scope = match reorganization.affected.as_slice() {
            [only] => LayoutScope::Stack(only.clone()),
            _ => LayoutScope::All,
        };
        let report = self.layout_stacks(host, reorganization.affected.clone(), &scope);
        Ok((reorganization, report))
    }

    // -----------------------------------------------------------------------
    // Scheduling and layout passes
    // -----------------------------------------------------------------------

    /// Queue a debounced layout
    pub fn schedule_layout(&mut self, scope: LayoutScope) {
        let pending = self.scheduler.request(scope);
        tracing::trace!(%pending, "layout scheduled");
    }

    /// Run the pending layout if its quiet period has ended
    pub fn tick<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> Option<LayoutReport> {
        let scope = self.scheduler.take_due()?;
        Some(self.layout_now(host, scope))
    }

    /// Run the pending layout now, if any
    pub fn flush<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> Option<LayoutReport> {
        let scope = self.scheduler.flush()?;
        Some(self.layout_now(host, scope))
    }

    /// Lay out `scope` immediately
    pub fn layout_now<H: RenderHost + ?Sized>(&mut self, host: &mut H, scope: LayoutScope) -> LayoutReport {
        let ids = match &scope {
            LayoutScope::All => self.membership.ids(),
            LayoutScope::Stack(id) => vec![id.clone()],
        };
        self.layout_stacks(host, ids, &scope)
    }

    fn layout_stacks<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        ids: Vec<StackId>,
        scope: &LayoutScope,
    ) -> LayoutReport {
        let mut report = LayoutReport::default();
        let mut computed = Vec::with_capacity(ids.len());

        for id in ids {
            let Some(stack) = self.membership.get(&id).cloned() else {
                report
                    .warnings
                    .push(LayoutWarning::UnknownStack { stack: id }.logged());
                continue;
            };
            report
                .conversions
                .extend(policy::enforce(&mut self.store, &stack));

            match position::gather_inputs(&stack, &self.board, &self.store, &*host) {
                Ok((inputs, warnings)) => {
                    report.warnings.extend(warnings);
                    computed.push(position::compute_stack(
                        id,
                        &inputs,
                        self.config.sticky_mode,
                        self.config.z_base,
                    ));
                }
                // The stack keeps its previous layout
                Err(warnings) => report.warnings.extend(warnings),
            }
        }

        tracing::debug!(
            %scope,
            stacks = computed.len(),
            warnings = report.warnings.len(),
            "layout pass"
        );
        if computed.is_empty() {
            return report;
        }

        let settle_frames = self.config.settle_frames;
        let apply = |h: &mut H| {
            for layout in &computed {
                h.apply_stack_layout(layout);
            }
        };
        match self.pending.as_mut() {
            // Offsets captured now would already be shifted by the earlier pass
            Some(pending) => pending.extend(host, scope, settle_frames, apply),
            None => {
                let ((), pending) = with_preserved_layout(host, scope, settle_frames, apply);
                self.pending = Some(pending);
            }
        }

        for layout in &computed {
            self.layouts.insert(layout.stack.clone(), layout.clone());
        }
        report.layouts = computed;
        report
    }

    // -----------------------------------------------------------------------
    // Scroll and frames
    // -----------------------------------------------------------------------

    /// Record a scroll event; handled once per frame
    pub fn on_scroll(&mut self, scroll_top: f64) {
        self.last_scroll = Some(scroll_top);
        self.anchors.note_scroll(scroll_top);
    }

    /// Frame boundary: advance pending restores, read back settled content
    /// boundaries for restored scopes, then process the latest scroll tick.
    pub fn on_animation_frame<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> FrameReport {
        let mut report = FrameReport::default();

        if let Some(mut pending) = self.pending.take() {
            if pending.on_frame(host) {
                report.restored.push(pending.scope().clone());
            } else {
                self.pending = Some(pending);
            }
        }

        if !report.restored.is_empty() {
            for (id, layout) in &self.layouts {
                if report.restored.iter().any(|scope| scope.covers(id)) {
                    self.anchors.capture(layout, &*host);
                }
            }
            if let Some(scroll_top) = self.last_scroll {
                self.anchors.note_scroll(scroll_top);
            }
        }

        report.transitions = self.anchors.on_frame(host);
        report
    }

    /// Whether a debounced layout or a restore is still outstanding
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.pending_scope().is_some() || self.pending.is_some()
    }
}
