use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::model::stack::StackId;

/// What a layout pass covers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutScope {
    All,
    Stack(StackId),
}

impl LayoutScope {
    /// Union of two scopes
    pub fn merge(self, other: LayoutScope) -> LayoutScope {
        match (self, other) {
            (LayoutScope::Stack(a), LayoutScope::Stack(b)) if a == b => LayoutScope::Stack(a),
            _ => LayoutScope::All,
        }
    }

    pub fn covers(&self, stack: &StackId) -> bool {
        match self {
            LayoutScope::All => true,
            LayoutScope::Stack(s) => s == stack,
        }
    }
}

impl fmt::Display for LayoutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutScope::All => write!(f, "all stacks"),
            LayoutScope::Stack(id) => write!(f, "stack {}", id),
        }
    }
}

/// Time source for the debounce window
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Pending { scope: LayoutScope, deadline: Instant },
}

/// Coalesces layout requests behind a quiet period. Requests for different
/// stacks widen the pending scope to all; the scope is consumed once.
#[derive(Debug)]
pub struct UpdateScheduler<C: Clock = SystemClock> {
    clock: C,
    window: Duration,
    state: SchedulerState,
}

impl<C: Clock> UpdateScheduler<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        UpdateScheduler {
            clock,
            window,
            state: SchedulerState::Idle,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn pending_scope(&self) -> Option<&LayoutScope> {
        match &self.state {
            SchedulerState::Idle => None,
            SchedulerState::Pending { scope, .. } => Some(scope),
        }
    }

    /// Queue a layout for `scope` and restart the quiet period.
    /// Returns the scope now pending.
    pub fn request(&mut self, scope: LayoutScope) -> LayoutScope {
        let deadline = self.clock.now() + self.window;
        let merged = match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Idle => scope,
            SchedulerState::Pending { scope: pending, .. } => {
                let merged = pending.clone().merge(scope);
                if merged != pending {
                    tracing::debug!(from = %pending, to = %merged, "pending layout scope widened");
                }
                merged
            }
        };
        self.state = SchedulerState::Pending {
            scope: merged.clone(),
            deadline,
        };
        merged
    }

    pub fn is_due(&self) -> bool {
        match &self.state {
            SchedulerState::Idle => false,
            SchedulerState::Pending { deadline, .. } => self.clock.now() >= *deadline,
        }
    }

    /// Time left before the pending request fires
    pub fn time_until_due(&self) -> Option<Duration> {
        match &self.state {
            SchedulerState::Idle => None,
            SchedulerState::Pending { deadline, .. } => {
                Some(deadline.saturating_duration_since(self.clock.now()))
            }
        }
    }

    /// Consume the pending scope if its quiet period has ended
    pub fn take_due(&mut self) -> Option<LayoutScope> {
        if self.is_due() { self.flush() } else { None }
    }

    /// Consume the pending scope now, whatever the clock says
    pub fn flush(&mut self) -> Option<LayoutScope> {
        match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Idle => None,
            SchedulerState::Pending { scope, .. } => Some(scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(id: &str) -> LayoutScope {
        LayoutScope::Stack(StackId::from(id))
    }

    fn scheduler() -> UpdateScheduler<ManualClock> {
        UpdateScheduler::new(ManualClock::new(), Duration::from_millis(150))
    }

    #[test]
    fn merge_rules() {
        assert_eq!(stack("a").merge(stack("a")), stack("a"));
        assert_eq!(stack("a").merge(stack("b")), LayoutScope::All);
        assert_eq!(LayoutScope::All.merge(stack("a")), LayoutScope::All);
        assert_eq!(stack("a").merge(LayoutScope::All), LayoutScope::All);
    }

    #[test]
    fn different_stacks_upgrade_to_all_and_fire_once() {
        let mut s = scheduler();
        s.request(stack("a"));
        s.clock().advance(Duration::from_millis(50));
        assert_eq!(s.request(stack("b")), LayoutScope::All);
        s.clock().advance(Duration::from_millis(150));
        assert_eq!(s.take_due(), Some(LayoutScope::All));
        assert_eq!(s.take_due(), None);
        assert_eq!(s.state(), &SchedulerState::Idle);
    }

    #[test]
    fn same_stack_is_absorbed() {
        let mut s = scheduler();
        s.request(stack("a"));
        s.request(stack("a"));
        assert_eq!(s.pending_scope(), Some(&stack("a")));
        assert_eq!(s.flush(), Some(stack("a")));
    }

    #[test]
    fn all_absorbs_later_stack_requests() {
        let mut s = scheduler();
        s.request(LayoutScope::All);
        assert_eq!(s.request(stack("a")), LayoutScope::All);
    }

    #[test]
    fn each_request_restarts_the_quiet_period() {
        let mut s = scheduler();
        s.request(stack("a"));
        s.clock().advance(Duration::from_millis(100));
        s.request(stack("a"));
        s.clock().advance(Duration::from_millis(100));
        assert!(!s.is_due());
        assert_eq!(s.time_until_due(), Some(Duration::from_millis(50)));
        s.clock().advance(Duration::from_millis(50));
        assert_eq!(s.take_due(), Some(stack("a")));
    }

    #[test]
    fn idle_flush_is_none() {
        let mut s = scheduler();
        assert_eq!(s.flush(), None);
        assert_eq!(s.time_until_due(), None);
    }
}
