//! At-most-one timed action with a deferred completion effect.
//!
//! An [`ActionScheduler`] holds the single running action, if any. The
//! engine calls [`ActionScheduler::step`] once per action step timer; each
//! step adds the step length to the elapsed time and recomputes
//! `progress = round(elapsed / duration * 100)`. When the elapsed time
//! reaches the duration the action reports 100, clears itself and hands the
//! completion effect back exactly once.
//!
//! A second start while an action runs is rejected rather than queued, and
//! [`ActionScheduler::cancel`] drops the effect without running it.

use runequest_types::{ActionKind, ActiveAction};

/// Progress value of a finished action.
pub const PROGRESS_COMPLETE: u32 = 100;

/// The running action.
#[derive(Debug, Clone)]
struct Running<E> {
    kind: ActionKind,
    duration_ms: u64,
    elapsed_ms: u64,
    progress: u32,
    effect: E,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStep<E> {
    /// No action is running.
    Idle,
    /// The action advanced and is still running.
    Progress(ActiveAction),
    /// The action reached 100 and has been cleared.
    Completed {
        /// The kind of action that finished.
        kind: ActionKind,
        /// The completion effect, handed back once.
        effect: E,
    },
}

/// Holder of the single running action.
#[derive(Debug, Clone)]
pub struct ActionScheduler<E> {
    /// Elapsed time added per step.
    step_ms: u64,
    /// The running action.
    running: Option<Running<E>>,
}

impl<E> ActionScheduler<E> {
    /// An idle scheduler advancing by `step_ms` per step.
    pub const fn new(step_ms: u64) -> Self {
        Self {
            step_ms,
            running: None,
        }
    }

    /// Step length in milliseconds.
    pub const fn step_ms(&self) -> u64 {
        self.step_ms
    }

    /// Whether an action is running.
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The running action as a display record.
    pub fn current(&self) -> Option<ActiveAction> {
        self.running.as_ref().map(|r| ActiveAction {
            kind: r.kind,
            progress: r.progress,
        })
    }

    /// Start an action. Returns `false` and changes nothing if one is
    /// already running.
    pub fn start(&mut self, kind: ActionKind, duration_ms: u64, effect: E) -> bool {
        if self.running.is_some() {
            return false;
        }
        self.running = Some(Running {
            kind,
            duration_ms,
            elapsed_ms: 0,
            progress: 0,
            effect,
        });
        true
    }

    /// Advance the running action by one step.
    pub fn step(&mut self) -> ActionStep<E> {
        let Some(running) = self.running.as_mut() else {
            return ActionStep::Idle;
        };
        running.elapsed_ms = running.elapsed_ms.saturating_add(self.step_ms);

        if running.elapsed_ms >= running.duration_ms {
            running.progress = PROGRESS_COMPLETE;
            return match self.running.take() {
                Some(done) => ActionStep::Completed {
                    kind: done.kind,
                    effect: done.effect,
                },
                None => ActionStep::Idle,
            };
        }

        running.progress = progress_percent(running.elapsed_ms, running.duration_ms).max(running.progress);
        ActionStep::Progress(ActiveAction {
            kind: running.kind,
            progress: running.progress,
        })
    }

    /// Clear the running action without its effect. Returns the kind that
    /// was cancelled.
    pub fn cancel(&mut self) -> Option<ActionKind> {
        self.running.take().map(|r| r.kind)
    }
}

/// `round(elapsed / duration * 100)`, clamped to 100.
fn progress_percent(elapsed_ms: u64, duration_ms: u64) -> u32 {
    if duration_ms == 0 {
        return PROGRESS_COMPLETE;
    }
    let scaled = u128::from(elapsed_ms)
        .saturating_mul(100)
        .saturating_add(u128::from(duration_ms / 2));
    let percent = scaled.checked_div(u128::from(duration_ms)).unwrap_or(100);
    u32::try_from(percent).unwrap_or(PROGRESS_COMPLETE).min(PROGRESS_COMPLETE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_start_is_rejected() {
        let mut actions = ActionScheduler::new(100);
        assert!(actions.start(ActionKind::Woodcutting, 3_000, "logs"));
        assert!(!actions.start(ActionKind::Mining, 4_000, "ore"));
        assert_eq!(actions.current().map(|a| a.kind), Some(ActionKind::Woodcutting));
    }

    #[test]
    fn progress_rounds_and_completes_once() {
        let mut actions = ActionScheduler::new(100);
        actions.start(ActionKind::Woodcutting, 3_000, "logs");

        let mut seen = Vec::new();
        let mut completions = 0;
        for _ in 0..40 {
            match actions.step() {
                ActionStep::Progress(a) => seen.push(a.progress),
                ActionStep::Completed { effect, .. } => {
                    assert_eq!(effect, "logs");
                    completions += 1;
                }
                ActionStep::Idle => {}
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(seen.len(), 29);
        assert_eq!(seen.first(), Some(&3));
        assert!(seen.windows(2).all(|w| w.first() <= w.get(1)));
        assert!(!actions.is_running());
    }

    #[test]
    fn uneven_duration_rounds_half_up() {
        assert_eq!(progress_percent(100, 300), 33);
        assert_eq!(progress_percent(200, 300), 67);
        assert_eq!(progress_percent(1, 200), 1);
        assert_eq!(progress_percent(500, 100), 100);
    }

    #[test]
    fn cancel_drops_effect() {
        let mut actions = ActionScheduler::new(100);
        actions.start(ActionKind::Traveling, 2_000, "arrive");
        actions.step();
        assert_eq!(actions.cancel(), Some(ActionKind::Traveling));
        assert_eq!(actions.step(), ActionStep::Idle);
        assert!(actions.start(ActionKind::Mining, 4_000, "ore"));
    }

    #[test]
    fn zero_duration_completes_on_first_step() {
        let mut actions = ActionScheduler::new(100);
        actions.start(ActionKind::Smithing, 0, ());
        assert!(matches!(actions.step(), ActionStep::Completed { .. }));
    }
}
