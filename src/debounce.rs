use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;

/// A pending scheduled task that can be called off.
pub trait Cancel {
    fn cancel(self);
}

pub trait Scheduler {
    type Handle: Cancel;

    fn schedule_after(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers via `setTimeout`. Dropping the handle clears the timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn schedule_after(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Timeout {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task)
    }
}

impl Cancel for Timeout {
    fn cancel(self) {
        drop(self);
    }
}

type Slot = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

/// Runs only the last of a burst of scheduled tasks.
///
/// Scheduling again before the delay has passed cancels the task that was
/// waiting.
pub struct Debouncer<S: Scheduler> {
    scheduler: S,
    delay: Duration,
    pending: Option<(S::Handle, Slot)>,
}

impl<S: Scheduler> Debouncer<S> {
    pub fn new(scheduler: S, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, task: impl FnOnce() + 'static) {
        self.cancel();

        let slot: Slot = Rc::new(RefCell::new(Some(Box::new(task))));
        let fired = slot.clone();
        let handle = self.scheduler.schedule_after(
            self.delay,
            Box::new(move || {
                let task = fired.borrow_mut().take();
                if let Some(task) = task {
                    task();
                }
            }),
        );
        self.pending = Some((handle, slot));
    }

    /// Drop the waiting task, if any. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((handle, slot)) => {
                let was_pending = slot.borrow_mut().take().is_some();
                handle.cancel();
                was_pending
            }
            None => false,
        }
    }

    /// Run the waiting task now instead of at the end of the delay.
    /// Returns whether there was one.
    pub fn flush(&mut self) -> bool {
        let Some((handle, slot)) = self.pending.take() else {
            return false;
        };
        handle.cancel();
        let task = slot.borrow_mut().take();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|(_, slot)| slot.borrow().is_some())
    }
}
