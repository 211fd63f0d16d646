use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

pub type Callback<Ctx> = Box<dyn FnMut(&mut Ctx)>;

/// Repeating callbacks over a shared context. Cancelling a handle guarantees the
/// callback never runs again.
pub trait Scheduler<Ctx> {
    fn schedule_repeating(&mut self, interval: Duration, callback: Callback<Ctx>) -> TaskHandle;
    fn cancel(&mut self, handle: TaskHandle) -> bool;
}

struct Task<Ctx> {
    handle: TaskHandle,
    interval: Duration,
    next_due: Instant,
    callback: Callback<Ctx>,
}

/// Scheduler driven by the UI event loop: the loop sleeps until `next_deadline`
/// and then calls `run_due`. Callbacks run one after another on the caller's
/// thread, so a task never overlaps itself.
pub struct LoopScheduler<Ctx> {
    next_id: u64,
    tasks: Vec<Task<Ctx>>,
}

impl<Ctx> Default for LoopScheduler<Ctx> {
    fn default() -> Self {
        Self {
            next_id: 0,
            tasks: Vec::new(),
        }
    }
}

impl<Ctx> LoopScheduler<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like `schedule_repeating`, first firing one `interval` after `now`.
    pub fn schedule_from(
        &mut self,
        now: Instant,
        interval: Duration,
        callback: Callback<Ctx>,
    ) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.tasks.push(Task {
            handle,
            interval,
            next_due: now + interval,
            callback,
        });
        handle
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|task| task.handle == handle)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|task| task.next_due).min()
    }

    /// Runs every task that is due at `now`. A task that fell behind fires once
    /// and is rescheduled from `now`; missed intervals are not replayed.
    pub fn run_due(&mut self, now: Instant, ctx: &mut Ctx) -> usize {
        let mut fired = 0;
        for task in self.tasks.iter_mut().filter(|task| task.next_due <= now) {
            (task.callback)(ctx);
            task.next_due = now + task.interval;
            fired += 1;
        }
        fired
    }
}

impl<Ctx> Scheduler<Ctx> for LoopScheduler<Ctx> {
    fn schedule_repeating(&mut self, interval: Duration, callback: Callback<Ctx>) -> TaskHandle {
        self.schedule_from(Instant::now(), interval, callback)
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }
}
