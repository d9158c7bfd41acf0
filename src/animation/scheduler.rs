//! Cancellable timers driven by simulation time
//!
//! Nothing runs in the background: the owner advances the clock once per
//! frame and receives the payloads that came due, in due-time order.

/// Identifies a scheduled task for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    handle: TaskHandle,
    due: f64,
    period: Option<f64>,
    payload: T,
}

/// One-shot and recurring timers over a simulation clock (seconds)
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    tasks: Vec<ScheduledTask<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Current simulation time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run `payload` once, `delay` seconds from now
    pub fn schedule_after(&mut self, delay: f64, payload: T) -> TaskHandle {
        self.push(delay, None, payload)
    }

    /// Run `payload` after `first_delay`, then every `period` seconds
    pub fn schedule_every(&mut self, first_delay: f64, period: f64, payload: T) -> TaskHandle {
        self.push(first_delay, Some(period), payload)
    }

    fn push(&mut self, delay: f64, period: Option<f64>, payload: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            handle,
            due: self.now + delay.max(0.0),
            period: period.filter(|p| *p > 0.0),
            payload,
        });
        handle
    }

    /// Returns true if the task was still pending
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.handle != handle);
        self.tasks.len() != before
    }

    /// Drop every pending task, returning how many there were
    pub fn cancel_all(&mut self) -> usize {
        let count = self.tasks.len();
        self.tasks.clear();
        count
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|task| task.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Move the clock forward and collect everything that came due
    ///
    /// A recurring task fires at most once per call; missed periods are
    /// skipped rather than replayed.
    pub fn advance(&mut self, dt: f64) -> Vec<T> {
        self.now += dt.max(0.0);
        let now = self.now;

        let mut due: Vec<(f64, TaskHandle, T)> = self
            .tasks
            .iter()
            .filter(|task| task.due <= now)
            .map(|task| (task.due, task.handle, task.payload.clone()))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1 .0.cmp(&b.1 .0)));

        self.tasks.retain_mut(|task| {
            if task.due > now {
                return true;
            }
            match task.period {
                Some(period) => {
                    while task.due <= now {
                        task.due += period;
                    }
                    true
                }
                None => false,
            }
        });

        due.into_iter().map(|(_, _, payload)| payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(0.5, "step");

        assert!(scheduler.advance(0.25).is_empty());
        assert_eq!(scheduler.advance(0.25), vec!["step"]);
        assert!(scheduler.advance(1.0).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(0.0, 1);
        assert_eq!(scheduler.advance(0.0), vec![1]);
    }

    #[test]
    fn test_recurring_task() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_every(0.0, 1.0, "tick");

        assert_eq!(scheduler.advance(0.1), vec!["tick"]);
        assert!(scheduler.advance(0.5).is_empty());
        assert_eq!(scheduler.advance(0.5), vec!["tick"]);
        // A long stall fires once, not once per missed period
        assert_eq!(scheduler.advance(5.0), vec!["tick"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(0.3, "late");
        scheduler.schedule_after(0.1, "early");
        scheduler.schedule_after(0.1, "early-second");

        assert_eq!(scheduler.advance(1.0), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule_after(0.1, "keep");
        let drop = scheduler.schedule_after(0.1, "drop");

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert!(scheduler.is_pending(keep));
        assert_eq!(scheduler.advance(0.2), vec!["keep"]);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(0.1, 1);
        scheduler.schedule_every(0.1, 0.1, 2);

        assert_eq!(scheduler.cancel_all(), 2);
        assert!(scheduler.advance(10.0).is_empty());
    }
}
