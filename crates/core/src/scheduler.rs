//! Cooperative task scheduling seam and a single-threaded driver.
//!
//! The harness runs on one cooperating execution context. Work arrives as
//! discrete tasks; components that must release a resource "when the
//! current task finishes" register a one-shot observer with the scheduler
//! instead of requiring an explicit unlock call from every caller.
//!
//! [`TaskScheduler`] is the consumed interface; [`TaskLoop`] is the
//! driver used by the harness and by tests.

use std::cell::RefCell;
use std::collections::VecDeque;

/// Stable identity under which a one-shot observer is registered.
///
/// Registration is keyed so a component can guarantee at most one pending
/// observer per task, replacing rather than stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverKey(pub u64);

/// One-shot callback fired when the current scheduled task finishes.
pub type TaskObserver = Box<dyn FnOnce()>;

/// Registration surface consumed from the host scheduler.
pub trait TaskScheduler {
    /// Registers `observer` to run when the current task completes.
    ///
    /// Observers are one-shot: the scheduler deregisters each observer
    /// immediately before running it. Re-registering under the same key
    /// replaces the previous observer, which is dropped unrun.
    fn add_task_observer(&self, key: ObserverKey, observer: TaskObserver);

    /// Drops a registered observer without running it.
    fn remove_task_observer(&self, key: ObserverKey);
}

type Task = Box<dyn FnOnce()>;

/// Single-threaded cooperative task loop.
///
/// Tasks run in FIFO order. After each task, every observer registered
/// during that task fires exactly once, in registration order, and is
/// deregistered first. Observers registered while observers are firing
/// belong to the next task.
#[derive(Default)]
pub struct TaskLoop {
    queue: RefCell<VecDeque<Task>>,
    observers: RefCell<Vec<(ObserverKey, TaskObserver)>>,
}

impl TaskLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a task for [`TaskLoop::run_until_idle`].
    pub fn post_task(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Runs `task` inline as one scheduled unit, then fires end-of-task
    /// observers.
    pub fn run_task(&self, task: impl FnOnce()) {
        task();
        self.finish_task();
    }

    /// Drains the queue, firing observers after each task. Tasks posted
    /// while draining run in the same call.
    pub fn run_until_idle(&self) {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task();
                    self.finish_task();
                }
                None => break,
            }
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn finish_task(&self) {
        // Deregister before running; observers registered by a firing
        // observer land in the fresh vector and wait for the next task.
        let fired: Vec<(ObserverKey, TaskObserver)> =
            self.observers.borrow_mut().drain(..).collect();
        for (_, observer) in fired {
            observer();
        }
    }

    /// Removes and returns the observer under `key`, releasing the borrow
    /// before the caller drops (or runs) it.
    fn take_observer(&self, key: ObserverKey) -> Option<TaskObserver> {
        let mut observers = self.observers.borrow_mut();
        let position = observers.iter().position(|(k, _)| *k == key)?;
        Some(observers.remove(position).1)
    }
}

impl TaskScheduler for TaskLoop {
    fn add_task_observer(&self, key: ObserverKey, observer: TaskObserver) {
        // Take the replaced observer out first so its drop (which may run
        // arbitrary cleanup) happens without the registry borrowed.
        let replaced = self.take_observer(key);
        self.observers.borrow_mut().push((key, observer));
        drop(replaced);
    }

    fn remove_task_observer(&self, key: ObserverKey) {
        let removed = self.take_observer(key);
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log_observer(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> TaskObserver {
        let log = log.clone();
        Box::new(move || log.borrow_mut().push(tag))
    }

    #[test]
    fn observer_fires_at_end_of_task_not_during() {
        let scheduler = TaskLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        scheduler.run_task(|| {
            scheduler.add_task_observer(ObserverKey(1), log_observer(&log, "observer"));
            log.borrow_mut().push("task");
        });

        assert_eq!(*log.borrow(), vec!["task", "observer"]);
    }

    #[test]
    fn observer_is_one_shot() {
        let scheduler = TaskLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        scheduler.run_task(|| {
            scheduler.add_task_observer(ObserverKey(1), log_observer(&log, "once"));
        });
        scheduler.run_task(|| {});

        assert_eq!(*log.borrow(), vec!["once"]);
        assert_eq!(scheduler.observer_count(), 0);
    }

    #[test]
    fn same_key_replaces_previous_observer() {
        let scheduler = TaskLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        scheduler.run_task(|| {
            scheduler.add_task_observer(ObserverKey(7), log_observer(&log, "first"));
            scheduler.add_task_observer(ObserverKey(7), log_observer(&log, "second"));
        });

        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn removed_observer_never_fires() {
        let scheduler = TaskLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        scheduler.run_task(|| {
            scheduler.add_task_observer(ObserverKey(3), log_observer(&log, "removed"));
            scheduler.remove_task_observer(ObserverKey(3));
        });

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn observer_registered_while_firing_waits_for_next_task() {
        let scheduler = Rc::new(TaskLoop::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_scheduler = scheduler.clone();
        let inner_log = log.clone();
        scheduler.run_task(|| {
            scheduler.add_task_observer(
                ObserverKey(1),
                Box::new(move || {
                    inner_log.borrow_mut().push("outer");
                    let late_log = inner_log.clone();
                    inner_scheduler.add_task_observer(
                        ObserverKey(2),
                        Box::new(move || late_log.borrow_mut().push("inner")),
                    );
                }),
            );
        });
        assert_eq!(*log.borrow(), vec!["outer"]);

        scheduler.run_task(|| {});
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn run_until_idle_drains_tasks_posted_while_draining() {
        let scheduler = Rc::new(TaskLoop::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_scheduler = scheduler.clone();
        let inner_log = log.clone();
        scheduler.post_task(move || {
            inner_log.borrow_mut().push("first");
            let late_log = inner_log.clone();
            inner_scheduler.post_task(move || late_log.borrow_mut().push("second"));
        });

        scheduler.run_until_idle();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(scheduler.pending_tasks(), 0);
    }

    proptest! {
        /// Whatever mix of registrations and removals happens inside a
        /// task, every surviving observer fires exactly once at the end of
        /// that task and none remain registered afterward.
        #[test]
        fn observers_never_leak_across_tasks(ops in prop::collection::vec(0u8..3, 0..32)) {
            let scheduler = TaskLoop::new();
            let fired = Rc::new(RefCell::new(0u32));
            let mut expected = 0u32;
            let mut alive: Vec<u64> = Vec::new();

            scheduler.run_task(|| {
                for (i, op) in ops.iter().enumerate() {
                    let key = ObserverKey(i as u64 % 4);
                    match op {
                        0 | 1 => {
                            if alive.contains(&key.0) {
                                // Replacement: the earlier registration is
                                // dropped unrun.
                            } else {
                                alive.push(key.0);
                            }
                            let fired = fired.clone();
                            scheduler.add_task_observer(
                                key,
                                Box::new(move || *fired.borrow_mut() += 1),
                            );
                        }
                        _ => {
                            scheduler.remove_task_observer(key);
                            alive.retain(|k| *k != key.0);
                        }
                    }
                }
                expected = alive.len() as u32;
            });

            prop_assert_eq!(*fired.borrow(), expected);
            prop_assert_eq!(scheduler.observer_count(), 0);

            scheduler.run_task(|| {});
            prop_assert_eq!(*fired.borrow(), expected, "nothing may fire twice");
        }
    }
}
