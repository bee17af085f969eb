//! Scheduling capability and a ring-buffer tick scheduler

use std::collections::HashSet;

use crate::chop::SessionId;
use crate::host::player::PlayerId;

/// Longest delay the ring can hold, in ticks
pub const MAX_TICK_DELAY: usize = 1 << 12;

/// Work the coordinator asks to be handed back at a later tick boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduledTask {
    /// Advance one session's fall animation by one state transition
    AnimateStep(SessionId),
    /// Lift a player's chop cooldown, if it is still the given generation
    ExpireCooldown(PlayerId, u64),
}

/// Deferred execution provided by the host.
///
/// Tasks are never run inline; the host feeds due tasks back into
/// [`ChopCoordinator::run_task`](crate::chop::ChopCoordinator::run_task)
/// once the current tick's mutations are done.
pub trait Scheduler {
    fn schedule_next_tick(&mut self, task: ScheduledTask);

    /// Run `task` after `ticks` ticks; zero means the next tick
    fn schedule_delayed(&mut self, task: ScheduledTask, ticks: u32);
}

/// Ring of per-delay queues; a task is queued at most once at a time.
pub struct TickScheduler {
    tick_queue: Box<[Vec<ScheduledTask>]>,
    queued: HashSet<ScheduledTask>,
    offset: usize,
    tick: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            tick_queue: (0..MAX_TICK_DELAY).map(|_| Vec::new()).collect(),
            queued: HashSet::new(),
            offset: 0,
            tick: 0,
        }
    }

    /// Advance to the next tick and return the tasks due on it, in
    /// scheduling order.
    pub fn step_tick(&mut self) -> Vec<ScheduledTask> {
        self.offset = (self.offset + 1) % MAX_TICK_DELAY;
        self.tick += 1;
        let due = std::mem::take(&mut self.tick_queue[self.offset]);
        for task in &due {
            self.queued.remove(task);
        }
        due
    }

    pub fn is_scheduled(&self, task: ScheduledTask) -> bool {
        self.queued.contains(&task)
    }

    /// Number of tasks waiting
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    /// Ticks elapsed since creation
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    fn enqueue(&mut self, task: ScheduledTask, delay: usize) {
        if !self.queued.insert(task) {
            log::debug!("{:?} already scheduled, ignoring", task);
            return;
        }
        let delay = if delay >= MAX_TICK_DELAY {
            log::warn!("Delay of {} ticks for {:?} clamped to {}", delay, task, MAX_TICK_DELAY - 1);
            MAX_TICK_DELAY - 1
        } else {
            delay.max(1)
        };
        let index = (self.offset + delay) % MAX_TICK_DELAY;
        self.tick_queue[index].push(task);
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TickScheduler {
    fn schedule_next_tick(&mut self, task: ScheduledTask) {
        self.enqueue(task, 1);
    }

    fn schedule_delayed(&mut self, task: ScheduledTask, ticks: u32) {
        self.enqueue(task, ticks as usize);
    }
}
