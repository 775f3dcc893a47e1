use super::{Instance, TaskId};
use crate::cast_usize;
use serde::{Deserialize, Serialize};

/// Start and finish of one scheduled task.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct ScheduleEntry {
    pub task: TaskId,
    pub start: u64,
    pub finish: u64,
    pub duration: u64,
}

impl ScheduleEntry {
    /// Creates a new entry. Finish is derived from start and duration.
    #[must_use]
    pub const fn new(task: TaskId, start: u64, duration: u64) -> Self {
        Self {
            task,
            start,
            finish: start + duration,
            duration,
        }
    }

    /// Returns whether the task runs during the given time unit.
    #[must_use]
    pub const fn is_active(&self, time: u64) -> bool {
        self.start <= time && time < self.finish
    }
}

/// A schedule of every live task of an instance within a makespan.
/// Entries are sorted ascending by task id.
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct Schedule {
    makespan: u64,
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Creates a new schedule.
    #[must_use]
    pub fn new(makespan: u64, mut entries: Vec<ScheduleEntry>) -> Self {
        entries.sort_unstable_by_key(|entry| entry.task);
        Self { makespan, entries }
    }

    /// Returns the makespan the schedule was built for.
    #[must_use]
    pub const fn makespan(&self) -> u64 {
        self.makespan
    }

    /// Returns the entries sorted by task id.
    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Returns the entry of the given task.
    #[must_use]
    pub fn get(&self, task: TaskId) -> Option<&ScheduleEntry> {
        self.entries
            .binary_search_by_key(&task, |entry| entry.task)
            .ok()
            .map(|index| &self.entries[index])
    }

    /// Returns the time the last task finishes.
    #[must_use]
    pub fn completion(&self) -> u64 {
        self.entries.iter().map(|entry| entry.finish).max().unwrap_or_default()
    }

    /// Returns the ranking objective: sum of start times and sum of finish times.
    #[must_use]
    pub fn objective(&self) -> (u64, u64) {
        self.entries.iter().fold((0, 0), |(starts, finishes), entry| {
            (starts + entry.start, finishes + entry.finish)
        })
    }

    /// Checks that the schedule covers exactly the live tasks of the instance and respects
    /// precedence, the makespan and every resource capacity at every time unit.
    #[must_use]
    pub fn verify(&self, instance: &Instance) -> bool {
        self.covers_live_tasks(instance)
            && self.respects_makespan()
            && self.respects_precedence(instance)
            && self.respects_capacities(instance)
    }

    fn covers_live_tasks(&self, instance: &Instance) -> bool {
        self.entries.len() == instance.live_tasks().count()
            && instance.live_tasks().zip(&self.entries).all(|(task, entry)| {
                task.id == entry.task
                    && task.duration == entry.duration
                    && entry.start + entry.duration == entry.finish
            })
    }

    fn respects_makespan(&self) -> bool {
        self.entries.iter().all(|entry| entry.finish <= self.makespan)
    }

    fn respects_precedence(&self, instance: &Instance) -> bool {
        instance.precedence.edges().all(|edge| {
            match (self.get(edge.predecessor()), self.get(edge.successor())) {
                (Some(first), Some(second)) => first.finish <= second.start,
                _ => true,
            }
        })
    }

    fn respects_capacities(&self, instance: &Instance) -> bool {
        let mut usage = vec![0; cast_usize(self.makespan)];

        instance.resources.values().all(|resource| {
            usage.fill(0);

            self.entries.iter().all(|entry| {
                let demand = instance
                    .tasks
                    .get(&entry.task)
                    .map_or(0, |task| task.demand_of(&resource.name));

                (entry.start..entry.finish).all(|time| {
                    usage.get_mut(cast_usize(time)).is_some_and(|used| {
                        *used += demand;
                        *used <= resource.capacity
                    })
                })
            })
        })
    }
}
