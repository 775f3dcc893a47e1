use super::MalformedInstance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Identifier of a task as written in the instance file.
pub type TaskId = u32;

/// A renewable resource. Its capacity is available anew at every time unit.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Resource {
    pub name: String,
    pub capacity: u64,
}

impl Resource {
    /// Creates a new resource.
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: u64) -> Self {
        let name = name.into();
        Self { name, capacity }
    }
}

/// A task. Contains the duration of the task and its constant demand of every resource.
/// Tasks with zero duration are dummy milestones and take no part in the solved model.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub duration: u64,
    pub demand: BTreeMap<String, u64>,
}

impl Task {
    /// Creates a new task. Zero demands are not stored.
    #[must_use]
    pub fn new<S: Into<String>>(
        id: TaskId,
        duration: u64,
        demand: impl IntoIterator<Item = (S, u64)>,
    ) -> Self {
        let demand = demand
            .into_iter()
            .filter(|&(_, amount)| amount > 0)
            .map(|(name, amount)| (name.into(), amount))
            .collect();
        Self {
            id,
            duration,
            demand,
        }
    }

    /// Returns whether the task is a zero-duration milestone.
    #[must_use]
    pub const fn is_dummy(&self) -> bool {
        self.duration == 0
    }

    /// Returns the amount of the given resource the task consumes at every time unit it runs.
    #[must_use]
    pub fn demand_of(&self, resource: &str) -> u64 {
        self.demand.get(resource).copied().unwrap_or_default()
    }
}

/// A precedence relation: the successor may not start before the predecessor finishes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Precedence(TaskId, TaskId);

impl Precedence {
    /// Creates a new precedence relation.
    #[must_use]
    pub const fn new(predecessor: TaskId, successor: TaskId) -> Self {
        Self(predecessor, successor)
    }

    #[must_use]
    pub const fn predecessor(&self) -> TaskId {
        self.0
    }

    #[must_use]
    pub const fn successor(&self) -> TaskId {
        self.1
    }
}

/// A precedence graph. Maps every task to the ordered list of its successors.
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
#[serde(from = "Vec<Precedence>", into = "Vec<Precedence>")]
pub struct PrecedenceGraph {
    successors: BTreeMap<TaskId, Vec<TaskId>>,
}

impl PrecedenceGraph {
    /// Returns the successors of the given task.
    #[must_use]
    pub fn successors(&self, task: TaskId) -> &[TaskId] {
        self.successors.get(&task).map_or(&[], Vec::as_slice)
    }

    /// Replaces the successor list of the given task.
    pub fn insert(&mut self, task: TaskId, successors: Vec<TaskId>) {
        if successors.is_empty() {
            self.successors.remove(&task);
        } else {
            self.successors.insert(task, successors);
        }
    }

    /// Returns all edges ordered by predecessor and then by successor list position.
    pub fn edges(&self) -> impl Iterator<Item = Precedence> + '_ {
        self.successors.iter().flat_map(|(&from, successors)| {
            successors.iter().map(move |&to| Precedence(from, to))
        })
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successors.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }
}

impl From<Vec<Precedence>> for PrecedenceGraph {
    fn from(edges: Vec<Precedence>) -> Self {
        let mut successors: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();

        for edge in edges {
            successors.entry(edge.0).or_default().push(edge.1);
        }

        Self { successors }
    }
}

impl From<PrecedenceGraph> for Vec<Precedence> {
    fn from(graph: PrecedenceGraph) -> Self {
        graph.edges().collect()
    }
}

/// An instance of the resource-constrained project scheduling problem.
/// Built once by the parser and never mutated afterwards.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct Instance {
    pub horizon: u64,
    pub deadline: u64,
    pub resources: BTreeMap<String, Resource>,
    pub tasks: BTreeMap<TaskId, Task>,
    pub precedence: PrecedenceGraph,
}

impl Instance {
    /// Creates a new instance.
    #[must_use]
    pub fn new(
        horizon: u64,
        deadline: u64,
        resources: Vec<Resource>,
        tasks: Vec<Task>,
        precedence: Vec<Precedence>,
    ) -> Self {
        Self {
            horizon,
            deadline,
            resources: resources.into_iter().map(|r| (r.name.clone(), r)).collect(),
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            precedence: PrecedenceGraph::from(precedence),
        }
    }

    /// Returns the tasks with positive duration ordered by id.
    pub fn live_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values().filter(|task| !task.is_dummy())
    }

    /// Returns the zero-duration tasks ordered by id.
    pub fn dummy_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values().filter(|task| task.is_dummy())
    }

    /// Returns whether the given task exists and has positive duration.
    #[must_use]
    pub fn is_live(&self, task: TaskId) -> bool {
        self.tasks.get(&task).is_some_and(|task| !task.is_dummy())
    }

    /// Checks that every precedence edge and every resource demand refers to something
    /// the instance defines.
    ///
    /// # Errors
    /// - If a precedence edge references a task that is neither live nor dummy.
    /// - If a task demands a resource that is not defined.
    pub fn validate(&self) -> Result<(), MalformedInstance> {
        for edge in self.precedence.edges() {
            if !self.tasks.contains_key(&edge.0) || !self.tasks.contains_key(&edge.1) {
                return Err(MalformedInstance::UnknownPrecedenceTask {
                    from: edge.0,
                    to: edge.1,
                });
            }
        }

        for task in self.tasks.values() {
            if let Some(name) = task.demand.keys().find(|&name| !self.resources.contains_key(name))
            {
                return Err(MalformedInstance::UnknownResource {
                    task: task.id,
                    resource: name.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Instance ===")?;
        writeln!(f, "Horizon: {}", self.horizon)?;
        writeln!(f, "Deadline: {}", self.deadline)?;

        writeln!(f, "Resources:")?;
        for resource in self.resources.values() {
            writeln!(f, "  {}: {}", resource.name, resource.capacity)?;
        }

        writeln!(f, "Tasks:")?;
        for task in self.tasks.values() {
            let demand: Vec<_> = task
                .demand
                .iter()
                .map(|(name, amount)| format!("{name}: {amount}"))
                .collect();
            write!(
                f,
                "  Task {}: duration {}, demand [{}]",
                task.id,
                task.duration,
                demand.join(", ")
            )?;
            if task.is_dummy() {
                write!(f, " (dummy)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Precedence:")?;
        for (task, successors) in &self.precedence.successors {
            writeln!(f, "  Task {task} -> successors: {successors:?}")?;
        }

        Ok(())
    }
}
