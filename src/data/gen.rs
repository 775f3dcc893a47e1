use crate::core::{Instance, Precedence, Resource, Task, TaskId};
use rand::seq::IteratorRandom;
use rand::Rng;

/// Shape of randomly generated instances.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GeneratorConfig {
    /// Number of live tasks, excluding the dummy source and sink.
    pub tasks: u32,
    pub resources: usize,
    pub max_duration: u64,
    pub max_demand: u64,
    /// Maximum number of live successors of a live task.
    pub max_successors: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tasks: 8,
            resources: 2,
            max_duration: 5,
            max_demand: 4,
            max_successors: 2,
        }
    }
}

/// Generates a random instance with a dummy source `1` and a dummy sink after the live tasks.
/// Precedence edges only point forward, so the graph is acyclic, and no single task demands
/// more than any capacity. Horizon and deadline are the sum of durations.
pub fn generate(rng: &mut impl Rng, config: &GeneratorConfig) -> Instance {
    let names: Vec<_> = (1..=config.resources).map(|r| format!("R{r}")).collect();
    let source: TaskId = 1;
    let sink = config.tasks + 2;
    let live = source + 1..sink;

    let resources = names
        .iter()
        .map(|name| {
            let capacity = rng.gen_range(config.max_demand..=config.max_demand * 2);
            Resource::new(name.as_str(), capacity)
        })
        .collect();

    let mut tasks = vec![Task::new(source, 0, Vec::<(String, u64)>::new())];
    for id in live.clone() {
        let duration = rng.gen_range(1..=config.max_duration.max(1));
        let demand: Vec<_> = names
            .iter()
            .map(|name| (name.as_str(), rng.gen_range(0..=config.max_demand)))
            .collect();
        tasks.push(Task::new(id, duration, demand));
    }
    tasks.push(Task::new(sink, 0, Vec::<(String, u64)>::new()));

    let mut precedence = Vec::new();
    let mut has_predecessor = vec![false; sink as usize + 1];
    for id in live.clone() {
        let count = rng.gen_range(0..=config.max_successors);
        let mut successors = (id + 1..sink).choose_multiple(rng, count);
        successors.sort_unstable();

        if successors.is_empty() {
            successors.push(sink);
        }
        for successor in successors {
            has_predecessor[successor as usize] = true;
            precedence.push(Precedence::new(id, successor));
        }
    }
    for id in live.rev() {
        if !has_predecessor[id as usize] {
            precedence.insert(0, Precedence::new(source, id));
        }
    }

    let horizon = tasks.iter().map(|task| task.duration).sum();
    Instance::new(horizon, horizon, resources, tasks, precedence)
}
