use crate::core::{PrecedenceGraph, Schedule};
use std::fmt::Write;

/// Renders the schedule as a fixed-width table, one task per row.
///
/// # Errors
/// - If formatting fails.
pub fn table(schedule: &Schedule) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "{:>6} | {:>6} | {:>6} | {:>8}",
        "Task", "Start", "Finish", "Duration"
    )?;

    for entry in schedule.entries() {
        writeln!(
            out,
            "{:>6} | {:>6} | {:>6} | {:>8}",
            entry.task, entry.start, entry.finish, entry.duration
        )?;
    }

    Ok(out)
}

/// Renders the schedule as a text Gantt chart over `[0, makespan)`.
/// Every row marks the time units its task runs with `#`.
///
/// # Errors
/// - If formatting fails.
pub fn gantt(schedule: &Schedule) -> anyhow::Result<String> {
    let mut out = String::new();

    let axis: String = (0..schedule.makespan())
        .map(|time| (time % 10).to_string())
        .collect();
    writeln!(out, "{:>6} |{axis}|", "Time")?;

    for entry in schedule.entries() {
        let row: String = (0..schedule.makespan())
            .map(|time| if entry.is_active(time) { '#' } else { '.' })
            .collect();
        writeln!(out, "{:>6} |{row}|", entry.task)?;
    }

    Ok(out)
}

/// Renders the schedule as a Graphviz digraph of its precedence relations.
/// Nodes are the scheduled tasks labeled with their start time. Edges to or from
/// tasks missing from the schedule, such as dummy milestones, are left out.
///
/// # Errors
/// - If formatting fails.
pub fn dot(schedule: &Schedule, precedence: &PrecedenceGraph) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "digraph schedule {{")?;

    for entry in schedule.entries() {
        writeln!(
            out,
            "    {0} [label=\"{0}\\nStart: {1}\"];",
            entry.task, entry.start
        )?;
    }

    for edge in precedence.edges() {
        if schedule.get(edge.predecessor()).is_some() && schedule.get(edge.successor()).is_some()
        {
            writeln!(out, "    {} -> {};", edge.predecessor(), edge.successor())?;
        }
    }

    writeln!(out, "}}")?;
    Ok(out)
}
