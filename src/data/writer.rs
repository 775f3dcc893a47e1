use crate::core::Instance;
use std::fmt::Write;

/// Writes an instance in the `#Section` benchmark format read by [`super::deserialize`].
/// Resource names must be letters followed by digits, like `R1`.
///
/// # Errors
/// - If formatting fails.
pub fn to_string(instance: &Instance) -> anyhow::Result<String> {
    let mut out = String::new();
    let names: Vec<_> = instance.resources.keys().map(String::as_str).collect();

    writeln!(out, "#General Information")?;
    writeln!(out, "projects: 1")?;
    writeln!(out, "jobs (incl. supersource/sink ): {}", instance.tasks.len())?;
    writeln!(out, "horizon: {}", instance.horizon)?;
    writeln!(out, "duedate: {}", instance.deadline)?;

    writeln!(out, "#Precedence relations")?;
    writeln!(out, "#jobnr. #modes #successors successors")?;
    for &id in instance.tasks.keys() {
        let successors = instance.precedence.successors(id);
        write!(out, "{id} 1 {}", successors.len())?;
        for successor in successors {
            write!(out, " {successor}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "#Duration and resources")?;
    writeln!(out, "#jobnr. mode duration {}", names.join(" "))?;
    for task in instance.tasks.values() {
        write!(out, "{} 1 {}", task.id, task.duration)?;
        for name in &names {
            write!(out, " {}", task.demand_of(name))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "#Resource availability")?;
    writeln!(out, "#resource qty")?;
    for resource in instance.resources.values() {
        writeln!(out, "{} {}", resource.name, resource.capacity)?;
    }

    Ok(out)
}
