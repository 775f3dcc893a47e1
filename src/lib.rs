#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::BufRead;

pub mod algo;
pub mod core;
pub mod csp;
pub mod data;
pub mod model;

/// Reads an instance from reader and runs the given scheduler on it.
/// Returns the schedule together with the parsed instance and its warnings.
///
/// # Errors
/// - If the instance could not be read from the reader.
/// - If the instance is malformed, infeasible or the time limit passed.
///
/// # Panics
///  - If the schedule is invalid in debug mode.
pub fn run_reader(
    scheduler: &mut dyn core::Scheduler,
    reader: &mut impl BufRead,
    config: &core::ModelConfig,
    options: &core::SolveOptions,
) -> Result<(core::Schedule, data::Parsed)> {
    let parsed = data::deserialize(reader)?;
    let schedule = algo::solve(scheduler, &parsed.instance, config, options)?;

    debug_assert!(
        schedule.verify(&parsed.instance),
        "Schedule is invalid: {schedule:?}"
    );

    Ok((schedule, parsed))
}

#[cfg(not(target_pointer_width = "64"))]
compile_error!("Must be 64-bit system!");

/// Casts the given value to `usize`.
/// It should never fail on 64-bit systems.
///
/// # Panics
/// - If the value cannot be cast to `usize`.
#[must_use]
pub fn cast_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or_else(|_| unreachable!("Must be 64-bit system!"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::BranchAndBound;
    use crate::core::{ModelConfig, SolveOptions};

    #[test]
    fn run_reader_returns_schedule_and_instance() -> anyhow::Result<()> {
        let text = "\
#Precedence relations
1 1 1 2
2 1 1 3
3 1 0
#Duration and resources
#jobnr. mode duration R1
1 1 2 3
2 1 3 2
3 1 0 0
#Resource availability
R1 5
";
        let (schedule, parsed) = run_reader(
            &mut BranchAndBound,
            &mut std::io::Cursor::new(text),
            &ModelConfig::new(10),
            &SolveOptions::default(),
        )?;

        assert_eq!(schedule.objective(), (4, 9));
        assert_eq!(parsed.warnings, vec![data::Warning::DummyTask { task: 3 }]);
        assert_eq!(parsed.instance.precedence.successors(1), &[2]);
        Ok(())
    }
}
