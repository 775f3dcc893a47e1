mod gen;
mod parser;
mod render;
mod run;
mod writer;

pub use gen::{generate, GeneratorConfig};
pub use parser::{deserialize, Parsed, Section, Warning};
pub use render::{dot, gantt, table};
pub use run::*;
pub use writer::to_string;

use serde::Serialize;

/// Serializes a schedule, an instance or a report as pretty-printed JSON.
///
/// # Errors
/// - If serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Schedule, ScheduleEntry};

    #[test]
    fn schedule_as_json() -> anyhow::Result<()> {
        let schedule = Schedule::new(6, vec![ScheduleEntry::new(1, 1, 2)]);
        let value: serde_json::Value = serde_json::from_str(&to_json(&schedule)?)?;

        assert_eq!(value["makespan"], 6);
        assert_eq!(value["entries"][0]["task"], 1);
        assert_eq!(value["entries"][0]["finish"], 3);
        Ok(())
    }
}
