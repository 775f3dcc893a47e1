use crate::core::{ModelConfig, Scheduler, SolveError};
use crate::csp::CancelToken;
use crate::data::deserialize;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;

/// Report of running a directory of samples.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(scheduler: String) -> Self {
        let entries = Vec::new();
        Self { scheduler, entries }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single sample.
/// The score is the sum of start times of the selected schedule, none if infeasible.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub makespan: u64,
    pub score: Option<u64>,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.score {
            Some(score) => write!(f, "{}: {} in {:.2} sec", self.name, score, self.time),
            None => write!(f, "{}: infeasible in {:.2} sec", self.name, self.time),
        }
    }
}

/// Run all samples in the `samples` directory.
/// Print the report to stdout.
///
/// # Arguments
/// - `valid` is true, check if the score is correct.
/// - `solver` is the scheduler to run.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
///
/// # Panics
/// - If the schedule is invalid.
/// - If the score is incorrect and `valid` is true.
pub fn samples(valid: bool, solver: &mut dyn Scheduler) -> anyhow::Result<()> {
    run("samples", valid, solver).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Expected outcome encoded in a sample file name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Expected {
    /// Best sum of start times, none if infeasible.
    Score(Option<u64>),
    /// Not computed, never checked.
    Unknown,
}

/// Run all samples in the `dir` directory.
/// File names encode the makespan and the expected score:
/// `{makespan}_{score|none|unknown}_{index}`.
///
/// # Arguments
/// - `valid` is true, check if the score is correct.
/// - `solver` is the scheduler to run.
///
/// # Errors
/// - If a file cannot be read or its name does not follow the pattern.
/// - If the instance is malformed or the search is cancelled.
///
/// # Panics
/// - If the schedule is invalid.
/// - If the score is incorrect and `valid` is true.
pub fn run(dir: &str, valid: bool, solver: &mut dyn Scheduler) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    files.sort_by_key(std::fs::DirEntry::file_name);

    for file in files {
        let (name, makespan, expected) = parse_filename(&file.file_name())?;
        let parsed = deserialize(&mut BufReader::new(File::open(file.path())?))?;
        parsed.instance.validate()?;

        let config = ModelConfig::new(makespan);
        let time = std::time::Instant::now();
        let result = solver.schedule(&parsed.instance, &config, &CancelToken::new());
        let time = time.elapsed().as_secs_f64();

        let score = match result {
            Ok(schedule) => {
                assert!(schedule.verify(&parsed.instance), "Invalid schedule created");
                Some(schedule.objective().0)
            }
            Err(err @ (SolveError::Cancelled | SolveError::Malformed(_))) => {
                return Err(err.into());
            }
            Err(_) => None,
        };

        if let (true, Expected::Score(expected)) = (valid, expected) {
            assert_eq!(score, expected, "Invalid score {name}");
        }

        report.entries.push(ReportEntry {
            name,
            makespan,
            score,
            time,
        });
    }

    Ok(report)
}

fn parse_filename(filename: &std::ffi::OsString) -> anyhow::Result<(String, u64, Expected)> {
    static NAME_ERR: &str = "Cannot read filename";

    let name = filename.to_str().ok_or_else(|| anyhow!(NAME_ERR))?;
    let mut parts = name.split('.');
    let mut parts = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?.split('_');
    let makespan = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?.parse()?;
    let expected = match parts.next().ok_or_else(|| anyhow!(NAME_ERR))? {
        "none" => Expected::Score(None),
        "unknown" => Expected::Unknown,
        score => Expected::Score(Some(score.parse()?)),
    };
    let _: usize = parts.next().ok_or_else(|| anyhow!(NAME_ERR))?.parse()?;
    Ok((name.into(), makespan, expected))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::BranchAndBound;
    use crate::data::{generate, to_string, GeneratorConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn unknown_scores_are_not_checked() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("rcpsp_unknown_{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;

        let config = GeneratorConfig {
            tasks: 3,
            ..GeneratorConfig::default()
        };
        let instance = generate(&mut StdRng::seed_from_u64(5), &config);
        let path = dir.join(format!("{}_unknown_0.rcp", instance.deadline));
        std::fs::write(path, to_string(&instance)?)?;

        let report = run(
            dir.to_str().ok_or_else(|| anyhow!("Invalid path"))?,
            true,
            &mut BranchAndBound,
        );
        std::fs::remove_dir_all(&dir)?;

        let report = report?;
        assert_eq!(report.entries.len(), 1);
        assert!(report.entries[0].score.is_some());
        Ok(())
    }

    #[test]
    fn test_parse_filename() -> anyhow::Result<()> {
        let filename = "11_23_0.rcp".into();
        let (name, makespan, expected) = parse_filename(&filename)?;
        assert_eq!(name, "11_23_0.rcp");
        assert_eq!(makespan, 11);
        assert_eq!(expected, Expected::Score(Some(23)));

        let filename = "4_none_2.rcp".into();
        let (name, makespan, expected) = parse_filename(&filename)?;
        assert_eq!(name, "4_none_2.rcp");
        assert_eq!(makespan, 4);
        assert_eq!(expected, Expected::Score(None));

        let (_, makespan, expected) = parse_filename(&"17_unknown_0.rcp".into())?;
        assert_eq!(makespan, 17);
        assert_eq!(expected, Expected::Unknown);
        Ok(())
    }

    #[test]
    fn test_parse_filename_errors() {
        assert!(parse_filename(&"".into()).is_err());
        assert!(parse_filename(&".rcp".into()).is_err());
        assert!(parse_filename(&"10.rcp".into()).is_err());
        assert!(parse_filename(&"10_12.rcp".into()).is_err());
        assert!(parse_filename(&"10_1a2_0.rcp".into()).is_err());
        assert!(parse_filename(&"10_Unknown_0.rcp".into()).is_err());
        assert!(parse_filename(&"1a0_12_0.rcp".into()).is_err());
        assert!(parse_filename(&"10_12_0a2.rcp".into()).is_err());
    }
}
