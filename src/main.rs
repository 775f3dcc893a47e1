use clap::{Parser, ValueEnum};
use log::warn;
use rand::prelude::*;
use rcpsp_csp::core::{
    Anchor, Instance, ModelConfig, Schedule, Scheduler, SolveOptions, TaskId,
};
use rcpsp_csp::data::{GeneratorConfig, Warning};
use rcpsp_csp::{algo, data, run_reader};
use std::fs::File;
use std::io::{BufReader, Write};
use std::num::NonZero;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl From<Algorithm> for Box<dyn Scheduler> {
    fn from(value: Algorithm) -> Box<dyn Scheduler> {
        algo::SCHEDULERS[value.0]()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let iter = algo::SCHEDULERS.iter().enumerate();
            iter.map(|(i, init)| Algorithm(i, init().name())).collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// How a schedule is written to stdout.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Table,
    Gantt,
    Json,
    /// Graphviz digraph of the precedence relations.
    Dot,
}

/// Application scheduling projects under precedence and renewable resource limits.
#[derive(Debug, Parser)]
enum Application {
    /// Schedule an instance with one of the implemented algorithms.
    Solve {
        algorithm: Algorithm,
        /// The instance file. Reads stdin if omitted.
        input: Option<PathBuf>,
        /// Every task must finish at or before this time.
        #[clap(short, long, default_value_t = rcpsp_csp::core::DEFAULT_MAKESPAN)]
        makespan: u64,
        /// Task whose start time is pinned.
        #[clap(long, default_value_t = rcpsp_csp::core::DEFAULT_ANCHOR_TASK)]
        anchor_task: TaskId,
        /// Start time of the pinned task.
        #[clap(long, default_value_t = rcpsp_csp::core::DEFAULT_ANCHOR_START)]
        anchor_start: u64,
        /// Do not pin any task.
        #[clap(long, conflicts_with_all = ["anchor_task", "anchor_start"])]
        no_anchor: bool,
        /// Retry with a larger makespan up to the instance horizon.
        #[clap(short, long)]
        extend: bool,
        /// Give up after this many seconds.
        #[clap(short, long)]
        time_limit: Option<f64>,
        #[clap(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// Print an instance as it was read.
    Show {
        /// The instance file. Reads stdin if omitted.
        input: Option<PathBuf>,
    },
    /// Run benchmarks on a set of instances.
    Bench {
        /// The input directory.
        input: String,
        /// Exclude scheduling algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        /// Check the scores against the file names.
        #[clap(short, long)]
        check: bool,
        /// Write the reports as JSON.
        #[clap(short, long)]
        json: bool,
    },
    /// Generate random instances.
    /// Scores are not computed, files are named `{deadline}_unknown_{index}.rcp`.
    Gen {
        /// The number of tasks, excluding the dummy source and sink.
        tasks: NonZero<u32>,
        /// The number of resources.
        resources: NonZero<usize>,
        /// The maximum duration of a task.
        max_duration: NonZero<u64>,
        /// The maximum demand of a task for one resource.
        #[clap(short = 'd', long, default_value = "4")]
        max_demand: u64,
        /// The maximum number of successors of a task.
        #[clap(short = 's', long, default_value = "2")]
        max_successors: usize,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Seed of the random generator. Random if omitted.
        #[clap(long)]
        seed: Option<u64>,
        /// Path to output the generated instances. Created if missing.
        #[clap(short, long, default_value = "output")]
        output: String,
    },
}

fn schedulers(exclude: &[Algorithm]) -> impl Iterator<Item = Box<dyn Scheduler>> + '_ {
    let iter = algo::SCHEDULERS.iter().map(|init| init());
    iter.filter(|scheduler| !exclude.iter().any(|name| name.1 == scheduler.name()))
}

fn init_logging() {
    env_logger::Builder::from_default_env()
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();
}

fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        warn!("{warning}");
    }
}

fn open(input: Option<&PathBuf>) -> anyhow::Result<Box<dyn std::io::BufRead>> {
    Ok(match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(std::io::stdin().lock()),
    })
}

fn print_schedule(
    schedule: &Schedule,
    instance: &Instance,
    format: Format,
) -> anyhow::Result<()> {
    match format {
        Format::Table => print!("{}", data::table(schedule)?),
        Format::Gantt => print!("{}", data::gantt(schedule)?),
        Format::Json => println!("{}", data::to_json(schedule)?),
        Format::Dot => print!("{}", data::dot(schedule, &instance.precedence)?),
    }
    if matches!(format, Format::Table | Format::Gantt) {
        let (starts, finishes) = schedule.objective();
        println!("Sum of starts: {starts}, sum of finishes: {finishes}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();

    match Application::parse() {
        Application::Solve {
            algorithm,
            input,
            makespan,
            anchor_task,
            anchor_start,
            no_anchor,
            extend,
            time_limit,
            format,
        } => {
            let mut scheduler = Box::<dyn Scheduler>::from(algorithm);
            let anchor = (!no_anchor).then_some(Anchor {
                task: anchor_task,
                start: anchor_start,
            });
            let config = ModelConfig::new(makespan).with_anchor(anchor);
            let options = SolveOptions {
                extend_to_horizon: extend,
                time_limit: time_limit.map(Duration::try_from_secs_f64).transpose()?,
            };

            let mut reader = open(input.as_ref())?;
            let (schedule, parsed) =
                run_reader(scheduler.as_mut(), &mut reader, &config, &options)?;
            report_warnings(&parsed.warnings);
            print_schedule(&schedule, &parsed.instance, format)
        }
        Application::Show { input } => {
            let parsed = data::deserialize(&mut open(input.as_ref())?)?;
            report_warnings(&parsed.warnings);
            print!("{}", parsed.instance);
            Ok(())
        }
        Application::Bench {
            input,
            exclude,
            check,
            json,
        } => {
            for mut scheduler in schedulers(&exclude) {
                let report = data::run(&input, check, scheduler.as_mut())?;
                if json {
                    println!("{}", data::to_json(&report)?);
                } else {
                    println!("{report}");
                }
            }
            Ok(())
        }
        Application::Gen {
            tasks,
            resources,
            max_duration,
            max_demand,
            max_successors,
            amount,
            seed,
            output,
        } => {
            let config = GeneratorConfig {
                tasks: tasks.get(),
                resources: resources.get(),
                max_duration: max_duration.get(),
                max_demand,
                max_successors,
            };
            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

            let output = std::path::Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            for i in 0..amount.get() {
                let instance = data::generate(&mut rng, &config);
                let filename = format!("{}_unknown_{i}.rcp", instance.deadline);
                File::create(output.join(filename))?
                    .write_all(data::to_string(&instance)?.as_bytes())?;
            }
            Ok(())
        }
    }
}
