use crate::core::{Instance, PrecedenceGraph, Resource, Task, TaskId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::io::BufRead;

/// Section of an instance file.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Section {
    General,
    Precedence,
    Durations,
    Availability,
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::General => "general information",
            Self::Precedence => "precedence relations",
            Self::Durations => "duration and resources",
            Self::Availability => "resource availability",
        };
        f.write_str(name)
    }
}

/// Something the parser skipped or noticed while reading an instance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Warning {
    /// A data line that could not be read. Lines are numbered from 1.
    MalformedLine {
        section: Section,
        line: usize,
        text: String,
    },
    /// A task with zero duration, kept as a dummy.
    DummyTask { task: TaskId },
    /// A second duration line for the same task, ignored.
    DuplicateTask { task: TaskId, line: usize },
    /// A second successor list for the same task, ignored.
    DuplicateSuccessors { task: TaskId, line: usize },
    /// A section that never appeared in the file.
    MissingSection { section: Section },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine {
                section,
                line,
                text,
            } => write!(f, "line {line} in {section} could not be read: `{text}`"),
            Self::DummyTask { task } => write!(f, "task {task} has zero duration, kept as dummy"),
            Self::DuplicateTask { task, line } => {
                write!(f, "task {task} redefined on line {line}, ignored")
            }
            Self::DuplicateSuccessors { task, line } => {
                write!(f, "successors of task {task} redefined on line {line}, ignored")
            }
            Self::MissingSection { section } => write!(f, "section {section} is missing"),
        }
    }
}

/// An instance together with the warnings collected while reading it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parsed {
    pub instance: Instance,
    pub warnings: Vec<Warning>,
}

/// Returns the section a header line opens, if any.
fn section_of(line: &str) -> Option<Section> {
    let header = line.trim_start_matches('#').trim().to_ascii_lowercase();

    if header.starts_with("general information") || header.starts_with("project information") {
        Some(Section::General)
    } else if header.starts_with("precedence relations") {
        Some(Section::Precedence)
    } else if header.starts_with("duration and resources")
        || header.starts_with("requests/durations")
    {
        Some(Section::Durations)
    } else if header.starts_with("resource availability")
        || header.starts_with("resourceavailabilities")
    {
        Some(Section::Availability)
    } else {
        None
    }
}

/// Returns every run of digits in the line.
fn integers(line: &str) -> Vec<u64> {
    line.split(|c: char| !c.is_ascii_digit())
        .filter_map(|digits| digits.parse().ok())
        .collect()
}

/// Parses every whitespace-separated token as an integer.
fn integer_tokens(line: &str) -> Option<Vec<u64>> {
    line.split_whitespace().map(|token| token.parse().ok()).collect()
}

fn is_letters(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Returns the resource names of a header row, `R1 R2` and `R 1  R 2` alike.
fn resource_names(line: &str) -> Vec<String> {
    let tokens: Vec<_> = line.split_whitespace().collect();
    let mut names = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let token = tokens[index];
        let split = token.find(|c: char| c.is_ascii_digit()).unwrap_or(token.len());
        let (letters, digits) = token.split_at(split);

        if is_letters(letters) && is_digits(digits) {
            names.push(token.to_owned());
        } else if is_letters(token) && tokens.get(index + 1).is_some_and(|next| is_digits(next)) {
            names.push(format!("{token}{}", tokens[index + 1]));
            index += 1;
        }
        index += 1;
    }

    names
}

#[derive(Debug, Default)]
struct Reader {
    section: Option<Section>,
    seen: Vec<Section>,
    horizon: u64,
    deadline: u64,
    deadline_column: Option<usize>,
    demand_names: Vec<String>,
    availability_names: Vec<String>,
    resources: Vec<Resource>,
    tasks: BTreeMap<TaskId, Task>,
    precedence: PrecedenceGraph,
    listed: Vec<TaskId>,
    warnings: Vec<Warning>,
}

impl Reader {
    fn malformed(&mut self, section: Section, line: usize, text: &str) {
        self.warnings.push(Warning::MalformedLine {
            section,
            line,
            text: text.to_owned(),
        });
    }

    fn read(&mut self, number: usize, line: &str) {
        if line.is_empty() || line.starts_with('*') || line.starts_with('-') {
            return;
        }

        if let Some(section) = section_of(line) {
            self.section = Some(section);
            if !self.seen.contains(&section) {
                self.seen.push(section);
            }
            return;
        }

        match self.section {
            None | Some(Section::General) => self.general(line),
            Some(Section::Precedence) => self.precedence(number, line),
            Some(Section::Durations) => self.durations(number, line),
            Some(Section::Availability) => self.availability(number, line),
        }
    }

    fn general(&mut self, line: &str) {
        let lower = line.to_ascii_lowercase();

        if lower.contains("horizon") {
            if let Some(&horizon) = integers(line).first() {
                self.horizon = horizon;
            }
        } else if lower.contains("duedate") {
            match integers(&lower[lower.find("duedate").unwrap_or_default()..]).first() {
                Some(&deadline) => self.deadline = deadline,
                None => {
                    self.deadline_column = lower
                        .split_whitespace()
                        .position(|token| token.contains("duedate"));
                }
            }
        } else if let Some(column) = self.deadline_column {
            if let Some(values) = integer_tokens(line) {
                if let Some(&deadline) = values.get(column) {
                    self.deadline = deadline;
                }
                self.deadline_column = None;
            }
        }
    }

    fn precedence(&mut self, number: usize, line: &str) {
        if !line.split_whitespace().next().is_some_and(is_digits) {
            return;
        }

        let parts = integer_tokens(line).unwrap_or_default();
        let Some(&[job, _modes, count]) = parts.get(..3) else {
            return self.malformed(Section::Precedence, number, line);
        };
        let Some(successors) = usize::try_from(count)
            .ok()
            .and_then(|count| parts[3..].get(..count))
        else {
            return self.malformed(Section::Precedence, number, line);
        };
        let successors: Option<Vec<_>> = successors
            .iter()
            .map(|&id| TaskId::try_from(id).ok())
            .collect();

        match (TaskId::try_from(job), successors) {
            (Ok(job), Some(_)) if self.listed.contains(&job) => {
                self.warnings.push(Warning::DuplicateSuccessors {
                    task: job,
                    line: number,
                });
            }
            (Ok(job), Some(successors)) => {
                self.listed.push(job);
                self.precedence.insert(job, successors);
            }
            _ => self.malformed(Section::Precedence, number, line),
        }
    }

    fn durations(&mut self, number: usize, line: &str) {
        if !line.split_whitespace().next().is_some_and(is_digits) {
            let names = resource_names(line);
            if !names.is_empty() {
                self.demand_names = names;
            }
            return;
        }

        let parts = integer_tokens(line).unwrap_or_default();
        if parts.len() < 3 + self.demand_names.len() {
            return self.malformed(Section::Durations, number, line);
        }
        let Ok(id) = TaskId::try_from(parts[0]) else {
            return self.malformed(Section::Durations, number, line);
        };

        if self.tasks.contains_key(&id) {
            self.warnings.push(Warning::DuplicateTask {
                task: id,
                line: number,
            });
            return;
        }

        let duration = parts[2];
        let demand = self.demand_names.iter().cloned().zip(parts[3..].iter().copied());
        if duration == 0 {
            self.warnings.push(Warning::DummyTask { task: id });
        }
        self.tasks.insert(id, Task::new(id, duration, demand));
    }

    fn availability(&mut self, number: usize, line: &str) {
        let tokens: Vec<_> = line.split_whitespace().collect();

        if let &[name, quantity] = tokens.as_slice() {
            if !is_letters(name) && !is_digits(name) {
                match quantity.parse() {
                    Ok(capacity) => self.resources.push(Resource::new(name, capacity)),
                    Err(_) if line.starts_with('#') => {}
                    Err(_) => self.malformed(Section::Availability, number, line),
                }
                return;
            }
        }

        if let Some(values) = integer_tokens(line) {
            if values.len() == self.availability_names.len() {
                let names = std::mem::take(&mut self.availability_names);
                let resources = names.into_iter().zip(values);
                self.resources
                    .extend(resources.map(|(name, capacity)| Resource::new(name, capacity)));
            } else {
                self.malformed(Section::Availability, number, line);
            }
            return;
        }

        let names = resource_names(line);
        if !names.is_empty() {
            self.availability_names = names;
        } else if !line.starts_with('#') {
            self.malformed(Section::Availability, number, line);
        }
    }

    fn finish(mut self) -> Parsed {
        for section in [Section::Precedence, Section::Durations, Section::Availability] {
            if !self.seen.contains(&section) {
                self.warnings.push(Warning::MissingSection { section });
            }
        }

        let instance = Instance::new(
            self.horizon,
            self.deadline,
            self.resources,
            self.tasks.into_values().collect(),
            self.precedence.into(),
        );

        Parsed {
            instance,
            warnings: self.warnings,
        }
    }
}

/// Reads an instance in the sectioned benchmark format.
///
/// Both the `#Section` spelling and the classic `SECTION:` spelling with `R 1` style resource
/// names are understood. Lines that cannot be read, including lines that are not valid UTF-8,
/// are skipped and reported as warnings.
///
/// # Errors
/// - If the reader fails.
pub fn deserialize(reader: &mut impl BufRead) -> anyhow::Result<Parsed> {
    let mut state = Reader::default();

    let mut buffer = Vec::new();
    let mut number = 0;

    while reader.read_until(b'\n', &mut buffer)? > 0 {
        number += 1;
        match std::str::from_utf8(&buffer) {
            Ok(line) => state.read(number, line.trim()),
            Err(_) => {
                let section = state.section.unwrap_or(Section::General);
                let text = String::from_utf8_lossy(&buffer).trim().to_owned();
                state.malformed(section, number, &text);
            }
        }
        buffer.clear();
    }

    Ok(state.finish())
}
