use std::time::{Duration, Instant};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeds
    /// - `Err(BatchError::Step)` wrapping the error of the first failing step
    fn run(&self) -> JobResult<JobExecution>;
}

/// Represents the execution of a job.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// One execution per step, in run order
    pub steps: Vec<StepExecution>,
}

/// Represents an instance of a job, built with [`JobBuilder`].
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
}

impl JobInstance<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl Job for JobInstance<'_> {
    /// Runs the steps in sequence and stops at the first failing one.
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        let mut executions = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            match step.execute() {
                Ok(execution) => executions.push(execution),
                Err(err) => {
                    error!("End of job: {}, id: {}, failed", self.name, self.id);
                    return Err(BatchError::Step {
                        name: step.get_name().to_owned(),
                        source: Box::new(err),
                    });
                }
            }
        }

        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            steps: executions,
        })
    }
}

/// Builder for creating a job instance.
///
/// ```
/// use mailbox_filters::core::job::{Job, JobBuilder};
/// use mailbox_filters::core::step::StepBuilder;
/// use mailbox_filters::item::csv::{CsvItemReader, RuleProcessor};
/// use mailbox_filters::item::xml::FilterFeedWriter;
///
/// let reader = CsvItemReader::from_reader("deleted,,from,a@example.com,3\n".as_bytes());
/// let mut buffer = Vec::new();
/// {
///     let writer = FilterFeedWriter::from_writer(&mut buffer);
///     let step = StepBuilder::new()
///         .name("export")
///         .reader(&reader)
///         .processor(&RuleProcessor)
///         .writer(&writer)
///         .build()
///         .unwrap();
///
///     let job = JobBuilder::new().name("convert-filters").start(&step).build();
///     let execution = job.run().unwrap();
///     assert_eq!(execution.steps[0].write_count, 1);
/// }
///
/// assert!(String::from_utf8(buffer).unwrap().contains("<entry>"));
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> JobBuilder<'a> {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the first step of the job.
    ///
    /// Same as `next()`, reads better for the initial step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps run in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// If no name has been provided, a random name is generated.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
        }
    }
}
