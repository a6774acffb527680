use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{PadError, ToolFailure};
use crate::region::PaddingOperation;

/// Number of completed operations between progress log lines.
pub const PROGRESS_INTERVAL: usize = 25;

/// External program able to prepend silence to an audio file.
pub trait PaddingTool {
    /// Shell-style rendering of the command used for `op`.
    fn command_line(&self, op: &PaddingOperation) -> String;

    /// Produce `op.output_path` from `op.input_path`, blocking until done.
    fn pad(&self, op: &PaddingOperation) -> Result<(), ToolFailure>;
}

/// [`PaddingTool`] backed by the `sox` command line utility.
#[derive(Clone, Debug)]
pub struct Sox {
    program: PathBuf,
}

impl Sox {
    /// Use `program` without checking that it can be started.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `program` after confirming it runs.
    pub fn locate<P: Into<PathBuf>>(program: P) -> Result<Self, PadError> {
        let program = program.into();
        match Command::new(&program).arg("--version").output() {
            Ok(_) => Ok(Self { program }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(PadError::ToolNotFound { program })
            }
            Err(err) => Err(PadError::Io(err)),
        }
    }

    fn args(op: &PaddingOperation) -> [String; 4] {
        [
            op.input_path.display().to_string(),
            op.output_path.display().to_string(),
            "pad".to_owned(),
            format!("{}s", op.pad_samples),
        ]
    }
}

impl PaddingTool for Sox {
    fn command_line(&self, op: &PaddingOperation) -> String {
        let [input, output, effect, amount] = Self::args(op);
        format!(
            "{} \"{input}\" \"{output}\" {effect} {amount}",
            self.program.display()
        )
    }

    fn pad(&self, op: &PaddingOperation) -> Result<(), ToolFailure> {
        let output = Command::new(&self.program)
            .args(Self::args(op))
            .output()
            .map_err(|err| ToolFailure {
                status: "failed to start".to_owned(),
                stderr: err.to_string(),
            })?;
        check_status(&output)
    }
}

pub(crate) fn check_status(output: &Output) -> Result<(), ToolFailure> {
    if output.status.success() {
        return Ok(());
    }
    Err(ToolFailure {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    })
}

/// Bounded retry applied to each padding operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    /// Wait before the first retry; doubled after every further failure.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Progress notifications emitted by [`execute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Start { total: usize },
    Advance { completed: usize, total: usize },
    Finish,
}

/// Receiver of [`ProgressEvent`]s. All methods default to doing nothing.
pub trait ProgressReporter {
    fn on_event(&mut self, _event: ProgressEvent) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(ProgressEvent),
{
    fn on_event(&mut self, event: ProgressEvent) {
        self(event);
    }
}

/// Write one command line per operation without running anything.
pub fn emit_commands<T, W>(
    operations: &[PaddingOperation],
    tool: &T,
    mut writer: W,
) -> Result<(), PadError>
where
    T: PaddingTool + ?Sized,
    W: Write,
{
    for op in operations {
        writeln!(writer, "{}", tool.command_line(op))?;
    }
    writer.flush()?;
    Ok(())
}

/// Run every operation in order, stopping at the first one that keeps failing.
///
/// Files produced before the failure are left in place.
pub fn execute<T, P>(
    operations: &[PaddingOperation],
    tool: &T,
    retry: RetryPolicy,
    progress: &mut P,
) -> Result<(), PadError>
where
    T: PaddingTool + ?Sized,
    P: ProgressReporter + ?Sized,
{
    let total = operations.len();
    info!("running {total} padding commands...");
    progress.on_event(ProgressEvent::Start { total });

    for (index, op) in operations.iter().enumerate() {
        debug!("{}", tool.command_line(op));
        run_with_retry(tool, op, retry).map_err(|failure| PadError::OperationFailed {
            index,
            input: op.input_path.clone(),
            output: op.output_path.clone(),
            failure,
        })?;

        let completed = index + 1;
        if completed % PROGRESS_INTERVAL == 0 {
            info!("  {completed} of {total}");
        }
        progress.on_event(ProgressEvent::Advance { completed, total });
    }

    progress.on_event(ProgressEvent::Finish);
    Ok(())
}

fn run_with_retry<T>(
    tool: &T,
    op: &PaddingOperation,
    retry: RetryPolicy,
) -> Result<(), ToolFailure>
where
    T: PaddingTool + ?Sized,
{
    let mut delay = retry.delay;
    let mut attempt = 0;
    loop {
        match tool.pad(op) {
            Ok(()) => return Ok(()),
            Err(failure) if attempt < retry.retries => {
                attempt += 1;
                warn!(
                    "'{}' failed ({failure}), retry {attempt} of {} in {delay:?}",
                    op.output_path.display(),
                    retry.retries
                );
                thread::sleep(delay);
                delay = delay.saturating_mul(2);
            }
            Err(failure) => return Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn op(n: usize) -> PaddingOperation {
        PaddingOperation {
            input_path: PathBuf::from(format!("in/{n}.wav")),
            output_path: PathBuf::from(format!("out/{n}.wav")),
            pad_samples: n as i64 * 10,
        }
    }

    /// Fails every call listed in `failures` (0-based call counter).
    #[derive(Default)]
    struct ScriptedTool {
        failures: Vec<usize>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl PaddingTool for ScriptedTool {
        fn command_line(&self, op: &PaddingOperation) -> String {
            format!("pad {} {}", op.output_path.display(), op.pad_samples)
        }

        fn pad(&self, op: &PaddingOperation) -> Result<(), ToolFailure> {
            let mut calls = self.calls.borrow_mut();
            let call = calls.len();
            calls.push(op.output_path.clone());
            if self.failures.contains(&call) {
                return Err(ToolFailure {
                    status: "exit status: 2".to_owned(),
                    stderr: "boom".to_owned(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn sox_command_line_quotes_paths() {
        let sox = Sox::new("/usr/bin/sox");
        let op = PaddingOperation {
            input_path: PathBuf::from("/audio/Lead Vox.wav"),
            output_path: PathBuf::from("/out/(5)_0_Lead_Vox__LeadVox.wav"),
            pad_samples: -20,
        };
        assert_eq!(
            sox.command_line(&op),
            "/usr/bin/sox \"/audio/Lead Vox.wav\" \"/out/(5)_0_Lead_Vox__LeadVox.wav\" pad -20s"
        );
    }

    #[test]
    fn locate_reports_missing_program() {
        let err = Sox::locate("/definitely/not/here/sox").unwrap_err();
        assert!(matches!(err, PadError::ToolNotFound { .. }));
    }

    #[test]
    fn emit_writes_one_line_per_operation() {
        let tool = ScriptedTool::default();
        let mut out = Vec::new();
        emit_commands(&[op(1), op(2)], &tool, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "pad out/1.wav 10\npad out/2.wav 20\n");
        assert!(tool.calls.borrow().is_empty());
    }

    #[test]
    fn execute_runs_in_order_and_reports_progress() {
        let tool = ScriptedTool::default();
        let ops: Vec<_> = (0..30).map(op).collect();
        let mut events = Vec::new();

        let mut record = |event: ProgressEvent| events.push(event);
        execute(&ops, &tool, RetryPolicy::none(), &mut record).unwrap();

        let expected: Vec<_> = ops.iter().map(|op| op.output_path.clone()).collect();
        assert_eq!(*tool.calls.borrow(), expected);
        assert_eq!(events.first(), Some(&ProgressEvent::Start { total: 30 }));
        assert_eq!(
            events[25],
            ProgressEvent::Advance {
                completed: 25,
                total: 30
            }
        );
        assert_eq!(events.last(), Some(&ProgressEvent::Finish));
        assert_eq!(events.len(), 32);
    }

    #[test]
    fn execute_stops_at_first_failure() {
        let tool = ScriptedTool {
            failures: vec![1],
            ..ScriptedTool::default()
        };
        let ops: Vec<_> = (0..4).map(op).collect();
        struct Silent;
        impl ProgressReporter for Silent {}

        let err = execute(&ops, &tool, RetryPolicy::none(), &mut Silent).unwrap_err();

        match err {
            PadError::OperationFailed {
                index,
                output,
                failure,
                ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(output, PathBuf::from("out/1.wav"));
                assert_eq!(failure.stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tool.calls.borrow().len(), 2);
    }

    #[test]
    fn retry_recovers_from_transient_failure() {
        let tool = ScriptedTool {
            failures: vec![0, 1],
            ..ScriptedTool::default()
        };
        let retry = RetryPolicy {
            retries: 2,
            delay: Duration::from_millis(1),
        };
        let mut ignore = |_event: ProgressEvent| {};

        execute(&[op(0)], &tool, retry, &mut ignore).unwrap();
        assert_eq!(tool.calls.borrow().len(), 3);
    }

    #[test]
    fn retry_gives_up_after_budget() {
        let tool = ScriptedTool {
            failures: vec![0, 1, 2],
            ..ScriptedTool::default()
        };
        let retry = RetryPolicy {
            retries: 1,
            delay: Duration::from_millis(1),
        };
        let mut ignore = |_event: ProgressEvent| {};

        assert!(execute(&[op(0), op(1)], &tool, retry, &mut ignore).is_err());
        assert_eq!(tool.calls.borrow().len(), 2);
    }
}
