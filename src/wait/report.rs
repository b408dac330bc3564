//! Side-effect seams for the wait loop: reporting and sleeping.
//!
//! The loop never writes outputs or sleeps directly. It calls a `Reporter`
//! and a `Sleeper` it was constructed with, so tests can record both and run
//! without wall-clock delays.

use std::fs::OpenOptions;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the step output the loop sets.
pub const FORCE_CONTINUED_OUTPUT: &str = "force_continued";

/// Receives the loop's externally visible signals.
pub trait Reporter {
    /// Sets the `force_continued` output to `value` (`"1"` or `""`).
    fn set_marker(&self, value: &str);

    /// Emits an informational notice for the operator.
    fn notify(&self, message: &str);
}

/// Escapes a value for use as workflow command data.
///
/// The runner decodes `%25`, `%0D` and `%0A`; anything unescaped after the
/// first newline is lost.
pub fn escape_command_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Suspends the loop between poll ticks.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn set_marker(&self, value: &str) {
        (**self).set_marker(value)
    }

    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep(duration)
    }
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Reports to the GitHub Actions runner.
///
/// Outputs are appended to the `GITHUB_OUTPUT` file as `name=value` lines.
/// Runners too old to provide that file get the legacy `::set-output`
/// workflow command on stdout instead. Notices go to stdout, which the runner
/// shows in the step log.
#[derive(Debug, Clone, Default)]
pub struct ActionsReporter {
    output_path: Option<PathBuf>,
}

impl ActionsReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    fn write_output(&self, name: &str, value: &str) -> std::io::Result<()> {
        match &self.output_path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{}={}", name, value)
            }
            None => {
                println!(
                    "::set-output name={}::{}",
                    name,
                    escape_command_data(value)
                );
                Ok(())
            }
        }
    }
}

impl Reporter for ActionsReporter {
    fn set_marker(&self, value: &str) {
        tracing::debug!(output = FORCE_CONTINUED_OUTPUT, value, "Setting step output");
        if let Err(e) = self.write_output(FORCE_CONTINUED_OUTPUT, value) {
            // The runner treats a missing output as empty, which is only
            // wrong for the force-continue path.
            tracing::warn!(
                error = %e,
                path = ?self.output_path,
                value,
                "Failed to write step output"
            );
        }
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}
