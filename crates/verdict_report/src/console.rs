//! Human-readable console output.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use verdict::{Runner, Statistics, TestResult, Testcase, Testsuite};

use crate::Reporter;

/// Destination of the report; only the terminal stream takes colors.
enum Sink {
    Terminal(StandardStream),
    Plain(Box<dyn Write + Send>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Terminal(stream) => stream,
            Sink::Plain(writer) => writer,
        }
    }

    fn styled(&mut self, spec: &ColorSpec, text: &str) -> io::Result<()> {
        match self {
            Sink::Terminal(stream) => {
                stream.set_color(spec)?;
                write!(stream, "{text}")?;
                stream.reset()
            }
            Sink::Plain(writer) => write!(writer, "{text}"),
        }
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        write!(self.writer(), "{text}")
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.writer(), "{text}")
    }
}

fn result_label(result: TestResult) -> (&'static str, Option<Color>) {
    match result {
        TestResult::Passed => ("PASS", Some(Color::Green)),
        TestResult::Failed => ("FAIL", Some(Color::Red)),
        TestResult::Errored => ("ERROR", Some(Color::Magenta)),
        TestResult::Undone => ("UNDONE", None),
    }
}

/// Prints one line per testcase followed by a summary.
///
/// ```text
/// math (sequential)
///   PASS   add (0.012ms)
///   FAIL   compare (0.020ms)
///          Expected 1 to be greater than 3 [tests/math.rs:14]
///
/// 2 tests, 1 passed, 1 failed, 0 errors in 0.032ms
/// ```
pub struct ConsoleReporter {
    sink: Sink,
    verbose: bool,
}

impl ConsoleReporter {
    /// Reports to stdout with the given color choice.
    pub fn stdout(choice: ColorChoice) -> Self {
        Self {
            sink: Sink::Terminal(StandardStream::stdout(choice)),
            verbose: false,
        }
    }

    /// Reports to an arbitrary writer, without colors.
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Sink::Plain(writer),
            verbose: false,
        }
    }

    /// Also print each testcase's captured output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn suite(&mut self, suite: &Testsuite) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Cyan)).set_bold(true);
        self.sink.styled(&spec, suite.name())?;
        self.sink.line(&format!(" ({})", suite.strategy()))?;

        for case in suite.testcases() {
            self.case(case)?;
        }
        Ok(())
    }

    fn case(&mut self, case: &Testcase) -> io::Result<()> {
        let (label, color) = result_label(case.result());
        self.sink.text("  ")?;
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(color.is_some());
        self.sink.styled(&spec, &format!("{label:<6}"))?;
        self.sink
            .line(&format!(" {} ({:.3}ms)", case.name(), case.duration_ms()))?;

        if !case.reason().is_empty() {
            let line = match case.location() {
                Some(location) => format!("         {} [{location}]", case.reason()),
                None => format!("         {}", case.reason()),
            };
            self.sink.line(&line)?;
        }

        if self.verbose {
            for (stream, text) in [("stdout", case.cout()), ("stderr", case.cerr())] {
                for line in text.lines() {
                    self.sink.line(&format!("         {stream}| {line}"))?;
                }
            }
        }
        Ok(())
    }

    fn summary(&mut self, totals: &Statistics) -> io::Result<()> {
        let line = format!(
            "{} tests, {} passed, {} failed, {} errors in {:.3}ms",
            totals.tests(),
            totals.successes(),
            totals.failures(),
            totals.errors(),
            totals.elapsed_ms()
        );
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(if totals.is_success() {
            Color::Green
        } else {
            Color::Red
        }))
        .set_bold(true);
        self.sink.line("")?;
        self.sink.styled(&spec, &line)?;
        self.sink.line("")
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, runner: &Runner) -> io::Result<()> {
        for suite in runner.testsuites() {
            self.suite(suite)?;
        }
        self.summary(&runner.totals())?;
        self.sink.writer().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cover_every_result() {
        assert_eq!(result_label(TestResult::Passed).0, "PASS");
        assert_eq!(result_label(TestResult::Failed).0, "FAIL");
        assert_eq!(result_label(TestResult::Errored).0, "ERROR");
        assert_eq!(result_label(TestResult::Undone), ("UNDONE", None));
    }
}
