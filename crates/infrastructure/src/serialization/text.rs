//! Plain-text suite summary for terminals and CI logs.

use std::fmt;

use covenant_domain::{ScenarioReport, SuiteReport};

/// Renders a suite report as text.
///
/// One line per scenario; failed scenarios get their failure kind, mode,
/// message and diff indented underneath. A totals line closes the report.
#[must_use]
pub fn render_text(report: &SuiteReport) -> String {
    TextReport(report).to_string()
}

struct TextReport<'a>(&'a SuiteReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(
            f,
            "Suite: profile '{}', dataset '{}'",
            report.profile, report.dataset
        )?;
        writeln!(f)?;

        for scenario in &report.scenarios {
            write_scenario(f, scenario)?;
        }

        if !report.scenarios.is_empty() {
            writeln!(f)?;
        }
        writeln!(
            f,
            "{} scenarios: {} passed, {} failed ({:.1}%) in {} ms",
            report.total,
            report.passed,
            report.failed,
            report.pass_rate(),
            report.duration_ms
        )
    }
}

fn write_scenario(f: &mut fmt::Formatter<'_>, scenario: &ScenarioReport) -> fmt::Result {
    let label = if scenario.is_passed() { "PASS" } else { "FAIL" };
    writeln!(
        f,
        "  {label}  {} ({} ms)",
        scenario.name, scenario.duration_ms
    )?;

    let Some(failure) = &scenario.failure else {
        return Ok(());
    };
    match &failure.mode {
        Some(mode) => writeln!(f, "        {} [{mode}]: {}", failure.kind, failure.message)?,
        None => writeln!(f, "        {}: {}", failure.kind, failure.message)?,
    }
    if let Some(diff) = &failure.diff {
        writeln!(f, "        path:     {}", diff.path)?;
        writeln!(f, "        expected: {}", diff.expected)?;
        writeln!(f, "        actual:   {}", diff.actual)?;
    }
    Ok(())
}
