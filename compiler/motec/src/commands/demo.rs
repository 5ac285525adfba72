//! `mote demo`: run the fixture scenarios.

use mote_eval::{EvalError, Interpreter, RuntimeConfig};

use crate::fixtures::{install, scenarios};

#[derive(Clone, Debug, Default)]
pub struct DemoOptions {
    pub config: RuntimeConfig,
    /// Only scenarios whose name contains this.
    pub filter: Option<String>,
}

/// Result of one scenario, rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub summary: &'static str,
    /// Inspected value, or the error report.
    pub result: Result<String, String>,
}

/// Run the selected scenarios, each in a fresh interpreter.
///
/// Fails only if the fixture world itself cannot be installed.
pub fn demo_outcomes(options: &DemoOptions) -> Result<Vec<ScenarioOutcome>, EvalError> {
    let selected = scenarios().iter().filter(|scenario| {
        options
            .filter
            .as_deref()
            .is_none_or(|filter| scenario.name.contains(filter))
    });

    let mut outcomes = Vec::new();
    for scenario in selected {
        let mut interp = Interpreter::builder().config(options.config.clone()).build();
        let world = install(&mut interp).map_err(mote_eval::ControlAction::into_eval_error)?;
        let result = match scenario.run(&mut interp, &world) {
            Ok(value) => Ok(interp.inspect(&value)),
            Err(err) => Err(err.report()),
        };
        outcomes.push(ScenarioOutcome {
            name: scenario.name,
            summary: scenario.summary,
            result,
        });
    }
    Ok(outcomes)
}

/// Print every outcome. Exit code 1 if any scenario failed.
pub fn run_demo(options: &DemoOptions) -> i32 {
    let outcomes = match demo_outcomes(options) {
        Ok(outcomes) => outcomes,
        Err(err) => {
            eprintln!("error: fixture world failed to install: {}", err.report());
            return 1;
        }
    };
    if outcomes.is_empty() {
        eprintln!("no scenarios match the filter");
        return 1;
    }

    let mut failed = 0;
    for outcome in &outcomes {
        println!("{} ({})", outcome.name, outcome.summary);
        match &outcome.result {
            Ok(value) => println!("  => {value}"),
            Err(report) => {
                failed += 1;
                println!("  !! {report}");
            }
        }
    }
    println!();
    println!("{} scenarios, {failed} failed", outcomes.len());
    i32::from(failed > 0)
}
