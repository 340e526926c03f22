use crate::cases::CheckCase;
use crate::config::Layout;
use crate::error::{CheckError, Result};
use crate::fs_utils::TreeFingerprint;
use crate::snapshot::with_snapshot;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Summary {
    pub passed: Vec<&'static str>,
}

/// Runs one case inside its own snapshot of the plan directory.
pub fn run_case(layout: &Layout, case: &CheckCase) -> Result<()> {
    with_snapshot(layout.plan_dir(), |_| case.execute(layout))
}

/// Runs `cases` one after another, stopping at the first failure, then
/// checks that the plan directory ended up exactly as it started.
pub fn run_suite(layout: &Layout, cases: &[CheckCase]) -> Result<Summary> {
    let before = TreeFingerprint::capture(layout.plan_dir())?;
    debug!(entries = before.len(), "fingerprinted plan directory");

    println!(
        "{}",
        t!(
            "runner.header",
            count = cases.len(),
            plan_dir = layout.plan_dir().display().to_string()
        )
    );

    let mut summary = Summary::default();
    for (index, case) in cases.iter().enumerate() {
        println!(
            "{}",
            t!(
                "runner.case_start",
                index = index + 1,
                count = cases.len(),
                name = case.name
            )
        );
        if let Err(err) = run_case(layout, case) {
            println!("{}", t!("runner.case_fail", name = case.name));
            return Err(err);
        }
        println!("{}", t!("runner.case_pass", name = case.name));
        summary.passed.push(case.name);
    }

    let after = TreeFingerprint::capture(layout.plan_dir())?;
    let changed = before.diff(&after);
    if !changed.is_empty() {
        return Err(CheckError::Isolation { paths: changed });
    }

    println!("{}", t!("runner.summary", count = summary.passed.len()));
    Ok(summary)
}
