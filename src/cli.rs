use crate::cases;
use crate::config::Layout;
use crate::logging;
use crate::runner::run_suite;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root holding the plan and scripts directories
    /// (default: $PLAN_CHECK_ROOT, else found from the executable's location)
    #[arg(short = 'C', long = "root")]
    pub root: Option<PathBuf>,

    /// Only run the named check case (repeatable); cases still run in fixed order
    #[arg(long = "case", value_name = "NAME")]
    pub cases: Vec<String>,

    /// List the check cases and exit
    #[arg(long)]
    pub list: bool,

    /// Verbose diagnostics on stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run_with(&cli)
}

pub fn run_with(cli: &Cli) -> Result<()> {
    if cli.list {
        for case in cases::all() {
            println!("{}", case.name);
        }
        return Ok(());
    }

    let selected = cases::select(&cli.cases)?;
    let layout = Layout::resolve(cli.root.as_deref())?;
    run_suite(&layout, &selected).with_context(|| {
        format!(
            "plan checks failed for {}",
            layout.plan_dir().display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::test_utils::FakeRepo;

    #[test]
    fn test_no_arguments_runs_everything() {
        let cli = Cli::try_parse_from(["plan-check"]).unwrap();
        assert!(cli.root.is_none());
        assert!(cli.cases.is_empty());
        assert!(!cli.list);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "plan-check",
            "-C",
            "/repo",
            "--case",
            "prd",
            "--case",
            "roadmap",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/repo")));
        assert_eq!(cli.cases, ["prd", "roadmap"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_run_with_fake_repo() {
        let repo = FakeRepo::new();
        let cli = Cli::try_parse_from([
            "plan-check".into(),
            "--root".into(),
            repo.root().as_os_str().to_os_string(),
        ])
        .unwrap();
        run_with(&cli).unwrap();
    }

    #[test]
    fn test_unknown_case_is_rejected_before_running() {
        let cli = Cli::try_parse_from(["plan-check", "--case", "budget", "--root", "/nonexistent"])
            .unwrap();
        let err = run_with(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::UnknownCase { .. })
        ));
    }

    #[test]
    fn test_failure_keeps_typed_error() {
        let repo = FakeRepo::new();
        repo.write_script("prd-update.sh", "exit 4\n");
        let cli = Cli::try_parse_from([
            "plan-check".into(),
            "--root".into(),
            repo.root().as_os_str().to_os_string(),
            "--case".into(),
            "prd".into(),
        ])
        .unwrap();

        let err = run_with(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::Invocation { .. })
        ));
    }
}
