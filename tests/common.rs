#![allow(dead_code)]

use plan_check::config::{DEFAULT_PLAN_DIR, DEFAULT_SCRIPTS_DIR, Layout};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fake PRD updater: writes prd.yaml from its flags.
pub const PRD_SCRIPT: &str = include_str!("fixtures/prd-update.sh");
/// Fake document updater: replaces its document with the `--input` file.
pub const DOCUMENT_SCRIPT: &str = include_str!("fixtures/document-update.sh");

pub struct TestRepo {
    temp: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let repo = Self { temp };

        repo.create_plan_file(
            "foundation/prd.yaml",
            "metadata:\n  product_name: Seed Product\n  project_code: SEED-001\noverview:\n  goals:\n    - Ship v1\n",
        );
        repo.create_plan_file(
            "foundation/personas.yaml",
            "primary_personas:\n  - id: P-01\n    name: Operator\n",
        );
        repo.create_plan_file(
            "foundation/strategy.yaml",
            "strategic_goals:\n  - id: SG-01\n    description: Grow\n",
        );
        repo.create_plan_file(
            "foundation/roadmap.yaml",
            "time_horizons:\n  short_term:\n    goals: [SG-01]\n    milestones: []\nrisks_assumptions: []\n",
        );
        repo.create_plan_file("notes/kickoff.md", "# Kickoff\n");

        repo.write_script("prd-update.sh", PRD_SCRIPT);
        for doc in ["personas", "strategy", "roadmap"] {
            repo.write_script(&format!("{doc}-update.sh"), DOCUMENT_SCRIPT);
        }
        repo
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn plan_dir(&self) -> PathBuf {
        self.root().join(DEFAULT_PLAN_DIR)
    }

    pub fn create_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    pub fn create_plan_file(&self, relative: &str, content: &str) -> PathBuf {
        self.create_file(&format!("{DEFAULT_PLAN_DIR}/{relative}"), content)
    }

    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        self.create_file(&format!("{DEFAULT_SCRIPTS_DIR}/{name}"), body)
    }

    pub fn layout(&self) -> Layout {
        Layout::from_root(self.root(), None).expect("Failed to resolve layout")
    }
}
