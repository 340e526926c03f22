use crate::config::{CONFIG_FILE_NAME, DEFAULT_PLAN_DIR, DEFAULT_SCRIPTS_DIR, Layout};
use std::collections::HashMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Holds the env lock and puts changed variables back on drop.
#[must_use]
pub struct TestProcess {
    _lock: MutexGuard<'static, ()>,
    original_vars: HashMap<OsString, Option<OsString>>,
}

impl TestProcess {
    pub fn new() -> Self {
        Self {
            _lock: lock_env(),
            original_vars: HashMap::new(),
        }
    }

    pub fn set_var(&mut self, key: impl Into<OsString>, value: impl AsRef<OsStr>) {
        let key = key.into();
        if !self.original_vars.contains_key(&key) {
            self.original_vars.insert(key.clone(), env::var_os(&key));
        }
        unsafe {
            env::set_var(&key, value);
        }
    }
}

impl Drop for TestProcess {
    fn drop(&mut self) {
        for (key, previous) in self.original_vars.drain() {
            if let Some(value) = previous {
                unsafe {
                    env::set_var(&key, value);
                }
            } else {
                unsafe {
                    env::remove_var(&key);
                }
            }
        }
    }
}

const PRD_SCRIPT: &str = include_str!("../tests/fixtures/prd-update.sh");
const DOCUMENT_SCRIPT: &str = include_str!("../tests/fixtures/document-update.sh");

/// A scratch repository in the default layout, with a seeded plan directory
/// and shell-script updaters.
pub struct FakeRepo {
    temp: TempDir,
}

impl FakeRepo {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path();
        let plan = root.join(DEFAULT_PLAN_DIR);
        let foundation = plan.join("foundation");
        fs::create_dir_all(&foundation).expect("mkdir foundation");
        fs::create_dir_all(root.join(DEFAULT_SCRIPTS_DIR)).expect("mkdir scripts");

        fs::write(
            foundation.join("prd.yaml"),
            "metadata:\n  product_name: Seed Product\noverview:\n  goals:\n    - Existing\n",
        )
        .expect("seed prd");
        fs::write(
            foundation.join("personas.yaml"),
            "primary_personas:\n  - id: P-01\n    name: Seed\n",
        )
        .expect("seed personas");
        fs::write(plan.join("README.md"), "seed plan\n").expect("seed readme");

        let repo = Self { temp };
        repo.write_script("prd-update.sh", PRD_SCRIPT);
        for doc in ["personas", "strategy", "roadmap"] {
            repo.write_script(&format!("{doc}-update.sh"), DOCUMENT_SCRIPT);
        }
        repo
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_script(&self, name: &str, body: &str) {
        fs::write(self.root().join(DEFAULT_SCRIPTS_DIR).join(name), body)
            .expect("write script");
    }

    pub fn write_config(&self, body: &str) {
        fs::write(self.root().join(CONFIG_FILE_NAME), body).expect("write config");
    }

    pub fn layout(&self) -> Layout {
        Layout::from_root(self.root(), None).expect("layout")
    }
}
