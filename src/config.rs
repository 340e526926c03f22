use crate::error::{CheckError, Result};
use crate::path_utils::{resolve_against, validate_path_str};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_ROOT: &str = "PLAN_CHECK_ROOT";
pub const ENV_INTERPRETER: &str = "PLAN_CHECK_INTERPRETER";
/// Exported to every updater process so it edits the configured plan directory.
pub const ENV_PLAN_DIR: &str = "PLAN_CHECK_PLAN_DIR";
pub const CONFIG_FILE_NAME: &str = "plan-check.toml";
pub const DEFAULT_PLAN_DIR: &str = ".codex/product-plan";
pub const DEFAULT_SCRIPTS_DIR: &str = ".codex/scripts/plan";
pub const DEFAULT_INTERPRETER: &str = "bash";
pub const FOUNDATION_DIR: &str = "foundation";

/// Optional `plan-check.toml` at the repository root.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub plan_dir: Option<PathBuf>,
    pub scripts_dir: Option<PathBuf>,
    pub interpreter: Option<String>,
    #[serde(default)]
    pub scripts: ScriptNames,
}

/// `[scripts]` table: per-updater script file names inside `scripts_dir`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptNames {
    pub prd: Option<String>,
    pub personas: Option<String>,
    pub strategy: Option<String>,
    pub roadmap: Option<String>,
}

impl ScriptNames {
    pub fn get(&self, updater: &str) -> Option<&str> {
        match updater {
            "prd" => self.prd.as_deref(),
            "personas" => self.personas.as_deref(),
            "strategy" => self.strategy.as_deref(),
            "roadmap" => self.roadmap.as_deref(),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        for (key, name) in [
            ("prd", &self.prd),
            ("personas", &self.personas),
            ("strategy", &self.strategy),
            ("roadmap", &self.roadmap),
        ] {
            if let Some(name) = name {
                validate_path_str(name).map_err(|e| CheckError::Config {
                    message: format!("invalid scripts.{key}: {e}"),
                })?;
            }
        }
        Ok(())
    }
}

impl FileConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| CheckError::Config {
            message: format!("{}: {e}", path.display()),
        })
    }
}

/// Resolved repository layout: where the plan lives and how updaters are run.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    plan_dir: PathBuf,
    scripts_dir: PathBuf,
    script_names: ScriptNames,
    interpreter: String,
}

impl Layout {
    pub fn resolve(cli_root: Option<&Path>) -> Result<Self> {
        let env_root = env::var(ENV_ROOT).ok();
        let env_interpreter = env::var(ENV_INTERPRETER).ok();
        Self::resolve_with(cli_root, env_root.as_deref(), env_interpreter.as_deref())
    }

    pub fn resolve_with(
        cli_root: Option<&Path>,
        env_root: Option<&str>,
        env_interpreter: Option<&str>,
    ) -> Result<Self> {
        let root = resolve_root(cli_root, env_root)?;
        Self::from_root(&root, env_interpreter)
    }

    pub fn from_root(root: &Path, env_interpreter: Option<&str>) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| CheckError::Layout {
            message: format!("repository root {}: {e}", root.display()),
        })?;
        let file = FileConfig::load(&root)?;

        let plan_dir = existing_dir(
            &root,
            file.plan_dir.as_deref().unwrap_or(Path::new(DEFAULT_PLAN_DIR)),
            "plan_dir",
        )?;
        let scripts_dir = existing_dir(
            &root,
            file.scripts_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_SCRIPTS_DIR)),
            "scripts_dir",
        )?;

        file.scripts.validate()?;

        let interpreter = env_interpreter
            .map(str::to_string)
            .or(file.interpreter)
            .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string());
        if interpreter.trim().is_empty() {
            return Err(CheckError::Config {
                message: "interpreter cannot be empty".to_string(),
            });
        }

        Ok(Self {
            root,
            plan_dir,
            scripts_dir,
            script_names: file.scripts,
            interpreter,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plan_dir(&self) -> &Path {
        &self.plan_dir
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Script file name configured for `updater`, if `[scripts]` names one.
    pub fn script_name(&self, updater: &str) -> Option<&str> {
        self.script_names.get(updater)
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn foundation_dir(&self) -> PathBuf {
        self.plan_dir.join(FOUNDATION_DIR)
    }
}

fn resolve_root(cli_root: Option<&Path>, env_root: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = cli_root {
        validate_path_str(&path.to_string_lossy()).map_err(|e| CheckError::Config {
            message: format!("invalid --root: {e}"),
        })?;
        return Ok(path.to_path_buf());
    }

    if let Some(env_root) = env_root {
        validate_path_str(env_root).map_err(|e| CheckError::Config {
            message: format!("invalid {ENV_ROOT}: {e}"),
        })?;
        return Ok(PathBuf::from(env_root));
    }

    if let Some(root) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(discover_root))
    {
        return Ok(root);
    }

    Ok(env::current_dir()?)
}

/// Finds the nearest ancestor of `start` (inclusive) that looks like the
/// repository root: it has a `plan-check.toml`, or both a plan and a scripts
/// directory.
pub fn discover_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            dir.join(CONFIG_FILE_NAME).is_file()
                || (dir.join(DEFAULT_PLAN_DIR).is_dir() && dir.join(DEFAULT_SCRIPTS_DIR).is_dir())
        })
        .map(Path::to_path_buf)
}

fn existing_dir(root: &Path, configured: &Path, key: &str) -> Result<PathBuf> {
    validate_path_str(&configured.to_string_lossy()).map_err(|e| CheckError::Config {
        message: format!("invalid {key}: {e}"),
    })?;
    let dir = resolve_against(root, configured);
    if !dir.is_dir() {
        return Err(CheckError::Layout {
            message: format!("{key} is not a directory: {}", dir.display()),
        });
    }
    Ok(dir)
}
