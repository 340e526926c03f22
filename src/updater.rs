use crate::config::{ENV_PLAN_DIR, Layout};
use crate::error::{CheckError, Result};
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

const STDERR_LIMIT: usize = 4_000;

/// The external scripts that each rewrite one plan document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Updater {
    Prd,
    Personas,
    Strategy,
    Roadmap,
}

impl Updater {
    pub fn name(self) -> &'static str {
        match self {
            Updater::Prd => "prd",
            Updater::Personas => "personas",
            Updater::Strategy => "strategy",
            Updater::Roadmap => "roadmap",
        }
    }

    /// Script file name used when `[scripts]` in the config does not name one.
    pub fn default_script_name(self) -> &'static str {
        match self {
            Updater::Prd => "prd-update.sh",
            Updater::Personas => "personas-update.sh",
            Updater::Strategy => "strategy-update.sh",
            Updater::Roadmap => "roadmap-update.sh",
        }
    }

    pub fn script_path(self, layout: &Layout) -> PathBuf {
        let name = layout
            .script_name(self.name())
            .unwrap_or(self.default_script_name());
        layout.scripts_dir().join(name)
    }

    /// File name of the document this updater writes, under `foundation/`.
    pub fn output_file(self) -> &'static str {
        match self {
            Updater::Prd => "prd.yaml",
            Updater::Personas => "personas.yaml",
            Updater::Strategy => "strategy.yaml",
            Updater::Roadmap => "roadmap.yaml",
        }
    }

    pub fn output_path(self, layout: &Layout) -> PathBuf {
        layout.foundation_dir().join(self.output_file())
    }

    /// Runs the updater to completion. Anything but a zero exit is an error.
    ///
    /// The updater's stdout goes straight to ours. Its stderr is echoed as it
    /// arrives and also kept, so a failure can quote it.
    pub fn invoke(self, layout: &Layout, args: &[OsString]) -> Result<()> {
        let script = self.script_path(layout);
        let mut cmd = Command::new(layout.interpreter());
        cmd.arg(&script)
            .args(args)
            .env(ENV_PLAN_DIR, layout.plan_dir())
            .current_dir(layout.root())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());

        debug!(updater = self.name(), command = ?cmd, "invoking updater");

        let mut child = cmd.spawn().map_err(|err| CheckError::Invocation {
            updater: self.name().to_string(),
            status: format!("could not start `{}`", layout.interpreter()),
            stderr: err.to_string(),
        })?;

        let mut stderr = Vec::new();
        let teed = match child.stderr.take() {
            Some(pipe) => tee(pipe, io::stderr(), &mut stderr),
            None => Ok(()),
        };
        let status = child.wait()?;
        teed?;

        debug!(updater = self.name(), status = %status, "updater finished");

        if !status.success() {
            return Err(CheckError::Invocation {
                updater: self.name().to_string(),
                status: describe_status(status),
                stderr: truncate_lossy(&stderr, STDERR_LIMIT),
            });
        }

        Ok(())
    }
}

/// Copies `reader` to `sink` until EOF, keeping a copy of every byte in `kept`.
/// Once `sink` fails it is skipped; `reader` is still drained so the child
/// never blocks on a full pipe.
fn tee(mut reader: impl Read, mut sink: impl Write, kept: &mut Vec<u8>) -> io::Result<()> {
    let mut buf = [0u8; 8 * 1024];
    let mut forward = true;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        kept.extend_from_slice(&buf[..n]);
        if forward && sink.write_all(&buf[..n]).is_err() {
            forward = false;
        }
    }
    if forward {
        let _ = sink.flush();
    }
    Ok(())
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => status.to_string(),
    }
}

fn truncate_lossy(bytes: &[u8], max_len: usize) -> String {
    let mut s = String::from_utf8_lossy(bytes).trim().to_string();
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("\n…(truncated)");
    }
    s
}
