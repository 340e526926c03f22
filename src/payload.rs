use crate::error::Result;
use serde::Serialize;
use std::ffi::OsString;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub const INPUT_FLAG: &str = "--input";

/// Input handed to an updater: inline flags, or a YAML document passed by path.
#[derive(Debug, Clone)]
pub enum Payload {
    Args(Vec<(String, String)>),
    Document(serde_yaml::Value),
}

impl Payload {
    pub fn args<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Payload::Args(
            pairs
                .into_iter()
                .map(|(flag, value)| (flag.into(), value.into()))
                .collect(),
        )
    }

    pub fn document<T: Serialize>(body: &T) -> Result<Self> {
        Ok(Payload::Document(serde_yaml::to_value(body)?))
    }

    /// Turns the payload into command-line arguments, writing document
    /// payloads to a temporary YAML file.
    pub fn prepare(&self) -> Result<PreparedPayload> {
        match self {
            Payload::Args(pairs) => Ok(PreparedPayload {
                args: pairs
                    .iter()
                    .flat_map(|(flag, value)| [OsString::from(flag), OsString::from(value)])
                    .collect(),
                file: None,
            }),
            Payload::Document(body) => {
                let mut file = tempfile::Builder::new()
                    .prefix("plan-check-payload-")
                    .suffix(".yaml")
                    .tempfile()?;
                serde_yaml::to_writer(file.as_file_mut(), body)?;
                debug!(path = %file.path().display(), "wrote payload file");
                Ok(PreparedPayload {
                    args: vec![
                        OsString::from(INPUT_FLAG),
                        file.path().as_os_str().to_os_string(),
                    ],
                    file: Some(file),
                })
            }
        }
    }
}

/// Arguments ready for an invocation, owning any temporary payload file.
#[derive(Debug)]
pub struct PreparedPayload {
    args: Vec<OsString>,
    file: Option<NamedTempFile>,
}

impl PreparedPayload {
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_ref().map(NamedTempFile::path)
    }

    /// Deletes the temporary payload file, if any.
    pub fn discard(self) -> Result<()> {
        if let Some(file) = self.file {
            let path = file.path().to_path_buf();
            file.close()?;
            debug!(path = %path.display(), "removed payload file");
        }
        Ok(())
    }
}
