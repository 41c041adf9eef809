//! Per-component log files.
//!
//! Each component build writes a `<log_dir>/<component>.log` file holding
//! prdeps' own progress lines plus the raw output of every tool it ran.
//! Progress lines are mirrored to `tracing` so they also reach stdout.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::domain::error::Result;
use crate::process::{CommandOutput, CommandSpec};

/// An open per-component log file.
#[derive(Debug)]
pub struct ComponentLog {
    component: String,
    path: PathBuf,
    file: File,
}

impl ComponentLog {
    /// Create (or truncate) `<log_dir>/<component>.log`, creating `log_dir`
    /// if needed.
    pub fn create(log_dir: &Path, component: &str) -> Result<Self> {
        std::fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("{component}.log"));
        let file = File::create(&path)?;
        Ok(Self {
            component: component.to_string(),
            path,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, msg: &str) -> Result<()> {
        info!(component = %self.component, "{msg}");
        writeln!(self.file, "[info]: {msg}")?;
        Ok(())
    }

    pub fn error(&mut self, msg: &str) -> Result<()> {
        error!(component = %self.component, "{msg}");
        writeln!(self.file, "[error]: {msg}")?;
        Ok(())
    }

    /// Append a command line and its captured output.
    pub fn command(&mut self, spec: &CommandSpec, output: &CommandOutput) -> Result<()> {
        writeln!(self.file, "$ {spec}")?;
        if !output.stdout.is_empty() {
            self.file.write_all(output.stdout.as_bytes())?;
            if !output.stdout.ends_with('\n') {
                writeln!(self.file)?;
            }
        }
        if !output.stderr.is_empty() {
            self.file.write_all(output.stderr.as_bytes())?;
            if !output.stderr.ends_with('\n') {
                writeln!(self.file)?;
            }
        }
        self.file.flush()?;
        Ok(())
    }
}
