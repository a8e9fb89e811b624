use super::{BuilderError, DocumentBuilder, FOP_ENV_VAR, keep, output_file};
use crate::format::OutputFormat;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs the formatter as a child process once per document:
/// `<command> [extra args] -q -fo - -<format> <output file>`, with the
/// XSL-FO on stdin.
///
/// Output files are created in the temp directory and left for the caller.
#[derive(Debug, Clone)]
pub struct SubprocessBuilder {
    command: PathBuf,
    extra_args: Vec<String>,
    temp_dir: PathBuf,
}

impl SubprocessBuilder {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Uses `$FOP_CMD`, falling back to a `fop` executable on `PATH`.
    pub fn from_env() -> Result<Self, BuilderError> {
        match std::env::var_os(FOP_ENV_VAR) {
            Some(command) if !command.is_empty() => Ok(Self::new(command)),
            _ => find_on_path("fop")
                .map(Self::new)
                .ok_or(BuilderError::CommandNotFound),
        }
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }
}

impl DocumentBuilder for SubprocessBuilder {
    fn build(&self, xslfo: &[u8], format: OutputFormat) -> Result<PathBuf, BuilderError> {
        // Removed again on every early return below.
        let output = output_file(&self.temp_dir, format)?;
        let mut args = self.extra_args.clone();
        args.extend(["-q", "-fo", "-"].map(String::from));
        args.push(format!("-{}", format));
        args.push(output.path().to_string_lossy().into_owned());
        log::debug!("cmdline {} {:?}", self.command.display(), args);

        let spawn_error = |source: std::io::Error| BuilderError::Spawn {
            command: self.command.display().to_string(),
            source,
        };
        let mut child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdin = child.stdin.take();
        let (written, finished) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(xslfo),
                None => Ok(()),
            });
            let finished = child.wait_with_output();
            (writer.join(), finished)
        });
        let finished = finished.map_err(spawn_error)?;

        let stderr = String::from_utf8_lossy(&finished.stderr).into_owned();
        log::debug!("STDERR of fop command: {}", stderr);
        if !finished.status.success() {
            return Err(BuilderError::CommandFailed(stderr));
        }
        if let Ok(Err(e)) = written {
            log::warn!("Formatter exited before reading all input: {}", e);
        }
        keep(output)
    }
}

/// Looks `name` up in the directories of `PATH`.
fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
