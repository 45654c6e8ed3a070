use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::TraceOptions;
use crate::process::{CancelToken, run_tool};
use crate::{OutlineError, OutlineResult};

use super::Vectorizer;

/// Runs the `vtracer` command-line tool.
#[derive(Debug, Clone)]
pub struct VtracerCommand {
    program: PathBuf,
}

impl Default for VtracerCommand {
    fn default() -> Self {
        Self::new("vtracer")
    }
}

impl VtracerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command line for one trace.
    pub fn command(&self, input: &Path, output: &Path, options: &TraceOptions) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("--color_precision")
            .arg(options.color_precision.to_string())
            .arg("--filter_speckle")
            .arg(options.filter_speckle.to_string());
        cmd
    }
}

impl Vectorizer for VtracerCommand {
    fn vectorize(
        &self,
        input: &Path,
        output: &Path,
        options: &TraceOptions,
        cancel: &CancelToken,
    ) -> OutlineResult<()> {
        run_tool(&mut self.command(input, output, options), cancel)?;

        // The output path may already exist as an empty placeholder.
        let written = fs::metadata(output).map(|m| m.len() > 0).unwrap_or(false);
        if !written {
            return Err(OutlineError::MissingOutput {
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_carries_both_tunables() {
        let tracer = VtracerCommand::new("/opt/bin/vtracer");
        let options = TraceOptions::default()
            .with_color_precision(7)
            .with_filter_speckle(3);
        let cmd = tracer.command(Path::new("in.png"), Path::new("out.svg"), &options);

        assert_eq!(cmd.get_program(), "/opt/bin/vtracer");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-i",
                "in.png",
                "-o",
                "out.svg",
                "--color_precision",
                "7",
                "--filter_speckle",
                "3"
            ]
        );
    }

    #[test]
    fn default_program_is_vtracer() {
        assert_eq!(VtracerCommand::default().program(), Path::new("vtracer"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = VtracerCommand::new("false")
            .vectorize(
                &dir.path().join("in.png"),
                &dir.path().join("out.svg"),
                &TraceOptions::default(),
                &CancelToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, OutlineError::ToolFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn success_without_output_is_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.svg");
        fs::write(&output, b"").unwrap();
        let err = VtracerCommand::new("true")
            .vectorize(
                &dir.path().join("in.png"),
                &output,
                &TraceOptions::default(),
                &CancelToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, OutlineError::MissingOutput { path } if path == output));
    }
}
