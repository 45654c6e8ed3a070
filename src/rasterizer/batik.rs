use std::path::{Path, PathBuf};
use std::process::Command;

use image::RgbaImage;

use crate::process::{CancelToken, run_tool};
use crate::temp::SiblingFile;
use crate::{OutlineError, OutlineResult};

use super::Rasterizer;

/// Runs the Batik rasterizer jar through `java -jar`.
///
/// Batik has no option for the output name; it writes a PNG next to the SVG,
/// which is read back and removed.
#[derive(Debug, Clone)]
pub struct BatikRasterizer {
    java: PathBuf,
    jar: PathBuf,
}

impl BatikRasterizer {
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: jar.into(),
        }
    }

    /// Use a specific Java launcher instead of `java` from `PATH`.
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    pub fn command(&self, svg: &Path) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar").arg(&self.jar).arg(svg);
        cmd
    }
}

impl Rasterizer for BatikRasterizer {
    fn rasterize(&self, svg: &Path, cancel: &CancelToken) -> OutlineResult<RgbaImage> {
        let png = SiblingFile::of(svg, "png");
        run_tool(&mut self.command(svg), cancel)?;

        if !png.path().is_file() {
            return Err(OutlineError::MissingOutput {
                path: png.path().to_path_buf(),
            });
        }
        let image = image::open(png.path()).map_err(|e| OutlineError::Decode {
            artifact: format!("rasterized PNG {}", png.path().display()),
            message: e.to_string(),
        })?;
        Ok(image.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_runs_jar_on_svg() {
        let batik = BatikRasterizer::new("/opt/batik.jar").with_java("/usr/bin/java");
        let cmd = batik.command(Path::new("/tmp/vtrace.1.svg"));
        assert_eq!(cmd.get_program(), "/usr/bin/java");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-jar", "/opt/batik.jar", "/tmp/vtrace.1.svg"]);
    }

    #[cfg(unix)]
    #[test]
    fn success_without_png_is_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("in.svg");
        let err = BatikRasterizer::new("batik.jar")
            .with_java("true")
            .rasterize(&svg, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, OutlineError::MissingOutput { path } if path == dir.path().join("in.png")));
    }

    #[cfg(unix)]
    #[test]
    fn failing_launcher_is_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = BatikRasterizer::new("batik.jar")
            .with_java("false")
            .rasterize(&dir.path().join("in.svg"), &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, OutlineError::ToolFailed { .. }));
    }
}
