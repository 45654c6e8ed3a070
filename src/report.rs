use std::io::ErrorKind;

use coloringbook::{ENV_BATIK_PATH, ENV_VTRACER_PATH, OutlineError, Stage};

pub fn report_error(err: &OutlineError) {
    eprintln!("{err}");

    match (err.stage(), err.root()) {
        (Some(Stage::Trace), OutlineError::ToolSpawn { program, source })
            if source.kind() == ErrorKind::NotFound =>
        {
            eprintln!();
            eprintln!("The vectorizer `{program}` could not be found.");
            eprintln!("  - Install vtracer (`cargo install vtracer`)");
            eprintln!("  - Or pass --vtracer-path <path>, or set {ENV_VTRACER_PATH}");
            #[cfg(feature = "vectorizer-vtracer")]
            eprintln!("  - Or use --trace-engine embedded");
        }
        (Some(Stage::Rasterize), OutlineError::ToolSpawn { program, source })
            if source.kind() == ErrorKind::NotFound =>
        {
            eprintln!();
            eprintln!("The Java launcher `{program}` could not be found.");
            eprintln!("  - Pass --java <path>, or use --rasterizer native");
        }
        (Some(Stage::Rasterize), OutlineError::ToolFailed { .. }) => {
            eprintln!();
            eprintln!("Check that the Batik jar exists: pass --batik-path <path> or set {ENV_BATIK_PATH}");
        }
        _ => {}
    }
}
