//! Offline classification of local files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use foodlens_ai::{Pipeline, decode_rgb};
use tracing::warn;

/// Classify each file and print one line per success.
///
/// Every file is attempted; the command fails afterwards if any did.
pub fn run(pipeline: &Pipeline, images: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for path in images {
        match classify_file(pipeline, path) {
            Ok((label, score)) => println!("{}\t{label}\t{score:.4}", path.display()),
            Err(e) => {
                warn!(path = %path.display(), "{e:#}");
                eprintln!("{}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    anyhow::ensure!(failed == 0, "{failed} of {} images could not be classified", images.len());
    Ok(())
}

fn classify_file(pipeline: &Pipeline, path: &Path) -> anyhow::Result<(String, f32)> {
    let bytes = std::fs::read(path).context("reading image")?;
    let image = decode_rgb(&bytes)?;
    let c = pipeline.classify(&image)?;
    Ok((c.label.to_string(), c.score))
}
