//! `mhscore encoders`: print a persisted encoder set.
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use mhscore_pipeline::encoding::EncoderSet;

pub fn print_encoders<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let encoders = EncoderSet::load(path)
        .with_context(|| format!("Failed to load encoders: {:?}", path))?;

    writeln!(
        out,
        "Encoder set v{} created {} ({} columns)",
        encoders.version,
        encoders.created_at.to_rfc3339(),
        encoders.len()
    )?;
    for encoder in encoders.iter() {
        writeln!(out, "\nColumn: {}", encoder.column())?;
        for (code, label) in encoder.classes().iter().enumerate() {
            writeln!(out, "  {} -> {}", code, label)?;
        }
    }
    Ok(())
}
