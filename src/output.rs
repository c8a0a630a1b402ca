use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;
use tempfile::Builder;

use crate::error::KiraError;
use crate::html::render_page;
use crate::render::Fragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_fragments(fragments: &[Fragment]) -> io::Result<()> {
        Self::print_json(&fragments)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct HtmlOutput;

impl HtmlOutput {
    /// Writes the page next to its destination first, then renames it in place.
    pub fn write(path: &Utf8Path, fragments: &[Fragment]) -> Result<(), KiraError> {
        let page = render_page(fragments);
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        std::fs::create_dir_all(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let mut tmp = Builder::new()
            .prefix(".kira-sv-")
            .suffix(".html")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        tmp.write_all(page.as_bytes())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        tmp.persist(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        tracing::debug!(path = %path, bytes = page.len(), "html.export");
        Ok(())
    }
}
