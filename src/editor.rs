use std::io::Write;

use anyhow::{Context, Result};

const DEFAULT_EDITOR: &str = "vi";

/// Open `$EDITOR` on a temp buffer seeded with `initial` and return the
/// saved text, trailing newline trimmed. Blocks until the editor exits.
pub fn compose(initial: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("lgtm-comment-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create comment buffer")?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| DEFAULT_EDITOR.to_string());
    let status = std::process::Command::new(&editor)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor `{editor}`"))?;
    if !status.success() {
        anyhow::bail!("editor `{editor}` exited with {status}");
    }

    // Some editors replace the file on save; read back by path, not handle.
    let text = std::fs::read_to_string(file.path())?;
    Ok(text.trim_end_matches('\n').to_string())
}
