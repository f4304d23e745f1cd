use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Largest question accepted by `coach ask`.
pub const MAX_QUESTION_BYTES: usize = 64 * 1024;

/// Where a one-shot question comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionSource {
    /// Given on the command line, used as typed.
    Inline(String),
    /// Read from a file; surrounding whitespace is dropped.
    File(PathBuf),
    /// Read from stdin until EOF; surrounding whitespace is dropped.
    Stdin,
}

impl QuestionSource {
    /// Picks the source from the `ask` arguments. Inline text wins over a file.
    pub fn from_args(text: Option<String>, file: Option<String>) -> Self {
        match (text, file) {
            (Some(text), _) => Self::Inline(text),
            (None, Some(path)) => Self::File(PathBuf::from(path)),
            (None, None) => Self::Stdin,
        }
    }

    /// Reads the question, rejecting blank input.
    pub fn read(&self) -> Result<String> {
        let question = match self {
            Self::Inline(text) => text.clone(),
            Self::File(path) => read_file(path)?.trim().to_string(),
            Self::Stdin => read_capped(io::stdin().lock(), "stdin")?.trim().to_string(),
        };

        if question.trim().is_empty() {
            bail!("Nothing to ask: the question is empty");
        }
        Ok(question)
    }
}

fn read_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open question file: {}", path.display()))?;
    read_capped(file, &path.display().to_string())
}

fn read_capped(reader: impl Read, origin: &str) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_QUESTION_BYTES as u64 + 1)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read question from {origin}"))?;

    if bytes.len() > MAX_QUESTION_BYTES {
        bail!(
            "Question from {origin} is longer than {} KB; ask something shorter",
            MAX_QUESTION_BYTES / 1024
        );
    }

    String::from_utf8(bytes).with_context(|| format!("Question from {origin} is not valid UTF-8"))
}
