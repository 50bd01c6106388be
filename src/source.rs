use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use elsa::FrozenVec;
use serde::Serialize;

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(NonZeroUsize);

/// Owns the text of every loaded file. Source files borrow from it for as long as it lives.
#[derive(Default)]
pub struct SourceBuffer(FrozenVec<String>);

impl SourceBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The set of files taking part in a compilation.
pub struct Source<'buf> {
    buf: &'buf SourceBuffer,
    files: Vec<SourceFile<'buf>>,
}

#[derive(Debug)]
pub struct SourceFile<'buf> {
    id: SourceId,
    path: PathBuf,
    text: &'buf str,
}

impl<'buf> Source<'buf> {
    pub fn new(buf: &'buf mut SourceBuffer) -> Self {
        // the exclusive borrow keeps indices in the buffer in step with `files`
        Self {
            buf: &*buf,
            files: Vec::new(),
        }
    }

    pub fn load_from_string(&mut self, path: PathBuf, text: String) -> SourceId {
        let idx = self.files.len();
        let id = SourceId(NonZeroUsize::MIN.saturating_add(idx));

        self.buf.0.push(text);
        let text: &'buf str = &self.buf.0[idx];
        self.files.push(SourceFile { id, path, text });

        id
    }

    pub fn load(&mut self, path: PathBuf) -> io::Result<SourceId> {
        let text = fs::read_to_string(&path)?;

        Ok(self.load_from_string(path, text))
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile<'buf>> {
        self.files.get(usize::from(id.0) - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile<'buf>> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'buf> SourceFile<'buf> {
    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &'buf str {
        self.text
    }

    /// Returns the text of a 1-based line without its line break.
    ///
    /// Lines end the same way positions count them: at `\r\n`, `\n`, or a lone `\r`.
    pub fn line(&self, line: usize) -> Option<&'buf str> {
        if line == 0 {
            return None;
        }

        let mut rest = self.text;

        for _ in 1..line {
            let idx = rest.find(is_line_break)?;
            let len = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
            rest = &rest[idx + len..];
        }

        let end = rest.find(is_line_break).unwrap_or(rest.len());

        Some(&rest[..end])
    }
}
