use crate::error::{Bm25Error, Result};
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Immutable corpus text plus the byte offset at which every line starts.
///
/// `offsets` always begins with 0 and ends with the buffer length, so line `i`
/// occupies `offsets[i]..offsets[i + 1]` (terminating newline included).
#[derive(Debug, Clone)]
pub struct CorpusBuffer {
    text: String,
    offsets: Vec<usize>,
}

impl CorpusBuffer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let text = String::from_utf8(bytes)
            .map_err(|e| Bm25Error::InvalidUtf8 { offset: e.utf8_error().valid_up_to() })?;
        Ok(Self::from_string(text))
    }

    pub fn from_string(text: String) -> Self {
        let mut offsets = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                offsets.push(i + 1);
            }
        }
        // final line without a trailing newline
        if offsets.last() != Some(&text.len()) {
            offsets.push(text.len());
        }
        Self { text, offsets }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        Self::from_string(text)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::read_all(reader, PathBuf::from("<reader>"))
    }

    /// Load a corpus file. A missing or unreadable file is fatal.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|source| Bm25Error::CorpusUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::read_all(f, path.to_path_buf())?;
        tracing::debug!(path = %path.display(), bytes = corpus.len(), lines = corpus.line_count(), "loaded corpus");
        Ok(corpus)
    }

    fn read_all<R: Read>(mut reader: R, path: PathBuf) -> Result<Self> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|source| Bm25Error::CorpusUnreadable { path, source })?;
        Self::from_bytes(buf)
    }

    pub fn as_str(&self) -> &str { &self.text }
    pub fn as_bytes(&self) -> &[u8] { self.text.as_bytes() }
    pub fn len(&self) -> usize { self.text.len() }
    pub fn is_empty(&self) -> bool { self.text.is_empty() }
    pub fn offsets(&self) -> &[usize] { &self.offsets }

    pub fn line_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Byte span covered by the lines `lines.start..lines.end`.
    pub fn byte_range(&self, lines: Range<usize>) -> Range<usize> {
        self.offsets[lines.start]..self.offsets[lines.end]
    }

    /// Text of line `i` without its trailing newline.
    pub fn line(&self, i: usize) -> Option<&str> {
        if i >= self.line_count() {
            return None;
        }
        let line = &self.text[self.byte_range(i..i + 1)];
        Some(line.strip_suffix('\n').unwrap_or(line))
    }
}
