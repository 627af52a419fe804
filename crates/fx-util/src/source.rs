//! Registry of loaded source files.
//!
//! The [`SourceMap`] owns every piece of source text the session has seen:
//! the entry file or REPL line plus any modules loaded during evaluation.
//! Error rendering resolves a [`FileId`] back to its name and text here.

use crate::span::FileId;

/// A single loaded source file (or REPL line).
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// The file's id within the owning [`SourceMap`].
    pub id: FileId,
    /// Display name, e.g. `script.fx` or `<stdin>`.
    pub name: String,
    /// Full source text.
    pub text: String,
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

impl SourceFile {
    fn new(id: FileId, name: String, text: String) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            id,
            name,
            text,
            line_starts,
        }
    }

    /// Number of lines in the file. An empty file has one (empty) line.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// The text of the given 1-based line, without its trailing newline.
    ///
    /// Out-of-range lines yield an empty string.
    pub fn line_text(&self, line: u32) -> &str {
        let Some(&start) = self.line_starts.get(line.saturating_sub(1) as usize) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line as usize)
            .map_or(self.text.len(), |&next| next);
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }

    /// The 1-based line containing the given byte offset.
    pub fn line_of(&self, offset: usize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }
}

/// All source files loaded by a session.
///
/// # Examples
///
/// ```
/// use fx_util::source::SourceMap;
///
/// let mut sources = SourceMap::new();
/// let id = sources.add_file("demo.fx", "let x = 1\nprint(x)\n");
/// assert_eq!(sources.file(id).line_text(2), "print(x)");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    pub fn add_file(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = FileId::new(self.files.len());
        self.files.push(SourceFile::new(id, name.into(), text.into()));
        id
    }

    /// Look up a file by id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not issued by this map.
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    /// Look up a file by id, returning `None` for foreign ids.
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files have been registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut sources = SourceMap::new();
        let a = sources.add_file("a.fx", "one\ntwo\n");
        let b = sources.add_file("b.fx", "three");
        assert_ne!(a, b);
        assert_eq!(sources.file(a).name, "a.fx");
        assert_eq!(sources.file(b).text, "three");
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn test_line_text() {
        let mut sources = SourceMap::new();
        let id = sources.add_file("t.fx", "first\nsecond\nthird");
        let file = sources.file(id);
        assert_eq!(file.line_text(1), "first");
        assert_eq!(file.line_text(2), "second");
        assert_eq!(file.line_text(3), "third");
        assert_eq!(file.line_text(4), "");
    }

    #[test]
    fn test_line_text_crlf() {
        let mut sources = SourceMap::new();
        let id = sources.add_file("t.fx", "first\r\nsecond\r\n");
        assert_eq!(sources.file(id).line_text(1), "first");
    }

    #[test]
    fn test_line_count_empty() {
        let mut sources = SourceMap::new();
        let id = sources.add_file("t.fx", "");
        assert_eq!(sources.file(id).line_count(), 1);
        assert_eq!(sources.file(id).line_text(1), "");
    }

    #[test]
    fn test_line_of() {
        let mut sources = SourceMap::new();
        let id = sources.add_file("t.fx", "ab\ncd\nef");
        let file = sources.file(id);
        assert_eq!(file.line_of(0), 1);
        assert_eq!(file.line_of(2), 1);
        assert_eq!(file.line_of(3), 2);
        assert_eq!(file.line_of(6), 3);
    }

    #[test]
    fn test_get_foreign_id() {
        let sources = SourceMap::new();
        assert!(sources.get(FileId::new(3)).is_none());
    }
}
