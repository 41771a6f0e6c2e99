use std::fmt;

use code_review_git::FileContentSnapshot;

/// Placeholder written when a file's original content could not be fetched
pub const UNABLE_TO_RETRIEVE: &str = "Unable to retrieve";

/// What the document records as a file's pre-change content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalContent {
    Snapshot(FileContentSnapshot),
    /// Retrieval failed; the error is reported separately
    Unavailable,
}

/// One changed file in the review document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub original: OriginalContent,
    /// The file's segment of the raw diff, header included
    pub changes: String,
}

/// Ordered set of changed files, rendered as XML for the reviewer.
///
/// ```text
/// <git-diff>
///   <file path="src/lib.rs">
///     <original-content><![CDATA[...]]></original-content>
///     <changes><![CDATA[diff --git ...]]></changes>
///   </file>
/// </git-diff>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffDocument {
    entries: Vec<FileEntry>,
}

impl DiffDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FileEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// An empty document means there is nothing to send for review
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DiffDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<git-diff>")?;
        for entry in &self.entries {
            writeln!(f, "  <file path=\"{}\">", escape_attribute(&entry.path))?;
            match &entry.original {
                OriginalContent::Snapshot(FileContentSnapshot::Existing(content)) => {
                    writeln!(
                        f,
                        "    <original-content>{}</original-content>",
                        cdata(content)
                    )?;
                }
                OriginalContent::Snapshot(FileContentSnapshot::NewFile) => {
                    writeln!(f, "    <original-content new-file=\"true\"/>")?;
                }
                OriginalContent::Unavailable => {
                    writeln!(
                        f,
                        "    <original-content>{}</original-content>",
                        UNABLE_TO_RETRIEVE
                    )?;
                }
            }
            writeln!(f, "    <changes>{}</changes>", cdata(&entry.changes))?;
            writeln!(f, "  </file>")?;
        }
        write!(f, "</git-diff>")
    }
}

/// Escape text for use inside a double- or single-quoted attribute.
///
/// Whitespace control characters become references so parsers do not
/// normalize them away.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(xml_safe(c)),
        }
    }
    out
}

/// Wrap arbitrary text in CDATA so a parser returns it byte for byte.
///
/// A `]]>` inside the text would close the section early, so it is split
/// across two sections. Carriage returns are emitted as `&#13;` between
/// sections because parsers fold `\r\n` into `\n` inside CDATA. Characters
/// XML 1.0 cannot carry at all are replaced, see [`xml_safe`].
pub fn cdata(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 12);
    out.push_str("<![CDATA[");

    let mut prev = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ']' if prev == Some(']') && chars.peek() == Some(&'>') => {
                out.push_str("]]]><![CDATA[");
            }
            '\r' => out.push_str("]]>&#13;<![CDATA["),
            _ => out.push(xml_safe(c)),
        }
        prev = Some(c);
    }

    out.push_str("]]>");
    out
}

/// C0 controls other than tab, newline and carriage return are not allowed
/// in XML 1.0, not even as character references. They become the matching
/// Unicode control picture (form feed is `\u{240C}`); the noncharacters
/// U+FFFE and U+FFFF become U+FFFD.
pub fn xml_safe(c: char) -> char {
    match c {
        '\t' | '\n' | '\r' => c,
        '\u{0}'..='\u{1f}' => {
            char::from_u32(0x2400 + c as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
        }
        '\u{fffe}' | '\u{ffff}' => char::REPLACEMENT_CHARACTER,
        _ => c,
    }
}
