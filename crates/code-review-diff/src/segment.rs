/// Marker that opens each file's section in `git diff` output
pub const FILE_HEADER_MARKER: &str = "diff --git ";

/// Split a multi-file diff into one slice per file.
///
/// Splits happen where a line starts with the header marker, so diff bodies
/// that quote the marker mid-line stay intact. Each slice keeps its marker.
/// Non-blank text before the first header is returned as its own slice so the
/// caller can report it.
pub fn split_segments(raw: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = raw
        .match_indices(FILE_HEADER_MARKER)
        .map(|(i, _)| i)
        .filter(|&i| i == 0 || raw.as_bytes()[i - 1] == b'\n')
        .collect();

    let mut segments = Vec::with_capacity(starts.len() + 1);

    let first = starts.first().copied().unwrap_or(raw.len());
    let preamble = &raw[..first];
    if !preamble.trim().is_empty() {
        segments.push(preamble);
    }

    starts.push(raw.len());
    for bounds in starts.windows(2) {
        let segment = &raw[bounds[0]..bounds[1]];
        if !segment.trim().is_empty() {
            segments.push(segment);
        }
    }

    segments
}

/// Recover the pre-change path from a segment's header line.
///
/// `diff --git a/src/lib.rs b/src/lib.rs` yields `src/lib.rs`; for a rename the
/// `a/` side is returned. Returns None when the header carries no `a/` path.
pub fn extract_path(segment: &str) -> Option<String> {
    let header = segment.lines().next()?;
    let rest = header.strip_prefix(FILE_HEADER_MARKER)?.trim_start();

    // git quotes paths containing special characters
    if let Some(quoted) = rest.strip_prefix("\"a/") {
        return non_empty(&unquote(quoted)?);
    }

    let start = rest.find("a/")?;
    let token = rest[start + 2..].trim_end();
    if let Some(path) = same_path_on_both_sides(token) {
        return non_empty(path);
    }
    let path = match token.rfind(" b/") {
        Some(end) => &token[..end],
        None => token,
    };
    non_empty(path)
}

/// `P b/P` with identical halves, which disambiguates paths containing ` b/`
fn same_path_on_both_sides(token: &str) -> Option<&str> {
    if token.len() < 3 || (token.len() - 3) % 2 != 0 {
        return None;
    }
    let mid = (token.len() - 3) / 2;
    let old = token.get(..mid)?;
    let separator = token.get(mid..mid + 3)?;
    let new = token.get(mid + 3..)?;
    (separator == " b/" && old == new).then_some(old)
}

/// Decode a C-quoted path as written by git, starting after the opening quote.
///
/// Handles the single-character escapes and `\ooo` octal bytes, which git
/// uses for every non-ASCII byte unless `core.quotePath` is off. Returns None
/// when the closing quote is missing.
fn unquote(quoted: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(quoted.len());
    let mut input = quoted.bytes();

    loop {
        match input.next()? {
            b'"' => return Some(String::from_utf8_lossy(&bytes).into_owned()),
            b'\\' => {
                let escaped = input.next()?;
                let byte = match escaped {
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b't' => b'\t',
                    b'n' => b'\n',
                    b'v' => 0x0b,
                    b'f' => 0x0c,
                    b'r' => b'\r',
                    b'0'..=b'3' => {
                        let mid = octal_digit(input.next()?)?;
                        let low = octal_digit(input.next()?)?;
                        ((escaped - b'0') << 6) | (mid << 3) | low
                    }
                    other => other,
                };
                bytes.push(byte);
            }
            byte => bytes.push(byte),
        }
    }
}

fn octal_digit(byte: u8) -> Option<u8> {
    matches!(byte, b'0'..=b'7').then(|| byte - b'0')
}

fn non_empty(path: &str) -> Option<String> {
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

/// First line of a segment, shortened for error messages
pub(crate) fn preview(segment: &str) -> String {
    let line = segment.lines().next().unwrap_or("");
    if line.chars().count() > 80 {
        let cut: String = line.chars().take(77).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
