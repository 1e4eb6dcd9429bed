use super::{JarError, JarResult};

/// Main-section attributes of a jar manifest (`META-INF/MANIFEST.MF`).
/// Ordered, with case-insensitive key lookup. The archives this crate
/// produces carry no per-entry sections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JarManifest {
    entries: Vec<(String, String)>,
}

impl JarManifest {
    pub fn new() -> Self {
        JarManifest::default()
    }

    /// A manifest seeded with `Manifest-Version: 1.0`.
    pub fn versioned() -> Self {
        let mut manifest = Self::new();
        manifest.set("Manifest-Version", "1.0");
        manifest
    }

    /// Case-insensitive key lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Replace if a matching key exists (case-insensitive), otherwise append.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            entry.0 = key;
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse main-section attributes from raw bytes. Continuation lines
    /// (leading single space) are joined to the previous logical line.
    pub fn parse(data: &[u8]) -> JarResult<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|e| JarError::ManifestParse(format!("invalid UTF-8: {e}")))?;

        let mut logical_lines: Vec<String> = Vec::new();
        for raw in text.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if let Some(rest) = line.strip_prefix(' ') {
                if let Some(last) = logical_lines.last_mut() {
                    last.push_str(rest);
                    continue;
                }
            }
            logical_lines.push(line.to_string());
        }

        let mut manifest = JarManifest::new();
        for line in &logical_lines {
            if line.is_empty() {
                // Blank line ends the main section.
                break;
            }
            let Some(colon) = line.find(": ") else {
                continue;
            };
            manifest.set(&line[..colon], &line[colon + 2..]);
        }
        Ok(manifest)
    }

    /// Serialize with \r\n line endings and 72-byte line wrapping, as the
    /// jar manifest format requires.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for (key, value) in self.iter() {
            write_wrapped_line(&mut out, key, value);
        }
        out.push_str("\r\n");
        out.into_bytes()
    }
}

/// Write one `Key: Value\r\n` line, continuation-wrapped at 72 bytes.
fn write_wrapped_line(out: &mut String, key: &str, value: &str) {
    let full = format!("{key}: {value}");
    if full.len() <= 72 {
        out.push_str(&full);
        out.push_str("\r\n");
        return;
    }

    let first_end = safe_split_pos(&full, 72);
    out.push_str(&full[..first_end]);
    out.push_str("\r\n");

    let mut pos = first_end;
    while pos < full.len() {
        // " " plus up to 71 content bytes keeps continuations at 72 total.
        let chunk = safe_split_pos(&full[pos..], 71);
        out.push(' ');
        out.push_str(&full[pos..pos + chunk]);
        out.push_str("\r\n");
        pos += chunk;
    }
}

/// Largest byte position <= max_bytes that is a char boundary, never zero
/// for a non-empty string.
fn safe_split_pos(s: &str, max_bytes: usize) -> usize {
    if max_bytes >= s.len() {
        return s.len();
    }
    let mut pos = max_bytes;
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    if pos == 0 && !s.is_empty() {
        return s.chars().next().map(char::len_utf8).unwrap_or(s.len());
    }
    pos
}
