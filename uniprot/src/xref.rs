//! Parsing of the accession / UniProt ID / gene name association dump
use super::*;
use memchr::{memchr_iter, Memchr};
use std::str;

/// Generalized wrapper around [`Memchr`] iterator for splitting `&[u8]` slices
/// by a byte.
struct Pitchfork<'a> {
    pos: usize,
    haystack: &'a [u8],
    inner: Memchr<'a>,
}

impl<'a> Pitchfork<'a> {
    pub fn new(needle: u8, haystack: &'a [u8]) -> Self {
        Self {
            pos: 0,
            haystack,
            inner: memchr_iter(needle, haystack),
        }
    }
}

impl<'a> Iterator for Pitchfork<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = match self.inner.next() {
            Some(e) => e,
            None => {
                if self.pos < self.haystack.len() {
                    self.haystack.len()
                } else {
                    return None;
                }
            }
        };
        let slice = &self.haystack[self.pos..end];
        self.pos = end + 1;
        Some(slice)
    }
}

/// Strip a trailing `.N` version number from an accession
///
/// ```rust,ignore
/// assert_eq!(strip_version("XP_001.1"), "XP_001");
/// assert_eq!(strip_version("P38182"), "P38182");
/// ```
pub fn strip_version(accession: &str) -> &str {
    match accession.rfind('.') {
        Some(idx)
            if idx > 0
                && idx + 1 < accession.len()
                && accession[idx + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &accession[..idx]
        }
        _ => accession,
    }
}

/// Parse one `accession,external_id,gene_name` line
fn read_entry(line: &[u8], lineno: usize) -> Result<Entry> {
    let malformed = |reason: &str| Error::Malformed {
        line: lineno,
        reason: reason.into(),
    };

    let text = str::from_utf8(line).map_err(|_| malformed("invalid UTF-8"))?;
    let fields = Pitchfork::new(b',', text.as_bytes())
        .map(|f| {
            // Splitting on an ASCII byte keeps every field on a char boundary
            str::from_utf8(f).unwrap_or_default().trim()
        })
        .collect::<Vec<&str>>();

    // A trailing comma leaves an empty final field that Pitchfork drops
    let fields = if line.last() == Some(&b',') {
        let mut f = fields;
        f.push("");
        f
    } else {
        fields
    };

    if fields.len() != 3 {
        return Err(malformed(&format!(
            "expected 3 comma-separated fields, found {}",
            fields.len()
        )));
    }
    if fields[0].is_empty() || fields[1].is_empty() {
        return Err(malformed("empty accession or external ID"));
    }

    Ok(Entry {
        accession: fields[0].into(),
        external_id: fields[1].into(),
        gene_name: fields[2].into(),
    })
}

/// Parse every non-blank line of a cross-reference buffer, in order
pub fn parse_entries(buf: &[u8]) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for (idx, line) in Pitchfork::new(b'\n', buf).enumerate() {
        let line = match line.last() {
            Some(b'\r') => &line[..line.len() - 1],
            _ => line,
        };
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }
        entries.push(read_entry(line, idx + 1)?);
    }
    Ok(entries)
}
