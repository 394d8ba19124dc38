//! Terminator spec parsing and line-by-line rewriting.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Read, Write};

use crate::encoding::Encoding;
use crate::error::FixEolError;

/// Spec tokens, longest first so `crlf` wins over `cr`.
const TOKENS: &[(&str, &str)] = &[
    ("crlf", "\r\n"),
    ("cr", "\r"),
    ("lf", "\n"),
    ("\\r", "\r"),
    ("\\n", "\n"),
    ("r", "\r"),
    ("n", "\n"),
];

/// A resolved line terminator made only of CR and LF characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminator {
    sequence: String,
}

impl Terminator {
    /// Parses a terminator spec such as `crlf`, `lf`, `\r\n` or `rn`.
    ///
    /// An empty spec selects the host default. Tokens are case-insensitive and
    /// may be combined in any order.
    ///
    /// # Errors
    ///
    /// [`FixEolError::InvalidTerminatorSpec`] if anything other than CR/LF
    /// remains after token substitution.
    pub fn parse(spec: &str) -> Result<Self, FixEolError> {
        if spec.is_empty() {
            return Ok(Self::host());
        }

        let lowered = spec.to_ascii_lowercase();
        let mut rest = lowered.as_str();
        let mut sequence = String::new();

        while let Some(ch) = rest.chars().next() {
            if let Some((token, value)) = TOKENS.iter().find(|(t, _)| rest.starts_with(t)) {
                sequence.push_str(value);
                rest = &rest[token.len()..];
                continue;
            }
            match ch {
                '\r' | '\n' => {
                    sequence.push(ch);
                    rest = &rest[1..];
                }
                other => {
                    return Err(FixEolError::InvalidTerminatorSpec {
                        spec: spec.to_string(),
                        found: other,
                    });
                }
            }
        }

        Ok(Terminator { sequence })
    }

    /// The terminator native to the platform this binary was built for.
    pub fn host() -> Self {
        let sequence = if cfg!(windows) { "\r\n" } else { "\n" };
        Terminator { sequence: sequence.to_string() }
    }

    /// The resolved sequence, e.g. `"\r\n"` for `crlf`.
    ///
    /// # Returns
    ///
    /// A non-empty string made only of `'\r'` and `'\n'`.
    pub fn as_str(&self) -> &str {
        &self.sequence
    }

    /// The terminator as bytes in `encoding`'s code units.
    pub fn encode(&self, encoding: Encoding) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sequence.len() * encoding.unit_width());
        for b in self.sequence.bytes() {
            let (unit, len) = encoding.encode_ascii(b);
            out.extend_from_slice(&unit[..len]);
        }
        out
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.sequence.chars() {
            match ch {
                '\r' => f.write_str("CR")?,
                _ => f.write_str("LF")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Unit {
    bytes: [u8; 4],
    len: usize,
}

impl Unit {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Reads logical lines from a code-unit stream.
///
/// The output terminator is matched first as one whole break, so a stream
/// already written with a compound terminator such as LF CR reads back as the
/// same lines. Otherwise any of CR, LF or CR LF ends a line. A trailing partial
/// code unit is returned as ordinary content.
pub struct LineReader<R> {
    inner: R,
    width: usize,
    cr: Unit,
    lf: Unit,
    eol: Vec<Unit>,
    pending: VecDeque<Unit>,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a reader over `inner`, whose code units are `encoding`'s.
    ///
    /// # Parameters
    ///
    /// * `inner` - the stream, positioned after any byte-order mark.
    /// * `encoding` - decides the code-unit width and how CR / LF look.
    /// * `terminator` - the sequence the caller is about to write; it is
    ///   recognized as a single break.
    pub fn new(inner: R, encoding: Encoding, terminator: &Terminator) -> Self {
        let unit = |b: u8| {
            let (bytes, len) = encoding.encode_ascii(b);
            Unit { bytes, len }
        };
        LineReader {
            inner,
            width: encoding.unit_width(),
            cr: unit(b'\r'),
            lf: unit(b'\n'),
            eol: terminator.as_str().bytes().map(unit).collect(),
            pending: VecDeque::new(),
        }
    }

    fn next_unit(&mut self) -> io::Result<Option<Unit>> {
        if let Some(unit) = self.pending.pop_front() {
            return Ok(Some(unit));
        }

        let mut unit = Unit { bytes: [0; 4], len: 0 };
        while unit.len < self.width {
            match self.inner.read(&mut unit.bytes[unit.len..self.width]) {
                Ok(0) => break,
                Ok(n) => unit.len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok((unit.len > 0).then_some(unit))
    }

    /// Consumes the rest of the output terminator after `first`.
    ///
    /// On a mismatch every unit read ahead is put back, in order.
    fn take_terminator(&mut self, first: Unit) -> io::Result<bool> {
        if self.eol.len() < 2 || self.eol[0] != first {
            return Ok(false);
        }

        let mut ahead = Vec::with_capacity(self.eol.len() - 1);
        for i in 1..self.eol.len() {
            let expected = self.eol[i];
            match self.next_unit()? {
                Some(unit) => {
                    ahead.push(unit);
                    if unit != expected {
                        break;
                    }
                }
                None => break,
            }
        }

        if ahead.len() == self.eol.len() - 1 && ahead[..] == self.eol[1..] {
            return Ok(true);
        }
        for unit in ahead.into_iter().rev() {
            self.pending.push_front(unit);
        }
        Ok(false)
    }

    /// Reads the next line into `line` without its terminator.
    ///
    /// Returns `None` at end of input, otherwise whether the line was terminated.
    pub fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<Option<bool>> {
        line.clear();
        let mut any = false;

        while let Some(unit) = self.next_unit()? {
            any = true;
            if unit != self.lf && unit != self.cr {
                line.extend_from_slice(unit.as_bytes());
                continue;
            }
            if self.take_terminator(unit)? {
                return Ok(Some(true));
            }
            if unit == self.cr {
                if let Some(next) = self.next_unit()? {
                    if next != self.lf {
                        self.pending.push_front(next);
                    }
                }
            }
            return Ok(Some(true));
        }

        Ok(any.then_some(false))
    }
}

/// Counters reported after rewriting one stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteStats {
    pub lines: usize,
    pub bytes_written: u64,
}

/// Copies `reader` to `writer`, replacing every line terminator with `terminator`.
///
/// The last line gets a terminator only if it had one in the input.
pub fn rewrite<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    encoding: Encoding,
    terminator: &Terminator,
) -> io::Result<RewriteStats> {
    let eol = terminator.encode(encoding);
    let mut lines = LineReader::new(reader, encoding, terminator);
    let mut line = Vec::new();
    let mut stats = RewriteStats::default();

    while let Some(terminated) = lines.read_line(&mut line)? {
        writer.write_all(&line)?;
        stats.bytes_written += line.len() as u64;
        if terminated {
            writer.write_all(&eol)?;
            stats.bytes_written += eol.len() as u64;
        }
        stats.lines += 1;
    }

    Ok(stats)
}

/// In-memory form of [`rewrite`] for UTF-8 text.
pub fn rewrite_text(text: &str, terminator: &Terminator) -> String {
    let mut out = Vec::with_capacity(text.len());
    match rewrite(text.as_bytes(), &mut out, Encoding::Utf8, terminator) {
        Ok(_) => String::from_utf8_lossy(&out).into_owned(),
        // Reading a slice into a Vec cannot fail.
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(spec: &str) -> Terminator {
        Terminator::parse(spec).expect("valid spec")
    }

    #[test]
    fn named_tokens_resolve() {
        assert_eq!(term("crlf").as_str(), "\r\n");
        assert_eq!(term("cr").as_str(), "\r");
        assert_eq!(term("lf").as_str(), "\n");
        assert_eq!(term("LF").as_str(), "\n");
        assert_eq!(term("lfcr").as_str(), "\n\r");
    }

    #[test]
    fn legacy_escapes_and_letters_resolve() {
        assert_eq!(term("\\r\\n").as_str(), "\r\n");
        assert_eq!(term("\\n").as_str(), "\n");
        assert_eq!(term("rn").as_str(), "\r\n");
        assert_eq!(term("n").as_str(), "\n");
        assert_eq!(term("\r\n").as_str(), "\r\n");
    }

    #[test]
    fn empty_spec_uses_host_default() {
        assert_eq!(term(""), Terminator::host());
    }

    #[test]
    fn stray_characters_are_rejected() {
        for spec in ["crx", "windows", "\\t", "lf ", "c"] {
            match Terminator::parse(spec) {
                Err(FixEolError::InvalidTerminatorSpec { spec: s, .. }) => assert_eq!(s, spec),
                other => panic!("expected invalid spec for {spec:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn display_names_each_character() {
        assert_eq!(term("crlf").to_string(), "CRLF");
        assert_eq!(term("n").to_string(), "LF");
    }

    #[test]
    fn mixed_endings_become_lf() {
        let input = "one\r\ntwo\nthree\r\n";
        let out = rewrite_text(input, &term("lf"));
        assert_eq!(out, "one\ntwo\nthree\n");
        assert_eq!(out.len(), input.len() - 2);
    }

    #[test]
    fn lone_cr_ends_a_line() {
        let out = rewrite_text("a\rb\r\rc", &term("crlf"));
        assert_eq!(out, "a\r\nb\r\n\r\nc");
    }

    #[test]
    fn final_line_without_terminator_stays_unterminated() {
        assert_eq!(rewrite_text("a\nb", &term("crlf")), "a\r\nb");
        assert_eq!(rewrite_text("", &term("crlf")), "");
        assert_eq!(rewrite_text("\n", &term("cr")), "\r");
    }

    #[test]
    fn rewriting_twice_is_idempotent() {
        let input = "x\r\ny\rz\n\n\r\nend";
        for spec in ["crlf", "cr", "lf", "lfcr", "\\n\\r", "crcr", "lflf"] {
            let t = term(spec);
            let once = rewrite_text(input, &t);
            let twice = rewrite_text(&once, &t);
            assert_eq!(once, twice, "spec {spec:?}");
        }
    }

    #[test]
    fn compound_terminator_reads_back_as_one_break() {
        let t = term("lfcr");
        let once = rewrite_text("a\r\nb\n\nc", &t);
        assert_eq!(once, "a\n\rb\n\r\n\rc");
        assert_eq!(rewrite_text(&once, &t), once);
        // A partial match falls back to the single-character rules.
        assert_eq!(rewrite_text("a\nb", &t), "a\n\rb");
        assert_eq!(rewrite_text("a\n", &t), "a\n\r");
    }

    #[test]
    fn doubled_terminator_keeps_line_count() {
        let t = term("crcr");
        let once = rewrite_text("a\nb\r\nc", &t);
        assert_eq!(once, "a\r\rb\r\rc");
        assert_eq!(rewrite_text(&once, &t), once);
        let t = term("lflf");
        let once = rewrite_text("a\r\n\r\nb", &t);
        assert_eq!(once, "a\n\n\n\nb");
        assert_eq!(rewrite_text(&once, &t), once);
    }

    #[test]
    fn every_line_ends_with_exactly_the_terminator() {
        let input = "a\r\nb\nc\rd\r\n";
        for spec in ["crlf", "cr", "lf"] {
            let t = term(spec);
            let out = rewrite_text(input, &t);
            let lines: Vec<&str> = out.split_terminator(t.as_str()).collect();
            assert_eq!(lines, vec!["a", "b", "c", "d"], "spec {spec:?}");
            for l in lines {
                assert!(!l.contains('\r') && !l.contains('\n'));
            }
        }
    }

    #[test]
    fn utf16le_units_are_rewritten_in_place() {
        // "a\r\nb\n" in UTF-16LE without BOM
        let input: &[u8] = &[b'a', 0, b'\r', 0, b'\n', 0, b'b', 0, b'\n', 0];
        let mut out = Vec::new();
        let stats = rewrite(input, &mut out, Encoding::Utf16Le, &term("cr")).expect("rewrite");
        assert_eq!(out, vec![b'a', 0, b'\r', 0, b'b', 0, b'\r', 0]);
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.bytes_written, 8);
    }

    #[test]
    fn utf16be_byte_that_looks_like_lf_is_not_a_terminator() {
        // U+0A41 followed by LF, big-endian: 0A 41 00 0A
        let input: &[u8] = &[0x0A, 0x41, 0x00, 0x0A];
        let mut out = Vec::new();
        rewrite(input, &mut out, Encoding::Utf16Be, &term("crlf")).expect("rewrite");
        assert_eq!(out, vec![0x0A, 0x41, 0x00, 0x0D, 0x00, 0x0A]);
    }

    #[test]
    fn utf32_terminator_encoding() {
        assert_eq!(term("lf").encode(Encoding::Utf32Le), vec![b'\n', 0, 0, 0]);
        assert_eq!(term("crlf").encode(Encoding::Utf16Be), vec![0, b'\r', 0, b'\n']);
    }

    #[test]
    fn trailing_partial_unit_is_preserved() {
        let input: &[u8] = &[b'a', 0, b'\n', 0, 0x42];
        let mut out = Vec::new();
        rewrite(input, &mut out, Encoding::Utf16Le, &term("lf")).expect("rewrite");
        assert_eq!(out, vec![b'a', 0, b'\n', 0, 0x42]);
    }
}
