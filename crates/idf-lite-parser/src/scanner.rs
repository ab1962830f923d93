// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast record scanner using SIMD-accelerated byte searching
//!
//! Splits IDF text into raw records without tokenizing fields. A record ends
//! at the first `;` outside a `!` comment; a comment on the same line after
//! the `;` still belongs to the record.

use memchr::{memchr, memchr2, memchr_iter};

/// Raw text of one record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
}

/// Fast record scanner for IDF files
pub struct RecordScanner<'a> {
    content: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> RecordScanner<'a> {
    /// Create a new scanner for the given content
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line: 1,
        }
    }

    fn advance(&mut self, to: usize) {
        let bytes = &self.content.as_bytes()[self.pos..to];
        self.line += memchr_iter(b'\n', bytes).count();
        self.pos = to;
    }

    /// Scan to the next record
    ///
    /// Text after the last `;` is returned as a final record when it holds
    /// anything besides whitespace and comments, so the tokenizer can report
    /// it as unterminated.
    pub fn next_record(&mut self) -> Option<RawRecord<'a>> {
        let bytes = self.content.as_bytes();
        let start = self.pos;
        let line = self.line;
        let mut cursor = self.pos;

        loop {
            let Some(offset) = memchr2(b';', b'!', &bytes[cursor..]) else {
                let rest = &self.content[start..];
                self.advance(bytes.len());
                return has_content(rest).then_some(RawRecord {
                    text: rest,
                    start,
                    end: bytes.len(),
                    line,
                });
            };
            cursor += offset;

            if bytes[cursor] == b'!' {
                cursor = match memchr(b'\n', &bytes[cursor..]) {
                    Some(nl) => cursor + nl + 1,
                    None => bytes.len(),
                };
                continue;
            }

            // Terminator found: keep a same-line trailing comment
            let mut end = cursor + 1;
            while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
                end += 1;
            }
            if end < bytes.len() && bytes[end] == b'!' {
                end = match memchr(b'\n', &bytes[end..]) {
                    Some(nl) => end + nl,
                    None => bytes.len(),
                };
            } else {
                end = cursor + 1;
            }

            self.advance(end);
            return Some(RawRecord {
                text: &self.content[start..end],
                start,
                end,
                line,
            });
        }
    }

    /// Count records without tokenizing them
    pub fn count_records(content: &str) -> usize {
        RecordScanner::new(content).count()
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

fn has_content(text: &str) -> bool {
    text.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('!')
    })
}
