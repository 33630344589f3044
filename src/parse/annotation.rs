//! Test-case extraction from source comments
//!
//! Test cases are declared in documentation comments:
//!
//! ```c
//! /** @utdef{UT-FSM-0010 | - GIVEN the system is idle - WHEN start is ordered - THEN it runs}
//!     :tags: fsm
//!     :checks: SRS-FSM-001, SRS-FSM-002
//! @endut */
//! ```
//!
//! A block whose end marker is missing, or which is interrupted by another
//! opening marker, produces no record.

use std::path::Path;

use crate::domain::{Identifier, SourceLocation, TestCase};

const OPEN: &str = "@utdef{";
const END: &str = "@endut";
const COMMENT_OPEN: &str = "/**";
const COMMENT_CLOSE: &str = "*/";

/// Field names recognized without the surrounding colons.
const BARE_FIELDS: [&str; 3] = ["checks", "tags", "layout"];

/// Extracts all test cases declared in a source file.
///
/// Test cases are returned in declaration order.
#[must_use]
pub fn parse_tests(text: &str, file: &Path) -> Vec<TestCase> {
    let mut tests = Vec::new();
    let mut cursor = 0;

    while let Some(open) = next_opener(text, cursor) {
        cursor = open + OPEN.len();

        let Some(block) = RawBlock::scan(text, open) else {
            tracing::trace!(
                "skipping unterminated test block in {}:{}",
                file.display(),
                line_number(text, open)
            );
            continue;
        };
        cursor = block.end;

        let location = SourceLocation::new(file, line_number(text, open));
        match block.into_test_case(location) {
            Some(test) => tests.push(test),
            None => tracing::trace!(
                "skipping test block with malformed header in {}:{}",
                file.display(),
                line_number(text, open)
            ),
        }
    }

    tests
}

/// Whether the text before an opening marker ends with a `/**` comment opener
/// followed by whitespace.
fn opens_doc_comment(before: &str) -> bool {
    let trimmed = before.trim_end();
    trimmed.len() < before.len() && trimmed.ends_with(COMMENT_OPEN)
}

/// The offset of the first opening marker at or after `from` that starts a
/// doc comment.
fn next_opener(text: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(found) = text[search..].find(OPEN) {
        let open = search + found;
        if opens_doc_comment(&text[..open]) {
            return Some(open);
        }
        search = open + OPEN.len();
    }
    None
}

fn line_number(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// A delimited block, before its header and fields are interpreted.
#[derive(Debug)]
struct RawBlock<'a> {
    header: &'a str,
    body: &'a str,
    /// Offset just past the closing comment.
    end: usize,
}

impl<'a> RawBlock<'a> {
    /// Delimits the block whose opening marker starts at `open`.
    ///
    /// Returns `None` if the header or end marker is missing, or if another
    /// block opens before this one ends.
    fn scan(text: &'a str, open: usize) -> Option<Self> {
        let header_start = open + OPEN.len();
        let next_open = next_opener(text, header_start).unwrap_or(text.len());

        let header_end = header_start + text[header_start..next_open].find('}')?;
        let body_start = header_end + 1;
        let (body_end, end) = find_end(&text[..next_open], body_start)?;

        Some(Self {
            header: &text[header_start..header_end],
            body: &text[body_start..body_end],
            end,
        })
    }

    fn into_test_case(self, location: SourceLocation) -> Option<TestCase> {
        let (id, description) = self.header.split_once('|')?;
        let id = Identifier::try_from(id.trim()).ok()?;

        let fields = Fields::parse(self.body);
        let checks = fields.list("checks");
        let tags = fields.list("tags");

        Some(TestCase::new(id, description.trim(), checks, location).with_tags(tags))
    }
}

/// Finds the first end marker at or after `from` that closes the comment.
///
/// Returns the offset of the marker and the offset just past the comment
/// close.
fn find_end(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut search = from;
    while let Some(found) = text[search..].find(END) {
        let marker = search + found;
        let after = &text[marker + END.len()..];
        let rest = after.trim_start();
        if rest.starts_with(COMMENT_CLOSE) {
            let close = text.len() - rest.len() + COMMENT_CLOSE.len();
            return Some((marker, close));
        }
        search = marker + END.len();
    }
    None
}

/// The fields of a block body, in declaration order.
#[derive(Debug)]
struct Fields<'a> {
    fields: Vec<(&'a str, Vec<&'a str>)>,
}

impl<'a> Fields<'a> {
    /// Groups body lines into fields.
    ///
    /// A field value continues on following lines until the next field, a
    /// blank line or the end of the body.
    fn parse(body: &'a str) -> Self {
        let mut fields = Vec::new();
        let mut current: Option<(&str, Vec<&str>)> = None;

        for line in body.lines() {
            let line = strip_comment_continuation(line);
            if let Some((name, value)) = parse_field(line) {
                fields.extend(current.take());
                current = Some((name, vec![value]));
            } else if line.is_empty() {
                fields.extend(current.take());
            } else if let Some((_, values)) = current.as_mut() {
                values.push(line);
            }
        }

        fields.extend(current);
        Self { fields }
    }

    /// The comma-separated values of the first field with this name.
    ///
    /// Missing fields and empty entries yield nothing.
    fn list(&self, name: &str) -> Vec<String> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, lines)| {
                lines
                    .join(" ")
                    .split(',')
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Trims a line, dropping a leading `*` comment continuation.
fn strip_comment_continuation(line: &str) -> &str {
    let line = line.trim();
    match line.strip_prefix('*') {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => line,
    }
}

/// Parses `:name: value`, or `name: value` for a known bare field.
fn parse_field(line: &str) -> Option<(&str, &str)> {
    if let Some(rest) = line.strip_prefix(':') {
        let (name, value) = rest.split_once(':')?;
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_' || c == '-');
        return valid.then_some((name, value.trim()));
    }

    let (name, value) = line.split_once(':')?;
    BARE_FIELDS
        .contains(&name)
        .then_some((name, value.trim()))
}
