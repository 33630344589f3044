//! Requirement extraction from reStructuredText documentation
//!
//! Requirements are declared in sphinx-needs `list2need` blocks:
//!
//! ```rst
//! .. list2need::
//!    :types: srs
//!
//!    * (REQ-1) Save file. The system shall save the file when asked.
//!    * (REQ-2) Load file. The system shall load the file
//!      named by the user.
//! ```
//!
//! A block extends until the next top-level directive or the end of the
//! document. Only blocks whose `:types:` name a [`RequirementCategory`] are
//! extracted. Items which do not match `* (ID) Title. Description` are
//! skipped.

use std::path::Path;

use crate::domain::{Identifier, Requirement, RequirementCategory};

const DIRECTIVE: &str = ".. ";
const LIST2NEED: &str = ".. list2need::";

/// Option names recognized without the leading colon.
const BARE_OPTIONS: [&str; 1] = ["types"];

/// Extracts all requirements declared in a documentation file.
///
/// Requirements are returned in declaration order, each tagged with `source`.
#[must_use]
pub fn parse_requirements(text: &str, source: &Path) -> Vec<Requirement> {
    list2need_blocks(text)
        .into_iter()
        .flat_map(|block| block.requirements(source))
        .collect()
}

/// The body lines of a `list2need` directive.
#[derive(Debug, Default)]
struct Block<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Block<'a> {
    /// The directive options, which precede the first bullet.
    fn options(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.lines
            .iter()
            .copied()
            .take_while(|line| !is_bullet(line.trim()))
            .filter_map(parse_option)
    }

    /// The category named by the block's `types` option, if any.
    fn category(&self) -> Option<RequirementCategory> {
        self.options()
            .filter(|(name, _)| *name == "types")
            .flat_map(|(_, value)| value.split(|c: char| c == ',' || c.is_whitespace()))
            .find_map(RequirementCategory::from_token)
    }

    /// Groups body lines into bullet items.
    ///
    /// Lines before the first bullet belong to no item. After it, every
    /// non-bullet line continues the current item, including lines that open
    /// with an inline role such as ``:need:`REQ-0` ``.
    fn items(&self) -> Vec<String> {
        let mut items = Vec::new();
        let mut current: Option<Vec<&str>> = None;

        for line in &self.lines {
            let trimmed = line.trim();
            if is_bullet(trimmed) {
                items.extend(current.take().map(|lines| join(&lines)));
                current = Some(vec![trimmed]);
            } else if let Some(lines) = current.as_mut() {
                lines.push(trimmed);
            }
        }

        items.extend(current.map(|lines| join(&lines)));
        items
    }

    fn requirements(&self, source: &Path) -> Vec<Requirement> {
        let Some(category) = self.category() else {
            tracing::trace!("skipping list2need block without a requirement type");
            return Vec::new();
        };

        self.items()
            .iter()
            .filter_map(|item| {
                let parsed = Item::parse(item);
                if parsed.is_none() {
                    tracing::trace!("skipping malformed requirement item: {item}");
                }
                parsed
            })
            .map(|item| {
                Requirement::new(item.id, item.title, item.description, category)
                    .with_source(source)
            })
            .collect()
    }
}

fn list2need_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for line in text.lines() {
        if line.starts_with(DIRECTIVE) {
            blocks.extend(current.take());
            if line.starts_with(LIST2NEED) {
                current = Some(Block::default());
            }
        } else if let Some(block) = current.as_mut() {
            block.lines.push(line);
        }
    }

    blocks.extend(current);
    blocks
}

/// Parses a directive option line, `:name: value` or `name: value` for a
/// known bare option.
fn parse_option(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(':') {
        let (name, value) = rest.split_once(':')?;
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        return valid.then_some((name, value.trim()));
    }

    let (name, value) = line.split_once(':')?;
    BARE_OPTIONS
        .contains(&name)
        .then_some((name, value.trim()))
}

fn is_bullet(trimmed: &str) -> bool {
    trimmed
        .strip_prefix('*')
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn join(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| !line.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single `* (ID) Title. Description` item.
#[derive(Debug, PartialEq, Eq)]
struct Item<'a> {
    id: Identifier,
    title: &'a str,
    description: &'a str,
}

impl<'a> Item<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let rest = text.strip_prefix('*')?.trim_start();
        let rest = rest.strip_prefix('(')?;
        let (id, rest) = rest.split_once(')')?;
        let id = Identifier::try_from(id).ok()?;

        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();

        // The title ends at the first period followed by whitespace or the
        // end of the item.
        let (title_end, _) = rest.char_indices().find(|&(i, c)| {
            c == '.' && rest[i + 1..].chars().next().is_none_or(char::is_whitespace)
        })?;

        Some(Self {
            id,
            title: rest[..title_end].trim(),
            description: rest[title_end + 1..].trim(),
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn parse(text: &str) -> Vec<Requirement> {
        parse_requirements(text, Path::new("docs/srs.rst"))
    }

    #[test]
    fn single_requirement() {
        let text = "\
.. list2need::
   :types: srs

   * (REQ-1) Save file. The system shall save the file when asked.
";
        let requirements = parse(text);

        assert_eq!(requirements.len(), 1);
        let requirement = &requirements[0];
        assert_eq!(requirement.id().as_str(), "REQ-1");
        assert_eq!(requirement.title(), "Save file");
        assert_eq!(
            requirement.description(),
            "The system shall save the file when asked."
        );
        assert_eq!(requirement.category(), RequirementCategory::Software);
        assert_eq!(requirement.source(), Some(Path::new("docs/srs.rst")));
    }

    #[test]
    fn multiline_descriptions() {
        let text = "\
.. list2need::
   :types: sss

   * (SYS-1) Boot. The system shall boot
     within two seconds.
   * (SYS-2) Halt. The system shall halt.
";
        let requirements = parse(text);

        let summary: Vec<_> = requirements
            .iter()
            .map(|r| (r.id().as_str(), r.title(), r.description()))
            .collect();
        assert_eq!(
            summary,
            [
                ("SYS-1", "Boot", "The system shall boot within two seconds."),
                ("SYS-2", "Halt", "The system shall halt."),
            ]
        );
        assert!(
            requirements
                .iter()
                .all(|r| r.category() == RequirementCategory::System)
        );
    }

    #[test]
    fn block_without_requirement_type_is_ignored() {
        let text = "\
.. list2need::
   :types: need

   * (N-1) Note. Not a requirement.
";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn block_without_types_is_ignored() {
        let text = "\
.. list2need::

   * (N-1) Note. Not a requirement.
";
        assert!(parse(text).is_empty());
    }

    #[test_case(":types: sss, srs", RequirementCategory::System; "both listed")]
    #[test_case(":types: need, srs", RequirementCategory::Software; "mixed list")]
    #[test_case(":types:srs", RequirementCategory::Software; "no space")]
    #[test_case("types: srs", RequirementCategory::Software; "bare option")]
    #[test_case("types: sss", RequirementCategory::System; "bare system option")]
    fn types_option(option: &str, expected: RequirementCategory) {
        let text = format!(".. list2need::\n   {option}\n\n   * (R-1) T. D.\n");
        let requirements = parse(&text);
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].category(), expected);
    }

    #[test]
    fn role_at_start_of_continuation_line_is_kept() {
        let text = "\
.. list2need::
   :types: srs

   * (REQ-1) Save file. The system shall save
     :need:`REQ-0` files when asked.
";
        let requirements = parse(text);

        assert_eq!(requirements.len(), 1);
        assert_eq!(
            requirements[0].description(),
            "The system shall save :need:`REQ-0` files when asked."
        );
    }

    #[test]
    fn types_after_first_bullet_is_not_an_option() {
        let text = "\
.. list2need::

   * (REQ-1) Save file. The system shall save.
     :types: srs
";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn other_bare_words_are_not_options() {
        let text = "\
.. list2need::
   note: srs

   * (REQ-1) Save file. The system shall save.
";
        assert!(parse(text).is_empty());
    }

    #[test]
    fn block_ends_at_next_top_level_directive() {
        let text = "\
.. list2need::
   :types: srs

   * (REQ-1) First. Inside the block.

.. note::

   * (REQ-2) Second. Outside the block.
";
        let ids: Vec<_> = parse(text).iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["REQ-1"]);
    }

    #[test]
    fn multiple_blocks_in_declaration_order() {
        let text = "\
Title
=====

.. list2need::
   :types: srs

   * (REQ-2) B. Second.

.. list2need::
   :types: sss

   * (REQ-1) A. First.
";
        let ids: Vec<_> = parse(text).iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["REQ-2", "REQ-1"]);
    }

    #[test]
    fn nested_bullets_are_separate_items() {
        let text = "\
.. list2need::
   :types: srs

   * (REQ-1) Parent. The parent.

     * (REQ-1-1) Child. The child.
";
        let ids: Vec<_> = parse(text).iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["REQ-1", "REQ-1-1"]);
    }

    #[test]
    fn malformed_items_are_skipped() {
        let text = "\
.. list2need::
   :types: srs

   * REQ-1 Missing parentheses. Skipped.
   * (REQ-2) Missing period
   * (REQ 3) Bad id. Skipped.
   * (REQ-4) Good. Kept.
";
        let ids: Vec<_> = parse(text).iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["REQ-4"]);
    }

    #[test]
    fn text_without_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("* (REQ-1) Loose. Not in a block.\n").is_empty());
    }

    #[test]
    fn indented_directive_does_not_end_block() {
        let text = "\
.. list2need::
   :types: srs

   * (REQ-1) First. One.
   .. comment
   * (REQ-2) Second. Two.
";
        assert_eq!(parse(text).len(), 2);
    }

    #[test_case("* (REQ-1) Save file. Saves it.", Some(("REQ-1", "Save file", "Saves it.")); "basic")]
    #[test_case("* (REQ-1) Save file.", Some(("REQ-1", "Save file", "")); "no description")]
    #[test_case("* (REQ-1) v1.2 format. Uses it.", Some(("REQ-1", "v1.2 format", "Uses it.")); "period inside title")]
    #[test_case("*  (REQ_1)   Spaced.   Out.", Some(("REQ_1", "Spaced", "Out.")); "extra whitespace")]
    #[test_case("* (REQ-1)Save. x", None; "no space after id")]
    #[test_case("* () Empty. x", None; "empty id")]
    #[test_case("* (REQ-1 Save. x", None; "unclosed parenthesis")]
    #[test_case("* (REQ-1) No period", None; "no period")]
    fn item_grammar(text: &str, expected: Option<(&str, &str, &str)>) {
        let parsed = Item::parse(text);
        let actual = parsed
            .as_ref()
            .map(|item| (item.id.as_str(), item.title, item.description));
        assert_eq!(actual, expected);
    }
}
