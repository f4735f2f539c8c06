//! Mermaid entity-relationship diagram model.
//!
//! [`ErDiagram`] is the intermediate form between a schema and the markup
//! text. Its [`Display`](std::fmt::Display) impl writes `erDiagram` syntax
//! with four-space indentation per level.

use std::fmt;

/// Header line opening every ER diagram.
pub const HEADER: &str = "erDiagram";

const INDENT: &str = "    ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErDiagram {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// One `<type> <name> ["comment"]` line inside an entity block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub type_name: String,
    pub name: String,
    pub comment: Option<String>,
}

impl Attribute {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            comment: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub left: String,
    pub left_end: Cardinality,
    pub right: String,
    pub right_end: Cardinality,
    pub label: String,
}

impl Relationship {
    /// The `<left>--<right>` connector, e.g. `||--o{`.
    pub fn connector(&self) -> String {
        format!("{}--{}", self.left_end.left_glyph(), self.right_end.right_glyph())
    }
}

/// How many instances sit at one end of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    ZeroOrOne,
    ZeroOrMore,
}

impl Cardinality {
    /// Glyph when this end is written on the left of the connector.
    pub const fn left_glyph(self) -> &'static str {
        match self {
            Self::ExactlyOne => "||",
            Self::ZeroOrOne => "|o",
            Self::ZeroOrMore => "}o",
        }
    }

    /// Glyph when this end is written on the right of the connector.
    pub const fn right_glyph(self) -> &'static str {
        match self {
            Self::ExactlyOne => "||",
            Self::ZeroOrOne => "o|",
            Self::ZeroOrMore => "o{",
        }
    }
}

impl fmt::Display for ErDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        for entity in &self.entities {
            write!(f, "{entity}")?;
        }
        for rel in &self.relationships {
            write!(f, "{rel}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{INDENT}{} {{", self.name)?;
        for attr in &self.attributes {
            write!(f, "{INDENT}{INDENT}{} {}", attr.type_name, attr.name)?;
            if let Some(comment) = &attr.comment {
                write!(f, " \"{comment}\"")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{INDENT}}}")
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{INDENT}{} {} {} : \"{}\"",
            self.left,
            self.connector(),
            self.right,
            self.label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagram_is_header_only() {
        assert_eq!(ErDiagram::default().to_string(), "erDiagram\n");
    }

    #[test]
    fn test_entity_block_layout() {
        let entity = Entity {
            name: "Lists".to_string(),
            attributes: vec![
                Attribute::new("string", "id").with_comment("system"),
                Attribute::new("string", "name"),
            ],
        };
        assert_eq!(
            entity.to_string(),
            "    Lists {\n        string id \"system\"\n        string name\n    }\n"
        );
    }

    #[test]
    fn test_relationship_line_layout() {
        let rel = Relationship {
            left: "Lists".to_string(),
            left_end: Cardinality::ExactlyOne,
            right: "Tasks".to_string(),
            right_end: Cardinality::ZeroOrMore,
            label: "list (cascade)".to_string(),
        };
        assert_eq!(rel.to_string(), "    Lists ||--o{ Tasks : \"list (cascade)\"\n");
    }

    #[test]
    fn test_glyphs_mirror_between_sides() {
        assert_eq!(Cardinality::ZeroOrOne.left_glyph(), "|o");
        assert_eq!(Cardinality::ZeroOrOne.right_glyph(), "o|");
        assert_eq!(Cardinality::ZeroOrMore.left_glyph(), "}o");
        assert_eq!(Cardinality::ZeroOrMore.right_glyph(), "o{");
    }
}
