//! Schema-to-diagram compiler.
//!
//! Turns an Appwrite schema document and a selected database id into
//! Mermaid `erDiagram` markup. Compilation is pure and deterministic: the
//! same input always yields byte-identical output.
//!
//! It runs in two phases over the working table set (the tables of the
//! selected database):
//! 1. Build the table id → entity name index and emit entity blocks.
//! 2. Emit one relationship line per relationship column, resolving the
//!    counterpart through the index.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::diagram::{Attribute, Cardinality, Entity, ErDiagram, Relationship};
use crate::schema::{self, Column, RelationSide, RelationType, SchemaDocument, Table};

/// Comment attached to the fields Appwrite manages on every row.
pub const SYSTEM_COMMENT: &str = "system";

/// Fields Appwrite adds to every table, in emission order.
pub const SYSTEM_FIELDS: [(&str, &str); 5] = [
    ("string", "id"),
    ("int", "sequence"),
    ("datetime", "createdAt"),
    ("datetime", "updatedAt"),
    ("string[]", "permissions"),
];

/// Suffix appended to labels of relationships that cascade on delete.
pub const CASCADE_MARKER: &str = " (cascade)";

/// Suffix appended to labels of two-way relationships.
pub const TWO_WAY_MARKER: &str = " \u{2194}";

/// Errors raised while compiling a schema document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The raw text is not valid JSON.
    #[error("Invalid JSON configuration: {diagnostic}")]
    InvalidDocument {
        diagnostic: String,
        line: usize,
        column: usize,
    },
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument {
            diagnostic: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// How "exactly one" relationship ends are drawn.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardinalityStyle {
    /// `||` for the single side of a relationship.
    #[default]
    Strict,
    /// `|o` / `o|` for the single side, as Appwrite's web viewer draws it.
    Optional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub cardinality_style: CardinalityStyle,
}

/// Compiled diagram markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramMarkup {
    diagram: ErDiagram,
    text: String,
}

impl DiagramMarkup {
    fn new(diagram: ErDiagram) -> Self {
        let text = diagram.to_string();
        Self { diagram, text }
    }

    /// The markup text, starting with the `erDiagram` header.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// The diagram this markup was serialized from.
    pub const fn diagram(&self) -> &ErDiagram {
        &self.diagram
    }

    /// Names of the emitted entities, in emission order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.diagram.entities.iter().map(|entity| entity.name.as_str())
    }

    pub fn entity_count(&self) -> usize {
        self.diagram.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.diagram.relationships.len()
    }
}

impl fmt::Display for DiagramMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compile raw JSON text with default options.
///
/// `selected` is the database to draw. `None` draws no tables at all.
///
/// # Errors
///
/// Returns [`CompileError::InvalidDocument`] if `raw` is not valid JSON.
pub fn compile(raw: &str, selected: Option<&str>) -> Result<DiagramMarkup, CompileError> {
    compile_with(raw, selected, &CompileOptions::default())
}

/// Compile raw JSON text.
///
/// # Errors
///
/// Returns [`CompileError::InvalidDocument`] if `raw` is not valid JSON.
pub fn compile_with(
    raw: &str,
    selected: Option<&str>,
    options: &CompileOptions,
) -> Result<DiagramMarkup, CompileError> {
    let document = schema::parse(raw)?;
    Ok(compile_document(&document, selected, options))
}

/// Compile an already-parsed document. Never fails.
pub fn compile_document(
    document: &SchemaDocument,
    selected: Option<&str>,
    options: &CompileOptions,
) -> DiagramMarkup {
    let working_set: Vec<&Table> = document.tables_in(selected).collect();
    let names = EntityNames::build(&working_set);

    let mut diagram = ErDiagram::default();
    for (index, table) in working_set.iter().enumerate() {
        diagram.entities.push(entity_for(table, names.at(index)));
    }
    for (index, table) in working_set.iter().enumerate() {
        let owner = names.at(index);
        diagram.relationships.extend(
            table
                .relationships()
                .filter_map(|(column, rel)| relationship_for(owner, column, rel, &names, options)),
        );
    }

    tracing::debug!(
        database = selected.unwrap_or("<none>"),
        entities = diagram.entities.len(),
        relationships = diagram.relationships.len(),
        "compiled schema"
    );
    DiagramMarkup::new(diagram)
}

/// Entity names for the working set, by position and by table id.
///
/// Names that collide with an earlier entity get `_<table id>` appended,
/// plus a numeric suffix if that is taken too. A table id listed twice resolves to its first table.
struct EntityNames<'a> {
    names: Vec<String>,
    by_id: HashMap<&'a str, usize>,
}

impl<'a> EntityNames<'a> {
    fn build(tables: &[&'a Table]) -> Self {
        let mut used = HashSet::new();
        let mut names = Vec::with_capacity(tables.len());
        let mut by_id = HashMap::new();

        for (index, table) in tables.iter().enumerate() {
            let mut name = table.entity_name();
            if !used.insert(name.clone()) {
                let renamed = unused_name(&used, &format!("{name}_{}", table.id));
                tracing::warn!(
                    table = %table.id,
                    entity = %name,
                    renamed = %renamed,
                    "entity name collision"
                );
                used.insert(renamed.clone());
                name = renamed;
            }
            names.push(name);
            by_id.entry(table.id.as_str()).or_insert(index);
        }

        Self { names, by_id }
    }

    fn at(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Entity name for a table id, or the id itself outside the working set.
    fn resolve<'s>(&'s self, table_id: &'s str) -> &'s str {
        self.by_id
            .get(table_id)
            .map_or(table_id, |&index| self.names[index].as_str())
    }
}

/// `base`, or `base_2`, `base_3`, ... when `base` is already taken.
fn unused_name(used: &HashSet<String>, base: &str) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (2usize..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn entity_for(table: &Table, name: &str) -> Entity {
    let system = SYSTEM_FIELDS
        .iter()
        .map(|(ty, field)| Attribute::new(*ty, *field).with_comment(SYSTEM_COMMENT));
    let user = table.columns.iter().map(attribute_for);

    Entity {
        name: name.to_string(),
        attributes: system.chain(user).collect(),
    }
}

fn attribute_for(column: &Column) -> Attribute {
    let mut type_name = column.kind.type_name().to_string();
    if column.array {
        type_name.push_str("[]");
    }

    let mut modifiers = Vec::new();
    if !column.required {
        modifiers.push("nullable");
    }
    if column.encrypt {
        modifiers.push("encrypted");
    }

    let attr = Attribute::new(type_name, column.key.as_str());
    if modifiers.is_empty() {
        attr
    } else {
        attr.with_comment(modifiers.join(", "))
    }
}

fn relationship_for(
    owner: &str,
    column: &Column,
    rel: &schema::Relationship,
    names: &EntityNames<'_>,
    options: &CompileOptions,
) -> Option<Relationship> {
    let related_id = rel.related_table.as_deref()?;
    let related = names.resolve(related_id);

    let (left_end, right_end) = ends_for(rel.relation_type, options.cardinality_style);

    let mut label = column.key.clone();
    if rel.on_delete.is_cascade() {
        label.push_str(CASCADE_MARKER);
    }
    if rel.two_way {
        label.push_str(TWO_WAY_MARKER);
    }

    let (left, right) = match rel.side {
        RelationSide::Parent => (related, owner),
        RelationSide::Child => (owner, related),
    };

    Some(Relationship {
        left: left.to_string(),
        left_end,
        right: right.to_string(),
        right_end,
        label,
    })
}

/// Cardinality of the left and right ends for a relation type.
pub const fn ends_for(
    relation_type: RelationType,
    style: CardinalityStyle,
) -> (Cardinality, Cardinality) {
    use Cardinality::{ExactlyOne, ZeroOrMore};

    let (left, right) = match relation_type {
        RelationType::OneToOne => (ExactlyOne, ExactlyOne),
        RelationType::OneToMany => (ZeroOrMore, ExactlyOne),
        RelationType::ManyToOne => (ExactlyOne, ZeroOrMore),
        RelationType::ManyToMany => (ZeroOrMore, ZeroOrMore),
    };
    match style {
        CardinalityStyle::Strict => (left, right),
        CardinalityStyle::Optional => (loosen(left), loosen(right)),
    }
}

const fn loosen(end: Cardinality) -> Cardinality {
    match end {
        Cardinality::ExactlyOne => Cardinality::ZeroOrOne,
        other => other,
    }
}
