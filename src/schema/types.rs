//! Types describing an Appwrite schema document.

use serde::Serialize;

/// A parsed `appwrite.config.json` document.
///
/// Only the parts relevant to diagramming are kept. The document is a
/// read-only projection: it is rebuilt from raw text on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDocument {
    /// Databases in document order.
    pub databases: Vec<Database>,
    /// Tables in document order, across all databases.
    pub tables: Vec<Table>,
}

impl SchemaDocument {
    /// Tables belonging to the given database, in document order.
    ///
    /// `None` selects nothing: without a database there is no working set.
    pub fn tables_in<'a>(&'a self, database_id: Option<&'a str>) -> impl Iterator<Item = &'a Table> {
        self.tables
            .iter()
            .filter(move |table| database_id.is_some_and(|id| table.database_id == id))
    }
}

/// A database entry from `tablesDB`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Database {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}

/// A table scoped to one database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub id: String,
    pub database_id: String,
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Diagram entity name: the table name with all whitespace removed.
    ///
    /// Falls back to the table id when nothing is left.
    pub fn entity_name(&self) -> String {
        let stripped: String = self.name.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            self.id.clone()
        } else {
            stripped
        }
    }

    /// Relationship columns of this table, in column order.
    pub fn relationships(&self) -> impl Iterator<Item = (&Column, &Relationship)> {
        self.columns.iter().filter_map(|column| match &column.kind {
            ColumnKind::Relationship(rel) => Some((column, rel)),
            _ => None,
        })
    }
}

/// A user-defined column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub kind: ColumnKind,
    pub required: bool,
    pub array: bool,
    pub encrypt: bool,
}

/// Column kinds known to Appwrite, plus a catch-all for anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Email,
    Ip,
    Url,
    Enum,
    Point,
    Line,
    Polygon,
    Relationship(Relationship),
    /// Unrecognized `type`, kept verbatim.
    Other(String),
}

impl ColumnKind {
    /// Classify a raw `type` discriminator.
    ///
    /// Relationship columns need their extra fields, so the parser builds
    /// that variant itself; this only handles scalar kinds.
    pub fn scalar(type_name: &str) -> Self {
        match type_name {
            "string" => Self::String,
            "integer" => Self::Integer,
            "double" => Self::Float,
            "boolean" => Self::Boolean,
            "datetime" => Self::Datetime,
            "email" => Self::Email,
            "ip" => Self::Ip,
            "url" => Self::Url,
            "enum" => Self::Enum,
            "point" => Self::Point,
            "linestring" => Self::Line,
            "polygon" => Self::Polygon,
            other => Self::Other(other.to_string()),
        }
    }

    /// The type name written into the diagram.
    pub fn type_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "double",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Email => "email",
            Self::Ip => "ip",
            Self::Url => "url",
            Self::Enum => "enum",
            Self::Point => "point",
            Self::Line => "linestring",
            Self::Polygon => "polygon",
            Self::Relationship(_) => "relationship",
            Self::Other(raw) => raw,
        }
    }
}

/// Fields specific to `type: "relationship"` columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationship {
    pub related_table: Option<String>,
    pub relation_type: RelationType,
    pub two_way: bool,
    pub two_way_key: Option<String>,
    pub on_delete: OnDelete,
    pub side: RelationSide,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToOne,
    /// Also used for absent or unrecognized values.
    #[default]
    ManyToMany,
}

impl RelationType {
    pub fn parse(value: &str) -> Self {
        match value {
            "oneToOne" => Self::OneToOne,
            "oneToMany" => Self::OneToMany,
            "manyToOne" => Self::ManyToOne,
            _ => Self::ManyToMany,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    Restrict,
    SetNull,
    /// Absent values are `Other("")`.
    Other(String),
}

impl Default for OnDelete {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl OnDelete {
    pub fn parse(value: &str) -> Self {
        match value {
            "cascade" => Self::Cascade,
            "restrict" => Self::Restrict,
            "setNull" => Self::SetNull,
            other => Self::Other(other.to_string()),
        }
    }

    pub const fn is_cascade(&self) -> bool {
        matches!(self, Self::Cascade)
    }
}

/// Which end of the relationship the column lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationSide {
    Parent,
    #[default]
    Child,
}

impl RelationSide {
    pub fn parse(value: &str) -> Self {
        if value == "parent" {
            Self::Parent
        } else {
            Self::Child
        }
    }
}
