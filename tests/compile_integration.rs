use std::path::PathBuf;

use appwrite_erd::app::{Message, Model, ZOOM_MAX, ZOOM_MIN, update};
use appwrite_erd::compiler::{
    CardinalityStyle, CompileError, CompileOptions, SYSTEM_FIELDS, compile, compile_with,
};
use proptest::prelude::*;
use serde_json::json;

const FIXTURE: &str = include_str!("fixtures/appwrite.config.json");

#[test]
fn test_fixture_todo_database() {
    let markup = compile(FIXTURE, Some("todo")).unwrap();
    let expected = r#"erDiagram
    Lists {
        string id "system"
        int sequence "system"
        datetime createdAt "system"
        datetime updatedAt "system"
        string[] permissions "system"
        string name
        string description "nullable"
    }
    Tasks {
        string id "system"
        int sequence "system"
        datetime createdAt "system"
        datetime updatedAt "system"
        string[] permissions "system"
        string title
        string description "nullable"
        boolean completed "nullable"
        datetime dueDate "nullable"
        relationship list "nullable"
    }
    Lists ||--o{ Tasks : "list (cascade)"
"#;
    assert_eq!(markup.as_str(), expected);
}

#[test]
fn test_fixture_internal_database() {
    let markup = compile(FIXTURE, Some("internal")).unwrap();
    assert_eq!(markup.entity_names().collect::<Vec<_>>(), vec!["Config"]);
    assert_eq!(markup.relationship_count(), 0);
    assert!(markup.as_str().contains("        string value\n"));
}

#[test]
fn test_fixture_optional_ends() {
    let options = CompileOptions {
        cardinality_style: CardinalityStyle::Optional,
    };
    let markup = compile_with(FIXTURE, Some("todo"), &options).unwrap();
    assert!(markup.as_str().ends_with("    Lists |o--o{ Tasks : \"list (cascade)\"\n"));
}

#[test]
fn test_truncated_fixture_reports_position() {
    let truncated = &FIXTURE[..FIXTURE.len() / 2];
    let err = compile(truncated, Some("todo")).unwrap_err();
    let CompileError::InvalidDocument { line, .. } = &err;
    assert!(*line > 1);
    assert!(err.to_string().starts_with("Invalid JSON configuration: "));
}

#[test]
fn test_model_over_fixture_selects_first_database() {
    let model = Model::new(
        PathBuf::from("appwrite.config.json"),
        FIXTURE.to_string(),
        CompileOptions::default(),
    );
    assert_eq!(model.selected_database.as_deref(), Some("todo"));
    assert_eq!(model.export_stem(), "To Do (todo)");

    let model = update(model, Message::SelectDatabase("internal".to_string()));
    assert_eq!(model.export_stem(), "Internal (internal)");
    assert!(model.markup_text().is_some_and(|m| m.contains("Config {")));
}

fn table_strategy() -> impl Strategy<Value = serde_json::Value> {
    (
        prop::sample::select(vec!["alpha", "beta", "gamma"]),
        // Small alphabet with `_t<index>` suffixes so renamed entities collide.
        prop_oneof![
            "[A-Z][a-z]{0,5}",
            "[AB](_t[0-7]){0,2}(_2)?",
        ],
        prop::collection::vec(
            ("[a-z]{1,6}", prop::sample::select(vec!["string", "integer", "boolean"])),
            0..4,
        ),
    )
        .prop_map(|(database, name, columns)| {
            let columns: Vec<_> = columns
                .into_iter()
                .map(|(key, ty)| json!({"key": key, "type": ty, "required": true}))
                .collect();
            json!({"databaseId": database, "name": name, "columns": columns})
        })
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(table_strategy(), 0..8).prop_map(|mut tables| {
        for (index, table) in tables.iter_mut().enumerate() {
            table["$id"] = json!(format!("t{index}"));
        }
        json!({
            "tablesDB": [
                {"$id": "alpha", "name": "Alpha"},
                {"$id": "beta", "name": "Beta"},
                {"$id": "gamma", "name": "Gamma"}
            ],
            "tables": tables,
        })
        .to_string()
    })
}

proptest! {
    #[test]
    fn compile_is_deterministic(raw in document_strategy()) {
        let first = compile(&raw, Some("alpha")).unwrap();
        let second = compile(&raw, Some("alpha")).unwrap();
        prop_assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn no_selection_draws_nothing(raw in document_strategy()) {
        let markup = compile(&raw, None).unwrap();
        prop_assert_eq!(markup.as_str(), "erDiagram\n");
    }

    #[test]
    fn entities_match_selected_database(
        raw in document_strategy(),
        database in prop::sample::select(vec!["alpha", "beta", "gamma"]),
    ) {
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let expected = value["tables"]
            .as_array()
            .map_or(0, |tables| {
                tables.iter().filter(|t| t["databaseId"] == database).count()
            });

        let markup = compile(&raw, Some(database)).unwrap();
        prop_assert_eq!(markup.entity_count(), expected);
    }

    #[test]
    fn every_entity_starts_with_system_fields(raw in document_strategy()) {
        let markup = compile(&raw, Some("beta")).unwrap();
        for entity in &markup.diagram().entities {
            prop_assert!(entity.attributes.len() >= SYSTEM_FIELDS.len());
            for (attr, (ty, name)) in entity.attributes.iter().zip(SYSTEM_FIELDS) {
                prop_assert_eq!(attr.type_name.as_str(), ty);
                prop_assert_eq!(attr.name.as_str(), name);
            }
        }
    }

    #[test]
    fn entity_names_are_unique(raw in document_strategy()) {
        let markup = compile(&raw, Some("gamma")).unwrap();
        let names: Vec<_> = markup.entity_names().collect();
        let unique: std::collections::HashSet<_> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn zoom_stays_within_bounds(steps in prop::collection::vec(any::<bool>(), 0..80)) {
        let mut model = Model::new(
            PathBuf::from("appwrite.config.json"),
            FIXTURE.to_string(),
            CompileOptions::default(),
        );
        for zoom_in in steps {
            let msg = if zoom_in {
                Message::ZoomIn { width: 800.0, height: 600.0 }
            } else {
                Message::ZoomOut { width: 800.0, height: 600.0 }
            };
            model = update(model, msg);
            let scale = model.zoom.scale_percent();
            prop_assert!((ZOOM_MIN..=ZOOM_MAX).contains(&scale));
        }
    }
}
