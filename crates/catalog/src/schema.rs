//! JSON Schema validation of metadata items.
//!
//! The bundled schemas reference each other by `$id`. They are compiled as a
//! single compound document: the catalog schema is the root and every other
//! schema is embedded under `$defs` with its `$id` intact, so cross-document
//! references resolve without any network or filesystem lookup.

use crate::error::{CatalogError, CatalogErrorExt};
use crate::templates::SCHEMAS;
use catalog_domain::constants::CATALOG_SCHEMA_ID;
use jsonschema::Validator;
use serde_json::{Map, Value};
use tracing::debug;

/// Upper bound on reported violations for a single item.
const MAX_REPORTED_ERRORS: usize = 5;

/// Compiled validator for catalog metadata items.
pub struct CatalogSchema {
    validator: Validator,
}

impl std::fmt::Debug for CatalogSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSchema").finish_non_exhaustive()
    }
}

impl CatalogSchema {
    /// Compiles the bundled schemas.
    ///
    /// # Errors
    /// Returns [`CatalogError::Json`] if a bundled document is not JSON, and
    /// [`CatalogError::Schema`] if the composed schema does not compile.
    pub fn bundled() -> Result<Self, CatalogError> {
        let documents = SCHEMAS
            .iter()
            .map(|(id, raw)| {
                serde_json::from_str::<Value>(raw)
                    .context(format!("Bundled schema is not valid JSON: {id}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_documents(CATALOG_SCHEMA_ID, documents)
    }

    /// Compiles `documents` with the one whose `$id` equals `root_id` as entry point.
    ///
    /// # Errors
    /// Returns [`CatalogError::Schema`] if the root is missing or compilation fails.
    pub fn from_documents(root_id: &str, documents: Vec<Value>) -> Result<Self, CatalogError> {
        let schema = compose(root_id, documents)?;

        let validator = jsonschema::draft202012::new(&schema).map_err(|e| CatalogError::Schema {
            message: e.to_string().into(),
            context: Some("Failed to compile catalog schema".into()),
        })?;

        debug!(root = root_id, "Catalog schema compiled");
        Ok(Self { validator })
    }

    #[must_use]
    pub fn is_valid(&self, item: &Value) -> bool {
        self.validator.is_valid(item)
    }

    /// Validates a single item and describes every violation found.
    ///
    /// # Errors
    /// Returns the violation messages, each with the location inside the item.
    pub fn validate(&self, item: &Value) -> Result<(), Vec<String>> {
        if self.is_valid(item) {
            return Ok(());
        }

        let errors: Vec<String> = self
            .validator
            .iter_errors(item)
            .take(MAX_REPORTED_ERRORS)
            .map(|e| {
                let location = e.instance_path.to_string();
                if location.is_empty() { e.to_string() } else { format!("{e} (at {location})") }
            })
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Builds one compound schema: the root document with the others under `$defs`.
fn compose(root_id: &str, documents: Vec<Value>) -> Result<Value, CatalogError> {
    let mut root: Option<Map<String, Value>> = None;
    let mut embedded = Map::new();

    for document in documents {
        let Value::Object(object) = document else {
            return Err(CatalogError::Schema {
                message: "schema document is not an object".into(),
                context: None,
            });
        };

        let id = object.get("$id").and_then(Value::as_str).map(str::to_owned).ok_or_else(|| {
            CatalogError::Schema { message: "schema document without `$id`".into(), context: None }
        })?;

        if id == root_id {
            root = Some(object);
        } else {
            embedded.insert(def_name(&id), Value::Object(object));
        }
    }

    let mut root = root.ok_or_else(|| CatalogError::Schema {
        message: root_id.to_owned().into(),
        context: Some("Root schema not among the supplied documents".into()),
    })?;

    match root.get_mut("$defs") {
        Some(Value::Object(defs)) => defs.extend(embedded),
        Some(_) => {
            return Err(CatalogError::Schema {
                message: "`$defs` of the root schema is not an object".into(),
                context: None,
            });
        },
        None => {
            root.insert("$defs".to_owned(), Value::Object(embedded));
        },
    }

    Ok(Value::Object(root))
}

/// `https://datalad.org/catalog.file.schema.json` becomes `catalog.file`.
fn def_name(id: &str) -> String {
    let last = id.rsplit('/').next().unwrap_or(id);
    last.trim_end_matches(".json").trim_end_matches(".schema").to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn def_names_are_derived_from_ids() {
        assert_eq!(def_name("https://datalad.org/catalog.file.schema.json"), "catalog.file");
        assert_eq!(def_name("https://datalad.org/catalog.schema.json"), "catalog");
    }

    #[test]
    fn compose_embeds_non_root_documents() {
        let root = json!({ "$id": "https://x.org/root.schema.json", "$ref": "https://x.org/leaf.schema.json" });
        let leaf = json!({ "$id": "https://x.org/leaf.schema.json", "type": "string" });

        let composed = compose("https://x.org/root.schema.json", vec![root, leaf]).unwrap();
        assert_eq!(composed["$defs"]["leaf"]["type"], "string");
        assert_eq!(composed["$defs"]["leaf"]["$id"], "https://x.org/leaf.schema.json");
    }

    #[test]
    fn compose_requires_the_root() {
        let leaf = json!({ "$id": "https://x.org/leaf.schema.json" });
        let err = compose("https://x.org/root.schema.json", vec![leaf]).unwrap_err();
        assert!(matches!(err, CatalogError::Schema { .. }));
    }

    #[test]
    fn embedded_references_resolve() {
        let root = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$id": "https://x.org/root.schema.json",
            "type": "object",
            "properties": { "leaf": { "$ref": "https://x.org/leaf.schema.json" } }
        });
        let leaf = json!({ "$id": "https://x.org/leaf.schema.json", "type": "string" });

        let schema = CatalogSchema::from_documents("https://x.org/root.schema.json", vec![root, leaf])
            .unwrap();
        assert!(schema.is_valid(&json!({ "leaf": "ok" })));
        assert!(!schema.is_valid(&json!({ "leaf": 3 })));
    }

    #[test]
    fn bundled_schema_accepts_datasets_and_files() {
        let schema = CatalogSchema::bundled().unwrap();

        let dataset = json!({
            "type": "dataset",
            "dataset_id": "5df8eb3a-95c5-11ea-b4b9-a0369f287950",
            "dataset_version": "dae38cf901995aace0dde5346515a0134f919523",
            "name": "Studyforrest",
            "authors": [{ "givenName": "Michael", "familyName": "Hanke" }],
            "metadata_sources": { "sources": [{ "source_name": "metalad_core", "source_version": "1" }] }
        });
        assert!(schema.validate(&dataset).is_ok());

        let file = json!({
            "type": "file",
            "dataset_id": "5df8eb3a-95c5-11ea-b4b9-a0369f287950",
            "dataset_version": "dae38cf901995aace0dde5346515a0134f919523",
            "path": "code/README.md",
            "contentbytesize": 1403
        });
        assert!(schema.validate(&file).is_ok());
    }

    #[test]
    fn bundled_schema_reports_violations() {
        let schema = CatalogSchema::bundled().unwrap();

        assert!(schema.validate(&json!({ "type": "dataset", "dataset_id": "a" })).is_err());
        assert!(schema.validate(&json!({ "type": "collection" })).is_err());
        assert!(schema.validate(&json!([1, 2, 3])).is_err());

        let errors = schema
            .validate(&json!({
                "type": "file",
                "dataset_id": "a",
                "dataset_version": "1",
                "path": "x.txt",
                "contentbytesize": -1
            }))
            .unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn identifiers_must_be_path_segments() {
        let schema = CatalogSchema::bundled().unwrap();
        let dataset = |id: &str, version: &str| {
            json!({ "type": "dataset", "dataset_id": id, "dataset_version": version })
        };

        assert!(schema.is_valid(&dataset("ds_001.a-b", "1.0")));
        assert!(!schema.is_valid(&dataset("ds 001", "1.0")));
        assert!(!schema.is_valid(&dataset("ds", "1.0+build")));
        assert!(!schema.is_valid(&dataset("..", "1")));
        assert!(!schema.is_valid(&dataset("a/b", "1")));

        let subdataset = json!({
            "type": "dataset",
            "dataset_id": "super",
            "dataset_version": "1",
            "subdatasets": [{ "dataset_id": "sub", "dataset_version": ".", "dataset_path": "sub" }]
        });
        assert!(!schema.is_valid(&subdataset));

        let file = json!({ "type": "file", "dataset_id": "ds", "dataset_version": "v 1", "path": "a.txt" });
        assert!(!schema.is_valid(&file));
    }
}
