// src/core/record.rs
use std::collections::{BTreeSet, HashSet};
use serde::{Deserialize, Serialize};

use super::discoverer::FieldDeclaration;
use super::graph::DependencyGraph;
use super::impact::ImpactReport;
use super::layer::Layer;
use super::process_diff::ProcessDiff;
use super::scanner::Occurrence;

/// Declaration metadata stamped on every attribute record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Declaring file, relative to the project root
    pub source: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Always null; kept for consumers that expect the key
    pub dependency: Option<String>,
    pub annotations: Vec<String>,
    pub repo_revision: String,
    pub timestamp: String,
}

/// Everything known about one field, serialized as one JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRecord {
    pub attribute_name: String,
    pub aliases: Vec<String>,
    pub components: Vec<Occurrence>,
    pub dependencies: DependencyGraph,
    pub impact: ImpactReport,
    pub process_diff: ProcessDiff,
    pub meta: Metadata,
    pub explanation: String,
    #[serde(rename = "Batch_ID")]
    pub batch_id: String,
    #[serde(rename = "created_at")]
    pub created_at: String,
    pub full_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetadata {
    #[serde(rename = "type")]
    pub class_type: String,
    pub source: String,
    pub annotations: Vec<String>,
    pub dependency: Option<String>,
}

/// Record for a class that declares no recognizable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub attribute_name: String,
    pub meta: ClassMetadata,
    pub explanation: String,
    pub dependencies: DependencyGraph,
    #[serde(rename = "Batch_ID")]
    pub batch_id: String,
    #[serde(rename = "created_at")]
    pub created_at: String,
    pub full_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedRecord {
    Attribute(Box<AttributeRecord>),
    Class(ClassRecord),
}

impl ExtractedRecord {
    /// Output key; records sharing it overwrite each other
    pub fn attribute_name(&self) -> &str {
        match self {
            ExtractedRecord::Attribute(record) => &record.attribute_name,
            ExtractedRecord::Class(record) => &record.attribute_name,
        }
    }
}

/// Keep the first occurrence per (class name, layer, file path).
///
/// Distinct lines in the same class and file collapse into one entry.
pub fn dedup_occurrences(occurrences: impl IntoIterator<Item = Occurrence>) -> Vec<Occurrence> {
    let mut seen: HashSet<(String, Layer, String)> = HashSet::new();
    occurrences.into_iter()
        .filter(|o| {
            let (class_name, layer, file_path) = o.dedup_key();
            seen.insert((class_name.to_string(), layer, file_path.to_string()))
        })
        .collect()
}

/// Merges per-field analysis results into records for one batch
pub struct RecordAssembler {
    batch_id: String,
    revision: String,
}

impl RecordAssembler {
    pub fn new(batch_id: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            revision: revision.into(),
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// `references` are the scanner's findings; the declaration is prepended
    /// before deduplication so it always survives.
    pub fn assemble(
        &self,
        field: &FieldDeclaration,
        declaring_layer: Layer,
        aliases: BTreeSet<String>,
        references: Vec<Occurrence>,
        full_source: &str,
    ) -> AttributeRecord {
        let declaration = Occurrence::declaration(field, declaring_layer);
        let explanation = declaration.explanation.clone();

        let components = dedup_occurrences(std::iter::once(declaration).chain(references));
        let dependencies = DependencyGraph::build(&field.class_name, &field.name, &components);
        let impact = ImpactReport::classify(field, &components);
        let process_diff = ProcessDiff::compute(&field.name, &components);

        AttributeRecord {
            attribute_name: field.name.clone(),
            aliases: aliases.into_iter().collect(),
            components,
            dependencies,
            impact,
            process_diff,
            meta: Metadata {
                source: field.file_path.clone(),
                field_type: field.field_type.clone(),
                dependency: None,
                annotations: field.annotations.clone(),
                repo_revision: self.revision.clone(),
                timestamp: now(),
            },
            explanation,
            batch_id: self.batch_id.clone(),
            created_at: now(),
            full_source: full_source.to_string(),
        }
    }

    pub fn assemble_class(&self, class_name: &str, source: &str, full_source: &str) -> ClassRecord {
        ClassRecord {
            attribute_name: class_name.to_string(),
            meta: ClassMetadata {
                class_type: class_name.to_string(),
                source: source.to_string(),
                annotations: Vec::new(),
                dependency: None,
            },
            explanation: format!("• '{}' is a top-level class.", class_name),
            dependencies: DependencyGraph::single(class_name),
            batch_id: self.batch_id.clone(),
            created_at: now(),
            full_source: full_source.to_string(),
        }
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discoverer::Visibility;
    use crate::core::scanner::UsageKind;

    fn field() -> FieldDeclaration {
        FieldDeclaration {
            class_name: "User".to_string(),
            name: "email".to_string(),
            field_type: "String".to_string(),
            visibility: Visibility::Private,
            file_path: "model/User.java".to_string(),
            line: 4,
            declaration: "private String email;".to_string(),
            annotations: vec!["Column".to_string()],
            doc_comments: vec![],
        }
    }

    fn reference(class_name: &str, file_path: &str, layer: Layer, line: usize) -> Occurrence {
        Occurrence {
            layer,
            file_path: file_path.to_string(),
            class_name: class_name.to_string(),
            usage: UsageKind::Reference,
            snippet: format!("line {}", line),
            line,
            explanation: format!("Reference to email in class {}", class_name),
            sql: Some(false),
            orm: Some(vec![]),
        }
    }

    #[test]
    fn test_dedup_keeps_first_per_class_layer_file() {
        let deduped = dedup_occurrences(vec![
            reference("UserService", "service/UserService.java", Layer::Service, 3),
            reference("UserService", "service/UserService.java", Layer::Service, 9),
            reference("UserService", "service/legacy/UserService.java", Layer::Service, 2),
        ]);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].line, 3);
        assert_eq!(deduped[0].dedup_key(), ("UserService", Layer::Service, "service/UserService.java"));
        assert_eq!(deduped[1].file_path, "service/legacy/UserService.java");
    }

    #[test]
    fn test_declaration_survives_dedup() {
        let assembler = RecordAssembler::new("BATCH_1", "N/A");
        let record = assembler.assemble(
            &field(),
            Layer::Model,
            BTreeSet::new(),
            vec![reference("User", "model/User.java", Layer::Model, 8)],
            "class User {}",
        );

        assert_eq!(record.components.len(), 1);
        assert_eq!(record.components[0].usage, UsageKind::Declaration(Visibility::Private));
        assert_eq!(record.explanation, "Field email of type String in class User");
        assert_eq!(record.dependencies.edges.len(), 1);
    }

    #[test]
    fn test_record_wire_format() {
        let assembler = RecordAssembler::new("BATCH_2", "abc123");
        let record = assembler.assemble(
            &field(),
            Layer::Default,
            ["USER_EMAIL".to_string()].into_iter().collect(),
            vec![],
            "class User {}",
        );
        let json = serde_json::to_value(ExtractedRecord::Attribute(Box::new(record))).unwrap();

        assert_eq!(json["attributeName"], "email");
        assert_eq!(json["aliases"], serde_json::json!(["USER_EMAIL"]));
        assert_eq!(json["Batch_ID"], "BATCH_2");
        assert!(json["created_at"].is_string());
        assert_eq!(json["fullSource"], "class User {}");
        assert_eq!(json["meta"]["type"], "String");
        assert_eq!(json["meta"]["repoRevision"], "abc123");
        assert!(json["meta"]["dependency"].is_null());
        assert_eq!(json["components"][0]["usageType"], "private");
        assert_eq!(json["components"][0]["lineRange"], 4);
        assert!(json["components"][0].get("sql").is_none());
        assert_eq!(json["processDiff"]["missing"].as_array().unwrap().len(), 2);
        assert!(json["dependencies"]["edges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_class_record_shape() {
        let assembler = RecordAssembler::new("BATCH_1", "N/A");
        let record = assembler.assemble_class("UserService", "service/UserService.java", "class UserService {}");
        let json = serde_json::to_value(ExtractedRecord::Class(record)).unwrap();

        assert_eq!(json["attributeName"], "UserService");
        assert_eq!(json["meta"]["type"], "UserService");
        assert_eq!(json["explanation"], "• 'UserService' is a top-level class.");
        assert_eq!(json["dependencies"]["nodes"], serde_json::json!(["UserService"]));
        assert!(json["dependencies"]["edges"].as_array().unwrap().is_empty());
    }
}
