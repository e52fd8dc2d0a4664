// src/core/scanner.rs
use std::fmt;
use std::str::FromStr;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use super::discoverer::{FieldDeclaration, Visibility};
use super::layer::Layer;
use super::patterns;
use super::snapshot::{FileKind, ProjectSnapshot, SourceFile};

/// How a field shows up at an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageKind {
    /// The declaration itself, serialized as its visibility keyword
    Declaration(Visibility),
    Reference,
    UiReference,
    RestAnnotation,
    ExternalCall,
}

impl UsageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::Declaration(visibility) => visibility.as_str(),
            UsageKind::Reference => "REFERENCE",
            UsageKind::UiReference => "UI_REFERENCE",
            UsageKind::RestAnnotation => "REST_ANNOTATION",
            UsageKind::ExternalCall => "EXTERNAL_CALL",
        }
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, UsageKind::Declaration(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, UsageKind::Reference | UsageKind::UiReference)
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(visibility) = Visibility::parse(s) {
            return Ok(UsageKind::Declaration(visibility));
        }
        match s {
            "REFERENCE" => Ok(UsageKind::Reference),
            "UI_REFERENCE" => Ok(UsageKind::UiReference),
            "REST_ANNOTATION" => Ok(UsageKind::RestAnnotation),
            "EXTERNAL_CALL" => Ok(UsageKind::ExternalCall),
            other => Err(format!("unknown usage type: {}", other)),
        }
    }
}

impl Serialize for UsageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UsageKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One textual hit of a field, or a file-level finding (`line == 0`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    #[serde(rename = "type")]
    pub layer: Layer,
    pub file_path: String,
    pub class_name: String,
    #[serde(rename = "usageType")]
    pub usage: UsageKind,
    pub snippet: String,
    #[serde(rename = "lineRange")]
    pub line: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orm: Option<Vec<String>>,
}

impl Occurrence {
    /// The declaration as the first component of a record
    pub fn declaration(field: &FieldDeclaration, layer: Layer) -> Self {
        Self {
            layer,
            file_path: field.file_path.clone(),
            class_name: field.class_name.clone(),
            usage: UsageKind::Declaration(field.visibility),
            snippet: field.declaration.clone(),
            line: field.line,
            explanation: format!(
                "Field {} of type {} in class {}",
                field.name, field.field_type, field.class_name
            ),
            sql: None,
            orm: None,
        }
    }

    /// Records keep one occurrence per (class, layer, file)
    pub fn dedup_key(&self) -> (&str, Layer, &str) {
        (&self.class_name, self.layer, &self.file_path)
    }
}

#[derive(Default)]
struct FileFindings {
    references: Vec<Occurrence>,
    ui_references: Vec<Occurrence>,
    file_level: Vec<Occurrence>,
}

/// Sweeps every snapshot file for textual uses of one field
pub struct ReferenceScanner<'a> {
    snapshot: &'a ProjectSnapshot,
}

impl<'a> ReferenceScanner<'a> {
    pub fn new(snapshot: &'a ProjectSnapshot) -> Self {
        Self { snapshot }
    }

    /// Occurrences of `field_name` across the project.
    ///
    /// Code references come first (snapshot order), then markup references,
    /// then the file-level REST and external-call findings.
    pub fn scan(&self, field_name: &str, declaring_path: &str, declaration: &str) -> Result<Vec<Occurrence>> {
        let word = patterns::whole_word(field_name)?;

        let findings: Vec<FileFindings> = self.snapshot.files()
            .par_iter()
            .map(|file| match file.kind {
                FileKind::Source => FileFindings {
                    references: Self::scan_source(file, &word, field_name, declaring_path, declaration),
                    file_level: Self::file_level_findings(file),
                    ..Default::default()
                },
                FileKind::Markup => FileFindings {
                    ui_references: Self::scan_markup(file, &word, field_name),
                    ..Default::default()
                },
            })
            .collect();

        let mut occurrences: Vec<Occurrence> = Vec::new();
        occurrences.extend(findings.iter().flat_map(|f| f.references.iter().cloned()));
        occurrences.extend(findings.iter().flat_map(|f| f.ui_references.iter().cloned()));
        occurrences.extend(findings.into_iter().flat_map(|f| f.file_level));

        Ok(occurrences)
    }

    fn scan_source(
        file: &SourceFile,
        word: &Regex,
        field_name: &str,
        declaring_path: &str,
        declaration: &str,
    ) -> Vec<Occurrence> {
        let lines = file.lines();
        let line_starts = line_starts(&file.content);

        word.find_iter(&file.content)
            .filter_map(|m| {
                let idx = line_index_at(&line_starts, m.start());
                let context_line = lines.get(idx).map(|l| l.trim()).unwrap_or("");

                if file.relative_path == declaring_path && context_line == declaration {
                    return None;
                }

                Some(Occurrence {
                    layer: file.layer,
                    file_path: file.relative_path.clone(),
                    class_name: file.class_name.clone(),
                    usage: UsageKind::Reference,
                    snippet: context_line.to_string(),
                    line: idx + 1,
                    explanation: format!("Reference to {} in class {}", field_name, file.class_name),
                    sql: Some(patterns::SQL_VERB.is_match(context_line)),
                    orm: Some(file.orm_annotations.clone()),
                })
            })
            .collect()
    }

    fn scan_markup(file: &SourceFile, word: &Regex, field_name: &str) -> Vec<Occurrence> {
        let lines = file.lines();
        let line_starts = line_starts(&file.content);

        word.find_iter(&file.content)
            .map(|m| {
                let idx = line_index_at(&line_starts, m.start());
                Occurrence {
                    layer: file.layer,
                    file_path: file.relative_path.clone(),
                    class_name: file.class_name.clone(),
                    usage: UsageKind::UiReference,
                    snippet: lines.get(idx).map(|l| l.trim()).unwrap_or("").to_string(),
                    line: idx + 1,
                    explanation: format!("UI reference to {} in {}", field_name, file.file_name),
                    sql: None,
                    orm: None,
                }
            })
            .collect()
    }

    /// At most one REST and one external-call finding per file, not anchored to a line
    fn file_level_findings(file: &SourceFile) -> Vec<Occurrence> {
        let mut findings = Vec::new();

        if !file.rest_annotations.is_empty() {
            findings.push(Occurrence {
                layer: Layer::Controller,
                file_path: file.relative_path.clone(),
                class_name: file.file_stem.clone(),
                usage: UsageKind::RestAnnotation,
                snippet: file.rest_annotations.join(", "),
                line: 0,
                explanation: format!("REST API annotation(s) in {}", file.file_name),
                sql: None,
                orm: None,
            });
        }

        if !file.external_calls.is_empty() {
            findings.push(Occurrence {
                layer: Layer::Integration,
                file_path: file.relative_path.clone(),
                class_name: file.file_stem.clone(),
                usage: UsageKind::ExternalCall,
                snippet: file.external_calls.join(", "),
                line: 0,
                explanation: format!("External API call(s) in {}", file.file_name),
                sql: None,
                orm: None,
            });
        }

        findings
    }
}

/// Byte offsets at which each line starts
fn line_starts(content: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// 0-based line index containing byte `offset`
fn line_index_at(line_starts: &[usize], offset: usize) -> usize {
    line_starts.partition_point(|&start| start <= offset).saturating_sub(1)
}
