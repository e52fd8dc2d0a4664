use serde::{Deserialize, Serialize};
use std::fmt;

use super::patterns;
use super::snapshot::SourceFile;

/// Lines above a declaration searched for annotations
const ANNOTATION_WINDOW: usize = 4;

/// Lines above a declaration searched for documentation comments
const DOC_WINDOW: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Protected,
    Public,
}

impl Visibility {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-line field declaration found in a source file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDeclaration {
    pub class_name: String,
    pub name: String,
    pub field_type: String,
    pub visibility: Visibility,
    pub file_path: String,
    /// 1-based line number
    pub line: usize,
    /// Trimmed declaration text
    pub declaration: String,
    /// Annotation names above the declaration, nearest first
    pub annotations: Vec<String>,
    /// Comment text above the declaration, nearest first
    pub doc_comments: Vec<String>,
}

impl FieldDeclaration {
    /// 0-based index of the declaration line
    pub fn line_index(&self) -> usize {
        self.line - 1
    }
}

/// What a source file contributes to extraction
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Discovery {
    /// The file declares at least one field
    #[serde(rename_all = "camelCase")]
    Fields {
        class_name: String,
        fields: Vec<FieldDeclaration>,
    },
    /// A class with no recognizable field declarations
    #[serde(rename_all = "camelCase")]
    ClassOnly { class_name: String },
}

impl Discovery {
    pub fn class_name(&self) -> &str {
        match self {
            Discovery::Fields { class_name, .. } => class_name,
            Discovery::ClassOnly { class_name } => class_name,
        }
    }
}

/// Line-oriented field declaration scanner
pub struct FieldDiscoverer;

impl FieldDiscoverer {
    pub fn discover(file: &SourceFile) -> Discovery {
        let lines = file.lines();
        let mut fields = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            let Some(caps) = patterns::FIELD_DECLARATION.captures(line) else {
                continue;
            };
            let Some(visibility) = Visibility::parse(&caps[1]) else {
                continue;
            };

            fields.push(FieldDeclaration {
                class_name: file.class_name.clone(),
                name: caps[3].to_string(),
                field_type: caps[2].to_string(),
                visibility,
                file_path: file.relative_path.clone(),
                line: idx + 1,
                declaration: line.trim().to_string(),
                annotations: Self::collect_annotations(&lines, idx),
                doc_comments: Self::collect_doc_comments(&lines, idx),
            });
        }

        if fields.is_empty() {
            Discovery::ClassOnly { class_name: file.class_name.clone() }
        } else {
            Discovery::Fields { class_name: file.class_name.clone(), fields }
        }
    }

    /// Fixed-height window: blank or unrelated lines do not stop the scan
    fn collect_annotations(lines: &[&str], idx: usize) -> Vec<String> {
        (idx.saturating_sub(ANNOTATION_WINDOW)..idx)
            .rev()
            .filter_map(|j| patterns::ANNOTATION_LINE.captures(lines[j].trim()))
            .map(|caps| caps[1].to_string())
            .collect()
    }

    fn collect_doc_comments(lines: &[&str], idx: usize) -> Vec<String> {
        let mut comments = Vec::new();
        for j in (idx.saturating_sub(DOC_WINDOW)..idx).rev() {
            let line = lines[j].trim();
            if let Some(caps) = patterns::JAVADOC_LINE.captures(line) {
                comments.push(caps[1].to_string());
            }
            if let Some(caps) = patterns::LINE_COMMENT.captures(line) {
                comments.push(caps[1].to_string());
            }
        }
        comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::FileKind;

    fn discover(path: &str, content: &str) -> Discovery {
        FieldDiscoverer::discover(&SourceFile::new(path, FileKind::Source, content))
    }

    fn fields(discovery: Discovery) -> Vec<FieldDeclaration> {
        match discovery {
            Discovery::Fields { fields, .. } => fields,
            Discovery::ClassOnly { class_name } => panic!("no fields found in {}", class_name),
        }
    }

    #[test]
    fn test_discovers_single_line_declarations() {
        let found = fields(discover(
            "model/User.java",
            r#"package com.acme.model;

public class User {
    private String email;
    protected int age;
    public List<Order> orders;
    private static final String KIND = "user";
    private Map<String, Integer> counters;

    public String getEmail() { return email; }
}
"#,
        ));

        assert_eq!(found.len(), 3);

        assert_eq!(found[0].name, "email");
        assert_eq!(found[0].field_type, "String");
        assert_eq!(found[0].visibility, Visibility::Private);
        assert_eq!(found[0].line, 4);
        assert_eq!(found[0].declaration, "private String email;");
        assert_eq!(found[0].class_name, "User");

        assert_eq!(found[1].visibility, Visibility::Protected);
        assert_eq!(found[2].field_type, "List<Order>");
        assert_eq!(found[2].visibility, Visibility::Public);
    }

    #[test]
    fn test_annotations_nearest_first_within_window() {
        let found = fields(discover(
            "model/Account.java",
            r#"class Account {
    @Deprecated
    @Id
    @Column(name = "ACCOUNT_ID")

    private Long id;
}
"#,
        ));

        assert_eq!(found[0].annotations, vec!["Column", "Id", "Deprecated"]);
    }

    #[test]
    fn test_annotations_outside_window_are_ignored() {
        let found = fields(discover(
            "model/Account.java",
            "class Account {\n@Entity\n\n\n\n\nprivate Long id;\n}\n",
        ));

        assert!(found[0].annotations.is_empty());
    }

    #[test]
    fn test_doc_comments_collected() {
        let found = fields(discover(
            "model/User.java",
            r#"class User {
    /** Primary contact address */
    // must be unique
    @Column(name = "USER_EMAIL")
    private String email;
}
"#,
        ));

        assert_eq!(found[0].doc_comments, vec![" must be unique", " Primary contact address "]);
    }

    #[test]
    fn test_file_without_fields_is_class_only() {
        let discovery = discover("service/UserService.java", "public class UserService {\n  void run() {}\n}\n");
        assert!(matches!(discovery, Discovery::ClassOnly { .. }));
        assert_eq!(discovery.class_name(), "UserService");
    }

    #[test]
    fn test_discovery_serializes_with_kind_tag() {
        let json = serde_json::to_value(discover("Plain.java", "interface Plain {}")).unwrap();
        assert_eq!(json["kind"], "classOnly");
        assert_eq!(json["className"], "Plain");
    }
}
