//! Four-quadrant impact classification.
//!
//! Rules are evaluated per quadrant independently, so one occurrence can
//! appear in several quadrants (or several times in one).

use serde::{Deserialize, Serialize};

use super::discoverer::FieldDeclaration;
use super::layer::Layer;
use super::scanner::{Occurrence, UsageKind};

pub const NO_IMPACT: &str = "No impact found for this section.";

const SQL_KEYWORDS: &[&str] = &["sql", "select", "insert", "update", "delete", "where", "from"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEntry {
    pub explanation: String,
    pub file_path: Option<String>,
    pub line_range: Option<usize>,
}

impl ImpactEntry {
    fn at(explanation: String, occurrence: &Occurrence) -> Self {
        Self {
            explanation,
            file_path: Some(occurrence.file_path.clone()),
            line_range: Some(occurrence.line),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            explanation: NO_IMPACT.to_string(),
            file_path: None,
            line_range: None,
        }
    }

    #[cfg(test)]
    pub fn is_placeholder(&self) -> bool {
        self.file_path.is_none() && self.explanation == NO_IMPACT
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub application: Vec<ImpactEntry>,
    pub database: Vec<ImpactEntry>,
    pub integration: Vec<ImpactEntry>,
    pub docs_testing: Vec<ImpactEntry>,
}

impl ImpactReport {
    /// Classify `occurrences` of `field`; every quadrant ends up non-empty
    pub fn classify(field: &FieldDeclaration, occurrences: &[Occurrence]) -> Self {
        let name = field.name.as_str();
        let mut report = Self::default();

        for occ in occurrences {
            let snippet = occ.snippet.to_lowercase();
            let class_name = &occ.class_name;

            // Application logic
            if matches!(occ.layer, Layer::Service | Layer::Controller) {
                report.application.push(ImpactEntry::at(
                    format!("Logic in {} may rely on {}", class_name, name), occ));
                if snippet.contains("set") || snippet.contains("update") {
                    report.application.push(ImpactEntry::at(
                        format!("Setter/update method for {} in {}", name, class_name), occ));
                }
                if snippet.contains("get") {
                    report.application.push(ImpactEntry::at(
                        format!("Getter/accessor for {} in {}", name, class_name), occ));
                }
                if occ.usage == UsageKind::Reference {
                    report.application.push(ImpactEntry::at(
                        format!("Direct reference to {} in {}", name, class_name), occ));
                }
            }

            // Database / persistence
            if occ.layer == Layer::Repository {
                report.database.push(ImpactEntry::at(
                    format!("Repository {} queries or updates {}", class_name, name), occ));
                if snippet.contains("find") || snippet.contains("save") {
                    report.database.push(ImpactEntry::at(
                        format!("Repository method {} interacts with {}", occ.snippet, name), occ));
                }
            }
            if SQL_KEYWORDS.iter().any(|kw| snippet.contains(kw)) {
                report.database.push(ImpactEntry::at(
                    format!("SQL/ORM logic involving {} in {}", name, class_name), occ));
            }
            if snippet.contains("@column") {
                report.database.push(ImpactEntry::at(
                    format!("ORM annotation {} for {} in {}", occ.snippet, name, class_name), occ));
            }

            // Integration / API
            if occ.layer == Layer::Controller {
                report.integration.push(ImpactEntry::at(
                    format!("API endpoint in {} exposes or modifies {}", class_name, name), occ));
                if snippet.contains("@getmapping") || snippet.contains("resttemplate") {
                    report.integration.push(ImpactEntry::at(
                        format!("REST mapping or external API for {} in {}", name, class_name), occ));
                }
            }
            if occ.layer == Layer::Integration {
                report.integration.push(ImpactEntry::at(
                    format!("External API call {} in {} uses {}", occ.snippet, class_name, name), occ));
            }
            if occ.layer == Layer::Ui {
                report.integration.push(ImpactEntry::at(
                    format!("UI element in {} binds to {}", class_name, name), occ));
            }
            if occ.usage == UsageKind::UiReference {
                report.integration.push(ImpactEntry::at(
                    format!("UI reference to {} in {}", name, class_name), occ));
            }

            // Documentation / testing
            if class_name.to_lowercase().contains("test") {
                report.docs_testing.push(ImpactEntry::at(
                    format!("Test class {} covers {}", class_name, name), occ));
            }
            if snippet.contains("@org.junit.test") || snippet.contains("assert") {
                report.docs_testing.push(ImpactEntry::at(
                    format!("JUnit test for {} in {}", name, class_name), occ));
            }
            if snippet.contains("doc") || snippet.contains("javadoc") {
                report.docs_testing.push(ImpactEntry::at(
                    format!("Documentation for {} in {}", name, class_name), occ));
            }
        }

        for comment in &field.doc_comments {
            report.docs_testing.push(ImpactEntry {
                explanation: format!("Doc comment: {} for {} in {}", comment, name, field.class_name),
                file_path: Some(field.file_path.clone()),
                line_range: Some(field.line),
            });
        }

        report.fill_empty_quadrants();
        report
    }

    fn fill_empty_quadrants(&mut self) {
        for quadrant in [
            &mut self.application,
            &mut self.database,
            &mut self.integration,
            &mut self.docs_testing,
        ] {
            if quadrant.is_empty() {
                quadrant.push(ImpactEntry::placeholder());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discoverer::Visibility;

    fn field(doc_comments: Vec<&str>) -> FieldDeclaration {
        FieldDeclaration {
            class_name: "User".to_string(),
            name: "email".to_string(),
            field_type: "String".to_string(),
            visibility: Visibility::Private,
            file_path: "model/User.java".to_string(),
            line: 7,
            declaration: "private String email;".to_string(),
            annotations: vec![],
            doc_comments: doc_comments.into_iter().map(String::from).collect(),
        }
    }

    fn occurrence(class_name: &str, layer: Layer, usage: UsageKind, snippet: &str) -> Occurrence {
        Occurrence {
            layer,
            file_path: format!("src/{}.java", class_name),
            class_name: class_name.to_string(),
            usage,
            snippet: snippet.to_string(),
            line: 3,
            explanation: String::new(),
            sql: None,
            orm: None,
        }
    }

    fn explanations(entries: &[ImpactEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.explanation.as_str()).collect()
    }

    #[test]
    fn test_no_occurrences_yield_placeholders_everywhere() {
        let report = ImpactReport::classify(&field(vec![]), &[]);

        for quadrant in [&report.application, &report.database, &report.integration, &report.docs_testing] {
            assert_eq!(quadrant.len(), 1);
            assert!(quadrant[0].is_placeholder());
            assert_eq!(quadrant[0].line_range, None);
        }
    }

    #[test]
    fn test_service_reference_application_findings() {
        let occurrences = vec![occurrence(
            "UserService", Layer::Service, UsageKind::Reference, "user.setEmail(dto.getEmail());",
        )];
        let report = ImpactReport::classify(&field(vec![]), &occurrences);

        assert_eq!(explanations(&report.application), vec![
            "Logic in UserService may rely on email",
            "Setter/update method for email in UserService",
            "Getter/accessor for email in UserService",
            "Direct reference to email in UserService",
        ]);
        assert_eq!(report.application[0].file_path.as_deref(), Some("src/UserService.java"));
        assert_eq!(report.application[0].line_range, Some(3));
    }

    #[test]
    fn test_repository_and_sql_findings() {
        let occurrences = vec![
            occurrence("UserRepository", Layer::Repository, UsageKind::Reference, "findByEmail(email)"),
            occurrence("User", Layer::Model, UsageKind::Reference, "@Column(name = \"EMAIL\") // sql"),
        ];
        let report = ImpactReport::classify(&field(vec![]), &occurrences);

        assert_eq!(explanations(&report.database), vec![
            "Repository UserRepository queries or updates email",
            "Repository method findByEmail(email) interacts with email",
            "SQL/ORM logic involving email in User",
            "ORM annotation @Column(name = \"EMAIL\") // sql for email in User",
        ]);
    }

    #[test]
    fn test_integration_findings() {
        let occurrences = vec![
            occurrence("UserController", Layer::Controller, UsageKind::Reference, "@GetMapping(\"/email\")"),
            occurrence("Client", Layer::Integration, UsageKind::ExternalCall, "restTemplate.get"),
            occurrence("profile", Layer::Ui, UsageKind::UiReference, "{{email}}"),
        ];
        let report = ImpactReport::classify(&field(vec![]), &occurrences);

        assert_eq!(explanations(&report.integration), vec![
            "API endpoint in UserController exposes or modifies email",
            "REST mapping or external API for email in UserController",
            "External API call restTemplate.get in Client uses email",
            "UI element in profile binds to email",
            "UI reference to email in profile",
        ]);
    }

    #[test]
    fn test_docs_and_testing_findings() {
        let occurrences = vec![
            occurrence("UserTest", Layer::Default, UsageKind::Reference, "assertEquals(\"a@b.c\", user.email);"),
        ];
        let report = ImpactReport::classify(&field(vec![" Primary contact", " unique"]), &occurrences);

        assert_eq!(explanations(&report.docs_testing), vec![
            "Test class UserTest covers email",
            "JUnit test for email in UserTest",
            "Doc comment:  Primary contact for email in User",
            "Doc comment:  unique for email in User",
        ]);
        assert_eq!(report.docs_testing[2].file_path.as_deref(), Some("model/User.java"));
        assert_eq!(report.docs_testing[2].line_range, Some(7));
    }

    #[test]
    fn test_report_wire_format() {
        let report = ImpactReport::classify(&field(vec![]), &[]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json["docsTesting"][0],
            serde_json::json!({"explanation": NO_IMPACT, "filePath": null, "lineRange": null})
        );
    }
}
