use serde::{Deserialize, Serialize};

use super::scanner::Occurrence;

/// Expected versus extracted process identifiers for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDiff {
    /// Expected but not extracted
    pub missing: Vec<String>,
    /// Expected and extracted
    pub matched: Vec<String>,
    /// Extracted but not expected
    pub extra: Vec<String>,
}

impl ProcessDiff {
    pub fn expected_processes(field_name: &str) -> [String; 2] {
        [
            format!("KYC_{}_Onboarding", field_name),
            format!("KYC_Verify_{}_Format", field_name),
        ]
    }

    /// Any snippet mentioning "process" counts as an extracted process, verbatim
    pub fn compute(field_name: &str, occurrences: &[Occurrence]) -> Self {
        let expected = Self::expected_processes(field_name);
        let extracted: Vec<String> = occurrences.iter()
            .filter(|o| o.snippet.to_lowercase().contains("process"))
            .map(|o| o.snippet.clone())
            .collect();

        let (matched, missing): (Vec<String>, Vec<String>) = expected.iter()
            .cloned()
            .partition(|p| extracted.contains(p));
        let extra = extracted.into_iter()
            .filter(|p| !expected.contains(p))
            .collect();

        Self { missing, matched, extra }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layer::Layer;
    use crate::core::scanner::UsageKind;

    fn with_snippet(snippet: &str) -> Occurrence {
        Occurrence {
            layer: Layer::Default,
            file_path: "Flow.java".to_string(),
            class_name: "Flow".to_string(),
            usage: UsageKind::Reference,
            snippet: snippet.to_string(),
            line: 1,
            explanation: String::new(),
            sql: None,
            orm: None,
        }
    }

    #[test]
    fn test_nothing_extracted_means_all_missing() {
        let diff = ProcessDiff::compute("email", &[with_snippet("return email;")]);
        assert_eq!(diff.missing, vec!["KYC_email_Onboarding", "KYC_Verify_email_Format"]);
        assert!(diff.matched.is_empty());
        assert!(diff.extra.is_empty());
    }

    #[test]
    fn test_exact_snippet_matches_expected() {
        // only snippets mentioning "process" are extracted, so the field name must carry it
        let diff = ProcessDiff::compute("processCode", &[
            with_snippet("KYC_processCode_Onboarding"),
            with_snippet("KYC_email_Onboarding"),
            with_snippet("runProcess(processCode);"),
        ]);

        assert_eq!(diff.matched, vec!["KYC_processCode_Onboarding"]);
        assert_eq!(diff.missing, vec!["KYC_Verify_processCode_Format"]);
        assert_eq!(diff.extra, vec!["runProcess(processCode);"]);
    }
}
