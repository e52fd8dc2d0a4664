use std::collections::BTreeSet;

use crate::error::Result;
use super::patterns;

/// Lines above the declaration searched for ORM names and alias comments
const ALIAS_WINDOW_ABOVE: usize = 6;
/// Lines below the declaration searched for ORM names and alias comments
const ALIAS_WINDOW_BELOW: usize = 2;
/// Radius searched for `field = X` / `field: X` assignments
const ASSIGNMENT_RADIUS: usize = 10;

/// Collects alternate names for a field from the lines around its declaration
pub struct AliasExtractor;

impl AliasExtractor {
    /// `line_index` is the 0-based index of the declaration line.
    pub fn extract(field_name: &str, line_index: usize, lines: &[&str]) -> Result<BTreeSet<String>> {
        let mut aliases = BTreeSet::new();
        if lines.is_empty() {
            return Ok(aliases);
        }

        for line in window(lines, line_index, ALIAS_WINDOW_ABOVE, ALIAS_WINDOW_BELOW) {
            for regex in [&*patterns::COLUMN_NAME, &*patterns::TABLE_NAME, &*patterns::ALIAS_COMMENT] {
                if let Some(caps) = regex.captures(line) {
                    aliases.insert(caps[1].to_string());
                }
            }
        }

        let assignment = patterns::assignment(field_name)?;
        for line in window(lines, line_index, ASSIGNMENT_RADIUS, ASSIGNMENT_RADIUS) {
            for alt in patterns::all_captures(&assignment, line) {
                if alt != field_name {
                    aliases.insert(alt);
                }
            }
        }

        Ok(aliases)
    }
}

/// Lines from `above` before `index` to `below` after it, clamped to the file
fn window<'a>(lines: &'a [&'a str], index: usize, above: usize, below: usize) -> &'a [&'a str] {
    let start = index.saturating_sub(above);
    let end = (index + below + 1).min(lines.len());
    if start >= end {
        return &[];
    }
    &lines[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(field: &str, content: &str) -> Vec<String> {
        let lines: Vec<&str> = content.lines().collect();
        let index = lines.iter()
            .position(|l| l.contains(&format!(" {};", field)))
            .expect("declaration line");
        AliasExtractor::extract(field, index, &lines).unwrap().into_iter().collect()
    }

    #[test]
    fn test_column_name_alias() {
        let found = aliases("email", r#"class User {
    @Column(name="USER_EMAIL")
    private String email;
}"#);
        assert_eq!(found, vec!["USER_EMAIL"]);
    }

    #[test]
    fn test_table_and_comment_aliases() {
        let found = aliases("id", r#"@Entity
@Table(name = "T_CUSTOMER")
class Customer {
    // Alias: customerNumber
    @Id
    private Long id;
}"#);
        assert_eq!(found, vec!["T_CUSTOMER", "customerNumber"]);
    }

    #[test]
    fn test_assignment_aliases_exclude_self() {
        let found = aliases("email", r#"class User {
    private String email;

    User(String email) {
        this.email = email;
        email = contactAddress;
    }
}"#);
        assert_eq!(found, vec!["contactAddress"]);
    }

    #[test]
    fn test_sources_outside_window_are_ignored() {
        let mut content = String::from("@Column(name=\"FAR_AWAY\")\n");
        for _ in 0..7 {
            content.push('\n');
        }
        content.push_str("private String email;\n");
        assert!(aliases("email", &content).is_empty());
    }

    #[test]
    fn test_no_sources_yield_empty_set() {
        let found = aliases("age", "class Person {\n    private int age;\n}\n");
        assert!(found.is_empty());
    }

    #[test]
    fn test_declaration_near_end_of_file() {
        let lines = vec!["private String email; // alias: mail"];
        let found = AliasExtractor::extract("email", 0, &lines).unwrap();
        assert!(found.contains("mail"));
    }
}
