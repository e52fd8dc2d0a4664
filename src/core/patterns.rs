//! Named text matchers used by the scanners.
//!
//! Every heuristic the extractor applies to source text lives here so the
//! patterns can be tested and tuned without touching the traversal logic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// `private|protected|public <Type> <name>;` alone on its line
pub static FIELD_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(private|protected|public)\s+([\w<>]+)\s+(\w+)\s*;\s*$")
        .expect("Invalid field declaration regex")
});

/// First `class <Name>` token in a file
pub static CLASS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(\w+)").expect("Invalid class name regex")
});

/// Annotation at the start of a trimmed line
pub static ANNOTATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@(\w+)").expect("Invalid annotation regex")
});

/// Single-line `/** ... */` block comment
pub static JAVADOC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/\*\*(.*?)\*/").expect("Invalid javadoc regex")
});

/// `// ...` line comment
pub static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//(.*)").expect("Invalid line comment regex")
});

pub static COLUMN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@Column\s*\(.*name\s*=\s*"([^"]+)""#).expect("Invalid column regex")
});

pub static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@Table\s*\(.*name\s*=\s*"([^"]+)""#).expect("Invalid table regex")
});

/// `// alias: X` (case-insensitive, colon optional)
pub static ALIAS_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)//\s*alias\s*:?\s*(\w+)").expect("Invalid alias comment regex")
});

pub static SQL_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(select|update|delete|insert)\s").expect("Invalid SQL verb regex")
});

pub static ORM_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(Entity|Table|Column|Id|JoinColumn|ManyToOne|OneToMany)")
        .expect("Invalid ORM annotation regex")
});

pub static REST_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(GetMapping|PostMapping|PutMapping|DeleteMapping|RequestMapping|ApiOperation)")
        .expect("Invalid REST annotation regex")
});

pub static EXTERNAL_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(httpClient|restTemplate|WebClient)\.(get|post|put|delete)")
        .expect("Invalid external call regex")
});

/// Whole-word match of a field name
pub fn whole_word(name: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"\b{}\b", regex::escape(name)))?)
}

/// `name = X` or `name: X`, capturing `X`
pub fn assignment(name: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"{}\s*[:=]\s*(\w+)", regex::escape(name)))?)
}

/// Extract capture group 1 of every match, in order of appearance
pub fn all_captures(regex: &Regex, text: &str) -> Vec<String> {
    regex.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// First `class <Name>` in `content`, if any
pub fn first_class_name(content: &str) -> Option<String> {
    CLASS_NAME.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
