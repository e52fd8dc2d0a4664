use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse architectural layer inferred from path text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    Model,
    Repository,
    Service,
    Controller,
    Ui,
    Default,
    /// Only assigned to synthetic external-call findings, never by classification
    Integration,
}

/// Keyword sets in priority order; the first set with a hit wins
const LAYER_KEYWORDS: &[(Layer, &[&str])] = &[
    (Layer::Model, &["model", "entity", "domain"]),
    (Layer::Repository, &["repo", "repository", "dao"]),
    (Layer::Service, &["service"]),
    (Layer::Controller, &["controller", "rest", "api"]),
    (Layer::Ui, &["ui", "view", "page", "html", "jsp"]),
];

impl Layer {
    /// Classify a path or package fragment by case-insensitive substring match
    pub fn classify(path_or_package: &str) -> Layer {
        let s = path_or_package.to_lowercase();
        LAYER_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| s.contains(k)))
            .map(|(layer, _)| *layer)
            .unwrap_or(Layer::Default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Model => "MODEL",
            Layer::Repository => "REPOSITORY",
            Layer::Service => "SERVICE",
            Layer::Controller => "CONTROLLER",
            Layer::Ui => "UI",
            Layer::Default => "DEFAULT",
            Layer::Integration => "INTEGRATION",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
