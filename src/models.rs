use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A movie entry as returned by the provider's list endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Movie {
    /// Movies carry `title`, TV-shaped entries carry `name`.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Video {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub key: String,
}

/// The four rows of the home screen. The gateway fills it with raw provider JSON,
/// the frontend reads it back as [`Movie`]s.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HomeBundle<M = Movie> {
    #[serde(default = "Vec::new")]
    pub trending: Vec<M>,
    #[serde(default = "Vec::new")]
    pub top_rated: Vec<M>,
    #[serde(default = "Vec::new")]
    pub action: Vec<M>,
    #[serde(default = "Vec::new")]
    pub comedy: Vec<M>,
}

impl<M> Default for HomeBundle<M> {
    fn default() -> Self {
        Self {
            trending: Vec::new(),
            top_rated: Vec::new(),
            action: Vec::new(),
            comedy: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchResults<M = Movie> {
    #[serde(default = "Vec::new")]
    pub results: Vec<M>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TrailerKey {
    pub key: Option<String>,
}

/// Pulls the `results` array out of a provider list response, `[]` when absent.
pub fn results_of(payload: Value) -> Vec<Value> {
    match payload {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
