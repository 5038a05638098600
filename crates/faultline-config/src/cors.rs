use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrArray,
    /// Allowed request headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Headers the browser may read from responses
    #[serde(default)]
    pub expose_headers: Vec<String>,
    /// Allow cookies and authorization headers
    #[serde(default)]
    pub credentials: bool,
    /// How long preflight results may be cached, in seconds
    #[serde(default = "default_max_age")]
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: AnyOrArray::Any,
            methods: AnyOrArray::Any,
            headers: AnyOrArray::Any,
            expose_headers: Vec::new(),
            credentials: false,
            max_age: default_max_age(),
        }
    }
}

impl CorsConfig {
    pub const fn max_age_duration(&self) -> Duration {
        Duration::from_secs(self.max_age)
    }
}

/// Either the wildcard "*" or an explicit list
///
/// A single string is read as a one-element list; a list containing "*"
/// collapses to [`AnyOrArray::Any`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawList")]
pub enum AnyOrArray {
    #[default]
    Any,
    List(Vec<String>),
}

impl AnyOrArray {
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Explicit values, empty for the wildcard
    pub fn values(&self) -> &[String] {
        match self {
            Self::Any => &[],
            Self::List(values) => values,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    One(String),
    Many(Vec<String>),
}

impl From<RawList> for AnyOrArray {
    fn from(raw: RawList) -> Self {
        let values = match raw {
            RawList::One(value) => vec![value],
            RawList::Many(values) => values,
        };

        if values.iter().any(|value| value == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_age() -> u64 {
    43_200
}
