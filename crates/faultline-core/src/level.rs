use serde::{Deserialize, Serialize};

/// Severity carried by an error value
///
/// Decides how the failure is logged, never how the response looks.
/// Variants are ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Critical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(Level::Warning.to_string(), "warning");
        assert_eq!("critical".parse::<Level>().unwrap(), Level::Critical);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Info).unwrap(), "\"info\"");
    }
}
