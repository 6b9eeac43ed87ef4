use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Parse the canonical lowercase token used in exports ("movie"/"series").
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "movie" | "film" => Some(MediaKind::Movie),
            "series" | "show" | "tv" | "tv series" => Some(MediaKind::Series),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_aliases() {
        assert_eq!(MediaKind::from_token("Movie"), Some(MediaKind::Movie));
        assert_eq!(MediaKind::from_token("tv"), Some(MediaKind::Series));
        assert_eq!(MediaKind::from_token("series"), Some(MediaKind::Series));
        assert_eq!(MediaKind::from_token("music"), None);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&MediaKind::Series).unwrap(), "\"series\"");
    }
}
