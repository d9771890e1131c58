use std::collections::HashMap;

/// Set of strings compared case-insensitively, remembering the first
/// spelling seen for each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseInsensitiveSet {
    map: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for value in values {
            let value = value.as_ref();
            map.entry(fold(value)).or_insert_with(|| value.to_string());
        }
        Self { map }
    }

    pub fn get(&self, value: &str) -> Option<&str> {
        self.map.get(&fold(value)).map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.map.contains_key(&fold(value))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether any member is shared with `other`.
    pub fn intersects(&self, other: &Self) -> bool {
        self.map.keys().any(|key| other.map.contains_key(key))
    }
}

/// Case-fold used for code comparison (whitespace-trimmed, Unicode lowercase).
pub fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_regardless_of_case() {
        let set = CaseInsensitiveSet::new(["LA31994-9", "la33-6"]);
        assert!(set.contains("la31994-9"));
        assert!(set.contains(" LA33-6 "));
        assert_eq!(set.get("LA31994-9"), Some("LA31994-9"));
        assert!(!set.contains("LA32-8"));
        assert_eq!(set.len(), 2);
    }
}
