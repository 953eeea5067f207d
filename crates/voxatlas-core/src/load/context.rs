use std::collections::HashMap;

/// Label→id cache for the reference tables, built once per load run by
/// the seeding pass and threaded through every resolution call. Never a
/// process-wide global.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCache {
    vocabulary_types: HashMap<String, i64>,
    functional_purposes: HashMap<String, i64>,
    speaker_dependency_types: HashMap<String, i64>,
    speech_types: HashMap<String, i64>,
}

impl ReferenceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vocabulary(&mut self, label: impl Into<String>, id: i64) {
        self.vocabulary_types.insert(label.into(), id);
    }

    #[must_use]
    pub fn vocabulary(&self, label: &str) -> Option<i64> {
        self.vocabulary_types.get(label).copied()
    }

    pub fn insert_purpose(&mut self, label: impl Into<String>, id: i64) {
        self.functional_purposes.insert(label.into(), id);
    }

    #[must_use]
    pub fn purpose(&self, label: &str) -> Option<i64> {
        self.functional_purposes.get(label).copied()
    }

    pub fn insert_speaker_dependency(&mut self, label: impl Into<String>, id: i64) {
        self.speaker_dependency_types.insert(label.into(), id);
    }

    #[must_use]
    pub fn speaker_dependency(&self, label: &str) -> Option<i64> {
        self.speaker_dependency_types.get(label).copied()
    }

    pub fn insert_speech_type(&mut self, label: impl Into<String>, id: i64) {
        self.speech_types.insert(label.into(), id);
    }

    #[must_use]
    pub fn speech_type(&self, label: &str) -> Option<i64> {
        self.speech_types.get(label).copied()
    }

    /// True once every family has at least one seeded label.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        !self.vocabulary_types.is_empty()
            && !self.functional_purposes.is_empty()
            && !self.speaker_dependency_types.is_empty()
            && !self.speech_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_lookup() {
        let mut cache = ReferenceCache::new();
        assert!(!cache.is_seeded());

        cache.insert_vocabulary("medium", 1);
        cache.insert_purpose("dictation", 2);
        cache.insert_speaker_dependency("independent", 3);
        cache.insert_speech_type("continuous", 4);

        assert!(cache.is_seeded());
        assert_eq!(cache.vocabulary("medium"), Some(1));
        assert_eq!(cache.vocabulary("large (LVCSR)"), None);
        assert_eq!(cache.speech_type("continuous"), Some(4));
    }
}
