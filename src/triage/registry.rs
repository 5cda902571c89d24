/// An ordered, immutable set of case-insensitive substrings.
///
/// Entries are lowercased once on construction; callers pass haystacks
/// through [`fold`] before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<String>,
}

impl Registry {
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let entries = entries
            .iter()
            .map(|e| fold(e.as_ref().trim()))
            .filter(|e| !e.is_empty())
            .collect();
        Registry { entries }
    }

    /// First entry, in registry order, contained in the folded `haystack`.
    pub fn find(&self, haystack: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| haystack.contains(e.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The three rule sets consulted by the classifier.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub cdn: Registry,
    pub hosting: Registry,
    pub keywords: Registry,
}

impl Registries {
    pub fn new<S: AsRef<str>>(cdn: &[S], hosting: &[S], keywords: &[S]) -> Self {
        Registries {
            cdn: Registry::new(cdn),
            hosting: Registry::new(hosting),
            keywords: Registry::new(keywords),
        }
    }
}

/// Locale-independent case folding used on both sides of every match.
pub fn fold(s: &str) -> String {
    s.to_lowercase()
}
