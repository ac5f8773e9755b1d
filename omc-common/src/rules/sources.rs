//! Banned source tokens (games, labels, publishers)

/// Case-insensitive token list checked against tags and the source field
#[derive(Debug, Clone, Default)]
pub struct BannedSources {
    tokens: Vec<String>,
    lowered: Vec<String>,
}

impl BannedSources {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|token: &String| !token.trim().is_empty())
            .collect();
        let lowered = tokens.iter().map(|token| token.to_lowercase()).collect();
        Self { tokens, lowered }
    }

    /// A tag matches only when it equals a token
    pub fn tag_matches(&self, tag: &str) -> Option<&str> {
        let tag = tag.to_lowercase();
        self.position(|token| *token == tag)
    }

    /// A source matches when any token appears inside it
    pub fn source_matches(&self, source: &str) -> Option<&str> {
        if source.is_empty() {
            return None;
        }
        let source = source.to_lowercase();
        self.position(|token| source.contains(token.as_str()))
    }

    fn position(&self, pred: impl Fn(&String) -> bool) -> Option<&str> {
        self.lowered
            .iter()
            .position(pred)
            .map(|index| self.tokens[index].as_str())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
