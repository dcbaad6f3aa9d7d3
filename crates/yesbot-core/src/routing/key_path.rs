use std::fmt;

/// The reserved "no segment" value.
///
/// On the registration side it means "any value at this depth"; on the event
/// side it means "the event carries nothing here".
pub const WILDCARD: &str = "";

/// An ordered sequence of routing segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The empty path, addressing the root bucket.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if segment == WILDCARD {
                f.write_str("*")?;
            } else {
                write!(f, "{segment:?}")?;
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks_wildcards() {
        let path = KeyPath::new(["bot-commands", "!voice", WILDCARD]);
        assert_eq!(path.to_string(), r#"["bot-commands", "!voice", *]"#);
        assert_eq!(KeyPath::root().to_string(), "[]");
    }

    #[test]
    fn test_collect() {
        let path: KeyPath = ["a", "b"].into_iter().collect();
        assert_eq!(path.len(), 2);
        assert_eq!(path.segments()[1], "b");
    }
}
