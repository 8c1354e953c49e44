//! Target path specifications.
//!
//! A target is either an exact repository-relative path (`src/app.tsx`) or a
//! directory prefix written with a trailing slash (`src/components/`).

use std::fmt;

/// The ordered set of paths whose changes get extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    patterns: Vec<String>,
}

impl TargetSpec {
    /// Build a spec from command-line patterns, dropping duplicates while
    /// keeping the first occurrence's position.
    pub fn new<I, S>(patterns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
            if pattern.is_empty() || normalized.iter().any(|p| p == pattern) {
                continue;
            }
            normalized.push(pattern.to_string());
        }

        if normalized.is_empty() {
            return Err(Error::Empty);
        }
        Ok(Self {
            patterns: normalized,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The only pattern, if there is exactly one.
    pub fn single(&self) -> Option<&str> {
        match self.patterns.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// Whether a changed path belongs to this spec.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern_matches(pattern, path))
    }

    /// Split `paths` into `(retained, extracted)` by [`TargetSpec::matches`].
    pub fn partition<'a, I>(&self, paths: I) -> (Vec<String>, Vec<String>)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let (extracted, retained): (Vec<String>, Vec<String>) =
            paths.into_iter().cloned().partition(|p| self.matches(p));
        (retained, extracted)
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('/') {
        // Prefix includes the slash, so `lib/` never matches `libx.go`.
        Some(dir) => path == dir || path.starts_with(pattern),
        None => path == pattern,
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.patterns.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("at least one target path is required")]
    Empty,
}
