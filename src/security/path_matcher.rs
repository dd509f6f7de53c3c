use std::fmt;

/// The default public path set: the service info endpoint and the district list,
/// each with its sub-paths.
pub const DEFAULT_PUBLIC_PATHS: [&str; 4] = [
    "/template",
    "/template/**",
    "/district-list",
    "/district-list/**",
];

/// PathClass
///
/// Result of classifying a request path against the public path set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// The path is exempted from token validation.
    Public,
    /// Token validation applies (subject to the configured access policy).
    Protected,
}

/// PathPattern
///
/// A single Ant-style path pattern. Patterns are split into `/`-separated segments:
/// - a literal segment matches the identical segment (case-sensitive),
/// - `*` matches exactly one non-empty segment,
/// - a trailing `**` matches the prefix itself and any number of deeper segments.
///
/// `/template/**` therefore matches `/template` and `/template/a/b`, but never the
/// sibling `/templates`. Without `**` the trailing `/` must agree: `/open` does not
/// match `/open/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    deep: bool,
    trailing_slash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
}

impl PathPattern {
    /// parse
    ///
    /// Builds a pattern from its textual form. Returns `None` for patterns that
    /// are not absolute or that place `**` anywhere but the final segment.
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim();
        if !pattern.starts_with('/') {
            return None;
        }

        let mut parts: Vec<&str> = split_segments(pattern).collect();
        let deep = parts.last() == Some(&"**");
        if deep {
            parts.pop();
        }
        if parts.contains(&"**") {
            return None;
        }

        let segments = parts
            .into_iter()
            .map(|part| match part {
                "*" => Segment::Any,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();

        Some(Self {
            raw: pattern.to_string(),
            segments,
            deep,
            trailing_slash: !deep && has_trailing_slash(pattern),
        })
    }

    /// The pattern as it was configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// matches
    ///
    /// Tests a request path (no query string) against this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = split_segments(path).collect();

        if path_segments.len() < self.segments.len() {
            return false;
        }
        if !self.deep
            && (path_segments.len() != self.segments.len()
                || has_trailing_slash(path) != self.trailing_slash)
        {
            return false;
        }

        self.segments
            .iter()
            .zip(&path_segments)
            .all(|(segment, actual)| match segment {
                Segment::Literal(expected) => expected == actual,
                Segment::Any => !actual.is_empty(),
            })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// The root path `/` has no trailing slash of its own.
fn has_trailing_slash(path: &str) -> bool {
    path.len() > 1 && path.ends_with('/')
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// PublicPaths
///
/// Ordered set of public path patterns, evaluated first-match-wins. Built once at
/// startup and shared read-only across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPaths {
    patterns: Vec<PathPattern>,
}

impl PublicPaths {
    /// new
    ///
    /// Parses every pattern, skipping (and logging) the ones that cannot be parsed.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                let parsed = PathPattern::parse(raw);
                if parsed.is_none() {
                    tracing::warn!(pattern = %raw, "ignoring unparseable public path pattern");
                }
                parsed
            })
            .collect();

        Self { patterns }
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    /// The first pattern matching `path`, if any.
    pub fn matching(&self, path: &str) -> Option<&PathPattern> {
        self.patterns.iter().find(|pattern| pattern.matches(path))
    }

    /// classify
    ///
    /// Decides whether `path` is public (exempt from token validation) or protected.
    pub fn classify(&self, path: &str) -> PathClass {
        if self.matching(path).is_some() {
            PathClass::Public
        } else {
            PathClass::Protected
        }
    }
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS)
    }
}
