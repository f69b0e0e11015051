use crate::{Document, DomError, NodeId, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = ">>";
const SHADOW_MARKER: &str = "shadow-root";

/// One hop of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Enter the content document of the frame matching this selector.
    Frame(String),
    /// Enter the shadow root of the host matching this selector.
    Shadow(String),
    /// The target element.
    Element(String),
}

/// Locator for an element across frame and shadow boundaries, rendered as
/// `iframe#a >> div.host >> shadow-root >> button#b`.
///
/// Each selector is resolved with first-match semantics inside the scope
/// the previous hop entered, so a path is best-effort rather than unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of frame or shadow boundaries crossed.
    pub fn depth(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !matches!(s, PathSegment::Element(_)))
            .count()
    }

    pub fn enter_frame(&self, selector: impl Into<String>) -> Self {
        self.with(PathSegment::Frame(selector.into()))
    }

    pub fn enter_shadow(&self, host_selector: impl Into<String>) -> Self {
        self.with(PathSegment::Shadow(host_selector.into()))
    }

    pub fn element(&self, selector: impl Into<String>) -> Self {
        self.with(PathSegment::Element(selector.into()))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " {SEPARATOR} ")?;
            }
            match segment {
                PathSegment::Frame(s) | PathSegment::Element(s) => f.write_str(s)?,
                PathSegment::Shadow(s) => write!(f, "{s} {SEPARATOR} {SHADOW_MARKER}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEPARATOR).map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(DomError::InvalidPath(s.to_string()));
        }
        let mut segments = Vec::new();
        let mut iter = parts.into_iter().peekable();
        while let Some(part) = iter.next() {
            if part == SHADOW_MARKER {
                return Err(DomError::InvalidPath(s.to_string()));
            }
            if iter.peek() == Some(&SHADOW_MARKER) {
                iter.next();
                segments.push(PathSegment::Shadow(part.to_string()));
            } else if iter.peek().is_some() {
                segments.push(PathSegment::Frame(part.to_string()));
            } else {
                segments.push(PathSegment::Element(part.to_string()));
            }
        }
        if !matches!(segments.last(), Some(PathSegment::Element(_))) {
            return Err(DomError::InvalidPath(s.to_string()));
        }
        Ok(Self { segments })
    }
}

impl TryFrom<String> for Path {
    type Error = DomError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl Document {
    /// Follow `path` from the top document, taking the first match at each hop.
    ///
    /// Resolution is advisory. Any failed hop yields `None`, including
    /// unparsable fragments and cross-origin frames.
    pub fn resolve_path(&self, path: &Path) -> Option<NodeId> {
        match self.walk_path(path) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(target: "lookout.dom", %path, error = %err, "path.resolve.failed");
                None
            }
        }
    }

    fn walk_path(&self, path: &Path) -> Result<Option<NodeId>, DomError> {
        let mut scope = self.root();
        for segment in path.segments() {
            let (PathSegment::Frame(raw) | PathSegment::Shadow(raw) | PathSegment::Element(raw)) =
                segment;
            let selector: Selector = raw.parse()?;
            let Some(found) = self.query_selector(scope, &selector) else {
                return Ok(None);
            };
            scope = match segment {
                PathSegment::Element(_) => return Ok(Some(found)),
                PathSegment::Frame(_) => match self.frame_document(found)? {
                    Some(doc) => doc,
                    None => return Ok(None),
                },
                PathSegment::Shadow(_) => match self.shadow_root(found) {
                    Some(root) => root,
                    None => return Ok(None),
                },
            };
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementSpec, Viewport};

    #[test]
    fn display_and_parse_agree() {
        let path = Path::new()
            .enter_frame("iframe#pay")
            .enter_shadow("x-card.big")
            .element("button#go");
        let text = path.to_string();
        assert_eq!(text, "iframe#pay >> x-card.big >> shadow-root >> button#go");
        assert_eq!(text.parse::<Path>().unwrap(), path);
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for bad in ["", "a >> ", "div >> shadow-root", "shadow-root >> a"] {
            assert!(bad.parse::<Path>().is_err(), "{bad}");
        }
    }

    #[test]
    fn serde_uses_string_form() {
        let path = Path::new().enter_frame("iframe").element("a.x");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"iframe >> a.x\"");
        assert_eq!(serde_json::from_str::<Path>(&json).unwrap(), path);
    }

    #[test]
    fn resolves_through_frames_and_shadow_roots() {
        let mut d = Document::new("https://example.com/", Viewport::default());
        let frame = d.append_element(d.body(), ElementSpec::new("iframe").id("f").rect(0.0, 0.0, 300.0, 200.0));
        let inner = d.attach_frame(frame, "https://example.com/inner").unwrap();
        let host = d.append_element(d.body_of(inner).unwrap(), ElementSpec::new("x-card"));
        let shadow = d.attach_shadow_root(host).unwrap();
        let button = d.append_element(shadow, ElementSpec::new("button").id("go"));

        let path: Path = "iframe#f >> x-card >> shadow-root >> button#go".parse().unwrap();
        assert_eq!(d.resolve_path(&path), Some(button));

        let missing: Path = "iframe#f >> a".parse().unwrap();
        assert_eq!(d.resolve_path(&missing), None);
    }

    #[test]
    fn unparsable_fragment_is_a_miss() {
        let mut d = Document::new("https://example.com/", Viewport::default());
        d.append_element(d.body(), ElementSpec::new("button").id("r1"));

        let path = Path::new().element("button#:r1:");
        assert_eq!(d.resolve_path(&path), None);
    }
}
