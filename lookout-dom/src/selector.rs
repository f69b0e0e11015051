//! The CSS selector subset shared by annoyance rules, content queries and
//! path resolution.
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `=`, `*=`, `^=`, `$=`, `~=`, `|=`, with the `i` flag),
//! `:not(...)` over compound selectors, descendant and child combinators, and
//! comma-separated lists.
use crate::{Document, ElementData, NodeId};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected `{found}` at offset {pos} in `{selector}`")]
    Unexpected {
        found: char,
        pos: usize,
        selector: String,
    },

    #[error("selector `{0}` ends unexpectedly")]
    UnexpectedEnd(String),

    #[error("unsupported pseudo-class `:{0}`")]
    UnsupportedPseudo(String),
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// Left to right; each combinator joins a compound to the one before it.
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    simples: Vec<Simple>,
}

#[derive(Debug, Clone, PartialEq)]
enum Simple {
    Id(String),
    Class(String),
    Attr(AttrSelector),
    Not(Vec<Compound>),
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<(AttrOp, String)>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
    DashMatch,
}

impl Selector {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the element `id` matches any alternative of the list.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.is_element(id) && self.alternatives.iter().any(|c| c.matches_at(doc, c.parts.len() - 1, id))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = s.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }
        let alternatives = Parser::new(source).selector_list()?;
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }
}

impl Complex {
    fn matches_at(&self, doc: &Document, idx: usize, node: NodeId) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent_element(node)
                .is_some_and(|p| self.matches_at(doc, idx - 1, p)),
            Combinator::Descendant => doc.ancestors(node).any(|a| self.matches_at(doc, idx - 1, a)),
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if *tag != el.tag {
                return false;
            }
        }
        self.simples.iter().all(|s| s.matches(doc, node, el))
    }
}

impl Simple {
    fn matches(&self, doc: &Document, node: NodeId, el: &ElementData) -> bool {
        match self {
            Simple::Id(id) => el.attr("id") == Some(id.as_str()),
            Simple::Class(class) => el.classes().any(|c| c == class),
            Simple::Attr(attr) => attr.matches(el),
            Simple::Not(inner) => !inner.iter().any(|c| c.matches(doc, node)),
        }
    }
}

impl AttrSelector {
    fn matches(&self, el: &ElementData) -> bool {
        let Some(actual) = el.attr(&self.name) else {
            return false;
        };
        let Some((op, expected)) = &self.test else {
            return true;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_lowercase(), expected.to_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };
        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Contains => !expected.is_empty() && actual.contains(&expected),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttrOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttrOp::DashMatch => {
                actual == expected || actual.starts_with(&format!("{expected}-"))
            }
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            found,
            pos: self.pos,
            selector: self.source.to_string(),
        }
    }

    fn end(&self) -> SelectorError {
        SelectorError::UnexpectedEnd(self.source.to_string())
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.end()),
        }
    }

    fn selector_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_ws();
            alternatives.push(self.complex()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                None => break,
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.unexpected(c));
                }
            }
        }
        Ok(alternatives)
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            parts.push((combinator, self.compound()?));
            let had_space = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinator = Combinator::Child;
                }
                Some(_) if had_space => combinator = Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            }
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut seen = false;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                seen = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                seen = true;
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.simples.push(Simple::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.simples.push(Simple::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.simples.push(Simple::Attr(self.attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    let name = self.ident()?;
                    if !name.eq_ignore_ascii_case("not") {
                        return Err(SelectorError::UnsupportedPseudo(name));
                    }
                    compound.simples.push(Simple::Not(self.negation()?));
                }
                _ => break,
            }
            seen = true;
        }
        if !seen {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.end(),
            });
        }
        Ok(compound)
    }

    fn negation(&mut self) -> Result<Vec<Compound>, SelectorError> {
        self.expect('(')?;
        let mut inner = Vec::new();
        loop {
            self.skip_ws();
            inner.push(self.compound()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(')') => break,
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.unexpected(c));
                }
                None => return Err(self.end()),
            }
        }
        Ok(inner)
    }

    fn attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.bump() {
            Some(']') => {
                return Ok(AttrSelector {
                    name,
                    test: None,
                    case_insensitive: false,
                })
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('*' | '^' | '$' | '~' | '|')) => {
                self.expect('=')?;
                match c {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '~' => AttrOp::Includes,
                    _ => AttrOp::DashMatch,
                }
            }
            Some(c) => {
                self.pos -= 1;
                return Err(self.unexpected(c));
            }
            None => return Err(self.end()),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.quoted(q)?
            }
            Some(_) => self.ident()?,
            None => return Err(self.end()),
        };
        self.skip_ws();
        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.pos += 1;
                case_insensitive = true;
            }
            Some('s' | 'S') => self.pos += 1,
            _ => {}
        }
        self.skip_ws();
        self.expect(']')?;
        Ok(AttrSelector {
            name,
            test: Some((op, value)),
            case_insensitive,
        })
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(self.end()),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.end()),
            }
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.end()),
                }
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => self.end(),
            });
        }
        Ok(out)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Backslash-escape `raw` so it parses back as a single identifier.
pub(crate) fn escape_ident(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if !is_ident_char(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementSpec, Viewport};

    fn sel(s: &str) -> Selector {
        s.parse().unwrap()
    }

    #[test]
    fn parse_errors() {
        assert_eq!("  ".parse::<Selector>(), Err(SelectorError::Empty));
        assert!(matches!("div[".parse::<Selector>(), Err(SelectorError::UnexpectedEnd(_))));
        assert!(matches!("div >".parse::<Selector>(), Err(SelectorError::UnexpectedEnd(_))));
        assert!(matches!(
            "a:hover".parse::<Selector>(),
            Err(SelectorError::UnsupportedPseudo(p)) if p == "hover"
        ));
        assert!(matches!("[[".parse::<Selector>(), Err(SelectorError::Unexpected { found: '[', .. })));
    }

    #[test]
    fn escaped_idents_parse_back() {
        assert_eq!(escape_ident("r1"), "r1");
        assert_eq!(escape_ident(":r1:"), "\\:r1\\:");
        assert_eq!(escape_ident("w-1/2"), "w-1\\/2");

        let mut d = Document::new("https://example.com/", Viewport::default());
        let button = d.append_element(d.body(), ElementSpec::new("button").id("a.b:c"));
        let selector = sel(&format!("button#{}", escape_ident("a.b:c")));
        assert!(selector.matches(&d, button));
    }

    #[test]
    fn compound_and_attribute_matching() {
        let mut d = Document::new("https://example.com/", Viewport::default());
        let body = d.body();
        let banner = d.append_element(
            body,
            ElementSpec::new("div").id("CookieBanner").class("fixed Consent-bar"),
        );
        let submit = d.append_element(body, ElementSpec::new("button").attr("type", "submit"));
        let plain = d.append_element(body, ElementSpec::new("button"));

        assert!(sel("[id*=\"cookie\" i]").matches(&d, banner));
        assert!(!sel("[id*=\"cookie\"]").matches(&d, banner));
        assert!(sel("[class*=consent i]").matches(&d, banner));
        assert!(sel("div.fixed").matches(&d, banner));
        assert!(sel("#CookieBanner").matches(&d, banner));
        assert!(!sel("#cookiebanner").matches(&d, banner));
        assert!(sel("[class~='fixed']").matches(&d, banner));

        assert!(sel("button:not([type])").matches(&d, plain));
        assert!(!sel("button:not([type])").matches(&d, submit));
        assert!(sel("input[type=submit], button[type=\"submit\"]").matches(&d, submit));
    }

    #[test]
    fn combinators() {
        let mut d = Document::new("https://example.com/", Viewport::default());
        let body = d.body();
        let nav = d.append_element(body, ElementSpec::new("nav"));
        let ul = d.append_element(nav, ElementSpec::new("ul"));
        let li = d.append_element(ul, ElementSpec::new("li"));
        let a = d.append_element(li, ElementSpec::new("a").attr("href", "/"));

        assert!(sel("nav ul").matches(&d, ul));
        assert!(sel("nav a").matches(&d, a));
        assert!(sel("ul > li > a").matches(&d, a));
        assert!(!sel("nav > a").matches(&d, a));
        assert!(sel("body nav>ul li").matches(&d, li));
        assert_eq!(d.select(body, "nav ul, li").unwrap(), vec![ul, li]);
    }

    #[test]
    fn escaped_identifiers() {
        let mut d = Document::new("https://example.com/", Viewport::default());
        let div = d.append_element(d.body(), ElementSpec::new("div").class("md:flex"));
        assert!(sel("div.md\\:flex").matches(&d, div));
        assert_eq!(sel(" div.a ").to_string(), "div.a");
    }
}
