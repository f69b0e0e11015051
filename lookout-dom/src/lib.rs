//! Render-tree model the perception engines run against.
//!
//! A [`Document`] is an arena of nodes captured from (or built to mirror) a
//! rendered page: elements carry their computed style and viewport-relative
//! geometry, shadow roots hang off their hosts, and frame elements own a
//! nested document or are marked cross-origin. [`NodeId`] is the stable
//! per-node handle; it never changes while the document lives, even after the
//! node is removed.
//!
//! - [`Document`]: arena, construction API, tree walks, mutation journal
//! - [`Selector`]: the CSS subset used by rules, queries and path resolution
//! - [`Path`]: frame/shadow boundary path back to an element
//! - [`snapshot::PageSnapshot`]: wire model produced by the live snapshot script
//!
//! ```
//! use lookout_dom::{Document, ElementSpec, Viewport};
//!
//! let mut doc = Document::new("https://example.com/", Viewport::new(1280.0, 720.0));
//! let body = doc.body();
//! let button = doc.append_element(body, ElementSpec::new("button").id("go").rect(10.0, 10.0, 80.0, 24.0));
//! doc.append_text(button, "Go");
//!
//! assert_eq!(doc.inner_text(button), "Go");
//! assert_eq!(doc.selector_for(button), "button#go");
//! assert_eq!(doc.select(body, "button#go").unwrap(), vec![button]);
//! ```
mod document;
mod error;
mod geometry;
mod mutation;
mod node;
mod path;
mod selector;
pub mod snapshot;
mod style;
mod text;

pub use document::Document;
pub use error::DomError;
pub use geometry::{Offset, Rect, Viewport};
pub use mutation::{MutationKind, MutationRecord};
pub use node::{DocumentData, ElementData, ElementSpec, FrameContent, NodeId, NodeKind};
pub use path::{Path, PathSegment};
pub use selector::{Selector, SelectorError};
pub use style::{ComputedStyle, Position, StyleProperty, Visibility};
