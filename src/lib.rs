//! # entitle
//!
//! Derive normalized display titles and URL-safe section identifiers for the
//! content files of an ebook source.
//!
//! Each XHTML content file encodes its structural unit (chapter, part,
//! volume, article, ...) through `epub:type` markers on the first heading and
//! its enclosing sections. entitle classifies the division, parses the
//! heading's numbering, title, and subtitle, title-cases the text, rewrites
//! the `<title>` element, and computes a slug identifier for the section.
//!
//! ## Quick Start
//!
//! ```
//! use entitle::derive_title_and_id;
//!
//! let xhtml = r#"<html xmlns:epub="http://www.idpf.org/2007/ops">
//! <head><title>placeholder</title></head>
//! <body><section epub:type="chapter">
//! <h2 epub:type="ordinal z3998:roman">VII</h2>
//! <p>...</p>
//! </section></body>
//! </html>"#;
//!
//! let titled = derive_title_and_id(xhtml).unwrap();
//! assert_eq!(titled.title, "Chapter 7");
//! assert_eq!(titled.id, "chapter-7");
//! ```
//!
//! ## Batch Processing
//!
//! [`process_directory`] runs the engine over every content file named by an
//! unpacked source's OPF spine, isolating per-file failures.

pub mod batch;
pub mod dom;
pub mod engine;
pub mod error;
pub mod heading;
pub mod roman;
pub mod slug;
pub mod titlecase;
pub(crate) mod util;

pub use batch::{BatchReport, FileFailure, ProcessedFile, process_directory};
pub use engine::{Titled, derive_title_and_id};
pub use error::{Error, Result};
pub use heading::{BookDivision, TitleInfo};
pub use slug::slugify;
pub use titlecase::titlecase;
