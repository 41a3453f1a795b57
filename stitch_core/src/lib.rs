//! `stitch_core` is the engine behind `stitch`, a file-based component
//! compositor. An entry document references other documents through
//! self-closing markers; each marker is replaced by the referenced document,
//! itself fully expanded, with the marker's options substituted into it.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Entry document
//!   → Marker scanner (finds `<Component ... />` spans, across lines)
//!   → Option parser (`key={value}` fragments → ordered scalar / list options)
//!   → Resolver (loads the `file` option's document and expands it recursively)
//!   → Substituter (`%key%` placeholders and `foreach` blocks)
//!   → Splice (every occurrence of the marker text is replaced)
//! ```
//!
//! ## Syntax
//!
//! A page includes a component and passes it options:
//!
//! ```html
//! <Component file={"card.html"} title={'Hello'} items={['a', 'b', 3]} />
//! ```
//!
//! The component uses `%name%` placeholders, and `foreach` comments for list
//! options:
//!
//! ```html
//! <h1>%title%</h1>
//! <!-- foreach %items% --><li>%items%</li><!-- endforeach %items% -->
//! ```
//!
//! Rendering never fails: markers without a `file` option, or pointing at a
//! missing document, are removed from the output. Use
//! [`Engine::render_with_diagnostics`] to find out what was dropped, or
//! [`Engine::try_render`] to turn unreadable documents into errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use stitch_core::Engine;
//! use stitch_core::MemoryLoader;
//!
//! let loader = MemoryLoader::new()
//! 	.with("page.html", r#"<Component file="card.html" title={'Hi'} />"#)
//! 	.with("card.html", "<h1>%title%</h1>");
//! let engine = Engine::with_loader(loader);
//!
//! assert_eq!(engine.render("page.html"), "<h1>Hi</h1>");
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use loader::*;
pub use parser::*;
pub use position::*;
pub use project::*;
pub use substitute::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod loader;
mod parser;
mod position;
pub mod project;
mod substitute;

#[cfg(test)]
mod __fixtures;
