//! # the-notebook
//!
//! Compact, append-only storage for large amounts of styled text, such as the
//! output of a syntax highlighter.
//!
//! Each fragment of text is stored with its color in a single 8-byte
//! [`PackedElement`](packed::PackedElement). Text of up to seven bytes lives
//! inside that word; longer text is appended to a shared byte slab and the
//! word records where it ends. Links attached to fragments are kept in a
//! separate sparse overlay, so unlinked fragments pay nothing for them.
//!
//! ## Layers
//!
//! - [`packed`]: encoding and decoding of single elements
//! - [`FragmentSequence`]: slab plus element list, traversed in order
//! - [`Notebook`]: a fragment sequence with a link overlay
//!
//! ## Example
//!
//! ```
//! use the_notebook::{
//!   Fragment,
//!   Notebook,
//!   palette,
//! };
//!
//! palette! {
//!   #[derive(Debug)]
//!   pub enum Style {
//!     Plain,
//!     Keyword,
//!     Identifier,
//!   }
//! }
//!
//! let notebook = Notebook::from_fragments([
//!   Fragment::new("fn", Style::Keyword),
//!   Fragment::new(" ", Style::Plain),
//!   Fragment::linked("main", Style::Identifier, "src/main.rs:1"),
//! ])
//! .unwrap();
//!
//! for fragment in &notebook {
//!   print!("{}", fragment.text);
//! }
//! assert_eq!(notebook.fragments().slab_len(), 0);
//! ```

pub mod color;
pub mod config;
pub mod notebook;
pub mod packed;
pub mod sequence;

pub use color::PackedColor;
pub use config::{
  ConfigError,
  NotebookConfig,
};
pub use notebook::{
  Fragment,
  Notebook,
};
pub use packed::EncodeError;
pub use sequence::FragmentSequence;
