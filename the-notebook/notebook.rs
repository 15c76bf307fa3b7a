//! Fragment sequences annotated with sparse links.
//!
//! A [`Notebook`] pairs a [`FragmentSequence`] with an overlay of
//! `(position, link)` entries. Only linked fragments take overlay space, and
//! since fragments are only ever appended the overlay stays sorted by
//! position. Traversal walks both in lockstep.
//!
//! ```
//! use the_notebook::{
//!   Fragment,
//!   Notebook,
//! };
//!
//! let mut notebook = Notebook::<u8, &str>::new();
//! notebook.push("see", 0, None).unwrap();
//! notebook.push(" ", 0, None).unwrap();
//! notebook.push("Vec", 3, Some("std::vec::Vec")).unwrap();
//!
//! let linked: Vec<_> = notebook.iter().filter_map(|fragment| fragment.link).collect();
//! assert_eq!(linked, vec![&"std::vec::Vec"]);
//!
//! // Links can be rewritten without touching the fragments.
//! let lengths = notebook.map_links(|path| path.len());
//! assert_eq!(
//!   lengths.iter().nth(2),
//!   Some(Fragment::linked("Vec", 3, &13))
//! );
//! ```

use std::{
  fmt,
  iter::FusedIterator,
  slice,
  sync::Arc,
};

use crate::{
  color::PackedColor,
  config::NotebookConfig,
  packed::Result,
  sequence::{
    FragmentSequence,
    Fragments,
  },
};

/// One styled piece of text with an optional link.
///
/// Used both for the records a notebook is built from and for the views its
/// traversal yields, where `T` is `&str` and `L` is a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fragment<T, C, L> {
  pub text:  T,
  pub color: C,
  pub link:  Option<L>,
}

impl<T, C, L> Fragment<T, C, L> {
  pub fn new(text: T, color: C) -> Self {
    Self {
      text,
      color,
      link: None,
    }
  }

  pub fn linked(text: T, color: C, link: L) -> Self {
    Self {
      text,
      color,
      link: Some(link),
    }
  }
}

impl<T, C, L> From<(T, C)> for Fragment<T, C, L> {
  fn from((text, color): (T, C)) -> Self {
    Self::new(text, color)
  }
}

impl<T, C, L> From<(T, C, Option<L>)> for Fragment<T, C, L> {
  fn from((text, color, link): (T, C, Option<L>)) -> Self {
    Self { text, color, link }
  }
}

/// Append-only storage for styled fragments with sparse links of type `L`.
///
/// The fragment storage is reference counted, so [`Notebook::map_links`] and
/// friends share it with the notebook they were derived from. Appending to a
/// notebook whose storage is shared copies the storage first.
pub struct Notebook<C, L> {
  fragments: Arc<FragmentSequence<C>>,
  /// Sorted by position, at most one entry per position.
  links:     Vec<(usize, L)>,
}

impl<C, L> Notebook<C, L> {
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  pub fn with_capacity(fragments: usize) -> Self {
    Self {
      fragments: Arc::new(FragmentSequence::with_capacity(fragments)),
      links:     Vec::new(),
    }
  }

  pub fn with_config(config: &NotebookConfig) -> Self {
    Self {
      fragments: Arc::new(FragmentSequence::with_config(config)),
      links:     Vec::with_capacity(config.links),
    }
  }

  /// Number of stored fragments, linked or not.
  #[inline]
  pub fn len(&self) -> usize {
    self.fragments.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.fragments.is_empty()
  }

  /// Number of fragments carrying a link.
  #[inline]
  pub fn link_count(&self) -> usize {
    self.links.len()
  }

  pub fn fragments(&self) -> &FragmentSequence<C> {
    &self.fragments
  }

  /// The link overlay as `(position, link)` pairs in position order.
  pub fn links(&self) -> impl ExactSizeIterator<Item = (usize, &L)> + '_ {
    self.links.iter().map(|(position, link)| (*position, link))
  }

  /// Builds a notebook with the same fragments and every link replaced by
  /// `f(link)`.
  pub fn map_links<M, F>(&self, mut f: F) -> Notebook<C, M>
  where
    F: FnMut(&L) -> M,
  {
    Notebook {
      fragments: Arc::clone(&self.fragments),
      links:     self
        .links
        .iter()
        .map(|(position, link)| (*position, f(link)))
        .collect(),
    }
  }

  /// Like [`map_links`](Self::map_links), but a link is dropped when `f`
  /// returns `None`. The fragment it was attached to stays.
  pub fn filter_map_links<M, F>(&self, mut f: F) -> Notebook<C, M>
  where
    F: FnMut(&L) -> Option<M>,
  {
    let links: Vec<_> = self
      .links
      .iter()
      .filter_map(|(position, link)| f(link).map(|mapped| (*position, mapped)))
      .collect();

    let dropped = self.links.len() - links.len();
    if dropped > 0 {
      tracing::trace!(dropped, kept = links.len(), "dropped notebook links");
    }

    Notebook {
      fragments: Arc::clone(&self.fragments),
      links,
    }
  }

  /// Like [`map_links`](Self::map_links) with a fallible `f`. The first error
  /// is returned and no notebook is built.
  pub fn try_map_links<M, E, F>(&self, mut f: F) -> std::result::Result<Notebook<C, M>, E>
  where
    F: FnMut(&L) -> std::result::Result<M, E>,
  {
    let links = self
      .links
      .iter()
      .map(|(position, link)| f(link).map(|mapped| (*position, mapped)))
      .collect::<std::result::Result<Vec<_>, E>>()?;

    Ok(Notebook {
      fragments: Arc::clone(&self.fragments),
      links,
    })
  }
}

impl<C: PackedColor, L> Notebook<C, L> {
  /// Appends a fragment and, if `link` is given, records it at the fragment's
  /// position. Returns that position.
  ///
  /// On error nothing is appended, and storage shared with other notebooks
  /// is not copied.
  pub fn push(&mut self, text: &str, color: C, link: Option<L>) -> Result<usize> {
    self
      .fragments
      .check(text, &color)
      .inspect_err(|err| tracing::debug!(%err, "rejected notebook fragment"))?;
    let position = Arc::make_mut(&mut self.fragments).push(text, color)?;
    if let Some(link) = link {
      self.links.push((position, link));
    }
    Ok(position)
  }

  /// Builds a notebook from fragment records, keeping their links.
  ///
  /// Capacity is reserved from the source's size hint.
  pub fn from_fragments<I, T>(fragments: I) -> Result<Self>
  where
    I: IntoIterator<Item = Fragment<T, C, L>>,
    T: AsRef<str>,
  {
    let fragments = fragments.into_iter();
    let mut notebook = Self::with_capacity(fragments.size_hint().0);
    notebook.try_extend(fragments)?;
    notebook.log_built();
    Ok(notebook)
  }

  /// Builds a notebook from fragment records, ignoring whatever links they
  /// carry. Useful when the source's link type is irrelevant, for instance
  /// to get a `Notebook<C, Infallible>`.
  pub fn from_fragments_discarding_links<I, T, M>(fragments: I) -> Result<Self>
  where
    I: IntoIterator<Item = Fragment<T, C, M>>,
    T: AsRef<str>,
  {
    let fragments = fragments.into_iter();
    let mut notebook = Self::with_capacity(fragments.size_hint().0);
    for fragment in fragments {
      notebook.push(fragment.text.as_ref(), fragment.color, None)?;
    }
    notebook.log_built();
    Ok(notebook)
  }

  /// Appends every fragment in order. Stops at the first rejected fragment;
  /// fragments before it stay appended.
  pub fn try_extend<I, T>(&mut self, fragments: I) -> Result<()>
  where
    I: IntoIterator<Item = Fragment<T, C, L>>,
    T: AsRef<str>,
  {
    let fragments = fragments.into_iter();
    let additional = fragments.size_hint().0;
    if additional > 0 {
      Arc::make_mut(&mut self.fragments).reserve(additional);
    }
    for fragment in fragments {
      self.push(fragment.text.as_ref(), fragment.color, fragment.link)?;
    }
    Ok(())
  }

  /// Traverses the fragments in append order with their links.
  pub fn iter(&self) -> Iter<'_, C, L> {
    Iter {
      fragments: self.fragments.iter(),
      links:     self.links.iter(),
      position:  0,
    }
  }

  fn log_built(&self) {
    tracing::debug!(
      fragments = self.len(),
      slab_bytes = self.fragments.slab_len(),
      links = self.links.len(),
      "built notebook"
    );
  }
}

impl<C, L> Default for Notebook<C, L> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C, L: Clone> Clone for Notebook<C, L> {
  fn clone(&self) -> Self {
    Self {
      fragments: Arc::clone(&self.fragments),
      links:     self.links.clone(),
    }
  }
}

impl<C, L: PartialEq> PartialEq for Notebook<C, L> {
  fn eq(&self, other: &Self) -> bool {
    self.fragments == other.fragments && self.links == other.links
  }
}

impl<C, L: Eq> Eq for Notebook<C, L> {}

impl<C: PackedColor + fmt::Debug, L: fmt::Debug> fmt::Debug for Notebook<C, L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<'a, C: PackedColor, L> IntoIterator for &'a Notebook<C, L> {
  type IntoIter = Iter<'a, C, L>;
  type Item = Fragment<&'a str, C, &'a L>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Traversal over a [`Notebook`].
pub struct Iter<'a, C, L> {
  fragments: Fragments<'a, C>,
  links:     slice::Iter<'a, (usize, L)>,
  position:  usize,
}

impl<C, L> Clone for Iter<'_, C, L> {
  fn clone(&self) -> Self {
    Self {
      fragments: self.fragments.clone(),
      links:     self.links.clone(),
      position:  self.position,
    }
  }
}

impl<'a, C: PackedColor, L> Iterator for Iter<'a, C, L> {
  type Item = Fragment<&'a str, C, &'a L>;

  fn next(&mut self) -> Option<Self::Item> {
    let (text, color) = self.fragments.next()?;
    let position = self.position;
    self.position += 1;

    let link = match self.links.as_slice().first() {
      Some((linked, link)) if *linked == position => {
        self.links.next();
        Some(link)
      },
      _ => None,
    };

    Some(Fragment { text, color, link })
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    self.fragments.size_hint()
  }
}

impl<C: PackedColor, L> ExactSizeIterator for Iter<'_, C, L> {}

impl<C: PackedColor, L> FusedIterator for Iter<'_, C, L> {}
