//! An append-only list of packed fragments and the slab backing them.

use std::{
  fmt,
  iter::FusedIterator,
  marker::PhantomData,
  slice,
};

use crate::{
  color::PackedColor,
  config::NotebookConfig,
  packed::{
    PackedElement,
    Result,
    SlabCursor,
  },
};

/// Colored text fragments stored in append order.
///
/// Every fragment takes one 8-byte [`PackedElement`]; text longer than the
/// inline capacity is also copied into a shared byte slab. Fragments can only
/// be read back by traversing from the start, see [`FragmentSequence::iter`].
///
/// Equality is structural: two sequences are equal when their slabs and
/// element words are byte-for-byte identical.
pub struct FragmentSequence<C> {
  slab:     Vec<u8>,
  elements: Vec<PackedElement>,
  _color:   PhantomData<fn() -> C>,
}

impl<C> FragmentSequence<C> {
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  /// Creates an empty sequence with room for `fragments` elements. The slab
  /// starts empty.
  pub fn with_capacity(fragments: usize) -> Self {
    Self {
      slab:     Vec::new(),
      elements: Vec::with_capacity(fragments),
      _color:   PhantomData,
    }
  }

  pub fn with_config(config: &NotebookConfig) -> Self {
    Self {
      slab:     Vec::with_capacity(config.slab_bytes),
      elements: Vec::with_capacity(config.fragments),
      _color:   PhantomData,
    }
  }

  /// Number of stored fragments.
  #[inline]
  pub fn len(&self) -> usize {
    self.elements.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  /// Number of text bytes moved out of line into the slab.
  #[inline]
  pub fn slab_len(&self) -> usize {
    self.slab.len()
  }

  pub fn slab(&self) -> &[u8] {
    &self.slab
  }

  pub fn elements(&self) -> &[PackedElement] {
    &self.elements
  }

  pub fn reserve(&mut self, fragments: usize) {
    self.elements.reserve(fragments);
  }

  pub fn shrink_to_fit(&mut self) {
    self.slab.shrink_to_fit();
    self.elements.shrink_to_fit();
  }
}

impl<C: PackedColor> FragmentSequence<C> {
  /// Appends a fragment and returns its position.
  ///
  /// On error the sequence is left untouched.
  pub fn push(&mut self, text: &str, color: C) -> Result<usize> {
    let position = self.elements.len();
    let element = PackedElement::encode(text, &color, &mut self.slab)?;
    self.elements.push(element);
    Ok(position)
  }

  /// Returns the error [`push`](Self::push) would give for this fragment,
  /// without appending it.
  pub fn check(&self, text: &str, color: &C) -> Result<()> {
    PackedElement::check(text, color, self.slab.len())
  }

  /// Traverses the fragments in append order.
  ///
  /// Each call starts a fresh traversal with its own slab cursor.
  pub fn iter(&self) -> Fragments<'_, C> {
    Fragments {
      elements: self.elements.iter(),
      slab:     &self.slab,
      cursor:   SlabCursor::new(),
      _color:   PhantomData,
    }
  }
}

impl<C> Default for FragmentSequence<C> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C> Clone for FragmentSequence<C> {
  fn clone(&self) -> Self {
    Self {
      slab:     self.slab.clone(),
      elements: self.elements.clone(),
      _color:   PhantomData,
    }
  }
}

impl<C> PartialEq for FragmentSequence<C> {
  fn eq(&self, other: &Self) -> bool {
    self.elements == other.elements && self.slab == other.slab
  }
}

impl<C> Eq for FragmentSequence<C> {}

impl<C: PackedColor + fmt::Debug> fmt::Debug for FragmentSequence<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<'a, C: PackedColor> IntoIterator for &'a FragmentSequence<C> {
  type IntoIter = Fragments<'a, C>;
  type Item = (&'a str, C);

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Traversal over a [`FragmentSequence`], yielding `(text, color)` pairs.
pub struct Fragments<'a, C> {
  elements: slice::Iter<'a, PackedElement>,
  slab:     &'a [u8],
  cursor:   SlabCursor,
  _color:   PhantomData<fn() -> C>,
}

impl<C> Fragments<'_, C> {
  /// Slab offset the next slab element starts at.
  pub fn slab_offset(&self) -> usize {
    self.cursor.offset()
  }
}

impl<C> Clone for Fragments<'_, C> {
  fn clone(&self) -> Self {
    Self {
      elements: self.elements.clone(),
      slab:     self.slab,
      cursor:   self.cursor,
      _color:   PhantomData,
    }
  }
}

impl<'a, C: PackedColor> Iterator for Fragments<'a, C> {
  type Item = (&'a str, C);

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    let element = self.elements.next()?;
    Some(element.decode(self.slab, &mut self.cursor))
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    self.elements.size_hint()
  }
}

impl<C: PackedColor> ExactSizeIterator for Fragments<'_, C> {}

impl<C: PackedColor> FusedIterator for Fragments<'_, C> {}
