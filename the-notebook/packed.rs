//! Packing of one `(text, color)` pair into a single 64-bit word.
//!
//! # Layout
//!
//! Byte 0 is the tag byte: the low seven bits carry the color code and the
//! high bit selects the storage mode.
//!
//! - **Inline** (high bit set): bytes 1..8 hold the text itself, padded with
//!   zero bytes. The text ends at the first zero byte or at the end of the
//!   word.
//! - **Slab** (high bit clear): bytes 1..5 hold the little-endian `u32` end
//!   offset of the text inside the slab. The start offset is not stored; it is
//!   the end offset of the previous slab element, which the reader tracks with
//!   a [`SlabCursor`]. The remaining three bytes are zero.
//!
//! Slab elements can therefore only be decoded in order, starting from the
//! first element of the sequence.
//!
//! ```
//! use the_notebook::packed::{
//!   PackedElement,
//!   SlabCursor,
//! };
//!
//! let mut slab = Vec::new();
//! let short = PackedElement::encode("let", &3u8, &mut slab).unwrap();
//! let long = PackedElement::encode("a longer string", &5u8, &mut slab).unwrap();
//! assert!(short.is_inline());
//! assert_eq!(slab.len(), 15);
//!
//! let mut cursor = SlabCursor::new();
//! assert_eq!(short.decode::<u8>(&slab, &mut cursor), ("let", 3));
//! assert_eq!(long.decode::<u8>(&slab, &mut cursor), ("a longer string", 5));
//! assert_eq!(cursor.offset(), 15);
//! ```

use std::fmt;

use thiserror::Error;

use crate::color::{
  MAX_COLOR_CODE,
  PackedColor,
};

/// Longest text, in bytes, stored inside the word.
pub const INLINE_CAPACITY: usize = 7;

/// Largest slab size a slab element can point into.
pub const MAX_SLAB_LEN: usize = u32::MAX as usize;

const INLINE_FLAG: u8 = 0x80;
const COLOR_MASK: u8 = 0x7f;

pub type Result<T> = std::result::Result<T, EncodeError>;

/// Reasons an append is refused. Nothing is written when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
  #[error("color code {code} does not fit in 7 bits (max {max})", max = MAX_COLOR_CODE)]
  ColorOutOfRange { code: u8 },
  #[error(
    "slab of {len} bytes cannot take {additional} more bytes (max {max})",
    max = MAX_SLAB_LEN
  )]
  SlabOverflow { len: usize, additional: usize },
}

/// Where the text of a [`PackedElement`] lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage<'a> {
  /// Text bytes stored in the word itself.
  Inline(&'a [u8]),
  /// Text ends at `end` in the slab and starts where the previous slab
  /// element ended.
  Slab { end: u32 },
}

/// One encoded fragment: a color code plus either inline text or a slab end
/// offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PackedElement([u8; 8]);

const _: () = assert!(size_of::<PackedElement>() == 8);

impl PackedElement {
  /// Encodes `text` and `color`, appending the text to `slab` when it cannot
  /// be stored inline.
  ///
  /// Text is inlined when it is at most [`INLINE_CAPACITY`] bytes long and
  /// holds no zero byte, since a zero byte terminates inline text.
  pub fn encode<C: PackedColor>(text: &str, color: &C, slab: &mut Vec<u8>) -> Result<Self> {
    let code = color_code(color)?;
    let bytes = text.as_bytes();
    let mut word = [0u8; 8];

    if fits_inline(bytes) {
      word[0] = INLINE_FLAG | code;
      word[1..=bytes.len()].copy_from_slice(bytes);
      return Ok(Self(word));
    }

    let end = slab_end(slab.len(), bytes.len())?;
    slab.extend_from_slice(bytes);
    word[0] = code;
    word[1..5].copy_from_slice(&end.to_le_bytes());
    Ok(Self(word))
  }

  /// Runs the checks of [`encode`](Self::encode) against a slab of
  /// `slab_len` bytes without writing anything.
  pub fn check<C: PackedColor>(text: &str, color: &C, slab_len: usize) -> Result<()> {
    color_code(color)?;
    let bytes = text.as_bytes();
    if !fits_inline(bytes) {
      slab_end(slab_len, bytes.len())?;
    }
    Ok(())
  }

  /// Decodes the element, reading slab text from `cursor` up to the stored end
  /// offset and moving `cursor` there.
  ///
  /// # Panics
  ///
  /// Panics when the stored color code is not valid for `C`, or when the slab
  /// range is out of order, out of bounds or not UTF-8. All of these mean the
  /// storage was corrupted or decoded with a different color type.
  pub fn decode<'a, C: PackedColor>(
    &'a self,
    slab: &'a [u8],
    cursor: &mut SlabCursor,
  ) -> (&'a str, C) {
    let code = self.code();
    let Some(color) = C::from_code(code) else {
      corrupted(format_args!("color code {code} has no matching color"));
    };

    let bytes = match self.storage() {
      Storage::Inline(bytes) => bytes,
      Storage::Slab { end } => {
        let start = cursor.0;
        let end = end as usize;
        if end < start || end > slab.len() {
          corrupted(format_args!(
            "slab range {start}..{end} is invalid for a slab of {} bytes",
            slab.len()
          ));
        }
        cursor.0 = end;
        &slab[start..end]
      },
    };

    match std::str::from_utf8(bytes) {
      Ok(text) => (text, color),
      Err(err) => corrupted(format_args!("fragment text is not UTF-8: {err}")),
    }
  }

  /// Returns true if the text is stored inside the word.
  #[inline]
  pub fn is_inline(&self) -> bool {
    self.0[0] & INLINE_FLAG != 0
  }

  /// The raw 7-bit color code.
  #[inline]
  pub fn code(&self) -> u8 {
    self.0[0] & COLOR_MASK
  }

  /// The slab end offset, or `None` for inline elements.
  #[inline]
  pub fn end_offset(&self) -> Option<u32> {
    match self.storage() {
      Storage::Slab { end } => Some(end),
      Storage::Inline(_) => None,
    }
  }

  pub fn storage(&self) -> Storage<'_> {
    if self.is_inline() {
      let inline = &self.0[1..];
      let len = inline
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(INLINE_CAPACITY);
      Storage::Inline(&inline[..len])
    } else {
      let [_, a, b, c, d, ..] = self.0;
      Storage::Slab {
        end: u32::from_le_bytes([a, b, c, d]),
      }
    }
  }

  /// The word as an integer, tag byte lowest.
  #[inline]
  pub fn to_bits(self) -> u64 {
    u64::from_le_bytes(self.0)
  }

  /// Rebuilds an element from [`to_bits`](Self::to_bits) output.
  #[inline]
  pub fn from_bits(bits: u64) -> Self {
    Self(bits.to_le_bytes())
  }
}

impl fmt::Debug for PackedElement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.storage() {
      Storage::Inline(bytes) => {
        f.debug_struct("Inline")
          .field("code", &self.code())
          .field("text", &String::from_utf8_lossy(bytes))
          .finish()
      },
      Storage::Slab { end } => {
        f.debug_struct("Slab")
          .field("code", &self.code())
          .field("end", &end)
          .finish()
      },
    }
  }
}

/// Read position in the slab, advanced by every decoded slab element.
///
/// Each traversal owns its own cursor; it is never shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlabCursor(usize);

impl SlabCursor {
  /// A cursor at the start of the slab.
  pub const fn new() -> Self {
    Self(0)
  }

  #[inline]
  pub fn offset(&self) -> usize {
    self.0
  }
}

fn color_code<C: PackedColor>(color: &C) -> Result<u8> {
  let code = color.to_code();
  if code > MAX_COLOR_CODE {
    return Err(EncodeError::ColorOutOfRange { code });
  }
  Ok(code)
}

/// Inline text ends at the first zero byte, so text holding one goes to the
/// slab.
#[inline]
fn fits_inline(bytes: &[u8]) -> bool {
  bytes.len() <= INLINE_CAPACITY && !bytes.contains(&0)
}

fn slab_end(len: usize, additional: usize) -> Result<u32> {
  len
    .checked_add(additional)
    .and_then(|end| u32::try_from(end).ok())
    .ok_or(EncodeError::SlabOverflow { len, additional })
}

#[cold]
#[track_caller]
fn corrupted(what: fmt::Arguments<'_>) -> ! {
  tracing::error!(%what, "corrupted fragment storage");
  panic!("corrupted fragment storage: {what}");
}

#[cfg(test)]
mod tests {
  use super::*;

  fn round_trip(text: &str, code: u8) -> (String, u8, usize, SlabCursor) {
    let mut slab = Vec::new();
    let element = PackedElement::encode(text, &code, &mut slab).unwrap();
    let mut cursor = SlabCursor::new();
    let (decoded, color) = element.decode::<u8>(&slab, &mut cursor);
    (decoded.to_owned(), color, slab.len(), cursor)
  }

  quickcheck::quickcheck! {
      fn short_text_stays_inline(text: String, code: u8) -> bool {
        let code = code & COLOR_MASK;
        if text.len() > INLINE_CAPACITY || text.contains('\0') {
          return true;
        }
        let (decoded, color, slab_len, cursor) = round_trip(&text, code);
        decoded == text && color == code && slab_len == 0 && cursor.offset() == 0
      }

      fn long_text_goes_to_slab(text: String, code: u8) -> bool {
        let code = code & COLOR_MASK;
        let text = format!("{text}01234567");
        let (decoded, color, slab_len, cursor) = round_trip(&text, code);
        decoded == text && color == code && slab_len == text.len() && cursor.offset() == slab_len
      }
  }

  #[test]
  fn tag_byte_layout() {
    let mut slab = Vec::new();
    let inline = PackedElement::encode("ab", &0x25u8, &mut slab).unwrap();
    assert_eq!(inline.to_bits(), 0x6261_a5);
    assert_eq!(PackedElement::from_bits(inline.to_bits()), inline);

    let indirect = PackedElement::encode("abcdefgh", &0x25u8, &mut slab).unwrap();
    assert_eq!(indirect.to_bits(), 0x0000_0008_25);
    assert!(!indirect.is_inline());
    assert_eq!(indirect.end_offset(), Some(8));
    assert_eq!(inline.end_offset(), None);
  }

  #[test]
  fn inline_boundaries() {
    let mut slab = Vec::new();
    assert!(PackedElement::encode("", &1u8, &mut slab).unwrap().is_inline());
    assert!(PackedElement::encode("1234567", &1u8, &mut slab).unwrap().is_inline());
    // "é" is two bytes, so four of them no longer fit.
    assert!(PackedElement::encode("ééé", &1u8, &mut slab).unwrap().is_inline());
    assert!(!PackedElement::encode("éééé", &1u8, &mut slab).unwrap().is_inline());
    assert!(!PackedElement::encode("12345678", &1u8, &mut slab).unwrap().is_inline());
    assert_eq!(slab.len(), 16);
  }

  #[test]
  fn nul_bytes_are_never_inlined() {
    let (decoded, _, slab_len, _) = round_trip("a\0b", 2);
    assert_eq!(decoded, "a\0b");
    assert_eq!(slab_len, 3);

    let (decoded, _, slab_len, _) = round_trip("ab\0", 2);
    assert_eq!(decoded, "ab\0");
    assert_eq!(slab_len, 3);
  }

  #[test]
  fn cursor_threads_through_slab_elements() {
    let mut slab = Vec::new();
    let elements = [
      PackedElement::encode("first long text", &1u8, &mut slab).unwrap(),
      PackedElement::encode("x", &2u8, &mut slab).unwrap(),
      PackedElement::encode("second long text", &3u8, &mut slab).unwrap(),
    ];

    let mut cursor = SlabCursor::new();
    let decoded: Vec<_> = elements
      .iter()
      .map(|element| element.decode::<u8>(&slab, &mut cursor))
      .collect();
    assert_eq!(decoded, vec![
      ("first long text", 1),
      ("x", 2),
      ("second long text", 3),
    ]);
    assert_eq!(cursor.offset(), slab.len());
  }

  #[test]
  fn oversized_color_is_rejected() {
    let mut slab = Vec::new();
    let err = PackedElement::encode("a long enough text", &0x80u8, &mut slab).unwrap_err();
    assert_eq!(err, EncodeError::ColorOutOfRange { code: 0x80 });
    assert!(slab.is_empty());
  }

  #[test]
  fn slab_stops_at_u32_offsets() {
    let mut slab = vec![0u8; MAX_SLAB_LEN - 8];

    let last = PackedElement::encode("8 bytes!", &1u8, &mut slab).unwrap();
    assert_eq!(last.end_offset(), Some(u32::MAX));
    assert_eq!(slab.len(), MAX_SLAB_LEN);

    assert_eq!(
      PackedElement::check("8 bytes!", &1u8, slab.len()),
      Err(EncodeError::SlabOverflow {
        len:        MAX_SLAB_LEN,
        additional: 8,
      })
    );
    let err = PackedElement::encode("8 bytes!", &1u8, &mut slab).unwrap_err();
    assert_eq!(err, EncodeError::SlabOverflow {
      len:        MAX_SLAB_LEN,
      additional: 8,
    });
    assert_eq!(slab.len(), MAX_SLAB_LEN);

    // Inline text needs no slab space, so it is still accepted.
    let inline = PackedElement::encode("short", &1u8, &mut slab).unwrap();
    assert!(inline.is_inline());
    assert_eq!(slab.len(), MAX_SLAB_LEN);
  }

  #[test]
  fn check_matches_encode() {
    assert_eq!(PackedElement::check("anything at all", &3u8, 0), Ok(()));
    assert_eq!(
      PackedElement::check("x", &0x81u8, 0),
      Err(EncodeError::ColorOutOfRange { code: 0x81 })
    );
  }

  #[test]
  #[should_panic(expected = "corrupted fragment storage")]
  fn unknown_color_code_panics() {
    crate::palette! {
      enum Pair {
        Left,
        Right,
      }
    }

    let mut slab = Vec::new();
    let element = PackedElement::encode("x", &9u8, &mut slab).unwrap();
    let _ = element.decode::<Pair>(&slab, &mut SlabCursor::new());
  }

  #[test]
  #[should_panic(expected = "corrupted fragment storage")]
  fn slab_end_past_buffer_panics() {
    let element = PackedElement::from_bits(0x0000_0040_01);
    let _ = element.decode::<u8>(&[0; 8], &mut SlabCursor::new());
  }
}
