//! Color tags and their mapping to the 7-bit code stored in a packed element.
//!
//! The storage layers never look at a color beyond its integer code. A color
//! type opts in by implementing [`PackedColor`], either by hand or through the
//! [`palette!`](crate::palette) macro for plain fieldless enums.
//!
//! ```
//! the_notebook::palette! {
//!   #[derive(Debug)]
//!   pub enum Token {
//!     Plain,
//!     Keyword,
//!     Comment,
//!   }
//! }
//!
//! use the_notebook::PackedColor;
//!
//! assert_eq!(Token::Comment.to_code(), 2);
//! assert_eq!(Token::from_code(1), Some(Token::Keyword));
//! assert_eq!(Token::from_code(3), None);
//! ```

/// Largest code a color may map to.
pub const MAX_COLOR_CODE: u8 = 0x7f;

/// Number of distinct colors a palette can hold.
pub const PALETTE_LIMIT: usize = MAX_COLOR_CODE as usize + 1;

/// A color that round-trips through a small integer code.
///
/// `from_code(c.to_code())` must give back a value equal to `c`. Codes above
/// [`MAX_COLOR_CODE`] are rejected when encoding, and a code for which
/// `from_code` returns `None` is treated as corrupted storage when decoding.
pub trait PackedColor: Sized {
  fn to_code(&self) -> u8;

  fn from_code(code: u8) -> Option<Self>;
}

impl PackedColor for u8 {
  #[inline]
  fn to_code(&self) -> u8 {
    *self
  }

  #[inline]
  fn from_code(code: u8) -> Option<Self> {
    (code <= MAX_COLOR_CODE).then_some(code)
  }
}

/// Declares a fieldless enum usable as a notebook color.
///
/// Variants get codes in declaration order, starting at zero. The generated
/// enum derives `Clone`, `Copy`, `PartialEq` and `Eq`; further derives can be
/// passed as attributes. A palette needs at least one variant, and declaring
/// more than 128 fails to compile.
#[macro_export]
macro_rules! palette {
  (
    $(#[$meta:meta])*
    $vis:vis enum $name:ident {
      $(#[$first_meta:meta])*
      $first:ident
      $(
        ,
        $(#[$variant_meta:meta])*
        $variant:ident
      )* $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Clone, Copy, PartialEq, Eq)]
    #[repr(u8)]
    $vis enum $name {
      $(#[$first_meta])*
      $first,
      $(
        $(#[$variant_meta])*
        $variant,
      )*
    }

    impl $name {
      /// Every color of the palette, indexed by code.
      pub const ALL: &'static [$name] = &[ $name::$first $(, $name::$variant )* ];
    }

    const _: () = assert!(
      $name::ALL.len() <= $crate::color::PALETTE_LIMIT,
      "a palette holds at most 128 colors"
    );

    impl $crate::color::PackedColor for $name {
      #[inline]
      fn to_code(&self) -> u8 {
        *self as u8
      }

      #[inline]
      fn from_code(code: u8) -> ::std::option::Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
      }
    }
  };
}
