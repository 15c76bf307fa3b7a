//! Benchmarks for building and traversing notebooks.
//!
//! Run with: `cargo bench -p the-notebook --bench notebook`

use divan::{
  Bencher,
  black_box,
};
use the_notebook::{
  Fragment,
  Notebook,
};

fn main() {
  divan::main();
}

const TOKENS: &[(&str, u8)] = &[
  ("pub", 1),
  (" ", 0),
  ("fn", 1),
  (" ", 0),
  ("highlight_fragments", 2),
  ("(", 3),
  ("text", 2),
  (": ", 3),
  ("&str", 4),
  (")", 3),
  (" ", 0),
  ("// trailing comment on the line", 5),
  ("\n", 0),
];

/// One fragment in `link_every` carries a link.
fn make_fragments(count: usize, link_every: usize) -> Vec<Fragment<&'static str, u8, usize>> {
  (0..count)
    .map(|i| {
      let (text, color) = TOKENS[i % TOKENS.len()];
      let link = (i % link_every == 0).then_some(i);
      Fragment { text, color, link }
    })
    .collect()
}

fn make_notebook(count: usize, link_every: usize) -> Notebook<u8, usize> {
  Notebook::from_fragments(make_fragments(count, link_every)).unwrap()
}

// `Notebook::from_fragments` benchmarks.

mod build {
  use super::*;

  #[divan::bench(args = [1_000, 100_000])]
  fn sparse_links(bencher: Bencher, count: usize) {
    let fragments = make_fragments(count, 64);

    bencher.bench(|| {
      let notebook = Notebook::from_fragments(black_box(fragments.iter().copied())).unwrap();
      black_box(notebook);
    });
  }

  #[divan::bench(args = [1_000, 100_000])]
  fn vec_of_strings(bencher: Bencher, count: usize) {
    let fragments = make_fragments(count, 64);

    bencher.bench(|| {
      let naive: Vec<_> = fragments
        .iter()
        .map(|fragment| (fragment.text.to_owned(), fragment.color, fragment.link))
        .collect();
      black_box(naive);
    });
  }
}

// `Notebook::iter` benchmarks.

mod traverse {
  use super::*;

  #[divan::bench(args = [1_000, 100_000])]
  fn text_bytes(bencher: Bencher, count: usize) {
    let notebook = make_notebook(count, 64);

    bencher.bench(|| {
      let bytes: usize = black_box(&notebook)
        .iter()
        .map(|fragment| fragment.text.len())
        .sum();
      black_box(bytes);
    });
  }

  #[divan::bench(args = [1_000, 100_000])]
  fn linked_only(bencher: Bencher, count: usize) {
    let notebook = make_notebook(count, 8);

    bencher.bench(|| {
      let links = black_box(&notebook)
        .iter()
        .filter(|fragment| fragment.link.is_some())
        .count();
      black_box(links);
    });
  }
}

// `Notebook::map_links` benchmarks.

mod map_links {
  use super::*;

  #[divan::bench(args = [1_000, 100_000])]
  fn to_string(bencher: Bencher, count: usize) {
    let notebook = make_notebook(count, 8);

    bencher.bench(|| {
      let mapped = black_box(&notebook).map_links(|link| link.to_string());
      black_box(mapped);
    });
  }
}
