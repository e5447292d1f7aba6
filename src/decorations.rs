use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::style::StyleTag;

/// The start of a styled span.
///
/// The span runs until the position of the next decoration, or until the end of the source
/// for the last one. Positions are byte offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decoration {
    pub position: usize,
    pub style: StyleTag,
}

impl Decoration {
    pub fn new(position: usize, style: StyleTag) -> Self {
        Self { position, style }
    }
}

/// Removes spans covering no text and merges consecutive spans sharing a style.
///
/// `end` is the position right after the last character covered by the decorations.
/// Running it on its own output changes nothing.
pub fn simplify(decorations: &mut Vec<Decoration>, end: usize) {
    let mut write = 0;
    for read in 0..decorations.len() {
        let decoration = decorations[read];
        let next_position = decorations.get(read + 1).map_or(end, |d| d.position);
        if next_position == decoration.position {
            continue;
        }
        if write > 0 && decorations[write - 1].style == decoration.style {
            continue;
        }
        decorations[write] = decoration;
        write += 1;
    }
    decorations.truncate(write);
}

/// Turns decorations into the byte range each style applies to
pub fn spans(
    decorations: &[Decoration],
    end: usize,
) -> impl Iterator<Item = (Range<usize>, StyleTag)> + '_ {
    decorations.iter().enumerate().map(move |(i, decoration)| {
        let next_position = decorations.get(i + 1).map_or(end, |d| d.position);
        (decoration.position..next_position, decoration.style)
    })
}
