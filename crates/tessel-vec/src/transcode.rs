//! In-place element-width migration.
//!
//! [`transcode_in_place`] rewrites `len` packed elements of width
//! `old_stride` as `len` packed elements of width `new_stride` inside the
//! same byte buffer, passing each element through a conversion function.
//!
//! New slot `i` starts at `i × new_stride` while old slot `i` starts at
//! `i × old_stride`, so writing one slot can clobber a neighbour that has not
//! been read yet. The iteration [`Direction`] avoids that:
//!
//! ```text
//! widening (new > old), back to front      narrowing (new <= old), front to back
//! old: |a|b|c|                              old: |aa|bb|cc|
//! new: |AA|BB|CC|                           new: |A|B|C|
//!            ^^ written first               ^ written first
//! ```
//!
//! When widening, every unread element `j < i` lives below `i × old_stride
//! <= i × new_stride`. When narrowing, every unread element `j > i` lives
//! at or above `(i + 1) × old_stride >= (i + 1) × new_stride`. Each source
//! element is copied to scratch before its own slot is overwritten, so the
//! conversion function always sees the original bytes.

use std::ops::Range;

use smallvec::{smallvec, SmallVec};

use crate::error::VecError;

/// Elements up to this many bytes are staged without a heap allocation.
const INLINE_ELEMENT_BYTES: usize = 64;

/// Order in which elements are migrated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// From index `len - 1` down to `0` (stride grows).
    BackToFront,
    /// From index `0` up to `len - 1` (stride shrinks or stays).
    FrontToBack,
}

impl Direction {
    /// The only safe direction for an `old_stride → new_stride` migration.
    pub fn for_strides(old_stride: usize, new_stride: usize) -> Self {
        if new_stride > old_stride {
            Self::BackToFront
        } else {
            Self::FrontToBack
        }
    }

    /// Element indices `0..len` in this direction.
    pub fn indices(self, len: usize) -> Indices {
        Indices {
            range: 0..len,
            direction: self,
        }
    }
}

/// Iterator returned by [`Direction::indices`].
#[derive(Clone, Debug)]
pub struct Indices {
    range: Range<usize>,
    direction: Direction,
}

impl Iterator for Indices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self.direction {
            Direction::BackToFront => self.range.next_back(),
            Direction::FrontToBack => self.range.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for Indices {}

/// Re-encode `len` elements in `data` from `old_stride` to `new_stride`.
///
/// `f(src, dst)` receives a copy of the original element (`old_stride`
/// bytes) and the destination slot (`new_stride` bytes, stale contents).
/// `data` must hold `len × max(old_stride, new_stride)` bytes; any bytes
/// past the migrated elements are left as they were.
///
/// Returns the direction used.
pub fn transcode_in_place<F>(
    data: &mut [u8],
    len: usize,
    old_stride: usize,
    new_stride: usize,
    mut f: F,
) -> Result<Direction, VecError>
where
    F: FnMut(&[u8], &mut [u8]),
{
    if old_stride == 0 || new_stride == 0 {
        return Err(VecError::InvalidStride);
    }
    let required = len
        .checked_mul(old_stride.max(new_stride))
        .ok_or(VecError::InvalidResult {
            expected: usize::MAX,
            actual: data.len(),
        })?;
    if required > data.len() {
        return Err(VecError::InvalidResult {
            expected: required,
            actual: data.len(),
        });
    }

    let direction = Direction::for_strides(old_stride, new_stride);
    let mut scratch: SmallVec<[u8; INLINE_ELEMENT_BYTES]> = smallvec![0; old_stride];
    for i in direction.indices(len) {
        let src = i * old_stride;
        scratch.copy_from_slice(&data[src..src + old_stride]);
        let dst = i * new_stride;
        f(scratch.as_slice(), &mut data[dst..dst + new_stride]);
    }
    Ok(direction)
}
