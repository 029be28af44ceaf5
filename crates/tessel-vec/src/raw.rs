//! Type-erased vectors with a runtime element width.

use std::fmt;

use smallvec::{smallvec, SmallVec};
use tessel_alloc::{Allocator, Block};

use crate::config::VectorParams;
use crate::error::VecError;
use crate::header::{VectorHeader, HEADER_BYTES};
use crate::transcode::{self, Direction};

/// Elements up to this many bytes are staged without a heap allocation.
const INLINE_ELEMENT_BYTES: usize = 64;

/// A growable vector of `stride`-byte elements.
///
/// The header and element storage share one block from `A`. Growth doubles
/// the capacity through [`Allocator::resize`], which may relocate the block;
/// since every such operation takes `&mut self`, no reference into the old
/// storage can survive it.
///
/// Dropping the vector returns its block to the allocator when the strategy
/// supports `free`. Arena-backed vectors are reclaimed by the arena's reset.
pub struct RawVector<'a, A: Allocator + ?Sized> {
    block: Block<'a>,
    alloc: &'a A,
}

impl<'a, A: Allocator + ?Sized> RawVector<'a, A> {
    /// Create an empty vector in `alloc`.
    ///
    /// Reserves `HEADER_BYTES + capacity × stride` bytes.
    pub fn new(alloc: &'a A, params: VectorParams) -> Result<Self, VecError> {
        params.validate()?;
        let capacity = params.resolved_capacity();
        let size = block_size(capacity, params.stride)?;
        let mut block = alloc.alloc(size)?;
        VectorHeader::new(capacity, params.stride).write(block.as_bytes_mut());
        tracing::trace!(capacity, stride = params.stride, strategy = alloc.strategy(), "vector created");
        Ok(Self { block, alloc })
    }

    /// Create an empty vector of `stride`-byte elements with the default capacity.
    pub fn with_stride(alloc: &'a A, stride: u32) -> Result<Self, VecError> {
        Self::new(alloc, VectorParams::new(stride))
    }

    /// Snapshot of the header.
    pub fn header(&self) -> VectorHeader {
        VectorHeader::read(self.block.as_bytes())
    }

    /// Parameters describing the current capacity and stride.
    pub fn params(&self) -> VectorParams {
        let header = self.header();
        VectorParams::new(header.stride).with_capacity(header.capacity)
    }

    fn set_header(&mut self, header: &VectorHeader) {
        header.write(self.block.as_bytes_mut());
    }

    /// Number of live elements.
    pub fn length(&self) -> u32 {
        self.header().length
    }

    /// Whether the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Number of element slots reserved.
    pub fn capacity(&self) -> u32 {
        self.header().capacity
    }

    /// Width of one element in bytes.
    pub fn stride(&self) -> u32 {
        self.header().stride
    }

    /// The allocator that owns this vector's storage.
    pub fn allocator(&self) -> &'a A {
        self.alloc
    }

    /// Size of the backing block in bytes, header included.
    pub fn block_len(&self) -> usize {
        self.block.len()
    }

    /// The live elements, packed.
    pub fn as_bytes(&self) -> &[u8] {
        let live = self.header().live_bytes();
        &self.block.as_bytes()[HEADER_BYTES..HEADER_BYTES + live]
    }

    /// Iterate over the live elements in index order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, u8> {
        self.as_bytes().chunks_exact(self.stride() as usize)
    }

    /// The element at `index`.
    pub fn at(&self, index: u32) -> Result<&[u8], VecError> {
        let header = self.header();
        check_index(index, header.length)?;
        let start = slot_offset(index, header.stride);
        Ok(&self.block.as_bytes()[start..start + header.stride as usize])
    }

    /// The element at `index`, mutably.
    pub fn at_mut(&mut self, index: u32) -> Result<&mut [u8], VecError> {
        let header = self.header();
        check_index(index, header.length)?;
        let start = slot_offset(index, header.stride);
        Ok(&mut self.block.as_bytes_mut()[start..start + header.stride as usize])
    }

    /// Append `element` after the last live element, growing if full.
    pub fn append(&mut self, element: &[u8]) -> Result<(), VecError> {
        let mut header = self.header();
        check_element(element, header.stride)?;
        self.reserve_one(&mut header)?;
        let start = slot_offset(header.length, header.stride);
        self.block.as_bytes_mut()[start..start + element.len()].copy_from_slice(element);
        header.length += 1;
        self.set_header(&header);
        Ok(())
    }

    /// Overwrite the element at `index`.
    ///
    /// `index == length` appends instead. Indices past `length` are
    /// rejected even when they fall inside the reserved capacity.
    pub fn set_at(&mut self, index: u32, element: &[u8]) -> Result<(), VecError> {
        let length = self.length();
        if index == length {
            return self.append(element);
        }
        check_element(element, self.stride())?;
        self.at_mut(index)?.copy_from_slice(element);
        Ok(())
    }

    /// Insert `element` at `index`, shifting `[index, length)` one slot right.
    ///
    /// Grows first when full, exactly like [`append`](Self::append).
    pub fn insert_at(&mut self, index: u32, element: &[u8]) -> Result<(), VecError> {
        let mut header = self.header();
        if index > header.length {
            return Err(VecError::IndexOutOfBounds {
                index,
                length: header.length,
            });
        }
        check_element(element, header.stride)?;
        self.reserve_one(&mut header)?;

        let stride = header.stride as usize;
        let at = slot_offset(index, header.stride);
        let end = slot_offset(header.length, header.stride);
        let bytes = self.block.as_bytes_mut();
        bytes.copy_within(at..end, at + stride);
        bytes[at..at + stride].copy_from_slice(element);
        header.length += 1;
        self.set_header(&header);
        Ok(())
    }

    /// Remove the last element, copying it into `out`.
    ///
    /// `out` must be exactly `stride` bytes.
    pub fn drop_last(&mut self, out: &mut [u8]) -> Result<(), VecError> {
        let mut header = self.header();
        if out.len() != header.stride as usize {
            return Err(VecError::InvalidResult {
                expected: header.stride as usize,
                actual: out.len(),
            });
        }
        if header.length == 0 {
            return Err(VecError::Empty);
        }
        header.length -= 1;
        let start = slot_offset(header.length, header.stride);
        out.copy_from_slice(&self.block.as_bytes()[start..start + out.len()]);
        self.set_header(&header);
        Ok(())
    }

    /// Build a new vector of `new_stride`-byte elements from this one.
    ///
    /// `f(src, dst)` converts each element in index order into a zeroed
    /// `new_stride`-byte slot. The result uses the same allocator and
    /// capacity; `self` is not modified.
    pub fn map<F>(&self, new_stride: u32, mut f: F) -> Result<RawVector<'a, A>, VecError>
    where
        F: FnMut(&[u8], &mut [u8]),
    {
        let header = self.header();
        let mut out = RawVector::new(
            self.alloc,
            VectorParams::new(new_stride).with_capacity(header.capacity),
        )?;
        let mut slot: SmallVec<[u8; INLINE_ELEMENT_BYTES]> = smallvec![0; new_stride as usize];
        for element in self.iter() {
            slot.fill(0);
            f(element, slot.as_mut_slice());
            out.append(slot.as_slice())?;
        }
        Ok(out)
    }

    /// Re-encode every element in place at a new width.
    ///
    /// Capacity (in elements) is kept. When the wider elements no longer
    /// fit the block it is resized first, preserving existing bytes. On
    /// error the vector is unchanged.
    pub fn map_in_place<F>(&mut self, new_stride: u32, f: F) -> Result<Direction, VecError>
    where
        F: FnMut(&[u8], &mut [u8]),
    {
        if new_stride == 0 {
            return Err(VecError::InvalidStride);
        }
        let mut header = self.header();
        let needed = block_size(header.capacity, new_stride)?;
        if needed > self.block.len() {
            self.alloc.resize(&mut self.block, needed)?;
        }

        let data = &mut self.block.as_bytes_mut()[HEADER_BYTES..];
        let direction = transcode::transcode_in_place(
            data,
            header.length as usize,
            header.stride as usize,
            new_stride as usize,
            f,
        )?;
        tracing::debug!(
            old_stride = header.stride,
            new_stride,
            length = header.length,
            ?direction,
            "vector stride migrated"
        );
        header.stride = new_stride;
        self.set_header(&header);
        Ok(direction)
    }

    /// Return the storage to the allocator.
    ///
    /// For strategies without `free` (arenas) this is a no-op; the space is
    /// reclaimed when the arena resets.
    pub fn release(mut self) -> Result<(), VecError> {
        let block = std::mem::replace(&mut self.block, Block::empty());
        release_block(self.alloc, block)
    }

    /// Ensure there is room for one more element, doubling capacity if not.
    fn reserve_one(&mut self, header: &mut VectorHeader) -> Result<(), VecError> {
        if header.length < header.capacity {
            return Ok(());
        }
        let new_capacity = header
            .capacity
            .checked_mul(VectorParams::GROWTH_FACTOR)
            .ok_or(VecError::CapacityOverflow {
                capacity: header.capacity,
                stride: header.stride,
            })?;
        let needed = block_size(new_capacity, header.stride)?;
        if needed > self.block.len() {
            self.alloc.resize(&mut self.block, needed)?;
        }
        tracing::debug!(
            old_capacity = header.capacity,
            new_capacity,
            stride = header.stride,
            "vector grown"
        );
        header.capacity = new_capacity;
        self.set_header(header);
        Ok(())
    }
}

impl<A: Allocator + ?Sized> Drop for RawVector<'_, A> {
    fn drop(&mut self) {
        let block = std::mem::replace(&mut self.block, Block::empty());
        if let Err(e) = release_block(self.alloc, block) {
            tracing::warn!(error = %e, "vector storage not released");
        }
    }
}

impl<A: Allocator + ?Sized> fmt::Debug for RawVector<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        f.debug_struct("RawVector")
            .field("length", &header.length)
            .field("capacity", &header.capacity)
            .field("stride", &header.stride)
            .field("strategy", &self.alloc.strategy())
            .finish()
    }
}

fn release_block<'a, A: Allocator + ?Sized>(alloc: &'a A, block: Block<'a>) -> Result<(), VecError> {
    if block.is_empty() || !alloc.capabilities().free {
        return Ok(());
    }
    alloc.free(block)?;
    Ok(())
}

fn block_size(capacity: u32, stride: u32) -> Result<usize, VecError> {
    (capacity as usize)
        .checked_mul(stride as usize)
        .and_then(|bytes| bytes.checked_add(HEADER_BYTES))
        .ok_or(VecError::CapacityOverflow { capacity, stride })
}

fn slot_offset(index: u32, stride: u32) -> usize {
    HEADER_BYTES + index as usize * stride as usize
}

fn check_index(index: u32, length: u32) -> Result<(), VecError> {
    if index >= length {
        return Err(VecError::IndexOutOfBounds { index, length });
    }
    Ok(())
}

fn check_element(element: &[u8], stride: u32) -> Result<(), VecError> {
    if element.len() != stride as usize {
        return Err(VecError::ElementSize {
            expected: stride,
            actual: element.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_alloc::{HeapAllocator, StackAllocator};

    fn u32_at<A: Allocator + ?Sized>(v: &RawVector<'_, A>, i: u32) -> u32 {
        u32::from_ne_bytes(v.at(i).unwrap().try_into().unwrap())
    }

    #[test]
    fn new_vector_is_empty_with_default_capacity() {
        let heap = HeapAllocator::new();
        let v = RawVector::with_stride(&heap, 4).unwrap();
        assert_eq!(v.length(), 0);
        assert_eq!(v.capacity(), 512);
        assert_eq!(v.stride(), 4);
        assert_eq!(v.block_len(), HEADER_BYTES + 512 * 4);
        assert_eq!(v.params(), VectorParams::new(4).with_capacity(512));
        assert!(v.is_empty());
    }

    #[test]
    fn zero_stride_is_rejected() {
        let heap = HeapAllocator::new();
        let err = RawVector::new(&heap, VectorParams::new(0)).unwrap_err();
        assert_eq!(err, VecError::InvalidStride);
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn append_grows_by_doubling() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::new(&heap, VectorParams::new(4).with_capacity(4)).unwrap();
        for i in 0u32..4 {
            v.append(&i.to_ne_bytes()).unwrap();
        }
        assert_eq!(v.capacity(), 4);
        v.append(&4u32.to_ne_bytes()).unwrap();
        assert_eq!(v.capacity(), 8);
        assert_eq!(v.length(), 5);
        assert_eq!(u32_at(&v, 4), 4);
        for i in 0u32..5 {
            assert_eq!(u32_at(&v, i), i);
        }
    }

    #[test]
    fn append_rejects_wrong_width() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 4).unwrap();
        assert_eq!(
            v.append(&[1, 2]),
            Err(VecError::ElementSize {
                expected: 4,
                actual: 2
            })
        );
        assert!(v.is_empty());
    }

    #[test]
    fn at_past_length_is_out_of_bounds() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 1).unwrap();
        v.append(&[7]).unwrap();
        assert_eq!(v.at(0).unwrap(), &[7]);
        assert_eq!(
            v.at(1),
            Err(VecError::IndexOutOfBounds {
                index: 1,
                length: 1
            })
        );
    }

    #[test]
    fn set_at_overwrites_or_appends() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 2).unwrap();
        v.append(&[1, 1]).unwrap();
        v.set_at(0, &[2, 2]).unwrap();
        assert_eq!(v.length(), 1);
        v.set_at(1, &[3, 3]).unwrap();
        assert_eq!(v.length(), 2);
        assert_eq!(v.as_bytes(), &[2, 2, 3, 3]);
        assert!(matches!(
            v.set_at(5, &[0, 0]),
            Err(VecError::IndexOutOfBounds { index: 5, .. })
        ));
    }

    #[test]
    fn insert_at_shifts_tail() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 1).unwrap();
        for b in [1u8, 2, 4, 5] {
            v.append(&[b]).unwrap();
        }
        v.insert_at(2, &[3]).unwrap();
        v.insert_at(0, &[0]).unwrap();
        v.insert_at(6, &[6]).unwrap();
        assert_eq!(v.as_bytes(), &[0, 1, 2, 3, 4, 5, 6]);
        assert!(v.insert_at(8, &[9]).is_err());
    }

    #[test]
    fn insert_at_grows_when_full() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::new(&heap, VectorParams::new(1).with_capacity(2)).unwrap();
        v.append(&[1]).unwrap();
        v.append(&[3]).unwrap();
        v.insert_at(1, &[2]).unwrap();
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn drop_last_returns_elements_in_reverse() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 4).unwrap();
        v.append(&10u32.to_ne_bytes()).unwrap();
        v.append(&20u32.to_ne_bytes()).unwrap();
        let mut out = [0u8; 4];
        v.drop_last(&mut out).unwrap();
        assert_eq!(u32::from_ne_bytes(out), 20);
        v.drop_last(&mut out).unwrap();
        assert_eq!(u32::from_ne_bytes(out), 10);
        assert_eq!(v.drop_last(&mut out), Err(VecError::Empty));
    }

    #[test]
    fn drop_last_checks_output_width() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 4).unwrap();
        v.append(&[0; 4]).unwrap();
        let mut out = [0u8; 2];
        assert_eq!(
            v.drop_last(&mut out),
            Err(VecError::InvalidResult {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(v.length(), 1);
    }

    #[test]
    fn map_leaves_source_untouched() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::new(&heap, VectorParams::new(1).with_capacity(3)).unwrap();
        for b in [1u8, 2, 3] {
            v.append(&[b]).unwrap();
        }
        let before = v.header();
        let mapped = v
            .map(4, |src, dst| {
                dst.copy_from_slice(&(u32::from(src[0]) * 1000).to_ne_bytes())
            })
            .unwrap();
        assert_eq!(v.header(), before);
        assert_eq!(v.as_bytes(), &[1, 2, 3]);
        assert_eq!(mapped.stride(), 4);
        assert_eq!(mapped.capacity(), 3);
        assert_eq!(mapped.length(), 3);
        assert_eq!(u32_at(&mapped, 2), 3000);
    }

    #[test]
    fn map_in_place_widens_and_narrows() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::new(&heap, VectorParams::new(4).with_capacity(4)).unwrap();
        for i in 0u32..4 {
            v.append(&i.to_ne_bytes()).unwrap();
        }
        let dir = v
            .map_in_place(16, |src, dst| {
                let x = u32::from_ne_bytes(src.try_into().unwrap());
                for chunk in dst.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&(x + 1).to_ne_bytes());
                }
            })
            .unwrap();
        assert_eq!(dir, Direction::BackToFront);
        assert_eq!(v.stride(), 16);
        assert_eq!(v.capacity(), 4);
        assert!(v.block_len() >= HEADER_BYTES + 4 * 16);

        let dir = v
            .map_in_place(4, |src, dst| {
                let x = u32::from_ne_bytes(src[12..16].try_into().unwrap());
                dst.copy_from_slice(&(x * 2).to_ne_bytes());
            })
            .unwrap();
        assert_eq!(dir, Direction::FrontToBack);
        assert_eq!(v.stride(), 4);
        for i in 0u32..4 {
            assert_eq!(u32_at(&v, i), (i + 1) * 2);
        }
    }

    #[test]
    fn map_in_place_rejects_zero_stride() {
        let heap = HeapAllocator::new();
        let mut v = RawVector::with_stride(&heap, 4).unwrap();
        v.append(&[1; 4]).unwrap();
        assert_eq!(v.map_in_place(0, |_, _| {}), Err(VecError::InvalidStride));
        assert_eq!(v.stride(), 4);
    }

    #[test]
    fn release_returns_block_to_heap() {
        let heap = HeapAllocator::new();
        let v = RawVector::with_stride(&heap, 8).unwrap();
        assert_eq!(heap.live_blocks(), 1);
        v.release().unwrap();
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn drop_returns_block_to_heap() {
        let heap = HeapAllocator::new();
        {
            let mut v = RawVector::with_stride(&heap, 8).unwrap();
            v.append(&[0; 8]).unwrap();
        }
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn arena_vector_grows_by_relocation() {
        let mut buf = vec![0u8; 1024];
        let arena = StackAllocator::new(&mut buf);
        let mut v = RawVector::new(&arena, VectorParams::new(4).with_capacity(2)).unwrap();
        assert_eq!(arena.used(), HEADER_BYTES + 8);
        for i in 0u32..3 {
            v.append(&i.to_ne_bytes()).unwrap();
        }
        assert_eq!(v.capacity(), 4);
        // Original block abandoned, new one holds header + 4 slots.
        assert_eq!(arena.used(), (HEADER_BYTES + 8) + (HEADER_BYTES + 16));
        for i in 0u32..3 {
            assert_eq!(u32_at(&v, i), i);
        }
        v.release().unwrap();
    }

    #[test]
    fn arena_exhaustion_surfaces_as_error() {
        let mut buf = vec![0u8; HEADER_BYTES + 8];
        let arena = StackAllocator::new(&mut buf);
        let mut v = RawVector::new(&arena, VectorParams::new(4).with_capacity(2)).unwrap();
        v.append(&[1; 4]).unwrap();
        v.append(&[2; 4]).unwrap();
        let err = v.append(&[3; 4]).unwrap_err();
        assert!(matches!(
            err,
            VecError::Alloc(tessel_alloc::AllocError::OutOfSpace { .. })
        ));
        assert_eq!(v.length(), 2);
        assert_eq!(v.capacity(), 2);
        assert_eq!(v.as_bytes(), &[1, 1, 1, 1, 2, 2, 2, 2]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn capacity_is_smallest_doubling_covering_length(
                initial in 1u32..16,
                count in 0u32..200,
            ) {
                let heap = HeapAllocator::new();
                let mut v = RawVector::new(&heap, VectorParams::new(4).with_capacity(initial)).unwrap();
                for i in 0..count {
                    v.append(&i.to_ne_bytes()).unwrap();
                }
                let mut expected = initial;
                while expected < count {
                    expected *= 2;
                }
                prop_assert_eq!(v.length(), count);
                prop_assert_eq!(v.capacity(), expected);
            }

            #[test]
            fn insert_splices_element(
                values in proptest::collection::vec(any::<u8>(), 0..40),
                at in any::<proptest::sample::Index>(),
                element in any::<u8>(),
            ) {
                let heap = HeapAllocator::new();
                let mut v = RawVector::new(&heap, VectorParams::new(1).with_capacity(1)).unwrap();
                for b in &values {
                    v.append(&[*b]).unwrap();
                }
                let index = at.index(values.len() + 1);
                v.insert_at(index as u32, &[element]).unwrap();

                let mut expected = values.clone();
                expected.insert(index, element);
                prop_assert_eq!(v.as_bytes(), expected.as_slice());
            }
        }
    }
}
