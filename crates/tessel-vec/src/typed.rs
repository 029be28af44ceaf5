//! Typed vectors over plain-old-data elements.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::Pod;
use tessel_alloc::Allocator;

use crate::config::VectorParams;
use crate::error::VecError;
use crate::raw::RawVector;
use crate::transcode::Direction;

/// A growable vector of `T`, stored in a [`RawVector`] with
/// `stride == size_of::<T>()`.
///
/// Elements are copied in and out by value, so the backing block needs no
/// particular alignment (arena blocks have none).
pub struct Vector<'a, T, A: Allocator + ?Sized> {
    raw: RawVector<'a, A>,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod, A: Allocator + ?Sized> Vector<'a, T, A> {
    /// Create an empty vector with the default capacity.
    pub fn new(alloc: &'a A) -> Result<Self, VecError> {
        Self::with_capacity(alloc, 0)
    }

    /// Create an empty vector with room for `capacity` elements
    /// (`0` selects the default).
    pub fn with_capacity(alloc: &'a A, capacity: u32) -> Result<Self, VecError> {
        let params = VectorParams::new(stride_of::<T>()?).with_capacity(capacity);
        Ok(Self {
            raw: RawVector::new(alloc, params)?,
            _marker: PhantomData,
        })
    }

    /// Adopt a raw vector whose stride matches `T`.
    pub fn from_raw(raw: RawVector<'a, A>) -> Result<Self, VecError> {
        let stride = stride_of::<T>()?;
        if raw.stride() != stride {
            return Err(VecError::ElementSize {
                expected: raw.stride(),
                actual: stride as usize,
            });
        }
        Ok(Self {
            raw,
            _marker: PhantomData,
        })
    }

    /// Give up the element type.
    pub fn into_raw(self) -> RawVector<'a, A> {
        self.raw
    }

    /// The underlying type-erased vector.
    pub fn raw(&self) -> &RawVector<'a, A> {
        &self.raw
    }

    /// Number of live elements.
    pub fn len(&self) -> u32 {
        self.raw.length()
    }

    /// Whether the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of element slots reserved.
    pub fn capacity(&self) -> u32 {
        self.raw.capacity()
    }

    /// Append `value`, growing if full.
    pub fn push(&mut self, value: T) -> Result<(), VecError> {
        self.raw.append(bytemuck::bytes_of(&value))
    }

    /// Copy of the element at `index`.
    pub fn get(&self, index: u32) -> Result<T, VecError> {
        Ok(bytemuck::pod_read_unaligned(self.raw.at(index)?))
    }

    /// Overwrite the element at `index`; `index == len` appends.
    pub fn set(&mut self, index: u32, value: T) -> Result<(), VecError> {
        self.raw.set_at(index, bytemuck::bytes_of(&value))
    }

    /// Insert `value` at `index`, shifting later elements right.
    pub fn insert(&mut self, index: u32, value: T) -> Result<(), VecError> {
        self.raw.insert_at(index, bytemuck::bytes_of(&value))
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Result<T, VecError> {
        let mut out = T::zeroed();
        self.raw.drop_last(bytemuck::bytes_of_mut(&mut out))?;
        Ok(out)
    }

    /// Iterate over copies of the live elements.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.raw.iter().map(bytemuck::pod_read_unaligned)
    }

    /// Borrow the elements as `&[T]`, if the storage happens to be aligned
    /// for `T`.
    pub fn as_slice(&self) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.raw.as_bytes()).ok()
    }

    /// Build a new vector by applying `f` to each element in index order.
    ///
    /// `self` is not modified. The result has the same capacity and
    /// allocator.
    pub fn map<U, F>(&self, mut f: F) -> Result<Vector<'a, U, A>, VecError>
    where
        U: Pod,
        F: FnMut(T) -> U,
    {
        let raw = self.raw.map(stride_of::<U>()?, |src, dst| {
            let mapped = f(bytemuck::pod_read_unaligned(src));
            dst.copy_from_slice(bytemuck::bytes_of(&mapped));
        })?;
        Vector::from_raw(raw)
    }

    /// Convert every element to `U` in place, reusing the storage.
    ///
    /// Consumes `self`: the storage is reinterpreted as `U` and may have
    /// been relocated. On error the storage is released.
    pub fn map_in_place<U, F>(self, f: F) -> Result<Vector<'a, U, A>, VecError>
    where
        U: Pod,
        F: FnMut(T) -> U,
    {
        self.map_in_place_with_direction(f).map(|(v, _)| v)
    }

    /// [`map_in_place`](Self::map_in_place), also reporting the migration
    /// order that was used.
    pub fn map_in_place_with_direction<U, F>(
        self,
        mut f: F,
    ) -> Result<(Vector<'a, U, A>, Direction), VecError>
    where
        U: Pod,
        F: FnMut(T) -> U,
    {
        let mut raw = self.raw;
        let direction = raw.map_in_place(stride_of::<U>()?, |src, dst| {
            let mapped = f(bytemuck::pod_read_unaligned(src));
            dst.copy_from_slice(bytemuck::bytes_of(&mapped));
        })?;
        Ok((Vector::from_raw(raw)?, direction))
    }

    /// Return the storage to the allocator.
    pub fn release(self) -> Result<(), VecError> {
        self.raw.release()
    }
}

impl<T: Pod + fmt::Debug, A: Allocator + ?Sized> fmt::Debug for Vector<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

fn stride_of<T>() -> Result<u32, VecError> {
    match u32::try_from(std::mem::size_of::<T>()) {
        Ok(0) | Err(_) => Err(VecError::InvalidStride),
        Ok(stride) => Ok(stride),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;
    use tessel_alloc::{HeapAllocator, StackAllocator};

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    struct Wide {
        a: u32,
        b: u32,
        c: f64,
    }

    #[test]
    fn push_get_pop() {
        let heap = HeapAllocator::new();
        let mut v: Vector<'_, u64, _> = Vector::with_capacity(&heap, 2).unwrap();
        for x in [10u64, 20, 30] {
            v.push(x).unwrap();
        }
        assert_eq!(v.len(), 3);
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.get(1).unwrap(), 20);
        assert_eq!(v.pop().unwrap(), 30);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![10, 20]);
    }

    #[test]
    fn zero_sized_elements_are_rejected() {
        let heap = HeapAllocator::new();
        let err = Vector::<'_, (), _>::new(&heap).unwrap_err();
        assert_eq!(err, VecError::InvalidStride);
    }

    #[test]
    fn insert_and_set() {
        let heap = HeapAllocator::new();
        let mut v: Vector<'_, u16, _> = Vector::with_capacity(&heap, 1).unwrap();
        v.push(1).unwrap();
        v.push(3).unwrap();
        v.insert(1, 2).unwrap();
        v.set(0, 0).unwrap();
        v.set(3, 4).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn heap_storage_is_castable_to_slice() {
        let heap = HeapAllocator::new();
        let mut v: Vector<'_, u32, _> = Vector::new(&heap).unwrap();
        v.push(5).unwrap();
        v.push(6).unwrap();
        assert_eq!(v.as_slice(), Some(&[5u32, 6][..]));
    }

    #[test]
    fn map_builds_new_vector_with_new_stride() {
        let heap = HeapAllocator::new();
        let mut v: Vector<'_, u32, _> = Vector::with_capacity(&heap, 4).unwrap();
        for x in 0..4 {
            v.push(x).unwrap();
        }
        let wide = v
            .map(|x| Wide {
                a: x,
                b: x,
                c: f64::from(x),
            })
            .unwrap();
        assert_eq!(v.raw().stride(), 4);
        assert_eq!(wide.raw().stride(), 16);
        assert_eq!(wide.capacity(), 4);
        assert_eq!(
            wide.get(3).unwrap(),
            Wide {
                a: 3,
                b: 3,
                c: 3.0
            }
        );
    }

    #[test]
    fn map_in_place_round_trip_on_arena() {
        let mut buf = vec![0u8; 4096];
        let arena = StackAllocator::new(&mut buf);
        let mut v: Vector<'_, u32, _> = Vector::with_capacity(&arena, 8).unwrap();
        for x in 0..8 {
            v.push(x).unwrap();
        }
        let (wide, dir) = v
            .map_in_place_with_direction(|x| Wide {
                a: x,
                b: x * 2,
                c: f64::from(x) / 2.0,
            })
            .unwrap();
        assert_eq!(dir, Direction::BackToFront);
        assert_eq!(wide.len(), 8);
        assert_eq!(wide.capacity(), 8);

        let (narrow, dir) = wide
            .map_in_place_with_direction(|w: Wide| w.b + 10)
            .unwrap();
        assert_eq!(dir, Direction::FrontToBack);
        assert_eq!(
            narrow.iter().collect::<Vec<u32>>(),
            (0..8).map(|x| x * 2 + 10).collect::<Vec<_>>()
        );
    }

    #[test]
    fn from_raw_checks_stride() {
        let heap = HeapAllocator::new();
        let raw = RawVector::with_stride(&heap, 3).unwrap();
        assert!(matches!(
            Vector::<'_, u32, _>::from_raw(raw),
            Err(VecError::ElementSize { .. })
        ));
    }

    #[test]
    fn debug_lists_elements() {
        let heap = HeapAllocator::new();
        let mut v: Vector<'_, u8, _> = Vector::new(&heap).unwrap();
        v.push(1).unwrap();
        v.push(2).unwrap();
        assert_eq!(format!("{v:?}"), "[1, 2]");
    }
}
