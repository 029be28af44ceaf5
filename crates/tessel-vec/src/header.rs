//! The in-block vector header.

use bytemuck::{Pod, Zeroable};

/// Bytes reserved for the header at the start of every vector block.
///
/// Twelve bytes are used; the rest pads element storage to a 16-byte
/// offset so that heap-backed storage is aligned for common element types.
pub const HEADER_BYTES: usize = std::mem::size_of::<VectorHeader>();

/// Bookkeeping stored in front of a vector's elements.
///
/// Read and written unaligned: arena blocks carry no alignment guarantee.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct VectorHeader {
    /// Number of live elements. Always `<= capacity`.
    pub length: u32,
    /// Number of element slots reserved.
    pub capacity: u32,
    /// Width of one element in bytes. Always non-zero.
    pub stride: u32,
    reserved: u32,
}

impl VectorHeader {
    /// An empty vector's header.
    pub fn new(capacity: u32, stride: u32) -> Self {
        Self {
            length: 0,
            capacity,
            stride,
            reserved: 0,
        }
    }

    /// Decode from the first [`HEADER_BYTES`] of `bytes`.
    pub(crate) fn read(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..HEADER_BYTES])
    }

    /// Encode into the first [`HEADER_BYTES`] of `bytes`.
    pub(crate) fn write(&self, bytes: &mut [u8]) {
        bytes[..HEADER_BYTES].copy_from_slice(bytemuck::bytes_of(self));
    }

    /// Bytes of element storage the header describes.
    pub fn storage_bytes(&self) -> usize {
        self.capacity as usize * self.stride as usize
    }

    /// Bytes occupied by live elements.
    pub fn live_bytes(&self) -> usize {
        self.length as usize * self.stride as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_sixteen_bytes() {
        assert_eq!(HEADER_BYTES, 16);
    }

    #[test]
    fn header_survives_unaligned_storage() {
        let mut bytes = [0u8; HEADER_BYTES + 1];
        let mut h = VectorHeader::new(8, 12);
        h.length = 3;
        h.write(&mut bytes[1..]);
        assert_eq!(VectorHeader::read(&bytes[1..]), h);
        assert_eq!(h.storage_bytes(), 96);
        assert_eq!(h.live_bytes(), 36);
    }
}
