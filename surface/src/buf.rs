// Distributed under The MIT License (MIT)
//
// Copyright (c) 2024 The `image-rs` developers
//! The owned allocation of an image.
//!
//! This is the only module allowed to be `unsafe`, for the `Pod` marker of the aligned chunk.
#![allow(unsafe_code)]
use core::mem;
use core::sync::atomic::{AtomicU64, Ordering};

const MAX_ALIGN: usize = 16;

/// A chunk of bytes aligned for the widest texel, four 32-bit floats.
#[derive(Clone, Copy)]
#[repr(C, align(16))]
pub(crate) struct MaxAligned([u8; MAX_ALIGN]);

unsafe impl bytemuck::Zeroable for MaxAligned {}
unsafe impl bytemuck::Pod for MaxAligned {}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Allocates and owns the bytes of one image.
///
/// The bytes are aligned to the largest alignment any texel type may require, so that typed views
/// of whole buffers never fail for alignment reasons. Each allocation is tagged with a generation
/// that is unique within the process, buffer descriptors record it to detect their use with a
/// different allocation.
pub(crate) struct Store {
    inner: Vec<MaxAligned>,
    len: usize,
    generation: u64,
}

impl Store {
    const ELEMENT: MaxAligned = MaxAligned([0; MAX_ALIGN]);

    /// Allocate zeroed bytes.
    pub(crate) fn new(len: usize) -> Self {
        let inner = vec![Self::ELEMENT; Self::alloc_len(len)];
        Store {
            inner,
            len,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Allocate with a copy of some bytes.
    pub(crate) fn from_bytes(content: &[u8]) -> Self {
        let mut store = Store::new(content.len());
        store.as_bytes_mut().copy_from_slice(content);
        store
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<_, u8>(&self.inner)[..self.len]
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<_, u8>(&mut self.inner)[..self.len]
    }

    /// Calculates the number of elements to have a byte buffer of requested length.
    fn alloc_len(length: usize) -> usize {
        const CHUNK_SIZE: usize = mem::size_of::<MaxAligned>();
        const _: () = assert!(CHUNK_SIZE == MAX_ALIGN);
        length.div_ceil(CHUNK_SIZE)
    }
}

impl Clone for Store {
    /// A deep copy, which is a new allocation and so gets a fresh generation.
    fn clone(&self) -> Self {
        Store::from_bytes(self.as_bytes())
    }
}
