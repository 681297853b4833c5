//! Storage abstraction over fixed-width word arrays.
//!
//! The same logical array (dictionary bytes, parse ranks, occurrence
//! counts, suffix/BWT arrays, ...) is sometimes convenient to keep fully
//! in heap memory and sometimes better memory-mapped straight off disk
//! for files too large to comfortably materialize. Both backends
//! implement the same read trait so the rest of the crate is agnostic to
//! which one backs a given array, mirroring the split between
//! `MMapFile`/`VecFileSource` in the original tool.
use std::fs::{File, OpenOptions};
use std::io;
use std::marker::PhantomData;
use std::mem::size_of;
use std::path::Path;

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::error::{PfbwtError, Result};

/// Read-only access to a fixed-width array of `T`.
pub trait WordArray<T: Copy> {
    fn get(&self, i: u64) -> T;
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`WordArray`] whose elements can also be written in place.
pub trait WritableWordArray<T: Copy>: WordArray<T> {
    fn set(&mut self, i: u64, v: T);
}

/// Heap-backed array. The default for dictionaries and other structures
/// small enough to fit comfortably in memory, or that are built
/// incrementally (e.g. `Vec::push` while parsing).
#[derive(Clone, Debug)]
pub struct HeapArray<T> {
    data: Vec<T>,
}

impl<T: Copy> HeapArray<T> {
    pub fn new(data: Vec<T>) -> Self {
        HeapArray { data }
    }

    pub fn with_len(len: usize, fill: T) -> Self {
        HeapArray {
            data: vec![fill; len],
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn push(&mut self, v: T) {
        self.data.push(v);
    }
}

impl<T: Copy> WordArray<T> for HeapArray<T> {
    fn get(&self, i: u64) -> T {
        self.data[i as usize]
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }
}

impl<T: Copy> WritableWordArray<T> for HeapArray<T> {
    fn set(&mut self, i: u64, v: T) {
        self.data[i as usize] = v;
    }
}

impl<T: Copy> From<Vec<T>> for HeapArray<T> {
    fn from(data: Vec<T>) -> Self {
        HeapArray { data }
    }
}

/// Read-only, memory-mapped array of `T`, loaded straight from a file
/// whose byte length must be an exact multiple of `size_of::<T>()`.
///
/// `T` must be safely readable from an arbitrary byte pattern (plain old
/// data): `u8`, `u32`, `u64`, and the crate's own packed marker/rank
/// types all qualify. This is the Rust analogue of `MMapFileSource`.
pub struct MmapArray<T> {
    mmap: Mmap,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy> MmapArray<T> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let byte_len = file.metadata()?.len() as usize;
        if byte_len == 0 {
            return Err(PfbwtError::Io(format!(
                "{}: file is empty",
                path.display()
            )));
        }
        if byte_len % size_of::<T>() != 0 {
            return Err(PfbwtError::Io(format!(
                "{}: file size {} is not a multiple of element size {}",
                path.display(),
                byte_len,
                size_of::<T>()
            )));
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(MmapArray {
            mmap,
            len: byte_len / size_of::<T>(),
            _marker: PhantomData,
        })
    }

    fn as_ptr(&self) -> *const T {
        self.mmap.as_ptr() as *const T
    }
}

impl<T: Copy> WordArray<T> for MmapArray<T> {
    fn get(&self, i: u64) -> T {
        assert!(i < self.len as u64, "index out of bounds");
        unsafe { *self.as_ptr().add(i as usize) }
    }

    fn len(&self) -> u64 {
        self.len as u64
    }
}

/// Writable, memory-mapped array of `T`, backing files opened fresh
/// (truncated and sized up-front via [`MmapArrayMut::create`]) the way
/// the original tool's `MMapFile::init_file` does.
pub struct MmapArrayMut<T> {
    mmap: MmapMut,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Copy> MmapArrayMut<T> {
    /// Create (or truncate) `path` to hold exactly `len` elements of `T`,
    /// zero-filled, and map it read-write.
    pub fn create(path: impl AsRef<Path>, len: usize) -> Result<Self> {
        let byte_len = len * size_of::<T>();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(byte_len as u64)?;
        let mmap = unsafe { MmapOptions::new().len(byte_len.max(1)).map_mut(&file)? };
        Ok(MmapArrayMut {
            mmap,
            len,
            _marker: PhantomData,
        })
    }

    fn as_ptr(&self) -> *const T {
        self.mmap.as_ptr() as *const T
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.mmap.as_mut_ptr() as *mut T
    }

    pub fn flush(&self) -> io::Result<()> {
        self.mmap.flush()
    }
}

impl<T: Copy> WordArray<T> for MmapArrayMut<T> {
    fn get(&self, i: u64) -> T {
        assert!(i < self.len as u64, "index out of bounds");
        unsafe { *self.as_ptr().add(i as usize) }
    }

    fn len(&self) -> u64 {
        self.len as u64
    }
}

impl<T: Copy> WritableWordArray<T> for MmapArrayMut<T> {
    fn set(&mut self, i: u64, v: T) {
        assert!(i < self.len as u64, "index out of bounds");
        unsafe {
            *self.as_mut_ptr().add(i as usize) = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_array_basic() {
        let mut a = HeapArray::with_len(4, 0u32);
        a.set(0, 10);
        a.set(3, 99);
        assert_eq!(a.get(0), 10);
        assert_eq!(a.get(3), 99);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn mmap_array_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        {
            let mut w = MmapArrayMut::<u64>::create(&path, 5).unwrap();
            for i in 0..5u64 {
                w.set(i, i * i);
            }
            w.flush().unwrap();
        }
        let r = MmapArray::<u64>::open(&path).unwrap();
        assert_eq!(r.len(), 5);
        for i in 0..5u64 {
            assert_eq!(r.get(i), i * i);
        }
    }

    #[test]
    fn mmap_array_rejects_misaligned_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bin");
        std::fs::write(&path, [0u8; 3]).unwrap();
        assert!(MmapArray::<u64>::open(&path).is_err());
    }
}
