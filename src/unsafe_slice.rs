// Copyright (c) Radzivon Bartoshyk. All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
// 1.  Redistributions of source code must retain the above copyright notice, this
// list of conditions and the following disclaimer.
//
// 2.  Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3.  Neither the name of the copyright holder nor the names of its
// contributors may be used to endorse or promote products derived from
// this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::cell::UnsafeCell;

/// Shared view over a mutable slice for workers writing disjoint lines.
///
/// Lines of an interleaved image are not contiguous in the vertical direction,
/// so splitting with `chunks_mut` does not work there.
#[derive(Copy, Clone, Debug)]
pub(crate) struct UnsafeSlice<'a, T> {
    slice: &'a [UnsafeCell<T>],
}

unsafe impl<T: Send + Sync> Send for UnsafeSlice<'_, T> {}

unsafe impl<T: Send + Sync> Sync for UnsafeSlice<'_, T> {}

impl<'a, T: Copy> UnsafeSlice<'a, T> {
    pub(crate) fn new(slice: &'a mut [T]) -> Self {
        let ptr = slice as *mut [T] as *const [UnsafeCell<T>];
        Self {
            slice: unsafe { &*ptr },
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slice.len()
    }

    /// SAFETY: It is UB if another thread writes the same index without
    /// synchronization.
    #[inline(always)]
    pub(crate) unsafe fn read(&self, i: usize) -> T {
        unsafe { *self.slice[i].get() }
    }

    /// SAFETY: It is UB if two threads access the same index without
    /// synchronization and one of them writes.
    #[inline(always)]
    pub(crate) unsafe fn write(&self, i: usize, value: T) {
        unsafe {
            *self.slice[i].get() = value;
        }
    }

    /// Raw pointer to `count` items starting at `offset`.
    ///
    /// Panics if the range is out of bounds.
    #[inline(always)]
    pub(crate) fn ptr_at(&self, offset: usize, count: usize) -> *mut T {
        let cells = &self.slice[offset..offset + count];
        UnsafeCell::raw_get(cells.as_ptr())
    }
}
