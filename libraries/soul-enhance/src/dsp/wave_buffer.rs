//! Interleaved delay/scratch FIFO
//!
//! Used to hold one branch of a split signal back by a fixed number of frames
//! while another branch runs at zero latency. The writer appends a zeroed
//! region and fills it in place, the reader consumes frames from the front.
//!
//! Storage is a circular buffer with an explicit logical length, so popping
//! from the front is O(1). Capacity grows on demand (doubling) and only
//! shrinks through `release`.

use std::ops::{Index, IndexMut};

/// Circular FIFO of interleaved samples
#[derive(Debug, Clone)]
pub struct WaveBuffer {
    data: Vec<f32>,
    /// Physical index of the logical front sample
    head: usize,
    /// Number of buffered samples (not frames)
    len: usize,
    channels: usize,
}

impl WaveBuffer {
    /// Create an empty buffer with room for `capacity_frames` frames
    pub fn new(channels: usize, capacity_frames: usize) -> Self {
        let channels = channels.max(1);
        Self {
            data: vec![0.0; channels * capacity_frames],
            head: 0,
            len: 0,
            channels,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Buffered frames
    pub fn len_frames(&self) -> usize {
        self.len / self.channels
    }

    /// Buffered samples
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated frames
    pub fn capacity_frames(&self) -> usize {
        self.data.len() / self.channels
    }

    /// Drop all buffered frames; capacity is kept
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Make sure `frames` more frames fit without reallocating inside `process`
    pub fn reserve_frames(&mut self, frames: usize) {
        self.ensure_capacity(self.len + frames * self.channels);
    }

    /// Append `frames` frames of silence
    pub fn push_zeros(&mut self, frames: usize) {
        self.push_zeros_region(frames);
    }

    /// Append `frames` frames of silence and return the appended region as a
    /// write target
    pub fn push_zeros_region(&mut self, frames: usize) -> RegionMut<'_> {
        let start = self.len;
        let count = frames * self.channels;
        if count > 0 {
            self.ensure_capacity(self.len + count);
            let capacity = self.data.len();
            for offset in 0..count {
                let physical = (self.head + start + offset) % capacity;
                self.data[physical] = 0.0;
            }
            self.len += count;
        }
        RegionMut {
            head: (self.head + start) % self.data.len().max(1),
            len: count,
            data: &mut self.data,
        }
    }

    /// Remove `frames` frames from the front.
    ///
    /// Popping more than is buffered does nothing.
    pub fn pop_frames(&mut self, frames: usize) {
        let count = frames * self.channels;
        if count > self.len {
            return;
        }
        self.len -= count;
        if self.len == 0 {
            self.head = 0;
        } else {
            self.head = (self.head + count) % self.data.len();
        }
    }

    /// Sample at logical position `index` counted from the front
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        if index < self.len {
            Some(self.data[(self.head + index) % self.data.len()])
        } else {
            None
        }
    }

    /// Copy the buffered samples, front first
    pub fn to_vec(&self) -> Vec<f32> {
        (0..self.len)
            .map(|i| self.data[(self.head + i) % self.data.len()])
            .collect()
    }

    fn ensure_capacity(&mut self, required: usize) {
        let capacity = self.data.len();
        if required <= capacity {
            return;
        }
        let new_capacity = required.max(capacity * 2).next_power_of_two();
        let mut data = vec![0.0; new_capacity];
        for (i, slot) in data.iter_mut().take(self.len).enumerate() {
            *slot = self.data[(self.head + i) % capacity];
        }
        self.data = data;
        self.head = 0;
    }
}

impl Index<usize> for WaveBuffer {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        assert!(index < self.len, "WaveBuffer index {} out of range", index);
        &self.data[(self.head + index) % self.data.len()]
    }
}

/// Mutable view of a region appended by `WaveBuffer::push_zeros_region`
///
/// Indices are relative to the start of the region and may wrap around the
/// end of the backing storage.
pub struct RegionMut<'a> {
    data: &'a mut [f32],
    head: usize,
    len: usize,
}

impl RegionMut<'_> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        assert!(index < self.len, "region index {} out of range", index);
        (self.head + index) % self.data.len()
    }
}

impl Index<usize> for RegionMut<'_> {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.data[self.physical(index)]
    }
}

impl IndexMut<usize> for RegionMut<'_> {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        let physical = self.physical(index);
        &mut self.data[physical]
    }
}
