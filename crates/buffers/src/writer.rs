//! Binary buffer writer with auto-growing capacity.

/// A binary buffer writer that grows automatically as needed.
///
/// Bytes written since the last [`flush`](Writer::flush) (or
/// [`reset`](Writer::reset)) form the pending output. All multi-byte writes
/// are big-endian.
///
/// # Example
///
/// ```
/// use mpack_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// let data = writer.flush();
/// assert_eq!(data, [0x01, 0x02, 0x03]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Position where last flush happened.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    /// Allocation size when buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with default allocation size (64KB).
    pub fn new() -> Self {
        Self::with_alloc_size(64 * 1024)
    }

    /// Creates a new writer with custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        let alloc_size = alloc_size.max(16);
        Self {
            uint8: vec![0u8; alloc_size],
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Size of the current backing buffer.
    pub fn capacity(&self) -> usize {
        self.uint8.len()
    }

    /// Number of bytes written since the last flush.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    pub fn is_empty(&self) -> bool {
        self.x == self.x0
    }

    /// Ensures the buffer has at least `capacity` bytes available.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let total = self.uint8.len() - self.x0;
            let required = capacity - remaining;
            let total_required = total + required;
            let new_size = if total_required <= self.alloc_size {
                self.alloc_size
            } else {
                total_required * 2
            };
            self.grow(new_size);
        }
    }

    fn grow(&mut self, new_size: usize) {
        let x0 = self.x0;
        let x = self.x;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..x - x0].copy_from_slice(&self.uint8[x0..x]);
        self.uint8 = new_buf;
        self.x = x - x0;
        self.x0 = 0;
    }

    /// Discards pending output.
    pub fn reset(&mut self) {
        self.x = self.x0;
    }

    /// Returns the written data and advances the flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.ensure_capacity(2);
        self.uint8[self.x..self.x + 2].copy_from_slice(&val.to_be_bytes());
        self.x += 2;
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.ensure_capacity(4);
        self.uint8[self.x..self.x + 4].copy_from_slice(&val.to_be_bytes());
        self.x += 4;
    }

    /// Writes an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.ensure_capacity(8);
        self.uint8[self.x..self.x + 8].copy_from_slice(&val.to_be_bytes());
        self.x += 8;
    }

    /// Writes two bytes, typically a marker followed by a one-byte payload.
    pub fn u8u8(&mut self, marker: u8, val: u8) {
        self.ensure_capacity(2);
        self.uint8[self.x] = marker;
        self.uint8[self.x + 1] = val;
        self.x += 2;
    }

    /// Writes a u8 followed by a u16 (big-endian).
    pub fn u8u16(&mut self, u8_val: u8, u16_val: u16) {
        self.ensure_capacity(3);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 3].copy_from_slice(&u16_val.to_be_bytes());
        self.x += 3;
    }

    /// Writes a u8 followed by a u32 (big-endian).
    pub fn u8u32(&mut self, u8_val: u8, u32_val: u32) {
        self.ensure_capacity(5);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 5].copy_from_slice(&u32_val.to_be_bytes());
        self.x += 5;
    }

    /// Writes a u8 followed by a u64 (big-endian).
    pub fn u8u64(&mut self, u8_val: u8, u64_val: u64) {
        self.ensure_capacity(9);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 9].copy_from_slice(&u64_val.to_be_bytes());
        self.x += 9;
    }

    /// Writes a u8 followed by a f32 (big-endian).
    pub fn u8f32(&mut self, u8_val: u8, f32_val: f32) {
        self.ensure_capacity(5);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 5].copy_from_slice(&f32_val.to_be_bytes());
        self.x += 5;
    }

    /// Writes a u8 followed by a f64 (big-endian).
    pub fn u8f64(&mut self, u8_val: u8, f64_val: f64) {
        self.ensure_capacity(9);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 9].copy_from_slice(&f64_val.to_be_bytes());
        self.x += 9;
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_u16() {
        let mut writer = Writer::new();
        writer.u16(0x0102);
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_u64() {
        let mut writer = Writer::new();
        writer.u64(0x0102_0304_0506_0708);
        assert_eq!(writer.flush(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_marker_pairs() {
        let mut writer = Writer::new();
        writer.u8u8(0xcc, 0xff);
        writer.u8u16(0xdc, 0x0010);
        writer.u8u32(0xdd, 0x0001_0000);
        assert_eq!(
            writer.flush(),
            [0xcc, 0xff, 0xdc, 0x00, 0x10, 0xdd, 0x00, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn test_u8f64_is_big_endian() {
        let mut writer = Writer::new();
        writer.u8f64(0xcb, 1.0);
        assert_eq!(writer.flush(), [0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_flush_multiple() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        assert_eq!(writer.flush(), [0x01]);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x02]);
    }

    #[test]
    fn test_reset_discards_pending() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        writer.flush();
        writer.u16(0xffff);
        writer.reset();
        assert!(writer.is_empty());
        writer.u8(0x03);
        assert_eq!(writer.flush(), [0x03]);
    }

    #[test]
    fn test_grows_past_alloc_size() {
        let mut writer = Writer::with_alloc_size(16);
        assert_eq!(writer.capacity(), 16);
        let payload: Vec<u8> = (0..=255).collect();
        writer.u8(0xc5);
        writer.buf(&payload);
        writer.buf(&payload);
        assert_eq!(writer.len(), 513);
        let out = writer.flush();
        assert_eq!(out[0], 0xc5);
        assert_eq!(&out[1..257], payload.as_slice());
        assert_eq!(&out[257..], payload.as_slice());
    }
}
