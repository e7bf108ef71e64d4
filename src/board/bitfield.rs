//! Fixed-width bit packing inside a `u32` store.
//!
//! Tiles and units keep many small fields in one scalar. Each field is a
//! [`BitMask`] handed out by a [`BitAllocator`]; the allocator walks a cursor
//! through the 32 available bits so masks from one allocator never overlap.
//! Layout tables are built in `const` context, so an over-full layout is a
//! compile error rather than a runtime surprise.

/// Width of the backing store in bits.
pub const STORE_BITS: u8 = 32;

/// A contiguous bit range `[shift, shift + width)` inside a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitMask {
    shift: u8,
    width: u8,
}

impl BitMask {
    /// Bit offset of the lowest bit in the range.
    #[must_use]
    pub const fn shift(self) -> u8 {
        self.shift
    }

    /// Number of bits in the range.
    #[must_use]
    pub const fn width(self) -> u8 {
        self.width
    }

    /// Mask of `width` low bits, before shifting.
    #[must_use]
    #[inline]
    pub const fn low_bits(self) -> u32 {
        if self.width == 0 {
            0
        } else {
            u32::MAX >> (STORE_BITS - self.width)
        }
    }

    /// Largest value the range can hold.
    #[must_use]
    pub const fn max_value(self) -> u32 {
        self.low_bits()
    }

    /// `(store >> shift) & ((1 << width) - 1)`.
    #[must_use]
    #[inline]
    pub const fn read(self, store: u32) -> u32 {
        (store >> self.shift) & self.low_bits()
    }

    /// Replace the range with `value`; bits of `value` beyond `width` are dropped.
    #[must_use]
    #[inline]
    pub const fn write(self, store: u32, value: u32) -> u32 {
        let field = self.low_bits() << self.shift;
        (store & !field) | ((value & self.low_bits()) << self.shift)
    }

    /// `read(store) > 0`.
    #[must_use]
    #[inline]
    pub const fn get_bool(self, store: u32) -> bool {
        self.read(store) > 0
    }

    /// Write `1` or `0`.
    #[must_use]
    #[inline]
    pub const fn set_bool(self, store: u32, value: bool) -> u32 {
        self.write(store, value as u32)
    }
}

/// Sequential mask generator for one field group.
///
/// Tile fields and unit fields each get their own allocator; `reset` starts a
/// fresh scalar within the same group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitAllocator {
    cursor: u8,
}

impl BitAllocator {
    /// An allocator whose next mask starts at bit 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Next free bit.
    #[must_use]
    pub const fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Allocate `width` bits right after the previous mask.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or the mask would extend past bit 31.
    #[must_use]
    pub const fn generate(&mut self, width: u8) -> BitMask {
        self.generate_at(width, self.cursor)
    }

    /// Allocate `width` bits starting at `from` and move the cursor past them.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or `from + width` exceeds the 32-bit store.
    #[must_use]
    pub const fn generate_at(&mut self, width: u8, from: u8) -> BitMask {
        // A zero-width mask at bit 32 would shift a u32 by its full width.
        assert!(width > 0, "bit mask must be at least one bit wide");
        assert!(
            from as u16 + width as u16 <= STORE_BITS as u16,
            "bit mask does not fit in a 32-bit store"
        );
        self.cursor = from + width;
        BitMask { shift: from, width }
    }

    /// Start packing a fresh scalar.
    pub const fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Free-function form of [`BitMask::read`].
#[must_use]
pub const fn read_bits(store: u32, mask: BitMask) -> u32 {
    mask.read(store)
}

/// Free-function form of [`BitMask::write`].
#[must_use]
pub const fn write_bits(store: u32, value: u32, mask: BitMask) -> u32 {
    mask.write(store, value)
}

/// Free-function form of [`BitMask::get_bool`].
#[must_use]
pub const fn get_boolean(store: u32, mask: BitMask) -> bool {
    mask.get_bool(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_generation() {
        let mut alloc = BitAllocator::new();
        let a = alloc.generate(3);
        let b = alloc.generate(7);
        assert_eq!((a.shift(), a.width()), (0, 3));
        assert_eq!((b.shift(), b.width()), (3, 7));
        assert_eq!(alloc.cursor(), 10);
    }

    #[test]
    fn test_generate_at_moves_cursor() {
        let mut alloc = BitAllocator::new();
        let a = alloc.generate_at(4, 20);
        assert_eq!(a.shift(), 20);
        let b = alloc.generate(2);
        assert_eq!(b.shift(), 24);
    }

    #[test]
    fn test_reset() {
        let mut alloc = BitAllocator::new();
        let _ = alloc.generate(30);
        alloc.reset();
        assert_eq!(alloc.generate(8).shift(), 0);
    }

    #[test]
    fn test_full_width_mask() {
        let mut alloc = BitAllocator::new();
        let all = alloc.generate(32);
        assert_eq!(all.low_bits(), u32::MAX);
        assert_eq!(all.read(0xDEAD_BEEF), 0xDEAD_BEEF);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_overflow_panics() {
        let mut alloc = BitAllocator::new();
        let _ = alloc.generate(30);
        let _ = alloc.generate(3);
    }

    #[test]
    #[should_panic(expected = "at least one bit")]
    fn test_zero_width_at_end_panics() {
        let mut alloc = BitAllocator::new();
        let _ = alloc.generate_at(0, 32);
    }

    #[test]
    fn test_write_fits() {
        let mut alloc = BitAllocator::new();
        let mask = alloc.generate(3);
        assert_eq!(write_bits(0, 5, mask), 5);
    }

    #[test]
    fn test_write_truncates_silently() {
        let mut alloc = BitAllocator::new();
        let mask = alloc.generate(3);
        // 9 = 0b1001, only the low three bits survive.
        assert_eq!(write_bits(0, 9, mask), 1);
    }

    #[test]
    fn test_write_preserves_neighbours() {
        let mut alloc = BitAllocator::new();
        let _low = alloc.generate(4);
        let mid = alloc.generate(4);
        let store = 0xFFFF_FFFF;
        let written = mid.write(store, 0);
        assert_eq!(written, 0xFFFF_FF0F);
        assert_eq!(mid.read(written), 0);
    }

    #[test]
    fn test_get_boolean() {
        let mut alloc = BitAllocator::new();
        let _ = alloc.generate(5);
        let flag = alloc.generate(1);
        let store = flag.set_bool(0, true);
        assert!(get_boolean(store, flag));
        assert!(!get_boolean(flag.set_bool(store, false), flag));
        assert_eq!(read_bits(store, flag), 1);
    }
}
