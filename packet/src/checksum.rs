/// Running checksum over every byte after the two-byte marker.
///
/// One accumulator lives for exactly one packet: it is reset right after the marker
/// and collapsed (one's complement of the byte sum) at the end of the packet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum {
    sum: u8,
}

impl Checksum {
    #[inline(always)]
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    #[inline(always)]
    pub const fn reset(&mut self) {
        self.sum = 0;
    }

    #[inline(always)]
    pub const fn push(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    #[inline]
    pub const fn extend(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.push(bytes[i]);
            i += 1;
        }
    }

    /// The checksum byte that closes the packet.
    #[inline(always)]
    pub const fn collapse(&self) -> u8 {
        !self.sum
    }

    #[inline]
    pub const fn of(bytes: &[u8]) -> u8 {
        let mut checksum = Self::new();
        checksum.extend(bytes);
        checksum.collapse()
    }
}

#[cfg(test)]
mod test {
    use {super::*, quickcheck_macros::quickcheck};

    #[test]
    fn ping_reply() {
        // FF FF 01 02 00 FC
        assert_eq!(Checksum::of(&[0x01, 0x02, 0x00]), 0xFC);
    }

    #[test]
    fn read_present_position() {
        // FF FF 01 04 02 24 02 D2
        assert_eq!(Checksum::of(&[0x01, 0x04, 0x02, 0x24, 0x02]), 0xD2);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut checksum = Checksum::new();
        checksum.extend(&[0xFF, 0xFF, 0x12]);
        checksum.reset();
        assert_eq!(checksum, Checksum::new());
        assert_eq!(checksum.collapse(), 0xFF);
    }

    #[quickcheck]
    fn collapse_is_inverted_byte_sum(bytes: Vec<u8>) -> bool {
        let sum = bytes.iter().fold(0_u32, |acc, &b| acc + u32::from(b));
        Checksum::of(&bytes) == !((sum & 0xFF) as u8)
    }

    #[quickcheck]
    fn sum_plus_checksum_is_all_ones(bytes: Vec<u8>) -> bool {
        let mut checksum = Checksum::new();
        checksum.extend(&bytes);
        let closing = checksum.collapse();
        checksum.push(closing);
        checksum.collapse() == 0x00
    }
}
