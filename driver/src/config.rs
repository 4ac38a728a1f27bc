use ax12_packet::constants;

/// Tuning knobs for one bus. Both limits bound how long a silent or noisy line can stall a caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// How many bytes to discard while looking for the first marker of a status packet.
    pub marker_scan_limit: u8,
    /// How many empty polls of the receiver before a byte counts as lost.
    pub polls_per_byte: u32,
}

impl Config {
    pub const DEFAULT: Self = Self {
        marker_scan_limit: constants::MARKER_SCAN_LIMIT,
        polls_per_byte: 10_000,
    };

    #[inline(always)]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[inline(always)]
    #[must_use]
    pub const fn with_marker_scan_limit(mut self, marker_scan_limit: u8) -> Self {
        self.marker_scan_limit = marker_scan_limit;
        self
    }

    #[inline(always)]
    #[must_use]
    pub const fn with_polls_per_byte(mut self, polls_per_byte: u32) -> Self {
        self.polls_per_byte = polls_per_byte;
        self
    }
}

impl Default for Config {
    #[inline(always)]
    fn default() -> Self {
        Self::DEFAULT
    }
}
