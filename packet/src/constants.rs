/// Both bytes of the two-byte frame marker that opens every packet.
pub const MARKER: u8 = 0xFF;

/// Addresses every device on the bus at once. Nobody answers a broadcast (except `Ping`).
pub const BROADCAST: u8 = 0xFE;

/// Highest individually addressable ID.
pub const MAX_ID: u8 = 0xFD;

/// The length byte counts the parameters plus the instruction (or error) byte and the checksum.
pub const LENGTH_OVERHEAD: u8 = 2;

/// Largest parameter count whose length still fits in one byte.
pub const MAX_PARAMETERS: usize = (u8::MAX - LENGTH_OVERHEAD) as usize;

/// Marker, ID, length and instruction (or error) byte.
pub const HEADER_BYTES: usize = 5;

/// Header plus checksum: the size of a packet without parameters.
pub const FRAMING_BYTES: usize = HEADER_BYTES + 1;

/// How many bytes the reader inspects while looking for the frame marker.
pub const MARKER_SCAN_LIMIT: u8 = 20;

#[inline(always)]
pub const fn is_broadcast(id: u8) -> bool {
    id == BROADCAST
}

/// Value of the length byte for `parameters` parameter bytes, if it fits.
#[inline]
pub const fn length_byte(parameters: usize) -> Option<u8> {
    if parameters > MAX_PARAMETERS {
        None
    } else {
        Some(parameters as u8 + LENGTH_OVERHEAD)
    }
}
