use {
    crate::{
        checksum::Checksum,
        constants::{self, MARKER},
        status::ErrorStatus,
        stream::{Stream, WithChecksum},
    },
    core::fmt,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mismatch8 {
    pub expected: u8,
    pub actual: u8,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mismatch8 {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        let Self {
            ref expected,
            ref actual,
        } = *self;
        defmt::write!(f, "Expected `x{:X}` but received `x{:X}`", expected, actual)
    }
}

impl fmt::Display for Mismatch8 {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { expected, actual } = *self;
        write!(f, "Expected `x{expected:X}` but received `x{actual:X}`")
    }
}

/// Why a status packet could not be accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// The byte source itself failed (or gave up waiting).
    Stream(E),
    /// The caller asked for more parameters than a status packet can carry.
    TooManyParameters { count: usize },
    /// No marker byte among the first `scanned` bytes.
    FrameNotFound { scanned: u8 },
    /// A marker byte that was not followed by a second one.
    FrameMalformed(Mismatch8),
    IdMismatch(Mismatch8),
    LengthMismatch(Mismatch8),
    ChecksumMismatch(Mismatch8),
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        match *self {
            Self::Stream(ref e) => defmt::write!(f, "Error while receiving: {}", e),
            Self::TooManyParameters { count } => {
                defmt::write!(f, "{} parameter bytes cannot fit in a status packet", count)
            }
            Self::FrameNotFound { scanned } => {
                defmt::write!(f, "No frame marker in the first {} bytes", scanned)
            }
            Self::FrameMalformed(ref e) => defmt::write!(f, "Malformed frame marker: {}", e),
            Self::IdMismatch(ref e) => defmt::write!(f, "Wrong ID: {}", e),
            Self::LengthMismatch(ref e) => defmt::write!(f, "Wrong length: {}", e),
            Self::ChecksumMismatch(ref e) => defmt::write!(f, "Checksum mismatch: {}", e),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Stream(ref e) => write!(f, "Error while receiving: {e}"),
            Self::TooManyParameters { count } => {
                write!(f, "{count} parameter bytes cannot fit in a status packet")
            }
            Self::FrameNotFound { scanned } => {
                write!(f, "No frame marker in the first {scanned} bytes")
            }
            Self::FrameMalformed(ref e) => write!(f, "Malformed frame marker: {e}"),
            Self::IdMismatch(ref e) => write!(f, "Wrong ID: {e}"),
            Self::LengthMismatch(ref e) => write!(f, "Wrong length: {e}"),
            Self::ChecksumMismatch(ref e) => write!(f, "Checksum mismatch: {e}"),
        }
    }
}

/// IDs a status packet is allowed to come from.
///
/// A request addressed to the broadcast ID accepts a reply from anyone. Writing a new
/// value into a device's ID register makes it answer from the *new* ID, so that one
/// exchange names the new ID as `alternate`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sender {
    pub id: u8,
    pub alternate: Option<u8>,
}

impl Sender {
    #[inline(always)]
    pub const fn exactly(id: u8) -> Self {
        Self {
            id,
            alternate: None,
        }
    }

    #[inline(always)]
    pub const fn either(id: u8, alternate: u8) -> Self {
        Self {
            id,
            alternate: Some(alternate),
        }
    }

    #[inline]
    pub const fn accepts(self, actual: u8) -> bool {
        if constants::is_broadcast(self.id) || actual == self.id {
            return true;
        }
        matches!(self.alternate, Some(alternate) if alternate == actual)
    }
}

/// Read one status packet carrying exactly `parameters.len()` parameter bytes.
///
/// Scans at most `marker_scan_limit` bytes for the first marker byte, then validates the
/// packet field by field. On success the parameters are in `parameters` and the packet's
/// error byte is returned; on failure the contents of `parameters` are unspecified.
#[inline]
pub async fn parse<E, S: Stream<Item = Result<u8, E>>>(
    stream: &mut S,
    sender: Sender,
    parameters: &mut [u8],
    marker_scan_limit: u8,
) -> Result<ErrorStatus, Error<E>> {
    let expected_length =
        constants::length_byte(parameters.len()).ok_or(Error::TooManyParameters {
            count: parameters.len(),
        })?;

    let mut scanned: u8 = 0;
    loop {
        if scanned >= marker_scan_limit {
            return Err(Error::FrameNotFound { scanned });
        }
        let byte = stream.next().await.map_err(Error::Stream)?;
        scanned += 1;
        if byte == MARKER {
            break;
        }
        trace!("Skipping x{:X} while looking for a frame marker", byte);
    }
    let second = stream.next().await.map_err(Error::Stream)?;
    if second != MARKER {
        return Err(Error::FrameMalformed(Mismatch8 {
            expected: MARKER,
            actual: second,
        }));
    }

    let mut checksum = Checksum::new();
    let mut body = WithChecksum {
        checksum: &mut checksum,
        internal: &mut *stream,
    };
    let id = body.next().await.map_err(Error::Stream)?;
    if !sender.accepts(id) {
        return Err(Error::IdMismatch(Mismatch8 {
            expected: sender.id,
            actual: id,
        }));
    }
    let length = body.next().await.map_err(Error::Stream)?;
    if length != expected_length {
        return Err(Error::LengthMismatch(Mismatch8 {
            expected: expected_length,
            actual: length,
        }));
    }
    let error = body.next().await.map_err(Error::Stream)?;
    for slot in parameters.iter_mut() {
        *slot = body.next().await.map_err(Error::Stream)?;
    }

    let expected = checksum.collapse();
    let actual = stream.next().await.map_err(Error::Stream)?;
    if actual != expected {
        return Err(Error::ChecksumMismatch(Mismatch8 { expected, actual }));
    }
    debug!("Status packet from ID {} (error byte x{:X})", id, error);
    Ok(ErrorStatus(error))
}
