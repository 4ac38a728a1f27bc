use {
    crate::{
        checksum::Checksum,
        constants::{self, MARKER},
        instruction::Instruction,
        stream::Sink,
    },
    core::fmt,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Sink(E),
    TooManyParameters { count: usize },
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Sink(ref e) => write!(f, "Error while sending a byte: {e}"),
            Self::TooManyParameters { count } => write!(
                f,
                "{count} parameter bytes do not fit in one packet (at most {})",
                constants::MAX_PARAMETERS,
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    TooManyParameters { count: usize },
    BufferTooSmall { needed: usize, available: usize },
}

impl fmt::Display for EncodeError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::TooManyParameters { count } => write!(
                f,
                "{count} parameter bytes do not fit in one packet (at most {})",
                constants::MAX_PARAMETERS,
            ),
            Self::BufferTooSmall { needed, available } => write!(
                f,
                "Packet needs {needed} bytes but the buffer only holds {available}",
            ),
        }
    }
}

/// Marker, ID, length and instruction of a command packet with `parameter_count` parameters.
#[inline]
pub const fn header(
    id: u8,
    instruction: Instruction,
    parameter_count: usize,
) -> Option<[u8; constants::HEADER_BYTES]> {
    match constants::length_byte(parameter_count) {
        Some(length) => Some([MARKER, MARKER, id, length, instruction.byte()]),
        None => None,
    }
}

/// Serialize a whole command packet into `buffer`, returning the filled prefix.
#[inline]
pub fn encode<'buf>(
    buffer: &'buf mut [u8],
    id: u8,
    instruction: Instruction,
    parameters: &[u8],
) -> Result<&'buf [u8], EncodeError> {
    let header = header(id, instruction, parameters.len()).ok_or(EncodeError::TooManyParameters {
        count: parameters.len(),
    })?;
    let needed = constants::FRAMING_BYTES + parameters.len();
    let available = buffer.len();
    let Some(packet) = buffer.get_mut(..needed) else {
        return Err(EncodeError::BufferTooSmall { needed, available });
    };
    let (head, rest) = packet.split_at_mut(constants::HEADER_BYTES);
    let (body, tail) = rest.split_at_mut(parameters.len());
    head.copy_from_slice(&header);
    body.copy_from_slice(parameters);
    let mut checksum = Checksum::new();
    checksum.extend(&header[2..]);
    checksum.extend(parameters);
    tail[0] = checksum.collapse();
    Ok(packet)
}

/// Streams one command packet into a byte sink, accumulating the checksum as it goes.
pub struct Writer<S> {
    sink: S,
    checksum: Checksum,
    remaining: usize,
}

impl<S: Sink<Item = u8>> Writer<S> {
    #[inline(always)]
    pub const fn new(sink: S) -> Self {
        Self {
            sink,
            checksum: Checksum::new(),
            remaining: 0,
        }
    }

    #[inline]
    async fn emit(&mut self, byte: u8) -> Result<(), Error<S::Error>> {
        trace!("Sending x{:X}", byte);
        self.sink.push(byte).await.map_err(Error::Sink)
    }

    /// Marker, then ID, length and instruction. Nothing is sent if the count is too large.
    #[inline]
    pub async fn begin(
        &mut self,
        id: u8,
        parameter_count: usize,
        instruction: Instruction,
    ) -> Result<(), Error<S::Error>> {
        let [first, second, id, length, instruction_byte] = header(id, instruction, parameter_count)
            .ok_or(Error::TooManyParameters {
                count: parameter_count,
            })?;
        debug!(
            "Sending {} to ID {} with {} parameter bytes",
            instruction,
            id,
            parameter_count,
        );
        let () = self.emit(first).await?;
        let () = self.emit(second).await?;
        // The marker is not part of the checksum.
        self.checksum.reset();
        for byte in [id, length, instruction_byte] {
            self.checksum.push(byte);
            let () = self.emit(byte).await?;
        }
        self.remaining = parameter_count;
        Ok(())
    }

    #[inline]
    pub async fn push(&mut self, byte: u8) -> Result<(), Error<S::Error>> {
        debug_assert!(self.remaining > 0, "more parameters than announced in the header");
        self.remaining = self.remaining.saturating_sub(1);
        self.checksum.push(byte);
        self.emit(byte).await
    }

    #[inline]
    pub async fn extend(&mut self, bytes: &[u8]) -> Result<(), Error<S::Error>> {
        for &byte in bytes {
            let () = self.push(byte).await?;
        }
        Ok(())
    }

    /// Close the packet with the checksum byte.
    #[inline]
    pub async fn finish(&mut self) -> Result<(), Error<S::Error>> {
        debug_assert_eq!(self.remaining, 0, "fewer parameters than announced in the header");
        let checksum = self.checksum.collapse();
        self.emit(checksum).await
    }

    #[inline(always)]
    pub fn into_inner(self) -> S {
        self.sink
    }
}

/// Send one complete command packet whose parameters are the concatenation of `chunks`.
#[inline]
pub async fn command<S: Sink<Item = u8>>(
    sink: S,
    id: u8,
    instruction: Instruction,
    chunks: &[&[u8]],
) -> Result<(), Error<S::Error>> {
    let parameter_count = chunks.iter().map(|chunk| chunk.len()).sum();
    let mut writer = Writer::new(sink);
    let () = writer.begin(id, parameter_count, instruction).await?;
    for chunk in chunks {
        let () = writer.extend(chunk).await?;
    }
    writer.finish().await
}
