use {
    crate::{
        comm::{Comm, Direction},
        config::Config,
        device::Device,
        serial::{RecvError, RxStream, TxSink},
    },
    ax12_packet::{
        ErrorStatus, Instruction, constants,
        control_table::{self, Item},
        recv::{self, Mismatch8, Sender},
        send,
    },
    core::{fmt, ops::RangeInclusive},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// The serial port refused a byte of the command.
    Send(E),
    /// The serial port failed while a reply was coming in.
    Recv(E),
    /// A byte of the reply never arrived.
    TimedOut { polls: u32 },
    TooManyParameters { count: usize },
    /// No register starts at this address, so its width is unknown.
    UnsupportedRegister { address: u8 },
    InvalidId { id: u8 },
    FrameNotFound { scanned: u8 },
    FrameMalformed(Mismatch8),
    IdMismatch(Mismatch8),
    LengthMismatch(Mismatch8),
    ChecksumMismatch(Mismatch8),
}

impl<E> Error<E> {
    #[inline]
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::Send(_) => "Send",
            Self::Recv(_) => "Recv",
            Self::TimedOut { .. } => "TimedOut",
            Self::TooManyParameters { .. } => "TooManyParameters",
            Self::UnsupportedRegister { .. } => "UnsupportedRegister",
            Self::InvalidId { .. } => "InvalidId",
            Self::FrameNotFound { .. } => "FrameNotFound",
            Self::FrameMalformed(_) => "FrameMalformed",
            Self::IdMismatch(_) => "IdMismatch",
            Self::LengthMismatch(_) => "LengthMismatch",
            Self::ChecksumMismatch(_) => "ChecksumMismatch",
        }
    }

    /// Nothing that looked like a reply ever showed up.
    #[inline]
    pub const fn is_silence(&self) -> bool {
        matches!(*self, Self::TimedOut { .. } | Self::FrameNotFound { .. })
    }
}

impl<E> From<send::Error<E>> for Error<E> {
    #[inline]
    fn from(value: send::Error<E>) -> Self {
        match value {
            send::Error::Sink(e) => Self::Send(e),
            send::Error::TooManyParameters { count } => Self::TooManyParameters { count },
        }
    }
}

impl<E> From<recv::Error<RecvError<E>>> for Error<E> {
    #[inline]
    fn from(value: recv::Error<RecvError<E>>) -> Self {
        match value {
            recv::Error::Stream(RecvError::Comm(e)) => Self::Recv(e),
            recv::Error::Stream(RecvError::TimedOut { polls }) => Self::TimedOut { polls },
            recv::Error::TooManyParameters { count } => Self::TooManyParameters { count },
            recv::Error::FrameNotFound { scanned } => Self::FrameNotFound { scanned },
            recv::Error::FrameMalformed(e) => Self::FrameMalformed(e),
            recv::Error::IdMismatch(e) => Self::IdMismatch(e),
            recv::Error::LengthMismatch(e) => Self::LengthMismatch(e),
            recv::Error::ChecksumMismatch(e) => Self::ChecksumMismatch(e),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Error<E> {
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        match *self {
            Self::Send(ref e) => defmt::write!(f, "Error while sending a command: {}", e),
            Self::Recv(ref e) => defmt::write!(f, "Error while receiving a reply: {}", e),
            Self::TimedOut { polls } => {
                defmt::write!(f, "Reply stalled: no byte within {} polls", polls)
            }
            Self::TooManyParameters { count } => {
                defmt::write!(f, "{} parameter bytes do not fit in one packet", count)
            }
            Self::UnsupportedRegister { address } => {
                defmt::write!(f, "No register starts at address {}", address)
            }
            Self::InvalidId { id } => defmt::write!(f, "Invalid servo ID: {}", id),
            Self::FrameNotFound { scanned } => {
                defmt::write!(f, "No frame marker in the first {} bytes", scanned)
            }
            Self::FrameMalformed(ref e) => defmt::write!(f, "Malformed frame marker: {}", e),
            Self::IdMismatch(ref e) => defmt::write!(f, "Reply from the wrong ID: {}", e),
            Self::LengthMismatch(ref e) => defmt::write!(f, "Reply has the wrong length: {}", e),
            Self::ChecksumMismatch(ref e) => defmt::write!(f, "Reply checksum mismatch: {}", e),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Send(ref e) => write!(f, "Error while sending a command: {e}"),
            Self::Recv(ref e) => write!(f, "Error while receiving a reply: {e}"),
            Self::TimedOut { polls } => write!(f, "Reply stalled: no byte within {polls} polls"),
            Self::TooManyParameters { count } => {
                write!(f, "{count} parameter bytes do not fit in one packet")
            }
            Self::UnsupportedRegister { address } => {
                write!(f, "No register starts at address {address}")
            }
            Self::InvalidId { id } => write!(f, "Invalid servo ID: {id}"),
            Self::FrameNotFound { scanned } => {
                write!(f, "No frame marker in the first {scanned} bytes")
            }
            Self::FrameMalformed(ref e) => write!(f, "Malformed frame marker: {e}"),
            Self::IdMismatch(ref e) => write!(f, "Reply from the wrong ID: {e}"),
            Self::LengthMismatch(ref e) => write!(f, "Reply has the wrong length: {e}"),
            Self::ChecksumMismatch(ref e) => write!(f, "Reply checksum mismatch: {e}"),
        }
    }
}

/// Number of value bytes for a register of `width` bytes. Always 1 or 2 when `Ok`.
#[inline]
fn value_width<E>(address: u8, width: u8) -> Result<usize, Error<E>> {
    match width {
        1 | 2 => Ok(usize::from(width)),
        _ => {
            error!("No register starts at address {}", address);
            Err(Error::UnsupportedRegister { address })
        }
    }
}

/// The master end of one half-duplex bus: one request, then at most one reply, at a time.
pub struct Bus<C: Comm> {
    comm: C,
    config: Config,
}

impl<C: Comm> Bus<C> {
    #[inline(always)]
    pub const fn new(comm: C) -> Self {
        Self::with_config(comm, Config::DEFAULT)
    }

    #[inline(always)]
    pub const fn with_config(comm: C, config: Config) -> Self {
        Self { comm, config }
    }

    #[inline(always)]
    pub const fn config(&self) -> Config {
        self.config
    }

    #[inline(always)]
    pub fn comm_mut(&mut self) -> &mut C {
        &mut self.comm
    }

    #[inline(always)]
    pub fn into_comm(self) -> C {
        self.comm
    }

    #[inline]
    async fn send_command(
        &mut self,
        id: u8,
        instruction: Instruction,
        chunks: &[&[u8]],
    ) -> Result<(), Error<C::Error>> {
        self.comm.set_direction(Direction::Transmit);
        send::command(TxSink::new(&mut self.comm), id, instruction, chunks)
            .await
            .map_err(Error::from)
    }

    #[inline]
    async fn recv_status(
        &mut self,
        sender: Sender,
        parameters: &mut [u8],
    ) -> Result<ErrorStatus, Error<C::Error>> {
        // Turning the line around before the last stop bit is out would clip the command.
        while self.comm.busy() {
            let () = C::yield_to_other_tasks().await;
        }
        self.comm.set_direction(Direction::Receive);
        let mut stream = RxStream::new(&mut self.comm, self.config.polls_per_byte);
        recv::parse(
            &mut stream,
            sender,
            parameters,
            self.config.marker_scan_limit,
        )
        .await
        .map_err(Error::from)
    }

    /// Send one command and, if this instruction gets one, wait for the reply.
    ///
    /// The device's error status changes only when a reply passes every check.
    #[inline]
    async fn exchange(
        &mut self,
        device: &mut Device,
        instruction: Instruction,
        chunks: &[&[u8]],
        reply: &mut [u8],
        sender: Sender,
    ) -> Result<(), Error<C::Error>> {
        let id = device.id();
        let () = self.send_command(id, instruction, chunks).await?;
        if !instruction.expects_reply(id) {
            debug!("Not waiting for a reply to {} at ID {}", instruction, id);
            return Ok(());
        }
        match self.recv_status(sender, reply).await {
            Ok(status) => {
                if !status.is_ok() {
                    warn!("ID {} reports {}", id, status);
                }
                device.set_error_status(status);
                Ok(())
            }
            Err(e) => {
                if e.is_silence() {
                    debug!("No reply to {} from ID {}", instruction, id);
                } else {
                    warn!("Bad reply to {} from ID {}: {}", instruction, id, e.name());
                }
                Err(e)
            }
        }
    }

    /// Ask a servo to answer with an empty status packet.
    #[inline]
    pub async fn ping(&mut self, device: &mut Device) -> Result<(), Error<C::Error>> {
        let sender = Sender::exactly(device.id());
        self.exchange(device, Instruction::Ping, &[], &mut [], sender)
            .await
    }

    /// Fill `buffer` with consecutive control table bytes starting at `address`.
    ///
    /// A broadcast read sends the request and leaves `buffer` untouched.
    #[inline]
    pub async fn read(
        &mut self,
        device: &mut Device,
        address: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error<C::Error>> {
        let count = buffer.len();
        let length = match u8::try_from(count) {
            Ok(length) if count <= constants::MAX_PARAMETERS => length,
            _ => return Err(Error::TooManyParameters { count }),
        };
        let sender = Sender::exactly(device.id());
        self.exchange(
            device,
            Instruction::ReadData,
            &[&[address, length]],
            buffer,
            sender,
        )
        .await
    }

    /// Write `bytes` into the control table starting at `address`, effective immediately.
    #[inline]
    pub async fn write(
        &mut self,
        device: &mut Device,
        address: u8,
        bytes: &[u8],
    ) -> Result<(), Error<C::Error>> {
        let sender = Sender::exactly(device.id());
        self.exchange(
            device,
            Instruction::WriteData,
            &[&[address], bytes],
            &mut [],
            sender,
        )
        .await
    }

    /// Like `write`, but held back until the next `action`.
    #[inline]
    pub async fn reg_write(
        &mut self,
        device: &mut Device,
        address: u8,
        bytes: &[u8],
    ) -> Result<(), Error<C::Error>> {
        let sender = Sender::exactly(device.id());
        self.exchange(
            device,
            Instruction::RegWrite,
            &[&[address], bytes],
            &mut [],
            sender,
        )
        .await
    }

    /// Commit every pending `reg_write`. Never waits for a reply.
    #[inline]
    pub async fn action(&mut self, device: &mut Device) -> Result<(), Error<C::Error>> {
        let sender = Sender::exactly(device.id());
        self.exchange(device, Instruction::Action, &[], &mut [], sender)
            .await
    }

    /// Restore factory settings, which includes resetting the ID to 1.
    #[inline]
    pub async fn reset(&mut self, device: &mut Device) -> Result<(), Error<C::Error>> {
        let sender = Sender::exactly(device.id());
        self.exchange(device, Instruction::Reset, &[], &mut [], sender)
            .await
    }

    #[inline]
    async fn get_sized(
        &mut self,
        device: &mut Device,
        address: u8,
        width: u8,
    ) -> Result<u16, Error<C::Error>> {
        let width = value_width(address, width)?;
        let mut bytes = [0; 2];
        let () = self.read(device, address, &mut bytes[..width]).await?;
        Ok(u16::from_le_bytes(bytes))
    }

    #[inline]
    async fn put_sized(
        &mut self,
        device: &mut Device,
        address: u8,
        width: u8,
        value: u16,
        instruction: Instruction,
    ) -> Result<(), Error<C::Error>> {
        let width = value_width(address, width)?;
        let bytes = value.to_le_bytes();
        let sender = Sender::exactly(device.id());
        self.exchange(
            device,
            instruction,
            &[&[address], &bytes[..width]],
            &mut [],
            sender,
        )
            .await
    }

    /// Read the whole register starting at `address`, however wide it is.
    #[inline]
    pub async fn get(&mut self, device: &mut Device, address: u8) -> Result<u16, Error<C::Error>> {
        self.get_sized(device, address, control_table::width_of(address))
            .await
    }

    /// Write the register starting at `address`. One-byte registers keep only the low byte.
    #[inline]
    pub async fn put(
        &mut self,
        device: &mut Device,
        address: u8,
        value: u16,
    ) -> Result<(), Error<C::Error>> {
        self.put_sized(
            device,
            address,
            control_table::width_of(address),
            value,
            Instruction::WriteData,
        )
        .await
    }

    #[inline]
    pub async fn read_item<I: Item>(&mut self, device: &mut Device) -> Result<u16, Error<C::Error>> {
        self.get_sized(device, I::ADDRESS, I::BYTES).await
    }

    #[inline]
    pub async fn write_item<I: Item>(
        &mut self,
        device: &mut Device,
        value: u16,
    ) -> Result<(), Error<C::Error>> {
        self.put_sized(device, I::ADDRESS, I::BYTES, value, Instruction::WriteData)
            .await
    }

    #[inline]
    pub async fn reg_write_item<I: Item>(
        &mut self,
        device: &mut Device,
        value: u16,
    ) -> Result<(), Error<C::Error>> {
        self.put_sized(device, I::ADDRESS, I::BYTES, value, Instruction::RegWrite)
            .await
    }

    /// Move a servo to a new ID. Its reply already comes from the new one.
    #[inline]
    pub async fn change_id(&mut self, device: &mut Device, id: u8) -> Result<(), Error<C::Error>> {
        if id > constants::MAX_ID {
            return Err(Error::InvalidId { id });
        }
        let old = device.id();
        debug!("Changing ID {} to {}", old, id);
        let () = self
            .exchange(
                device,
                Instruction::WriteData,
                &[&[control_table::Id::ADDRESS, id]],
                &mut [],
                Sender::either(old, id),
            )
            .await?;
        if !device.is_broadcast() {
            device.set_id(id);
        }
        Ok(())
    }

    /// Ping every ID in `ids` and collect the ones that answer, stopping once `N` are found.
    ///
    /// Silence and garbled replies both count as "nobody here"; only serial port failures abort.
    #[inline]
    pub async fn scan<const N: usize>(
        &mut self,
        ids: RangeInclusive<u8>,
    ) -> Result<heapless::Vec<u8, N>, Error<C::Error>> {
        let mut found = heapless::Vec::new();
        for id in ids {
            if found.is_full() {
                debug!("Scan stopped before ID {}: no room for more results", id);
                break;
            }
            if id > constants::MAX_ID {
                break;
            }
            let mut device = Device::new(id);
            match self.ping(&mut device).await {
                Ok(()) => {
                    debug!("Found a servo at ID {}", id);
                    // Room was checked at the top of the loop.
                    let _ = found.push(id);
                }
                Err(e @ (Error::Send(_) | Error::Recv(_))) => return Err(e),
                Err(_) => {}
            }
        }
        Ok(found)
    }
}
