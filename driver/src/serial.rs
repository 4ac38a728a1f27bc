use {
    crate::comm::Comm,
    ax12_packet::stream::{Sink, Stream},
    core::fmt,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecvError<E> {
    TimedOut { polls: u32 },
    Comm(E),
}

impl<E: fmt::Display> fmt::Display for RecvError<E> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::TimedOut { polls } => write!(f, "No byte arrived within {polls} polls"),
            Self::Comm(ref e) => write!(f, "Serial error: {e}"),
        }
    }
}

/// Feeds a packet writer straight into the serial port.
pub(crate) struct TxSink<'lock, C: Comm> {
    comm: &'lock mut C,
}

impl<'lock, C: Comm> TxSink<'lock, C> {
    #[inline(always)]
    pub const fn new(comm: &'lock mut C) -> Self {
        Self { comm }
    }
}

impl<C: Comm> Sink for TxSink<'_, C> {
    type Item = u8;
    type Error = C::Error;

    #[inline(always)]
    async fn push(&mut self, item: u8) -> Result<(), Self::Error> {
        self.comm.send(item).await
    }
}

/// Received bytes, one at a time, each given up on after `polls_per_byte` empty polls.
pub(crate) struct RxStream<'lock, C: Comm> {
    comm: &'lock mut C,
    polls_per_byte: u32,
}

impl<'lock, C: Comm> RxStream<'lock, C> {
    #[inline(always)]
    pub const fn new(comm: &'lock mut C, polls_per_byte: u32) -> Self {
        Self {
            comm,
            polls_per_byte,
        }
    }
}

impl<C: Comm> Stream for RxStream<'_, C> {
    type Item = Result<u8, RecvError<C::Error>>;

    #[inline]
    async fn next(&mut self) -> Self::Item {
        for _ in 0..self.polls_per_byte {
            if let Some(byte) = self.comm.poll().map_err(RecvError::Comm)? {
                trace!("Received x{:X}", byte);
                return Ok(byte);
            }
            let () = C::yield_to_other_tasks().await;
        }
        Err(RecvError::TimedOut {
            polls: self.polls_per_byte,
        })
    }
}
