/// Which way the half-duplex line is currently driven.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Transmit,
    Receive,
}

/// A half-duplex serial port shared by every servo on the bus.
#[expect(async_fn_in_trait, reason = "every implementor runs on a single-threaded executor")]
pub trait Comm {
    type Error;

    /// Queue one byte, waiting until the transmit register can take it.
    async fn send(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Whether queued bytes are still being shifted out onto the line.
    fn busy(&mut self) -> bool;

    /// Take one received byte if one has arrived. Never waits.
    fn poll(&mut self) -> Result<Option<u8>, Self::Error>;

    fn set_direction(&mut self, direction: Direction);

    #[inline(always)]
    async fn yield_to_other_tasks() {
        let () = embassy_futures::yield_now().await;
    }
}
