use {
    crate::comm::{Comm, Direction},
    core::fmt,
    std::collections::VecDeque,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct WrongDirection;

impl fmt::Display for WrongDirection {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("line driven the wrong way")
    }
}

/// A bus with canned replies: each switch to `Receive` releases the next one.
#[derive(Debug, Default)]
pub(crate) struct Script {
    pub(crate) sent: Vec<u8>,
    pub(crate) directions: Vec<Direction>,
    pub(crate) polls: usize,
    pub(crate) turned_while_busy: bool,
    pub(crate) fail_polls: bool,
    replies: VecDeque<Vec<u8>>,
    incoming: VecDeque<u8>,
    direction: Option<Direction>,
    busy_for: usize,
    busy: usize,
}

impl Script {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn reply(mut self, bytes: &[u8]) -> Self {
        self.replies.push_back(bytes.to_vec());
        self
    }

    #[inline]
    pub(crate) fn silence(self) -> Self {
        self.reply(&[])
    }

    /// Report the transmitter busy for this many checks after every byte.
    #[inline]
    pub(crate) fn busy_for(mut self, checks: usize) -> Self {
        self.busy_for = checks;
        self
    }
}

impl Comm for Script {
    type Error = WrongDirection;

    #[inline]
    async fn send(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.direction != Some(Direction::Transmit) {
            return Err(WrongDirection);
        }
        self.sent.push(byte);
        self.busy = self.busy_for;
        Ok(())
    }

    #[inline]
    fn busy(&mut self) -> bool {
        let busy = self.busy > 0;
        self.busy = self.busy.saturating_sub(1);
        busy
    }

    #[inline]
    fn poll(&mut self) -> Result<Option<u8>, Self::Error> {
        if self.fail_polls || self.direction != Some(Direction::Receive) {
            return Err(WrongDirection);
        }
        self.polls += 1;
        Ok(self.incoming.pop_front())
    }

    #[inline]
    fn set_direction(&mut self, direction: Direction) {
        if direction == Direction::Receive {
            if self.busy > 0 {
                self.turned_while_busy = true;
            }
            if let Some(reply) = self.replies.pop_front() {
                self.incoming.extend(reply);
            }
        }
        self.directions.push(direction);
        self.direction = Some(direction);
    }
}
