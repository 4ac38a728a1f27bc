use ax12_packet::{ErrorStatus, constants};

/// One servo as the master sees it: where to address it and what it last complained about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Device {
    id: u8,
    error_status: ErrorStatus,
}

impl Device {
    #[inline(always)]
    pub const fn new(id: u8) -> Self {
        Self {
            id,
            error_status: ErrorStatus::OK,
        }
    }

    /// Every servo at once. Nothing but `ping` ever answers.
    #[inline(always)]
    pub const fn broadcast() -> Self {
        Self::new(constants::BROADCAST)
    }

    #[inline(always)]
    pub const fn id(&self) -> u8 {
        self.id
    }

    #[inline(always)]
    pub const fn is_broadcast(&self) -> bool {
        constants::is_broadcast(self.id)
    }

    /// Error byte of the last status packet that passed every check.
    #[inline(always)]
    pub const fn error_status(&self) -> ErrorStatus {
        self.error_status
    }

    #[inline(always)]
    pub(crate) const fn set_error_status(&mut self, error_status: ErrorStatus) {
        self.error_status = error_status;
    }

    #[inline(always)]
    pub(crate) const fn set_id(&mut self, id: u8) {
        self.id = id;
    }
}
