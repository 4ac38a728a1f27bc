#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod bus;
pub mod comm;
pub mod config;
pub mod device;
pub mod mutex;
pub mod serial;
pub mod servo;

#[cfg(test)]
mod test_util;

pub use {
    bus::Bus,
    comm::{Comm, Direction},
    config::Config,
    device::Device,
    servo::Servo,
};

/// Failure of one servo call on a shared bus.
pub enum Error<C: comm::Comm, M: mutex::Mutex> {
    Mutex(<M as mutex::Mutex>::Error),
    Bus(bus::Error<<C as comm::Comm>::Error>),
}

impl<C: comm::Comm, M: mutex::Mutex> core::fmt::Debug for Error<C, M>
where
    C::Error: core::fmt::Debug,
    M::Error: core::fmt::Debug,
{
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Mutex(ref e) => f.debug_tuple("Mutex").field(e).finish(),
            Self::Bus(ref e) => f.debug_tuple("Bus").field(e).finish(),
        }
    }
}

impl<C: comm::Comm, M: mutex::Mutex> core::fmt::Display for Error<C, M>
where
    C::Error: core::fmt::Display,
    M::Error: core::fmt::Display,
{
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Mutex(ref e) => write!(
                f,
                "Mutex error while waiting to use the AX-12 serial bus: {e}",
            ),
            Self::Bus(ref e) => write!(f, "Error from the AX-12 serial bus: {e}"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<C: comm::Comm, M: mutex::Mutex> defmt::Format for Error<C, M>
where
    C::Error: defmt::Format,
    M::Error: defmt::Format,
{
    #[inline]
    fn format(&self, f: defmt::Formatter) {
        match *self {
            Self::Mutex(ref e) => defmt::write!(
                f,
                "Mutex error while waiting to use the AX-12 serial bus: {}",
                e,
            ),
            Self::Bus(ref e) => defmt::write!(f, "Error from the AX-12 serial bus: {}", e),
        }
    }
}
