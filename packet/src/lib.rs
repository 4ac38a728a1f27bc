#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod checksum;
pub mod constants;
pub mod control_table;
pub mod instruction;
pub mod recv;
pub mod send;
pub mod status;
pub mod stream;

#[cfg(test)]
mod test_util;

pub use {checksum::Checksum, instruction::Instruction, status::ErrorStatus};
