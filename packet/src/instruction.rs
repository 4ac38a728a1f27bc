use {crate::constants::is_broadcast, core::fmt};

/// AX-12 (protocol 1.0) instruction set.
#[repr(u8)]
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum Instruction {
    /// No-op that only asks for a status packet.
    Ping = 0x01,
    /// Parameters: start address, number of bytes.
    ReadData = 0x02,
    /// Parameters: start address, bytes to write.
    WriteData = 0x03,
    /// Like `WriteData`, but held until an `Action` arrives.
    RegWrite = 0x04,
    /// Applies everything staged by `RegWrite`.
    Action = 0x05,
    /// Restores the factory control table.
    Reset = 0x06,
}

impl Instruction {
    #[inline(always)]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Ping),
            0x02 => Some(Self::ReadData),
            0x03 => Some(Self::WriteData),
            0x04 => Some(Self::RegWrite),
            0x05 => Some(Self::Action),
            0x06 => Some(Self::Reset),
            _ => None,
        }
    }

    /// Whether sending this instruction to `id` should be followed by reading a status packet.
    ///
    /// `Ping` always answers; `Action` is meant to be broadcast and is never awaited;
    /// everything else answers unless it was broadcast, since every device on the bus
    /// would try to reply at once.
    #[inline]
    pub const fn expects_reply(self, id: u8) -> bool {
        match self {
            Self::Ping => true,
            Self::Action => false,
            Self::ReadData | Self::WriteData | Self::RegWrite | Self::Reset => !is_broadcast(id),
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::ReadData => "Read Data",
            Self::WriteData => "Write Data",
            Self::RegWrite => "Reg Write",
            Self::Action => "Action",
            Self::Reset => "Reset",
        }
    }
}

impl fmt::Display for Instruction {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::constants::BROADCAST,
        quickcheck::{Arbitrary, Gen, TestResult},
        quickcheck_macros::quickcheck,
        strum::VariantArray,
    };

    impl Arbitrary for Instruction {
        #[inline]
        fn arbitrary(g: &mut Gen) -> Self {
            let i = usize::arbitrary(g) % const { Self::VARIANTS.len() };
            Self::VARIANTS[i]
        }

        #[inline]
        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            let i = Self::VARIANTS
                .binary_search(self)
                .expect("Invalid enum variant");
            Box::new(i.shrink().filter_map(|j| Self::VARIANTS.get(j).copied()))
        }
    }

    #[test]
    fn codes_match_the_ax12_manual() {
        assert_eq!(Instruction::Ping.byte(), 0x01);
        assert_eq!(Instruction::ReadData.byte(), 0x02);
        assert_eq!(Instruction::WriteData.byte(), 0x03);
        assert_eq!(Instruction::RegWrite.byte(), 0x04);
        assert_eq!(Instruction::Action.byte(), 0x05);
        assert_eq!(Instruction::Reset.byte(), 0x06);
    }

    #[quickcheck]
    fn instruction_byte_roundtrip(instruction: Instruction) -> TestResult {
        let byte = instruction.byte();
        match Instruction::from_byte(byte) {
            Some(roundtrip) if roundtrip == instruction => TestResult::passed(),
            other => TestResult::error(format!(
                "{instruction:?} -> {byte:02X} -> {other:?} =/= Some({instruction:?})"
            )),
        }
    }

    #[quickcheck]
    fn unknown_bytes_are_rejected(byte: u8) -> TestResult {
        if (0x01..=0x06).contains(&byte) {
            return TestResult::discard();
        }
        TestResult::from_bool(Instruction::from_byte(byte).is_none())
    }

    #[quickcheck]
    fn individual_devices_reply_to_everything_but_action(instruction: Instruction, id: u8) -> TestResult {
        if id == BROADCAST {
            return TestResult::discard();
        }
        TestResult::from_bool(instruction.expects_reply(id) == (instruction != Instruction::Action))
    }

    #[test]
    fn broadcast_only_awaits_ping() {
        for &instruction in Instruction::VARIANTS {
            assert_eq!(
                instruction.expects_reply(BROADCAST),
                instruction == Instruction::Ping,
                "{instruction}",
            );
        }
    }
}
