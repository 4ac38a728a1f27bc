use core::fmt;

/// One bit of the error byte in a status packet.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(test, derive(strum_macros::VariantArray))]
pub enum Alarm {
    InputVoltage = 0x01,
    AngleLimit = 0x02,
    Overheating = 0x04,
    Range = 0x08,
    Checksum = 0x10,
    Overload = 0x20,
    Instruction = 0x40,
}

impl Alarm {
    pub const ALL: [Self; 7] = [
        Self::InputVoltage,
        Self::AngleLimit,
        Self::Overheating,
        Self::Range,
        Self::Checksum,
        Self::Overload,
        Self::Instruction,
    ];

    #[inline(always)]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InputVoltage => "input voltage out of the configured range",
            Self::AngleLimit => "goal position outside the angle limits",
            Self::Overheating => "internal temperature above the limit",
            Self::Range => "instruction argument out of range",
            Self::Checksum => "checksum of the instruction packet is wrong",
            Self::Overload => "load cannot be held with the configured torque",
            Self::Instruction => "undefined instruction, or Action without Reg Write",
        }
    }
}

impl fmt::Display for Alarm {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Error byte reported by the most recent status packet of a device.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorStatus(pub u8);

impl ErrorStatus {
    pub const OK: Self = Self(0);

    #[inline(always)]
    pub const fn byte(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn contains(self, alarm: Alarm) -> bool {
        self.0 & alarm.bit() != 0
    }

    #[inline]
    pub fn alarms(self) -> impl Iterator<Item = Alarm> {
        Alarm::ALL.into_iter().filter(move |&alarm| self.contains(alarm))
    }
}

impl From<u8> for ErrorStatus {
    #[inline(always)]
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

impl fmt::Display for ErrorStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("no error");
        }
        let mut first = true;
        for alarm in self.alarms() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            fmt::Display::fmt(&alarm, f)?;
        }
        if self.0 & 0x80 != 0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "undocumented bit 7 set")?;
        }
        Ok(())
    }
}
