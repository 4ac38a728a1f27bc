//! AX-12 control table.
//!
//! Only the width of each register matters to the protocol engine; the names
//! are here so callers don't have to scatter magic addresses around.

pub trait Item {
    const ADDRESS: u8;
    const BYTES: u8;
    const DESCRIPTION: &'static str;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub address: u8,
    pub bytes: u8,
    pub description: &'static str,
}

macro_rules! control_table {
    ($($id:ident = $address:literal, $bytes:literal, $description:literal;)*) => {
        $(
            #[doc = $description]
            #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
            pub struct $id;
            impl Item for $id {
                const ADDRESS: u8 = $address;
                const BYTES: u8 = $bytes;
                const DESCRIPTION: &'static str = $description;
            }
        )*

        /// Every known register, in address order.
        pub const REGISTERS: &[Register] = &[
            $(Register { address: $address, bytes: $bytes, description: $description },)*
        ];

        /// Width in bytes of the register starting at `address`, or 0 if no register starts there.
        ///
        /// 0 means "unsupported", never "empty": callers must not send a zero-width write.
        #[inline]
        pub const fn width_of(address: u8) -> u8 {
            match address {
                $($address => $bytes,)*
                _ => 0,
            }
        }
    };
}

control_table! {
    ModelNumber = 0, 2, "Model Number";
    FirmwareVersion = 2, 1, "Version of Firmware";
    Id = 3, 1, "ID";
    BaudRate = 4, 1, "Baud Rate";
    ReturnDelayTime = 5, 1, "Return Delay Time";
    CwAngleLimit = 6, 2, "CW Angle Limit";
    CcwAngleLimit = 8, 2, "CCW Angle Limit";
    TemperatureLimit = 11, 1, "Highest Limit Temperature";
    MinVoltageLimit = 12, 1, "Lowest Limit Voltage";
    MaxVoltageLimit = 13, 1, "Highest Limit Voltage";
    MaxTorque = 14, 2, "Max Torque";
    StatusReturnLevel = 16, 1, "Status Return Level";
    AlarmLed = 17, 1, "Alarm LED";
    AlarmShutdown = 18, 1, "Alarm Shutdown";
    Reserved = 19, 1, "(Reserved)";
    DownCalibration = 20, 2, "Down Calibration";
    UpCalibration = 22, 2, "Up Calibration";
    TorqueEnable = 24, 1, "Torque Enable";
    Led = 25, 1, "LED";
    CwComplianceMargin = 26, 1, "CW Compliance Margin";
    CcwComplianceMargin = 27, 1, "CCW Compliance Margin";
    CwComplianceSlope = 28, 1, "CW Compliance Slope";
    CcwComplianceSlope = 29, 1, "CCW Compliance Slope";
    GoalPosition = 30, 2, "Goal Position";
    MovingSpeed = 32, 2, "Moving Speed";
    TorqueLimit = 34, 2, "Torque Limit";
    PresentPosition = 36, 2, "Present Position";
    PresentSpeed = 38, 2, "Present Speed";
    PresentLoad = 40, 2, "Present Load";
    PresentVoltage = 42, 1, "Present Voltage";
    PresentTemperature = 43, 1, "Present Temperature";
    RegisteredInstruction = 44, 1, "Registered Instruction";
    Moving = 46, 1, "Moving";
    Lock = 47, 1, "Lock";
    Punch = 48, 2, "Punch";
}
