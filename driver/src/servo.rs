use {
    crate::{bus::Bus, comm::Comm, device::Device, mutex::Mutex},
    ax12_packet::{
        ErrorStatus,
        control_table::{self, CcwAngleLimit, CwAngleLimit, Item, PresentPosition},
    },
    core::marker::PhantomData,
    paste::paste,
};

/// Largest goal position, angle limit, or speed magnitude.
pub const VALUE_MAX: u16 = 0x3FF;

/// Set in speed and load readings when the motion is clockwise.
pub const CLOCKWISE: u16 = 1 << 10;

macro_rules! instruction_method {
    ($id:ident) => {
        #[inline(always)]
        pub async fn $id(&mut self) -> Result<(), crate::Error<C, M>> {
            self.bus
                .lock()
                .await
                .map_err(crate::Error::Mutex)?
                .$id(&mut self.device)
                .await
                .map_err(crate::Error::Bus)
        }
    };
}

macro_rules! control_table_methods {
    ($id:ident, $bits:literal) => {
        paste! {
            #[inline]
            pub async fn [< read_ $id:snake >](&mut self) -> Result<[< u $bits >], crate::Error<C, M>> {
                self.bus
                    .lock()
                    .await
                    .map_err(crate::Error::Mutex)?
                    .read_item::<control_table::$id>(&mut self.device)
                    .await
                    .map(|value| value as [< u $bits >])
                    .map_err(crate::Error::Bus)
            }

            #[inline]
            pub async fn [< write_ $id:snake >](&mut self, value: [< u $bits >]) -> Result<(), crate::Error<C, M>> {
                self.bus
                    .lock()
                    .await
                    .map_err(crate::Error::Mutex)?
                    .write_item::<control_table::$id>(&mut self.device, u16::from(value))
                    .await
                    .map_err(crate::Error::Bus)
            }

            #[inline]
            pub async fn [< reg_write_ $id:snake >](&mut self, value: [< u $bits >]) -> Result<(), crate::Error<C, M>> {
                self.bus
                    .lock()
                    .await
                    .map_err(crate::Error::Mutex)?
                    .reg_write_item::<control_table::$id>(&mut self.device, u16::from(value))
                    .await
                    .map_err(crate::Error::Bus)
            }
        }
    };
}

/// Position, speed and load as one consistent snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PresentState {
    pub position: u16,
    pub speed: u16,
    pub load: u16,
}

#[inline]
const fn signed(raw: u16) -> i16 {
    let magnitude = (raw & VALUE_MAX) as i16;
    if raw & CLOCKWISE == 0 {
        magnitude
    } else {
        -magnitude
    }
}

impl PresentState {
    /// Positive counterclockwise, negative clockwise.
    #[inline(always)]
    pub const fn signed_speed(&self) -> i16 {
        signed(self.speed)
    }

    /// Positive counterclockwise, negative clockwise.
    #[inline(always)]
    pub const fn signed_load(&self) -> i16 {
        signed(self.load)
    }
}

/// One servo on a shared bus. Every call takes the bus lock for exactly one exchange.
pub struct Servo<'bus, C: Comm, M: Mutex<Item = Bus<C>>> {
    bus: &'bus M,
    device: Device,
    comm: PhantomData<C>,
}

impl<'bus, C: Comm, M: Mutex<Item = Bus<C>>> Servo<'bus, C, M> {
    #[inline(always)]
    pub const fn new(bus: &'bus M, id: u8) -> Self {
        Self {
            bus,
            device: Device::new(id),
            comm: PhantomData,
        }
    }

    /// Like `new`, but only once the servo has answered a ping.
    #[inline]
    pub async fn connect(bus: &'bus M, id: u8) -> Result<Self, crate::Error<C, M>> {
        let mut servo = Self::new(bus, id);
        let () = servo.ping().await?;
        info!("Connected to servo {}", id);
        Ok(servo)
    }

    #[inline(always)]
    pub const fn device(&self) -> Device {
        self.device
    }

    #[inline(always)]
    pub const fn id(&self) -> u8 {
        self.device.id()
    }

    #[inline(always)]
    pub const fn error_status(&self) -> ErrorStatus {
        self.device.error_status()
    }

    instruction_method!(ping);
    instruction_method!(action);
    instruction_method!(reset);

    #[inline]
    pub async fn change_id(&mut self, id: u8) -> Result<(), crate::Error<C, M>> {
        self.bus
            .lock()
            .await
            .map_err(crate::Error::Mutex)?
            .change_id(&mut self.device, id)
            .await
            .map_err(crate::Error::Bus)
    }

    /// Wheel mode (both angle limits 0) or back to joint mode (the full 0 to 1023 range).
    #[inline]
    pub async fn set_endless_turn(&mut self, enabled: bool) -> Result<(), crate::Error<C, M>> {
        let ccw_limit = if enabled { 0 } else { VALUE_MAX };
        let mut bus = self.bus.lock().await.map_err(crate::Error::Mutex)?;
        let () = bus
            .write_item::<CwAngleLimit>(&mut self.device, 0)
            .await
            .map_err(crate::Error::Bus)?;
        bus.write_item::<CcwAngleLimit>(&mut self.device, ccw_limit)
            .await
            .map_err(crate::Error::Bus)
    }

    /// Spin in wheel mode: positive counterclockwise, negative clockwise, magnitude capped at 1023.
    #[inline]
    pub async fn turn(&mut self, speed: i16) -> Result<(), crate::Error<C, M>> {
        let magnitude = if speed.unsigned_abs() > VALUE_MAX {
            VALUE_MAX
        } else {
            speed.unsigned_abs()
        };
        let value = if speed < 0 {
            magnitude | CLOCKWISE
        } else {
            magnitude
        };
        self.write_moving_speed(value).await
    }

    /// Position, speed and load in a single read.
    #[inline]
    pub async fn present_state(&mut self) -> Result<PresentState, crate::Error<C, M>> {
        let mut bytes = [0; 6];
        let () = self
            .bus
            .lock()
            .await
            .map_err(crate::Error::Mutex)?
            .read(&mut self.device, PresentPosition::ADDRESS, &mut bytes)
            .await
            .map_err(crate::Error::Bus)?;
        let [p_lo, p_hi, s_lo, s_hi, l_lo, l_hi] = bytes;
        Ok(PresentState {
            position: u16::from_le_bytes([p_lo, p_hi]),
            speed: u16::from_le_bytes([s_lo, s_hi]),
            load: u16::from_le_bytes([l_lo, l_hi]),
        })
    }

    control_table_methods!(ModelNumber, 16);
    control_table_methods!(FirmwareVersion, 8);
    control_table_methods!(BaudRate, 8);
    control_table_methods!(ReturnDelayTime, 8);
    control_table_methods!(CwAngleLimit, 16);
    control_table_methods!(CcwAngleLimit, 16);
    control_table_methods!(TemperatureLimit, 8);
    control_table_methods!(MinVoltageLimit, 8);
    control_table_methods!(MaxVoltageLimit, 8);
    control_table_methods!(MaxTorque, 16);
    control_table_methods!(StatusReturnLevel, 8);
    control_table_methods!(AlarmLed, 8);
    control_table_methods!(AlarmShutdown, 8);
    control_table_methods!(DownCalibration, 16);
    control_table_methods!(UpCalibration, 16);
    control_table_methods!(TorqueEnable, 8);
    control_table_methods!(Led, 8);
    control_table_methods!(CwComplianceMargin, 8);
    control_table_methods!(CcwComplianceMargin, 8);
    control_table_methods!(CwComplianceSlope, 8);
    control_table_methods!(CcwComplianceSlope, 8);
    control_table_methods!(GoalPosition, 16);
    control_table_methods!(MovingSpeed, 16);
    control_table_methods!(TorqueLimit, 16);
    control_table_methods!(PresentPosition, 16);
    control_table_methods!(PresentSpeed, 16);
    control_table_methods!(PresentLoad, 16);
    control_table_methods!(PresentVoltage, 8);
    control_table_methods!(PresentTemperature, 8);
    control_table_methods!(RegisteredInstruction, 8);
    control_table_methods!(Moving, 8);
    control_table_methods!(Lock, 8);
    control_table_methods!(Punch, 16);
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::{bus, config::Config, test_util::Script},
        embassy_futures::block_on,
        embassy_sync::blocking_mutex::raw::NoopRawMutex,
    };

    type Shared = embassy_sync::mutex::Mutex<NoopRawMutex, Bus<Script>>;

    const ACK_1: [u8; 6] = [0xFF, 0xFF, 0x01, 0x02, 0x00, 0xFC];

    fn shared(script: Script) -> Shared {
        <Shared as Mutex>::new(Bus::with_config(
            script,
            Config::new().with_polls_per_byte(5),
        ))
    }

    fn sent(bus: Shared) -> Vec<u8> {
        bus.into_inner().into_comm().sent
    }

    #[test]
    fn write_goal_position() {
        let bus = shared(Script::new().reply(&ACK_1));
        let mut servo = Servo::new(&bus, 1);
        assert!(block_on(servo.write_goal_position(512)).is_ok());
        assert_eq!(
            sent(bus),
            [0xFF, 0xFF, 0x01, 0x05, 0x03, 0x1E, 0x00, 0x02, 0xD6],
        );
    }

    #[test]
    fn read_present_temperature() {
        let bus = shared(Script::new().reply(&[0xFF, 0xFF, 0x01, 0x03, 0x00, 0x20, 0xDB]));
        let mut servo = Servo::new(&bus, 1);
        assert!(matches!(block_on(servo.read_present_temperature()), Ok(32)));
        assert_eq!(
            sent(bus),
            [0xFF, 0xFF, 0x01, 0x04, 0x02, 0x2B, 0x01, 0xCC],
        );
    }

    #[test]
    fn turn_clockwise_sets_direction_bit() {
        let bus = shared(Script::new().reply(&ACK_1));
        let mut servo = Servo::new(&bus, 1);
        assert!(block_on(servo.turn(-100)).is_ok());
        assert_eq!(
            sent(bus),
            [0xFF, 0xFF, 0x01, 0x05, 0x03, 0x20, 0x64, 0x04, 0x6E],
        );
    }

    #[test]
    fn turn_caps_speed() {
        let bus = shared(Script::new().reply(&ACK_1));
        let mut servo = Servo::new(&bus, 1);
        assert!(block_on(servo.turn(2000)).is_ok());
        assert_eq!(
            sent(bus),
            [0xFF, 0xFF, 0x01, 0x05, 0x03, 0x20, 0xFF, 0x03, 0xD4],
        );
    }

    #[test]
    fn endless_turn_clears_both_limits() {
        let bus = shared(Script::new().reply(&ACK_1).reply(&ACK_1));
        let mut servo = Servo::new(&bus, 1);
        assert!(block_on(servo.set_endless_turn(true)).is_ok());
        assert_eq!(
            sent(bus),
            [
                0xFF, 0xFF, 0x01, 0x05, 0x03, 0x06, 0x00, 0x00, 0xF0, // clockwise limit
                0xFF, 0xFF, 0x01, 0x05, 0x03, 0x08, 0x00, 0x00, 0xEE, // counterclockwise limit
            ],
        );
    }

    #[test]
    fn present_state() {
        let bus = shared(Script::new().reply(&[
            0xFF, 0xFF, 0x01, 0x08, 0x00, 0x00, 0x02, 0x64, 0x04, 0x0A, 0x00, 0x82,
        ]));
        let mut servo = Servo::new(&bus, 1);
        let state = match block_on(servo.present_state()) {
            Ok(ok) => ok,
            Err(e) => panic!("{e:?}"),
        };
        assert_eq!(
            state,
            PresentState {
                position: 512,
                speed: 0x0464,
                load: 10,
            },
        );
        assert_eq!(state.signed_speed(), -100);
        assert_eq!(state.signed_load(), 10);
        assert_eq!(
            sent(bus),
            [0xFF, 0xFF, 0x01, 0x04, 0x02, 0x24, 0x06, 0xCE],
        );
    }

    #[test]
    fn change_id_moves_the_handle() {
        let bus = shared(Script::new().reply(&[0xFF, 0xFF, 0x05, 0x02, 0x00, 0xF8]));
        let mut servo = Servo::new(&bus, 1);
        assert!(block_on(servo.change_id(5)).is_ok());
        assert_eq!(servo.id(), 5);
    }

    #[test]
    fn connect_needs_an_answer() {
        let bus = shared(Script::new().silence());
        let result = block_on(Servo::connect(&bus, 1));
        assert!(matches!(
            result,
            Err(crate::Error::Bus(bus::Error::TimedOut { polls: 5 })),
        ));
    }

    #[test]
    fn two_handles_share_one_bus() {
        let bus = shared(Script::new().reply(&ACK_1).reply(&[0xFF, 0xFF, 0x02, 0x02, 0x00, 0xFB]));
        let mut first = Servo::new(&bus, 1);
        let mut second = Servo::new(&bus, 2);
        assert!(block_on(first.ping()).is_ok());
        assert!(block_on(second.ping()).is_ok());
        assert_eq!(
            sent(bus),
            [
                0xFF, 0xFF, 0x01, 0x02, 0x01, 0xFB, // first
                0xFF, 0xFF, 0x02, 0x02, 0x01, 0xFA, // second
            ],
        );
    }
}
