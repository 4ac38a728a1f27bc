use ax12_packet::{
    Instruction,
    constants::BROADCAST,
    control_table::{Item, TorqueEnable},
    send,
};

fn main() {
    let mut buffer = [0; 16];
    let parameters = [TorqueEnable::ADDRESS, 1];
    match send::encode(&mut buffer, BROADCAST, Instruction::WriteData, &parameters) {
        Ok(packet) => println!("{packet:02X?}"),
        Err(e) => eprintln!("{e}"),
    }
}
