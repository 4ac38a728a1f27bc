use ax12_packet::{
    Instruction,
    control_table::{GoalPosition, Item},
    send,
};

const ID: u8 = 1;

fn main() {
    let mut buffer = [0; 16];
    let parameters = [GoalPosition::ADDRESS, 0x00, 0x02];
    match send::encode(&mut buffer, ID, Instruction::WriteData, &parameters) {
        Ok(packet) => println!("{packet:02X?}"),
        Err(e) => eprintln!("{e}"),
    }
}
