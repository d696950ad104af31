use crate::command::ArmCommand;

/// Wire size of every command frame.
pub const FRAME_SIZE: usize = 6;

/// Sync marker opening every frame.
pub const MAGIC: [u8; 2] = [0xEA, 0xE3];

/// Encode a command into its wire frame.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬──────────────┐
/// │ Magic (2B)   │ Turret       │ Shoulder     │
/// │ 0xEA 0xE3    │ (2B LE)      │ (2B LE)      │
/// └──────────────┴──────────────┴──────────────┘
/// ```
///
/// No checksum, terminator or length field follows.
pub fn encode_frame(command: &ArmCommand) -> [u8; FRAME_SIZE] {
    let mut frame = [0u8; FRAME_SIZE];
    frame[..2].copy_from_slice(&MAGIC);
    frame[2..4].copy_from_slice(&command.turret.to_le_bytes());
    frame[4..6].copy_from_slice(&command.shoulder.to_le_bytes());
    frame
}
