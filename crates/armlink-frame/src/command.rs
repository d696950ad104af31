use serde::{Deserialize, Serialize};

use crate::codec::{encode_frame, FRAME_SIZE};
use crate::error::Result;

/// Bus topic carrying arm commands.
pub const ARM_COMMAND_TOPIC: &str = "arm_command";

/// One arm position command.
///
/// Any `u16` is a valid position. On the bus the fields may also be spelled
/// `tur` and `sh`; unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmCommand {
    #[serde(alias = "tur")]
    pub turret: u16,
    #[serde(alias = "sh")]
    pub shoulder: u16,
}

impl ArmCommand {
    pub fn new(turret: u16, shoulder: u16) -> Self {
        Self { turret, shoulder }
    }

    /// Parse a JSON bus message.
    pub fn from_json(message: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(message)?)
    }

    /// The wire frame for this command.
    pub fn to_frame(&self) -> [u8; FRAME_SIZE] {
        encode_frame(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;

    #[test]
    fn to_frame_matches_reference_vector() {
        let frame = ArmCommand::new(0x1234, 0xABCD).to_frame();
        assert_eq!(frame, [0xEA, 0xE3, 0x34, 0x12, 0xCD, 0xAB]);
    }

    #[test]
    fn to_frame_covers_range_edges() {
        for (turret, shoulder) in [(0u16, 0u16), (u16::MAX, 0), (0, u16::MAX), (0x00FF, 0xFF00)] {
            let frame = ArmCommand::new(turret, shoulder).to_frame();
            assert_eq!(
                frame,
                [
                    0xEA,
                    0xE3,
                    (turret & 0xFF) as u8,
                    (turret >> 8) as u8,
                    (shoulder & 0xFF) as u8,
                    (shoulder >> 8) as u8,
                ]
            );
        }
    }

    #[test]
    fn parses_full_field_names() {
        let cmd = ArmCommand::from_json(br#"{"turret": 1500, "shoulder": 900}"#).unwrap();
        assert_eq!(cmd, ArmCommand::new(1500, 900));
    }

    #[test]
    fn parses_short_aliases_and_ignores_extra_fields() {
        let cmd =
            ArmCommand::from_json(br#"{"tur": 10, "sh": 20, "elbow": 7, "camnum": 2}"#).unwrap();
        assert_eq!(cmd, ArmCommand::new(10, 20));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = ArmCommand::from_json(br#"{"turret": 65536, "shoulder": 0}"#).unwrap_err();
        assert!(matches!(err, FrameError::InvalidCommand(_)));

        let err = ArmCommand::from_json(br#"{"turret": -1, "shoulder": 0}"#).unwrap_err();
        assert!(matches!(err, FrameError::InvalidCommand(_)));
    }

    #[test]
    fn rejects_missing_fields_and_garbage() {
        assert!(ArmCommand::from_json(br#"{"turret": 5}"#).is_err());
        assert!(ArmCommand::from_json(b"not json").is_err());
    }
}
