// Wire frames sent to the host

use imu_traits::ImuError;

pub const FRAME_SIZE: usize = 4;
/// Last byte of every frame. Never a valid channel id.
pub const TERMINATOR: u8 = 0xFF;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    Pitch = 0x00,
    Roll = 0x01,
    Click = 0x02,
}

impl TryFrom<u8> for ChannelId {
    type Error = ImuError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(ChannelId::Pitch),
            0x01 => Ok(ChannelId::Roll),
            0x02 => Ok(ChannelId::Click),
            _ => Err(ImuError::InvalidPacket(format!(
                "Unknown channel: {}",
                value
            ))),
        }
    }
}

/// Packs `value` as `[channel, hi, lo, 0xFF]`.
///
/// Only the low 16 bits of `value` are sent, so anything outside the `i16`
/// range wraps (two's complement).
pub fn encode(channel: ChannelId, value: i32) -> [u8; FRAME_SIZE] {
    [
        channel as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
        TERMINATOR,
    ]
}

/// Wire-format counterpart of [`encode`]: returns the channel and the signed
/// 16-bit payload.
pub fn decode(frame: &[u8; FRAME_SIZE]) -> Result<(ChannelId, i16), ImuError> {
    if frame[3] != TERMINATOR {
        return Err(ImuError::InvalidPacket(format!(
            "Bad terminator: 0x{:02X}",
            frame[3]
        )));
    }
    let channel = ChannelId::try_from(frame[0])?;
    Ok((channel, i16::from_be_bytes([frame[1], frame[2]])))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFrame {
    /// Whole degrees, already sign-adjusted for the host.
    Pitch(i32),
    /// Whole degrees, already sign-adjusted for the host.
    Roll(i32),
    /// Absolute raw Y acceleration (LSB).
    Click { magnitude: u16 },
}

impl OutputFrame {
    pub fn channel(&self) -> ChannelId {
        match self {
            OutputFrame::Pitch(_) => ChannelId::Pitch,
            OutputFrame::Roll(_) => ChannelId::Roll,
            OutputFrame::Click { .. } => ChannelId::Click,
        }
    }

    /// The 16-bit value carried on the wire.
    ///
    /// Clicks carry `magnitude >> 8` in the low byte with the high byte forced
    /// to zero, as the firmware sends them. The low 8 bits of the magnitude
    /// never reach the host.
    pub fn wire_value(&self) -> i32 {
        match *self {
            OutputFrame::Pitch(degrees) | OutputFrame::Roll(degrees) => degrees,
            OutputFrame::Click { magnitude } => i32::from(magnitude >> 8) & 0xFF,
        }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        encode(self.channel(), self.wire_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_value_is_twos_complement() {
        let bytes = encode(ChannelId::Pitch, -300);
        assert_eq!(bytes, [0x00, 0xFE, 0xD4, 0xFF]);
        assert_eq!(decode(&bytes).unwrap(), (ChannelId::Pitch, -300));
    }

    #[test]
    fn positive_value() {
        assert_eq!(encode(ChannelId::Roll, 45), [0x01, 0x00, 0x2D, 0xFF]);
        assert_eq!(encode(ChannelId::Roll, 0x1234), [0x01, 0x12, 0x34, 0xFF]);
    }

    #[test]
    fn out_of_range_values_wrap() {
        assert_eq!(encode(ChannelId::Pitch, 0x1_0005), [0x00, 0x00, 0x05, 0xFF]);
        let (_, value) = decode(&encode(ChannelId::Pitch, 40_000)).unwrap();
        assert_eq!(value, (40_000_i32 - 65_536) as i16);
    }

    #[test]
    fn decode_rejects_malformed_frames() {
        assert!(matches!(
            decode(&[0x00, 0x00, 0x01, 0x00]),
            Err(ImuError::InvalidPacket(_))
        ));
        assert!(matches!(
            decode(&[0x07, 0x00, 0x01, 0xFF]),
            Err(ImuError::InvalidPacket(_))
        ));
        assert!(ChannelId::try_from(TERMINATOR).is_err());
    }

    #[test]
    fn angle_frames() {
        assert_eq!(OutputFrame::Pitch(-12).to_bytes(), [0x00, 0xFF, 0xF4, 0xFF]);
        assert_eq!(OutputFrame::Roll(7).to_bytes(), [0x01, 0x00, 0x07, 0xFF]);
    }

    #[test]
    fn click_frame_high_byte_is_zero() {
        // 17000 >> 8 == 66
        let frame = OutputFrame::Click { magnitude: 17_000 };
        assert_eq!(frame.to_bytes(), [0x02, 0x00, 0x42, 0xFF]);
        // 0x42FF: the low byte of the magnitude is discarded.
        assert_eq!(
            OutputFrame::Click { magnitude: 0x42FF }.to_bytes(),
            frame.to_bytes()
        );

        let strongest = OutputFrame::Click { magnitude: 32_768 };
        assert_eq!(strongest.to_bytes(), [0x02, 0x00, 0x80, 0xFF]);
        assert_eq!(decode(&strongest.to_bytes()).unwrap(), (ChannelId::Click, 128));
    }
}
