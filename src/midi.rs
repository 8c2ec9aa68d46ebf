//! MIDI message decoding.
//!
//! Decodes the channel voice messages a pedal controller can produce. Only
//! Control Change drives the trigger engine; everything else is decoded far
//! enough to be named in logs and then ignored.

use std::fmt;
use std::time::Instant;

/// Decoded MIDI message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Control Change: channel (0-15), controller (0-127), value (0-127)
    ControlChange { channel: u8, controller: u8, value: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },

    /// Channel Pressure: channel (0-15), pressure (0-127)
    ChannelPressure { channel: u8, pressure: u8 },

    /// Pitch Bend: channel (0-15), value (0-16383, 14-bit)
    PitchBend { channel: u8, value: u16 },

    /// Anything we do not act on (aftertouch, system messages).
    Other { status: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes.
    ///
    /// Returns `None` for empty input, running-status data (no status byte)
    /// and truncated messages.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;

        // Running status would need the previous status byte; pedal hardware
        // sends complete messages, so reject it.
        if status < 0x80 {
            return None;
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            0x80 => {
                let (&note, &velocity) = (data.get(1)?, data.get(2)?);
                Some(MidiMessage::NoteOff { channel, note: note & 0x7F, velocity: velocity & 0x7F })
            }
            0x90 => {
                let (&note, &velocity) = (data.get(1)?, data.get(2)?);
                Some(MidiMessage::NoteOn { channel, note: note & 0x7F, velocity: velocity & 0x7F })
            }
            0xB0 => {
                let (&controller, &value) = (data.get(1)?, data.get(2)?);
                Some(MidiMessage::ControlChange {
                    channel,
                    controller: controller & 0x7F,
                    value: value & 0x7F,
                })
            }
            0xC0 => {
                let &program = data.get(1)?;
                Some(MidiMessage::ProgramChange { channel, program: program & 0x7F })
            }
            0xD0 => {
                let &pressure = data.get(1)?;
                Some(MidiMessage::ChannelPressure { channel, pressure: pressure & 0x7F })
            }
            0xE0 => {
                let (&lsb, &msb) = (data.get(1)?, data.get(2)?);
                let value = (((msb & 0x7F) as u16) << 7) | ((lsb & 0x7F) as u16);
                Some(MidiMessage::PitchBend { channel, value })
            }
            _ => Some(MidiMessage::Other { status }),
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::ControlChange { channel, controller, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, controller, value)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                write!(f, "ChannelPressure ch:{} p:{}", channel + 1, pressure)
            }
            MidiMessage::PitchBend { channel, value } => {
                write!(f, "PitchBend ch:{} v:{}", channel + 1, value)
            }
            MidiMessage::Other { status } => write!(f, "Other status:{:02X}", status),
        }
    }
}

/// A decoded message plus its arrival time, as delivered by the input callback.
#[derive(Debug, Clone)]
pub struct MidiEvent {
    pub timestamp: Instant,
    pub message: MidiMessage,
    pub raw: Vec<u8>,
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_change() {
        let msg = MidiMessage::parse(&[0xB0, 67, 100]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::ControlChange { channel: 0, controller: 67, value: 100 }
        );
    }

    #[test]
    fn parses_control_change_on_other_channel() {
        let msg = MidiMessage::parse(&[0xB3, 66, 30]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::ControlChange { channel: 3, controller: 66, value: 30 }
        );
    }

    #[test]
    fn parses_pitch_bend_center() {
        let msg = MidiMessage::parse(&[0xE0, 0x00, 0x40]).unwrap();
        assert_eq!(msg, MidiMessage::PitchBend { channel: 0, value: 8192 });
    }

    #[test]
    fn rejects_truncated_message() {
        assert_eq!(MidiMessage::parse(&[0xB0, 67]), None);
        assert_eq!(MidiMessage::parse(&[]), None);
    }

    #[test]
    fn rejects_running_status() {
        assert_eq!(MidiMessage::parse(&[67, 100]), None);
    }

    #[test]
    fn system_messages_decode_as_other() {
        assert_eq!(
            MidiMessage::parse(&[0xF8]),
            Some(MidiMessage::Other { status: 0xF8 })
        );
    }

    #[test]
    fn formats_hex() {
        assert_eq!(format_hex(&[0xB0, 67, 100]), "B0 43 64");
    }
}
