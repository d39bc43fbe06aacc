//! Text (0x09) — Bidirectional.
//!
//! Chat and system messages. The wire format has conditional fields based
//! on TextType. The relay reads serverbound chat for its command surface
//! and injects clientbound replies.

use bytes::{Buf, BufMut};

use crate::codec::{ensure_remaining, read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::varint::VarUInt32;

/// Text message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TextType {
    Raw = 0,
    Chat = 1,
    Translation = 2,
    Popup = 3,
    JukeboxPopup = 4,
    Tip = 5,
    System = 6,
    Whisper = 7,
    Announcement = 8,
    ObjectWhisper = 9,
    Object = 10,
}

impl TextType {
    fn from_u8(v: u8) -> Result<Self, ProtoError> {
        match v {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Chat),
            2 => Ok(Self::Translation),
            3 => Ok(Self::Popup),
            4 => Ok(Self::JukeboxPopup),
            5 => Ok(Self::Tip),
            6 => Ok(Self::System),
            7 => Ok(Self::Whisper),
            8 => Ok(Self::Announcement),
            9 => Ok(Self::ObjectWhisper),
            10 => Ok(Self::Object),
            other => Err(ProtoError::invalid("TextType", other)),
        }
    }

    /// Whether this type carries a SourceName field.
    fn has_source(self) -> bool {
        matches!(self, Self::Chat | Self::Whisper | Self::Announcement)
    }

    /// Whether this type carries a Parameters array.
    fn has_parameters(self) -> bool {
        matches!(self, Self::Translation | Self::Popup | Self::JukeboxPopup)
    }
}

/// Text packet.
#[derive(Debug, Clone)]
pub struct Text {
    pub text_type: TextType,
    pub needs_translation: bool,
    pub source_name: String,
    pub message: String,
    pub parameters: Vec<String>,
    pub xuid: String,
    pub platform_chat_id: String,
    pub filtered_message: String,
}

impl Text {
    /// A Raw message, the type the relay uses for injected feedback.
    pub fn raw(message: impl Into<String>) -> Self {
        Self {
            text_type: TextType::Raw,
            needs_translation: false,
            source_name: String::new(),
            message: message.into(),
            parameters: Vec::new(),
            xuid: String::new(),
            platform_chat_id: String::new(),
            filtered_message: String::new(),
        }
    }
}

impl ProtoEncode for Text {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.text_type as u8);
        buf.put_u8(self.needs_translation as u8);

        if self.text_type.has_source() {
            write_string(buf, &self.source_name);
        }

        write_string(buf, &self.message);

        if self.text_type.has_parameters() {
            VarUInt32(self.parameters.len() as u32).proto_encode(buf);
            for param in &self.parameters {
                write_string(buf, param);
            }
        }

        write_string(buf, &self.xuid);
        write_string(buf, &self.platform_chat_id);
        write_string(buf, &self.filtered_message);
    }
}

impl ProtoDecode for Text {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        ensure_remaining(buf, 2)?;
        let text_type = TextType::from_u8(buf.get_u8())?;
        let needs_translation = buf.get_u8() != 0;

        let source_name = if text_type.has_source() {
            read_string(buf)?
        } else {
            String::new()
        };

        let message = read_string(buf)?;

        let parameters = if text_type.has_parameters() {
            let count = VarUInt32::proto_decode(buf)?.0 as usize;
            let mut params = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                params.push(read_string(buf)?);
            }
            params
        } else {
            Vec::new()
        };

        let xuid = read_string(buf)?;
        let platform_chat_id = read_string(buf)?;
        let filtered_message = read_string(buf)?;

        Ok(Self {
            text_type,
            needs_translation,
            source_name,
            message,
            parameters,
            xuid,
            platform_chat_id,
            filtered_message,
        })
    }
}
