use serde::{Deserialize, Serialize};

const MARKING_ASCII: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RprAttributeType {
    WorldCoordinate,
    EulerAngles,
    VelocityVector,
    AngularVelocityVector,
    UnsignedInt,
    UnsignedShort,
    UnsignedChar,
    Float,
    Double,
    EntityType,
    EntityIdentifier,
    EventIdentifier,
    Marking,
    Marking32,
    String,
    Octet,
    ArticulatedPart,
    ArticulatedPartSingle,
    RtiObjectIdStruct,
    TimeTag,
}

impl RprAttributeType {
    pub fn name(self) -> &'static str {
        match self {
            Self::WorldCoordinate => "WORLD_COORDINATE",
            Self::EulerAngles => "EULER_ANGLES",
            Self::VelocityVector => "VELOCITY_VECTOR",
            Self::AngularVelocityVector => "ANGULAR_VELOCITY_VECTOR",
            Self::UnsignedInt => "UNSIGNED_INT",
            Self::UnsignedShort => "UNSIGNED_SHORT",
            Self::UnsignedChar => "UNSIGNED_CHAR",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::EntityType => "ENTITY_TYPE",
            Self::EntityIdentifier => "ENTITY_IDENTIFIER",
            Self::EventIdentifier => "EVENT_IDENTIFIER",
            Self::Marking => "MARKING",
            Self::Marking32 => "MARKING_32",
            Self::String => "STRING",
            Self::Octet => "OCTET",
            Self::ArticulatedPart => "ARTICULATED_PART",
            Self::ArticulatedPartSingle => "ARTICULATED_PART_SINGLE",
            Self::RtiObjectIdStruct => "RTI_OBJECT_ID_STRUCT",
            Self::TimeTag => "TIME_TAG",
        }
    }

    /// Maximum number of bytes a value of this type occupies on the wire.
    pub fn encoded_length(self) -> usize {
        match self {
            Self::WorldCoordinate => 24,
            Self::EulerAngles | Self::VelocityVector | Self::AngularVelocityVector => 12,
            Self::UnsignedInt | Self::Float => 4,
            Self::UnsignedShort => 2,
            Self::UnsignedChar => 1,
            Self::Double | Self::EntityType => 8,
            Self::EntityIdentifier => 6,
            Self::EventIdentifier => 5,
            Self::Marking => 12,
            Self::Marking32 => 32,
            Self::String | Self::RtiObjectIdStruct => 128,
            Self::Octet => 65535,
            Self::ArticulatedPart => 512,
            Self::ArticulatedPartSingle => 20,
            Self::TimeTag => 17,
        }
    }

    /// Variable sized values may arrive shorter than `encoded_length`.
    pub fn is_variable_length(self) -> bool {
        matches!(
            self,
            Self::String | Self::Octet | Self::ArticulatedPart | Self::RtiObjectIdStruct
        )
    }

    pub fn accepts_length(self, len: usize) -> bool {
        if self.is_variable_length() {
            len <= self.encoded_length()
        } else {
            len == self.encoded_length()
        }
    }
}

pub fn encode_marking(text: &str, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    if let Some(first) = buf.first_mut() {
        *first = MARKING_ASCII;
    }
    for (slot, byte) in buf.iter_mut().skip(1).zip(text.bytes()) {
        *slot = byte;
    }
    buf
}

pub fn decode_marking(bytes: &[u8]) -> String {
    bytes
        .iter()
        .skip(1)
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_is_ascii_prefixed_and_padded() {
        let bytes = encode_marking("T72", 12);
        assert_eq!(bytes, vec![1, b'T', b'7', b'2', 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_marking(&bytes), "T72");
    }

    #[test]
    fn marking_truncates_to_field() {
        let bytes = encode_marking("ABCDEFGHIJKLMNOP", 12);
        assert_eq!(decode_marking(&bytes), "ABCDEFGHIJK");
    }

    #[test]
    fn fixed_types_demand_exact_length() {
        assert!(RprAttributeType::EntityIdentifier.accepts_length(6));
        assert!(!RprAttributeType::EntityIdentifier.accepts_length(5));
        assert!(RprAttributeType::ArticulatedPart.accepts_length(40));
        assert!(!RprAttributeType::ArticulatedPart.accepts_length(513));
    }
}
