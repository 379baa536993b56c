use super::cursor::{WireReader, WireValue, WireWriter};
use super::entity::EntityType;
use super::enums::ArticulatedTypeMetric;
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArticulatedParts {
    pub class: u32,
    pub type_metric: u32,
    pub value: f32,
}

impl ArticulatedParts {
    pub fn new(class: u32, metric: ArticulatedTypeMetric, value: f32) -> Self {
        Self {
            class,
            type_metric: metric as u32,
            value,
        }
    }

    pub fn metric(&self) -> Result<ArticulatedTypeMetric, CodecError> {
        ArticulatedTypeMetric::try_from(self.type_metric)
    }
}

impl WireValue for ArticulatedParts {
    const ENCODED_LENGTH: usize = 12;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_u32(self.class)?;
        writer.write_u32(self.type_metric)?;
        writer.write_f32(self.value)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            class: reader.read_u32()?,
            type_metric: reader.read_u32()?,
            value: reader.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttachedParts {
    pub station: u32,
    pub store_type: EntityType,
}

impl WireValue for AttachedParts {
    const ENCODED_LENGTH: usize = 12;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_u32(self.station)?;
        self.store_type.encode(writer)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            station: reader.read_u32()?,
            store_type: EntityType::decode(reader)?,
        })
    }
}

const ARTICULATED_PART_DISCRIMINATOR: u32 = 0;
const ATTACHED_PART_DISCRIMINATOR: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Articulated(ArticulatedParts),
    Attached(AttachedParts),
}

impl Default for ParameterValue {
    fn default() -> Self {
        ParameterValue::Articulated(ArticulatedParts::default())
    }
}

impl WireValue for ParameterValue {
    const ENCODED_LENGTH: usize = 16;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        match self {
            ParameterValue::Articulated(parts) => {
                writer.write_u32(ARTICULATED_PART_DISCRIMINATOR)?;
                parts.encode(writer)
            }
            ParameterValue::Attached(parts) => {
                writer.write_u32(ATTACHED_PART_DISCRIMINATOR)?;
                parts.encode(writer)
            }
        }
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        match reader.read_u32()? {
            ARTICULATED_PART_DISCRIMINATOR => {
                ArticulatedParts::decode(reader).map(ParameterValue::Articulated)
            }
            ATTACHED_PART_DISCRIMINATOR => AttachedParts::decode(reader).map(ParameterValue::Attached),
            other => Err(CodecError::BadDiscriminator(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArticulatedParameter {
    pub change: u8,
    pub part_attached_to: u16,
    pub value: ParameterValue,
}

impl WireValue for ArticulatedParameter {
    const ENCODED_LENGTH: usize = 20;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_u8(self.change)?;
        writer.write_zeros(1)?;
        writer.write_u16(self.part_attached_to)?;
        self.value.encode(writer)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        let change = reader.read_u8()?;
        reader.skip(1)?;
        Ok(Self {
            change,
            part_attached_to: reader.read_u16()?,
            value: ParameterValue::decode(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attached_part_writes_station() {
        let parts = AttachedParts {
            station: 0x0A0B0C0D,
            store_type: EntityType::new(2, 2, 225, 1, 0, 0, 0),
        };
        let bytes = parts.to_bytes();
        assert_eq!(&bytes[0..4], &[0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(bytes[4], 2);
    }

    #[test]
    fn articulated_parameter_layout() {
        let param = ArticulatedParameter {
            change: 3,
            part_attached_to: 0x0102,
            value: ParameterValue::Articulated(ArticulatedParts::new(
                4096,
                ArticulatedTypeMetric::Azimuth,
                1.5,
            )),
        };
        let bytes = param.to_bytes();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[0..4], &[3, 0, 1, 2]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &4096u32.to_be_bytes());
        assert_eq!(&bytes[12..16], &11u32.to_be_bytes());
        assert_eq!(ArticulatedParameter::from_bytes(&bytes).unwrap(), param);
    }

    #[test]
    fn unknown_discriminator_is_rejected() {
        let mut bytes = ArticulatedParameter::default().to_bytes();
        bytes[7] = 9;
        assert_eq!(
            ArticulatedParameter::from_bytes(&bytes),
            Err(CodecError::BadDiscriminator(9))
        );
    }
}
