use glam::DVec3;

use crate::actor::{GameType, PropertyValue};
use crate::codec::{
    ArticulatedParameter, EntityIdentifier, EntityType, EulerAngles, EventIdentifier,
    RprAttributeType, Tag, VelocityVector, WireValue, WorldCoordinate, decode_marking,
    encode_marking,
};
use crate::error::CodecError;
use crate::mapping::{IdentityTable, ParameterDefinition};

/// A wire value before it is shaped into any particular game type.
#[derive(Debug, Clone, PartialEq)]
enum WireScalar {
    Unsigned(u64),
    Real(f64),
    Vector(DVec3),
    EntityType(EntityType),
    EntityId(EntityIdentifier),
    Text(String),
    Octets(Vec<u8>),
    Articulations(Vec<ArticulatedParameter>),
}

/// Converts between RPR-FOM wire values and game property values. Actor
/// references are resolved through the identity table in both directions.
pub struct ParameterTranslator<'a> {
    table: &'a IdentityTable,
}

impl<'a> ParameterTranslator<'a> {
    pub fn new(table: &'a IdentityTable) -> Self {
        Self { table }
    }

    /// One decoded value per definition. `None` marks a value that could not
    /// be resolved, such as an entity id no actor is mapped to.
    pub fn decode(
        &self,
        hla_type: RprAttributeType,
        bytes: &[u8],
        definitions: &[ParameterDefinition],
    ) -> Result<Vec<Option<PropertyValue>>, CodecError> {
        let scalar = decode_scalar(hla_type, bytes)?;
        definitions
            .iter()
            .map(|def| self.to_game(hla_type, &scalar, def))
            .collect()
    }

    /// Encodes the first present value. `Ok(None)` means there is nothing
    /// worth sending, for instance an actor reference with no RTI id.
    pub fn encode(
        &self,
        hla_type: RprAttributeType,
        values: &[Option<PropertyValue>],
        definitions: &[ParameterDefinition],
    ) -> Result<Option<Vec<u8>>, CodecError> {
        let Some((value, def)) = values
            .iter()
            .zip(definitions)
            .find_map(|(v, d)| v.as_ref().map(|v| (v, d)))
        else {
            return Ok(None);
        };

        let mismatch = || CodecError::TypeMismatch {
            hla_type: hla_type.name(),
            game_type: value.game_type().name(),
        };

        let bytes = match hla_type {
            RprAttributeType::WorldCoordinate => {
                WorldCoordinate(value.as_dvec3().ok_or_else(mismatch)?).to_bytes()
            }
            RprAttributeType::EulerAngles => {
                EulerAngles::from(value.as_vec3().ok_or_else(mismatch)?).to_bytes()
            }
            RprAttributeType::VelocityVector | RprAttributeType::AngularVelocityVector => {
                VelocityVector(value.as_vec3().ok_or_else(mismatch)?).to_bytes()
            }
            RprAttributeType::UnsignedInt => {
                let v = integer_value(value, def).ok_or_else(mismatch)?;
                (v.min(u32::MAX as u64) as u32).to_be_bytes().to_vec()
            }
            RprAttributeType::UnsignedShort => {
                let v = integer_value(value, def).ok_or_else(mismatch)?;
                (v.min(u16::MAX as u64) as u16).to_be_bytes().to_vec()
            }
            RprAttributeType::UnsignedChar => {
                let v = integer_value(value, def).ok_or_else(mismatch)?;
                vec![v.min(u8::MAX as u64) as u8]
            }
            RprAttributeType::Float => {
                (value.as_f64().ok_or_else(mismatch)? as f32).to_be_bytes().to_vec()
            }
            RprAttributeType::Double => value.as_f64().ok_or_else(mismatch)?.to_be_bytes().to_vec(),
            RprAttributeType::EntityType => match value {
                PropertyValue::EntityType(et) => et.to_bytes(),
                PropertyValue::String(s) | PropertyValue::Enumeration(s) => {
                    s.parse::<EntityType>()?.to_bytes()
                }
                _ => return Err(mismatch()),
            },
            RprAttributeType::EntityIdentifier => match value {
                PropertyValue::Actor(id) => match self.table.get_entity_id(*id) {
                    Some(eid) => eid.to_bytes(),
                    None => vec![0u8; EntityIdentifier::ENCODED_LENGTH],
                },
                _ => return Err(mismatch()),
            },
            RprAttributeType::EventIdentifier => {
                let v = value.as_u64().ok_or_else(mismatch)?;
                EventIdentifier {
                    event_number: v.min(u16::MAX as u64) as u16,
                }
                .to_bytes()
            }
            RprAttributeType::Marking | RprAttributeType::Marking32 => {
                encode_marking(value.as_str().ok_or_else(mismatch)?, hla_type.encoded_length())
            }
            RprAttributeType::String => {
                let text = value.as_str().ok_or_else(mismatch)?;
                nul_terminated(text, hla_type.encoded_length())
            }
            RprAttributeType::Octet => {
                let text = value.as_str().ok_or_else(mismatch)?;
                if text.len() > hla_type.encoded_length() {
                    return Err(CodecError::TooLong {
                        len: text.len(),
                        max: hla_type.encoded_length(),
                    });
                }
                text.as_bytes().to_vec()
            }
            RprAttributeType::RtiObjectIdStruct => match value {
                PropertyValue::Actor(id) => match self.table.get_rti_id(*id) {
                    Some(rti_id) if !rti_id.is_empty() => {
                        nul_terminated(rti_id, hla_type.encoded_length())
                    }
                    _ => return Ok(None),
                },
                PropertyValue::String(s) | PropertyValue::Enumeration(s) => {
                    nul_terminated(s, hla_type.encoded_length())
                }
                _ => return Err(mismatch()),
            },
            RprAttributeType::ArticulatedPart => match value {
                PropertyValue::Articulations(parts) => {
                    let max = hla_type.encoded_length() / ArticulatedParameter::ENCODED_LENGTH;
                    if parts.len() > max {
                        log::warn!(
                            "Sending {} of {} articulated parameters",
                            max,
                            parts.len()
                        );
                    }
                    parts.iter().take(max).flat_map(|p| p.to_bytes()).collect()
                }
                _ => return Err(mismatch()),
            },
            RprAttributeType::ArticulatedPartSingle => match value {
                PropertyValue::Articulations(parts) => match parts.first() {
                    Some(part) => part.to_bytes(),
                    None => return Ok(None),
                },
                _ => return Err(mismatch()),
            },
            RprAttributeType::TimeTag => Tag(value.as_f64().ok_or_else(mismatch)?).to_bytes(),
        };
        Ok(Some(bytes))
    }

    fn to_game(
        &self,
        hla_type: RprAttributeType,
        scalar: &WireScalar,
        def: &ParameterDefinition,
    ) -> Result<Option<PropertyValue>, CodecError> {
        let mismatch = || CodecError::TypeMismatch {
            hla_type: hla_type.name(),
            game_type: def.game_type.name(),
        };

        let value = match (scalar, def.game_type) {
            (WireScalar::Unsigned(n), GameType::Bool) => PropertyValue::Bool(*n != 0),
            (WireScalar::Unsigned(n), GameType::Int) => PropertyValue::Int(*n as i64),
            (WireScalar::Unsigned(n), GameType::UInt) => PropertyValue::UInt(*n),
            (WireScalar::Unsigned(n), GameType::Float) => PropertyValue::Float(*n as f32),
            (WireScalar::Unsigned(n), GameType::Double) => PropertyValue::Double(*n as f64),
            (WireScalar::Unsigned(n), GameType::String) => PropertyValue::String(n.to_string()),
            (WireScalar::Unsigned(n), GameType::Enumeration) => {
                let hla = u32::try_from(*n).unwrap_or(u32::MAX);
                match def.game_enum_value(hla) {
                    Some(name) => PropertyValue::Enumeration(name),
                    None => {
                        log::warn!("No enumeration value of \"{}\" for {}", def.game_name, n);
                        return Ok(None);
                    }
                }
            }
            (WireScalar::Real(v), GameType::Float) => PropertyValue::Float(*v as f32),
            (WireScalar::Real(v), GameType::Double) => PropertyValue::Double(*v),
            (WireScalar::Real(v), GameType::Int) => PropertyValue::Int(*v as i64),
            (WireScalar::Real(v), GameType::UInt) if *v >= 0.0 => PropertyValue::UInt(*v as u64),
            (WireScalar::Vector(v), GameType::Vec3) => PropertyValue::Vec3(v.as_vec3()),
            (WireScalar::Vector(v), GameType::DVec3) => PropertyValue::DVec3(*v),
            (WireScalar::EntityType(et), GameType::EntityType) => PropertyValue::EntityType(*et),
            (WireScalar::EntityType(et), GameType::String) => PropertyValue::String(et.to_string()),
            (WireScalar::EntityType(et), GameType::Enumeration) => {
                PropertyValue::Enumeration(et.to_string())
            }
            (WireScalar::EntityId(eid), GameType::Actor) => {
                match self.table.get_id_by_entity_id(eid) {
                    Some(id) => PropertyValue::Actor(id),
                    None => return Ok(None),
                }
            }
            (WireScalar::EntityId(eid), GameType::String) => PropertyValue::String(eid.to_string()),
            (WireScalar::Text(text), GameType::Actor) => match self.table.get_id_by_rti_id(text) {
                Some(id) => PropertyValue::Actor(id),
                None => return Ok(None),
            },
            (WireScalar::Text(text), GameType::String) => PropertyValue::String(text.clone()),
            (WireScalar::Text(text), GameType::Enumeration) => {
                PropertyValue::Enumeration(text.clone())
            }
            (WireScalar::Octets(bytes), GameType::String) => {
                PropertyValue::String(String::from_utf8_lossy(bytes).into_owned())
            }
            (WireScalar::Articulations(parts), GameType::Articulations) => {
                PropertyValue::Articulations(parts.clone())
            }
            _ => return Err(mismatch()),
        };
        Ok(Some(value))
    }
}

fn decode_scalar(hla_type: RprAttributeType, bytes: &[u8]) -> Result<WireScalar, CodecError> {
    if !hla_type.accepts_length(bytes.len()) {
        return Err(CodecError::WrongLength {
            hla_type: hla_type.name(),
            expected: hla_type.encoded_length(),
            actual: bytes.len(),
        });
    }

    let scalar = match hla_type {
        RprAttributeType::WorldCoordinate => WireScalar::Vector(WorldCoordinate::from_bytes(bytes)?.0),
        RprAttributeType::EulerAngles => {
            WireScalar::Vector(EulerAngles::from_bytes(bytes)?.to_vec3().as_dvec3())
        }
        RprAttributeType::VelocityVector | RprAttributeType::AngularVelocityVector => {
            WireScalar::Vector(VelocityVector::from_bytes(bytes)?.0.as_dvec3())
        }
        RprAttributeType::UnsignedInt => {
            WireScalar::Unsigned(u32::from_be_bytes(fixed(bytes)?) as u64)
        }
        RprAttributeType::UnsignedShort => {
            WireScalar::Unsigned(u16::from_be_bytes(fixed(bytes)?) as u64)
        }
        RprAttributeType::UnsignedChar => WireScalar::Unsigned(bytes[0] as u64),
        RprAttributeType::Float => WireScalar::Real(f32::from_be_bytes(fixed(bytes)?) as f64),
        RprAttributeType::Double => WireScalar::Real(f64::from_be_bytes(fixed(bytes)?)),
        RprAttributeType::EntityType => WireScalar::EntityType(EntityType::from_bytes(bytes)?),
        RprAttributeType::EntityIdentifier => {
            WireScalar::EntityId(EntityIdentifier::from_bytes(bytes)?)
        }
        RprAttributeType::EventIdentifier => {
            WireScalar::Unsigned(EventIdentifier::from_bytes(bytes)?.event_number as u64)
        }
        RprAttributeType::Marking | RprAttributeType::Marking32 => {
            WireScalar::Text(decode_marking(bytes))
        }
        RprAttributeType::String | RprAttributeType::RtiObjectIdStruct => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            WireScalar::Text(String::from_utf8_lossy(&bytes[..end]).into_owned())
        }
        RprAttributeType::Octet => WireScalar::Octets(bytes.to_vec()),
        RprAttributeType::ArticulatedPart => {
            if bytes.len() % ArticulatedParameter::ENCODED_LENGTH != 0 {
                return Err(CodecError::WrongLength {
                    hla_type: hla_type.name(),
                    expected: bytes.len() / ArticulatedParameter::ENCODED_LENGTH
                        * ArticulatedParameter::ENCODED_LENGTH,
                    actual: bytes.len(),
                });
            }
            let parts = bytes
                .chunks_exact(ArticulatedParameter::ENCODED_LENGTH)
                .map(ArticulatedParameter::from_bytes)
                .collect::<Result<Vec<_>, _>>()?;
            WireScalar::Articulations(parts)
        }
        RprAttributeType::ArticulatedPartSingle => {
            WireScalar::Articulations(vec![ArticulatedParameter::from_bytes(bytes)?])
        }
        RprAttributeType::TimeTag => WireScalar::Real(Tag::from_bytes(bytes)?.0),
    };
    Ok(scalar)
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    bytes.try_into().map_err(|_| CodecError::BufferTooShort {
        needed: N,
        available: bytes.len(),
    })
}

fn nul_terminated(text: &str, max: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = text.bytes().take(max.saturating_sub(1)).collect();
    bytes.push(0);
    bytes
}

fn integer_value(value: &PropertyValue, def: &ParameterDefinition) -> Option<u64> {
    match value {
        PropertyValue::Enumeration(name) => Some(def.hla_enum_value(name) as u64),
        other => other.as_u64(),
    }
}
