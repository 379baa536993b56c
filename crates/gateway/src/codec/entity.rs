use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cursor::{WireReader, WireValue, WireWriter};
use crate::error::CodecError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityIdentifier {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityIdentifier {
    pub const fn new(site: u16, application: u16, entity: u16) -> Self {
        Self {
            site,
            application,
            entity,
        }
    }
}

impl WireValue for EntityIdentifier {
    const ENCODED_LENGTH: usize = 6;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_u16(self.site)?;
        writer.write_u16(self.application)?;
        writer.write_u16(self.entity)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            site: reader.read_u16()?,
            application: reader.read_u16()?,
            entity: reader.read_u16()?,
        })
    }
}

impl fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.site, self.application, self.entity)
    }
}

/// DIS entity type. Field order matters: `Ord` compares kind first, extra last.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityType {
    pub kind: u8,
    pub domain: u8,
    pub country: u16,
    pub category: u8,
    pub subcategory: u8,
    pub specific: u8,
    pub extra: u8,
}

impl EntityType {
    pub const fn new(
        kind: u8,
        domain: u8,
        country: u16,
        category: u8,
        subcategory: u8,
        specific: u8,
        extra: u8,
    ) -> Self {
        Self {
            kind,
            domain,
            country,
            category,
            subcategory,
            specific,
            extra,
        }
    }

    fn fields(&self) -> [u16; 7] {
        [
            self.kind as u16,
            self.domain as u16,
            self.country,
            self.category as u16,
            self.subcategory as u16,
            self.specific as u16,
            self.extra as u16,
        ]
    }

    /// Number of fields that match exactly, with zero acting as a wildcard.
    /// Returns -1 as soon as two non-zero fields disagree.
    pub fn rank_match(&self, other: &EntityType) -> i32 {
        let mut rank = 0;
        for (a, b) in self.fields().into_iter().zip(other.fields()) {
            if a == b {
                rank += 1;
            } else if a != 0 && b != 0 {
                return -1;
            }
        }
        rank
    }

    pub fn parse_delimited(text: &str, delimiter: char) -> Result<Self, CodecError> {
        let tokens: Vec<&str> = text
            .split(delimiter)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        Self::from_tokens(text, &tokens)
    }

    fn from_tokens(text: &str, tokens: &[&str]) -> Result<Self, CodecError> {
        if tokens.is_empty() || tokens.len() > 7 {
            return Err(CodecError::Parse(text.to_string()));
        }

        let mut values = [0u16; 7];
        for (slot, token) in values.iter_mut().zip(tokens) {
            *slot = token
                .parse()
                .map_err(|_| CodecError::Parse(text.to_string()))?;
        }

        let narrow = |v: u16| u8::try_from(v).map_err(|_| CodecError::Parse(text.to_string()));
        Ok(Self {
            kind: narrow(values[0])?,
            domain: narrow(values[1])?,
            country: values[2],
            category: narrow(values[3])?,
            subcategory: narrow(values[4])?,
            specific: narrow(values[5])?,
            extra: narrow(values[6])?,
        })
    }
}

impl WireValue for EntityType {
    const ENCODED_LENGTH: usize = 8;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_u8(self.kind)?;
        writer.write_u8(self.domain)?;
        writer.write_u16(self.country)?;
        writer.write_u8(self.category)?;
        writer.write_u8(self.subcategory)?;
        writer.write_u8(self.specific)?;
        writer.write_u8(self.extra)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            kind: reader.read_u8()?,
            domain: reader.read_u8()?,
            country: reader.read_u16()?,
            category: reader.read_u8()?,
            subcategory: reader.read_u8()?,
            specific: reader.read_u8()?,
            extra: reader.read_u8()?,
        })
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.kind,
            self.domain,
            self.country,
            self.category,
            self.subcategory,
            self.specific,
            self.extra
        )
    }
}

impl FromStr for EntityType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        Self::from_tokens(s, &tokens)
    }
}

const EVENT_FILLER: [u8; 3] = *b"oo\0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventIdentifier {
    pub event_number: u16,
}

impl WireValue for EventIdentifier {
    const ENCODED_LENGTH: usize = 5;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_u16(self.event_number)?;
        writer.write_bytes(&EVENT_FILLER)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        let event_number = reader.read_u16()?;
        reader.skip(EVENT_FILLER.len())?;
        Ok(Self { event_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_layout() {
        let id = EntityIdentifier::new(3, 3, 1);
        assert_eq!(id.to_bytes(), vec![0, 3, 0, 3, 0, 1]);
        assert_eq!(EntityIdentifier::from_bytes(&id.to_bytes()).unwrap(), id);
        assert_eq!(id.to_string(), "3 3 1");
    }

    #[test]
    fn entity_id_ordering_is_lexicographic() {
        assert!(EntityIdentifier::new(1, 9, 9) < EntityIdentifier::new(2, 0, 0));
        assert!(EntityIdentifier::new(1, 2, 3) < EntityIdentifier::new(1, 2, 4));
    }

    #[test]
    fn entity_type_layout() {
        let et = EntityType::new(1, 2, 0x00E1, 4, 5, 6, 7);
        assert_eq!(et.to_bytes(), vec![1, 2, 0x00, 0xE1, 4, 5, 6, 7]);
    }

    #[test]
    fn rank_match_counts_exact_fields() {
        let tank = EntityType::new(1, 1, 225, 1, 1, 3, 0);
        assert_eq!(tank.rank_match(&tank), 7);
        assert_eq!(tank.rank_match(&EntityType::new(1, 1, 225, 0, 0, 0, 0)), 4);
        assert_eq!(tank.rank_match(&EntityType::new(1, 2, 225, 1, 1, 3, 0)), -1);
        assert_eq!(EntityType::default().rank_match(&tank), 1);
    }

    #[test]
    fn parse_partial_entity_type() {
        let et = EntityType::parse_delimited("1.2.225", '.').unwrap();
        assert_eq!(et, EntityType::new(1, 2, 225, 0, 0, 0, 0));

        let et: EntityType = "9 9 9 2 4 6 0".parse().unwrap();
        assert_eq!(et, EntityType::new(9, 9, 9, 2, 4, 6, 0));

        assert!("".parse::<EntityType>().is_err());
        assert!("1 2 3 4 5 6 7 8".parse::<EntityType>().is_err());
        assert!("1 x".parse::<EntityType>().is_err());
        assert!("300".parse::<EntityType>().is_err());
    }

    #[test]
    fn event_identifier_filler() {
        let ev = EventIdentifier { event_number: 0x0102 };
        assert_eq!(ev.to_bytes(), vec![1, 2, b'o', b'o', 0]);
        assert_eq!(EventIdentifier::from_bytes(&ev.to_bytes()).unwrap(), ev);
    }
}
