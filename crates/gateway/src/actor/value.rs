use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::ActorId;
use crate::codec::{ArticulatedParameter, EntityType};
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Bool,
    Int,
    UInt,
    Float,
    Double,
    String,
    Enumeration,
    Vec3,
    DVec3,
    EntityType,
    Actor,
    Articulations,
}

impl GameType {
    pub fn name(self) -> &'static str {
        match self {
            GameType::Bool => "bool",
            GameType::Int => "int",
            GameType::UInt => "uint",
            GameType::Float => "float",
            GameType::Double => "double",
            GameType::String => "string",
            GameType::Enumeration => "enumeration",
            GameType::Vec3 => "vec3",
            GameType::DVec3 => "dvec3",
            GameType::EntityType => "entity_type",
            GameType::Actor => "actor",
            GameType::Articulations => "articulations",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    String(String),
    Enumeration(String),
    Vec3(Vec3),
    DVec3(DVec3),
    EntityType(EntityType),
    Actor(ActorId),
    Articulations(Vec<ArticulatedParameter>),
}

impl PropertyValue {
    pub fn game_type(&self) -> GameType {
        match self {
            PropertyValue::Bool(_) => GameType::Bool,
            PropertyValue::Int(_) => GameType::Int,
            PropertyValue::UInt(_) => GameType::UInt,
            PropertyValue::Float(_) => GameType::Float,
            PropertyValue::Double(_) => GameType::Double,
            PropertyValue::String(_) => GameType::String,
            PropertyValue::Enumeration(_) => GameType::Enumeration,
            PropertyValue::Vec3(_) => GameType::Vec3,
            PropertyValue::DVec3(_) => GameType::DVec3,
            PropertyValue::EntityType(_) => GameType::EntityType,
            PropertyValue::Actor(_) => GameType::Actor,
            PropertyValue::Articulations(_) => GameType::Articulations,
        }
    }

    /// Parses a configuration default such as `"1.0 2.0 0.5"` or `"true"`.
    pub fn parse(game_type: GameType, text: &str) -> Result<Self, CodecError> {
        let text = text.trim();
        let err = || CodecError::Parse(text.to_string());
        let value = match game_type {
            GameType::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => PropertyValue::Bool(true),
                "false" | "0" => PropertyValue::Bool(false),
                _ => return Err(err()),
            },
            GameType::Int => PropertyValue::Int(text.parse().map_err(|_| err())?),
            GameType::UInt => PropertyValue::UInt(text.parse().map_err(|_| err())?),
            GameType::Float => PropertyValue::Float(text.parse().map_err(|_| err())?),
            GameType::Double => PropertyValue::Double(text.parse().map_err(|_| err())?),
            GameType::String => PropertyValue::String(text.to_string()),
            GameType::Enumeration => PropertyValue::Enumeration(text.to_string()),
            GameType::Vec3 => {
                let [x, y, z] = parse_triple::<f32>(text).ok_or_else(err)?;
                PropertyValue::Vec3(Vec3::new(x, y, z))
            }
            GameType::DVec3 => {
                let [x, y, z] = parse_triple::<f64>(text).ok_or_else(err)?;
                PropertyValue::DVec3(DVec3::new(x, y, z))
            }
            GameType::EntityType => PropertyValue::EntityType(text.parse()?),
            GameType::Actor => PropertyValue::Actor(text.parse().map_err(|_| err())?),
            GameType::Articulations => {
                if !text.is_empty() {
                    return Err(err());
                }
                PropertyValue::Articulations(Vec::new())
            }
        };
        Ok(value)
    }

    /// Integer view used by the enumeration and integer wire types.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            PropertyValue::Bool(b) => Some(b as u64),
            PropertyValue::Int(v) => u64::try_from(v).ok(),
            PropertyValue::UInt(v) => Some(v),
            PropertyValue::Float(v) if v >= 0.0 => Some(v as u64),
            PropertyValue::Double(v) if v >= 0.0 => Some(v as u64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            PropertyValue::Int(v) => Some(v as f64),
            PropertyValue::UInt(v) => Some(v as f64),
            PropertyValue::Float(v) => Some(v as f64),
            PropertyValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Enumeration(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match *self {
            PropertyValue::Vec3(v) => Some(v),
            PropertyValue::DVec3(v) => Some(v.as_vec3()),
            _ => None,
        }
    }

    pub fn as_dvec3(&self) -> Option<DVec3> {
        match *self {
            PropertyValue::Vec3(v) => Some(v.as_dvec3()),
            PropertyValue::DVec3(v) => Some(v),
            _ => None,
        }
    }
}

fn parse_triple<T: std::str::FromStr>(text: &str) -> Option<[T; 3]> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().ok());
    let x = parts.next()??;
    let y = parts.next()??;
    let z = parts.next()??;
    if parts.next().is_some() {
        return None;
    }
    Some([x, y, z])
}
