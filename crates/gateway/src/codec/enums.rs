use crate::error::CodecError;

macro_rules! dis_enum {
    ($name:ident : $repr:ty { $($variant:ident = $value:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        pub enum $name {
            $($variant = $value),+
        }

        impl TryFrom<u32> for $name {
            type Error = CodecError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $value => Ok($name::$variant),)+
                    _ => Err(CodecError::UnknownEnumValue {
                        kind: stringify!($name),
                        value,
                    }),
                }
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value as u32
            }
        }
    };
}

dis_enum!(EntityKind: u8 {
    Other = 0,
    Platform = 1,
    Munition = 2,
    LifeForm = 3,
    Environmental = 4,
    CulturalFeature = 5,
    Supply = 6,
    Radio = 7,
    Expendable = 8,
    SensorEmitter = 9,
});

dis_enum!(PlatformDomain: u8 {
    Other = 0,
    Land = 1,
    Air = 2,
    Surface = 3,
    Subsurface = 4,
    Space = 5,
});

dis_enum!(DamageState: u8 {
    NoDamage = 0,
    SlightDamage = 1,
    ModerateDamage = 2,
    Destroyed = 3,
});

dis_enum!(ArticulatedTypeMetric: u32 {
    Position = 1,
    PositionRate = 2,
    Extension = 3,
    ExtensionRate = 4,
    X = 5,
    XRate = 6,
    Y = 7,
    YRate = 8,
    Z = 9,
    ZRate = 10,
    Azimuth = 11,
    AzimuthRate = 12,
    Elevation = 13,
    ElevationRate = 14,
    Rotation = 15,
    RotationRate = 16,
});

impl ArticulatedTypeMetric {
    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::PositionRate => "PositionRate",
            Self::Extension => "Extension",
            Self::ExtensionRate => "ExtensionRate",
            Self::X => "LocationX",
            Self::XRate => "LocationXRate",
            Self::Y => "LocationY",
            Self::YRate => "LocationYRate",
            Self::Z => "LocationZ",
            Self::ZRate => "LocationZRate",
            Self::Azimuth => "Azimuth",
            Self::AzimuthRate => "AzimuthRate",
            Self::Elevation => "Elevation",
            Self::ElevationRate => "ElevationRate",
            Self::Rotation => "Rotation",
            Self::RotationRate => "RotationRate",
        }
    }

    pub fn is_rate(self) -> bool {
        (self as u32) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_values_round_trip_through_u32() {
        assert_eq!(DamageState::try_from(1).unwrap(), DamageState::SlightDamage);
        assert_eq!(u32::from(EntityKind::SensorEmitter), 9);
        assert!(PlatformDomain::try_from(6).is_err());
    }

    #[test]
    fn metric_names() {
        assert_eq!(ArticulatedTypeMetric::try_from(11).unwrap().name(), "Azimuth");
        assert_eq!(ArticulatedTypeMetric::XRate.name(), "LocationXRate");
        assert!(ArticulatedTypeMetric::ElevationRate.is_rate());
        assert!(!ArticulatedTypeMetric::Rotation.is_rate());
        assert!(ArticulatedTypeMetric::try_from(0).is_err());
    }
}
