use glam::{DVec3, Vec3};

use super::cursor::{WireReader, WireValue, WireWriter};
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldCoordinate(pub DVec3);

impl WorldCoordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(DVec3::new(x, y, z))
    }
}

impl From<DVec3> for WorldCoordinate {
    fn from(v: DVec3) -> Self {
        Self(v)
    }
}

impl WireValue for WorldCoordinate {
    const ENCODED_LENGTH: usize = 24;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_f64(self.0.x)?;
        writer.write_f64(self.0.y)?;
        writer.write_f64(self.0.z)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(
            reader.read_f64()?,
            reader.read_f64()?,
            reader.read_f64()?,
        ))
    }
}

/// Orientation as DIS psi/theta/phi, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub psi: f32,
    pub theta: f32,
    pub phi: f32,
}

impl EulerAngles {
    pub fn new(psi: f32, theta: f32, phi: f32) -> Self {
        Self { psi, theta, phi }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.psi, self.theta, self.phi)
    }
}

impl From<Vec3> for EulerAngles {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl WireValue for EulerAngles {
    const ENCODED_LENGTH: usize = 12;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_f32(self.psi)?;
        writer.write_f32(self.theta)?;
        writer.write_f32(self.phi)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(
            reader.read_f32()?,
            reader.read_f32()?,
            reader.read_f32()?,
        ))
    }
}

/// Linear velocity, acceleration and angular velocity all share this layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityVector(pub Vec3);

impl From<Vec3> for VelocityVector {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl WireValue for VelocityVector {
    const ENCODED_LENGTH: usize = 12;

    fn encode(&self, writer: &mut WireWriter<'_>) -> Result<(), CodecError> {
        writer.write_f32(self.0.x)?;
        writer.write_f32(self.0.y)?;
        writer.write_f32(self.0.z)
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self(Vec3::new(
            reader.read_f32()?,
            reader.read_f32()?,
            reader.read_f32()?,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_coordinate_is_three_be_doubles() {
        let wc = WorldCoordinate::new(1.0, -2.5, 1.0e6);
        let bytes = wc.to_bytes();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[0..8], &1.0f64.to_be_bytes());
        assert_eq!(&bytes[16..24], &1.0e6f64.to_be_bytes());
        assert_eq!(WorldCoordinate::from_bytes(&bytes).unwrap(), wc);
    }

    #[test]
    fn euler_angles_keep_wire_order() {
        let angles = EulerAngles::new(0.5, -0.25, 3.0);
        let bytes = angles.to_bytes();
        assert_eq!(&bytes[4..8], &(-0.25f32).to_be_bytes());
        assert_eq!(EulerAngles::from_bytes(&bytes).unwrap(), angles);
    }

    #[test]
    fn truncated_velocity_fails() {
        let bytes = VelocityVector(Vec3::ONE).to_bytes();
        assert!(VelocityVector::from_bytes(&bytes[..11]).is_err());
    }
}
