//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] component stores its rotation as
//! Euler angles in degrees; [`quat_to_euler_degrees`] converts physics
//! rotations back into that representation.
//!
//! ## Conventions
//!
//! ```text
//! local = T · Rz · Ry · Rx · S      (column vectors, right-handed)
//! ```
//!
//! Rotation is applied about X first, then Y, then Z. Matrices are
//! column-major, which is also the layout handed to the renderer.

pub use glam::{DVec2, EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

use crate::error::ColorParseError;

/// Pitch sine magnitude at which the Euler decomposition snaps to ±90°.
pub const GIMBAL_LOCK_THRESHOLD: f64 = 0.999_999;

/// Position, rotation (Euler degrees), and scale of an entity relative to its
/// parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about X, Y and Z in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Return a copy with uniform scale applied.
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// The rotation as a quaternion, `Rz · Ry · Rx`.
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.x.to_radians(),
        )
    }

    /// Compute the 4x4 local matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Convert a unit quaternion into Euler degrees matching [`Transform::rotation`].
///
/// The pitch (Y) term is clamped to ±90° once its sine reaches
/// [`GIMBAL_LOCK_THRESHOLD`], so the result is never NaN.
pub fn quat_to_euler_degrees(q: Quat) -> Vec3 {
    let (x, y, z, w) = (q.x as f64, q.y as f64, q.z as f64, q.w as f64);

    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = 2.0 * (w * y - z * x);
    let pitch = if sinp.abs() >= GIMBAL_LOCK_THRESHOLD {
        std::f64::consts::FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    Vec3::new(
        roll.to_degrees() as f32,
        pitch.to_degrees() as f32,
        yaw.to_degrees() as f32,
    )
}

/// Linear RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(ColorParseError(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ColorParseError(hex.to_string()))
        };

        let a = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// RGB part as a vector, as uploaded to light slots.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
