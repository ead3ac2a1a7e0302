use nom::number::complete::{le_f32, le_i32, le_u32};
use serde::Serialize;
use strum_macros::{Display, FromRepr};
use tracing::trace;

use crate::IResult;
use crate::error::FrameError;
use crate::types::DemoClock;

/// Width in bytes of one decoded entity snapshot.
pub const RECORD_WIDTH: usize = 4 * 3 // timestamp, entity type, entity flags
    + TRAJECTORY_WIDTH * 2
    + 4 * 2 // time, time2
    + 12 * 4; // origin, origin2, angles, angles2

const TRAJECTORY_WIDTH: usize = 4 * 3 + 4 * 6;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Sum of absolute per-axis differences.
    pub fn manhattan(self, other: Vec3) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

/// How a trajectory's base and delta evolve over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRepr, Display)]
#[repr(i32)]
#[strum(serialize_all = "snake_case")]
pub enum TrajectoryKind {
    Stationary = 0,
    Interpolate,
    Linear,
    LinearStop,
    LinearStopBack,
    Sine,
    Gravity,
    GravityLow,
    GravityFloat,
    GravityPaused,
    Accelerate,
    Decelerate,
    Spline,
    LinearPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trajectory {
    /// `None` when the capture holds a kind this decoder doesn't know.
    pub kind: Option<TrajectoryKind>,
    pub raw_kind: i32,
    pub start_time: i32,
    pub duration: i32,
    pub base: Vec3,
    pub delta: Vec3,
}

/// One fully decoded entity snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    /// Index of the frame this record came from.
    pub number: i32,
    pub timestamp: DemoClock,
    pub entity_type: i32,
    pub entity_flags: u32,
    pub position: Trajectory,
    pub angular_trajectory: Trajectory,
    pub time: i32,
    pub time2: i32,
    pub origin: Vec3,
    pub origin2: Vec3,
    pub angles: Vec3,
    pub angles2: Vec3,
}

/// Replaces NaN and infinities with zero and clamps everything else into
/// the `i32` range.
pub fn sanitize(value: f32) -> f32 {
    if !value.is_finite() {
        trace!(value, "replacing non-finite float");
        return 0.0;
    }
    value.clamp(i32::MIN as f32, i32::MAX as f32)
}

fn sane_f32(i: &[u8]) -> IResult<&[u8], f32> {
    let (i, v) = le_f32(i)?;
    Ok((i, sanitize(v)))
}

fn vec3(i: &[u8]) -> IResult<&[u8], Vec3> {
    let (i, x) = sane_f32(i)?;
    let (i, y) = sane_f32(i)?;
    let (i, z) = sane_f32(i)?;
    Ok((i, Vec3 { x, y, z }))
}

fn trajectory(i: &[u8]) -> IResult<&[u8], Trajectory> {
    let (i, raw_kind) = le_i32(i)?;
    let (i, start_time) = le_i32(i)?;
    let (i, duration) = le_i32(i)?;
    let (i, base) = vec3(i)?;
    let (i, delta) = vec3(i)?;
    Ok((
        i,
        Trajectory {
            kind: TrajectoryKind::from_repr(raw_kind),
            raw_kind,
            start_time,
            duration,
            base,
            delta,
        },
    ))
}

fn record(i: &[u8], number: i32) -> IResult<&[u8], EntityRecord> {
    let (i, timestamp) = le_i32(i)?;
    let (i, entity_type) = le_i32(i)?;
    let (i, entity_flags) = le_u32(i)?;
    let (i, position) = trajectory(i)?;
    let (i, angular_trajectory) = trajectory(i)?;
    let (i, time) = le_i32(i)?;
    let (i, time2) = le_i32(i)?;
    let (i, origin) = vec3(i)?;
    let (i, origin2) = vec3(i)?;
    let (i, angles) = vec3(i)?;
    let (i, angles2) = vec3(i)?;
    Ok((
        i,
        EntityRecord {
            number,
            timestamp: DemoClock(timestamp),
            entity_type,
            entity_flags,
            position,
            angular_trajectory,
            time,
            time2,
            origin,
            origin2,
            angles,
            angles2,
        },
    ))
}

/// Interprets decoded frame bytes as an [`EntityRecord`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameUnpacker;

impl FrameUnpacker {
    pub fn new() -> Self {
        FrameUnpacker
    }

    /// Unpacks exactly [`RECORD_WIDTH`] bytes. Short or long buffers are
    /// rejected rather than padded or cut.
    pub fn unpack(&self, bytes: &[u8], number: i32) -> Result<EntityRecord, FrameError> {
        if bytes.len() != RECORD_WIDTH {
            return Err(FrameError::SizeMismatch {
                expected: RECORD_WIDTH,
                actual: bytes.len(),
            });
        }
        match record(bytes, number) {
            Ok((_, record)) => Ok(record),
            // Unreachable with the length checked above.
            Err(_) => Err(FrameError::SizeMismatch {
                expected: RECORD_WIDTH,
                actual: bytes.len(),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Writes a record in wire order. Shared with the other test modules.
    pub(crate) fn encode_record(record: &EntityRecord) -> Vec<u8> {
        fn put_vec3(out: &mut Vec<u8>, v: Vec3) {
            for f in [v.x, v.y, v.z] {
                out.extend_from_slice(&f.to_le_bytes());
            }
        }
        fn put_trajectory(out: &mut Vec<u8>, t: &Trajectory) {
            out.extend_from_slice(&t.raw_kind.to_le_bytes());
            out.extend_from_slice(&t.start_time.to_le_bytes());
            out.extend_from_slice(&t.duration.to_le_bytes());
            put_vec3(out, t.base);
            put_vec3(out, t.delta);
        }

        let mut out = Vec::with_capacity(RECORD_WIDTH);
        out.extend_from_slice(&record.timestamp.0.to_le_bytes());
        out.extend_from_slice(&record.entity_type.to_le_bytes());
        out.extend_from_slice(&record.entity_flags.to_le_bytes());
        put_trajectory(&mut out, &record.position);
        put_trajectory(&mut out, &record.angular_trajectory);
        out.extend_from_slice(&record.time.to_le_bytes());
        out.extend_from_slice(&record.time2.to_le_bytes());
        for v in [record.origin, record.origin2, record.angles, record.angles2] {
            put_vec3(&mut out, v);
        }
        out
    }

    pub(crate) fn stationary(base: Vec3) -> Trajectory {
        Trajectory {
            kind: Some(TrajectoryKind::Stationary),
            raw_kind: 0,
            start_time: 0,
            duration: 0,
            base,
            delta: Vec3::default(),
        }
    }

    /// A record with the fields the analytics look at filled in.
    pub(crate) fn snapshot(
        timestamp: i32,
        entity_type: i32,
        entity_flags: u32,
        position: Vec3,
        angles: Vec3,
    ) -> EntityRecord {
        EntityRecord {
            number: 0,
            timestamp: DemoClock(timestamp),
            entity_type,
            entity_flags,
            position: stationary(position),
            angular_trajectory: stationary(angles),
            time: 0,
            time2: 0,
            origin: position,
            origin2: Vec3::default(),
            angles,
            angles2: Vec3::default(),
        }
    }

    #[test]
    fn record_width() {
        assert_eq!(RECORD_WIDTH, 140);
    }

    #[test]
    fn unpacks_fields_in_order() {
        let mut original = snapshot(
            1000,
            1,
            0x0005_0400,
            Vec3::new(1.0, -2.5, 3.25),
            Vec3::new(10.0, 20.0, 0.5),
        );
        original.number = 7;
        original.position.kind = Some(TrajectoryKind::Gravity);
        original.position.raw_kind = 6;
        original.position.start_time = 990;
        original.position.duration = 50;
        original.position.delta = Vec3::new(0.0, 0.0, -800.0);
        original.time = 11;
        original.time2 = -12;
        original.origin2 = Vec3::new(4.0, 5.0, 6.0);
        original.angles2 = Vec3::new(-1.0, -1.0, -1.0);

        let bytes = encode_record(&original);
        let unpacked = FrameUnpacker::new().unpack(&bytes, 7).unwrap();
        assert_eq!(unpacked, original);
    }

    #[test]
    fn unknown_trajectory_kind() {
        let mut original = snapshot(0, 0, 0, Vec3::default(), Vec3::default());
        original.angular_trajectory.raw_kind = 99;
        original.angular_trajectory.kind = None;
        let unpacked = FrameUnpacker::new()
            .unpack(&encode_record(&original), 0)
            .unwrap();
        assert_eq!(unpacked.angular_trajectory.kind, None);
        assert_eq!(unpacked.angular_trajectory.raw_kind, 99);
    }

    #[test]
    fn size_mismatch() {
        let unpacker = FrameUnpacker::new();
        assert_eq!(
            unpacker.unpack(&[0; RECORD_WIDTH - 1], 0),
            Err(FrameError::SizeMismatch {
                expected: RECORD_WIDTH,
                actual: RECORD_WIDTH - 1
            })
        );
        assert!(unpacker.unpack(&[0; RECORD_WIDTH + 4], 0).is_err());
        assert!(unpacker.unpack(&[], 0).is_err());
    }

    #[test]
    fn sanitizes_floats() {
        assert_eq!(sanitize(f32::NAN), 0.0);
        assert_eq!(sanitize(f32::INFINITY), 0.0);
        assert_eq!(sanitize(f32::NEG_INFINITY), 0.0);
        assert_eq!(sanitize(1e20), i32::MAX as f32);
        assert_eq!(sanitize(-1e20), i32::MIN as f32);
        assert_eq!(sanitize(-12.5), -12.5);

        let mut original = snapshot(0, 0, 0, Vec3::default(), Vec3::default());
        original.origin = Vec3::new(f32::NAN, f32::INFINITY, 3e12);
        let unpacked = FrameUnpacker::new()
            .unpack(&encode_record(&original), 0)
            .unwrap();
        assert_eq!(unpacked.origin, Vec3::new(0.0, 0.0, i32::MAX as f32));
    }

    #[test]
    fn kind_names() {
        assert_eq!(TrajectoryKind::LinearStop.to_string(), "linear_stop");
        assert_eq!(TrajectoryKind::from_repr(6), Some(TrajectoryKind::Gravity));
    }
}
