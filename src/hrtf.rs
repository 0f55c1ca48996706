//! Direction-indexed HRTF filter table.
//!
//! The table maps a discretized direction (an elevation bucket at multiples
//! of 10° in [−40°, 90°] plus an azimuth index within that bucket) to a pair
//! of FIR tap sequences, one per ear. Only the right hemisphere is stored;
//! a negative azimuth swaps the ear taps on lookup, exploiting the bilateral
//! symmetry of the head to halve the table.
//!
//! Tap data is a generated asset, not code: [`HrtfTable::from_file`] loads a
//! compact little-endian binary dump (magic `AHRT`, version, tap length, then
//! one ring of fixed-point i16 tap pairs per elevation bucket, bottom to top)
//! into an immutable two-level structure built once at startup. Lookups after
//! that are two bounds-checked index operations, with no search and no
//! allocation.

use crate::error::{AuricleError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Lowest tabulated elevation, degrees.
pub const ELEVATION_MIN: i32 = -40;
/// Highest tabulated elevation, degrees.
pub const ELEVATION_MAX: i32 = 90;
const ELEVATION_STEP: i32 = 10;
const RING_COUNT: usize = ((ELEVATION_MAX - ELEVATION_MIN) / ELEVATION_STEP) as usize + 1;

/// Azimuth sample density per elevation-magnitude bucket (0°, 10°, ..., 90°).
/// The grid thins toward the pole, where direction matters less.
const AZIMUTH_COUNTS: [usize; 10] = [37, 37, 37, 31, 29, 23, 19, 13, 7, 1];

const MAGIC: [u8; 4] = *b"AHRT";
const FORMAT_VERSION: u16 = 1;

/// Number of azimuth entries in the bucket for `elevation` (a multiple of 10°).
fn azimuth_count(elevation: i32) -> usize {
    AZIMUTH_COUNTS[elevation.unsigned_abs() as usize / 10]
}

/// Left/right ear impulse responses for one tabulated direction.
#[derive(Debug, Clone)]
struct TapPair {
    left: Vec<f32>,
    right: Vec<f32>,
}

#[derive(Debug, Clone)]
struct ElevationRing {
    elevation: i32,
    directions: Vec<TapPair>,
}

/// Immutable direction-to-taps lookup table.
#[derive(Debug, Clone)]
pub struct HrtfTable {
    tap_len: usize,
    rings: Vec<ElevationRing>,
}

/// Result of a lookup: ear-ordered tap slices borrowed from the table plus
/// the direction they were tabulated at.
#[derive(Debug, Clone, Copy)]
pub struct HrtfTaps<'a> {
    pub left: &'a [f32],
    pub right: &'a [f32],
    /// Quantized azimuth magnitude, degrees.
    pub azimuth: i32,
    /// Quantized elevation, degrees.
    pub elevation: i32,
}

/// Clamp to the tabulated range and snap to the nearest 10° bucket,
/// preserving sign.
fn quantize_elevation(elevation_deg: f32) -> i32 {
    let e = elevation_deg.clamp(ELEVATION_MIN as f32, ELEVATION_MAX as f32);
    let bucket = (e.abs() / ELEVATION_STEP as f32).round() as i32 * ELEVATION_STEP;
    if e < 0.0 { -bucket } else { bucket }
}

/// Snap an azimuth magnitude to the ring's grid. The ring's `count` entries
/// span the closed interval [0°, 180°], so the grid spacing is
/// `180 / (count - 1)`; the single-entry ring at the pole collapses to 0°.
fn quantize_azimuth(count: usize, azimuth_deg: f32) -> (usize, i32) {
    if count <= 1 {
        return (0, 0);
    }
    let step = 180.0 / (count as f32 - 1.0);
    let index = ((azimuth_deg.abs().min(180.0) / step).round() as usize).min(count - 1);
    (index, (index as f32 * step).round() as i32)
}

impl HrtfTable {
    /// Build a table from explicit ring data: `(elevation, directions)` with
    /// each direction a `(left, right)` tap pair. Rings must cover every
    /// bucket bottom to top with the canonical azimuth density, and all tap
    /// sequences must have length `tap_len`.
    pub fn from_rings(tap_len: usize, rings: Vec<(i32, Vec<(Vec<f32>, Vec<f32>)>)>) -> Result<Self> {
        if tap_len == 0 {
            return Err(AuricleError::Hrtf("tap length must be non-zero".into()));
        }
        if rings.len() != RING_COUNT {
            return Err(AuricleError::Hrtf(format!(
                "expected {} elevation rings, got {}",
                RING_COUNT,
                rings.len()
            )));
        }

        let mut built = Vec::with_capacity(RING_COUNT);
        for (i, (elevation, directions)) in rings.into_iter().enumerate() {
            let expected_elevation = ELEVATION_MIN + i as i32 * ELEVATION_STEP;
            if elevation != expected_elevation {
                return Err(AuricleError::Hrtf(format!(
                    "ring {} has elevation {}, expected {}",
                    i, elevation, expected_elevation
                )));
            }
            let expected_count = azimuth_count(elevation);
            if directions.len() != expected_count {
                return Err(AuricleError::Hrtf(format!(
                    "elevation {} has {} azimuth entries, expected {}",
                    elevation,
                    directions.len(),
                    expected_count
                )));
            }
            let mut pairs = Vec::with_capacity(directions.len());
            for (left, right) in directions {
                if left.len() != tap_len || right.len() != tap_len {
                    return Err(AuricleError::Hrtf(format!(
                        "elevation {} has tap sequences of length {}/{}, expected {}",
                        elevation,
                        left.len(),
                        right.len(),
                        tap_len
                    )));
                }
                pairs.push(TapPair { left, right });
            }
            built.push(ElevationRing {
                elevation,
                directions: pairs,
            });
        }

        Ok(Self {
            tap_len,
            rings: built,
        })
    }

    /// Parse a binary tap dump (see the module docs for the layout).
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(AuricleError::Hrtf("not an HRTF tap dump".into()));
        }
        let version = read_u16(reader)?;
        if version != FORMAT_VERSION {
            return Err(AuricleError::Hrtf(format!(
                "unsupported tap dump version {}",
                version
            )));
        }
        let tap_len = read_u16(reader)? as usize;
        let ring_count = read_u16(reader)? as usize;

        let mut rings = Vec::with_capacity(ring_count);
        for _ in 0..ring_count {
            let elevation = read_i16(reader)? as i32;
            let direction_count = read_u16(reader)? as usize;
            let mut directions = Vec::with_capacity(direction_count);
            for _ in 0..direction_count {
                let left = read_taps(reader, tap_len)?;
                let right = read_taps(reader, tap_len)?;
                directions.push((left, right));
            }
            rings.push((elevation, directions));
        }

        Self::from_rings(tap_len, rings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let table = Self::from_reader(&mut BufReader::new(file))?;
        log::info!(
            "loaded HRTF table from {} ({} taps per ear)",
            path.as_ref().display(),
            table.tap_len
        );
        Ok(table)
    }

    /// Length of every tap sequence in the table.
    pub fn tap_len(&self) -> usize {
        self.tap_len
    }

    /// Nearest tabulated direction for a continuous (azimuth, elevation)
    /// pair, in degrees. Negative azimuths mirror the stored hemisphere by
    /// swapping the ear taps.
    ///
    /// Clamping and quantization keep every reachable index inside a
    /// well-formed table; a miss can only mean the table itself is
    /// malformed, and is surfaced as an error instead of reading out of
    /// bounds.
    pub fn nearest(&self, azimuth_deg: f32, elevation_deg: f32) -> Result<HrtfTaps<'_>> {
        let elevation = quantize_elevation(elevation_deg);
        // The 50° ring's asset data stops short of the 180° edge.
        let clamped_azimuth = if elevation == 50 {
            azimuth_deg.clamp(-176.0, 176.0)
        } else {
            azimuth_deg.clamp(-180.0, 180.0)
        };
        let (index, azimuth) = quantize_azimuth(azimuth_count(elevation), clamped_azimuth);

        let ring_index = ((elevation - ELEVATION_MIN) / ELEVATION_STEP) as usize;
        let entry = self
            .rings
            .get(ring_index)
            .and_then(|ring| ring.directions.get(index))
            .ok_or_else(|| {
                AuricleError::Hrtf(format!(
                    "no table entry for elevation {} azimuth index {}",
                    elevation, index
                ))
            })?;

        let (left, right) = if azimuth_deg < 0.0 {
            (entry.right.as_slice(), entry.left.as_slice())
        } else {
            (entry.left.as_slice(), entry.right.as_slice())
        };

        Ok(HrtfTaps {
            left,
            right,
            azimuth,
            elevation,
        })
    }
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}

fn read_i16<R: Read>(reader: &mut R) -> Result<i16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;
    Ok(i16::from_le_bytes(bytes))
}

/// Read `count` fixed-point taps and scale them to floats.
fn read_taps<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f32>> {
    let mut bytes = vec![0u8; count * 2];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canonical-layout table whose taps encode their own (ring, azimuth)
    /// coordinates, so tests can verify which entry a lookup selected.
    fn coordinate_table() -> HrtfTable {
        let mut rings = Vec::new();
        for i in 0..RING_COUNT {
            let elevation = ELEVATION_MIN + i as i32 * ELEVATION_STEP;
            let directions = (0..azimuth_count(elevation))
                .map(|a| {
                    let tag = (i * 1000 + a) as f32;
                    (vec![tag, 0.0], vec![tag, 1.0])
                })
                .collect();
            rings.push((elevation, directions));
        }
        HrtfTable::from_rings(2, rings).unwrap()
    }

    #[test]
    fn test_mirroring_swaps_ears() {
        let table = coordinate_table();
        let pos = table.nearest(30.0, 20.0).unwrap();
        let neg = table.nearest(-30.0, 20.0).unwrap();

        assert_eq!(pos.azimuth, neg.azimuth);
        assert_eq!(pos.elevation, neg.elevation);
        assert_eq!(pos.left, neg.right);
        assert_eq!(pos.right, neg.left);
    }

    #[test]
    fn test_elevation_clamped_and_bucketed() {
        let table = coordinate_table();
        assert_eq!(table.nearest(0.0, 95.0).unwrap().elevation, 90);
        assert_eq!(table.nearest(0.0, -75.0).unwrap().elevation, -40);
        assert_eq!(table.nearest(0.0, -5.0).unwrap().elevation, -10);
        assert_eq!(table.nearest(0.0, 14.0).unwrap().elevation, 10);
        assert_eq!(table.nearest(0.0, 16.0).unwrap().elevation, 20);
    }

    #[test]
    fn test_azimuth_snaps_to_ring_grid() {
        let table = coordinate_table();
        // elevation 0 ring has 37 entries at 5° spacing
        let taps = table.nearest(12.0, 0.0).unwrap();
        assert_eq!(taps.azimuth, 10);
        let ring = (0 - ELEVATION_MIN) / ELEVATION_STEP;
        assert_eq!(taps.left[0], (ring * 1000 + 2) as f32);

        let edge = table.nearest(180.0, 0.0).unwrap();
        assert_eq!(edge.azimuth, 180);
        assert_eq!(edge.left[0], (ring * 1000 + 36) as f32);
    }

    #[test]
    fn test_pole_collapses_to_single_entry() {
        let table = coordinate_table();
        let a = table.nearest(0.0, 90.0).unwrap();
        let b = table.nearest(-135.0, 90.0).unwrap();
        assert_eq!(a.azimuth, 0);
        assert_eq!(b.azimuth, 0);
        assert_eq!(a.left, b.right);
    }

    #[test]
    fn test_50_degree_ring_clamps_azimuth_edge() {
        let table = coordinate_table();
        let taps = table.nearest(180.0, 50.0).unwrap();
        // clamped to 176°, which still snaps to the last grid entry
        let ring = ((50 - ELEVATION_MIN) / ELEVATION_STEP) as usize;
        let last = azimuth_count(50) - 1;
        assert_eq!(taps.left[0], (ring * 1000 + last) as f32);
    }

    #[test]
    fn test_malformed_tables_rejected() {
        assert!(HrtfTable::from_rings(2, Vec::new()).is_err());

        // wrong azimuth density on one ring
        let mut rings: Vec<(i32, Vec<(Vec<f32>, Vec<f32>)>)> = Vec::new();
        for i in 0..RING_COUNT {
            let elevation = ELEVATION_MIN + i as i32 * ELEVATION_STEP;
            let count = if elevation == 30 {
                5
            } else {
                azimuth_count(elevation)
            };
            let directions = (0..count).map(|_| (vec![0.0; 2], vec![0.0; 2])).collect();
            rings.push((elevation, directions));
        }
        assert!(HrtfTable::from_rings(2, rings).is_err());
    }

    #[test]
    fn test_binary_round_trip() {
        // serialize a canonical table in the dump format and parse it back
        let tap_len = 3usize;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(tap_len as u16).to_le_bytes());
        bytes.extend_from_slice(&(RING_COUNT as u16).to_le_bytes());
        for i in 0..RING_COUNT {
            let elevation = ELEVATION_MIN + i as i32 * ELEVATION_STEP;
            bytes.extend_from_slice(&(elevation as i16).to_le_bytes());
            let count = azimuth_count(elevation);
            bytes.extend_from_slice(&(count as u16).to_le_bytes());
            for a in 0..count {
                let tag = (i * 100 + a) as i16;
                for _ in 0..tap_len {
                    bytes.extend_from_slice(&tag.to_le_bytes()); // left
                }
                for _ in 0..tap_len {
                    bytes.extend_from_slice(&(-tag).to_le_bytes()); // right
                }
            }
        }

        let table = HrtfTable::from_reader(&mut bytes.as_slice()).unwrap();
        assert_eq!(table.tap_len(), tap_len);

        let taps = table.nearest(5.0, 0.0).unwrap();
        let ring = ((0 - ELEVATION_MIN) / ELEVATION_STEP) as usize;
        let expected = (ring * 100 + 1) as f32 / 32768.0;
        assert!((taps.left[0] - expected).abs() < 1e-6);
        assert!((taps.right[0] + expected).abs() < 1e-6);
    }

    #[test]
    fn test_truncated_dump_is_an_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        assert!(HrtfTable::from_reader(&mut bytes.as_slice()).is_err());
    }
}
