// Tile grid: lofting the fitted curves into a quad grid and orienting one
// pair of tiles per face.
//
// The three tile curves are sampled by the scene at even arc-length
// spacing (`Scene::axis_aligned_spacing_points`): the main and hip curves
// with one point per row, the eave curve with one point per column. A
// vertex is the eave point of its column plus the row's rise, blended from
// the main curve's rise at the first column to the hip curve's at the last:
//
//   v(r, c) = eave[c] + lerp(main[r] - main[0], hip[r] - hip[0], c / (C - 1))
//
// Faces run row-major with vertices (r,c) (r+1,c) (r+1,c+1) (r,c+1), so a
// face's first edge points up the slope and its normal points out of the
// roof.
//
// Orientation uses the face's first edge for local Y and, for local Z, the
// summed normals of every face sharing that edge. A single face normal
// twists badly where the grid bends round the hip; the shared-edge average
// does not. Z is then made orthogonal to Y and X completes the frame.
//
// See also: `tile_curve.rs` for the curves, `building.rs` for the scene
// calls that sample them and instance the tiles.

use crate::config::TileCourse;
use crate::error::{LayoutError, LayoutResult};
use crate::tile_curve::TileCurves;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use timberframe_scene::{AssetInfo, Axis, Euler, Member, MirrorSpec, Shape, Vec3};

pub fn polyline_length(points: &[Vec3]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).length()).sum()
}

/// Rows up the slope and columns along the eave, at least two each.
pub fn sample_counts(curves: &TileCurves, tiles: &TileCourse) -> LayoutResult<(usize, usize)> {
    if tiles.course_length <= 0.0 || tiles.course_width <= 0.0 {
        return Err(LayoutError::Degenerate {
            what: "tile course spacing",
            value: tiles.course_length.min(tiles.course_width),
        });
    }
    let count = |points: &[Vec3], spacing: f64| ((polyline_length(points) / spacing).ceil() as usize + 1).max(2);
    Ok((count(&curves.main.points, tiles.course_length), count(&curves.eave.points, tiles.course_width)))
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    pub rows: usize,
    pub cols: usize,
    /// Row-major.
    pub vertices: Vec<Vec3>,
}

/// Local frame of one grid face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileFrame {
    pub center: Vec3,
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
    pub rotation: Euler,
}

pub fn loft(main: &[Vec3], eave: &[Vec3], hip: &[Vec3]) -> LayoutResult<TileGrid> {
    if main.len() < 2 || eave.len() < 2 || hip.len() != main.len() {
        return Err(LayoutError::Degenerate {
            what: "tile grid samples",
            value: main.len().min(eave.len()).min(hip.len()) as f64,
        });
    }
    let (rows, cols) = (main.len(), eave.len());
    let last = (cols - 1) as f64;
    let mut vertices = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        let along_main = main[r] - main[0];
        let along_hip = hip[r] - hip[0];
        for (c, e) in eave.iter().enumerate() {
            let t = c as f64 / last;
            vertices.push(*e + along_main * (1.0 - t) + along_hip * t);
        }
    }
    Ok(TileGrid { rows, cols, vertices })
}

impl TileGrid {
    fn index(&self, r: usize, c: usize) -> usize {
        r * self.cols + c
    }

    pub fn faces(&self) -> Vec<[usize; 4]> {
        let mut out = Vec::with_capacity((self.rows - 1) * (self.cols - 1));
        for r in 0..self.rows - 1 {
            for c in 0..self.cols - 1 {
                out.push([self.index(r, c), self.index(r + 1, c), self.index(r + 1, c + 1), self.index(r, c + 1)]);
            }
        }
        out
    }

    fn face_normal(&self, f: &[usize; 4]) -> Vec3 {
        let v = |i: usize| self.vertices[f[i]];
        (v(2) - v(0)).cross(v(3) - v(1)).normalized()
    }

    pub fn face_frames(&self) -> Vec<TileFrame> {
        let faces = self.faces();
        let normals: Vec<Vec3> = faces.iter().map(|f| self.face_normal(f)).collect();

        let mut edge_faces: FxHashMap<(usize, usize), SmallVec<[usize; 2]>> = FxHashMap::default();
        for (i, f) in faces.iter().enumerate() {
            for k in 0..4 {
                let (a, b) = (f[k], f[(k + 1) % 4]);
                edge_faces.entry((a.min(b), a.max(b))).or_default().push(i);
            }
        }

        faces
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let (a, b) = (f[0], f[1]);
                let y = (self.vertices[b] - self.vertices[a]).normalized();
                let sum = edge_faces
                    .get(&(a.min(b), a.max(b)))
                    .map(|shared| shared.iter().fold(Vec3::ZERO, |acc, &j| acc + normals[j]))
                    .unwrap_or(normals[i]);
                let z = (sum - y * sum.dot(y)).normalized();
                let x = y.cross(z);
                let center = f.iter().fold(Vec3::ZERO, |acc, &j| acc + self.vertices[j]) * 0.25;
                TileFrame { center, x, y, z, rotation: Euler::from_basis(x, y, z) }
            })
            .collect()
    }
}

/// A flat and a round tile per face, each mirrored to the other three roof
/// quarters. The flat tile sits `flat_tile_offset` toward -X of the tile
/// root, whatever the face's own orientation.
pub fn place_tiles(frames: &[TileFrame], flat: &AssetInfo, round: &AssetInfo, tiles: &TileCourse) -> Vec<Member> {
    let mirror = MirrorSpec::across_xy(Vec3::ZERO).with_bisect(Axis::Y);
    let flat_offset = Vec3::new(tiles.flat_tile_offset, 0.0, 0.0);
    let asset = |a: &AssetInfo| Shape::Asset { name: a.name.clone(), unit: a.dimensions, array: None };
    let mut out = Vec::with_capacity(frames.len() * 2);
    for f in frames {
        out.push(
            Member::new("flat tile", asset(flat), f.center - flat_offset)
                .rotated(f.rotation)
                .mirrored(mirror),
        );
        out.push(Member::new("round tile", asset(round), f.center).rotated(f.rotation).mirrored(mirror));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.approx_eq(b, 1e-9)
    }

    /// A plane rising toward -Y: main and hip climb the same way, the eave
    /// runs along +X.
    fn sloped_plane(rows: usize, cols: usize) -> TileGrid {
        let main: Vec<Vec3> = (0..rows).map(|r| Vec3::new(0.0, -(r as f64), r as f64)).collect();
        let hip: Vec<Vec3> = main.iter().map(|p| *p + Vec3::new(4.0, 0.0, 0.0)).collect();
        let eave: Vec<Vec3> = (0..cols).map(|c| Vec3::new(c as f64, 0.0, 0.0)).collect();
        loft(&main, &eave, &hip).unwrap()
    }

    #[test]
    fn loft_interpolates_between_main_and_hip() {
        let main = [Vec3::ZERO, Vec3::new(0.0, -1.0, 1.0)];
        let hip = [Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, -1.0, 3.0)];
        let eave = [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)];
        let g = loft(&main, &eave, &hip).unwrap();
        assert_eq!((g.rows, g.cols), (2, 3));
        assert!(close(g.vertices[3], Vec3::new(0.0, -1.0, 1.0)));
        assert!(close(g.vertices[4], Vec3::new(2.0, -1.0, 2.0)));
        assert!(close(g.vertices[5], Vec3::new(4.0, -1.0, 3.0)));
    }

    #[test]
    fn loft_rejects_mismatched_samples() {
        let pts = [Vec3::ZERO, Vec3::ONE];
        assert!(loft(&pts, &pts, &pts[..1]).is_err());
        assert!(loft(&pts[..1], &pts, &pts[..1]).is_err());
    }

    #[test]
    fn faces_are_row_major_quads() {
        let g = sloped_plane(3, 4);
        let faces = g.faces();
        assert_eq!(faces.len(), 2 * 3);
        assert_eq!(faces[0], [0, 4, 5, 1]);
        assert_eq!(faces[5], [6, 10, 11, 7]);
    }

    #[test]
    fn plane_frames_are_orthonormal_and_point_out() {
        let g = sloped_plane(3, 4);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        for f in g.face_frames() {
            assert!(close(f.y, Vec3::new(0.0, -s, s)));
            assert!(close(f.z, Vec3::new(0.0, s, s)));
            // Right-handed with Y up the slope and Z out of the roof.
            assert!(close(f.x, Vec3::new(-1.0, 0.0, 0.0)));
            assert!(f.x.dot(f.y).abs() < 1e-12);
            // The Euler angles reproduce the basis.
            assert!(close(Vec3::new(0.0, 0.0, 1.0).rotated(f.rotation), f.z));
            assert!(close(Vec3::new(0.0, 1.0, 0.0).rotated(f.rotation), f.y));
        }
    }

    #[test]
    fn shared_edge_normal_averages_across_a_fold() {
        // Left column flat, right column tilted up: the middle edge sees both.
        let main = [Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)];
        let hip = [Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, -1.0, 0.0)];
        let eave = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 1.0)];
        let g = loft(&main, &eave, &hip).unwrap();
        let frames = g.face_frames();
        let flat_normal = Vec3::new(0.0, 0.0, 1.0);
        assert!(close(frames[0].z, flat_normal));
        // The second face's first edge is shared with the flat face, so its
        // frame leans between the two normals rather than following its own.
        let own = g.face_normal(&g.faces()[1]);
        assert!(frames[1].z.dot(flat_normal) > own.dot(flat_normal));
        assert!((frames[1].z.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_tile_offset_ignores_face_orientation() {
        // A face turned round the hip: its local X is far from the root's X.
        let main = [Vec3::ZERO, Vec3::new(-1.0, -1.0, 1.0)];
        let hip = [Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)];
        let eave = [Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)];
        let frames = loft(&main, &eave, &hip).unwrap().face_frames();
        assert!(frames[0].x.dot(Vec3::new(1.0, 0.0, 0.0)).abs() < 0.99);
        let flat = AssetInfo { name: "flat_tile".into(), dimensions: Vec3::new(0.3, 0.3, 0.05) };
        let round = AssetInfo { name: "round_tile".into(), dimensions: Vec3::new(0.15, 0.3, 0.1) };
        let tiles = TileCourse::default();
        let members = place_tiles(&frames, &flat, &round, &tiles);
        let d = members[1].location - members[0].location;
        assert!(d.approx_eq(Vec3::new(tiles.flat_tile_offset, 0.0, 0.0), 1e-12));
    }

    #[test]
    fn each_face_gets_a_mirrored_tile_pair() {
        let g = sloped_plane(2, 3);
        let frames = g.face_frames();
        let flat = AssetInfo { name: "flat_tile".into(), dimensions: Vec3::new(0.3, 0.3, 0.05) };
        let round = AssetInfo { name: "round_tile".into(), dimensions: Vec3::new(0.15, 0.3, 0.1) };
        let tiles = TileCourse::default();
        let members = place_tiles(&frames, &flat, &round, &tiles);
        assert_eq!(members.len(), 2 * frames.len());
        for pair in members.chunks(2) {
            let (flat_at, round_at) = (pair[0].location, pair[1].location);
            assert!((round_at.x - flat_at.x - tiles.flat_tile_offset).abs() < 1e-12);
            assert_eq!((flat_at.y, flat_at.z), (round_at.y, round_at.z));
        }
        assert!(members.iter().all(|m| m.is_mirrored_across(Axis::X) && m.is_mirrored_across(Axis::Y)));
    }
}
