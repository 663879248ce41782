// Floor/bay layout solver.
//
// Turns room counts and named bay widths into pillar-centre coordinates
// along each axis (`net_x`, `net_y`). Sequences are symmetric about 0 and
// strictly increasing, with one more entry than rooms.
//
// X always has a centre bay, so its count must be odd (1-11). The offsets
// grow outward from the centre bay in a fixed order: side, flank, end. For
// 9 and 11 bays the flank width repeats (two or three times) and the end
// bay stays outermost, so no new bay category appears beyond 7.
//
// Y allows 1-5 rooms. Odd counts follow the same rule with centre, side and
// end widths. Even counts have no centre bay: the sequence is zero-centred,
// `[-c, 0, c]` for two rooms and `[-(c+s), -c, 0, c, c+s]` for four.
//
// See also: `platform.rs` and `wall.rs`, which index into these sequences,
// and `tile_curve.rs`, which uses the cached spans.

use crate::error::{LayoutError, LayoutResult};
use crate::params::{BuildingParams, XRoomWidths, YRoomWidths};
use serde::{Deserialize, Serialize};

/// Pillar-centre coordinates on both axes, with cached spans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorNet {
    pub net_x: Vec<f64>,
    pub net_y: Vec<f64>,
    /// `net_x.last - net_x.first`.
    pub x_total: f64,
    pub y_total: f64,
}

impl FloorNet {
    pub fn solve(params: &BuildingParams) -> LayoutResult<FloorNet> {
        let net_x = solve_x(params.x_rooms, &params.x_room_widths)?;
        let net_y = solve_y(params.y_rooms, &params.y_room_widths)?;
        Ok(FloorNet { x_total: span(&net_x), y_total: span(&net_y), net_x, net_y })
    }

    /// Index of the middle bay on an axis with `len` pillars, if the bay
    /// count is odd.
    pub fn center_bay(len: usize) -> Option<usize> {
        (len >= 2 && len % 2 == 0).then(|| (len - 2) / 2)
    }
}

fn span(net: &[f64]) -> f64 {
    match (net.first(), net.last()) {
        (Some(a), Some(b)) => b - a,
        _ => 0.0,
    }
}

/// Mirror a list of positive half-offsets into a full sorted sequence.
fn mirrored(half: &[f64]) -> Vec<f64> {
    let mut net: Vec<f64> = half.iter().rev().map(|v| -v).collect();
    net.extend_from_slice(half);
    net
}

/// Pillar coordinates along X for an odd room count.
pub fn solve_x(rooms: u32, w: &XRoomWidths) -> LayoutResult<Vec<f64>> {
    if rooms == 0 || rooms > 11 {
        return Err(LayoutError::RoomCount { axis: 'x', count: rooms, allowed: "odd, 1-11" });
    }
    if rooms % 2 == 0 {
        return Err(LayoutError::EvenRoomCount(rooms));
    }

    let inner = w.center / 2.0;
    let side = inner + w.side;
    // Positive half of the sequence, centre outward.
    let half: Vec<f64> = match rooms {
        1 => vec![inner],
        3 => vec![inner, side],
        5 => vec![inner, side, side + w.flank],
        7 => vec![inner, side, side + w.flank, side + w.flank + w.end],
        9 => vec![inner, side, side + w.flank, side + 2.0 * w.flank, side + 2.0 * w.flank + w.end],
        _ => vec![
            inner,
            side,
            side + w.flank,
            side + 2.0 * w.flank,
            side + 3.0 * w.flank,
            side + 3.0 * w.flank + w.end,
        ],
    };
    Ok(mirrored(&half))
}

/// Pillar coordinates along Y. Even counts produce a zero-centred sequence.
pub fn solve_y(rooms: u32, w: &YRoomWidths) -> LayoutResult<Vec<f64>> {
    match rooms {
        1 => Ok(mirrored(&[w.center / 2.0])),
        3 => Ok(mirrored(&[w.center / 2.0, w.center / 2.0 + w.side])),
        5 => Ok(mirrored(&[
            w.center / 2.0,
            w.center / 2.0 + w.side,
            w.center / 2.0 + w.side + w.end,
        ])),
        2 => Ok(vec![-w.center, 0.0, w.center]),
        4 => Ok(vec![-(w.center + w.side), -w.center, 0.0, w.center, w.center + w.side]),
        _ => Err(LayoutError::RoomCount { axis: 'y', count: rooms, allowed: "1-5" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths() -> XRoomWidths {
        XRoomWidths { center: 6.16, side: 5.28, flank: 4.8, end: 1.76 }
    }

    fn assert_symmetric_increasing(net: &[f64]) {
        for w in net.windows(2) {
            assert!(w[1] > w[0], "not increasing: {net:?}");
        }
        let n = net.len();
        for i in 0..n {
            assert!((net[i] + net[n - 1 - i]).abs() < 1e-9, "not symmetric: {net:?}");
        }
    }

    #[test]
    fn all_odd_counts_are_symmetric_with_expected_span() {
        let w = widths();
        let expected = [
            (1, w.center),
            (3, w.center + 2.0 * w.side),
            (5, w.center + 2.0 * (w.side + w.flank)),
            (7, w.center + 2.0 * (w.side + w.flank + w.end)),
            (9, w.center + 2.0 * (w.side + 2.0 * w.flank + w.end)),
            (11, w.center + 2.0 * (w.side + 3.0 * w.flank + w.end)),
        ];
        for (rooms, span_expected) in expected {
            let net = solve_x(rooms, &w).unwrap();
            assert_eq!(net.len(), rooms as usize + 1);
            assert_symmetric_increasing(&net);
            assert!((span(&net) - span_expected).abs() < 1e-9, "rooms={rooms}");
        }
    }

    #[test]
    fn eleven_bays_collapse_to_end_width_outermost() {
        let w = widths();
        let net = solve_x(11, &w).unwrap();
        assert_eq!(net.len(), 12);
        // Outermost spacing on both ends is the end bay.
        assert!((net[1] - net[0] - w.end).abs() < 1e-9);
        assert!((net[11] - net[10] - w.end).abs() < 1e-9);
        // Every other non-centre spacing is side or flank: no new category.
        for i in 1..10 {
            let d = net[i + 1] - net[i];
            let known = [w.center, w.side, w.flank].iter().any(|k| (d - k).abs() < 1e-9);
            assert!(known, "unexpected spacing {d} at {i}");
        }
    }

    #[test]
    fn even_and_zero_x_counts_are_rejected() {
        let w = widths();
        assert!(matches!(solve_x(0, &w), Err(LayoutError::RoomCount { .. })));
        assert!(matches!(solve_x(4, &w), Err(LayoutError::EvenRoomCount(4))));
        assert!(matches!(solve_x(13, &w), Err(LayoutError::RoomCount { .. })));
    }

    #[test]
    fn even_y_counts_are_zero_centred() {
        let w = YRoomWidths { center: 3.52, side: 3.52, end: 1.76 };
        assert_eq!(solve_y(2, &w).unwrap(), vec![-3.52, 0.0, 3.52]);
        let four = solve_y(4, &w).unwrap();
        assert_eq!(four.len(), 5);
        assert_symmetric_increasing(&four);
        assert!((four[4] - 7.04).abs() < 1e-12);
    }

    #[test]
    fn odd_y_counts_follow_centre_side_end() {
        let w = YRoomWidths { center: 3.52, side: 3.0, end: 1.76 };
        let net = solve_y(5, &w).unwrap();
        assert_symmetric_increasing(&net);
        assert!((span(&net) - (3.52 + 2.0 * (3.0 + 1.76))).abs() < 1e-9);
        assert!(solve_y(0, &w).is_err());
        assert!(solve_y(6, &w).is_err());
    }

    #[test]
    fn solve_caches_spans() {
        let p = BuildingParams::template(0.08);
        let floor = FloorNet::solve(&p).unwrap();
        assert!((floor.x_total - (floor.net_x[3] - floor.net_x[0])).abs() < 1e-12);
        assert!((floor.y_total - (floor.net_y[3] - floor.net_y[0])).abs() < 1e-12);
    }

    #[test]
    fn center_bay_index() {
        assert_eq!(FloorNet::center_bay(4), Some(1));
        assert_eq!(FloorNet::center_bay(12), Some(5));
        assert_eq!(FloorNet::center_bay(5), None);
    }
}
