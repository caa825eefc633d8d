//! Mapping of panel coordinates onto the RAM of the two controllers.
//!
//! Each controller drives one half of the panel. The slave half keeps the
//! panel orientation, the master half is mounted gate-mirrored, so its X
//! axis runs backwards. A write area is split along both the controller
//! seam and the panel middle line into up to four sub-areas, matching the
//! window granularity of the reference sequences.

use super::command::{Controller, DataEntryMode};
use super::{HEIGHT, WIDTH};
use crate::rect::Rect;

const HALF_WIDTH: u32 = WIDTH / 2;
const HALF_HEIGHT: u32 = HEIGHT / 2;

const UPPER_LEFT: Rect = Rect::new(0, 0, HALF_WIDTH, HALF_HEIGHT);
const UPPER_RIGHT: Rect = Rect::new(HALF_WIDTH, 0, HALF_WIDTH, HALF_HEIGHT);
const LOWER_LEFT: Rect = Rect::new(0, HALF_HEIGHT, HALF_WIDTH, HALF_HEIGHT);
const LOWER_RIGHT: Rect = Rect::new(HALF_WIDTH, HALF_HEIGHT, HALF_WIDTH, HALF_HEIGHT);

/// An area clipped to the panel, with the offsets into the source bitmap
/// that the clipping produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Clipped {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Pixels clipped away on the left
    pub src_x: u32,
    /// Rows clipped away on the top
    pub src_y: u32,
}

/// Intersects an area with the panel. Returns `None` if nothing is left.
pub(crate) fn clip_to_panel(x: i32, y: i32, w: u32, h: u32) -> Option<Clipped> {
    let x1 = i64::from(x.max(0));
    let y1 = i64::from(y.max(0));
    let x2 = (i64::from(x) + i64::from(w)).min(i64::from(WIDTH));
    let y2 = (i64::from(y) + i64::from(h)).min(i64::from(HEIGHT));
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(Clipped {
        x: x1 as u32,
        y: y1 as u32,
        w: (x2 - x1) as u32,
        h: (y2 - y1) as u32,
        src_x: (x1 - i64::from(x)) as u32,
        src_y: (y1 - i64::from(y)) as u32,
    })
}

/// One controller window of a split write area.
///
/// `x` is in controller RAM coordinates: unchanged on the slave, mirrored
/// (`WIDTH - x - w`) on the master. `y` stays in panel coordinates, both
/// RAMs cover the full height. `src_x`/`src_y` locate the window inside the
/// area that was split.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SubRect {
    pub controller: Controller,
    pub mode: DataEntryMode,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub src_x: u32,
    pub src_y: u32,
}

/// Splits a panel area into its controller windows.
///
/// The order (upper left, upper right, lower left, lower right) is the order
/// the windows must be programmed and filled in.
pub(crate) fn partition(area: Rect) -> [Option<SubRect>; 4] {
    [
        sub_rect(area, UPPER_LEFT, Controller::Slave),
        sub_rect(area, UPPER_RIGHT, Controller::Master),
        sub_rect(area, LOWER_LEFT, Controller::Slave),
        sub_rect(area, LOWER_RIGHT, Controller::Master),
    ]
}

fn sub_rect(area: Rect, quadrant: Rect, controller: Controller) -> Option<SubRect> {
    let part = area.intersect(quadrant);
    if part.is_empty() {
        return None;
    }
    let (mode, x) = match controller {
        // x increment, y increment
        Controller::Slave => (DataEntryMode::XIncrYIncr, part.x),
        // x decrement, y increment, against the mirrored gate layout
        Controller::Master => (DataEntryMode::XDecrYIncr, WIDTH - part.x - part.w),
    };
    Some(SubRect {
        controller,
        mode,
        x,
        y: part.y,
        w: part.w,
        h: part.h,
        src_x: part.x - area.x,
        src_y: part.y - area.y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_inside() {
        let c = clip_to_panel(16, 8, 64, 32).unwrap();
        assert_eq!(
            c,
            Clipped {
                x: 16,
                y: 8,
                w: 64,
                h: 32,
                src_x: 0,
                src_y: 0
            }
        );
    }

    #[test]
    fn clip_negative_origin() {
        let c = clip_to_panel(-16, -8, 64, 32).unwrap();
        assert_eq!(
            c,
            Clipped {
                x: 0,
                y: 0,
                w: 48,
                h: 24,
                src_x: 16,
                src_y: 8
            }
        );
    }

    #[test]
    fn clip_overflow_right_bottom() {
        let c = clip_to_panel(784, 264, 100, 100).unwrap();
        assert_eq!(
            c,
            Clipped {
                x: 784,
                y: 264,
                w: 8,
                h: 8,
                src_x: 0,
                src_y: 0
            }
        );
    }

    #[test]
    fn clip_outside() {
        assert_eq!(clip_to_panel(792, 0, 8, 8), None);
        assert_eq!(clip_to_panel(0, 272, 8, 8), None);
        assert_eq!(clip_to_panel(-8, 0, 8, 8), None);
        assert_eq!(clip_to_panel(0, 0, 0, 8), None);
        assert_eq!(clip_to_panel(0, 0, 8, 0), None);
    }

    #[test]
    fn clip_huge_area_covers_panel() {
        let c = clip_to_panel(i32::MIN / 2, i32::MIN / 2, u32::MAX, u32::MAX).unwrap();
        assert_eq!(c.x, 0);
        assert_eq!(c.y, 0);
        assert_eq!(c.w, WIDTH);
        assert_eq!(c.h, HEIGHT);
    }

    #[test]
    fn single_quadrant() {
        let parts = partition(Rect::new(16, 8, 64, 32));
        let ul = parts[0].unwrap();
        assert_eq!(ul.controller, Controller::Slave);
        assert_eq!(ul.mode, DataEntryMode::XIncrYIncr);
        assert_eq!((ul.x, ul.y, ul.w, ul.h), (16, 8, 64, 32));
        assert_eq!((ul.src_x, ul.src_y), (0, 0));
        assert!(parts[1].is_none());
        assert!(parts[2].is_none());
        assert!(parts[3].is_none());
    }

    #[test]
    fn full_panel() {
        let parts = partition(Rect::new(0, 0, WIDTH, HEIGHT));
        let parts: [SubRect; 4] = core::array::from_fn(|i| parts[i].unwrap());

        for p in parts.iter() {
            assert_eq!(p.w, WIDTH / 2);
            assert_eq!(p.h, HEIGHT / 2);
        }
        // the mirrored master windows start at RAM x = 0
        assert_eq!(parts[1].x, 0);
        assert_eq!(parts[3].x, 0);
        // lower windows keep the panel y
        assert_eq!(parts[2].y, HEIGHT / 2);
        assert_eq!(parts[3].y, HEIGHT / 2);
        // source offsets walk the quadrants
        assert_eq!((parts[0].src_x, parts[0].src_y), (0, 0));
        assert_eq!((parts[1].src_x, parts[1].src_y), (WIDTH / 2, 0));
        assert_eq!((parts[2].src_x, parts[2].src_y), (0, HEIGHT / 2));
        assert_eq!((parts[3].src_x, parts[3].src_y), (WIDTH / 2, HEIGHT / 2));
    }

    #[test]
    fn master_mirror() {
        let parts = partition(Rect::new(700, 0, 16, 16));
        let ur = parts[1].unwrap();
        assert_eq!(ur.controller, Controller::Master);
        assert_eq!(ur.mode, DataEntryMode::XDecrYIncr);
        assert_eq!(ur.x, WIDTH - 700 - 16);

        // the full right half maps onto the full master RAM
        let parts = partition(Rect::new(WIDTH / 2, 0, WIDTH / 2, HEIGHT));
        assert_eq!(parts[1].unwrap().x, 0);
        assert_eq!(parts[3].unwrap().x, 0);
    }

    #[test]
    fn straddling_all_quadrants() {
        let parts = partition(Rect::new(390, 130, 16, 16));
        let ul = parts[0].unwrap();
        let ur = parts[1].unwrap();
        let ll = parts[2].unwrap();
        let lr = parts[3].unwrap();

        assert_eq!((ul.x, ul.y, ul.w, ul.h, ul.src_x, ul.src_y), (390, 130, 6, 6, 0, 0));
        assert_eq!((ur.x, ur.y, ur.w, ur.h, ur.src_x, ur.src_y), (386, 130, 10, 6, 6, 0));
        assert_eq!((ll.x, ll.y, ll.w, ll.h, ll.src_x, ll.src_y), (390, 136, 6, 10, 0, 6));
        assert_eq!((lr.x, lr.y, lr.w, lr.h, lr.src_x, lr.src_y), (386, 136, 10, 10, 6, 6));

        // every pixel of the area is covered exactly once
        let total: u32 = [ul, ur, ll, lr].iter().map(|p| p.w * p.h).sum();
        assert_eq!(total, 16 * 16);
    }
}
