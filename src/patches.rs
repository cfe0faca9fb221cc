use crate::rect::{Rect, Size};
use rand::RngCore;

/*------------------------------------------------------------------------------
 * Patches trait
 *------------------------------------------------------------------------------*/

/// Named anchor rectangles exposed by a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// A precomputed set of candidate rectangles inside a region of interest.
pub trait Patches {
    fn num(&self) -> usize;

    /// Rectangle at `index`, or the invalid sentinel when out of range.
    fn rect(&self, index: usize) -> Rect;

    fn roi(&self) -> Rect;

    /// Named anchor at the sampler's own patch size; the invalid sentinel
    /// when the sampler does not support it.
    fn anchor_rect(&self, anchor: Anchor) -> Rect;

    /// Named anchor computed at a caller-supplied patch size.
    fn anchor_rect_sized(&self, anchor: Anchor, patch_size: Size) -> Rect;

    /// Uniform draw from all generated rectangles.
    fn random_rect(&self, rng: &mut dyn RngCore) -> Rect;

    /// First non-zero overlap of any patch with `rect`, 0 when none.
    fn overlap(&self, rect: Rect) -> i32;
}

/// Clip the requested ROI edge-by-edge against the valid region; edges that
/// do not exceed it pass through unchanged.
fn checked_roi(image_roi: Rect, valid_roi: Rect) -> Rect {
    if image_roi == valid_roi {
        return image_roi;
    }

    let upper = if image_roi.upper < valid_roi.upper {
        valid_roi.upper
    } else {
        image_roi.upper
    };
    let left = if image_roi.left < valid_roi.left {
        valid_roi.left
    } else {
        image_roi.left
    };

    let over_bottom =
        image_roi.upper + image_roi.height > valid_roi.upper + valid_roi.height;
    let over_right = image_roi.left + image_roi.width > valid_roi.left + valid_roi.width;

    Rect {
        upper,
        left,
        height: if over_bottom {
            valid_roi.height + valid_roi.upper - upper
        } else {
            image_roi.height + image_roi.upper - upper
        },
        width: if over_right {
            valid_roi.width + valid_roi.left - left
        } else {
            image_roi.width + image_roi.left - left
        },
    }
}

fn grid_step(patch_dim: i32, rel_overlap: f32) -> i32 {
    let step = ((1.0 - rel_overlap) * patch_dim as f32 + 0.5).floor() as i32;
    step.max(1)
}

fn first_overlap(patches: &[Rect], rect: Rect) -> i32 {
    for patch in patches {
        let overlap = patch.overlap(rect);
        if overlap > 0 {
            return overlap;
        }
    }
    0
}

fn random_draw(patches: &[Rect], rng: &mut dyn RngCore) -> Rect {
    patches[rng.next_u32() as usize % patches.len()]
}

/*------------------------------------------------------------------------------
 * PatchesRegularScan
 *------------------------------------------------------------------------------*/

/// Dense single-scale grid of patches tiling the (clamped) ROI row-major.
pub struct PatchesRegularScan {
    patches: Vec<Rect>,
    roi: Rect,
    patch_grid: Size,
    rect_upper_left: Rect,
    rect_upper_right: Rect,
    rect_lower_left: Rect,
    rect_lower_right: Rect,
}

impl PatchesRegularScan {
    pub fn new(image_roi: Rect, valid_roi: Rect, patch_size: Size, rel_overlap: f32) -> Self {
        let roi = checked_roi(image_roi, valid_roi);

        let step_col = grid_step(patch_size.width, rel_overlap);
        let step_row = grid_step(patch_size.height, rel_overlap);

        // An oversized patch yields an empty grid.
        let grid_height = if patch_size.height <= roi.height {
            (roi.height - patch_size.height) / step_row + 1
        } else {
            0
        };
        let grid_width = if patch_size.width <= roi.width {
            (roi.width - patch_size.width) / step_col + 1
        } else {
            0
        };

        let mut patches = Vec::with_capacity((grid_height * grid_width) as usize);
        let mut cur_row = 0;
        while cur_row < roi.height - patch_size.height + 1 {
            let mut cur_col = 0;
            while cur_col < roi.width - patch_size.width + 1 {
                patches.push(Rect {
                    upper: cur_row + roi.upper,
                    left: cur_col + roi.left,
                    height: patch_size.height,
                    width: patch_size.width,
                });
                cur_col += step_col;
            }
            cur_row += step_row;
        }

        debug_assert_eq!(patches.len(), (grid_height * grid_width) as usize);

        Self {
            patches,
            roi,
            patch_grid: Size::new(grid_height, grid_width),
            rect_upper_left: Rect {
                upper: roi.upper,
                left: roi.left,
                ..Rect::from(patch_size)
            },
            rect_upper_right: Rect {
                upper: roi.upper,
                left: roi.left + roi.width - patch_size.width,
                ..Rect::from(patch_size)
            },
            rect_lower_left: Rect {
                upper: roi.upper + roi.height - patch_size.height,
                left: roi.left,
                ..Rect::from(patch_size)
            },
            rect_lower_right: Rect {
                upper: roi.upper + roi.height - patch_size.height,
                left: roi.left + roi.width - patch_size.width,
                ..Rect::from(patch_size)
            },
        }
    }

    /// Rows x columns of the generated grid, needed by smoothed detection.
    pub fn patch_grid(&self) -> Size {
        self.patch_grid
    }
}

impl Patches for PatchesRegularScan {
    fn num(&self) -> usize {
        self.patches.len()
    }

    fn rect(&self, index: usize) -> Rect {
        self.patches.get(index).copied().unwrap_or(Rect::INVALID)
    }

    fn roi(&self) -> Rect {
        self.roi
    }

    fn anchor_rect(&self, anchor: Anchor) -> Rect {
        match anchor {
            Anchor::UpperLeft => self.rect_upper_left,
            Anchor::UpperRight => self.rect_upper_right,
            Anchor::LowerLeft => self.rect_lower_left,
            Anchor::LowerRight => self.rect_lower_right,
        }
    }

    fn anchor_rect_sized(&self, _anchor: Anchor, _patch_size: Size) -> Rect {
        Rect::INVALID
    }

    fn random_rect(&self, rng: &mut dyn RngCore) -> Rect {
        random_draw(&self.patches, rng)
    }

    fn overlap(&self, rect: Rect) -> i32 {
        first_overlap(&self.patches, rect)
    }
}

/*------------------------------------------------------------------------------
 * PatchesRegularScaleScan
 *------------------------------------------------------------------------------*/

/// Multi-scale grid: the regular scan repeated over a geometric progression
/// of patch scales, stopping once a scaled patch no longer fits the ROI.
pub struct PatchesRegularScaleScan {
    patches: Vec<Rect>,
    roi: Rect,
}

impl PatchesRegularScaleScan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        image_roi: Rect,
        valid_roi: Rect,
        patch_size: Size,
        rel_overlap: f32,
        scale_start: f32,
        scale_end: f32,
        scale_factor: f32,
    ) -> Self {
        let roi = checked_roi(image_roi, valid_roi);

        let num_scales = ((scale_end / scale_start).ln() / scale_factor.ln()) as i32;
        let num_scales = num_scales.max(0);

        let mut patches = Vec::new();
        let mut cur_scale = 1.0f32;
        for _ in 0..=num_scales {
            let cur_patch_size = patch_size.scaled(scale_start * cur_scale);
            if cur_patch_size.height > roi.height || cur_patch_size.width > roi.width {
                break;
            }
            cur_scale *= scale_factor;

            let step_col = grid_step(cur_patch_size.width, rel_overlap);
            let step_row = grid_step(cur_patch_size.height, rel_overlap);

            let mut cur_row = 0;
            while cur_row < roi.height - cur_patch_size.height + 1 {
                let mut cur_col = 0;
                while cur_col < roi.width - cur_patch_size.width + 1 {
                    patches.push(Rect {
                        upper: cur_row + roi.upper,
                        left: cur_col + roi.left,
                        height: cur_patch_size.height,
                        width: cur_patch_size.width,
                    });
                    cur_col += step_col;
                }
                cur_row += step_row;
            }
        }

        Self { patches, roi }
    }
}

impl Patches for PatchesRegularScaleScan {
    fn num(&self) -> usize {
        self.patches.len()
    }

    fn rect(&self, index: usize) -> Rect {
        self.patches.get(index).copied().unwrap_or(Rect::INVALID)
    }

    fn roi(&self) -> Rect {
        self.roi
    }

    fn anchor_rect(&self, _anchor: Anchor) -> Rect {
        Rect::INVALID
    }

    fn anchor_rect_sized(&self, anchor: Anchor, patch_size: Size) -> Rect {
        match anchor {
            Anchor::UpperLeft => Rect {
                upper: self.roi.upper,
                left: self.roi.left,
                ..Rect::from(patch_size)
            },
            Anchor::UpperRight => Rect {
                upper: self.roi.upper,
                left: self.roi.left + self.roi.width - patch_size.width,
                ..Rect::from(patch_size)
            },
            Anchor::LowerLeft => Rect {
                upper: self.roi.upper + self.roi.height - patch_size.height,
                left: self.roi.left,
                ..Rect::from(patch_size)
            },
            Anchor::LowerRight => Rect {
                upper: self.roi.upper + self.roi.height - patch_size.height,
                left: self.roi.left + self.roi.width - patch_size.width,
                ..Rect::from(patch_size)
            },
        }
    }

    fn random_rect(&self, rng: &mut dyn RngCore) -> Rect {
        random_draw(&self.patches, rng)
    }

    fn overlap(&self, rect: Rect) -> i32 {
        first_overlap(&self.patches, rect)
    }
}
