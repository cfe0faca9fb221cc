use crate::gauss::EstimatedGauss;
use crate::image::ImageRepresentation;
use crate::rect::{Point2D, Rect, Size};
use rand::Rng;

/*------------------------------------------------------------------------------
 * Haar-like feature
 *------------------------------------------------------------------------------*/

const MIN_AREA_SIZE: Size = Size {
    height: 3,
    width: 3,
};
const MIN_AREA: i32 = 9;

fn init_sigma(num_areas: usize) -> f32 {
    (256.0f32 * 256.0 / 12.0 * num_areas as f32).sqrt()
}

/// The active template shapes. Each is a weighted combination of 2-4
/// axis-aligned sub-rectangles over a common base cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    /// 2x1 bipartite, top minus bottom.
    Vertical2,
    /// 1x2 bipartite, left minus right.
    Horizontal2,
    /// 4x1 tripartite, outer cells minus the doubled middle.
    Vertical4,
    /// 1x4 tripartite, outer cells minus the doubled middle.
    Horizontal4,
    /// 2x2 quadripartite checkerboard.
    Quad,
    /// 3x3 ring: full block minus nine times the center cell.
    Ring,
}

const TEMPLATES: [Template; 6] = [
    Template::Vertical2,
    Template::Horizontal2,
    Template::Vertical4,
    Template::Horizontal4,
    Template::Quad,
    Template::Ring,
];

impl Template {
    /// Extent of the full shape in base-cell units.
    fn size_factor(self) -> Size {
        match self {
            Template::Vertical2 => Size::new(2, 1),
            Template::Horizontal2 => Size::new(1, 2),
            Template::Vertical4 => Size::new(4, 1),
            Template::Horizontal4 => Size::new(1, 4),
            Template::Quad => Size::new(2, 2),
            Template::Ring => Size::new(3, 3),
        }
    }

    fn weights(self) -> &'static [i32] {
        match self {
            Template::Vertical2 | Template::Horizontal2 => &[1, -1],
            Template::Vertical4 | Template::Horizontal4 => &[1, -2, 1],
            Template::Quad => &[1, -1, -1, 1],
            Template::Ring => &[1, -9],
        }
    }

    /// Sub-rectangles at `position` with base cell `dim`, in template-local
    /// image coordinates.
    fn areas(self, position: Point2D, dim: Size) -> Vec<Rect> {
        let cell = |row_cells: i32, col_cells: i32, h_cells: i32, w_cells: i32| Rect {
            upper: position.row + row_cells * dim.height,
            left: position.col + col_cells * dim.width,
            height: h_cells * dim.height,
            width: w_cells * dim.width,
        };

        match self {
            Template::Vertical2 => vec![cell(0, 0, 1, 1), cell(1, 0, 1, 1)],
            Template::Horizontal2 => vec![cell(0, 0, 1, 1), cell(0, 1, 1, 1)],
            Template::Vertical4 => {
                vec![cell(0, 0, 1, 1), cell(1, 0, 2, 1), cell(3, 0, 1, 1)]
            }
            Template::Horizontal4 => {
                vec![cell(0, 0, 1, 1), cell(0, 1, 1, 2), cell(0, 3, 1, 1)]
            }
            Template::Quad => vec![
                cell(0, 0, 1, 1),
                cell(0, 1, 1, 1),
                cell(1, 0, 1, 1),
                cell(1, 1, 1, 1),
            ],
            Template::Ring => vec![cell(0, 0, 3, 3), cell(1, 1, 1, 1)],
        }
    }

    /// Seed mean for the response distribution. Zero-sum templates center at
    /// zero; the ring's asymmetric weight sum shifts it by -8 * 128.
    fn init_mean(self) -> f32 {
        match self {
            Template::Ring => -8.0 * 128.0,
            _ => 0.0,
        }
    }
}

/// A randomly generated Haar-like rectangle feature, evaluable at any region
/// size against an integral image. The shape is immutable after generation;
/// the per-size scaled geometry is a lazily refreshed cache.
pub struct FeatureHaar {
    num_areas: usize,
    weights: &'static [i32],
    areas: Vec<Rect>,
    init_mean: f32,
    init_sigma: f32,
    init_size: Size,
    cur_size: Size,
    scale_factor_height: f32,
    scale_factor_width: f32,
    scale_areas: Vec<Rect>,
    scale_weights: Vec<f32>,
    response: f32,
}

impl FeatureHaar {
    /// Rejection-sample a feature fitting inside `patch_size`: a random
    /// anchor, base-cell dimensions biased toward small areas, and one of
    /// the six templates drawn uniformly. Redraw whenever the shape leaves
    /// the patch or falls under the minimum area.
    pub fn generate<R: Rng>(patch_size: Size, rng: &mut R) -> Self {
        loop {
            let position = Point2D::new(
                rng.gen_range(0..patch_size.height),
                rng.gen_range(0..patch_size.width),
            );

            // 1 - sqrt(1 - U) concentrates mass on small cells.
            let u: f32 = rng.gen();
            let base_width = ((1.0 - (1.0 - u).sqrt()) * patch_size.width as f32) as i32;
            let u: f32 = rng.gen();
            let base_height = ((1.0 - (1.0 - u).sqrt()) * patch_size.height as f32) as i32;
            let base_dim = Size::new(base_height, base_width);

            let template = TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
            let size_factor = template.size_factor();

            if position.row + base_dim.height * size_factor.height >= patch_size.height
                || position.col + base_dim.width * size_factor.width >= patch_size.width
            {
                continue;
            }
            let area = base_dim.height * size_factor.height * base_dim.width * size_factor.width;
            if area < MIN_AREA {
                continue;
            }

            let areas = template.areas(position, base_dim);
            let weights = template.weights();
            let num_areas = areas.len();

            let scale_areas = areas.clone();
            let scale_weights = areas
                .iter()
                .zip(weights)
                .map(|(a, &w)| w as f32 / (a.width * a.height) as f32)
                .collect();

            return Self {
                num_areas,
                weights,
                areas,
                init_mean: template.init_mean(),
                init_sigma: init_sigma(num_areas),
                init_size: patch_size,
                cur_size: patch_size,
                scale_factor_height: 1.0,
                scale_factor_width: 1.0,
                scale_areas,
                scale_weights,
                response: 0.0,
            };
        }
    }

    /// Seed a response distribution with the template's initial statistics.
    pub fn initial_distribution(&self, distribution: &mut EstimatedGauss) {
        distribution.set_values(self.init_mean, self.init_sigma);
    }

    pub fn response(&self) -> f32 {
        self.response
    }

    /// Refresh the scaled geometry for a region of size `roi`. Returns false
    /// when any rescaled sub-rectangle drops below the 3x3 floor; that
    /// failure is sticky until the evaluated size changes again.
    fn rescale(&mut self, roi: Size) -> bool {
        if self.cur_size == roi {
            return self.scale_factor_width != 0.0;
        }
        self.cur_size = roi;

        if self.init_size == self.cur_size {
            self.scale_factor_height = 1.0;
            self.scale_factor_width = 1.0;
            for cur in 0..self.num_areas {
                self.scale_areas[cur] = self.areas[cur];
                self.scale_weights[cur] = self.weights[cur] as f32
                    / (self.areas[cur].width * self.areas[cur].height) as f32;
            }
            return true;
        }

        self.scale_factor_height = self.cur_size.height as f32 / self.init_size.height as f32;
        self.scale_factor_width = self.cur_size.width as f32 / self.init_size.width as f32;

        for cur in 0..self.num_areas {
            let area = self.areas[cur];
            let height = (area.height as f32 * self.scale_factor_height + 0.5).floor() as i32;
            let width = (area.width as f32 * self.scale_factor_width + 0.5).floor() as i32;

            if height < MIN_AREA_SIZE.height || width < MIN_AREA_SIZE.width {
                self.scale_factor_width = 0.0;
                return false;
            }

            self.scale_areas[cur] = Rect {
                upper: (area.upper as f32 * self.scale_factor_height + 0.5).floor() as i32,
                left: (area.left as f32 * self.scale_factor_width + 0.5).floor() as i32,
                height,
                width,
            };
            self.scale_weights[cur] = self.weights[cur] as f32 / (width * height) as f32;
        }

        true
    }

    /// Scalar response over `roi`, or `None` when the feature cannot be
    /// rescaled to that size. Optionally variance-normalized when the image
    /// store has variance enabled.
    pub fn eval(&mut self, image: &ImageRepresentation, roi: Rect) -> Option<f32> {
        if !self.rescale(roi.size()) {
            return None;
        }

        let offset = Point2D::from(roi);
        let mut result = 0.0f32;
        for cur in 0..self.num_areas {
            result += image.sum(self.scale_areas[cur] + offset) as f32 * self.scale_weights[cur];
        }

        if image.use_variance() {
            result /= image.variance(roi);
        }

        self.response = result;
        Some(result)
    }
}
