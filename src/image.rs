use crate::rect::{Point2D, Rect, Size};

/*------------------------------------------------------------------------------
 * ImageRepresentation
 *------------------------------------------------------------------------------*/

/// Summed-area tables (plain and squared) over a region of interest of a
/// grayscale raster. All rectangle-sum queries run in O(1) via the
/// four-corner inclusion-exclusion formula.
///
/// `sum_table[y * (w + 1) + x]` holds the sum of source pixels in
/// `[0, y) x [0, x)` relative to the ROI origin.
pub struct ImageRepresentation {
    image_size: Size,
    roi: Rect,
    offset: Point2D,
    use_variance: bool,
    int_image: Vec<u32>,
    int_sq_image: Vec<u64>,
}

impl ImageRepresentation {
    /// Build the tables over the whole image.
    pub fn new(image: &[u8], image_size: Size) -> Self {
        let roi = Rect::from(image_size);
        Self::with_roi(image, image_size, roi)
    }

    /// Build the tables over `roi` only.
    pub fn with_roi(image: &[u8], image_size: Size, roi: Rect) -> Self {
        let len = ((roi.width + 1) * (roi.height + 1)) as usize;
        let mut rep = Self {
            image_size,
            roi,
            offset: Point2D::from(roi),
            use_variance: false,
            int_image: vec![0; len],
            int_sq_image: vec![0; len],
        };
        rep.create_integrals_of_roi(image);
        rep
    }

    pub fn roi(&self) -> Rect {
        self.roi
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn use_variance(&self) -> bool {
        self.use_variance
    }

    pub fn set_use_variance(&mut self, use_variance: bool) {
        self.use_variance = use_variance;
    }

    /// Rebuild the tables from a new raster, keeping the current ROI.
    pub fn set_new_image(&mut self, image: &[u8]) {
        self.create_integrals_of_roi(image);
    }

    /// Re-target the ROI. The tables are reallocated only when the area
    /// changes; their contents are stale until the next image is supplied.
    pub fn set_new_roi(&mut self, roi: Rect) {
        if self.roi.height * self.roi.width != roi.height * roi.width {
            let len = ((roi.width + 1) * (roi.height + 1)) as usize;
            self.int_image = vec![0; len];
            self.int_sq_image = vec![0; len];
        }
        self.roi = roi;
        self.offset = Point2D::from(roi);
    }

    pub fn set_new_image_size(&mut self, size: Size) {
        self.image_size = size;
    }

    pub fn set_new_image_and_roi(&mut self, image: &[u8], roi: Rect) {
        self.set_new_roi(roi);
        self.create_integrals_of_roi(image);
    }

    /// Clamp a query rectangle to the built ROI, returning the table origin
    /// and the effective width/height.
    fn checked_query(&self, image_roi: Rect) -> (usize, usize, usize, usize) {
        let origin_x = (image_roi.left - self.offset.col).max(0);
        let origin_y = (image_roi.upper - self.offset.row).max(0);

        let mut width = image_roi.width;
        let mut height = image_roi.height;
        if origin_x + width >= self.roi.width {
            width = self.roi.width - origin_x;
        }
        if origin_y + height >= self.roi.height {
            height = self.roi.height - origin_y;
        }

        (
            origin_y as usize,
            origin_x as usize,
            height.max(0) as usize,
            width.max(0) as usize,
        )
    }

    /// Pixel sum inside `image_roi` (clamped to the built ROI).
    pub fn sum(&self, image_roi: Rect) -> i32 {
        let (oy, ox, height, width) = self.checked_query(image_roi);
        let stride = (self.roi.width + 1) as usize;
        let origin = oy * stride + ox;
        let down = height * stride;

        (self.int_image[origin + down + width] as i64 + self.int_image[origin] as i64
            - self.int_image[origin + width] as i64
            - self.int_image[origin + down] as i64) as i32
    }

    /// Sum of squared pixels inside `image_roi` (clamped to the built ROI).
    pub fn sq_sum(&self, image_roi: Rect) -> i64 {
        let (oy, ox, height, width) = self.checked_query(image_roi);
        let stride = (self.roi.width + 1) as usize;
        let origin = oy * stride + ox;
        let down = height * stride;

        self.int_sq_image[origin + down + width] as i64 + self.int_sq_image[origin] as i64
            - self.int_sq_image[origin + width] as i64
            - self.int_sq_image[origin + down] as i64
    }

    pub fn mean(&self, image_roi: Rect) -> f32 {
        let (_, _, height, width) = self.checked_query(image_roi);
        if height * width == 0 {
            return 0.0;
        }
        self.sum(image_roi) as f32 / (height * width) as f32
    }

    /// Standard deviation of the pixels in `image_roi`; 1.0 when the
    /// radicand goes negative through rounding.
    pub fn variance(&self, image_roi: Rect) -> f32 {
        let area = (image_roi.height * image_roi.width) as f64;
        if area == 0.0 {
            return 1.0;
        }
        let mean = self.sum(image_roi) as f64 / area;
        let sq_sum = self.sq_sum(image_roi) as f64;

        let variance = sq_sum / area - mean * mean;
        if variance >= 0.0 {
            variance.sqrt() as f32
        } else {
            1.0
        }
    }

    /// Single-pass row-cumulative build over the current ROI.
    fn create_integrals_of_roi(&mut self, image: &[u8]) {
        let stride = (self.roi.width + 1) as usize;

        self.int_image.fill(0);
        self.int_sq_image.fill(0);

        for row in 0..self.roi.height as usize {
            let mut cur = (row as i32 + self.roi.upper) as usize * self.image_size.width as usize
                + self.roi.left as usize;
            let mut dptr = stride * (row + 1) + 1;

            let mut row_sum: u32 = 0;
            let mut row_sq_sum: u64 = 0;

            for _ in 0..self.roi.width as usize {
                let value = image[cur] as u32;
                row_sum += value;
                row_sq_sum += (value * value) as u64;

                self.int_image[dptr] = self.int_image[dptr - stride] + row_sum;
                self.int_sq_image[dptr] = self.int_sq_image[dptr - stride] + row_sq_sum;

                dptr += 1;
                cur += 1;
            }
        }
    }
}
