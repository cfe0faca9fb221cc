use crate::image::ImageRepresentation;
use crate::patches::{Patches, PatchesRegularScan};
use crate::strong_classifier::StrongClassifier;
use nalgebra::DMatrix;

/*------------------------------------------------------------------------------
 * Detector
 *------------------------------------------------------------------------------*/

/// Scores every patch of a sampler through a strong classifier and keeps
/// the best match plus the set of patches clearing a margin. Scratch
/// buffers grow only; the detector owns neither classifier nor image.
pub struct Detector {
    confidences: Vec<f32>,
    max_confidence: f32,
    idx_best_detection: Option<usize>,
    idx_detections: Vec<usize>,
    conf_matrix: DMatrix<f32>,
    conf_matrix_smooth: DMatrix<f32>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    pub fn new() -> Self {
        Self {
            confidences: Vec::new(),
            max_confidence: f32::MIN,
            idx_best_detection: None,
            idx_detections: Vec::new(),
            conf_matrix: DMatrix::zeros(1, 1),
            conf_matrix_smooth: DMatrix::zeros(1, 1),
        }
    }

    fn prepare_confidences(&mut self, num_patches: usize) {
        if num_patches > self.confidences.len() {
            self.confidences.resize(num_patches, 0.0);
        }
    }

    /// Evaluate the classifier over every patch; best match and detections
    /// come from the raw per-patch confidences.
    pub fn classify<C, P>(
        &mut self,
        classifier: &mut C,
        image: &ImageRepresentation,
        patches: &P,
        min_margin: f32,
    ) where
        C: StrongClassifier,
        P: Patches + ?Sized,
    {
        let num_patches = patches.num();
        self.prepare_confidences(num_patches);

        self.idx_best_detection = None;
        self.max_confidence = f32::MIN;
        self.idx_detections.clear();

        for cur in 0..num_patches {
            let confidence = classifier.eval(image, patches.rect(cur));
            self.confidences[cur] = confidence;

            if confidence > self.max_confidence {
                self.max_confidence = confidence;
                self.idx_best_detection = Some(cur);
            }
            if confidence > min_margin {
                self.idx_detections.push(cur);
            }
        }
    }

    /// As `classify`, but for a single-scale regular grid: the per-patch
    /// confidences are reshaped into the grid, blurred with a 3x3 Gaussian,
    /// and best match and detections are taken from the smoothed values.
    pub fn classify_smooth<C>(
        &mut self,
        classifier: &mut C,
        image: &ImageRepresentation,
        patches: &PatchesRegularScan,
        min_margin: f32,
    ) where
        C: StrongClassifier,
    {
        let num_patches = patches.num();
        self.prepare_confidences(num_patches);

        self.idx_best_detection = None;
        self.max_confidence = f32::MIN;
        self.idx_detections.clear();

        let grid = patches.patch_grid();
        let (rows, cols) = (grid.height as usize, grid.width as usize);

        if self.conf_matrix.nrows() != rows || self.conf_matrix.ncols() != cols {
            self.conf_matrix = DMatrix::zeros(rows, cols);
            self.conf_matrix_smooth = DMatrix::zeros(rows, cols);
        }

        let mut cur = 0usize;
        for row in 0..rows {
            for col in 0..cols {
                let confidence = classifier.eval(image, patches.rect(cur));
                self.confidences[cur] = confidence;
                self.conf_matrix[(row, col)] = confidence;
                cur += 1;
            }
        }

        gaussian_smooth_3x3(&self.conf_matrix, &mut self.conf_matrix_smooth);

        let mut cur = 0usize;
        for row in 0..rows {
            for col in 0..cols {
                let confidence = self.conf_matrix_smooth[(row, col)];
                self.confidences[cur] = confidence;

                if confidence > self.max_confidence {
                    self.max_confidence = confidence;
                    self.idx_best_detection = Some(cur);
                }
                if confidence > min_margin {
                    self.idx_detections.push(cur);
                }
                cur += 1;
            }
        }
    }

    pub fn num_detections(&self) -> usize {
        self.idx_detections.len()
    }

    pub fn confidence(&self, patch_idx: usize) -> f32 {
        self.confidences[patch_idx]
    }

    pub fn confidence_of_detection(&self, detection_idx: usize) -> f32 {
        self.confidences[self.idx_detections[detection_idx]]
    }

    pub fn confidence_of_best_detection(&self) -> f32 {
        self.max_confidence
    }

    pub fn patch_idx_of_best_detection(&self) -> Option<usize> {
        self.idx_best_detection
    }

    pub fn patch_idx_of_detection(&self, detection_idx: usize) -> usize {
        self.idx_detections[detection_idx]
    }
}

/// 3x3 Gaussian blur (separable 1-2-1 kernel, replicated borders) of `src`
/// into `dst`.
fn gaussian_smooth_3x3(src: &DMatrix<f32>, dst: &mut DMatrix<f32>) {
    let (rows, cols) = src.shape();
    let clamp_row = |r: isize| r.clamp(0, rows as isize - 1) as usize;
    let clamp_col = |c: isize| c.clamp(0, cols as isize - 1) as usize;

    const KERNEL: [f32; 3] = [1.0, 2.0, 1.0];

    for row in 0..rows {
        for col in 0..cols {
            let mut acc = 0.0f32;
            for (dr, kr) in (-1isize..=1).zip(KERNEL) {
                for (dc, kc) in (-1isize..=1).zip(KERNEL) {
                    let value = src[(clamp_row(row as isize + dr), clamp_col(col as isize + dc))];
                    acc += value * kr * kc;
                }
            }
            dst[(row, col)] = acc / 16.0;
        }
    }
}
