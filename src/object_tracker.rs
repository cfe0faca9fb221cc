use crate::boosting_tracker::BoostingTracker;
use crate::error::TrackError;
use crate::image::ImageRepresentation;
use crate::patches::PatchesRegularScan;
use crate::rect::{Rect, Size};
use crate::semi_boosting_tracker::SemiBoostingTracker;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/*------------------------------------------------------------------------------
 * ObjectTrackerParams
 *------------------------------------------------------------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    OnlineBoosting,
    SemiOnlineBoosting,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTrackerParams {
    pub algorithm: Algorithm,
    /// Number of boosting stages of the strong classifier.
    pub num_classifiers: usize,
    /// Relative overlap of neighboring patches in the scan grid.
    pub overlap: f32,
    /// Search region scale relative to the tracked patch.
    pub search_factor: f32,
}

impl Default for ObjectTrackerParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::OnlineBoosting,
            num_classifiers: 100,
            overlap: 0.99,
            search_factor: 2.0,
        }
    }
}

impl ObjectTrackerParams {
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.num_classifiers == 0 {
            return Err(TrackError::InvalidParams(
                "num_classifiers must be positive".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(TrackError::InvalidParams(
                "overlap must lie in [0, 1)".into(),
            ));
        }
        if self.search_factor < 1.0 {
            return Err(TrackError::InvalidParams(
                "search_factor must be at least 1.0".into(),
            ));
        }
        Ok(())
    }
}

/*------------------------------------------------------------------------------
 * ObjectTracker
 *------------------------------------------------------------------------------*/

/// Result of one tracking step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub rect: Rect,
    pub confidence: f32,
    pub lost: bool,
}

enum TrackerVariant {
    Boosting(BoostingTracker),
    SemiBoosting(SemiBoostingTracker),
}

/// Frame-in, box-out facade over the online-boosting trackers: owns the
/// integral-image buffers, the scan-grid construction per frame and the
/// random state, so a caller only hands in grayscale rasters.
pub struct ObjectTracker {
    params: ObjectTrackerParams,
    rng: StdRng,
    state: Option<TrackerState>,
}

struct TrackerState {
    tracker: TrackerVariant,
    image: ImageRepresentation,
    tracking_rect_size: Size,
}

impl ObjectTracker {
    pub fn new(params: ObjectTrackerParams) -> Self {
        Self::with_seed(params, rand::random())
    }

    /// Seeded construction for reproducible runs.
    pub fn with_seed(params: ObjectTrackerParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            state: None,
        }
    }

    pub fn params(&self) -> ObjectTrackerParams {
        self.params
    }

    /// Train the classifier on the first frame. `image` is a row-major
    /// 8-bit grayscale raster of `width * height` pixels, `bbox` the object
    /// to learn. Replaces any previous tracking state.
    pub fn initialize(
        &mut self,
        image: &[u8],
        width: usize,
        height: usize,
        bbox: Rect,
    ) -> Result<(), TrackError> {
        self.params.validate()?;

        let image_size = Size::new(height as i32, width as i32);
        if image.len() != width * height {
            return Err(TrackError::ImageSizeMismatch);
        }
        if bbox.height <= 0 || bbox.width <= 0 || !bbox.is_valid(Rect::from(image_size)) {
            return Err(TrackError::InvalidBoundingBox);
        }

        info!(
            "initializing {:?} tracker on a {}x{} frame, target {:?}",
            self.params.algorithm, width, height, bbox
        );

        let image_rep = ImageRepresentation::new(image, image_size);
        let valid_roi = Rect::from(image_size);

        let tracker = match self.params.algorithm {
            Algorithm::OnlineBoosting => TrackerVariant::Boosting(BoostingTracker::new(
                &image_rep,
                bbox,
                valid_roi,
                self.params.num_classifiers,
                &mut self.rng,
            )),
            Algorithm::SemiOnlineBoosting => TrackerVariant::SemiBoosting(SemiBoostingTracker::new(
                &image_rep,
                bbox,
                valid_roi,
                self.params.num_classifiers,
                &mut self.rng,
            )),
        };

        self.state = Some(TrackerState {
            tracker,
            image: image_rep,
            tracking_rect_size: bbox.size(),
        });
        Ok(())
    }

    /// Track the object into the next frame. The frame must have the same
    /// dimensions as the one given to `initialize`. When the object is lost
    /// the last position is reported with `lost` set; the classifier is left
    /// untouched so a later frame may re-acquire it.
    pub fn update(&mut self, image: &[u8]) -> Result<TrackState, TrackError> {
        let state = self.state.as_mut().ok_or(TrackError::NotInitialized)?;

        let image_size = state.image.image_size();
        if image.len() != image_size.area() as usize {
            return Err(TrackError::ImageSizeMismatch);
        }

        let valid_roi = Rect::from(image_size);
        let search_roi = match &state.tracker {
            TrackerVariant::Boosting(t) => t.tracking_roi(self.params.search_factor),
            TrackerVariant::SemiBoosting(t) => t.tracking_roi(self.params.search_factor),
        };

        // The integral tables only need to cover the search region.
        state.image.set_new_image_and_roi(image, search_roi);

        let patches = PatchesRegularScan::new(
            search_roi,
            valid_roi,
            state.tracking_rect_size,
            self.params.overlap,
        );

        let (found, rect, confidence) = match &mut state.tracker {
            TrackerVariant::Boosting(t) => {
                let found = t.track(&state.image, &patches, &mut self.rng);
                (found, t.tracked_patch(), t.confidence())
            }
            TrackerVariant::SemiBoosting(t) => {
                let found = t.track(&state.image, &patches, &mut self.rng);
                (found, t.tracked_patch(), t.confidence())
            }
        };

        debug!(
            "frame update: found={} rect={:?} confidence={:.4}",
            found, rect, confidence
        );

        Ok(TrackState {
            rect,
            confidence,
            lost: !found,
        })
    }
}
