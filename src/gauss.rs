/*------------------------------------------------------------------------------
 * EstimatedGauss
 *------------------------------------------------------------------------------*/

/// One-dimensional Gaussian appearance model, updated incrementally with a
/// Kalman-style recursive estimator for both mean and spread.
#[derive(Debug, Clone)]
pub struct EstimatedGauss {
    mean: f32,
    sigma: f32,
    p_mean: f32,
    r_mean: f32,
    p_sigma: f32,
    r_sigma: f32,
}

impl Default for EstimatedGauss {
    fn default() -> Self {
        Self::with_noise(1000.0, 0.01, 1000.0, 0.01)
    }
}

impl EstimatedGauss {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_noise(p_mean: f32, r_mean: f32, p_sigma: f32, r_sigma: f32) -> Self {
        Self {
            mean: 0.0,
            sigma: 1.0,
            p_mean,
            r_mean,
            p_sigma,
            r_sigma,
        }
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn set_values(&mut self, mean: f32, sigma: f32) {
        self.mean = mean;
        self.sigma = sigma;
    }

    /// Fold one observation into the model. The Kalman gain is floored at
    /// 0.001 so the model never stops adapting; sigma is floored at 1.0.
    pub fn update(&mut self, value: f32) {
        const MIN_FACTOR: f32 = 0.001;

        let k = (self.p_mean / (self.p_mean + self.r_mean)).max(MIN_FACTOR);
        self.mean = k * value + (1.0 - k) * self.mean;
        self.p_mean = self.p_mean * self.r_mean / (self.p_mean + self.r_mean);

        let k = (self.p_sigma / (self.p_sigma + self.r_sigma)).max(MIN_FACTOR);
        let tmp_sigma =
            k * (self.mean - value) * (self.mean - value) + (1.0 - k) * self.sigma * self.sigma;
        self.p_sigma = self.p_sigma * self.r_mean / (self.p_sigma + self.r_sigma);

        self.sigma = tmp_sigma.sqrt().max(1.0);
    }
}
