//! Mid/side widening matrix

/// Stereo widening in the mid/side domain
///
/// ```text
/// norm = 1 / (widen + 2)        (fallback when widen + 2 < floor)
/// L' = mid·norm·(L + R) - (widen + 1)·norm·(R - L)
/// R' = mid·norm·(L + R) + (widen + 1)·norm·(R - L)
/// ```
///
/// With `widen = 0` and `mid = 1` the matrix is the identity.
#[derive(Debug, Clone)]
pub struct Stereo3DSurround {
    stereo_widen: f32,
    middle_image: f32,
    normalize_floor: f32,
    normalize_fallback: f32,
    coeff_left: f32,
    coeff_right: f32,
}

impl Default for Stereo3DSurround {
    fn default() -> Self {
        let mut widen = Self {
            stereo_widen: 0.0,
            middle_image: 1.0,
            normalize_floor: 2.0,
            normalize_fallback: 0.5,
            coeff_left: 0.5,
            coeff_right: 0.5,
        };
        widen.update_coefficients();
        widen
    }
}

impl Stereo3DSurround {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stereo_widen(&mut self, widen: f32) {
        self.stereo_widen = widen;
        self.update_coefficients();
    }

    pub fn set_middle_image(&mut self, mid: f32) {
        self.middle_image = mid;
        self.update_coefficients();
    }

    /// Denominators below `floor` use `fallback` as the normalization factor
    pub fn set_normalization(&mut self, floor: f32, fallback: f32) {
        self.normalize_floor = floor;
        self.normalize_fallback = fallback;
        self.update_coefficients();
    }

    pub fn stereo_widen(&self) -> f32 {
        self.stereo_widen
    }

    pub fn middle_image(&self) -> f32 {
        self.middle_image
    }

    /// `(mid coefficient, side coefficient)`
    pub fn coefficients(&self) -> (f32, f32) {
        (self.coeff_left, self.coeff_right)
    }

    fn update_coefficients(&mut self) {
        let side_gain = self.stereo_widen + 1.0;
        let denominator = side_gain + 1.0;
        let norm = if denominator < self.normalize_floor {
            self.normalize_fallback
        } else {
            1.0 / denominator
        };
        self.coeff_left = self.middle_image * norm;
        self.coeff_right = side_gain * norm;
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for frame in samples.chunks_exact_mut(2) {
            let (left, right) = (frame[0], frame[1]);
            let mid = self.coeff_left * (left + right);
            let side = self.coeff_right * (right - left);
            frame[0] = mid - side;
            frame[1] = mid + side;
        }
    }
}
