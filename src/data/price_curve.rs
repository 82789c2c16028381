/// Deterministic sine price curve
use std::f64::consts::PI;

use crate::error::{Result, SynthError};
use crate::types::PriceCurveConfig;

/// Prices for one bucket. Open equals close; high/low are a fixed band around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCurve {
    base_price: f64,
    amplitude: f64,
    band_ratio: f64,
    volume: u64,
}

impl PriceCurve {
    pub fn new(base_price: f64, amplitude: f64, band_ratio: f64, volume: u64) -> Result<Self> {
        if !(base_price.is_finite() && base_price > 0.0) {
            return Err(SynthError::InvalidParameter(format!("base_price must be > 0, got {}", base_price)));
        }
        if !(amplitude.is_finite() && amplitude >= 0.0 && amplitude < base_price) {
            return Err(SynthError::InvalidParameter(format!(
                "amplitude must be in [0, base_price), got {}",
                amplitude
            )));
        }
        if !(band_ratio.is_finite() && band_ratio >= 1.0) {
            return Err(SynthError::InvalidParameter(format!("band_ratio must be >= 1, got {}", band_ratio)));
        }

        Ok(PriceCurve {
            base_price,
            amplitude,
            band_ratio,
            volume,
        })
    }

    pub fn from_config(config: &PriceCurveConfig) -> Result<Self> {
        PriceCurve::new(config.base_price, config.amplitude, config.band_ratio, config.volume)
    }

    /// Close for bucket `index` of `count`. One degree per bucket, the last bucket
    /// always lands on 359 degrees.
    pub fn close(&self, index: usize, count: usize) -> f64 {
        let degrees = 360.0 - count as f64 + index as f64;
        self.base_price + self.amplitude * (PI * degrees / 180.0).sin()
    }

    pub fn point(&self, index: usize, count: usize) -> PricePoint {
        let close = self.close(index, count);
        PricePoint {
            open: close,
            high: close * self.band_ratio,
            low: close / self.band_ratio,
            close,
            volume: self.volume,
        }
    }
}

impl Default for PriceCurve {
    fn default() -> Self {
        PriceCurve {
            base_price: 100.0,
            amplitude: 10.0,
            band_ratio: 1.005,
            volume: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_four_bucket_phases() {
        let curve = PriceCurve::default();
        assert_eq!(curve.close(0, 4), 100.0 + 10.0 * (PI * 356.0 / 180.0).sin());
        assert_eq!(curve.close(1, 4), 100.0 + 10.0 * (PI * 357.0 / 180.0).sin());
        assert_relative_eq!(curve.close(0, 4), 99.3024, epsilon = 1e-4);
        assert_relative_eq!(curve.close(1, 4), 99.4766, epsilon = 1e-4);
    }

    #[test]
    fn test_last_bucket_anchored_at_359_degrees() {
        let curve = PriceCurve::default();
        let anchor = 100.0 + 10.0 * (PI * 359.0 / 180.0).sin();
        for count in [1usize, 10, 360, 1000] {
            assert_eq!(curve.close(count - 1, count), anchor);
        }
    }

    #[test]
    fn test_price_band() {
        let curve = PriceCurve::default();
        for i in 0..500 {
            let p = curve.point(i, 500);
            assert!(p.low <= p.open);
            assert_eq!(p.open, p.close);
            assert!(p.close <= p.high);
            assert_relative_eq!(p.high / p.low, 1.005 * 1.005, max_relative = 1e-12);
            assert_eq!(p.volume, 1000);
        }
    }

    #[test]
    fn test_curve_is_deterministic() {
        let a = PriceCurve::default();
        let b = PriceCurve::from_config(&PriceCurveConfig::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.close(17, 90), b.close(17, 90));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(PriceCurve::new(0.0, 1.0, 1.005, 1000).is_err());
        assert!(PriceCurve::new(100.0, 150.0, 1.005, 1000).is_err());
        assert!(PriceCurve::new(100.0, 10.0, 0.99, 1000).is_err());
        assert!(PriceCurve::new(100.0, 10.0, f64::NAN, 1000).is_err());
    }
}
