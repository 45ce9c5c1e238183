use serde::{Deserialize, Serialize};

use crate::core::DataPoint;
use crate::error::{ChartError, ChartResult};

/// Tuning controls for domain fitting on either axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleTuning {
    pub padding_ratio: f64,
    pub min_span_absolute: f64,
}

impl Default for ScaleTuning {
    fn default() -> Self {
        Self {
            padding_ratio: 0.05,
            min_span_absolute: 0.000_001,
        }
    }
}

impl ScaleTuning {
    fn validate(self) -> ChartResult<Self> {
        if !self.padding_ratio.is_finite() || self.padding_ratio < 0.0 {
            return Err(ChartError::InvalidData(
                "scale padding ratio must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_span_absolute.is_finite() || self.min_span_absolute <= 0.0 {
            return Err(ChartError::InvalidData(
                "scale min span must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Category (X) axis model mapping the fitted domain left-to-right onto a
/// pixel extent. Works identically for date axes (unix seconds) and plain
/// numeric axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScale {
    domain_start: f64,
    domain_end: f64,
}

impl CategoryScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        let (start, end) = normalize_domain(domain_start, domain_end, 1.0)?;
        Ok(Self {
            domain_start: start,
            domain_end: end,
        })
    }

    /// Fits the domain from the point series' x values and applies padding.
    pub fn from_points(points: &[DataPoint], tuning: ScaleTuning) -> ChartResult<Self> {
        let tuning = tuning.validate()?;
        let (min, max) = fit_range(points.iter().map(|p| p.x), "category")?;
        let (start, end) = normalize_domain(min, max, tuning.min_span_absolute)?;
        let pad = (end - start) * tuning.padding_ratio;
        Ok(Self {
            domain_start: start - pad,
            domain_end: end + pad,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    /// Maps a domain value onto `[0, extent_px]`, left to right.
    pub fn to_pixel(self, value: f64, extent_px: f64) -> ChartResult<f64> {
        let normalized = self.normalize(value, extent_px)?;
        Ok(normalized * extent_px)
    }

    fn normalize(self, value: f64, extent_px: f64) -> ChartResult<f64> {
        validate_projection(value, extent_px)?;
        Ok((value - self.domain_start) / (self.domain_end - self.domain_start))
    }
}

/// Value (Y) axis model mapping the fitted domain onto an inverted pixel
/// extent (largest value at pixel 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScale {
    domain_start: f64,
    domain_end: f64,
}

impl ValueScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        let (start, end) = normalize_domain(domain_start, domain_end, 0.000_001)?;
        Ok(Self {
            domain_start: start,
            domain_end: end,
        })
    }

    /// Fits the domain from the measurement values plus any overlay values
    /// (control limits, mean lines) so no chart line lands outside the axis.
    pub fn from_chart_data(
        points: &[DataPoint],
        overlay_values: &[f64],
        tuning: ScaleTuning,
    ) -> ChartResult<Self> {
        let tuning = tuning.validate()?;
        let values = points.iter().map(|p| p.y).chain(overlay_values.iter().copied());
        let (min, max) = fit_range(values, "value")?;
        let (start, end) = normalize_domain(min, max, tuning.min_span_absolute)?;
        let pad = (end - start) * tuning.padding_ratio;
        Ok(Self {
            domain_start: start - pad,
            domain_end: end + pad,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    /// Maps a domain value onto `[0, extent_px]` with the Y axis inverted.
    pub fn to_pixel(self, value: f64, extent_px: f64) -> ChartResult<f64> {
        validate_projection(value, extent_px)?;
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        Ok(extent_px - normalized * extent_px)
    }
}

fn fit_range(values: impl Iterator<Item = f64>, axis: &str) -> ChartResult<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut seen = false;

    for value in values {
        if !value.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "{axis} axis values must be finite"
            )));
        }
        min = min.min(value);
        max = max.max(value);
        seen = true;
    }

    if !seen {
        return Err(ChartError::InvalidData(format!(
            "{axis} axis cannot be fitted from empty data"
        )));
    }

    Ok((min, max))
}

fn normalize_domain(start: f64, end: f64, min_span: f64) -> ChartResult<(f64, f64)> {
    if !start.is_finite() || !end.is_finite() {
        return Err(ChartError::InvalidData(
            "scale domain must be finite".to_owned(),
        ));
    }

    if start == end {
        let half = min_span / 2.0;
        return Ok((start - half, end + half));
    }

    Ok((start.min(end), start.max(end)))
}

fn validate_projection(value: f64, extent_px: f64) -> ChartResult<()> {
    if !extent_px.is_finite() || extent_px <= 0.0 {
        return Err(ChartError::InvalidData(
            "pixel extent must be finite and > 0".to_owned(),
        ));
    }
    if !value.is_finite() {
        return Err(ChartError::InvalidData("value must be finite".to_owned()));
    }
    Ok(())
}
