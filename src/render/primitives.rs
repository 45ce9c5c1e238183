use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses a host-supplied color string.
    ///
    /// Accepts `#RGB`, `#RRGGBB`, `#RRGGBBAA`, and `rgb(r, g, b)` /
    /// `rgba(r, g, b, a)` with byte channels.
    pub fn from_css_str(input: &str) -> ChartResult<Self> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return Self::from_hex_digits(hex, input);
        }
        if trimmed.starts_with("rgb") {
            return Self::from_rgb_call(trimmed, input);
        }
        Err(invalid_color(input))
    }

    fn from_hex_digits(hex: &str, original: &str) -> ChartResult<Self> {
        let channel = |byte: u8| f64::from(byte) / 255.0;
        match hex.len() {
            3 => {
                let mut bytes = [0_u8; 3];
                for (slot, digit) in bytes.iter_mut().zip(hex.chars()) {
                    let nibble =
                        u8::from_str_radix(&digit.to_string(), 16).map_err(|_| invalid_color(original))?;
                    *slot = nibble * 16 + nibble;
                }
                Ok(Self::rgb(channel(bytes[0]), channel(bytes[1]), channel(bytes[2])))
            }
            6 | 8 => {
                let mut bytes = [255_u8; 4];
                for (slot, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks(2)) {
                    let pair = std::str::from_utf8(pair).map_err(|_| invalid_color(original))?;
                    *slot = u8::from_str_radix(pair, 16).map_err(|_| invalid_color(original))?;
                }
                Ok(Self::rgba(
                    channel(bytes[0]),
                    channel(bytes[1]),
                    channel(bytes[2]),
                    channel(bytes[3]),
                ))
            }
            _ => Err(invalid_color(original)),
        }
    }

    fn from_rgb_call(call: &str, original: &str) -> ChartResult<Self> {
        let open = call.find('(').ok_or_else(|| invalid_color(original))?;
        let close = call.rfind(')').ok_or_else(|| invalid_color(original))?;
        if close <= open {
            return Err(invalid_color(original));
        }

        let parts: Vec<&str> = call[open + 1..close].split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(invalid_color(original));
        }

        let mut channels = [1.0_f64; 4];
        for (slot, part) in channels.iter_mut().take(3).zip(&parts) {
            let byte: f64 = part.parse().map_err(|_| invalid_color(original))?;
            if !(0.0..=255.0).contains(&byte) {
                return Err(invalid_color(original));
            }
            *slot = byte / 255.0;
        }
        if let Some(alpha) = parts.get(3) {
            channels[3] = alpha.parse().map_err(|_| invalid_color(original))?;
        }

        let color = Self::rgba(channels[0], channels[1], channels[2], channels[3]);
        color.validate()?;
        Ok(color)
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn invalid_color(input: &str) -> ChartError {
    ChartError::InvalidSettings(format!("unparseable color `{input}`"))
}

/// Stroke pattern applied to a line primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStrokeStyle {
    /// On/off pixel pattern for backends that consume dash arrays.
    #[must_use]
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            Self::Solid => &[],
            Self::Dashed => &[8.0, 4.0],
            Self::Dotted => &[2.0, 2.0],
        }
    }
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub stroke_style: LineStrokeStyle,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            stroke_style: LineStrokeStyle::Solid,
            color,
        }
    }

    #[must_use]
    pub const fn with_stroke_style(mut self, stroke_style: LineStrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.x1.is_finite()
            || !self.y1.is_finite()
            || !self.x2.is_finite()
            || !self.y2.is_finite()
        {
            return Err(ChartError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "line stroke width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Draw command for one filled marker dot in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePrimitive {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
}

impl CirclePrimitive {
    #[must_use]
    pub const fn new(x: f64, y: f64, radius: f64, color: Color) -> Self {
        Self {
            x,
            y,
            radius,
            color,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "circle coordinates must be finite".to_owned(),
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ChartError::InvalidData(
                "circle radius must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

/// Draw command for one label in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub font_family: String,
    pub color: Color,
    pub h_align: TextHAlign,
    /// Clockwise rotation around (x, y) in degrees. 0 is horizontal.
    pub rotation_degrees: f64,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            font_family: "sans-serif".to_owned(),
            color,
            h_align,
            rotation_degrees: 0.0,
        }
    }

    #[must_use]
    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation_degrees: f64) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.text.is_empty() {
            return Err(ChartError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        if !self.rotation_degrees.is_finite() {
            return Err(ChartError::InvalidData(
                "text rotation must be finite".to_owned(),
            ));
        }
        self.color.validate()
    }
}
