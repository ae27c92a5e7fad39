//! GIMP gradients and the predefined transfer function palettes.
//!
//! A gradient is a list of segments over `[0, 1]`. Each segment blends linearly from its left color to the average of its
//! end colors at `middle`, and from there to its right color. Sampling a gradient at 256 evenly spaced positions gives a
//! color map.
//!
//! Only the GIMP 1.2 text format is read, with the optional `Name:` line of later versions. Segments must use linear
//! blending in RGB.
//!
//! ```
//! use voxel_tiles_storage::prelude::*;
//!
//! let text = "GIMP Gradient\n1\n0 0.5 1 0 0 0 1 1 1 1 1 0 0\n";
//! let map = ColorMap::from_gimp_gradient(text).unwrap();
//! assert_eq!(map.len(), 256);
//!
//! let seismic = ColorMap::predefined_by_name("seismic").unwrap();
//! assert_eq!(seismic.len(), 256);
//! assert!(ColorMap::predefined_by_name("sepia").is_none());
//! ```

use crate::{ColorMap, Rgba8};

use std::fmt;

/// The number of entries in a color map sampled from a gradient.
pub const GRADIENT_TABLE_LEN: usize = 256;

const HEADER: &str = "GIMP Gradient";

/// One piece of a gradient. Positions are in `[0, 1]` and colors are RGBA in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientSegment {
    pub left: f32,
    pub middle: f32,
    pub right: f32,
    pub left_rgba: [f32; 4],
    pub right_rgba: [f32; 4],
}

impl GradientSegment {
    fn middle_rgba(&self) -> [f32; 4] {
        let mut rgba = [0.0; 4];
        for (i, c) in rgba.iter_mut().enumerate() {
            *c = (self.right_rgba[i] - self.left_rgba[i]) / 2.0 + self.left_rgba[i];
        }

        rgba
    }

    fn sample(&self, position: f32) -> [f32; 4] {
        let middle_rgba = self.middle_rgba();
        let (left, right, left_rgba, right_rgba) = if position < self.middle {
            (self.left, self.middle, self.left_rgba, middle_rgba)
        } else {
            (self.middle, self.right, middle_rgba, self.right_rgba)
        };

        let mut rgba = [0.0; 4];
        for (i, c) in rgba.iter_mut().enumerate() {
            let per_unit = (right_rgba[i] - left_rgba[i]) / (right - left);
            *c = left_rgba[i] + per_unit * (position - left);
        }

        rgba
    }

    fn is_valid(&self) -> bool {
        let unit = |v: f32| (0.0..=1.0).contains(&v);

        self.left < self.middle
            && self.middle < self.right
            && unit(self.left)
            && unit(self.right)
            && self.left_rgba.iter().chain(self.right_rgba.iter()).all(|&c| unit(c))
    }
}

/// A gradient read from a GIMP `.ggr` file.
#[derive(Clone, Debug, PartialEq)]
pub struct GimpGradient {
    segments: Vec<GradientSegment>,
}

impl GimpGradient {
    pub fn parse(text: &str) -> Result<Self, GradientError> {
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line.trim()));

        match lines.next() {
            Some((_, HEADER)) => (),
            _ => return Err(GradientError::MissingHeader),
        }

        let mut next = lines.next();
        if let Some((_, line)) = next {
            if line.starts_with("Name:") {
                next = lines.next();
            }
        }
        let expected = match next {
            Some((line_number, line)) => line
                .parse::<usize>()
                .map_err(|_| GradientError::InvalidSegmentCount { line: line_number })?,
            None => return Err(GradientError::InvalidSegmentCount { line: 2 }),
        };
        if expected == 0 {
            return Err(GradientError::NoSegments);
        }

        let segments = lines
            .filter(|(_, line)| !line.is_empty())
            .map(|(line_number, line)| parse_segment(line_number, line))
            .collect::<Result<Vec<_>, _>>()?;
        if segments.len() != expected {
            return Err(GradientError::SegmentCountMismatch {
                expected,
                found: segments.len(),
            });
        }

        Ok(Self { segments })
    }

    fn from_segments(segments: &[GradientSegment]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }

    #[inline]
    pub fn segments(&self) -> &[GradientSegment] {
        &self.segments
    }

    /// The color at `position`, taken from the first segment whose right end is at or past `position`.
    pub fn sample(&self, position: f32) -> [f32; 4] {
        let segment = self
            .segments
            .iter()
            .find(|s| position <= s.right)
            .or_else(|| self.segments.last());

        match segment {
            Some(segment) => segment.sample(position),
            None => [0.0; 4],
        }
    }

    /// Samples the gradient at `i / 256` for every `i` in `0..256`.
    pub fn to_rgba8_table(&self) -> Vec<Rgba8> {
        let byte = |v: f32| (v.max(0.0).min(1.0) * 255.0) as u8;

        (0..GRADIENT_TABLE_LEN)
            .map(|i| {
                let [r, g, b, a] = self.sample(i as f32 / GRADIENT_TABLE_LEN as f32);
                [byte(r), byte(g), byte(b), byte(a)]
            })
            .collect()
    }

    pub fn to_color_map(&self) -> ColorMap {
        ColorMap::from_rgba8(self.to_rgba8_table())
    }
}

fn parse_segment(line_number: usize, line: &str) -> Result<GradientSegment, GradientError> {
    let malformed = GradientError::MalformedSegment { line: line_number };

    let fields: Vec<&str> = line.split_whitespace().collect();
    // Later GIMP versions append the left and right color types.
    if fields.len() != 13 && fields.len() != 15 {
        return Err(malformed);
    }

    let mut values = [0.0f32; 11];
    for (value, field) in values.iter_mut().zip(&fields[..11]) {
        *value = field.parse().map_err(|_| malformed.clone())?;
    }
    let blending: u32 = fields[11].parse().map_err(|_| malformed.clone())?;
    let coloring: u32 = fields[12].parse().map_err(|_| malformed.clone())?;
    if blending != 0 || coloring != 0 {
        return Err(GradientError::UnsupportedSegment {
            line: line_number,
            blending,
            coloring,
        });
    }

    let segment = GradientSegment {
        left: values[0],
        middle: values[1],
        right: values[2],
        left_rgba: [values[3], values[4], values[5], values[6]],
        right_rgba: [values[7], values[8], values[9], values[10]],
    };
    if !segment.is_valid() {
        return Err(GradientError::InvalidSegment { line: line_number });
    }

    Ok(segment)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GradientError {
    /// The first line is not `GIMP Gradient`.
    MissingHeader,
    InvalidSegmentCount { line: usize },
    NoSegments,
    SegmentCountMismatch { expected: usize, found: usize },
    /// Wrong number of fields, or a field that is not a number.
    MalformedSegment { line: usize },
    /// Anything other than linear blending in RGB.
    UnsupportedSegment { line: usize, blending: u32, coloring: u32 },
    /// Positions out of order, or a position or color component outside of `[0, 1]`.
    InvalidSegment { line: usize },
}

impl fmt::Display for GradientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "gradient does not start with {:?}", HEADER),
            Self::InvalidSegmentCount { line } => write!(f, "line {}: expected a segment count", line),
            Self::NoSegments => write!(f, "gradient has no segments"),
            Self::SegmentCountMismatch { expected, found } => {
                write!(f, "gradient declares {} segments but has {}", expected, found)
            }
            Self::MalformedSegment { line } => write!(f, "line {}: malformed segment", line),
            Self::UnsupportedSegment {
                line,
                blending,
                coloring,
            } => write!(
                f,
                "line {}: unsupported blending {} or coloring {}, only linear RGB is read",
                line, blending, coloring
            ),
            Self::InvalidSegment { line } => {
                write!(f, "line {}: segment positions or colors out of range", line)
            }
        }
    }
}

impl std::error::Error for GradientError {}

/// The built-in transfer function palettes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PredefinedGradient {
    Grey,
    Temperature,
    Physics,
    Standard,
    Glow,
    BlueRed,
    Seismic,
}

impl PredefinedGradient {
    pub const ALL: [Self; 7] = [
        Self::Grey,
        Self::Temperature,
        Self::Physics,
        Self::Standard,
        Self::Glow,
        Self::BlueRed,
        Self::Seismic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grey => "GREY",
            Self::Temperature => "TEMPERATURE",
            Self::Physics => "PHYSICS",
            Self::Standard => "STANDARD",
            Self::Glow => "GLOW",
            Self::BlueRed => "BLUE_RED",
            Self::Seismic => "SEISMIC",
        }
    }

    /// Case-insensitive lookup by `name()`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn gradient(&self) -> GimpGradient {
        GimpGradient::from_segments(self.segments())
    }

    fn segments(&self) -> &'static [GradientSegment] {
        match self {
            Self::Grey => GREY,
            Self::Temperature => TEMPERATURE,
            Self::Physics => PHYSICS,
            Self::Standard => STANDARD,
            Self::Glow => GLOW,
            Self::BlueRed => BLUE_RED,
            Self::Seismic => SEISMIC,
        }
    }
}

impl ColorMap {
    /// A 256 entry map sampled from one of the built-in palettes.
    pub fn predefined(gradient: PredefinedGradient) -> Self {
        gradient.gradient().to_color_map()
    }

    /// Like `predefined`, looked up by name. Returns `None` for unknown names.
    pub fn predefined_by_name(name: &str) -> Option<Self> {
        PredefinedGradient::from_name(name).map(Self::predefined)
    }

    /// A 256 entry map sampled from the text of a GIMP `.ggr` file.
    pub fn from_gimp_gradient(text: &str) -> Result<Self, GradientError> {
        Ok(GimpGradient::parse(text)?.to_color_map())
    }
}

const fn segment(left: f32, middle: f32, right: f32, left_rgba: [f32; 4], right_rgba: [f32; 4]) -> GradientSegment {
    GradientSegment {
        left,
        middle,
        right,
        left_rgba,
        right_rgba,
    }
}

// Alpha ramps from 0 to 1 across every palette.

const GREY: &[GradientSegment] = &[segment(0.0, 0.5, 1.0, [0.0, 0.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0])];

const TEMPERATURE: &[GradientSegment] = &[
    segment(0.0, 0.175, 0.35, [0.0, 0.0, 0.0, 0.0], [0.8, 0.0, 0.0, 0.35]),
    segment(0.35, 0.5, 0.65, [0.8, 0.0, 0.0, 0.35], [1.0, 0.6, 0.0, 0.65]),
    segment(0.65, 0.775, 0.9, [1.0, 0.6, 0.0, 0.65], [1.0, 1.0, 0.2, 0.9]),
    segment(0.9, 0.95, 1.0, [1.0, 1.0, 0.2, 0.9], [1.0, 1.0, 1.0, 1.0]),
];

const PHYSICS: &[GradientSegment] = &[
    segment(0.0, 0.125, 0.25, [0.0, 0.0, 1.0, 0.0], [0.0, 1.0, 1.0, 0.25]),
    segment(0.25, 0.375, 0.5, [0.0, 1.0, 1.0, 0.25], [0.0, 1.0, 0.0, 0.5]),
    segment(0.5, 0.625, 0.75, [0.0, 1.0, 0.0, 0.5], [1.0, 1.0, 0.0, 0.75]),
    segment(0.75, 0.875, 1.0, [1.0, 1.0, 0.0, 0.75], [1.0, 0.0, 0.0, 1.0]),
];

const STANDARD: &[GradientSegment] = &[
    segment(0.0, 0.1, 0.2, [0.3, 0.0, 0.5, 0.0], [0.0, 0.0, 1.0, 0.2]),
    segment(0.2, 0.3, 0.4, [0.0, 0.0, 1.0, 0.2], [0.0, 0.8, 0.8, 0.4]),
    segment(0.4, 0.5, 0.6, [0.0, 0.8, 0.8, 0.4], [0.0, 0.9, 0.0, 0.6]),
    segment(0.6, 0.7, 0.8, [0.0, 0.9, 0.0, 0.6], [1.0, 1.0, 0.0, 0.8]),
    segment(0.8, 0.9, 1.0, [1.0, 1.0, 0.0, 0.8], [1.0, 0.0, 0.0, 1.0]),
];

const GLOW: &[GradientSegment] = &[
    segment(0.0, 0.25, 0.5, [0.2, 0.0, 0.0, 0.0], [1.0, 0.4, 0.0, 0.5]),
    segment(0.5, 0.625, 0.75, [1.0, 0.4, 0.0, 0.5], [1.0, 0.85, 0.3, 0.75]),
    segment(0.75, 0.875, 1.0, [1.0, 0.85, 0.3, 0.75], [1.0, 1.0, 1.0, 1.0]),
];

const BLUE_RED: &[GradientSegment] = &[
    segment(0.0, 0.25, 0.5, [0.0, 0.0, 1.0, 0.0], [0.5, 0.0, 0.5, 0.5]),
    segment(0.5, 0.75, 1.0, [0.5, 0.0, 0.5, 0.5], [1.0, 0.0, 0.0, 1.0]),
];

const SEISMIC: &[GradientSegment] = &[
    segment(0.0, 0.125, 0.25, [0.0, 0.0, 0.3, 0.0], [0.0, 0.0, 1.0, 0.25]),
    segment(0.25, 0.375, 0.5, [0.0, 0.0, 1.0, 0.25], [1.0, 1.0, 1.0, 0.5]),
    segment(0.5, 0.625, 0.75, [1.0, 1.0, 1.0, 0.5], [1.0, 0.0, 0.0, 0.75]),
    segment(0.75, 0.875, 1.0, [1.0, 0.0, 0.0, 0.75], [0.5, 0.0, 0.0, 1.0]),
];

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
