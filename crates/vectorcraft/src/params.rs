//! Semantic tracing controls, presets, and the parameter mapper.
//!
//! User-facing knobs (detail, smoothing, color count, color mode, background
//! transparency) are translated into the engine's numeric option set by a
//! pure, deterministic mapping. Presets are shortcut bundles over the three
//! numeric knobs only.

use serde::{Serialize, Serializer};

/// Bounds for the detail and smoothing sliders.
pub const LEVEL_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Bounds for the color count knob.
pub const COLOR_COUNT_RANGE: std::ops::RangeInclusive<u32> = 2..=64;

/// Named parameter presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Logo,
    Illustration,
    Detail,
}

impl Preset {
    /// Look up a preset by its user-facing name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "logo" => Some(Self::Logo),
            "illustration" => Some(Self::Illustration),
            "detail" => Some(Self::Detail),
            _ => None,
        }
    }

    /// The user-facing name of this preset.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Illustration => "illustration",
            Self::Detail => "detail",
        }
    }

    /// The `(detail_level, smoothing_level, color_count)` bundle.
    pub fn bundle(&self) -> (u8, u8, u32) {
        match self {
            Self::Logo => (4, 7, 4),
            Self::Illustration => (6, 4, 8),
            Self::Detail => (9, 2, 12),
        }
    }
}

/// Which preset (if any) the current controls were last derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetSelection {
    Named(Preset),
    Custom,
}

impl PresetSelection {
    /// The user-facing label ("logo", "illustration", "detail", or "custom").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Named(preset) => preset.name(),
            Self::Custom => "custom",
        }
    }
}

/// The full set of user-facing tracing controls.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceControls {
    /// Level of preserved detail, 1 (coarse) to 10 (fine)
    pub detail_level: u8,
    /// Contour smoothing strength, 1 (crisp) to 10 (soft)
    pub smoothing_level: u8,
    /// Palette size when tracing in color
    pub color_count: u32,
    /// Two-color tracing; overrides the color count
    pub monochrome: bool,
    /// Strip the solid background shape from the traced result
    pub transparent_background: bool,
}

impl Default for TraceControls {
    fn default() -> Self {
        // Fresh workspaces start on the logo preset, color mode, transparent
        // background enabled.
        let (detail_level, smoothing_level, color_count) = Preset::Logo.bundle();
        Self {
            detail_level,
            smoothing_level,
            color_count,
            monochrome: false,
            transparent_background: true,
        }
    }
}

impl TraceControls {
    /// Overwrite the three bundled knobs with a preset's values.
    ///
    /// Color mode and background transparency are untouched.
    pub fn apply_preset(&mut self, preset: Preset) {
        let (detail, smoothing, colors) = preset.bundle();
        self.detail_level = detail;
        self.smoothing_level = smoothing;
        self.color_count = colors;
    }
}

/// One typed control update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    DetailLevel(u8),
    SmoothingLevel(u8),
    ColorCount(u32),
    Monochrome(bool),
    TransparentBackground(bool),
}

/// Color sampling strategy understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSampling {
    /// No sampling; fixed two-color palette
    Disabled,
    /// Deterministic sampling of `numberofcolors` colors
    Deterministic,
}

impl Serialize for ColorSampling {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Engine wire values: 0 = disabled, 2 = deterministic.
        let value: u8 = match self {
            Self::Disabled => 0,
            Self::Deterministic => 2,
        };
        serializer.serialize_u8(value)
    }
}

/// Immutable numeric option set handed to the engine for one trace attempt.
///
/// Field names serialize to the engine's wire vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceOptions {
    /// Line-fit error tolerance
    #[serde(rename = "ltres")]
    pub line_tolerance: f32,

    /// Quadratic-spline-fit error tolerance
    #[serde(rename = "qtres")]
    pub quad_tolerance: f32,

    /// Paths shorter than this many points are omitted
    #[serde(rename = "pathomit")]
    pub path_omission: u32,

    /// Color sampling strategy
    #[serde(rename = "colorsampling")]
    pub color_sampling: ColorSampling,

    /// Palette size
    #[serde(rename = "numberofcolors")]
    pub number_of_colors: u32,

    /// Minimum share of pixels a color must cover to survive quantization
    #[serde(rename = "mincolorratio")]
    pub min_color_ratio: f32,

    /// Color quantization iterations
    #[serde(rename = "colorquantcycles")]
    pub quantization_cycles: u32,

    /// Snap near-right angles to exact ones
    #[serde(rename = "rightangleenhance")]
    pub right_angle_enhance: bool,

    /// Pre-trace blur radius in pixels
    #[serde(rename = "blurradius")]
    pub blur_radius: f32,

    /// Output scale factor
    pub scale: f32,
}

impl TraceOptions {
    /// Map semantic controls to engine options.
    ///
    /// Pure and total: every combination of in-range controls yields a valid
    /// option set. `transparent_background` is deliberately absent here; it
    /// is post-processing, not an engine option.
    pub fn from_controls(controls: &TraceControls) -> Self {
        let detail = f32::from(controls.detail_level);
        let smoothing = f32::from(controls.smoothing_level);

        Self {
            line_tolerance: 1.0 + (10.0 - detail) * 0.6,
            quad_tolerance: 1.0 + (10.0 - detail) * 0.4,
            path_omission: 2 + u32::from(controls.smoothing_level),
            color_sampling: if controls.monochrome {
                ColorSampling::Disabled
            } else {
                ColorSampling::Deterministic
            },
            number_of_colors: if controls.monochrome {
                2
            } else {
                controls.color_count
            },
            min_color_ratio: 0.02,
            quantization_cycles: 2,
            right_angle_enhance: controls.detail_level < 7,
            blur_radius: smoothing * 0.5,
            scale: 1.0,
        }
    }
}
