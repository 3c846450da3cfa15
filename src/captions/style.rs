use crate::foundation::core::Color;
use crate::foundation::error::{DubframeError, DubframeResult};

/// Background padding as a fraction of font size when a preset does not set one.
pub const DEFAULT_BACKGROUND_PADDING: f64 = 0.2;
/// Stroke width as a fraction of font size when a preset does not set one.
pub const DEFAULT_STROKE_WIDTH: f64 = 0.1;

/// Text outline drawn under the fill.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    /// Outline color.
    pub color: Color,
    /// Line width as a fraction of font size.
    pub width: f64,
}

/// Drop shadow applied to the stroke and fill passes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shadow {
    /// Shadow color.
    pub color: Color,
    /// Blur amount in pixels, as in a canvas `shadowBlur`.
    pub blur: f64,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

/// Filled box drawn behind the text.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Background {
    /// Box color.
    pub color: Color,
    /// Padding as a fraction of font size.
    pub padding: f64,
    /// Corner radius as a fraction of font size; zero means square corners.
    pub radius: f64,
}

/// Declarative description of how a caption is painted.
///
/// Values are immutable; rendering reads them and never writes back.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionStyle {
    /// Fill color.
    pub text_color: Color,
    /// Font family name.
    pub font_family: String,
    /// CSS numeric weight (400 normal, 700 bold).
    pub font_weight: u16,
    /// Italic face.
    pub italic: bool,
    /// Optional outline.
    pub stroke: Option<Stroke>,
    /// Optional drop shadow.
    pub shadow: Option<Shadow>,
    /// Optional background box.
    pub background: Option<Background>,
    /// Adds an outer glow in the stroke color.
    pub neon: bool,
}

impl CaptionStyle {
    fn base(text_color: Color, font_family: &str, font_weight: u16) -> Self {
        Self {
            text_color,
            font_family: font_family.to_owned(),
            font_weight,
            italic: false,
            stroke: None,
            shadow: None,
            background: None,
            neon: false,
        }
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn stroke(mut self, color: Color, width: f64) -> Self {
        self.stroke = Some(Stroke { color, width });
        self
    }

    fn shadow(mut self, color: Color, blur: f64, offset_x: f64, offset_y: f64) -> Self {
        self.shadow = Some(Shadow {
            color,
            blur,
            offset_x,
            offset_y,
        });
        self
    }

    fn boxed(mut self, color: Color, padding: f64, radius: f64) -> Self {
        self.background = Some(Background {
            color,
            padding,
            radius,
        });
        self
    }

    fn neon(mut self) -> Self {
        self.neon = true;
        self
    }
}

const BOLD: u16 = 700;
const NORMAL: u16 = 400;

/// The closed catalogue of caption looks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptionPreset {
    /// White text, black outline, soft shadow.
    #[default]
    Classic,
    /// Yellow text with a hard drop shadow.
    Yellow,
    /// White text on a translucent black box.
    BlackBox,
    /// Black text on a translucent white box.
    WhiteBox,
    /// Cyan glow.
    NeonBlue,
    /// Magenta glow.
    NeonPink,
    /// Green glow.
    NeonGreen,
    /// Red Impact with white outline.
    RedBold,
    /// Light italic serif.
    Cinematic,
    /// Thin dark text on a rounded light box.
    Minimal,
    /// Comic lettering.
    Comic,
    /// White on rounded blue.
    BlueBox,
    /// White on rounded red.
    RedBox,
    /// White on rounded green.
    GreenBox,
    /// Black on rounded yellow.
    YellowBox,
    /// White with a purple edge.
    PurpleStroke,
    /// Orange Impact.
    OrangeCrush,
    /// Green monospace on black.
    Typewriter,
    /// White with a wide soft shadow.
    SoftShadow,
    /// Heavy black with a yellow edge.
    HighContrast,
    /// White on a pill-shaped translucent box.
    Vlog,
    /// White on a red bar.
    NewsTicker,
    /// Magenta with a cyan offset shadow.
    Retro,
    /// Green with a heavy black outline.
    Gamer,
    /// Gold italic serif.
    Luxury,
}

impl CaptionPreset {
    /// Every preset in catalogue order.
    pub const ALL: [CaptionPreset; 25] = [
        Self::Classic,
        Self::Yellow,
        Self::BlackBox,
        Self::WhiteBox,
        Self::NeonBlue,
        Self::NeonPink,
        Self::NeonGreen,
        Self::RedBold,
        Self::Cinematic,
        Self::Minimal,
        Self::Comic,
        Self::BlueBox,
        Self::RedBox,
        Self::GreenBox,
        Self::YellowBox,
        Self::PurpleStroke,
        Self::OrangeCrush,
        Self::Typewriter,
        Self::SoftShadow,
        Self::HighContrast,
        Self::Vlog,
        Self::NewsTicker,
        Self::Retro,
        Self::Gamer,
        Self::Luxury,
    ];

    /// Stable identifier used in configs and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Yellow => "yellow",
            Self::BlackBox => "black_box",
            Self::WhiteBox => "white_box",
            Self::NeonBlue => "neon_blue",
            Self::NeonPink => "neon_pink",
            Self::NeonGreen => "neon_green",
            Self::RedBold => "red_bold",
            Self::Cinematic => "cinematic",
            Self::Minimal => "minimal",
            Self::Comic => "comic",
            Self::BlueBox => "blue_box",
            Self::RedBox => "red_box",
            Self::GreenBox => "green_box",
            Self::YellowBox => "yellow_box",
            Self::PurpleStroke => "purple_stroke",
            Self::OrangeCrush => "orange_crush",
            Self::Typewriter => "typewriter",
            Self::SoftShadow => "soft_shadow",
            Self::HighContrast => "high_contrast",
            Self::Vlog => "vlog",
            Self::NewsTicker => "news_ticker",
            Self::Retro => "retro",
            Self::Gamer => "gamer",
            Self::Luxury => "luxury",
        }
    }

    /// Human-facing label.
    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Yellow => "Yellow Pop",
            Self::BlackBox => "Black Box",
            Self::WhiteBox => "White Box",
            Self::NeonBlue => "Neon Blue",
            Self::NeonPink => "Neon Pink",
            Self::NeonGreen => "Neon Green",
            Self::RedBold => "Red Alert",
            Self::Cinematic => "Cinematic",
            Self::Minimal => "Minimal",
            Self::Comic => "Comic",
            Self::BlueBox => "Blue Box",
            Self::RedBox => "Red Box",
            Self::GreenBox => "Green Box",
            Self::YellowBox => "Yellow Box",
            Self::PurpleStroke => "Purple Edge",
            Self::OrangeCrush => "Orange",
            Self::Typewriter => "Typewriter",
            Self::SoftShadow => "Soft Shadow",
            Self::HighContrast => "High Contrast",
            Self::Vlog => "Vlog",
            Self::NewsTicker => "News Ticker",
            Self::Retro => "Retro",
            Self::Gamer => "Gamer",
            Self::Luxury => "Luxury",
        }
    }

    /// Look a preset up by its identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Build the style value for this preset.
    pub fn style(self) -> CaptionStyle {
        let black = Color::BLACK;
        let white = Color::WHITE;
        let pad = DEFAULT_BACKGROUND_PADDING;
        match self {
            Self::Classic => CaptionStyle::base(white, "Arial", BOLD)
                .stroke(black, 0.1)
                .shadow(Color::with_alpha(0, 0, 0, 0.5), 4.0, 0.0, 2.0),
            Self::Yellow => CaptionStyle::base(Color::hex(0xFACC15), "Arial", BOLD)
                .stroke(black, 0.15)
                .shadow(black, 0.0, 0.0, 4.0),
            Self::BlackBox => CaptionStyle::base(white, "Verdana", BOLD).boxed(
                Color::with_alpha(0, 0, 0, 0.8),
                0.3,
                0.0,
            ),
            Self::WhiteBox => CaptionStyle::base(black, "Verdana", BOLD).boxed(
                Color::with_alpha(255, 255, 255, 0.9),
                0.3,
                0.0,
            ),
            Self::NeonBlue => neon(Color::hex(0x00FFFF)),
            Self::NeonPink => neon(Color::hex(0xFF00FF)),
            Self::NeonGreen => neon(Color::hex(0x00FF00)),
            Self::RedBold => CaptionStyle::base(Color::hex(0xFF0000), "Impact", BOLD)
                .stroke(white, 0.05)
                .shadow(Color::with_alpha(0, 0, 0, 0.8), 5.0, 0.0, 0.0),
            Self::Cinematic => CaptionStyle::base(Color::hex(0xE5E7EB), "Georgia", NORMAL)
                .italic()
                .shadow(Color::with_alpha(0, 0, 0, 0.8), 4.0, 0.0, 2.0),
            Self::Minimal => CaptionStyle::base(Color::hex(0x333333), "Helvetica", 300).boxed(
                Color::with_alpha(255, 255, 255, 0.7),
                0.2,
                0.1,
            ),
            Self::Comic => CaptionStyle::base(Color::hex(0xFFD700), "Comic Sans MS", BOLD)
                .stroke(black, 0.2)
                .shadow(black, 0.0, 3.0, 5.0),
            Self::BlueBox => {
                CaptionStyle::base(white, "Arial", BOLD).boxed(Color::hex(0x1D4ED8), pad, 0.2)
            }
            Self::RedBox => {
                CaptionStyle::base(white, "Arial", BOLD).boxed(Color::hex(0xB91C1C), pad, 0.2)
            }
            Self::GreenBox => {
                CaptionStyle::base(white, "Arial", BOLD).boxed(Color::hex(0x047857), pad, 0.2)
            }
            Self::YellowBox => {
                CaptionStyle::base(black, "Arial", BOLD).boxed(Color::hex(0xFACC15), pad, 0.2)
            }
            Self::PurpleStroke => CaptionStyle::base(white, "Arial", BOLD)
                .stroke(Color::hex(0x7C3AED), 0.2)
                .shadow(black, 2.0, 0.0, 0.0),
            Self::OrangeCrush => CaptionStyle::base(Color::hex(0xF97316), "Impact", BOLD)
                .stroke(black, DEFAULT_STROKE_WIDTH)
                .shadow(Color::with_alpha(0, 0, 0, 0.5), 5.0, 0.0, 0.0),
            Self::Typewriter => {
                CaptionStyle::base(Color::hex(0x10B981), "Courier", BOLD).boxed(black, pad, 0.0)
            }
            Self::SoftShadow => CaptionStyle::base(white, "Arial", BOLD).shadow(
                Color::with_alpha(0, 0, 0, 0.5),
                8.0,
                0.0,
                4.0,
            ),
            Self::HighContrast => {
                CaptionStyle::base(black, "Arial", 900).stroke(Color::hex(0xFACC15), 0.1)
            }
            Self::Vlog => CaptionStyle::base(white, "Helvetica", BOLD).boxed(
                Color::with_alpha(0, 0, 0, 0.4),
                0.4,
                0.5,
            ),
            Self::NewsTicker => {
                CaptionStyle::base(white, "Arial", BOLD).boxed(Color::hex(0xDC2626), 0.1, 0.0)
            }
            Self::Retro => CaptionStyle::base(Color::hex(0xFF00FF), "Courier New", BOLD).shadow(
                Color::hex(0x00FFFF),
                0.0,
                2.0,
                2.0,
            ),
            Self::Gamer => {
                CaptionStyle::base(Color::hex(0x00FF00), "Verdana", BOLD).stroke(black, 0.2)
            }
            Self::Luxury => CaptionStyle::base(Color::hex(0xD4AF37), "Times New Roman", NORMAL)
                .italic()
                .shadow(black, 2.0, 0.0, 0.0),
        }
    }
}

fn neon(glow: Color) -> CaptionStyle {
    CaptionStyle::base(Color::WHITE, "Courier New", BOLD)
        .stroke(glow, 0.05)
        .shadow(glow, 15.0, 0.0, 0.0)
        .neon()
}

impl std::fmt::Display for CaptionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for CaptionPreset {
    type Err = DubframeError;

    fn from_str(s: &str) -> DubframeResult<Self> {
        Self::from_id(s.trim())
            .ok_or_else(|| DubframeError::validation(format!("unknown caption style '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/captions/style.rs"]
mod tests;
