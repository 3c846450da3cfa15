use crate::foundation::error::{DubframeError, DubframeResult};

/// Narration voice offered for the voiceover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoicePreset {
    /// Kore, normal delivery.
    #[default]
    Male1,
    /// Charon, normal delivery.
    Female1,
    /// Fenrir, deep delivery.
    Male2,
    /// Zephyr, soft delivery.
    Female2,
    /// Puck, energetic delivery.
    Child,
}

impl VoicePreset {
    /// Every preset, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Male1,
        Self::Female1,
        Self::Male2,
        Self::Female2,
        Self::Child,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Male1 => "male1",
            Self::Female1 => "female1",
            Self::Male2 => "male2",
            Self::Female2 => "female2",
            Self::Child => "child",
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male1 => "Male 1 (Kore)",
            Self::Female1 => "Female 1 (Charon)",
            Self::Male2 => "Male 2 (Fenrir)",
            Self::Female2 => "Female 2 (Zephyr)",
            Self::Child => "Child (Puck)",
        }
    }

    /// Prebuilt synthesizer voice name.
    pub fn voice_name(self) -> &'static str {
        match self {
            Self::Male1 => "Kore",
            Self::Female1 => "Charon",
            Self::Male2 => "Fenrir",
            Self::Female2 => "Zephyr",
            Self::Child => "Puck",
        }
    }

    /// Delivery style.
    pub fn style(self) -> &'static str {
        match self {
            Self::Male1 | Self::Female1 => "normal",
            Self::Male2 => "deep",
            Self::Female2 => "soft",
            Self::Child => "energetic",
        }
    }

    /// Instruction passed with the text, absent for the normal style.
    pub fn style_hint(self) -> Option<String> {
        match self.style() {
            "normal" => None,
            style => Some(format!("Speak in a {style} tone")),
        }
    }
}

impl std::fmt::Display for VoicePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for VoicePreset {
    type Err = DubframeError;

    fn from_str(s: &str) -> DubframeResult<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| DubframeError::validation(format!("unknown voice '{s}'")))
    }
}

/// Translation target shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Language {
    /// Menu label.
    pub name: &'static str,
    /// Language name handed to the translator and synthesizer.
    pub value: &'static str,
}

/// Supported translation targets, in menu order. Some languages appear under two regions.
pub const LANGUAGES: &[Language] = &[
    Language { name: "United States (English)", value: "English" },
    Language { name: "United Kingdom (English)", value: "English" },
    Language { name: "Cambodia (Khmer)", value: "Khmer" },
    Language { name: "France (French)", value: "French" },
    Language { name: "Germany (German)", value: "German" },
    Language { name: "Spain (Spanish)", value: "Spanish" },
    Language { name: "Italy (Italian)", value: "Italian" },
    Language { name: "Portugal (Portuguese)", value: "Portuguese" },
    Language { name: "Russia (Russian)", value: "Russian" },
    Language { name: "China (Mandarin)", value: "Chinese" },
    Language { name: "Japan (Japanese)", value: "Japanese" },
    Language { name: "South Korea (Korean)", value: "Korean" },
    Language { name: "Thailand (Thai)", value: "Thai" },
    Language { name: "Vietnam (Vietnamese)", value: "Vietnamese" },
    Language { name: "India (Hindi)", value: "Hindi" },
    Language { name: "Indonesia (Indonesian)", value: "Indonesian" },
    Language { name: "Philippines (Filipino)", value: "Filipino" },
    Language { name: "Laos (Lao)", value: "Lao" },
    Language { name: "Saudi Arabia (Arabic)", value: "Arabic" },
    Language { name: "Brazil (Portuguese)", value: "Portuguese" },
];

/// Find a language by its value, ignoring case.
pub fn find_language(value: &str) -> Option<&'static Language> {
    let value = value.trim();
    LANGUAGES.iter().find(|l| l.value.eq_ignore_ascii_case(value))
}

#[cfg(test)]
#[path = "../../tests/unit/dubbing/voice.rs"]
mod tests;
