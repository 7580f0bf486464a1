//! Avatar style presets
//!
//! Each style maps to a fixed placeholder image and a fixed list of canned
//! chat replies. Both tables stand in for a real generation service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Stylistic preset applied to a generated avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvatarStyle {
    #[default]
    Pixar,
    Anime,
    Simpsons,
    Realistic,
    Cartoon,
    Fantasy,
}

impl AvatarStyle {
    /// Every style, in selector order
    pub const ALL: [AvatarStyle; 6] = [
        AvatarStyle::Pixar,
        AvatarStyle::Anime,
        AvatarStyle::Simpsons,
        AvatarStyle::Realistic,
        AvatarStyle::Cartoon,
        AvatarStyle::Fantasy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AvatarStyle::Pixar => "pixar",
            AvatarStyle::Anime => "anime",
            AvatarStyle::Simpsons => "simpsons",
            AvatarStyle::Realistic => "realistic",
            AvatarStyle::Cartoon => "cartoon",
            AvatarStyle::Fantasy => "fantasy",
        }
    }

    /// Human-readable name shown in the style selector
    pub fn label(self) -> &'static str {
        match self {
            AvatarStyle::Pixar => "Pixar",
            AvatarStyle::Anime => "Anime",
            AvatarStyle::Simpsons => "Simpsons",
            AvatarStyle::Realistic => "Realistic",
            AvatarStyle::Cartoon => "Cartoon",
            AvatarStyle::Fantasy => "Fantasy",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AvatarStyle::Pixar => "3D animated style with expressive features",
            AvatarStyle::Anime => "Japanese animation style with large eyes",
            AvatarStyle::Simpsons => "Yellow-skinned cartoon style",
            AvatarStyle::Realistic => "Enhanced photorealistic portrait",
            AvatarStyle::Cartoon => "Classic 2D cartoon with bold outlines",
            AvatarStyle::Fantasy => "Magical and ethereal fantasy character",
        }
    }

    /// Placeholder image the demo substitutes for real inference
    pub fn placeholder_url(self) -> &'static str {
        match self {
            AvatarStyle::Pixar => "https://images.unsplash.com/photo-1601814933824-fd0b574dd592?q=80&w=300&auto=format&fit=crop",
            AvatarStyle::Anime => "https://images.unsplash.com/photo-1578632767115-351597cf2477?q=80&w=300&auto=format&fit=crop",
            AvatarStyle::Simpsons => "https://images.unsplash.com/photo-1608889335941-32ac5f2041b9?q=80&w=300&auto=format&fit=crop",
            AvatarStyle::Realistic => "https://images.unsplash.com/photo-1544005313-94ddf0286df2?q=80&w=300&auto=format&fit=crop",
            AvatarStyle::Cartoon => "https://images.unsplash.com/photo-1620428268482-cf1851a383b0?q=80&w=300&auto=format&fit=crop",
            AvatarStyle::Fantasy => "https://images.unsplash.com/photo-1535137755190-8a0503aebdc1?q=80&w=300&auto=format&fit=crop",
        }
    }

    /// Canned chat replies for this style. Never empty.
    pub fn canned_replies(self) -> &'static [&'static str] {
        match self {
            AvatarStyle::Pixar => &[
                "I can make the eyes bigger for a more expressive look.",
                "How about a warmer color palette for that Pixar glow?",
                "I can adjust the facial proportions to be more stylized.",
            ],
            AvatarStyle::Anime => &[
                "I can make the eyes larger and more vibrant.",
                "Would you like a more dramatic hairstyle?",
                "I can add some anime-specific lighting effects.",
            ],
            AvatarStyle::Simpsons => &[
                "I can make the skin more yellow for that authentic Simpsons look.",
                "How about an overbite or a more prominent upper lip?",
                "I can simplify the features for that classic Simpsons style.",
            ],
            AvatarStyle::Realistic => &[
                "I can enhance the skin texture for more realism.",
                "Would you like more detailed lighting and shadows?",
                "I can adjust the facial proportions to be more photorealistic.",
            ],
            AvatarStyle::Cartoon => &[
                "I can exaggerate some features for a more cartoony look.",
                "How about a more vibrant color palette?",
                "I can simplify the shading for that classic cartoon style.",
            ],
            AvatarStyle::Fantasy => &[
                "I can add some fantasy elements like pointed ears or glowing eyes.",
                "Would you like a more ethereal appearance?",
                "I can add some magical effects or fantasy-themed accessories.",
            ],
        }
    }

    /// Opening message of a chat about an avatar in this style
    pub fn greeting(self) -> String {
        format!(
            "I've created your avatar in {} style! How would you like to modify it?",
            self.as_str()
        )
    }
}

impl fmt::Display for AvatarStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown avatar style: {0}")]
pub struct UnknownStyle(pub String);

impl FromStr for AvatarStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AvatarStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}
