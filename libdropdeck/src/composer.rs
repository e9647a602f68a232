//! Caption composition
//!
//! Pure helpers for assembling a caption from structured operator inputs and
//! for pulling hashtags back out of composed text. No clock, no randomness:
//! identical input always yields byte-identical output.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fixed set of content niches the composer knows how to flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    Fitness,
    RealEstate,
    Ecommerce,
    Coaching,
    Creator,
}

impl Industry {
    pub const ALL: [Industry; 5] = [
        Industry::Fitness,
        Industry::RealEstate,
        Industry::Ecommerce,
        Industry::Coaching,
        Industry::Creator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Fitness => "fitness",
            Industry::RealEstate => "real-estate",
            Industry::Ecommerce => "ecommerce",
            Industry::Coaching => "coaching",
            Industry::Creator => "creator",
        }
    }

    /// Closing hashtag line appended when an industry is set.
    fn tagline(&self) -> &'static str {
        match self {
            Industry::Fitness => "#fitness #gym #training",
            Industry::RealEstate => "#realestate #property #homes",
            Industry::Ecommerce => "#ecommerce #onlinestore #smallbusiness",
            Industry::Coaching => "#coaching #mindset #growth",
            Industry::Creator => "#contentcreator #shorts #reels",
        }
    }
}

impl FromStr for Industry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fitness" => Ok(Industry::Fitness),
            "real-estate" | "realestate" => Ok(Industry::RealEstate),
            "ecommerce" | "e-commerce" => Ok(Industry::Ecommerce),
            "coaching" => Ok(Industry::Coaching),
            "creator" => Ok(Industry::Creator),
            _ => Err(format!(
                "Unknown industry '{}'. Valid options: fitness, real-estate, ecommerce, coaching, creator",
                s
            )),
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured inputs for [`compose`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionSpec {
    /// Opening line.
    pub hook: String,
    /// Subject text.
    pub topic: String,
    /// Closing text.
    pub call_to_action: String,
    pub industry: Option<Industry>,
}

/// Assemble the caption: hook, topic, call-to-action, then the industry
/// tagline, as blank-line separated sections. Blank inputs are skipped.
pub fn compose(spec: &CaptionSpec) -> String {
    let mut sections: Vec<&str> = Vec::new();

    let hook = spec.hook.trim();
    if !hook.is_empty() {
        sections.push(hook);
    }
    let topic = spec.topic.trim();
    if !topic.is_empty() {
        sections.push(topic);
    }
    let cta = spec.call_to_action.trim();
    if !cta.is_empty() {
        sections.push(cta);
    }
    if let Some(industry) = spec.industry {
        sections.push(industry.tagline());
    }

    sections.join("\n\n")
}

/// Whitespace-split tokenizer: keep tokens beginning with `#`, preserving
/// order and internal casing.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.starts_with('#'))
        .map(|token| token.to_string())
        .collect()
}
