//! Rendering-side descriptors attached to every bug.
//!
//! Physics never looks at these types. The footprint that physics needs is
//! copied into the [`Bug`](super::Bug) when it is spawned or re-skinned.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Stock images a renderer can draw a bug with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageVariant {
    /// King beetle, the default image.
    KingBeetle,
    /// Ladybug.
    Ladybug,
    /// Mexican bean beetle.
    MexicanBeanBeetle,
    /// Mouse lemur, used by "cute mode".
    MouseLemur,
}

impl ImageVariant {
    /// All variants in presentation order.
    pub const ALL: [Self; 4] = [
        Self::KingBeetle,
        Self::Ladybug,
        Self::MexicanBeanBeetle,
        Self::MouseLemur,
    ];

    /// Asset file the presentation layer loads for this variant.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::KingBeetle => "king_beetle_transp.png",
            Self::Ladybug => "ladybug_transp.png",
            Self::MexicanBeanBeetle => "mexican_bean_beetle_transp.png",
            Self::MouseLemur => "mouselemur.png",
        }
    }

    /// Variant at `index` in [`ImageVariant::ALL`], if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// How a bug is drawn.
///
/// A sprite needs its image dimensions, which only the presentation layer
/// knows; a missing image degrades to a plain circle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Appearance {
    /// Image sprite with its unscaled pixel dimensions.
    Sprite {
        /// Which image.
        image: ImageVariant,
        /// Unscaled width and height of the image.
        footprint: Vec2,
    },
    /// Fallback circle.
    Shape {
        /// Unscaled radius.
        radius: f32,
    },
}

impl Appearance {
    /// Unscaled width and height used for physics.
    #[must_use]
    pub fn footprint(&self) -> Vec2 {
        match self {
            Self::Sprite { footprint, .. } => *footprint,
            Self::Shape { radius } => Vec2::splat(2.0 * radius),
        }
    }

    /// Checks that the footprint is finite and positive in both dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfiguration`] otherwise.
    pub fn validate(&self) -> SimResult<()> {
        let footprint = self.footprint();
        if footprint.is_finite() && footprint.min_element() > 0.0 {
            Ok(())
        } else {
            Err(SimError::InvalidConfiguration(format!(
                "footprint must be finite and positive, got {footprint}"
            )))
        }
    }

    /// Image variant, if this is a sprite.
    #[must_use]
    pub fn image(&self) -> Option<ImageVariant> {
        match self {
            Self::Sprite { image, .. } => Some(*image),
            Self::Shape { .. } => None,
        }
    }
}

/// Which collection a bug belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    /// Member of the main population.
    Founder,
    /// Spawned by procreation.
    Offspring,
}
