//! Color class to display color mapping.

use crate::color::Rgba;
use crate::highlight::token::ColorClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display colors for each [`ColorClass`].
///
/// Serialized as a map from class name to hex color. Classes missing from
/// the map keep the default palette color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ColorClass, Rgba>", into = "BTreeMap<ColorClass, Rgba>")]
pub struct Palette {
    colors: [Rgba; ColorClass::COUNT],
}

impl Palette {
    /// Palette with every class drawn in `color`.
    #[must_use]
    pub fn uniform(color: Rgba) -> Self {
        Self {
            colors: [color; ColorClass::COUNT],
        }
    }

    /// Color for a class.
    #[must_use]
    pub fn color_for(&self, class: ColorClass) -> Rgba {
        self.colors[class.as_usize()]
    }

    /// Set a color for a class.
    pub fn set_color(&mut self, class: ColorClass, color: Rgba) -> &mut Self {
        self.colors[class.as_usize()] = color;
        self
    }

    /// Builder-style color setter.
    #[must_use]
    pub fn with_color(mut self, class: ColorClass, color: Rgba) -> Self {
        self.set_color(class, color);
        self
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::uniform(Rgba::from_rgb_u8(220, 220, 220))
            .with_color(ColorClass::Comment, Rgba::from_rgb_u8(108, 123, 129))
    }
}

impl From<BTreeMap<ColorClass, Rgba>> for Palette {
    fn from(map: BTreeMap<ColorClass, Rgba>) -> Self {
        map.into_iter()
            .fold(Self::default(), |palette, (class, color)| {
                palette.with_color(class, color)
            })
    }
}

impl From<Palette> for BTreeMap<ColorClass, Rgba> {
    fn from(palette: Palette) -> Self {
        ColorClass::ALL
            .iter()
            .map(|&class| (class, palette.color_for(class)))
            .collect()
    }
}
