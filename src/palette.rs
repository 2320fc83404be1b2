//! Reproducible colours for categories and events. A category owns a hue; its events are
//! spread around that hue by a small offset and a lightness tier, both picked from the
//! event id alone.

use serde::Serialize;

/// Largest distance in degrees between an event hue and its category hue.
pub const HUE_BAND: f32 = 16.;
const HUE_OFFSETS: [f32; 5] = [-16., -8., 0., 8., 16.];
const CENTER_OFFSET: usize = 2;

const LIGHT_TIERS: [f32; 4] = [0.80, 0.72, 0.64, 0.56];
const DARK_TIERS: [f32; 4] = [0.26, 0.32, 0.38, 0.44];
const ACCENT_SHIFT: f32 = 0.38;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hsl {
    /// Degrees in `0..360`.
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = self.saturation.clamp(0., 1.);
        let l = self.lightness.clamp(0., 1.);
        let chroma = (1. - (2. * l - 1.).abs()) * s;
        let h = self.hue.rem_euclid(360.) / 60.;
        let x = chroma * (1. - (h % 2. - 1.).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.),
            1 => (x, chroma, 0.),
            2 => (0., chroma, x),
            3 => (0., x, chroma),
            4 => (x, 0., chroma),
            _ => (chroma, 0., x),
        };
        let m = l - chroma / 2.;
        let channel = |v: f32| ((v + m) * 255.).round().clamp(0., 255.) as u8;
        (channel(r), channel(g), channel(b))
    }

    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorPair {
    /// Background of a slot or row.
    pub fill: Hsl,
    /// Text and edges drawn over the fill.
    pub accent: Hsl,
}

/// Colour of an event, or of the category itself when `event_id` is `None`.
pub fn color_for(category_id: &str, event_id: Option<&str>, dark: bool) -> ColorPair {
    let (offset, tier) = event_id.map_or((CENTER_OFFSET, 0), event_buckets);
    let hue = (category_hue(category_id) + HUE_OFFSETS[offset]).rem_euclid(360.);

    if dark {
        let lightness = DARK_TIERS[tier];
        ColorPair {
            fill: Hsl {
                hue,
                saturation: 0.40,
                lightness,
            },
            accent: Hsl {
                hue,
                saturation: 0.50,
                lightness: lightness + ACCENT_SHIFT,
            },
        }
    } else {
        let lightness = LIGHT_TIERS[tier];
        ColorPair {
            fill: Hsl {
                hue,
                saturation: 0.55,
                lightness,
            },
            accent: Hsl {
                hue,
                saturation: 0.60,
                lightness: lightness - ACCENT_SHIFT,
            },
        }
    }
}

/// Base hue shared by every event of a category.
pub fn category_hue(category_id: &str) -> f32 {
    (unit(hash(category_id)) * 360.) as f32
}

/// (hue offset index, lightness tier) for an event id.
fn event_buckets(event_id: &str) -> (usize, usize) {
    let h = hash(event_id);
    (
        bucket(h, HUE_OFFSETS.len()),
        bucket(mix(h.wrapping_add(0x9e37_79b9)), LIGHT_TIERS.len()),
    )
}

/// FNV-1a followed by a murmur finalizer so that ids differing in one trailing character
/// still land far apart.
fn hash(value: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for byte in value.bytes() {
        h ^= byte as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    mix(h)
}

fn mix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

fn unit(h: u32) -> f64 {
    h as f64 / (u32::MAX as f64 + 1.)
}

fn bucket(h: u32, buckets: usize) -> usize {
    ((unit(h) * buckets as f64) as usize).min(buckets - 1)
}

#[cfg(test)]
mod tests {
    use super::{category_hue, color_for, Hsl, HUE_BAND};

    fn hue_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(360.);
        d.min(360. - d)
    }

    #[test]
    fn test_color_is_deterministic() {
        assert_eq!(
            color_for("catA", Some("evt1"), false),
            color_for("catA", Some("evt1"), false)
        );
    }

    #[test]
    fn test_events_share_category_family() {
        let base = category_hue("catA");
        let first = color_for("catA", Some("evt1"), false);
        let second = color_for("catA", Some("evt2"), false);

        assert!(hue_distance(first.fill.hue, base) <= HUE_BAND + 0.01);
        assert!(hue_distance(second.fill.hue, base) <= HUE_BAND + 0.01);
        assert!(
            first.fill.hue != second.fill.hue || first.fill.lightness != second.fill.lightness
        );
    }

    #[test]
    fn test_dark_mode_keeps_hue() {
        for event in ["evt1", "evt2", "sleep", "work-deep-focus"] {
            let light = color_for("catA", Some(event), false);
            let dark = color_for("catA", Some(event), true);
            assert_eq!(light.fill.hue, dark.fill.hue);
            assert_eq!(light.accent.hue, dark.accent.hue);
            assert_ne!(light.fill.lightness, dark.fill.lightness);
        }
    }

    #[test]
    fn test_category_only_color_sits_on_base_hue() {
        let color = color_for("catA", None, false);
        assert_eq!(color.fill.hue, category_hue("catA"));
    }

    #[test]
    fn test_hsl_to_rgb() {
        let red = Hsl {
            hue: 0.,
            saturation: 1.,
            lightness: 0.5,
        };
        assert_eq!(red.to_rgb(), (255, 0, 0));
        assert_eq!(red.to_hex(), "#ff0000");

        let grey = Hsl {
            hue: 200.,
            saturation: 0.,
            lightness: 0.5,
        };
        assert_eq!(grey.to_rgb(), (128, 128, 128));

        let blue = Hsl {
            hue: 240.,
            saturation: 1.,
            lightness: 0.5,
        };
        assert_eq!(blue.to_hex(), "#0000ff");
    }
}
