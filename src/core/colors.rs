//! Wire color handling
//!
//! Colors are written as concatenated two-letter IEC 60757 codes: `RD` is a
//! red wire, `GNYE` a green wire with a yellow stripe. This module maps codes
//! to hex values for diagram edges and to names for labels and BOM text.

use serde::{Deserialize, Serialize};

use crate::core::error::{HarnessError, Result};

/// Black, used for wire borders and uncolored edges
pub const BLACK: &str = "#000000";

/// White, the fallback node background
pub const WHITE: &str = "#FFFFFF";

/// (code, hex, English name, German name)
const COLORS: &[(&str, &str, &str, &str)] = &[
    ("BK", "#000000", "black", "sw"),
    ("WH", "#FFFFFF", "white", "ws"),
    ("GY", "#999999", "grey", "gr"),
    ("PK", "#FF66CC", "pink", "rs"),
    ("RD", "#FF0000", "red", "rt"),
    ("OG", "#FF8000", "orange", "or"),
    ("YE", "#FFFF00", "yellow", "ge"),
    ("OL", "#708000", "olive green", "ol"),
    ("GN", "#00FF00", "green", "gn"),
    ("TQ", "#00FFFF", "turquoise", "tk"),
    ("LB", "#A0DFFF", "light blue", "hb"),
    ("BU", "#0066FF", "blue", "bl"),
    ("VT", "#8000FF", "violet", "vi"),
    ("BN", "#895956", "brown", "br"),
    ("BG", "#CEB673", "beige", "bg"),
    ("IV", "#F5F0D0", "ivory", "eb"),
    ("SL", "#708090", "slate", "si"),
    ("CU", "#D6775E", "copper", "cu"),
    ("SN", "#AAAAAA", "tin", "sn"),
    ("SR", "#84878C", "silver", "ag"),
    ("GD", "#FFCF80", "gold", "au"),
];

fn lookup(code: &str) -> Option<&'static (&'static str, &'static str, &'static str, &'static str)> {
    COLORS.iter().find(|(c, ..)| *c == code)
}

/// Split a color string into its two-letter codes
fn split_codes(color: &str) -> Result<Vec<&str>> {
    if color.len() % 2 != 0 || !color.is_ascii() {
        return Err(HarnessError::configuration(format!(
            "Unknown color '{}': colors are concatenated two-letter codes",
            color
        )));
    }
    let codes: Vec<&str> = (0..color.len())
        .step_by(2)
        .map(|i| &color[i..i + 2])
        .collect();
    for code in &codes {
        if lookup(code).is_none() {
            return Err(HarnessError::configuration(format!(
                "Unknown color code '{}' in '{}'",
                code, color
            )));
        }
    }
    Ok(codes)
}

/// Check that every code in a color string is known. The empty string is "no color".
pub fn validate(color: &str) -> Result<()> {
    split_codes(color).map(|_| ())
}

/// Whether a color string describes a striped (multi-color) wire
pub fn is_multicolor(color: &str) -> bool {
    color.len() > 2
}

/// Hex values for a wire color, ready to be placed between black borders.
///
/// Two-color wires are banded (`A B A`). With `pad` set, single-color wires
/// are tripled so all wires render with the same width once a harness
/// contains striped wires.
pub fn hex_codes(color: &str, pad: bool) -> Result<Vec<&'static str>> {
    let codes = split_codes(color)?;
    let padded: Vec<&str> = match codes.len() {
        0 => Vec::new(),
        1 if pad => vec![codes[0], codes[0], codes[0]],
        2 => vec![codes[0], codes[1], codes[0]],
        _ => codes,
    };
    Ok(padded
        .into_iter()
        .filter_map(|code| lookup(code).map(|(_, hex, ..)| *hex))
        .collect())
}

/// How color codes are written in labels and BOM descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[serde(rename = "full")]
    FullLower,
    #[serde(rename = "FULL")]
    FullUpper,
    #[serde(rename = "hex")]
    HexLower,
    #[serde(rename = "HEX")]
    HexUpper,
    #[serde(rename = "short")]
    ShortLower,
    #[default]
    #[serde(rename = "SHORT")]
    ShortUpper,
    #[serde(rename = "ger")]
    GermanLower,
    #[serde(rename = "GER")]
    GermanUpper,
}

/// Render a color string for humans, e.g. `GNYE` as `green/yellow` in full mode
pub fn translate(color: &str, mode: ColorMode) -> Result<String> {
    let codes = split_codes(color)?;
    let parts: Vec<String> = codes
        .iter()
        .filter_map(|code| lookup(code))
        .map(|(code, hex, full, ger)| match mode {
            ColorMode::FullLower => full.to_string(),
            ColorMode::FullUpper => full.to_uppercase(),
            ColorMode::HexLower => hex.to_lowercase(),
            ColorMode::HexUpper => hex.to_string(),
            ColorMode::ShortLower => code.to_lowercase(),
            ColorMode::ShortUpper => code.to_string(),
            ColorMode::GermanLower => ger.to_string(),
            ColorMode::GermanUpper => ger.to_uppercase(),
        })
        .collect();
    Ok(parts.join("/"))
}

/// Named wire color palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorCode {
    /// DIN 47100
    Din,
    /// IEC 60062 (resistor color sequence)
    Iec,
    /// Black/white alternating
    Bw,
    /// 25-pair telephone cable
    Tel,
    /// 25-pair telephone cable, alternative ordering
    Telalt,
    /// Ethernet T568A
    T568a,
    /// Ethernet T568B
    T568b,
}

impl ColorCode {
    pub fn palette(&self) -> &'static [&'static str] {
        match self {
            ColorCode::Din => &[
                "WH", "BN", "GN", "YE", "GY", "PK", "BU", "RD", "BK", "VT", "GYPK", "RDBU", "WHGN",
                "BNGN", "WHYE", "YEBN", "WHGY", "GYBN", "WHPK", "PKBN", "WHBU", "BNBU", "WHRD",
                "BNRD", "WHBK", "BNBK", "GYGN", "YEGY", "PKGN", "YEPK", "GNBU", "YEBU", "GNRD",
                "YERD", "GNBK", "YEBK", "GYBU", "PKBU", "GYRD", "PKRD", "GYBK", "PKBK", "BUBK",
                "RDBK",
            ],
            ColorCode::Iec => &["BN", "RD", "OG", "YE", "GN", "BU", "VT", "GY", "WH", "BK"],
            ColorCode::Bw => &["BK", "WH"],
            ColorCode::Tel => &[
                "BUWH", "WHBU", "OGWH", "WHOG", "GNWH", "WHGN", "BNWH", "WHBN", "SLWH", "WHSL",
                "BURD", "RDBU", "OGRD", "RDOG", "GNRD", "RDGN", "BNRD", "RDBN", "SLRD", "RDSL",
                "BUBK", "BKBU", "OGBK", "BKOG", "GNBK", "BKGN", "BNBK", "BKBN", "SLBK", "BKSL",
            ],
            ColorCode::Telalt => &[
                "WHBU", "BU", "WHOG", "OG", "WHGN", "GN", "WHBN", "BN", "WHSL", "SL", "RDBU",
                "BURD", "RDOG", "OGRD", "RDGN", "GNRD", "RDBN", "BNRD", "RDSL", "SLRD",
            ],
            ColorCode::T568a => &["WHGN", "GN", "WHOG", "BU", "WHBU", "OG", "WHBN", "BN"],
            ColorCode::T568b => &["WHOG", "OG", "WHGN", "BU", "WHBU", "GN", "WHBN", "BN"],
        }
    }

    /// Colors for `count` wires, wrapping around the palette when it is shorter
    pub fn colors_for(&self, count: usize) -> Vec<String> {
        self.palette()
            .iter()
            .cycle()
            .take(count)
            .map(|c| c.to_string())
            .collect()
    }
}

impl std::fmt::Display for ColorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorCode::Din => write!(f, "DIN"),
            ColorCode::Iec => write!(f, "IEC"),
            ColorCode::Bw => write!(f, "BW"),
            ColorCode::Tel => write!(f, "TEL"),
            ColorCode::Telalt => write!(f, "TELALT"),
            ColorCode::T568a => write!(f, "T568A"),
            ColorCode::T568b => write!(f, "T568B"),
        }
    }
}

impl std::str::FromStr for ColorCode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DIN" => Ok(ColorCode::Din),
            "IEC" => Ok(ColorCode::Iec),
            "BW" => Ok(ColorCode::Bw),
            "TEL" => Ok(ColorCode::Tel),
            "TELALT" => Ok(ColorCode::Telalt),
            "T568A" => Ok(ColorCode::T568a),
            "T568B" => Ok(ColorCode::T568b),
            _ => Err(HarnessError::configuration(format!(
                "Unknown color code scheme: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_color_hex() {
        assert_eq!(hex_codes("RD", false).unwrap(), vec!["#FF0000"]);
        assert_eq!(hex_codes("GN", false).unwrap(), vec!["#00FF00"]);
        assert!(hex_codes("", false).unwrap().is_empty());
    }

    #[test]
    fn test_padding() {
        assert_eq!(
            hex_codes("BK", true).unwrap(),
            vec!["#000000", "#000000", "#000000"]
        );
        assert_eq!(
            hex_codes("GNYE", false).unwrap(),
            vec!["#00FF00", "#FFFF00", "#00FF00"]
        );
        assert_eq!(hex_codes("WHBNBK", true).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_colors_rejected() {
        assert!(validate("XX").is_err());
        assert!(validate("R").is_err());
        assert!(validate("").is_ok());
        assert!(validate("RDBU").is_ok());
    }

    #[test]
    fn test_translate() {
        assert_eq!(translate("GNYE", ColorMode::FullLower).unwrap(), "green/yellow");
        assert_eq!(translate("RD", ColorMode::ShortUpper).unwrap(), "RD");
        assert_eq!(translate("RD", ColorMode::HexUpper).unwrap(), "#FF0000");
        assert_eq!(translate("BK", ColorMode::GermanUpper).unwrap(), "SW");
    }

    #[test]
    fn test_color_code_cycles() {
        let colors = ColorCode::Bw.colors_for(5);
        assert_eq!(colors, vec!["BK", "WH", "BK", "WH", "BK"]);
        assert_eq!(ColorCode::Iec.colors_for(3), vec!["BN", "RD", "OG"]);
        assert_eq!("t568b".parse::<ColorCode>().unwrap(), ColorCode::T568b);
        assert!("RAINBOW".parse::<ColorCode>().is_err());
    }

    #[test]
    fn test_palettes_are_valid() {
        for code in [
            ColorCode::Din,
            ColorCode::Iec,
            ColorCode::Bw,
            ColorCode::Tel,
            ColorCode::Telalt,
            ColorCode::T568a,
            ColorCode::T568b,
        ] {
            for color in code.palette() {
                assert!(validate(color).is_ok(), "{} in {}", color, code);
            }
        }
    }
}
