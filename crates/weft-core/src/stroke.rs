//! Wire line styles.
//!
//! A connection is drawn with one [`LineStyle`]. The style maps directly to an
//! SVG `stroke-dasharray` value:
//!
//! | Variant | dasharray |
//! |---------|-----------|
//! | `Solid` | none |
//! | `Dashed` | `"6,4"` |
//! | `Dotted` | `"2,3"` |
//! | `DashDot` | `"10,5,2,5"` |
//! | `Custom(pattern)` | the pattern |

use std::{fmt, str::FromStr};

/// Dash pattern of a wire.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum LineStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line, 6px dash and 4px gap
    Dashed,
    /// Dotted line, 2px dot and 3px gap
    Dotted,
    /// Dash-dot pattern
    DashDot,
    /// Custom SVG dasharray pattern such as `"10,5,2,3"`
    Custom(String),
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "dash-dot" | "dashdot" => Ok(Self::DashDot),
            pattern if is_dash_pattern(pattern) => Ok(Self::Custom(pattern.to_string())),
            _ => Err(format!(
                "invalid line style `{s}`, valid values: solid, dashed, dotted, dash-dot, or a dash pattern"
            )),
        }
    }
}

fn is_dash_pattern(s: &str) -> bool {
    let mut parts = s
        .split([',', ' '])
        .filter(|part| !part.is_empty())
        .peekable();
    parts.peek().is_some() && parts.all(|part| part.parse::<f32>().is_ok_and(|v| v >= 0.0))
}

impl LineStyle {
    /// Returns the SVG dasharray value for this style, or None for solid lines
    pub fn to_svg_value(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4".to_string()),
            Self::Dotted => Some("2,3".to_string()),
            Self::DashDot => Some("10,5,2,5".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid => f.write_str("solid"),
            Self::Dashed => f.write_str("dashed"),
            Self::Dotted => f.write_str("dotted"),
            Self::DashDot => f.write_str("dash-dot"),
            Self::Custom(pattern) => f.write_str(pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_named() {
        assert_eq!("solid".parse::<LineStyle>().unwrap(), LineStyle::Solid);
        assert_eq!("dashed".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!("dotted".parse::<LineStyle>().unwrap(), LineStyle::Dotted);
        assert_eq!("dashdot".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
        assert_eq!("dash-dot".parse::<LineStyle>().unwrap(), LineStyle::DashDot);
    }

    #[test]
    fn test_from_str_custom_pattern() {
        assert_eq!(
            "8,2,1".parse::<LineStyle>().unwrap(),
            LineStyle::Custom("8,2,1".to_string())
        );
        assert_eq!(
            "4 2".parse::<LineStyle>().unwrap(),
            LineStyle::Custom("4 2".to_string())
        );
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("zigzag".parse::<LineStyle>().is_err());
        assert!("".parse::<LineStyle>().is_err());
        assert!("4,-2".parse::<LineStyle>().is_err());
    }

    #[test]
    fn test_svg_value() {
        assert_eq!(LineStyle::Solid.to_svg_value(), None);
        assert_eq!(LineStyle::Dashed.to_svg_value().as_deref(), Some("6,4"));
        assert_eq!(
            LineStyle::Custom("1,1".to_string()).to_svg_value().as_deref(),
            Some("1,1")
        );
    }

    #[test]
    fn test_display_roundtrips_named() {
        for style in [
            LineStyle::Solid,
            LineStyle::Dashed,
            LineStyle::Dotted,
            LineStyle::DashDot,
        ] {
            assert_eq!(style.to_string().parse::<LineStyle>().unwrap(), style);
        }
    }
}
