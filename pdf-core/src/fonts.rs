use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The 14 standard PDF fonts. Viewers supply these, so text drawn with
/// them needs no embedded font program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BuiltinFont {
    #[default]
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl BuiltinFont {
    /// Resource name suffix used in content streams (e.g. "F1").
    /// Fixed mapping by variant order.
    pub fn resource_suffix(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
            BuiltinFont::HelveticaOblique => "F3",
            BuiltinFont::HelveticaBoldOblique => "F4",
            BuiltinFont::TimesRoman => "F5",
            BuiltinFont::TimesBold => "F6",
            BuiltinFont::TimesItalic => "F7",
            BuiltinFont::TimesBoldItalic => "F8",
            BuiltinFont::Courier => "F9",
            BuiltinFont::CourierBold => "F10",
            BuiltinFont::CourierOblique => "F11",
            BuiltinFont::CourierBoldOblique => "F12",
            BuiltinFont::Symbol => "F13",
            BuiltinFont::ZapfDingbats => "F14",
        }
    }

    /// PDF BaseFont name (e.g. "Helvetica", "Times-Roman").
    pub fn pdf_base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
            BuiltinFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            BuiltinFont::TimesRoman => "Times-Roman",
            BuiltinFont::TimesBold => "Times-Bold",
            BuiltinFont::TimesItalic => "Times-Italic",
            BuiltinFont::TimesBoldItalic => "Times-BoldItalic",
            BuiltinFont::Courier => "Courier",
            BuiltinFont::CourierBold => "Courier-Bold",
            BuiltinFont::CourierOblique => "Courier-Oblique",
            BuiltinFont::CourierBoldOblique => "Courier-BoldOblique",
            BuiltinFont::Symbol => "Symbol",
            BuiltinFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbol and ZapfDingbats carry their own built-in encoding.
    pub fn uses_standard_encoding(&self) -> bool {
        !matches!(self, BuiltinFont::Symbol | BuiltinFont::ZapfDingbats)
    }

    /// Look up a font by its PDF base name. "Times New Roman" and
    /// "Arial" are accepted as aliases for their standard equivalents.
    pub fn from_name(name: &str) -> Option<BuiltinFont> {
        match name {
            "Helvetica" | "Arial" => Some(BuiltinFont::Helvetica),
            "Helvetica-Bold" => Some(BuiltinFont::HelveticaBold),
            "Helvetica-Oblique" => Some(BuiltinFont::HelveticaOblique),
            "Helvetica-BoldOblique" => Some(BuiltinFont::HelveticaBoldOblique),
            "Times-Roman" | "Times New Roman" => Some(BuiltinFont::TimesRoman),
            "Times-Bold" => Some(BuiltinFont::TimesBold),
            "Times-Italic" => Some(BuiltinFont::TimesItalic),
            "Times-BoldItalic" => Some(BuiltinFont::TimesBoldItalic),
            "Courier" => Some(BuiltinFont::Courier),
            "Courier-Bold" => Some(BuiltinFont::CourierBold),
            "Courier-Oblique" => Some(BuiltinFont::CourierOblique),
            "Courier-BoldOblique" => Some(BuiltinFont::CourierBoldOblique),
            "Symbol" => Some(BuiltinFont::Symbol),
            "ZapfDingbats" => Some(BuiltinFont::ZapfDingbats),
            _ => None,
        }
    }
}

impl fmt::Display for BuiltinFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pdf_base_name())
    }
}

impl Serialize for BuiltinFont {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.pdf_base_name())
    }
}

impl<'de> Deserialize<'de> for BuiltinFont {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        BuiltinFont::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown font {:?}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_names_round_trip_through_from_name() {
        for font in [
            BuiltinFont::Helvetica,
            BuiltinFont::TimesBoldItalic,
            BuiltinFont::CourierOblique,
            BuiltinFont::ZapfDingbats,
        ] {
            assert_eq!(BuiltinFont::from_name(font.pdf_base_name()), Some(font));
        }
    }

    #[test]
    fn aliases() {
        assert_eq!(BuiltinFont::from_name("Arial"), Some(BuiltinFont::Helvetica));
        assert_eq!(
            BuiltinFont::from_name("Times New Roman"),
            Some(BuiltinFont::TimesRoman)
        );
        assert_eq!(BuiltinFont::from_name("Comic Sans"), None);
    }

    #[test]
    fn deserialize_by_name() {
        let font: BuiltinFont = serde_json::from_str("\"Courier-Bold\"").unwrap();
        assert_eq!(font, BuiltinFont::CourierBold);
        assert!(serde_json::from_str::<BuiltinFont>("\"Nope\"").is_err());
    }
}
