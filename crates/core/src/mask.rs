//! Display masks for digit-based form fields.
//!
//! Every mask strips non-digit characters, truncates to the field's maximum
//! digit count and renders the digits in groups. A separator is only emitted
//! once the group after it has at least one digit, so partial input renders
//! as the best partial format (`"1234"` becomes `"123.4"` for a CPF).
//!
//! Masks are idempotent: re-masking an already masked value yields the same
//! string. [`unmask`] is the inverse used before anything leaves the server.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grouping rules for one field type.
struct Layout {
    /// Digits beyond this count are dropped.
    max_digits: usize,
    /// Emitted before the first group once a second group exists.
    open: &'static str,
    /// Group widths paired with the separator written before the group.
    groups: &'static [(usize, &'static str)],
}

const DOCUMENT: Layout = Layout {
    max_digits: 11,
    open: "",
    groups: &[(3, ""), (3, "."), (3, "."), (2, "-")],
};

const LANDLINE: Layout = Layout {
    max_digits: 10,
    open: "(",
    groups: &[(2, ""), (4, ") "), (4, "-")],
};

const MOBILE: Layout = Layout {
    max_digits: 11,
    open: "(",
    groups: &[(2, ""), (5, ") "), (4, "-")],
};

const POSTAL_CODE: Layout = Layout {
    max_digits: 8,
    open: "",
    groups: &[(5, ""), (3, "-")],
};

impl Layout {
    fn render(&self, raw: &str) -> String {
        let mut digits = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(self.max_digits);

        let mut out = String::with_capacity(self.max_digits + 6);
        for (index, (width, separator)) in self.groups.iter().enumerate() {
            let chunk: String = digits.by_ref().take(*width).collect();
            if chunk.is_empty() {
                break;
            }
            if index == 1 {
                out.insert_str(0, self.open);
            }
            if index > 0 {
                out.push_str(separator);
            }
            out.push_str(&chunk);
        }
        out
    }
}

/// Strip every non-digit character.
///
/// This is the wire format for all masked fields.
#[must_use]
pub fn unmask(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Format a CPF as `000.000.000-00`.
#[must_use]
pub fn mask_document(value: &str) -> String {
    DOCUMENT.render(value)
}

/// Format a landline as `(00) 0000-0000`.
#[must_use]
pub fn mask_landline(value: &str) -> String {
    LANDLINE.render(value)
}

/// Format a mobile number as `(00) 00000-0000`.
#[must_use]
pub fn mask_mobile(value: &str) -> String {
    MOBILE.render(value)
}

/// Format a CEP as `00000-000`.
#[must_use]
pub fn mask_postal_code(value: &str) -> String {
    POSTAL_CODE.render(value)
}

/// Errors that can occur when parsing a [`MaskKind`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mask kind: {0}")]
pub struct UnknownMaskKind(String);

/// The masked field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    /// CPF, 11 digits.
    Document,
    /// Landline with area code, 10 digits.
    Landline,
    /// Mobile with area code, 11 digits.
    Mobile,
    /// CEP, 8 digits.
    PostalCode,
}

impl MaskKind {
    /// All mask kinds.
    pub const ALL: [Self; 4] = [
        Self::Document,
        Self::Landline,
        Self::Mobile,
        Self::PostalCode,
    ];

    /// Apply this mask to a raw value.
    #[must_use]
    pub fn apply(self, value: &str) -> String {
        self.layout().render(value)
    }

    /// Maximum number of digits kept by this mask.
    #[must_use]
    pub const fn max_digits(self) -> usize {
        self.layout().max_digits
    }

    /// Maximum length of the masked display string (the input's `maxlength`).
    #[must_use]
    pub const fn max_display_len(self) -> usize {
        match self {
            Self::Document | Self::Landline => 14,
            Self::Mobile => 15,
            Self::PostalCode => 9,
        }
    }

    /// Short name used on the command line and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Landline => "landline",
            Self::Mobile => "mobile",
            Self::PostalCode => "postal_code",
        }
    }

    const fn layout(self) -> &'static Layout {
        match self {
            Self::Document => &DOCUMENT,
            Self::Landline => &LANDLINE,
            Self::Mobile => &MOBILE,
            Self::PostalCode => &POSTAL_CODE,
        }
    }
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaskKind {
    type Err = UnknownMaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" | "cpf" => Ok(Self::Document),
            "landline" | "phone" => Ok(Self::Landline),
            "mobile" | "cell" => Ok(Self::Mobile),
            "postal_code" | "postal-code" | "cep" => Ok(Self::PostalCode),
            _ => Err(UnknownMaskKind(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_partial_input() {
        assert_eq!(mask_document(""), "");
        assert_eq!(mask_document("1"), "1");
        assert_eq!(mask_document("123"), "123");
        assert_eq!(mask_document("1234"), "123.4");
        assert_eq!(mask_document("1234567"), "123.456.7");
        assert_eq!(mask_document("123456789"), "123.456.789");
        assert_eq!(mask_document("1234567890"), "123.456.789-0");
    }

    #[test]
    fn test_document_full_and_truncated() {
        assert_eq!(mask_document("12345678901"), "123.456.789-01");
        assert_eq!(mask_document("1234567890123"), "123.456.789-01");
        assert_eq!(mask_document("123.456.789-01"), "123.456.789-01");
    }

    #[test]
    fn test_landline() {
        assert_eq!(mask_landline("12"), "12");
        assert_eq!(mask_landline("123"), "(12) 3");
        assert_eq!(mask_landline("123456"), "(12) 3456");
        assert_eq!(mask_landline("1234567"), "(12) 3456-7");
        assert_eq!(mask_landline("1234567890"), "(12) 3456-7890");
        assert_eq!(mask_landline("12345678901"), "(12) 3456-7890");
    }

    #[test]
    fn test_mobile() {
        assert_eq!(mask_mobile("11"), "11");
        assert_eq!(mask_mobile("119"), "(11) 9");
        assert_eq!(mask_mobile("1198765"), "(11) 98765");
        assert_eq!(mask_mobile("11987654"), "(11) 98765-4");
        assert_eq!(mask_mobile("11987654321"), "(11) 98765-4321");
        assert_eq!(mask_mobile("119876543210"), "(11) 98765-4321");
    }

    #[test]
    fn test_postal_code() {
        assert_eq!(mask_postal_code("01310"), "01310");
        assert_eq!(mask_postal_code("013101"), "01310-1");
        assert_eq!(mask_postal_code("01310100"), "01310-100");
        assert_eq!(mask_postal_code("0131010099"), "01310-100");
    }

    #[test]
    fn test_non_digits_are_ignored() {
        assert_eq!(mask_postal_code("abc01310-100xyz"), "01310-100");
        assert_eq!(mask_mobile("+55 (11) 9"), "(55) 119");
    }

    #[test]
    fn test_masks_are_idempotent() {
        let inputs = ["", "1", "12", "123", "12345", "1234567", "12345678901234"];
        for kind in MaskKind::ALL {
            for input in inputs {
                let once = kind.apply(input);
                assert_eq!(kind.apply(&once), once, "{kind} on {input:?}");
            }
        }
    }

    #[test]
    fn test_unmask_recovers_truncated_digits() {
        let input = "98x7654-3210987";
        for kind in MaskKind::ALL {
            let expected: String = unmask(input).chars().take(kind.max_digits()).collect();
            assert_eq!(unmask(&kind.apply(input)), expected, "{kind}");
        }
    }

    #[test]
    fn test_masked_length_fits_display_limit() {
        for kind in MaskKind::ALL {
            let masked = kind.apply(&"9".repeat(20));
            assert_eq!(masked.len(), kind.max_display_len(), "{kind}");
        }
    }

    #[test]
    fn test_mask_kind_from_str() {
        assert_eq!("cpf".parse::<MaskKind>().unwrap(), MaskKind::Document);
        assert_eq!("CEP".parse::<MaskKind>().unwrap(), MaskKind::PostalCode);
        assert_eq!("mobile".parse::<MaskKind>().unwrap(), MaskKind::Mobile);
        assert!("zip".parse::<MaskKind>().is_err());
    }
}
