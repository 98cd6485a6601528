//! Registration payload sent to the remote API.

use serde::{Deserialize, Serialize};

use crate::draft::Draft;
use crate::referrer::Referrer;

/// JSON body of the registration POST.
///
/// The draft's fields are flattened into the top-level object, with masked
/// fields reduced to digits, and `representative_id` appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    #[serde(flatten)]
    pub draft: Draft,
    pub representative_id: String,
}

impl RegistrationPayload {
    /// Build the payload for `draft` credited to `referrer`.
    #[must_use]
    pub fn new(draft: &Draft, referrer: &Referrer) -> Self {
        Self {
            draft: draft.unmasked(),
            representative_id: referrer.id.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::draft::Field;

    #[test]
    fn test_payload_is_flat_and_unmasked() {
        let mut draft = Draft::default();
        draft.set(Field::Document, "123.456.789-01").unwrap();
        draft.set(Field::Landline, "1133334444").unwrap();
        draft.set(Field::Mobile, "11987654321").unwrap();
        draft.set(Field::PostalCode, "01310-100").unwrap();
        draft.set(Field::Name, "Maria").unwrap();

        let referrer = Referrer {
            id: "110956".to_owned(),
            name: "Francisco".to_owned(),
            contact: None,
        };
        let json = serde_json::to_value(RegistrationPayload::new(&draft, &referrer)).unwrap();

        assert_eq!(json["cpf"], "12345678901");
        assert_eq!(json["phone"], "1133334444");
        assert_eq!(json["cell"], "11987654321");
        assert_eq!(json["cep"], "01310100");
        assert_eq!(json["name"], "Maria");
        assert_eq!(json["typeChip"], "fisico");
        assert_eq!(json["representative_id"], "110956");
        assert!(json.get("draft").is_none());
    }

    #[test]
    fn test_payload_leaves_draft_untouched() {
        let mut draft = Draft::default();
        draft.set(Field::PostalCode, "01310100").unwrap();
        let directory = crate::ReferrerDirectory::builtin();
        let payload = RegistrationPayload::new(&draft, directory.default_referrer());
        assert_eq!(payload.draft.cep, "01310100");
        assert_eq!(draft.cep, "01310-100");
    }
}
