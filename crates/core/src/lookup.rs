//! Response contracts of the address (CEP) and identity (CPF) lookups.
//!
//! Both lookups are best-effort auto-fill. These types decide whether a
//! response carries data worth merging into the draft; the HTTP side lives
//! in the web crate.

use serde::{Deserialize, Serialize};

/// The address API's error indicator.
///
/// Either a boolean or a string, depending on the endpoint version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorFlag {
    Bool(bool),
    Text(String),
}

impl ErrorFlag {
    /// Whether the flag marks the response as an error.
    ///
    /// `false` and the empty string are the only falsy values.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(text) => !text.is_empty(),
        }
    }
}

/// Response of the address lookup (`/ws/{cep}/json/`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLookupResponse {
    #[serde(default)]
    pub logradouro: Option<String>,
    #[serde(default)]
    pub bairro: Option<String>,
    #[serde(default)]
    pub localidade: Option<String>,
    #[serde(default)]
    pub uf: Option<String>,
    #[serde(default)]
    pub complemento: Option<String>,
    #[serde(default)]
    pub erro: Option<ErrorFlag>,
}

/// Address fields merged into the draft after a successful lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressFields {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub complement: String,
}

impl AddressLookupResponse {
    /// The fields to merge, or `None` when the error flag is set.
    ///
    /// Absent fields become empty strings, so a merge always overwrites all
    /// five address fields.
    #[must_use]
    pub fn into_fields(self) -> Option<AddressFields> {
        if self.erro.as_ref().is_some_and(ErrorFlag::is_set) {
            return None;
        }

        Some(AddressFields {
            street: self.logradouro.unwrap_or_default(),
            district: self.bairro.unwrap_or_default(),
            city: self.localidade.unwrap_or_default(),
            state: self.uf.unwrap_or_default(),
            complement: self.complemento.unwrap_or_default(),
        })
    }
}

/// Person record nested in the identity lookup response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityData {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nome_da_pf: Option<String>,
    #[serde(default)]
    pub numero_de_cpf: Option<String>,
    #[serde(default)]
    pub data_nascimento: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Response of the identity lookup (`/api/check_cpf_lp/{cpf}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLookupResponse {
    #[serde(default)]
    pub data: Option<IdentityData>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Identity fields merged into the draft after a successful lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityFields {
    pub name: String,
    pub birth: String,
}

impl IdentityLookupResponse {
    /// The fields to merge, or `None` unless a non-empty name came back.
    #[must_use]
    pub fn into_fields(self) -> Option<IdentityFields> {
        let data = self.data?;
        let name = data.nome_da_pf.filter(|name| !name.is_empty())?;

        Some(IdentityFields {
            name,
            birth: data.data_nascimento.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(json: &str) -> AddressLookupResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_address_success() {
        let fields = address(
            r#"{"cep":"01310-100","logradouro":"Avenida Paulista","complemento":"de 612 a 1510 - lado par",
               "bairro":"Bela Vista","localidade":"São Paulo","uf":"SP","ibge":"3550308"}"#,
        )
        .into_fields()
        .unwrap();

        assert_eq!(fields.street, "Avenida Paulista");
        assert_eq!(fields.district, "Bela Vista");
        assert_eq!(fields.city, "São Paulo");
        assert_eq!(fields.state, "SP");
        assert_eq!(fields.complement, "de 612 a 1510 - lado par");
    }

    #[test]
    fn test_address_missing_fields_become_empty() {
        let fields = address(r#"{"localidade":"Brasília","uf":"DF"}"#)
            .into_fields()
            .unwrap();
        assert_eq!(fields.street, "");
        assert_eq!(fields.city, "Brasília");
    }

    #[test]
    fn test_address_error_flags() {
        assert!(address(r#"{"erro":true}"#).into_fields().is_none());
        assert!(address(r#"{"erro":"true"}"#).into_fields().is_none());
        assert!(address(r#"{"erro":"false","uf":"SP"}"#).into_fields().is_none());
        assert!(address(r#"{"erro":false,"uf":"SP"}"#).into_fields().is_some());
        assert!(address(r#"{"erro":"","uf":"SP"}"#).into_fields().is_some());
    }

    #[test]
    fn test_identity_with_name() {
        let response: IdentityLookupResponse = serde_json::from_str(
            r#"{"data":{"id":7,"nome_da_pf":"MARIA DA SILVA","numero_de_cpf":"12345678901",
                "data_nascimento":"1990-05-17"},"status":"success"}"#,
        )
        .unwrap();
        let fields = response.into_fields().unwrap();
        assert_eq!(fields.name, "MARIA DA SILVA");
        assert_eq!(fields.birth, "1990-05-17");
    }

    #[test]
    fn test_identity_without_name() {
        let empty: IdentityLookupResponse =
            serde_json::from_str(r#"{"data":{"nome_da_pf":""}}"#).unwrap();
        assert!(empty.into_fields().is_none());

        let not_found: IdentityLookupResponse =
            serde_json::from_str(r#"{"data":{"msg":"CPF não encontrado"},"status":"error"}"#)
                .unwrap();
        assert!(not_found.into_fields().is_none());

        assert!(IdentityLookupResponse::default().into_fields().is_none());
    }
}
