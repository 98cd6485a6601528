//! The in-progress registration record.
//!
//! Field names on the wire (form posts, JSON payload, draft files) match the
//! registration API: `cpf`, `birth`, `name`, `email`, `phone`, `cell`, `cep`,
//! `district`, `city`, `state`, `street`, `number`, `complement`, `typeChip`,
//! `coupon`, `plan_id` and `typeFrete`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mask::{MaskKind, unmask};
use crate::types::Email;

/// Errors that can occur when changing a draft field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field name is not part of the form.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The value is not one of the field's options.
    #[error("invalid value for {field}: {value}")]
    InvalidOption {
        /// The field being changed.
        field: Field,
        /// The rejected value.
        value: String,
    },
}

/// Type of SIM card requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChipType {
    #[default]
    #[serde(rename = "fisico")]
    Physical,
    #[serde(rename = "eSim")]
    Electronic,
}

impl ChipType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "fisico",
            Self::Electronic => "eSim",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "fisico" => Some(Self::Physical),
            "eSim" => Some(Self::Electronic),
            _ => None,
        }
    }
}

/// Shipping method for the SIM card. Not chosen on the form itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShippingType {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "Carta")]
    Letter,
    #[serde(rename = "semFrete")]
    NoShipping,
    #[serde(rename = "eSim")]
    Electronic,
}

impl ShippingType {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Letter => "Carta",
            Self::NoShipping => "semFrete",
            Self::Electronic => "eSim",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "" => Some(Self::Unset),
            "Carta" => Some(Self::Letter),
            "semFrete" => Some(Self::NoShipping),
            "eSim" => Some(Self::Electronic),
            _ => None,
        }
    }
}

/// A form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Document,
    BirthDate,
    Name,
    Email,
    Landline,
    Mobile,
    PostalCode,
    District,
    City,
    State,
    Street,
    Number,
    Complement,
    ChipType,
    Coupon,
    PlanId,
    ShippingType,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Self; 17] = [
        Self::Document,
        Self::BirthDate,
        Self::Name,
        Self::Email,
        Self::Landline,
        Self::Mobile,
        Self::PostalCode,
        Self::District,
        Self::City,
        Self::State,
        Self::Street,
        Self::Number,
        Self::Complement,
        Self::ChipType,
        Self::Coupon,
        Self::PlanId,
        Self::ShippingType,
    ];

    /// Fields the form marks as `required`.
    pub const REQUIRED: [Self; 12] = [
        Self::Document,
        Self::BirthDate,
        Self::Name,
        Self::Email,
        Self::Mobile,
        Self::PostalCode,
        Self::District,
        Self::City,
        Self::State,
        Self::Street,
        Self::Number,
        Self::PlanId,
    ];

    /// Wire name (form input `name` and JSON key).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Document => "cpf",
            Self::BirthDate => "birth",
            Self::Name => "name",
            Self::Email => "email",
            Self::Landline => "phone",
            Self::Mobile => "cell",
            Self::PostalCode => "cep",
            Self::District => "district",
            Self::City => "city",
            Self::State => "state",
            Self::Street => "street",
            Self::Number => "number",
            Self::Complement => "complement",
            Self::ChipType => "typeChip",
            Self::Coupon => "coupon",
            Self::PlanId => "plan_id",
            Self::ShippingType => "typeFrete",
        }
    }

    /// Label shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Document => "CPF",
            Self::BirthDate => "Data de Nascimento",
            Self::Name => "Nome Completo",
            Self::Email => "Email",
            Self::Landline => "Telefone",
            Self::Mobile => "Celular",
            Self::PostalCode => "CEP",
            Self::District => "Bairro",
            Self::City => "Cidade",
            Self::State => "Estado",
            Self::Street => "Rua",
            Self::Number => "Número",
            Self::Complement => "Complemento",
            Self::ChipType => "Tipo de Chip",
            Self::Coupon => "Cupom de Desconto",
            Self::PlanId => "Plano",
            Self::ShippingType => "Tipo de Frete",
        }
    }

    /// The display mask applied on every change, if any.
    #[must_use]
    pub const fn mask(self) -> Option<MaskKind> {
        match self {
            Self::Document => Some(MaskKind::Document),
            Self::Landline => Some(MaskKind::Landline),
            Self::Mobile => Some(MaskKind::Mobile),
            Self::PostalCode => Some(MaskKind::PostalCode),
            _ => None,
        }
    }

    /// Whether the form marks this field as `required`.
    #[must_use]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FieldError::UnknownField(s.to_owned()))
    }
}

/// The registration form record.
///
/// Masked fields (`cpf`, `phone`, `cell`, `cep`) hold their display form
/// while the form is being filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub cpf: String,
    pub birth: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cell: String,
    pub cep: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    #[serde(rename = "typeChip")]
    pub chip_type: ChipType,
    pub coupon: String,
    pub plan_id: String,
    #[serde(rename = "typeFrete")]
    pub shipping_type: ShippingType,
}

impl Draft {
    /// Current value of a field, as rendered in the form.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Document => &self.cpf,
            Field::BirthDate => &self.birth,
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Landline => &self.phone,
            Field::Mobile => &self.cell,
            Field::PostalCode => &self.cep,
            Field::District => &self.district,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Street => &self.street,
            Field::Number => &self.number,
            Field::Complement => &self.complement,
            Field::ChipType => self.chip_type.as_str(),
            Field::Coupon => &self.coupon,
            Field::PlanId => &self.plan_id,
            Field::ShippingType => self.shipping_type.as_str(),
        }
    }

    /// Store a raw input value, applying the field's mask.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidOption`] if an enumerated field receives
    /// a value outside its options. The draft is unchanged in that case.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<(), FieldError> {
        let invalid = || FieldError::InvalidOption {
            field,
            value: raw.to_owned(),
        };

        let value = field.mask().map_or_else(|| raw.to_owned(), |kind| kind.apply(raw));

        match field {
            Field::ChipType => self.chip_type = ChipType::parse(raw).ok_or_else(invalid)?,
            Field::ShippingType => {
                self.shipping_type = ShippingType::parse(raw).ok_or_else(invalid)?;
            }
            Field::Document => self.cpf = value,
            Field::BirthDate => self.birth = value,
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Landline => self.phone = value,
            Field::Mobile => self.cell = value,
            Field::PostalCode => self.cep = value,
            Field::District => self.district = value,
            Field::City => self.city = value,
            Field::State => self.state = value,
            Field::Street => self.street = value,
            Field::Number => self.number = value,
            Field::Complement => self.complement = value,
            Field::Coupon => self.coupon = value,
            Field::PlanId => self.plan_id = value,
        }
        Ok(())
    }

    /// Required fields that are blank, plus `email` if it is malformed.
    ///
    /// Returned in form order. An empty result means the draft may be
    /// submitted.
    #[must_use]
    pub fn missing_required(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&field| {
                let value = self.value(field).trim();
                (field.is_required() && value.is_empty())
                    || (field == Field::Email && !value.is_empty() && Email::parse(value).is_err())
            })
            .collect()
    }

    /// Copy of the draft with every masked field reduced to digits.
    #[must_use]
    pub fn unmasked(&self) -> Self {
        Self {
            cpf: unmask(&self.cpf),
            phone: unmask(&self.phone),
            cell: unmask(&self.cell),
            cep: unmask(&self.cep),
            ..self.clone()
        }
    }
}
