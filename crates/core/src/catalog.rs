//! Mobile operators, their plans, and the state list.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// State codes offered by the address section, `EX` meaning abroad.
pub const STATES: [&str; 28] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO", "EX",
];

/// Whether `code` is one of [`STATES`].
#[must_use]
pub fn is_known_state(code: &str) -> bool {
    STATES.contains(&code)
}

/// Errors that can occur when parsing an [`Operator`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operator: {0}")]
pub struct UnknownOperator(String);

/// Mobile carrier whose plans are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    #[default]
    Vivo,
    Tim,
    Claro,
}

impl Operator {
    /// All operators in display order.
    pub const ALL: [Self; 3] = [Self::Vivo, Self::Tim, Self::Claro];

    /// Code shown on the operator tabs and used in URLs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Vivo => "VIVO",
            Self::Tim => "TIM",
            Self::Claro => "CLARO",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperator(s.to_owned()))
    }
}

/// A plan offered by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Identifier sent as `plan_id`.
    pub id: &'static str,
    /// Label shown in the plan select.
    pub label: &'static str,
}

const VIVO_PLANS: &[Plan] = &[
    Plan {
        id: "178",
        label: "40GB COM LIGACAO VIVO 49.90",
    },
    Plan {
        id: "69",
        label: "80GB COM LIGACAO 69.90",
    },
    Plan {
        id: "61",
        label: "150GB COM LIGACAO 99.90",
    },
];

const TIM_PLANS: &[Plan] = &[
    Plan {
        id: "56",
        label: "100GB COM LIGACAO 69.90",
    },
    Plan {
        id: "154",
        label: "200GB SEM LIGAÇÃO 159.90",
    },
    Plan {
        id: "155",
        label: "300GB SEM LIGAÇÃO 199.90",
    },
];

const CLARO_PLANS: &[Plan] = &[
    Plan {
        id: "57",
        label: "80GB COM LIGACAO 69.90",
    },
    Plan {
        id: "183",
        label: "150GB COM LIGACAO 99.90",
    },
];

/// The compiled-in plan catalog.
///
/// Zero-sized; every accessor reads the static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanCatalog;

impl PlanCatalog {
    /// Plans offered by `operator`, in display order.
    #[must_use]
    pub const fn plans(self, operator: Operator) -> &'static [Plan] {
        match operator {
            Operator::Vivo => VIVO_PLANS,
            Operator::Tim => TIM_PLANS,
            Operator::Claro => CLARO_PLANS,
        }
    }

    /// Whether `plan_id` is one of `operator`'s plans.
    #[must_use]
    pub fn offers(self, operator: Operator, plan_id: &str) -> bool {
        self.plans(operator).iter().any(|plan| plan.id == plan_id)
    }

    /// Find a plan and its operator by id.
    #[must_use]
    pub fn find(self, plan_id: &str) -> Option<(Operator, Plan)> {
        Operator::ALL.into_iter().find_map(|op| {
            self.plans(op)
                .iter()
                .find(|plan| plan.id == plan_id)
                .map(|plan| (op, *plan))
        })
    }
}
