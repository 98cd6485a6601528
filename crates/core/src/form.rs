//! Form session state machine.
//!
//! A [`FormSession`] owns one draft plus the transient UI state around it:
//! the selected operator, the submission phase and the feedback message.
//!
//! # Submission
//!
//! ```text
//! Idle --begin_submission--> Submitting --finish_submission--> Idle
//!                                          (Accepted: reset draft, success message)
//!                                          (Rejected: keep draft, failure message)
//! ```
//!
//! # Stale results
//!
//! Lookups and submissions run outside the session lock. They take a ticket
//! stamped with the session epoch before going to the network and hand it
//! back with the result. The epoch moves on reset and on [`FormSession::discard`],
//! so results belonging to an earlier draft are dropped.

use crate::catalog::{Operator, Plan, PlanCatalog};
use crate::draft::{Draft, Field, FieldError};
use crate::lookup::{AddressFields, IdentityFields};
use crate::payload::RegistrationPayload;
use crate::referrer::Referrer;
use crate::types::{DocumentNumber, PostalCode};

/// Message shown after the registration API accepted the submission.
pub const SUCCESS_MESSAGE: &str = "Cadastro realizado com sucesso!";

/// Message shown after any submission failure.
pub const FAILURE_MESSAGE: &str = "Erro ao enviar cadastro. Tente novamente.";

/// Errors that can occur when driving a [`FormSession`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The field change itself was invalid.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The plan does not belong to the selected operator.
    #[error("plan {plan_id} is not offered by {operator}")]
    PlanNotOffered {
        /// Currently selected operator.
        operator: Operator,
        /// Rejected plan id.
        plan_id: String,
    },

    /// Required fields are blank or malformed.
    #[error("required fields missing: {}", format_fields(.0))]
    Incomplete(Vec<Field>),

    /// A submission is already waiting for the registration API.
    #[error("a submission is already in flight")]
    SubmissionInFlight,

    /// The session was torn down.
    #[error("form session was discarded")]
    Discarded,
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where the session is in the submission flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// Result message of the last submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Success,
    Failure,
}

impl Feedback {
    /// Text shown to the visitor.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => SUCCESS_MESSAGE,
            Self::Failure => FAILURE_MESSAGE,
        }
    }

    /// Whether this is the success message.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What the registration API made of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 2xx response.
    Accepted,
    /// Non-2xx response or transport failure.
    Rejected,
}

/// Permission to apply one lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket<K> {
    key: K,
    epoch: u64,
}

impl<K> LookupTicket<K> {
    /// The identifier to look up.
    pub const fn key(&self) -> &K {
        &self.key
    }
}

/// An in-flight submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    payload: RegistrationPayload,
    epoch: u64,
}

impl SubmissionTicket {
    /// The JSON body to send.
    #[must_use]
    pub const fn payload(&self) -> &RegistrationPayload {
        &self.payload
    }
}

/// One visitor's form: draft, operator tab, submission phase and feedback.
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    draft: Draft,
    operator: Operator,
    catalog: PlanCatalog,
    phase: Phase,
    feedback: Option<Feedback>,
    epoch: u64,
    discarded: bool,
}

impl FormSession {
    /// A fresh session with an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The selected operator tab.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Plans of the selected operator.
    #[must_use]
    pub const fn plans(&self) -> &'static [Plan] {
        self.catalog.plans(self.operator)
    }

    /// The submission phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a submission is waiting for the registration API.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    /// Message from the last finished submission, if any.
    #[must_use]
    pub const fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Whether [`Self::discard`] was called.
    #[must_use]
    pub const fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Apply one input change.
    ///
    /// # Errors
    ///
    /// - [`FormError::Discarded`] after teardown
    /// - [`FormError::PlanNotOffered`] for a plan outside the selected operator
    /// - [`FormError::Field`] for an invalid enumerated value
    pub fn change(&mut self, field: Field, raw: &str) -> Result<(), FormError> {
        if self.discarded {
            return Err(FormError::Discarded);
        }

        if field == Field::PlanId && !raw.is_empty() && !self.catalog.offers(self.operator, raw) {
            return Err(FormError::PlanNotOffered {
                operator: self.operator,
                plan_id: raw.to_owned(),
            });
        }

        self.draft.set(field, raw)?;
        Ok(())
    }

    /// Switch the operator tab. Always clears the chosen plan.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Discarded`] after teardown.
    pub fn select_operator(&mut self, operator: Operator) -> Result<(), FormError> {
        if self.discarded {
            return Err(FormError::Discarded);
        }
        self.operator = operator;
        self.draft.plan_id.clear();
        Ok(())
    }

    /// Ticket for an address lookup, if the CEP is complete.
    #[must_use]
    pub fn address_ticket(&self) -> Option<LookupTicket<PostalCode>> {
        if self.discarded {
            return None;
        }
        PostalCode::parse(&self.draft.cep).ok().map(|key| LookupTicket {
            key,
            epoch: self.epoch,
        })
    }

    /// Merge an address lookup result.
    ///
    /// Returns `false` (and changes nothing) if the ticket is stale.
    pub fn apply_address(
        &mut self,
        ticket: &LookupTicket<PostalCode>,
        fields: AddressFields,
    ) -> bool {
        if !self.is_current(ticket.epoch) {
            return false;
        }
        self.draft.street = fields.street;
        self.draft.district = fields.district;
        self.draft.city = fields.city;
        self.draft.state = fields.state;
        self.draft.complement = fields.complement;
        true
    }

    /// Ticket for an identity lookup, if the CPF is complete.
    #[must_use]
    pub fn identity_ticket(&self) -> Option<LookupTicket<DocumentNumber>> {
        if self.discarded {
            return None;
        }
        DocumentNumber::parse(&self.draft.cpf)
            .ok()
            .map(|key| LookupTicket {
                key,
                epoch: self.epoch,
            })
    }

    /// Merge an identity lookup result.
    ///
    /// Returns `false` (and changes nothing) if the ticket is stale.
    pub fn apply_identity(
        &mut self,
        ticket: &LookupTicket<DocumentNumber>,
        fields: IdentityFields,
    ) -> bool {
        if !self.is_current(ticket.epoch) {
            return false;
        }
        self.draft.name = fields.name;
        self.draft.birth = fields.birth;
        true
    }

    /// Enter `Submitting` and build the payload.
    ///
    /// Clears the previous feedback message.
    ///
    /// # Errors
    ///
    /// - [`FormError::Discarded`] after teardown
    /// - [`FormError::SubmissionInFlight`] while already submitting
    /// - [`FormError::Incomplete`] if required fields are missing; the
    ///   session stays `Idle`
    pub fn begin_submission(&mut self, referrer: &Referrer) -> Result<SubmissionTicket, FormError> {
        if self.discarded {
            return Err(FormError::Discarded);
        }
        if self.is_submitting() {
            return Err(FormError::SubmissionInFlight);
        }

        let missing = self.draft.missing_required();
        if !missing.is_empty() {
            return Err(FormError::Incomplete(missing));
        }

        self.feedback = None;
        self.phase = Phase::Submitting;

        Ok(SubmissionTicket {
            payload: RegistrationPayload::new(&self.draft, referrer),
            epoch: self.epoch,
        })
    }

    /// Leave `Submitting` with the API's verdict.
    ///
    /// Returns `false` (and changes nothing) if the session was discarded
    /// while the request was in flight.
    pub fn finish_submission(
        &mut self,
        ticket: &SubmissionTicket,
        outcome: SubmissionOutcome,
    ) -> bool {
        if !self.is_current(ticket.epoch) {
            return false;
        }

        self.phase = Phase::Idle;
        match outcome {
            SubmissionOutcome::Accepted => {
                self.feedback = Some(Feedback::Success);
                self.draft = Draft::default();
                self.epoch += 1;
            }
            SubmissionOutcome::Rejected => {
                self.feedback = Some(Feedback::Failure);
            }
        }
        true
    }

    /// Tear the session down. Every later result is dropped.
    pub fn discard(&mut self) {
        self.discarded = true;
        self.epoch += 1;
    }

    const fn is_current(&self, epoch: u64) -> bool {
        !self.discarded && self.epoch == epoch
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::referrer::ReferrerDirectory;

    fn filled_session() -> FormSession {
        let mut session = FormSession::new();
        for (field, value) in [
            (Field::Document, "12345678901"),
            (Field::BirthDate, "1990-05-17"),
            (Field::Name, "Maria da Silva"),
            (Field::Email, "maria@example.com"),
            (Field::Landline, "1133334444"),
            (Field::Mobile, "11987654321"),
            (Field::PostalCode, "01310100"),
            (Field::State, "SP"),
            (Field::City, "São Paulo"),
            (Field::District, "Bela Vista"),
            (Field::Street, "Avenida Paulista"),
            (Field::Number, "1000"),
            (Field::PlanId, "178"),
        ] {
            session.change(field, value).unwrap();
        }
        session
    }

    fn address() -> AddressFields {
        AddressFields {
            street: "Praça da Sé".to_owned(),
            district: "Sé".to_owned(),
            city: "São Paulo".to_owned(),
            state: "SP".to_owned(),
            complement: "lado ímpar".to_owned(),
        }
    }

    #[test]
    fn test_change_masks_input() {
        let mut session = FormSession::new();
        session.change(Field::Document, "12345678901234").unwrap();
        assert_eq!(session.draft().cpf, "123.456.789-01");
    }

    #[test]
    fn test_select_operator_clears_plan() {
        let mut session = filled_session();
        assert_eq!(session.draft().plan_id, "178");

        session.select_operator(Operator::Tim).unwrap();
        assert_eq!(session.operator(), Operator::Tim);
        assert_eq!(session.draft().plan_id, "");

        session.change(Field::PlanId, "154").unwrap();
        session.select_operator(Operator::Tim).unwrap();
        assert_eq!(session.draft().plan_id, "");
    }

    #[test]
    fn test_plan_must_belong_to_operator() {
        let mut session = FormSession::new();
        let err = session.change(Field::PlanId, "154").unwrap_err();
        assert!(matches!(err, FormError::PlanNotOffered { .. }));
        assert_eq!(session.draft().plan_id, "");

        session.change(Field::PlanId, "69").unwrap();
        session.change(Field::PlanId, "").unwrap();
        assert_eq!(session.draft().plan_id, "");
    }

    #[test]
    fn test_address_ticket_requires_complete_cep() {
        let mut session = FormSession::new();
        session.change(Field::PostalCode, "0131010").unwrap();
        assert!(session.address_ticket().is_none());

        session.change(Field::PostalCode, "01310100").unwrap();
        let ticket = session.address_ticket().unwrap();
        assert_eq!(ticket.key().as_str(), "01310100");
    }

    #[test]
    fn test_apply_address_overwrites_all_address_fields() {
        let mut session = filled_session();
        let ticket = session.address_ticket().unwrap();
        assert!(session.apply_address(&ticket, address()));

        let draft = session.draft();
        assert_eq!(draft.street, "Praça da Sé");
        assert_eq!(draft.district, "Sé");
        assert_eq!(draft.complement, "lado ímpar");
        assert_eq!(draft.number, "1000");
    }

    #[test]
    fn test_identity_ticket_requires_complete_cpf() {
        let mut session = FormSession::new();
        session.change(Field::Document, "1234567890").unwrap();
        assert!(session.identity_ticket().is_none());

        session.change(Field::Document, "12345678901").unwrap();
        let ticket = session.identity_ticket().unwrap();
        assert!(session.apply_identity(
            &ticket,
            IdentityFields {
                name: "MARIA".to_owned(),
                birth: "1990-05-17".to_owned(),
            }
        ));
        assert_eq!(session.draft().name, "MARIA");
        assert_eq!(session.draft().birth, "1990-05-17");
    }

    #[test]
    fn test_lookup_after_discard_is_dropped() {
        let mut session = filled_session();
        let ticket = session.address_ticket().unwrap();
        session.discard();

        assert!(!session.apply_address(&ticket, address()));
        assert_eq!(session.draft().street, "Avenida Paulista");
        assert!(session.address_ticket().is_none());
        assert_eq!(
            session.change(Field::Name, "x"),
            Err(FormError::Discarded)
        );
    }

    #[test]
    fn test_lookup_after_reset_is_dropped() {
        let directory = ReferrerDirectory::builtin();
        let mut session = filled_session();
        let lookup = session.identity_ticket().unwrap();

        let submission = session.begin_submission(directory.default_referrer()).unwrap();
        session.finish_submission(&submission, SubmissionOutcome::Accepted);

        let applied = session.apply_identity(
            &lookup,
            IdentityFields {
                name: "LATE".to_owned(),
                birth: String::new(),
            },
        );
        assert!(!applied);
        assert_eq!(session.draft().name, "");
    }

    #[test]
    fn test_submission_success_resets_draft() {
        let directory = ReferrerDirectory::builtin();
        let mut session = filled_session();
        session.select_operator(Operator::Claro).unwrap();
        session.change(Field::PlanId, "57").unwrap();

        let ticket = session.begin_submission(directory.default_referrer()).unwrap();
        assert!(session.is_submitting());
        assert_eq!(ticket.payload().draft.cpf, "12345678901");
        assert_eq!(ticket.payload().representative_id, "110956");

        assert!(session.finish_submission(&ticket, SubmissionOutcome::Accepted));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.draft(), &Draft::default());
        assert_eq!(session.operator(), Operator::Claro);

        let feedback = session.feedback().unwrap();
        assert!(feedback.is_success());
        assert!(feedback.message().contains("sucesso"));
    }

    #[test]
    fn test_submission_failure_keeps_draft() {
        let directory = ReferrerDirectory::builtin();
        let mut session = filled_session();
        let before = session.draft().clone();

        let ticket = session.begin_submission(directory.default_referrer()).unwrap();
        assert!(session.finish_submission(&ticket, SubmissionOutcome::Rejected));

        assert_eq!(session.draft(), &before);
        assert_eq!(session.phase(), Phase::Idle);
        let feedback = session.feedback().unwrap();
        assert!(!feedback.message().contains("sucesso"));
    }

    #[test]
    fn test_second_submission_while_in_flight_is_rejected() {
        let directory = ReferrerDirectory::builtin();
        let mut session = filled_session();
        let _ticket = session.begin_submission(directory.default_referrer()).unwrap();

        assert_eq!(
            session.begin_submission(directory.default_referrer()),
            Err(FormError::SubmissionInFlight)
        );
    }

    #[test]
    fn test_begin_submission_clears_feedback() {
        let directory = ReferrerDirectory::builtin();
        let mut session = filled_session();
        let ticket = session.begin_submission(directory.default_referrer()).unwrap();
        session.finish_submission(&ticket, SubmissionOutcome::Rejected);
        assert!(session.feedback().is_some());

        let _ticket = session.begin_submission(directory.default_referrer()).unwrap();
        assert!(session.feedback().is_none());
    }

    #[test]
    fn test_incomplete_draft_stays_idle() {
        let directory = ReferrerDirectory::builtin();
        let mut session = FormSession::new();
        session.change(Field::Name, "Maria").unwrap();

        let err = session.begin_submission(directory.default_referrer()).unwrap_err();
        let FormError::Incomplete(missing) = err else {
            panic!("expected Incomplete, got {err:?}");
        };
        assert!(missing.contains(&Field::Document));
        assert!(!missing.contains(&Field::Name));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_finish_after_discard_is_noop() {
        let directory = ReferrerDirectory::builtin();
        let mut session = filled_session();
        let ticket = session.begin_submission(directory.default_referrer()).unwrap();
        session.discard();

        assert!(!session.finish_submission(&ticket, SubmissionOutcome::Accepted));
        assert!(session.feedback().is_none());
        assert_eq!(session.draft().name, "Maria da Silva");
    }
}
