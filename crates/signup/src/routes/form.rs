//! Form route handlers.
//!
//! Every input talks to the server through HTMX. Masked inputs get their
//! re-rendered markup back on each keystroke. CEP and CPF blurs trigger the
//! lookups and return the block they fill. The submit returns the whole form
//! with the feedback message.

use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use member_signup_core::{
    ChipType, Draft, Field, FormError, FormSession, MaskKind, Operator, Referrer, STATES,
    SubmissionOutcome, SubmissionTicket,
};
use tower_sessions::Session;
use tracing::{Instrument, Span, instrument};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session::{get_form_id, set_form_id};
use crate::services::FormHandle;
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// A masked text input.
#[derive(Clone)]
pub struct InputView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub placeholder: &'static str,
    pub max_len: usize,
    pub required: bool,
}

impl InputView {
    fn masked(field: Field, kind: MaskKind, draft: &Draft) -> Self {
        Self {
            name: field.name(),
            label: field.label(),
            value: draft.value(field).to_string(),
            placeholder: placeholder(kind),
            max_len: kind.max_display_len(),
            required: field.is_required(),
        }
    }

    /// View of a masked field, or `None` for fields without a mask.
    #[must_use]
    pub fn for_field(field: Field, draft: &Draft) -> Option<Self> {
        field.mask().map(|kind| Self::masked(field, kind, draft))
    }
}

const fn placeholder(kind: MaskKind) -> &'static str {
    match kind {
        MaskKind::Document => "000.000.000-00",
        MaskKind::Landline => "(00) 0000-0000",
        MaskKind::Mobile => "(00) 00000-0000",
        MaskKind::PostalCode => "00000-000",
    }
}

/// One option of a select, radio group or tab strip.
#[derive(Clone)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Everything the form templates render.
#[derive(Clone)]
pub struct FormView {
    pub referrer_name: String,
    pub referrer_contact: String,
    pub document: InputView,
    pub landline: InputView,
    pub mobile: InputView,
    pub postal_code: InputView,
    pub draft: Draft,
    pub states: Vec<OptionView>,
    pub chip_types: Vec<OptionView>,
    pub operators: Vec<OptionView>,
    pub plans: Vec<OptionView>,
    pub submitting: bool,
    pub feedback_message: Option<&'static str>,
    pub feedback_success: bool,
    pub missing: String,
}

impl FormView {
    /// Snapshot a form session for rendering.
    #[must_use]
    pub fn new(form: &FormSession, referrer: &Referrer) -> Self {
        let draft = form.draft();
        let masked = |field, kind| InputView::masked(field, kind, draft);

        let states = STATES
            .iter()
            .map(|&code| OptionView {
                value: code,
                label: code,
                selected: draft.state == code,
            })
            .collect();

        let chip_types = [
            (ChipType::Physical, "Chip Físico"),
            (ChipType::Electronic, "eSim"),
        ]
        .into_iter()
        .map(|(chip, label)| OptionView {
            value: chip.as_str(),
            label,
            selected: draft.chip_type == chip,
        })
        .collect();

        let operators = Operator::ALL
            .into_iter()
            .map(|op| OptionView {
                value: op.code(),
                label: op.code(),
                selected: op == form.operator(),
            })
            .collect();

        let plans = form
            .plans()
            .iter()
            .map(|plan| OptionView {
                value: plan.id,
                label: plan.label,
                selected: plan.id == draft.plan_id,
            })
            .collect();

        let feedback = form.feedback();

        Self {
            referrer_name: referrer.name.clone(),
            referrer_contact: referrer.contact.clone().unwrap_or_default(),
            document: masked(Field::Document, MaskKind::Document),
            landline: masked(Field::Landline, MaskKind::Landline),
            mobile: masked(Field::Mobile, MaskKind::Mobile),
            postal_code: masked(Field::PostalCode, MaskKind::PostalCode),
            draft: draft.clone(),
            states,
            chip_types,
            operators,
            plans,
            submitting: form.is_submitting(),
            feedback_message: feedback.map(member_signup_core::Feedback::message),
            feedback_success: feedback.is_some_and(member_signup_core::Feedback::is_success),
            missing: String::new(),
        }
    }

    /// Attach the list of required fields still blank.
    #[must_use]
    pub fn with_missing(mut self, fields: &[Field]) -> Self {
        self.missing = fields
            .iter()
            .map(|field| field.label())
            .collect::<Vec<_>>()
            .join(", ");
        self
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Masked input fragment (HTMX, swapped over itself).
#[derive(Template, WebTemplate)]
#[template(path = "partials/masked_input.html")]
pub struct MaskedInputTemplate {
    pub input: InputView,
}

/// Operator tabs and plan select fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/plans.html")]
pub struct PlansTemplate {
    pub form: FormView,
}

/// Address block fragment (HTMX, after a CEP lookup).
#[derive(Template, WebTemplate)]
#[template(path = "partials/address.html")]
pub struct AddressTemplate {
    pub form: FormView,
}

/// Identity block fragment (HTMX, after a CPF lookup).
#[derive(Template, WebTemplate)]
#[template(path = "partials/identity.html")]
pub struct IdentityTemplate {
    pub form: FormView,
}

/// Whole form fragment (HTMX, after a submit).
#[derive(Template, WebTemplate)]
#[template(path = "partials/form.html")]
pub struct FormTemplate {
    pub form: FormView,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The visitor's live form, or a fresh one for the default representative.
pub(crate) async fn current_form(state: &AppState, session: &Session) -> Result<Arc<FormHandle>> {
    if let Some(id) = get_form_id(session).await
        && let Some(handle) = state.forms().get(&id).await
    {
        return Ok(handle);
    }

    let referrer = state.referrers().default_referrer().clone();
    let handle = state.forms().open(referrer).await;
    set_form_id(session, handle.id()).await?;
    Ok(handle)
}

fn parse_field(name: &str) -> Result<Field> {
    name.parse::<Field>()
        .map_err(|e| AppError::Form(FormError::Field(e)))
}

/// Apply every posted form value, in form order.
fn apply_values(form: &mut FormSession, values: &HashMap<String, String>) -> Result<()> {
    for field in Field::ALL {
        if let Some(value) = values.get(field.name()) {
            form.change(field, value)?;
        }
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Apply one field change.
///
/// Masked fields answer with their re-rendered input; other fields answer
/// `204 No Content`.
#[instrument(skip(state, session, values))]
pub async fn change_field(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
    Form(values): Form<HashMap<String, String>>,
) -> Result<Response> {
    let field = parse_field(&name)?;
    let handle = current_form(&state, &session).await?;
    let mut form = handle.lock().await;

    let raw = values.get(field.name()).map_or("", String::as_str);
    form.change(field, raw)?;

    Ok(InputView::for_field(field, form.draft()).map_or_else(
        || StatusCode::NO_CONTENT.into_response(),
        |input| MaskedInputTemplate { input }.into_response(),
    ))
}

/// Switch the operator tab. Clears the chosen plan.
#[instrument(skip(state, session))]
pub async fn select_operator(
    State(state): State<AppState>,
    session: Session,
    Path(code): Path<String>,
) -> Result<PlansTemplate> {
    let operator = code
        .parse::<Operator>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let handle = current_form(&state, &session).await?;
    let mut form = handle.lock().await;

    form.select_operator(operator)?;

    Ok(PlansTemplate {
        form: FormView::new(&form, handle.referrer()),
    })
}

/// CEP blur: store the CEP, then fill the address block if it is complete.
#[instrument(skip(state, session, values))]
pub async fn lookup_address(
    State(state): State<AppState>,
    session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> Result<AddressTemplate> {
    let handle = current_form(&state, &session).await?;

    let ticket = {
        let mut form = handle.lock().await;
        if let Some(raw) = values.get(Field::PostalCode.name()) {
            form.change(Field::PostalCode, raw)?;
        }
        form.address_ticket()
    };

    if let Some(ticket) = ticket {
        match state.address().lookup(ticket.key()).await {
            Ok(Some(fields)) => {
                if !handle.lock().await.apply_address(&ticket, fields) {
                    tracing::debug!("Address lookup result dropped (form reset or discarded)");
                }
            }
            Ok(None) => tracing::debug!("Address lookup found no address"),
            Err(e) => tracing::warn!(error = %e, "Address lookup failed"),
        }
    }

    let form = handle.lock().await;
    Ok(AddressTemplate {
        form: FormView::new(&form, handle.referrer()),
    })
}

/// CPF blur: store the CPF, then fill name and birth date if it is complete.
#[instrument(skip(state, session, values))]
pub async fn lookup_document(
    State(state): State<AppState>,
    session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> Result<IdentityTemplate> {
    let handle = current_form(&state, &session).await?;

    let ticket = {
        let mut form = handle.lock().await;
        if let Some(raw) = values.get(Field::Document.name()) {
            form.change(Field::Document, raw)?;
        }
        form.identity_ticket()
    };

    if let Some(ticket) = ticket {
        match state.identity().lookup(ticket.key()).await {
            Ok(Some(fields)) => {
                if !handle.lock().await.apply_identity(&ticket, fields) {
                    tracing::debug!("Identity lookup result dropped (form reset or discarded)");
                }
            }
            Ok(None) => tracing::debug!("Identity lookup found no name"),
            Err(e) => tracing::warn!(error = %e, "Identity lookup failed"),
        }
    }

    let form = handle.lock().await;
    Ok(IdentityTemplate {
        form: FormView::new(&form, handle.referrer()),
    })
}

/// Submit the form.
///
/// Applies every posted value, then sends one registration request. Answers
/// with the whole form: reset with the success message, or kept with the
/// failure message. The form settles even if the visitor goes away before
/// the registration API answers.
#[instrument(skip(state, session, values))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> Result<FormTemplate> {
    let handle = current_form(&state, &session).await?;

    let ticket = {
        let mut form = handle.lock().await;
        if form.is_submitting() {
            return Err(FormError::SubmissionInFlight.into());
        }
        apply_values(&mut form, &values)?;

        match form.begin_submission(handle.referrer()) {
            Ok(ticket) => ticket,
            Err(FormError::Incomplete(missing)) => {
                tracing::debug!(missing = missing.len(), "Submission blocked by blank fields");
                return Ok(FormTemplate {
                    form: FormView::new(&form, handle.referrer()).with_missing(&missing),
                });
            }
            Err(e) => return Err(e.into()),
        }
    };

    add_breadcrumb(
        "form",
        "Registration submitted",
        Some(&[("representative_id", handle.referrer().id.as_str())]),
    );

    // The upstream call and the phase change back to Idle run in their own
    // task, so a dropped request cannot leave the form stuck in Submitting.
    let task = tokio::spawn(
        finish_submission(state, Arc::clone(&handle), ticket).instrument(Span::current()),
    );
    let form = task
        .await
        .map_err(|e| AppError::Internal(format!("Submission task failed: {e}")))?;

    Ok(FormTemplate { form })
}

/// Send the registration and settle the form with the outcome.
async fn finish_submission(
    state: AppState,
    handle: Arc<FormHandle>,
    ticket: SubmissionTicket,
) -> FormView {
    let representative_id = handle.referrer().id.as_str();

    let outcome = match state.registration().submit(ticket.payload()).await {
        Ok(()) => {
            tracing::info!(representative_id, "Registration accepted");
            SubmissionOutcome::Accepted
        }
        Err(e) => {
            tracing::warn!(representative_id, error = %e, "Registration failed");
            SubmissionOutcome::Rejected
        }
    };

    let mut form = handle.lock().await;
    if !form.finish_submission(&ticket, outcome) {
        tracing::debug!("Submission result dropped (form discarded)");
    }

    FormView::new(&form, handle.referrer())
}
