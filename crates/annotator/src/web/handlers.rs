//! HTTP handlers for the annotation page
//!
//! Every POST first copies the submitted values into the session, then runs
//! the workflow action and re-renders the page with an inline notice.

use super::render::{self, Notice, Section};
use super::AppState;
use annotator_core::workflows::{comparison, hallucination, image};
use annotator_core::{ComparisonForm, HallucinationForm, ImageForm, WorkflowError};
use annotator_gateway::ProviderId;
use annotator_store::HallucinationFlags;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

async fn render_page(state: &AppState, notices: &[Notice]) -> Html<String> {
    let workspace = state.workspace.lock().await;
    Html(render::page(&workspace, notices))
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    render_page(&state, &[]).await
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    records: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let workspace = state.workspace.lock().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        records: workspace.store.len(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsInput {
    groq_key: String,
    openai_key: String,
    action: Option<String>,
}

/// Set keys from non-blank fields, or clear both
pub async fn update_credentials(
    State(state): State<AppState>,
    Form(input): Form<CredentialsInput>,
) -> Html<String> {
    let mut guard = state.workspace.lock().await;
    let credentials = &mut guard.session.credentials;

    let notice = if input.action.as_deref() == Some("clear") {
        for provider in ProviderId::ALL {
            credentials.set(provider, None);
        }
        Notice::success(Section::Credentials, "API keys cleared.")
    } else {
        let mut updated = Vec::new();
        for (provider, key) in [
            (ProviderId::Groq, input.groq_key),
            (ProviderId::OpenAi, input.openai_key),
        ] {
            if !key.trim().is_empty() {
                credentials.set(provider, Some(key));
                updated.push(provider.name());
            }
        }
        if updated.is_empty() {
            Notice::error(Section::Credentials, "Enter at least one API key.")
        } else {
            Notice::success(
                Section::Credentials,
                format!("Updated {} API key.", updated.join(" and ")),
            )
        }
    };

    Html(render::page(&guard, &[notice]))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComparisonInput {
    prompt: String,
    response_a: String,
    response_b: String,
    slot_a: Option<String>,
    slot_b: Option<String>,
    correctness: Option<String>,
    clarity: Option<String>,
    reasoning: Option<String>,
}

/// Parse a submitted choice; an invalid value leaves `current` unchanged
fn parse_choice<T>(
    raw: Option<String>,
    current: &mut T,
    section: Section,
    notices: &mut Vec<Notice>,
) where
    T: FromStr<Err = String>,
{
    let Some(raw) = raw else { return };
    match raw.parse() {
        Ok(value) => *current = value,
        Err(e) => notices.push(Notice::error(section, e)),
    }
}

impl ComparisonInput {
    /// Copy into the form; an invalid choice leaves that field unchanged
    fn apply(self, form: &mut ComparisonForm) -> Vec<Notice> {
        form.prompt = self.prompt;
        form.response_a = self.response_a;
        form.response_b = self.response_b;

        let mut notices = Vec::new();
        let scores = &mut form.scores;
        for (raw, current) in [
            (self.correctness, &mut scores.correctness),
            (self.clarity, &mut scores.clarity),
            (self.reasoning, &mut scores.reasoning),
        ] {
            parse_choice(raw, current, Section::Comparison, &mut notices);
        }
        for (raw, slot) in [
            (self.slot_a, &mut form.slot_a),
            (self.slot_b, &mut form.slot_b),
        ] {
            parse_choice(raw, slot, Section::Comparison, &mut notices);
        }
        notices
    }
}

pub async fn generate_comparison(
    State(state): State<AppState>,
    Form(input): Form<ComparisonInput>,
) -> Html<String> {
    let mut guard = state.workspace.lock().await;
    let workspace = &mut *guard;

    let mut notices = input.apply(&mut workspace.session.comparison);
    if notices.is_empty() {
        match comparison::generate(&mut workspace.session, &state.gateway).await {
            Ok(generated) if generated.any_failed() => notices.push(Notice::error(
                Section::Comparison,
                "A provider returned an error; details are shown in the response box.",
            )),
            Ok(_) => notices.push(Notice::success(
                Section::Comparison,
                "Generated both responses!",
            )),
            Err(WorkflowError::MissingCredentials(missing)) => {
                for provider in missing {
                    notices.push(Notice::error(
                        Section::Comparison,
                        format!("{} API key required.", provider),
                    ));
                }
            }
            Err(e) => notices.push(Notice::error(Section::Comparison, e.to_string())),
        }
    }

    Html(render::page(workspace, &notices))
}

pub async fn save_comparison(
    State(state): State<AppState>,
    Form(input): Form<ComparisonInput>,
) -> Html<String> {
    let mut guard = state.workspace.lock().await;
    let workspace = &mut *guard;

    let mut notices = input.apply(&mut workspace.session.comparison);
    if notices.is_empty() {
        notices.push(save_notice(
            Section::Comparison,
            comparison::save(&workspace.session, &mut workspace.store),
            "Saved annotation successfully!",
        ));
    }

    Html(render::page(workspace, &notices))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HallucinationInput {
    response: String,
    incorrect_fact: Option<String>,
    unsupported_claim: Option<String>,
    made_up_numbers: Option<String>,
    safety_violation: Option<String>,
    notes: String,
}

impl HallucinationInput {
    /// Unchecked boxes are simply absent from the submission
    fn apply(self, form: &mut HallucinationForm) {
        form.response = self.response;
        form.flags = HallucinationFlags {
            incorrect_fact: self.incorrect_fact.is_some(),
            unsupported_claim: self.unsupported_claim.is_some(),
            made_up_numbers: self.made_up_numbers.is_some(),
            safety_violation: self.safety_violation.is_some(),
        };
        form.notes = self.notes;
    }
}

pub async fn save_hallucination(
    State(state): State<AppState>,
    Form(input): Form<HallucinationInput>,
) -> Html<String> {
    let mut guard = state.workspace.lock().await;
    let workspace = &mut *guard;

    input.apply(&mut workspace.session.hallucination);
    let notice = save_notice(
        Section::Hallucination,
        hallucination::save(&workspace.session, &mut workspace.store),
        "Hallucination annotation saved!",
    );

    Html(render::page(workspace, &[notice]))
}

pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Html<String> {
    let mut upload = None;
    let mut notices = Vec::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((file_name, bytes.to_vec())),
                    Err(e) => notices.push(Notice::error(Section::Image, e.to_string())),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed image upload");
                notices.push(Notice::error(Section::Image, e.to_string()));
                break;
            }
        }
    }

    let mut guard = state.workspace.lock().await;
    match upload {
        Some((file_name, bytes)) => {
            match image::attach_upload(&mut guard.session, &file_name, bytes) {
                Ok(attached) => notices.push(Notice::success(
                    Section::Image,
                    format!(
                        "Loaded {} ({}x{}).",
                        attached.file_name, attached.width, attached.height
                    ),
                )),
                Err(e) => notices.push(Notice::error(Section::Image, e.to_string())),
            }
        }
        None if notices.is_empty() => {
            notices.push(Notice::error(Section::Image, "Choose an image to upload."))
        }
        None => {}
    }

    Html(render::page(&guard, &notices))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageInput {
    predicted_label: String,
    is_correct: Option<String>,
    correct_label: String,
}

impl ImageInput {
    fn apply(self, form: &mut ImageForm) -> Vec<Notice> {
        form.predicted_label = self.predicted_label;
        form.correct_label = self.correct_label;

        let mut notices = Vec::new();
        parse_choice(self.is_correct, &mut form.verdict, Section::Image, &mut notices);
        notices
    }
}

pub async fn save_image(
    State(state): State<AppState>,
    Form(input): Form<ImageInput>,
) -> Html<String> {
    let mut guard = state.workspace.lock().await;
    let workspace = &mut *guard;

    let mut notices = input.apply(&mut workspace.session.image);
    if notices.is_empty() {
        notices.push(save_notice(
            Section::Image,
            image::save(&workspace.session, &mut workspace.store),
            "Image evaluation saved!",
        ));
    }

    Html(render::page(workspace, &notices))
}

/// Serve the uploaded image bytes exactly as received
pub async fn uploaded_image(State(state): State<AppState>) -> Response {
    let workspace = state.workspace.lock().await;
    match &workspace.session.image.upload {
        Some(upload) => (
            [(header::CONTENT_TYPE, upload.content_type())],
            upload.bytes.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn save_notice(section: Section, result: Result<(), WorkflowError>, success: &str) -> Notice {
    match result {
        Ok(()) => Notice::success(section, success),
        Err(e) => Notice::error(section, format!("{} Your input is kept; try saving again.", e)),
    }
}
