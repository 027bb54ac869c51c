//! Server-side HTML for the annotation page

use super::Workspace;
use annotator_core::{ComparisonForm, HallucinationForm, ImageForm, ModelChoice};
use annotator_gateway::{Credentials, ProviderId};
use annotator_store::{Preference, Verdict};

/// Page region a notice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Credentials,
    Comparison,
    Hallucination,
    Image,
}

/// Inline message shown above a section after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub section: Section,
    pub is_error: bool,
    pub text: String,
}

impl Notice {
    pub fn success(section: Section, text: impl Into<String>) -> Self {
        Self {
            section,
            is_error: false,
            text: text.into(),
        }
    }

    pub fn error(section: Section, text: impl Into<String>) -> Self {
        Self {
            section,
            is_error: true,
            text: text.into(),
        }
    }
}

const STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0; display: flex; }
aside { width: 18rem; padding: 1rem; background: #f3f4f6; min-height: 100vh; }
main { flex: 1; padding: 1rem 2rem; max-width: 72rem; }
section { border-top: 1px solid #d1d5db; padding: 1rem 0; }
textarea { width: 100%; box-sizing: border-box; }
.pair { display: flex; gap: 1rem; }
.pair > div { flex: 1; }
.notice { padding: .5rem .75rem; margin: .5rem 0; border-radius: 4px; }
.ok { background: #dcfce7; }
.err { background: #fee2e2; }
code { word-break: break-all; }
";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the whole page for the current session state
pub fn page(workspace: &Workspace, notices: &[Notice]) -> String {
    let session = &workspace.session;
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>AI Response Evaluation &amp; Annotation</title><style>{style}</style></head>\
         <body>{sidebar}<main><h1>AI Response Evaluation &amp; Annotation</h1>\
         <p>Compare, auto-generate, tag hallucinations, verify image labels and store feedback.</p>\
         {comparison}{hallucination}{image}\
         <p>All evaluations are saved in <code>{path}</code> ({count} so far).</p>\
         </main></body></html>",
        style = STYLE,
        sidebar = sidebar(
            session.id().as_str(),
            &session.credentials,
            notices_for(notices, Section::Credentials)
        ),
        comparison = comparison_section(
            &session.comparison,
            notices_for(notices, Section::Comparison)
        ),
        hallucination = hallucination_section(
            &session.hallucination,
            notices_for(notices, Section::Hallucination)
        ),
        image = image_section(&session.image, notices_for(notices, Section::Image)),
        path = escape(&workspace.store.path().display().to_string()),
        count = workspace.store.len(),
    )
}

fn notices_for(notices: &[Notice], section: Section) -> String {
    notices
        .iter()
        .filter(|n| n.section == section)
        .map(|n| {
            format!(
                "<div class=\"notice {}\">{}</div>",
                if n.is_error { "err" } else { "ok" },
                escape(&n.text)
            )
        })
        .collect()
}

fn sidebar(session_id: &str, credentials: &Credentials, notices: String) -> String {
    let status: String = ProviderId::ALL
        .iter()
        .map(|p| {
            format!(
                "<li>{}: {}</li>",
                p,
                if credentials.has(*p) { "set" } else { "not set" }
            )
        })
        .collect();

    format!(
        "<aside><h3>Reference Key</h3><code>{id}</code>\
         <h3>API Keys</h3>{notices}<ul>{status}</ul>\
         <form method=\"post\" action=\"/credentials\">\
         <label>Groq API Key<br><input type=\"password\" name=\"groq_key\" autocomplete=\"off\"></label><br>\
         <label>OpenAI API Key (optional)<br><input type=\"password\" name=\"openai_key\" autocomplete=\"off\"></label><br>\
         <button type=\"submit\">Save keys</button>\
         <button type=\"submit\" name=\"action\" value=\"clear\">Clear keys</button>\
         </form></aside>",
        id = escape(session_id),
    )
}

fn model_select(name: &str, selected: &ModelChoice) -> String {
    let groups: String = ProviderId::ALL
        .iter()
        .map(|provider| {
            let options: String = ModelChoice::options()
                .filter(|c| c.provider == *provider)
                .map(|c| {
                    format!(
                        "<option value=\"{value}\"{sel}>{model}</option>",
                        value = escape(&c.to_string()),
                        sel = if &c == selected { " selected" } else { "" },
                        model = escape(&c.model),
                    )
                })
                .collect();
            format!("<optgroup label=\"{}\">{}</optgroup>", provider, options)
        })
        .collect();
    format!("<select name=\"{}\">{}</select>", name, groups)
}

fn preference_radios(name: &str, label: &str, selected: Preference) -> String {
    let radios: String = Preference::ALL
        .iter()
        .map(|p| {
            format!(
                "<label><input type=\"radio\" name=\"{name}\" value=\"{value}\"{checked}> {value}</label> ",
                name = name,
                value = p.label(),
                checked = if *p == selected { " checked" } else { "" },
            )
        })
        .collect();
    format!("<p>{}: {}</p>", label, radios)
}

fn comparison_section(form: &ComparisonForm, notices: String) -> String {
    format!(
        "<section id=\"comparison\"><h2>Compare AI Responses</h2>{notices}\
         <form method=\"post\" action=\"/comparison/save\">\
         <label>Enter Prompt:<br><textarea name=\"prompt\" rows=\"4\">{prompt}</textarea></label>\
         <p>Model for Response A: {select_a} Model for Response B: {select_b}</p>\
         <div class=\"pair\">\
         <div><label>Response A<br><textarea name=\"response_a\" rows=\"10\">{a}</textarea></label></div>\
         <div><label>Response B<br><textarea name=\"response_b\" rows=\"10\">{b}</textarea></label></div>\
         </div>\
         <button type=\"submit\" formaction=\"/comparison/generate\">Generate Responses Automatically</button>\
         {correctness}{clarity}{reasoning}\
         <button type=\"submit\">Save Comparison Annotation</button>\
         </form></section>",
        prompt = escape(&form.prompt),
        select_a = model_select("slot_a", &form.slot_a),
        select_b = model_select("slot_b", &form.slot_b),
        a = escape(&form.response_a),
        b = escape(&form.response_b),
        correctness = preference_radios("correctness", "Correctness Winner", form.scores.correctness),
        clarity = preference_radios("clarity", "Clarity Winner", form.scores.clarity),
        reasoning = preference_radios("reasoning", "Reasoning Winner", form.scores.reasoning),
    )
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        "<label><input type=\"checkbox\" name=\"{}\" value=\"on\"{}> {}</label><br>",
        name,
        if checked { " checked" } else { "" },
        label
    )
}

fn hallucination_section(form: &HallucinationForm, notices: String) -> String {
    format!(
        "<section id=\"hallucination\"><h2>Manual Hallucination Annotation</h2>{notices}\
         <form method=\"post\" action=\"/hallucination/save\">\
         <label>Paste AI Response:<br><textarea name=\"response\" rows=\"6\">{response}</textarea></label><br>\
         {fact}{claim}{numbers}{safety}\
         <label>Additional Notes:<br><textarea name=\"notes\" rows=\"3\">{notes}</textarea></label><br>\
         <button type=\"submit\">Save Hallucination Annotation</button>\
         </form></section>",
        response = escape(&form.response),
        fact = checkbox("incorrect_fact", "Incorrect Fact", form.flags.incorrect_fact),
        claim = checkbox("unsupported_claim", "Unsupported Claim", form.flags.unsupported_claim),
        numbers = checkbox("made_up_numbers", "Made-up Numbers", form.flags.made_up_numbers),
        safety = checkbox("safety_violation", "Safety / Policy Violation", form.flags.safety_violation),
        notes = escape(&form.notes),
    )
}

fn image_section(form: &ImageForm, notices: String) -> String {
    let preview = match &form.upload {
        Some(upload) => format!(
            "<figure><img src=\"/image\" alt=\"Uploaded Image\" style=\"max-width:100%\">\
             <figcaption>{} ({}x{})</figcaption></figure>",
            escape(&upload.file_name),
            upload.width,
            upload.height
        ),
        None => String::new(),
    };
    let verdicts: String = Verdict::ALL
        .iter()
        .map(|v| {
            format!(
                "<label><input type=\"radio\" name=\"is_correct\" value=\"{value}\"{checked}> {value}</label> ",
                value = v.label(),
                checked = if *v == form.verdict { " checked" } else { "" },
            )
        })
        .collect();

    format!(
        "<section id=\"image\"><h2>Image Classification Verification</h2>{notices}\
         <form method=\"post\" action=\"/image/upload\" enctype=\"multipart/form-data\">\
         <input type=\"file\" name=\"image\" accept=\"image/png,image/jpeg\">\
         <button type=\"submit\">Upload Image</button></form>{preview}\
         <form method=\"post\" action=\"/image/save\">\
         <label>AI Predicted Label:<br><input type=\"text\" name=\"predicted_label\" value=\"{predicted}\"></label>\
         <p>Is the prediction correct? {verdicts}</p>\
         <label>Enter Correct Label (used when the answer is No):<br>\
         <input type=\"text\" name=\"correct_label\" value=\"{correct}\"></label><br>\
         <button type=\"submit\">Save Image Evaluation</button>\
         </form></section>",
        predicted = escape(&form.predicted_label),
        correct = escape(&form.correct_label),
    )
}
