//! Update function for the CSV mapper component.
//!
//! Elm-style: every message replaces `component.mapper` with the result of a
//! pure `MapperState` transition, and side effects (reading the file, posting
//! the upload) run in `spawn_local` tasks that answer with another message.

use std::mem;

use gloo_file::{futures::read_as_text, Blob};
use gloo_net::http::Request;
use web_sys::FormData;
use yew::platform::spawn_local;
use yew::prelude::*;

use common::model::mapping::ColumnMapping;
use common::model::row::parse_csv_str;
use common::requests::{UploadResponse, FILE_FIELD, MAPPING_FIELD};

use super::helpers::{format_row_count, show_toast};
use super::messages::Msg;
use super::state::CsvMapperComponent;

/// Central update function for the component.
///
/// Returns `true` to re-render the view, `false` when only side effects occur.
pub fn update(
    component: &mut CsvMapperComponent,
    ctx: &Context<CsvMapperComponent>,
    msg: Msg,
) -> bool {
    match msg {
        Msg::OpenFileDialog => {
            if let Some(input) = component.file_input_ref.cast::<web_sys::HtmlInputElement>() {
                input.click();
            }
            false
        }
        Msg::FileSelected(file) => {
            let name = file.name();
            let size = file.size() as u64;
            component.mapper = mem::take(&mut component.mapper).reading(name.clone());

            let link = ctx.link().clone();
            spawn_local(async move {
                let blob = Blob::from(web_sys::Blob::from(file.clone()));
                let result = match read_as_text(&blob).await {
                    Ok(text) => parse_csv_str(&text).map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                link.send_message(Msg::FileParsed {
                    file,
                    name,
                    size,
                    result,
                });
            });
            true
        }
        Msg::FileParsed {
            file,
            name,
            size,
            result,
        } => {
            match result {
                Ok(csv) => {
                    if csv.is_empty() {
                        show_toast("The file has no header row.");
                    }
                    // The file handle and the mapping always come from the same parse.
                    component.file = Some(file);
                    component.mapper = mem::take(&mut component.mapper).with_file(name, size, csv);
                }
                Err(err) => {
                    gloo_console::error!(format!("Could not parse {}: {}", name, err));
                    component.file = None;
                    component.mapper = Default::default();
                    show_toast(&format!("Could not read the CSV file: {}", err));
                }
            }
            true
        }
        Msg::SelectField { header, field } => {
            component.mapper = mem::take(&mut component.mapper).with_selection(&header, field);
            true
        }
        Msg::Submit => {
            if !component.mapper.can_submit() {
                return false;
            }
            let Some(file) = component.file.clone() else {
                return false;
            };

            let form = match build_form(&file, &component.mapper.mapping) {
                Ok(form) => form,
                Err(err) => {
                    show_toast(&format!("Upload failed: {}", err));
                    return false;
                }
            };

            component.mapper = mem::take(&mut component.mapper).submitting();

            let link = ctx.link().clone();
            spawn_local(async move {
                link.send_message(Msg::SubmitFinished(post_upload(form).await));
            });
            true
        }
        Msg::SubmitFinished(outcome) => {
            match &outcome {
                Ok(count) => show_toast(&format!(
                    "CSV data uploaded successfully! {} stored.",
                    format_row_count(*count)
                )),
                Err(err) => {
                    gloo_console::error!(format!("Upload failed: {}", err));
                    show_toast(&format!("Upload failed: {}", err));
                }
            }
            component.mapper = mem::take(&mut component.mapper).submitted(outcome);
            true
        }
    }
}

/// The multipart body for `POST /upload`: the original file plus the mapping as JSON.
fn build_form(file: &web_sys::File, mapping: &ColumnMapping) -> Result<FormData, String> {
    let mapping_json = serde_json::to_string(mapping).map_err(|e| e.to_string())?;
    let form = FormData::new().map_err(|e| format!("{:?}", e))?;
    form.append_with_blob_and_filename(FILE_FIELD, file, &file.name())
        .map_err(|e| format!("{:?}", e))?;
    form.append_with_str(MAPPING_FIELD, &mapping_json)
        .map_err(|e| format!("{:?}", e))?;
    Ok(form)
}

/// Sends the upload once; no retry. Resolves to the number of stored records.
async fn post_upload(form: FormData) -> Result<usize, String> {
    let request = Request::post("/upload")
        .body(form)
        .map_err(|e| e.to_string())?;
    let response = request.send().await.map_err(|e| e.to_string())?;

    if response.status() == 200 {
        let body: UploadResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.data.len())
    } else {
        Err(response.text().await.unwrap_or_default())
    }
}
