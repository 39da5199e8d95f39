use common::model::field::CanonicalField;
use common::model::state::{MapperState, SubmissionStatus};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::html::Scope;
use yew::prelude::*;

use super::helpers::{field_from_selector, format_row_count, format_size_kb, selector_value};
use super::messages::Msg;
use super::state::CsvMapperComponent;

const PREVIEW_ROWS: usize = 5;

pub fn view(component: &CsvMapperComponent, ctx: &Context<CsvMapperComponent>) -> Html {
    let link = ctx.link();
    let mapper = &component.mapper;

    let on_file_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        input
            .files()
            .and_then(|files| files.get(0))
            .map(Msg::FileSelected)
    });

    html! {
        <div style="max-width:48rem;margin:2rem auto;font-family:Arial, sans-serif;">
            <input
                type="file"
                accept=".csv"
                style="display:none;"
                ref={component.file_input_ref.clone()}
                onchange={on_file_change}
            />
            <div style="display:flex;flex-direction:column;align-items:center;gap:0.75rem;">
                <button onclick={link.callback(|_| Msg::OpenFileDialog)}>{"Choose File"}</button>
                { file_summary(mapper) }
                {
                    if mapper.file.is_some() && mapper.reading.is_none() {
                        html! {
                            <button
                                disabled={!mapper.can_submit()}
                                onclick={link.callback(|_| Msg::Submit)}
                            >
                                { if mapper.status == SubmissionStatus::Submitting { "Uploading..." } else { "Upload File" } }
                            </button>
                        }
                    } else {
                        html! {}
                    }
                }
                { status_line(&mapper.status) }
            </div>
            {
                if mapper.shows_mapping() {
                    html! {
                        <>
                            { mapping_section(mapper, link) }
                            { preview_table(mapper) }
                        </>
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}

fn file_summary(mapper: &MapperState) -> Html {
    if let Some(name) = &mapper.reading {
        return html! { <p>{ format!("Reading {}...", name) }</p> };
    }
    match &mapper.file {
        Some(file) => html! {
            <p>
                { format!("{} - {} - {}", file.name, format_size_kb(file.size), format_row_count(mapper.csv.rows.len())) }
            </p>
        },
        None => html! {},
    }
}

fn status_line(status: &SubmissionStatus) -> Html {
    match status {
        SubmissionStatus::Succeeded(count) => html! {
            <p style="color:#2e7d32;">{ format!("Stored {}.", format_row_count(*count)) }</p>
        },
        SubmissionStatus::Failed(err) => html! {
            <p style="color:#c62828;">{ format!("Upload failed: {}", err) }</p>
        },
        SubmissionStatus::Idle | SubmissionStatus::Submitting => html! {},
    }
}

fn mapping_section(mapper: &MapperState, link: &Scope<CsvMapperComponent>) -> Html {
    html! {
        <div style="margin-top:1.5rem;">
            <h2 style="text-align:center;">{"Column Mapping"}</h2>
            {
                for mapper.csv.headers.iter().map(|header| {
                    let current = mapper.mapping.field_for(header);
                    let header_for_cb = header.clone();
                    let onchange = link.callback(move |e: Event| {
                        let select: HtmlSelectElement = e.target_unchecked_into();
                        Msg::SelectField {
                            header: header_for_cb.clone(),
                            field: field_from_selector(&select.value()),
                        }
                    });

                    html! {
                        <div key={header.clone()} style="display:flex;gap:1rem;align-items:center;margin-top:0.75rem;">
                            <span style="width:10rem;font-weight:bold;">{ header.clone() }</span>
                            <select {onchange}>
                                <option value="" selected={current.is_none()}>{"Select Field"}</option>
                                {
                                    for CanonicalField::ALL.iter().map(|field| html! {
                                        <option
                                            value={selector_value(Some(*field))}
                                            selected={current == Some(*field)}
                                        >
                                            { field.as_str() }
                                        </option>
                                    })
                                }
                            </select>
                        </div>
                    }
                })
            }
        </div>
    }
}

/// The first rows as the server will store them with the current mapping.
fn preview_table(mapper: &MapperState) -> Html {
    let columns = mapper.preview_columns();

    if columns.is_empty() {
        return html! {};
    }

    html! {
        <table style="margin-top:1.5rem;width:100%;border-collapse:collapse;">
            <thead>
                <tr>
                    { for columns.iter().map(|field| html! { <th style="text-align:left;">{ field.as_str() }</th> }) }
                </tr>
            </thead>
            <tbody>
                {
                    for mapper.preview(PREVIEW_ROWS).iter().map(|row| html! {
                        <tr>
                            {
                                for columns.iter().map(|field| html! {
                                    <td>{ row.get(field).cloned().unwrap_or_default() }</td>
                                })
                            }
                        </tr>
                    })
                }
            </tbody>
        </table>
    }
}
