// Rust
use crate::app_state::AppState;
use crate::error::IngestError;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::mapping::ColumnMapping;
use common::model::record::CanonicalRecord;
use common::model::row::{parse_csv, ParsedCsv};
use common::requests::{UploadResponse, FILE_FIELD, MAPPING_FIELD};
use futures_util::StreamExt;
use log::{info, warn};
use serde_json::from_slice;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SUCCESS_MESSAGE: &str = "Data stored successfully!";

/// Upper bound for the JSON `mapping` part.
const MAX_MAPPING_BYTES: usize = 64 * 1024;

/// An uploaded file sitting in the staging directory. Removed from disk when dropped.
struct StagedUpload {
    path: PathBuf,
    original_name: String,
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Could not remove staged upload {}: {}", self.path.display(), e);
        }
    }
}

/// Keeps only the final path component and replaces anything outside `[A-Za-z0-9._-]`.
fn sanitize_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload.csv".to_string()
    } else {
        cleaned
    }
}

/// Creates `<unix-millis>-<name>` in `dir`, bumping the timestamp until the name is free.
fn create_staging_file(dir: &Path, original: &str) -> std::io::Result<(PathBuf, File)> {
    let name = sanitize_file_name(original);
    let mut millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    loop {
        let path = dir.join(format!("{}-{}", millis, name));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
            Err(e) => return Err(e),
        }
    }
}

/// An empty object means "no mapping", which selects the alias table.
fn parse_mapping(bytes: &[u8]) -> Result<Option<ColumnMapping>, IngestError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }
    let mapping: ColumnMapping = from_slice(bytes)?;
    mapping.validate()?;
    Ok(if mapping.is_empty() { None } else { Some(mapping) })
}

fn build_records(
    parsed: &ParsedCsv,
    mapping: Option<&ColumnMapping>,
    state: &AppState,
) -> Vec<CanonicalRecord> {
    match mapping {
        Some(mapping) => parsed
            .rows
            .iter()
            .map(|row| CanonicalRecord::from_mapped(&mapping.transform(row)))
            .collect(),
        None => state.aliases.normalize_rows(&parsed.rows),
    }
}

/// HTTP handler for `POST /upload`.
///
/// - On success: `200 OK` with `{ "message": ..., "data": [records] }`.
/// - On failure: `400`/`500` with a plain-text error (see `IngestError`).
pub async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    match ingest_upload(&state, payload).await {
        Ok(records) => HttpResponse::Ok().json(UploadResponse {
            message: SUCCESS_MESSAGE.to_string(),
            data: records,
        }),
        Err(e) => {
            warn!("Upload rejected: {}", e);
            e.error_response()
        }
    }
}

/// Stages the `file` part, parses it, turns every row into a canonical record
/// and appends the batch to storage.
///
/// Rows go through the `mapping` part when one is sent and through the alias
/// table otherwise. The staged file is removed as soon as it has been parsed,
/// whether parsing succeeded or not.
pub async fn ingest_upload(
    state: &AppState,
    mut payload: Multipart,
) -> Result<Vec<CanonicalRecord>, IngestError> {
    let mut staged: Option<StagedUpload> = None;
    let mut mapping: Option<ColumnMapping> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some(FILE_FIELD) => {
                let original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();

                let (path, file) = create_staging_file(&state.upload_dir, &original_name)?;
                staged = Some(StagedUpload {
                    path,
                    original_name,
                });

                let mut writer = BufWriter::new(file);
                while let Some(chunk) = field.next().await {
                    writer.write_all(&chunk?)?;
                }
                writer.flush()?;
            }

            Some(MAPPING_FIELD) => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    if bytes.len() + chunk.len() > MAX_MAPPING_BYTES {
                        return Err(IngestError::MappingTooLarge {
                            limit: MAX_MAPPING_BYTES,
                        });
                    }
                    bytes.extend_from_slice(&chunk);
                }
                mapping = parse_mapping(&bytes)?;
            }

            _ => {
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }

    let staged = staged.ok_or(IngestError::MissingFile)?;
    let path = staged.path.clone();
    let parsed = tokio::task::spawn_blocking(
        move || -> Result<Result<ParsedCsv, common::error::MappingError>, std::io::Error> {
            let file = File::open(&path)?;
            Ok(parse_csv(BufReader::new(file)))
        },
    )
    .await?;
    let original_name = staged.original_name.clone();
    drop(staged);
    let parsed = parsed??;

    let records = build_records(&parsed, mapping.as_ref(), state);

    let store = state.store.clone();
    let batch = records.clone();
    let stored = tokio::task::spawn_blocking(move || store.insert_many(&batch)).await??;

    info!(
        "Stored {} records from '{}' using {}",
        stored,
        original_name,
        if mapping.is_some() { "the column mapping" } else { "the alias table" }
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::configure_routes;
    use crate::services::test_support::{multipart_request, test_state, Part};
    use actix_web::{test, App};
    use serde_json::Value;

    #[::core::prelude::v1::test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("people.csv"), "people.csv");
        assert_eq!(sanitize_file_name("../../etc/pass wd.csv"), "pass_wd.csv");
        assert_eq!(sanitize_file_name(""), "upload.csv");
        assert_eq!(sanitize_file_name(".."), "upload.csv");
    }

    #[::core::prelude::v1::test]
    fn staging_names_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = create_staging_file(dir.path(), "a.csv").unwrap();
        let (second, _) = create_staging_file(dir.path(), "a.csv").unwrap();
        assert_ne!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        let (stamp, rest) = name.split_once('-').unwrap();
        assert!(stamp.parse::<u128>().is_ok());
        assert_eq!(rest, "a.csv");
    }

    #[::core::prelude::v1::test]
    fn blank_or_empty_mapping_means_alias_table() {
        assert!(parse_mapping(b"").unwrap().is_none());
        assert!(parse_mapping(b"  \n").unwrap().is_none());
        assert!(parse_mapping(b"{}").unwrap().is_none());
        assert!(parse_mapping(br#"{"Name": "first_name"}"#).unwrap().is_some());
    }

    #[actix_web::test]
    async fn header_only_file_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let req = multipart_request(&[Part::file("people.csv", "f_name,mobile\n")]);
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], SUCCESS_MESSAGE);
        assert_eq!(body["data"], serde_json::json!([]));
        assert!(state.store.list().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn alias_headers_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let csv = "f_name,mobile,postal_index_code\nAsha,9998887776,560001\n";
        let req = multipart_request(&[Part::file("people.csv", csv)]);
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: UploadResponse = test::read_body_json(resp).await;
        assert_eq!(
            body.data,
            vec![CanonicalRecord {
                id: None,
                first_name: "Asha".to_string(),
                middle_name: String::new(),
                last_name: String::new(),
                phone_number: "9998887776".to_string(),
                address_line_1: String::new(),
                state: String::new(),
                pin_code: "560001".to_string(),
                country: String::new(),
            }]
        );

        let stored = state.store.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].id.is_some());
        assert_eq!(stored[0].phone_number, "9998887776");
    }

    #[actix_web::test]
    async fn column_mapping_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        // "mobile" would match the alias table, but the mapping leaves it unmapped.
        let req = multipart_request(&[
            Part::file("people.csv", "Name,mobile,Region\nAsha,999,KA\n"),
            Part::text(MAPPING_FIELD, r#"{"Name": "first_name", "Region": "state"}"#),
        ]);
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: UploadResponse = test::read_body_json(resp).await;
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].first_name, "Asha");
        assert_eq!(body.data[0].state, "KA");
        assert_eq!(body.data[0].phone_number, "");
    }

    #[actix_web::test]
    async fn mapping_may_arrive_before_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let req = multipart_request(&[
            Part::text(MAPPING_FIELD, r#"{"Ph": "phone_number"}"#),
            Part::file("people.csv", "Name,Ph\nAsha,999\n"),
        ]);
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: UploadResponse = test::read_body_json(resp).await;
        assert_eq!(body.data[0].phone_number, "999");
        assert_eq!(body.data[0].first_name, "");
    }

    #[actix_web::test]
    async fn invalid_mappings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        for mapping in [
            r#"{"Name": "nickname"}"#,
            r#"{"Name": "first_name", "Other": "first_name"}"#,
            "not json",
        ] {
            let req = multipart_request(&[
                Part::file("people.csv", "Name,Other\nA,B\n"),
                Part::text(MAPPING_FIELD, mapping),
            ]);
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400, "mapping {mapping} should be rejected");
        }

        assert!(state.store.list().unwrap().is_empty());
        assert_eq!(fs::read_dir(&state.upload_dir).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn oversized_mapping_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let padding = " ".repeat(MAX_MAPPING_BYTES);
        let mapping = format!(r#"{{"Name": "first_name"}}{}"#, padding);
        let req = multipart_request(&[
            Part::file("people.csv", "Name\nAsha\n"),
            Part::text(MAPPING_FIELD, &mapping),
        ]);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body = test::read_body(resp).await;
        let expected = format!("Error: Mapping exceeds {} bytes", MAX_MAPPING_BYTES);
        assert_eq!(body, web::Bytes::from(expected));
        assert!(state.store.list().unwrap().is_empty());
        assert_eq!(fs::read_dir(&state.upload_dir).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn missing_file_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let req = multipart_request(&[Part::text("other", "value")]);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body = test::read_body(resp).await;
        assert_eq!(body, web::Bytes::from_static(b"Error: Missing file"));
    }

    #[actix_web::test]
    async fn malformed_csv_is_rejected_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let req = multipart_request(&[Part::file_bytes("bad.csv", b"name\n\xff\xfe\n".to_vec())]);
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        assert!(state.store.list().unwrap().is_empty());
        assert_eq!(fs::read_dir(&state.upload_dir).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn staged_file_is_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_routes),
        )
            .await;

        let req = multipart_request(&[Part::file("people.csv", "f_name\nAsha\n")]);
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(fs::read_dir(&state.upload_dir).unwrap().count(), 0);
    }
}
