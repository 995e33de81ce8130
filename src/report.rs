//! PDF report rendering through the Frappe server.
//!
//! For every host record a remote document is created from the caller's
//! mapping function, then the server renders all of them in one print URL
//! and the bytes come back as the report artifact. Documents created along
//! the way are optionally deleted afterwards. Everything runs sequentially
//! on the caller's thread; a failure mid-sequence leaves already-created
//! remote documents in place.

use serde_json::Value;
use urlencoding::encode;

use crate::client::{self, HttpTransport};
use crate::config::{ConfigProvider, FrappeConnection};
use crate::error::{ApiError, ApiResult};

/// Report kind handled by this renderer.
pub const REPORT_TYPE_FRAPPE: &str = "frappe";

/// Which remote rendering engine produces the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintDesigner {
    /// Classic print formats, rendered through `frappe.utils.print_format`.
    #[default]
    PrintFormat,
    /// Builder-based formats (`print_format_builder_beta`), rendered through
    /// `frappe.utils.weasyprint`. Single-document only.
    Weasyprint,
}

impl PrintDesigner {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PrintDesigner::PrintFormat => "print_format",
            PrintDesigner::Weasyprint => "weasyprint",
        }
    }
}

/// A report definition of the remote-PDF kind. Owned by the host's
/// report-action table; read-only here.
#[derive(Debug, Clone, Default)]
pub struct ReportAction {
    pub report_name: String,
    pub report_type: String,
    /// Target doctype on the Frappe side.
    pub doctype: String,
    pub print_format: Option<String>,
    pub letterhead: Option<String>,
    /// Delete the created documents once the PDF is in hand.
    pub delete_after_print: bool,
}

#[derive(Debug)]
struct PrintParams {
    designer: PrintDesigner,
    format_key: &'static str,
    format_value: String,
    letterhead: String,
}

/// Renders `report` for `records` and returns the PDF bytes together with
/// the `"pdf"` artifact kind.
///
/// `mapper` turns one host record into the document payload sent to the
/// server; it is called once per record, in order.
///
/// # Errors
///
/// - [`ApiError::Configuration`] before any request when the connection
///   parameters are unusable.
/// - [`ApiError::Validation`] when the resolved designer cannot handle the
///   number of records, before any document is created.
/// - [`ApiError::Remote`] / transport errors from any step; documents
///   created before the failure are not rolled back.
pub fn render_report<C, T, R, F>(
    config: &C,
    transport: &T,
    report: &ReportAction,
    records: &[R],
    mapper: F,
) -> ApiResult<(Vec<u8>, &'static str)>
where
    C: ConfigProvider,
    T: HttpTransport,
    F: Fn(&R) -> Value,
{
    let conn = FrappeConnection::resolve(config)?;
    let params = prepare_print_params(&conn, transport, report, records.len())?;
    let docs = create_docs(&conn, transport, report, records, mapper)?;
    let print_url = prepare_print_url(&conn.server_url, &report.doctype, &params, &docs)?;
    let pdf = client::fetch_raw(&conn, transport, &print_url)?;
    if report.delete_after_print {
        delete_docs(&conn, transport, report, &docs);
    }
    log::info!("rendered {} ({} bytes)", report.report_name, pdf.len());
    Ok((pdf, "pdf"))
}

/// Resolves designer, format parameter and letterhead before anything is
/// created on the server.
fn prepare_print_params<T: HttpTransport>(
    conn: &FrappeConnection,
    transport: &T,
    report: &ReportAction,
    record_count: usize,
) -> ApiResult<PrintParams> {
    let mut designer = PrintDesigner::default();
    if let Some(print_format) = report.print_format.as_deref() {
        let data = client::list_docs(
            conn,
            transport,
            "Print Format",
            &["print_format_builder_beta"],
            &[
                ("Print Format", "name", "=", print_format),
                ("Print Format", "doc_type", "=", report.doctype.as_str()),
            ],
        )?;
        if data
            .get(0)
            .and_then(|row| row.get("print_format_builder_beta"))
            .is_some_and(is_truthy)
        {
            designer = PrintDesigner::Weasyprint;
        }
    }
    if designer == PrintDesigner::Weasyprint && record_count > 1 {
        return Err(ApiError::Validation(
            "the selected format uses the print format builder (beta), \
             which does not support printing multiple documents"
                .to_string(),
        ));
    }
    let (format_key, format_value) = match designer {
        PrintDesigner::PrintFormat => (
            "format",
            report
                .print_format
                .clone()
                .unwrap_or_else(|| "Standard".to_string()),
        ),
        PrintDesigner::Weasyprint => {
            ("print_format", report.print_format.clone().unwrap_or_default())
        }
    };
    Ok(PrintParams {
        designer,
        format_key,
        format_value,
        letterhead: report.letterhead.clone().unwrap_or_default(),
    })
}

/// Frappe check fields come back as 0/1, not booleans.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn create_docs<T, R, F>(
    conn: &FrappeConnection,
    transport: &T,
    report: &ReportAction,
    records: &[R],
    mapper: F,
) -> ApiResult<Vec<String>>
where
    T: HttpTransport,
    F: Fn(&R) -> Value,
{
    let mut names = Vec::with_capacity(records.len());
    for record in records {
        let payload = mapper(record);
        names.push(client::create_doc(conn, transport, &report.doctype, &payload)?);
    }
    Ok(names)
}

/// Builds the `frappe.utils.{designer}.{method}` print URL. A single
/// document downgrades to `download_pdf` with the bare name; more than one
/// keeps `download_multi_pdf` with the JSON-encoded name list.
fn prepare_print_url(
    server_url: &str,
    doctype: &str,
    params: &PrintParams,
    docs: &[String],
) -> ApiResult<String> {
    let (method, name) = match docs {
        [single] => ("download_pdf", single.clone()),
        _ => ("download_multi_pdf", serde_json::to_string(docs)?),
    };
    Ok(format!(
        "{server_url}/api/method/frappe.utils.{designer}.{method}\
         ?doctype={doctype}&name={name}&{format_key}={format_value}&letterhead={letterhead}",
        designer = params.designer.as_str(),
        doctype = encode(doctype),
        name = encode(&name),
        format_key = params.format_key,
        format_value = encode(&params.format_value),
        letterhead = encode(&params.letterhead),
    ))
}

/// Cleanup after printing. The PDF is already in hand at this point, so
/// failures are logged rather than returned.
fn delete_docs<T: HttpTransport>(
    conn: &FrappeConnection,
    transport: &T,
    report: &ReportAction,
    docs: &[String],
) {
    for name in docs {
        if let Err(err) = client::delete_doc(conn, transport, &report.doctype, name) {
            log::warn!("could not delete {} {name} after print: {err}", report.doctype);
        }
    }
}

/// In-memory report-action table with the lookup fallback for the
/// remote-PDF kind: native report kinds match first, [`REPORT_TYPE_FRAPPE`]
/// definitions only when no native one carries the name.
#[derive(Debug, Default)]
pub struct ReportRegistry {
    reports: Vec<ReportAction>,
}

impl ReportRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, report: ReportAction) {
        self.reports.push(report);
    }

    #[must_use]
    pub fn find_by_name(&self, report_name: &str) -> Option<&ReportAction> {
        self.reports
            .iter()
            .find(|r| r.report_name == report_name && r.report_type != REPORT_TYPE_FRAPPE)
            .or_else(|| {
                self.reports
                    .iter()
                    .find(|r| r.report_name == report_name && r.report_type == REPORT_TYPE_FRAPPE)
            })
    }
}
