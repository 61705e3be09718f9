//! Analytics export renderers: CSV, Excel and PDF.
//!
//! Every export is a list of [`Sheet`]s; each renderer lays the same sheets
//! out in its own format.

use engine::{AnalyticsSummary, Bid, Rfq};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_xlsxwriter::Workbook;

use crate::ServerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Result<Self, ServerError> {
        match value {
            "csv" => Ok(Self::Csv),
            "excel" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            other => Err(ServerError::Generic(format!(
                "unsupported export format: {other}"
            ))),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportType {
    Rfqs,
    Bids,
    All,
    Summary,
}

impl ExportType {
    /// `None` selects the summary.
    pub fn parse(value: Option<&str>) -> Result<Self, ServerError> {
        match value {
            None | Some("summary") => Ok(Self::Summary),
            Some("rfqs") => Ok(Self::Rfqs),
            Some("bids") => Ok(Self::Bids),
            Some("all") => Ok(Self::All),
            Some(other) => Err(ServerError::Generic(format!(
                "unsupported export type: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rfqs => "rfqs",
            Self::Bids => "bids",
            Self::All => "all",
            Self::Summary => "summary",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Int(value) => value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub header: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

pub fn summary_sheet(summary: &AnalyticsSummary) -> Sheet {
    Sheet {
        name: "summary",
        header: &["metric", "value"],
        rows: summary
            .metrics()
            .into_iter()
            .map(|(metric, value)| vec![Cell::Text(metric.to_string()), Cell::Int(value)])
            .collect(),
    }
}

pub fn rfq_sheet(rfqs: &[Rfq]) -> Sheet {
    Sheet {
        name: "rfqs",
        header: &[
            "id",
            "title",
            "category",
            "quantity",
            "budget_minor",
            "deadline",
            "status",
            "created_at",
        ],
        rows: rfqs
            .iter()
            .map(|rfq| {
                vec![
                    Cell::Text(rfq.id.to_string()),
                    Cell::Text(rfq.title.clone()),
                    Cell::Text(rfq.category.clone()),
                    Cell::Int(rfq.quantity),
                    rfq.budget_minor
                        .map_or_else(|| Cell::Text(String::new()), Cell::Int),
                    Cell::Text(rfq.deadline.to_rfc3339()),
                    Cell::Text(rfq.status.as_str().to_string()),
                    Cell::Text(rfq.created_at.to_rfc3339()),
                ]
            })
            .collect(),
    }
}

pub fn bid_sheet(bids: &[Bid]) -> Sheet {
    Sheet {
        name: "bids",
        header: &[
            "id",
            "rfq_id",
            "supplier_id",
            "price_minor",
            "delivery_days",
            "status",
            "created_at",
        ],
        rows: bids
            .iter()
            .map(|bid| {
                vec![
                    Cell::Text(bid.id.to_string()),
                    Cell::Text(bid.rfq_id.to_string()),
                    Cell::Text(bid.supplier_id.clone()),
                    Cell::Int(bid.price_minor),
                    Cell::Int(i64::from(bid.delivery_days)),
                    Cell::Text(bid.status.as_str().to_string()),
                    Cell::Text(bid.created_at.to_rfc3339()),
                ]
            })
            .collect(),
    }
}

pub fn render(format: ExportFormat, sheets: &[Sheet]) -> Result<Vec<u8>, ServerError> {
    match format {
        ExportFormat::Csv => render_csv(sheets),
        ExportFormat::Excel => render_excel(sheets),
        ExportFormat::Pdf => render_pdf(sheets),
    }
}

/// Sheets one after another; with more than one, each starts with a
/// `# name` title line.
fn render_csv(sheets: &[Sheet]) -> Result<Vec<u8>, ServerError> {
    let csv_err = |err: csv::Error| ServerError::Internal(format!("csv export: {err}"));

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(vec![]);
    let titled = sheets.len() > 1;
    for sheet in sheets {
        if titled {
            writer
                .write_record([format!("# {}", sheet.name)])
                .map_err(csv_err)?;
        }
        writer.write_record(sheet.header).map_err(csv_err)?;
        for row in &sheet.rows {
            writer
                .write_record(row.iter().map(Cell::render))
                .map_err(csv_err)?;
        }
    }
    writer
        .into_inner()
        .map_err(|err| ServerError::Internal(format!("csv export: {err}")))
}

/// Largest integer an f64 holds exactly.
const EXCEL_EXACT_LIMIT: i64 = 1 << 53;

/// Excel numbers are f64; values past 2^53 are written as text instead.
fn excel_number(value: i64) -> Option<f64> {
    (-EXCEL_EXACT_LIMIT..=EXCEL_EXACT_LIMIT)
        .contains(&value)
        .then_some(value as f64)
}

/// One worksheet per sheet.
fn render_excel(sheets: &[Sheet]) -> Result<Vec<u8>, ServerError> {
    let xlsx_err =
        |err: rust_xlsxwriter::XlsxError| ServerError::Internal(format!("excel export: {err}"));

    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name).map_err(xlsx_err)?;
        for (col, title) in (0u16..).zip(sheet.header.iter()) {
            worksheet.write_string(0, col, *title).map_err(xlsx_err)?;
        }
        for (row, cells) in (1u32..).zip(sheet.rows.iter()) {
            for (col, cell) in (0u16..).zip(cells.iter()) {
                let written = match cell {
                    Cell::Int(value) => match excel_number(*value) {
                        Some(number) => worksheet.write_number(row, col, number),
                        None => worksheet.write_string(row, col, value.to_string()),
                    },
                    Cell::Text(text) => worksheet.write_string(row, col, text),
                };
                written.map_err(xlsx_err)?;
            }
        }
    }
    workbook.save_to_buffer().map_err(xlsx_err)
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 6.0;

/// A4 pages of plain text lines, starting a new page when one fills up.
struct PdfCursor<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PdfCursor<'_> {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        if self.y < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "analytics");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
    }
}

fn render_pdf(sheets: &[Sheet]) -> Result<Vec<u8>, ServerError> {
    let pdf_err = |err: printpdf::Error| ServerError::Internal(format!("pdf export: {err}"));

    let (doc, page, layer) = PdfDocument::new(
        "Bell24H analytics",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "analytics",
    );
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;
    let body_font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(pdf_err)?;

    {
        let mut cursor = PdfCursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
        };
        cursor.line("Bell24H analytics", 16.0, &title_font);
        for sheet in sheets {
            cursor.y -= LINE_HEIGHT;
            cursor.line(sheet.name, 12.0, &title_font);
            cursor.line(&sheet.header.join(" | "), 8.0, &body_font);
            for row in &sheet.rows {
                let line = row.iter().map(Cell::render).collect::<Vec<_>>().join(" | ");
                cursor.line(&line, 8.0, &body_font);
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> Sheet {
        Sheet {
            name: "summary",
            header: &["metric", "value"],
            rows: vec![
                vec![Cell::Text("total_rfqs".to_string()), Cell::Int(3)],
                vec![Cell::Text("open_rfqs".to_string()), Cell::Int(1)],
            ],
        }
    }

    #[test]
    fn parses_formats_and_types() {
        assert_eq!(ExportFormat::parse("excel").ok(), Some(ExportFormat::Excel));
        assert!(ExportFormat::parse("docx").is_err());
        assert_eq!(ExportType::parse(None).ok(), Some(ExportType::Summary));
        assert_eq!(ExportType::parse(Some("all")).ok(), Some(ExportType::All));
        assert!(ExportType::parse(Some("contracts")).is_err());
    }

    #[test]
    fn excel_numbers_fall_back_to_text_past_f64_precision() {
        assert_eq!(excel_number(3_500_000), Some(3_500_000.0));
        assert_eq!(excel_number(1 << 53), Some(9_007_199_254_740_992.0));
        assert_eq!(excel_number((1 << 53) + 1), None);
        assert_eq!(excel_number(i64::MAX), None);

        let mut sheet = sample_sheet();
        sheet.rows.push(vec![
            Cell::Text("total_contract_value_minor".to_string()),
            Cell::Int(i64::MAX),
        ]);
        let xlsx = render(ExportFormat::Excel, &[sheet]).unwrap();
        assert_eq!(&xlsx[..2], b"PK");
    }

    #[test]
    fn multi_sheet_csv_titles_each_section() {
        let mut second = sample_sheet();
        second.name = "rfqs";
        second.rows.truncate(1);
        let bytes = render(ExportFormat::Csv, &[sample_sheet(), second]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("# summary\nmetric,value\n"));
        assert!(text.contains("# rfqs\nmetric,value\ntotal_rfqs,3\n"));
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let bytes = render(ExportFormat::Csv, &[sample_sheet()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "metric,value\ntotal_rfqs,3\nopen_rfqs,1\n");
    }

    #[test]
    fn excel_and_pdf_produce_their_magic_bytes() {
        let xlsx = render(ExportFormat::Excel, &[sample_sheet()]).unwrap();
        assert_eq!(&xlsx[..2], b"PK");
        let pdf = render(ExportFormat::Pdf, &[sample_sheet()]).unwrap();
        assert_eq!(&pdf[..5], b"%PDF-");
    }
}
