//! PDF drawing for a planned report. One A4 page, builtin Helvetica faces.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::*;

use super::layout::*;
use super::metrics::{self, Face};
use super::rows::ReportRow;
use super::{ReportError, ReportMetadata};
use crate::catalog;
use crate::config::LabProfile;
use crate::models::{PatientIdentity, Sex};

type Rgb8 = (u8, u8, u8);

const BLACK: Rgb8 = (0, 0, 0);
const FLAG_RED: Rgb8 = (200, 0, 0);
const HEADER_FILL: Rgb8 = (240, 240, 240);
const ALTERNATE_FILL: Rgb8 = (250, 250, 250);
const ABNORMAL_FILL: Rgb8 = (255, 230, 230);
const BORDER: Rgb8 = (200, 200, 200);
const BORDER_THICKNESS: f32 = 0.3;

/// Distance from a row's top edge to the text baseline.
const BASELINE_OFFSET: f32 = 4.2;

fn color(rgb: Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        rgb.0 as f32 / 255.0,
        rgb.1 as f32 / 255.0,
        rgb.2 as f32 / 255.0,
        None,
    ))
}

/// Converts top-down layout coordinates into PDF space.
fn pdf_y(top: f32) -> Mm {
    Mm(PAGE_HEIGHT - top)
}

fn sex_label(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "Male",
        Sex::Female => "Female",
        Sex::Other => "Other",
    }
}

struct Canvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Canvas {
    fn font(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, baseline_top: f32, face: Face, rgb: Rgb8) {
        self.layer.set_fill_color(color(rgb));
        self.layer
            .use_text(text, size, Mm(x), pdf_y(baseline_top), self.font(face));
    }

    fn text_centered(&self, text: &str, size: f32, left: f32, width: f32, baseline_top: f32, face: Face, rgb: Rgb8) {
        let x = metrics::centered_x(text, size, face, left, width);
        self.text(text, size, x, baseline_top, face, rgb);
    }

    fn fill_band(&self, left: f32, top: f32, width: f32, height: f32, rgb: Rgb8) {
        self.layer.set_fill_color(color(rgb));
        let rect = Rect::new(
            Mm(left),
            pdf_y(top + height),
            Mm(left + width),
            pdf_y(top),
        )
        .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    fn line(&self, x1: f32, top1: f32, x2: f32, top2: f32) {
        self.layer.set_outline_color(color(BORDER));
        self.layer.set_outline_thickness(BORDER_THICKNESS);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), pdf_y(top1)), false),
                (Point::new(Mm(x2), pdf_y(top2)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }
}

/// Render the report for `patient` as PDF bytes.
pub fn render(
    patient: &PatientIdentity,
    metadata: &ReportMetadata,
    rows: &[ReportRow],
    lab: &LabProfile,
) -> Result<Vec<u8>, ReportError> {
    let panel = catalog::panel(&metadata.test_type).unwrap_or_else(catalog::default_panel);
    let plan = plan(rows);

    let title = format!("{} - {}", panel.title, patient.name.trim());
    let (doc, page1, layer1) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let canvas = Canvas {
        layer: doc.get_page(page1).get_layer(layer1),
        regular,
        bold,
    };

    draw_header(&canvas, patient, metadata);
    draw_titles(&canvas, panel.department, panel.title);
    draw_table(&canvas, &plan);
    draw_footer(&canvas, lab, plan.footer_top);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
}

fn draw_header(canvas: &Canvas, patient: &PatientIdentity, metadata: &ReportMetadata) {
    let size = FONT_SIZE_HEADER;
    let mut top = HEADER_TOP;

    canvas.text(
        &format!("NAME : {}", patient.name.trim().to_uppercase()),
        size,
        HEADER_LEFT_X,
        top,
        Face::Bold,
        BLACK,
    );
    canvas.text(
        &format!("Reg. No : {}", metadata.registration_number),
        size,
        HEADER_RIGHT_X,
        top,
        Face::Bold,
        BLACK,
    );
    top += HEADER_LINE_HEIGHT;

    canvas.text(
        &format!("Age / Sex : {} Years / {}", patient.age, sex_label(patient.sex)),
        size,
        HEADER_LEFT_X,
        top,
        Face::Regular,
        BLACK,
    );
    canvas.text(
        &format!("Phone : {}", patient.phone_trimmed().unwrap_or("N/A")),
        size,
        HEADER_RIGHT_X,
        top,
        Face::Regular,
        BLACK,
    );
    top += HEADER_LINE_HEIGHT;

    canvas.text(
        &format!("Referred By : {}", patient.referred_by_or_default()),
        size,
        HEADER_LEFT_X,
        top,
        Face::Regular,
        BLACK,
    );
    canvas.text(
        &format!("Date : {}", metadata.report_date.format("%-d %B %Y")),
        size,
        HEADER_RIGHT_X,
        top,
        Face::Regular,
        BLACK,
    );

    canvas.line(TABLE_X, top + 3.0, TABLE_X + TABLE_WIDTH, top + 3.0);
}

fn draw_titles(canvas: &Canvas, department: &str, title: &str) {
    canvas.text_centered(department, FONT_SIZE_TITLE, 0.0, PAGE_WIDTH, DEPARTMENT_TOP, Face::Bold, BLACK);
    canvas.text_centered(title, FONT_SIZE_TITLE - 1.0, 0.0, PAGE_WIDTH, TITLE_TOP, Face::Bold, BLACK);
}

fn draw_table(canvas: &Canvas, plan: &LayoutPlan) {
    let value_x = TABLE_X + NAME_COL_WIDTH;
    let reference_x = value_x + VALUE_COL_WIDTH;
    let size = FONT_SIZE_TABLE;

    // Column header
    canvas.fill_band(TABLE_X, TABLE_TOP, TABLE_WIDTH, TABLE_HEADER_HEIGHT, HEADER_FILL);
    let header_baseline = TABLE_TOP + TABLE_HEADER_HEIGHT - 2.8;
    for (title, left, width) in COLUMN_TITLES {
        canvas.text_centered(title, size, left, width, header_baseline, Face::Bold, BLACK);
    }

    // Row backgrounds go down before any text
    for row in &plan.rows {
        if let PlacedContent::Data { fill: Some(fill), .. } = &row.content {
            let rgb = match fill {
                RowFill::Abnormal => ABNORMAL_FILL,
                RowFill::Alternate => ALTERNATE_FILL,
            };
            canvas.fill_band(TABLE_X, row.top, TABLE_WIDTH, row.height, rgb);
        }
    }

    for row in &plan.rows {
        let baseline = row.top + BASELINE_OFFSET;
        match &row.content {
            PlacedContent::Heading { label } => {
                canvas.text(label, size, TABLE_X + CELL_PADDING, baseline, Face::Bold, BLACK);
            }
            PlacedContent::Data {
                name,
                value,
                reference,
                value_bold,
                ..
            } => {
                canvas.text(
                    name,
                    size,
                    TABLE_X + CELL_PADDING + NAME_INDENT,
                    baseline,
                    Face::Regular,
                    BLACK,
                );
                let (face, rgb) = if *value_bold {
                    (Face::Bold, FLAG_RED)
                } else {
                    (Face::Regular, BLACK)
                };
                canvas.text_centered(value, size, value_x, VALUE_COL_WIDTH, baseline, face, rgb);
                canvas.text_centered(
                    reference,
                    size,
                    reference_x,
                    REFERENCE_COL_WIDTH,
                    baseline,
                    Face::Regular,
                    BLACK,
                );
            }
        }
    }

    // Borders
    let bottom = plan.table_bottom();
    let right = TABLE_X + TABLE_WIDTH;
    canvas.line(TABLE_X, TABLE_TOP, right, TABLE_TOP);
    canvas.line(TABLE_X, plan.body_top, right, plan.body_top);
    canvas.line(TABLE_X, bottom, right, bottom);
    for x in [TABLE_X, value_x, reference_x, right] {
        canvas.line(x, TABLE_TOP, x, bottom);
    }
}

fn draw_footer(canvas: &Canvas, lab: &LabProfile, footer_top: f32) {
    let size = FONT_SIZE_FOOTER;
    let technician_x = 20.0;
    let pathologist_x = 140.0;

    canvas.text(&lab.technician, size + 1.0, technician_x, footer_top, Face::Bold, BLACK);
    canvas.text(&lab.technician_qualification, size, technician_x, footer_top + 4.5, Face::Regular, BLACK);
    canvas.text(&lab.pathologist, size + 1.0, pathologist_x, footer_top, Face::Bold, BLACK);
    canvas.text(&lab.pathologist_qualification, size, pathologist_x, footer_top + 4.5, Face::Regular, BLACK);

    canvas.text_centered("Page 1 of 1", size, 0.0, PAGE_WIDTH, footer_top + 14.0, Face::Regular, BLACK);
    canvas.text_centered(&lab.disclaimer, size, 0.0, PAGE_WIDTH, footer_top + 19.0, Face::Bold, BLACK);
    canvas.text_centered(&lab.work_timings, size, 0.0, PAGE_WIDTH, footer_top + 24.0, Face::Regular, BLACK);
}
