//! Page layout for the single-page report.
//!
//! Coordinates here are millimetres measured down from the top edge of an A4
//! page; `render` flips them into PDF space. Planning is pure so spacing
//! rules can be tested without producing a PDF.

use super::rows::{ReportRow, CUSTOM_TESTS_HEADING};
use super::text;
use crate::flagging::Flag;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

/// Space left blank at the top for pre-printed letterhead.
pub const HEADER_TOP: f32 = 60.0;
pub const HEADER_LINE_HEIGHT: f32 = 6.0;
pub const HEADER_LEFT_X: f32 = 15.0;
pub const HEADER_RIGHT_X: f32 = 120.0;

pub const DEPARTMENT_TOP: f32 = 84.0;
pub const TITLE_TOP: f32 = 90.0;

pub const TABLE_X: f32 = 15.0;
pub const TABLE_WIDTH: f32 = 180.0;
pub const TABLE_TOP: f32 = 96.0;
pub const TABLE_HEADER_HEIGHT: f32 = 8.0;

/// Column widths: name 50 %, value 25 %, reference 25 %.
pub const NAME_COL_WIDTH: f32 = TABLE_WIDTH * 0.50;
pub const VALUE_COL_WIDTH: f32 = TABLE_WIDTH * 0.25;
pub const REFERENCE_COL_WIDTH: f32 = TABLE_WIDTH * 0.25;

/// Column header titles with the band each is centered in: (title, left, width).
pub const COLUMN_TITLES: [(&str, f32, f32); 3] = [
    ("TEST DESCRIPTION", TABLE_X, NAME_COL_WIDTH),
    ("RESULT", TABLE_X + NAME_COL_WIDTH, VALUE_COL_WIDTH),
    ("REFERENCE RANGE", TABLE_X + NAME_COL_WIDTH + VALUE_COL_WIDTH, REFERENCE_COL_WIDTH),
];

pub const ROW_HEIGHT: f32 = 6.0;
pub const HEADING_GAP_BEFORE: f32 = 3.0;
pub const HEADING_GAP_AFTER: f32 = 1.0;
pub const CUSTOM_SECTION_GAP: f32 = 5.0;
/// Body height never shrinks below this, so short reports keep their frame.
pub const TABLE_MIN_BODY_HEIGHT: f32 = 100.0;

pub const CELL_PADDING: f32 = 2.0;
pub const NAME_INDENT: f32 = 4.0;

pub const FOOTER_MIN_TOP: f32 = 250.0;
pub const FOOTER_GAP: f32 = 12.0;

pub const FONT_SIZE_HEADER: f32 = 10.0;
pub const FONT_SIZE_TITLE: f32 = 12.0;
pub const FONT_SIZE_TABLE: f32 = 9.0;
pub const FONT_SIZE_FOOTER: f32 = 8.0;

/// Background tint behind a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFill {
    Alternate,
    Abnormal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacedContent {
    Heading {
        label: String,
    },
    Data {
        name: String,
        value: String,
        reference: String,
        value_bold: bool,
        fill: Option<RowFill>,
    },
}

/// A row with its vertical position inside the table body.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub top: f32,
    pub height: f32,
    pub content: PlacedContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub rows: Vec<PlacedRow>,
    /// Top of the first body row (just under the column header).
    pub body_top: f32,
    pub body_height: f32,
    pub footer_top: f32,
}

impl LayoutPlan {
    pub fn table_bottom(&self) -> f32 {
        self.body_top + self.body_height
    }
}

/// Place every row on the page.
pub fn plan(rows: &[ReportRow]) -> LayoutPlan {
    let body_top = TABLE_TOP + TABLE_HEADER_HEIGHT;
    let mut cursor = body_top;
    let mut placed = Vec::with_capacity(rows.len());
    let mut data_index = 0usize;

    for (i, row) in rows.iter().enumerate() {
        match row {
            ReportRow::GroupHeading { label } => {
                if label == CUSTOM_TESTS_HEADING {
                    cursor += CUSTOM_SECTION_GAP;
                } else if i > 0 {
                    cursor += HEADING_GAP_BEFORE;
                }
                placed.push(PlacedRow {
                    top: cursor,
                    height: ROW_HEIGHT,
                    content: PlacedContent::Heading {
                        label: label.clone(),
                    },
                });
                cursor += ROW_HEIGHT + HEADING_GAP_AFTER;
            }
            ReportRow::DataRow {
                display_name,
                value,
                unit,
                reference_range,
                flag,
            } => {
                let fill = if flag.is_abnormal() {
                    Some(RowFill::Abnormal)
                } else if data_index % 2 == 1 {
                    Some(RowFill::Alternate)
                } else {
                    None
                };
                placed.push(PlacedRow {
                    top: cursor,
                    height: ROW_HEIGHT,
                    content: PlacedContent::Data {
                        name: text::display_label(display_name),
                        value: text::value_cell(value, flag.suffix()),
                        reference: text::reference_cell(reference_range, unit),
                        value_bold: *flag != Flag::Normal,
                        fill,
                    },
                });
                cursor += ROW_HEIGHT;
                data_index += 1;
            }
        }
    }

    let body_height = (cursor - body_top).max(TABLE_MIN_BODY_HEIGHT);
    let footer_top = (body_top + body_height + FOOTER_GAP).max(FOOTER_MIN_TOP);

    LayoutPlan {
        rows: placed,
        body_top,
        body_height,
        footer_top,
    }
}
