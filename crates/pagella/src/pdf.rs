//! PDF export of an average-grade report.
//!
//! A4 portrait: the bar chart at the top, then an `Average Grades` heading
//! and one `entity: value` line per aggregate. Positions are measured from
//! the top of the page in millimetres and converted to PDF coordinates.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use registro::GradeAggregate;
use thiserror::Error;
use tracing::debug;

use crate::chart::{self, BarChart};
use crate::report;

/// Filename offered for the download.
pub const REPORT_FILENAME: &str = "average_grades.pdf";

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;

const MARGIN: f64 = 10.0;
const CHART_WIDTH: f64 = 190.0;
const CHART_HEIGHT: f64 = 80.0;
const HEADING_TOP: f64 = 100.0;
const FIRST_LINE_TOP: f64 = 110.0;
const CONTINUED_LINE_TOP: f64 = 20.0;
const LINE_STEP: f64 = 10.0;
const BOTTOM_LIMIT: f64 = 15.0;

const TEXT_SIZE: f32 = 12.0;
const HEADING_SIZE: f32 = 16.0;
const AXIS_TEXT_SIZE: f32 = 7.0;

const PT_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no results to export")]
    Empty,

    #[error("failed to assemble PDF: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// Render the report to PDF bytes.
pub fn render_report(aggregates: &[GradeAggregate]) -> Result<Vec<u8>, ExportError> {
    if aggregates.is_empty() {
        return Err(ExportError::Empty);
    }

    let (doc, page, layer) = PdfDocument::new(
        "Average Grades",
        Mm(PAGE_WIDTH as f32),
        Mm(PAGE_HEIGHT as f32),
        "Report",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut layer = doc.get_page(page).get_layer(layer);

    draw_chart(&layer, &font, &BarChart::from_aggregates(aggregates));
    layer.use_text("Average Grades", HEADING_SIZE, mm(MARGIN), from_top(HEADING_TOP), &bold);

    let lines = report::listing(aggregates);
    let positions = line_positions(lines.len());
    let mut current_page = 0;
    for (line, (page, top)) in lines.iter().zip(&positions) {
        while current_page < *page {
            layer = new_page(&doc);
            current_page += 1;
        }
        layer.use_text(line.as_str(), TEXT_SIZE, mm(MARGIN), from_top(*top), &font);
    }

    debug!(lines = lines.len(), pages = current_page + 1, "PDF report assembled");
    Ok(doc.save_to_bytes()?)
}

/// Page index and distance from the top of the page for each listing line.
fn line_positions(count: usize) -> Vec<(usize, f64)> {
    let mut positions = Vec::with_capacity(count);
    let mut page = 0;
    let mut top = FIRST_LINE_TOP;
    for _ in 0..count {
        if PAGE_HEIGHT - top < BOTTOM_LIMIT {
            page += 1;
            top = CONTINUED_LINE_TOP;
        }
        positions.push((page, top));
        top += LINE_STEP;
    }
    positions
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Report");
    doc.get_page(page).get_layer(layer)
}

fn mm(value: f64) -> Mm {
    Mm(value as f32)
}

fn from_top(top: f64) -> Mm {
    mm(PAGE_HEIGHT - top)
}

fn point(x: f64, y: f64) -> (Point, bool) {
    (Point::new(mm(x), mm(y)), false)
}

fn stroke(layer: &PdfLayerReference, from: (f64, f64), to: (f64, f64)) {
    layer.add_line(Line {
        points: vec![point(from.0, from.1), point(to.0, to.1)],
        is_closed: false,
    });
}

/// Draw the chart into the box at the top of the page.
///
/// Bars are vertical strokes as wide as the bar, so each one paints a
/// filled rectangle.
fn draw_chart(layer: &PdfLayerReference, font: &IndirectFontRef, chart: &BarChart) {
    let sx = CHART_WIDTH / chart::WIDTH;
    let sy = CHART_HEIGHT / chart::HEIGHT;
    let left = MARGIN + chart::MARGIN_LEFT * sx;
    let right = MARGIN + (chart::WIDTH - chart::MARGIN_RIGHT) * sx;
    let baseline = PAGE_HEIGHT - MARGIN - CHART_HEIGHT + chart::MARGIN_BOTTOM * sy;
    let top = baseline + chart::plot_height() * sy;

    let grey = Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None));
    let black = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));

    layer.set_outline_color(grey);
    layer.set_outline_thickness(0.3);
    for tick in &chart.ticks {
        let y = baseline + chart.tick_height(*tick) * sy;
        stroke(layer, (left, y), (right, y));
        layer.set_fill_color(black.clone());
        layer.use_text(tick.to_string(), AXIS_TEXT_SIZE, mm(MARGIN), mm(y - 1.0), font);
    }

    layer.set_outline_color(black.clone());
    layer.set_outline_thickness(0.6);
    stroke(layer, (left, baseline), (left, top));
    stroke(layer, (left, baseline), (right, baseline));

    let (r, g, b) = chart::BAR_COLOR;
    let teal = Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ));

    for bar in &chart.bars {
        let x = left + bar.center() * sx;
        if bar.height > 0.0 {
            layer.set_outline_color(teal.clone());
            layer.set_outline_thickness((bar.width * sx * PT_PER_MM) as f32);
            stroke(layer, (x, baseline), (x, baseline + bar.height * sy));
        }
        layer.set_fill_color(black.clone());
        let label = bar.short_label();
        // Rough centring: Helvetica averages about half the font size per glyph.
        let half_width = label.chars().count() as f64 * f64::from(AXIS_TEXT_SIZE) * 0.25 / PT_PER_MM;
        layer.use_text(label, AXIS_TEXT_SIZE, mm(x - half_width), mm(baseline - 5.0), font);
    }
}
