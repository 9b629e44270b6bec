//! Bar chart layout for grade averages.
//!
//! [`BarChart::from_aggregates`] is a pure function of the aggregate list.
//! The layout is in abstract chart units with the origin at the bottom-left
//! of the plot area; the SVG and PDF renderers only scale it.

use maud::{html, Markup};
use registro::GradeAggregate;

pub const WIDTH: f64 = 800.0;
pub const HEIGHT: f64 = 320.0;
pub const MARGIN_LEFT: f64 = 48.0;
pub const MARGIN_RIGHT: f64 = 12.0;
pub const MARGIN_TOP: f64 = 12.0;
pub const MARGIN_BOTTOM: f64 = 48.0;

/// Share of each slot taken by the bar; the rest is gap.
const BAR_FILL: f64 = 0.7;

/// Longest label drawn under a bar before it is shortened.
const LABEL_CHARS: usize = 14;

pub const BAR_COLOR: (u8, u8, u8) = (75, 192, 192);

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Left edge, from the plot origin.
    pub x: f64,
    pub width: f64,
    /// Height above the baseline; never negative.
    pub height: f64,
}

impl Bar {
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Label shortened to fit under the bar.
    pub fn short_label(&self) -> String {
        if self.label.chars().count() <= LABEL_CHARS {
            self.label.clone()
        } else {
            let head: String = self.label.chars().take(LABEL_CHARS - 1).collect();
            format!("{}…", head)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub bars: Vec<Bar>,
    /// Value at the top of the y axis.
    pub y_max: f64,
    /// Y axis tick values, from 0 up to `y_max`.
    pub ticks: Vec<f64>,
}

pub fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

pub fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

impl BarChart {
    pub fn from_aggregates(aggregates: &[GradeAggregate]) -> Self {
        let top = aggregates
            .iter()
            .map(|a| a.average_grade)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let y_max = top.ceil().max(1.0);
        let step = if y_max <= 10.0 { 1.0 } else { (y_max / 5.0).ceil() };

        let mut ticks = Vec::new();
        let mut tick = 0.0;
        while tick <= y_max {
            ticks.push(tick);
            tick += step;
        }

        let slot = if aggregates.is_empty() {
            0.0
        } else {
            plot_width() / aggregates.len() as f64
        };
        let width = slot * BAR_FILL;

        let bars = aggregates
            .iter()
            .enumerate()
            .map(|(i, aggregate)| {
                let value = aggregate.average_grade;
                let height = if value.is_finite() && value > 0.0 {
                    value / y_max * plot_height()
                } else {
                    0.0
                };
                Bar {
                    label: aggregate.entity.clone(),
                    value,
                    x: slot * i as f64 + (slot - width) / 2.0,
                    width,
                    height,
                }
            })
            .collect();

        Self { bars, y_max, ticks }
    }

    /// Height of a tick value above the baseline.
    pub fn tick_height(&self, tick: f64) -> f64 {
        tick / self.y_max * plot_height()
    }

    pub fn to_svg(&self) -> Markup {
        let (r, g, b) = BAR_COLOR;
        let fill = format!("rgba({}, {}, {}, 0.6)", r, g, b);
        let stroke = format!("rgb({}, {}, {})", r, g, b);
        let baseline = MARGIN_TOP + plot_height();

        html! {
            svg.chart xmlns="http://www.w3.org/2000/svg"
                viewBox={"0 0 " (WIDTH) " " (HEIGHT)}
                role="img" aria-label="Average Grade" {
                @for tick in &self.ticks {
                    @let y = baseline - self.tick_height(*tick);
                    line.grid x1=(MARGIN_LEFT) x2=(WIDTH - MARGIN_RIGHT) y1=(y) y2=(y) {}
                    text.tick x=(MARGIN_LEFT - 6.0) y=(y + 4.0) text-anchor="end" { (tick) }
                }
                line.axis x1=(MARGIN_LEFT) x2=(MARGIN_LEFT) y1=(MARGIN_TOP) y2=(baseline) {}
                line.axis x1=(MARGIN_LEFT) x2=(WIDTH - MARGIN_RIGHT) y1=(baseline) y2=(baseline) {}
                @for bar in &self.bars {
                    rect.bar
                        x=(MARGIN_LEFT + bar.x)
                        y=(baseline - bar.height)
                        width=(bar.width)
                        height=(bar.height)
                        fill=(fill)
                        stroke=(stroke) {
                        title { (bar.label) ": " (format!("{:.2}", bar.value)) }
                    }
                    text.label x=(MARGIN_LEFT + bar.center()) y=(baseline + 18.0) text-anchor="middle" {
                        (bar.short_label())
                    }
                }
            }
        }
    }
}
