//! PNG chart rendering with plotters.

use crate::error::{EdaError, Result};
use crate::types::{AnalysisSummary, Histogram};
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const VOTER_TURNOUT_CHART: &str = "voter_turnout_distribution.png";
pub const WINNING_PARTIES_CHART: &str = "winning_parties.png";
pub const TOP_STATES_CHART: &str = "top_states_voter_turnout.png";
pub const GENDER_CHART: &str = "gender_representation.png";
pub const WINNING_MARGIN_CHART: &str = "winning_margin_distribution.png";

/// Diverging blue-to-red palette for the party bars.
const COOLWARM: [RGBColor; 10] = [
    RGBColor(59, 76, 192),
    RGBColor(88, 118, 226),
    RGBColor(121, 156, 249),
    RGBColor(155, 188, 255),
    RGBColor(189, 210, 246),
    RGBColor(221, 221, 221),
    RGBColor(242, 201, 180),
    RGBColor(246, 167, 137),
    RGBColor(229, 124, 96),
    RGBColor(180, 4, 38),
];

/// Sequential purple-to-yellow palette for the state bars.
const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

const PIE_COLORS: [RGBColor; 3] = [
    RGBColor(173, 216, 230),
    RGBColor(255, 192, 203),
    RGBColor(211, 211, 211),
];

const HISTOGRAM_BLUE: RGBColor = RGBColor(0, 0, 255);
const HISTOGRAM_GREEN: RGBColor = RGBColor(0, 128, 0);

const PLACEHOLDER_GREY: RGBColor = RGBColor(128, 128, 128);

const FONT: &str = "sans-serif";
const BAR_LABEL_SIZE: u32 = 12;
/// Rough advance of one character at `BAR_LABEL_SIZE`.
const APPROX_CHAR_WIDTH: u32 = 7;

/// Draws the five summary charts into a directory.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Render the five charts into `dir`.
    ///
    /// Returns the paths written, always one per chart name in
    /// [`CHART_FILES`](crate::reporting::CHART_FILES) order. A chart without
    /// data is written as a "No data" placeholder so no file from an earlier
    /// run is left behind. Existing files are overwritten.
    pub fn render_all(&self, summary: &AnalysisSummary, dir: &Path) -> Result<Vec<PathBuf>> {
        info!("Rendering charts into {}", dir.display());
        std::fs::create_dir_all(dir)?;
        let size = (self.width, self.height);
        let mut written = Vec::new();

        let path = dir.join(VOTER_TURNOUT_CHART);
        let title = "Voter Turnout Distribution";
        let drawn = match &summary.turnout_histogram {
            Some(hist) => render_histogram(
                &path,
                title,
                "Voter Turnout (%)",
                hist,
                HISTOGRAM_BLUE,
                size,
            ),
            None => {
                warn!("No finite turnout values for {}", VOTER_TURNOUT_CHART);
                render_placeholder(&path, title, size)
            }
        };
        drawn.map_err(|e| chart_error(VOTER_TURNOUT_CHART, e))?;
        written.push(path);

        let path = dir.join(WINNING_PARTIES_CHART);
        let party_size = (self.width * 6 / 5, self.height);
        let drawn = if summary.top_parties.is_empty() {
            warn!("No party counts for {}", WINNING_PARTIES_CHART);
            render_placeholder(&path, "Top Winning Parties", party_size)
        } else {
            let bars: Vec<(String, f64)> = summary
                .top_parties
                .iter()
                .map(|c| (c.label.clone(), c.count as f64))
                .collect();
            let title = format!("Top {} Winning Parties", bars.len());
            render_bar_chart(
                &path,
                &title,
                ("Party", "Number of Wins"),
                &bars,
                &COOLWARM,
                party_size,
            )
        };
        drawn.map_err(|e| chart_error(WINNING_PARTIES_CHART, e))?;
        written.push(path);

        let path = dir.join(TOP_STATES_CHART);
        let drawn = if summary.top_states.is_empty() {
            warn!("No state turnout means for {}", TOP_STATES_CHART);
            render_placeholder(&path, "Top States by Voter Turnout", size)
        } else {
            let bars: Vec<(String, f64)> = summary
                .top_states
                .iter()
                .map(|s| (s.state.clone(), s.mean_turnout))
                .collect();
            let title = format!("Top {} States by Voter Turnout", bars.len());
            render_bar_chart(
                &path,
                &title,
                ("State", "Average Voter Turnout (%)"),
                &bars,
                &VIRIDIS,
                size,
            )
        };
        drawn.map_err(|e| chart_error(TOP_STATES_CHART, e))?;
        written.push(path);

        let path = dir.join(GENDER_CHART);
        let title = "Gender Representation of Candidates";
        let drawn = if summary.gender.is_empty() {
            warn!("No candidate sex counts for {}", GENDER_CHART);
            render_placeholder(&path, title, (self.height, self.height))
        } else {
            let slices: Vec<(String, f64)> = summary
                .gender
                .iter()
                .map(|c| (c.label.clone(), c.count as f64))
                .collect();
            render_pie_chart(&path, title, &slices, &PIE_COLORS, self.height)
        };
        drawn.map_err(|e| chart_error(GENDER_CHART, e))?;
        written.push(path);

        let path = dir.join(WINNING_MARGIN_CHART);
        let title = "Winning Margin Distribution";
        let drawn = match &summary.margin_histogram {
            Some(hist) => render_histogram(
                &path,
                title,
                "Winning Margin (Votes)",
                hist,
                HISTOGRAM_GREEN,
                size,
            ),
            None => {
                warn!("No winning margins for {}", WINNING_MARGIN_CHART);
                render_placeholder(&path, title, size)
            }
        };
        drawn.map_err(|e| chart_error(WINNING_MARGIN_CHART, e))?;
        written.push(path);

        info!("Rendered {} charts", written.len());
        Ok(written)
    }
}

fn chart_error(chart: &str, e: anyhow::Error) -> EdaError {
    EdaError::ChartRenderFailed {
        chart: chart.to_string(),
        reason: format!("{:#}", e),
    }
}

/// Whether text can be drawn with the chart font.
///
/// Every chart with data draws a caption, so rendering fails without it.
pub fn font_available() -> bool {
    let mut buffer = vec![0u8; 32 * 32 * 3];
    let root = BitMapBackend::with_buffer(&mut buffer, (32, 32)).into_drawing_area();
    root.draw_text("a", &TextStyle::from((FONT, 12)), (0, 0)).is_ok()
}

/// Blank chart carrying only the title and a "No data" note.
///
/// The image is written even when the font cannot be loaded, in which case
/// it is left without text.
pub fn render_placeholder(path: &Path, title: &str, size: (u32, u32)) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (w, h) = root.dim_in_pixel();
    let centered = Pos::new(HPos::Center, VPos::Center);
    let title_style = TextStyle::from((FONT, 30)).pos(centered);
    let note_style = TextStyle::from((FONT, 20)).color(&PLACEHOLDER_GREY).pos(centered);

    let drawn = root
        .draw_text(title, &title_style, (w as i32 / 2, 30))
        .and_then(|_| root.draw_text("No data", &note_style, (w as i32 / 2, h as i32 / 2)));
    if let Err(e) = drawn {
        warn!("Placeholder text not drawn for {}: {}", path.display(), e);
    }

    root.present()?;
    debug!("Placeholder saved to {}", path.display());
    Ok(())
}

/// Histogram bars with the density curve drawn over them.
pub fn render_histogram(
    path: &Path,
    title: &str,
    x_desc: &str,
    hist: &Histogram,
    color: RGBColor,
    size: (u32, u32),
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let tallest_bar = hist.counts.iter().copied().max().unwrap_or(0) as f64;
    let tallest_curve = hist.density.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_max = (tallest_bar.max(tallest_curve) * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(hist.min..hist.max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = hist.bin_start(i);
        Rectangle::new(
            [(x0, 0.0), (x0 + hist.bin_width, count as f64)],
            color.mix(0.5).filled(),
        )
    }))?;

    if !hist.density.is_empty() {
        chart.draw_series(LineSeries::new(
            hist.density.iter().copied(),
            color.stroke_width(2),
        ))?;
    }

    root.present()?;
    debug!("Histogram saved to {}", path.display());
    Ok(())
}

/// Vertical bars, one per labelled value, coloured from `palette` in order.
pub fn render_bar_chart(
    path: &Path,
    title: &str,
    (x_desc, y_desc): (&str, &str),
    bars: &[(String, f64)],
    palette: &[RGBColor],
    size: (u32, u32),
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let n = bars.len().max(1);
    let y_max = (bars.iter().map(|(_, v)| *v).fold(0.0, f64::max) * 1.1).max(1.0);
    let labels: Vec<String> = bars.iter().map(|(label, _)| label.clone()).collect();

    let rotated = rotated_label_area(&labels, size);
    let label_font = match rotated {
        Some(_) => (FONT, BAR_LABEL_SIZE)
            .into_font()
            .transform(FontTransform::Rotate90),
        None => (FONT, BAR_LABEL_SIZE).into_font(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 30))
        .margin(10)
        .x_label_area_size(rotated.unwrap_or(60))
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_style(label_font)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    let colors = palette.to_vec();
    chart.draw_series(
        plotters::series::Histogram::vertical(&chart)
            .margin(10)
            .style_func(move |x: &SegmentValue<usize>, _| {
                let i = match x {
                    SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
                    SegmentValue::Last => 0,
                };
                colors[i % colors.len()].filled()
            })
            .data(bars.iter().enumerate().map(|(i, (_, v))| (i, *v))),
    )?;

    root.present()?;
    debug!("Bar chart saved to {}", path.display());
    Ok(())
}

/// Label area height for vertical bar labels, or `None` when every label
/// fits across its bar.
fn rotated_label_area(labels: &[String], (width, height): (u32, u32)) -> Option<u32> {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let slot = width / (labels.len().max(1) as u32);
    let text_width = longest * APPROX_CHAR_WIDTH;
    if text_width + 10 <= slot {
        return None;
    }
    Some((text_width + 40).clamp(60, (height / 3).max(60)))
}

/// Pie chart with percentage labels, starting at 90 degrees.
pub fn render_pie_chart(
    path: &Path,
    title: &str,
    slices: &[(String, f64)],
    palette: &[RGBColor],
    side: u32,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (side, side)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, (FONT, 30))?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let sizes: Vec<f64> = slices.iter().map(|(_, v)| *v).collect();
    let labels: Vec<String> = slices.iter().map(|(label, _)| label.clone()).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| palette[i % palette.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style((FONT, 20).into_font().color(&BLACK));
    pie.percentages((FONT, 16).into_font().color(&BLACK));
    area.draw(&pie)?;

    root.present()?;
    debug!("Pie chart saved to {}", path.display());
    Ok(())
}
