// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Error};
use plotters::{coord::Shift, drawing::DrawingAreaErrorKind, prelude::*};
use tracing::info;

use crate::{catalog::ChartStyle, report::QueryReport};

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0xAA0000),
    hexcolour!(0x0000FF),
    hexcolour!(0x117733),
    hexcolour!(0xDDCC77),
    hexcolour!(0x332288),
    hexcolour!(0x888888),
    hexcolour!(0x882255),
    hexcolour!(0x44AA99),
];

const FONT: &str = "sans-serif";

/// Renders every report into its own PNG inside `out_dir`, one after another.
pub fn render_all(
    reports: &[QueryReport],
    style: &ChartStyle,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, Error> {
    if !out_dir.is_dir() {
        bail!("output dir does not exist: {}", out_dir.display());
    }
    reports
        .iter()
        .map(|report| render_png(report, style, out_dir))
        .collect()
}

pub fn render_png(
    report: &QueryReport,
    style: &ChartStyle,
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    let path = out_dir.join(&report.file_name);
    let root = BitMapBackend::new(&path, (style.width, style.height)).into_drawing_area();
    draw_chart(&root, report, style)
        .map_err(|err| anyhow!("render chart {}: {err}", path.display()))?;
    drop(root);
    info!(query = %report.query, path = %path.display(), "wrote chart");
    Ok(path)
}

/// Draws one line per technology with request rate on x and latency on y.
pub fn draw_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    report: &QueryReport,
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&report.query, (FONT, 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(rate_axis(report), latency_axis(report))?;

    chart
        .configure_mesh()
        .x_desc(&style.x_label)
        .y_desc(&style.y_label)
        .axis_desc_style((FONT, 20))
        .label_style((FONT, 15))
        .draw()?;

    for (series, colour) in report.series.iter().zip(COLOURS.iter().cycle()) {
        let colour = *colour;
        let points = series.points.iter().map(|point| (point.rate, point.seconds));
        chart
            .draw_series(LineSeries::new(points, colour.stroke_width(2)))?
            .label(series.technology.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.filled())
        .border_style(&BLACK)
        .label_font((FONT, 15))
        .draw()?;

    root.present()
}

fn rate_axis(report: &QueryReport) -> Range<u64> {
    match report.rate_range() {
        Some((min, max)) if min < max => min..max,
        Some((rate, _)) => rate.saturating_sub(1)..rate.saturating_add(1),
        None => 0..1,
    }
}

/// Starts at zero, or lower for negative values, and leaves headroom above the slowest measurement.
///
/// The top is never below zero.
fn latency_axis(report: &QueryReport) -> Range<f64> {
    let lowest = report
        .series
        .iter()
        .flat_map(|series| &series.points)
        .map(|point| point.seconds)
        .filter(|seconds| seconds.is_finite())
        .fold(0., f64::min);
    match report.max_seconds() {
        Some(max) if max.is_finite() && max > 0. => lowest..max * 1.1,
        Some(max) if max.is_finite() && max > lowest => lowest..-lowest * 0.1,
        _ => lowest..lowest + 1.,
    }
}
