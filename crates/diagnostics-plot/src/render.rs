//! Before/After Chart Rendering

use crate::{PlotConfig, PlotError};
use plotters::coord::Shift;
use plotters::prelude::*;
use sensor_series::{Column, Series};
use tracing::info;

const TITLE: &str = "Sensor Data: Humidity and Temperature";

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn draw_err(err: impl std::fmt::Display) -> PlotError {
    PlotError::Render(err.to_string())
}

/// Render a 2×2 grid: box plots on the left, line plots on the right,
/// `before` in the top row and `after` in the bottom row
pub fn render(before: &Series, after: &Series, config: &PlotConfig) -> Result<(), PlotError> {
    let root = BitMapBackend::new(&config.path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let root = root.titled(TITLE, ("sans-serif", 24)).map_err(draw_err)?;

    let range = value_range(&[before, after]);
    let panels = root.split_evenly((2, 2));

    draw_boxplot(&panels[0], "Boxplot before outlier treatment", before, range)?;
    draw_lineplot(&panels[1], "Lineplot before outlier treatment", before, range)?;
    draw_boxplot(&panels[2], "Boxplot after outlier treatment", after, range)?;
    draw_lineplot(&panels[3], "Lineplot after outlier treatment", after, range)?;

    root.present().map_err(draw_err)?;
    info!("Data plot accomplished: {}", config.path.display());
    Ok(())
}

/// Common value axis over every present reading, padded by 5%
pub fn value_range(series: &[&Series]) -> (f64, f64) {
    let values = series
        .iter()
        .flat_map(|s| Column::ALL.into_iter().flat_map(move |c| s.present_values(c)));

    let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn draw_boxplot(area: &Area<'_>, caption: &str, series: &Series, range: (f64, f64)) -> Result<(), PlotError> {
    let groups: Vec<(String, Quartiles)> = Column::ALL
        .into_iter()
        .filter_map(|column| {
            let values = series.present_values(column);
            (!values.is_empty()).then(|| (column.name().to_string(), Quartiles::new(&values)))
        })
        .collect();
    if groups.is_empty() {
        return Ok(());
    }
    let labels: Vec<String> = groups.iter().map(|(label, _)| label.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d((range.0 as f32)..(range.1 as f32), labels[..].into_segmented())
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Values")
        .y_labels(labels.len())
        .light_line_style(WHITE)
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, (label, quartiles))| {
            Boxplot::new_horizontal(SegmentValue::CenterOf(label), quartiles)
                .width(24)
                .whisker_width(0.5)
                .style(Palette99::pick(i).stroke_width(2))
        }))
        .map_err(draw_err)?;

    Ok(())
}

fn draw_lineplot(area: &Area<'_>, caption: &str, series: &Series, range: (f64, f64)) -> Result<(), PlotError> {
    let x_end = series.len().max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 16))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..x_end, range.0..range.1)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Measurements")
        .draw()
        .map_err(draw_err)?;

    for (i, column) in Column::ALL.into_iter().enumerate() {
        let style = Palette99::pick(i).stroke_width(1);
        chart
            .draw_series(
                present_runs(&series.column(column))
                    .into_iter()
                    .map(move |run| PathElement::new(run, style)),
            )
            .map_err(draw_err)?
            .label(column.name())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

/// Split a column into `(index, value)` runs separated by missing readings
fn present_runs(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i as f64, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_series::Record;

    #[test]
    fn test_runs_break_on_missing() {
        let runs = present_runs(&[Some(1.0), Some(2.0), None, None, Some(3.0)]);
        assert_eq!(runs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(4.0, 3.0)]]);
        assert!(present_runs(&[None]).is_empty());
    }

    #[test]
    fn test_value_range_spans_both_series() {
        let before = Series::new(vec![Record::new(None, Some(0.0), Some(100.0))]);
        let after = Series::new(vec![Record::new(None, Some(10.0), None)]);

        let (lo, hi) = value_range(&[&before, &after]);

        assert!((lo - -5.0).abs() < 1e-12);
        assert!((hi - 105.0).abs() < 1e-12);
    }

    #[test]
    fn test_render_writes_png() {
        let dir = std::env::temp_dir().join(format!("diagnostics-plot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = PlotConfig {
            path: dir.join("plot.png"),
            width: 640,
            height: 360,
            show: false,
        };
        let before = Series::new(vec![
            Record::new(None, Some(20.0), Some(40.0)),
            Record::new(None, Some(35.0), None),
            Record::new(None, None, Some(42.0)),
            Record::new(None, Some(21.0), Some(41.0)),
        ]);
        let after = Series::new(vec![
            Record::new(None, Some(20.0), Some(40.0)),
            Record::new(None, Some(21.0), Some(41.0)),
        ]);

        match render(&before, &after, &config) {
            Ok(()) => {
                let bytes = std::fs::read(&config.path).unwrap();
                assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
            }
            // Hosts without any installed font cannot draw captions
            Err(PlotError::Render(msg)) if msg.to_lowercase().contains("font") => {}
            Err(e) => panic!("render failed: {e}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_value_range_degenerate() {
        assert_eq!(value_range(&[&Series::default()]), (0.0, 1.0));
        let flat = Series::new(vec![Record::new(None, Some(5.0), Some(5.0))]);
        assert_eq!(value_range(&[&flat]), (4.0, 6.0));
    }
}
