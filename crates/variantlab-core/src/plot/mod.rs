//! Box-plot rendering to PNG.
//!
//! The chart follows the usual Tukey layout: a box from Q1 to Q3 with a
//! median line, whiskers out to the most extreme points within 1.5·IQR of the
//! box, and diamond markers for everything beyond.

mod canvas;
mod font;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub use canvas::{Canvas, Rgb};

use crate::error::{AnalysisError, Result};
use crate::outliers::DEFAULT_FENCE;
use crate::table::{Table, Value};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

const MARGIN_LEFT: i64 = 120;
const MARGIN_RIGHT: i64 = 30;
const MARGIN_TOP: i64 = 60;
const MARGIN_BOTTOM: i64 = 80;

const PALETTE: [Rgb; 4] = [
    Rgb(76, 114, 176),
    Rgb(221, 132, 82),
    Rgb(85, 168, 104),
    Rgb(196, 78, 82),
];

/// Five-number summary plus outliers for one box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when there is nothing to draw. Non-finite values have no
    /// position on the axis and are left out.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let q = variantlab_stats::quartiles(&finite)?;
        let (lower, upper) = q.fences(DEFAULT_FENCE);
        let mut whisker_low = f64::INFINITY;
        let mut whisker_high = f64::NEG_INFINITY;
        let mut fliers = Vec::new();
        for &v in &finite {
            if (lower..=upper).contains(&v) {
                whisker_low = whisker_low.min(v);
                whisker_high = whisker_high.max(v);
            } else {
                fliers.push(v);
            }
        }
        fliers.sort_by(f64::total_cmp);
        Some(Self {
            q1: q.q1,
            median: q.median,
            q3: q.q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
}

/// A categorical box plot: one box per group, left to right.
#[derive(Debug, Clone)]
pub struct BoxPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub groups: Vec<BoxGroup>,
}

/// Box plot of `value_column` for variant 0 ("Control") and 1 ("Treatment").
/// Rows with a null variant or value are left out.
pub fn variant_box_plot(table: &Table, group_column: &str, value_column: &str) -> Result<BoxPlot> {
    let control = table.values_where(group_column, &Value::Int(0), value_column)?;
    let treatment = table.values_where(group_column, &Value::Int(1), value_column)?;
    Ok(BoxPlot {
        title: "Box Plot of Active Minutes by Group".to_string(),
        x_label: "Experiment Group".to_string(),
        y_label: "Active Minutes".to_string(),
        groups: vec![
            BoxGroup {
                label: "Control".to_string(),
                values: control,
            },
            BoxGroup {
                label: "Treatment".to_string(),
                values: treatment,
            },
        ],
    })
}

impl BoxPlot {
    /// Value range shown on the y axis, padded by 5%.
    fn y_range(&self) -> (f64, f64) {
        let all = self.groups.iter().flat_map(|g| g.values.iter().copied());
        let (lo, hi) = all
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            return (0.0, 1.0);
        }
        if lo == hi {
            return (lo - 1.0, hi + 1.0);
        }
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }

    pub fn render(&self) -> Canvas {
        let mut c = Canvas::new(WIDTH, HEIGHT, Rgb::WHITE);
        let (x0, x1) = (MARGIN_LEFT, WIDTH as i64 - MARGIN_RIGHT);
        let (y0, y1) = (MARGIN_TOP, HEIGHT as i64 - MARGIN_BOTTOM);
        let (lo, hi) = self.y_range();
        // clamped to the plot area; NaN lands on the bottom edge
        let to_px = |v: f64| -> i64 {
            let frac = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
            if frac.is_nan() {
                return y1;
            }
            y1 - (frac * (y1 - y0) as f64).round() as i64
        };

        // grid and y ticks
        let ticks = nice_ticks(lo, hi, 6);
        let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 1.0 };
        for &t in &ticks {
            let y = to_px(t);
            c.line(x0 + 1, y, x1 - 1, y, Rgb::GRID);
            c.line(x0 - 5, y, x0, y, Rgb::EDGE);
            let label = tick_label(t, step);
            let w = font::text_width(&label, 2) as i64;
            c.text(x0 - 10 - w, y - Canvas::glyph_height(2) / 2, &label, 2, Rgb::BLACK);
        }
        c.stroke_rect(x0, y0, x1, y1, Rgb::EDGE);

        let n = self.groups.len().max(1) as i64;
        let slot = (x1 - x0) / n;
        let half = slot * 3 / 10;
        for (i, group) in self.groups.iter().enumerate() {
            let cx = x0 + slot * i as i64 + slot / 2;
            c.line(cx, y1, cx, y1 + 5, Rgb::EDGE);
            c.text_centered(cx, y1 + 12, &group.label, 2, Rgb::BLACK);

            let Some(stats) = BoxStats::from_values(&group.values) else {
                continue;
            };
            let color = PALETTE[i % PALETTE.len()];
            let (top, bottom) = (to_px(stats.q3), to_px(stats.q1));

            c.line(cx, to_px(stats.whisker_high), cx, top, Rgb::EDGE);
            c.line(cx, bottom, cx, to_px(stats.whisker_low), Rgb::EDGE);
            for w in [stats.whisker_high, stats.whisker_low] {
                let y = to_px(w);
                c.line(cx - half / 2, y, cx + half / 2, y, Rgb::EDGE);
            }

            c.fill_rect(cx - half, top, cx + half, bottom, color);
            c.stroke_rect(cx - half, top, cx + half, bottom, Rgb::EDGE);
            let m = to_px(stats.median);
            c.line(cx - half, m, cx + half, m, Rgb::EDGE);
            c.line(cx - half, m + 1, cx + half, m + 1, Rgb::EDGE);

            for &f in &stats.fliers {
                c.diamond(cx, to_px(f), 4, Rgb::EDGE);
            }
        }

        c.text_centered((x0 + x1) / 2, 20, &self.title, 3, Rgb::BLACK);
        c.text_centered((x0 + x1) / 2, HEIGHT as i64 - 35, &self.x_label, 2, Rgb::BLACK);
        let yl = font::text_width(&self.y_label, 2) as i64;
        c.text_vertical(20, (y0 + y1) / 2 + yl / 2, &self.y_label, 2, Rgb::BLACK);
        c
    }

    pub fn write_png(&self, path: &Path) -> Result<()> {
        write_png(&self.render(), path)?;
        log::info!(
            "rendered box plot ({}) to {}",
            self.groups
                .iter()
                .map(|g| format!("{}: n={}", g.label, g.values.len()))
                .collect::<Vec<_>>()
                .join(", "),
            path.display()
        );
        Ok(())
    }
}

/// Encode `canvas` as an 8-bit RGB PNG.
pub fn write_png(canvas: &Canvas, path: &Path) -> Result<()> {
    let plot_err = |source| AnalysisError::Plot {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| AnalysisError::io(path, e))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), canvas.width(), canvas.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(plot_err)?;
    writer.write_image_data(canvas.pixels()).map_err(plot_err)?;
    writer.finish().map_err(plot_err)
}

/// Roughly `target` evenly spaced round numbers covering `[lo, hi]`.
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if hi <= lo || target == 0 {
        return vec![lo];
    }
    let raw = (hi - lo) / target as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let step = mag
        * if norm < 1.5 {
            1.0
        } else if norm < 3.0 {
            2.0
        } else if norm < 7.0 {
            5.0
        } else {
            10.0
        };
    let first = (lo / step).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn tick_label(t: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    };
    format!("{t:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_stats_whiskers_and_fliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let b = BoxStats::from_values(&values).unwrap();
        assert_eq!(b.q1, 3.0);
        assert_eq!(b.median, 5.0);
        assert_eq!(b.q3, 7.0);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 8.0);
        assert_eq!(b.fliers, vec![100.0]);
    }

    #[test]
    fn test_box_stats_skip_non_finite() {
        let with_inf =
            BoxStats::from_values(&[1.0, 2.0, 3.0, f64::NEG_INFINITY, f64::INFINITY]);
        assert_eq!(with_inf, BoxStats::from_values(&[1.0, 2.0, 3.0]));
        assert!(BoxStats::from_values(&[f64::INFINITY, f64::NAN]).is_none());
    }

    #[test]
    fn test_render_with_infinite_values() {
        let plot = BoxPlot {
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            groups: vec![
                BoxGroup {
                    label: "Control".into(),
                    values: vec![1.0, 2.0, 3.0, f64::NEG_INFINITY],
                },
                BoxGroup {
                    label: "Treatment".into(),
                    values: vec![f64::INFINITY],
                },
            ],
        };
        let c = plot.render();
        assert_eq!((c.width(), c.height()), (WIDTH, HEIGHT));
        assert!(c.pixels().chunks(3).any(|p| p == [PALETTE[0].0, PALETTE[0].1, PALETTE[0].2]));
    }

    #[test]
    fn test_title_and_labels_stay_in_margins() {
        let plot = variant_box_plot(
            &Table::from_rows(
                "merged",
                &["active_mins", "variant_number"],
                vec![
                    vec![Value::Float(1.0), Value::Int(0)],
                    vec![Value::Float(4.0), Value::Int(0)],
                    vec![Value::Float(2.0), Value::Int(1)],
                    vec![Value::Float(6.0), Value::Int(1)],
                ],
            )
            .unwrap(),
            "variant_number",
            "active_mins",
        )
        .unwrap();
        let c = plot.render();
        let black_in = |xs: std::ops::Range<i64>, ys: std::ops::Range<i64>| {
            ys.clone()
                .any(|y| xs.clone().any(|x| c.get(x, y) == Some(Rgb::BLACK)))
        };
        // title in the top margin, centred over the plot area
        let mid = (MARGIN_LEFT + WIDTH as i64 - MARGIN_RIGHT) / 2;
        assert!(black_in(mid - 50..mid + 50, 20..20 + Canvas::glyph_height(3)));
        // x label below the tick labels, y label in the left gutter
        assert!(black_in(0..WIDTH as i64, HEIGHT as i64 - 35..HEIGHT as i64 - 20));
        let plot_rows = MARGIN_TOP..HEIGHT as i64 - MARGIN_BOTTOM;
        assert!(black_in(20..20 + Canvas::glyph_height(2), plot_rows));
        // nothing but the frame and grid inside the plot area above the boxes
        let inner = MARGIN_LEFT + 1..WIDTH as i64 - MARGIN_RIGHT - 1;
        assert!(!black_in(inner, MARGIN_TOP + 1..MARGIN_TOP + 10));
    }

    #[test]
    fn test_box_stats_empty() {
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let t = nice_ticks(-0.3, 1.2, 6);
        assert_eq!(t.first().copied(), Some(-0.2));
        assert!(t.iter().all(|&v| (-0.3..=1.2 + 1e-9).contains(&v)));
        assert!(t.contains(&0.0));
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(20.0, 10.0), "20");
        assert_eq!(tick_label(0.25, 0.05), "0.25");
        assert_eq!(tick_label(1.5, 0.5), "1.5");
    }

    #[test]
    fn test_variant_box_plot_groups() {
        let t = Table::from_rows(
            "merged",
            &["active_mins", "variant_number"],
            vec![
                vec![Value::Float(1.0), Value::Int(0)],
                vec![Value::Float(2.0), Value::Int(1)],
                vec![Value::Float(3.0), Value::Null],
                vec![Value::Null, Value::Int(1)],
            ],
        )
        .unwrap();
        let plot = variant_box_plot(&t, "variant_number", "active_mins").unwrap();
        assert_eq!(plot.groups[0].label, "Control");
        assert_eq!(plot.groups[0].values, vec![1.0]);
        assert_eq!(plot.groups[1].label, "Treatment");
        assert_eq!(plot.groups[1].values, vec![2.0]);
    }

    #[test]
    fn test_render_draws_boxes_in_palette() {
        let plot = BoxPlot {
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            groups: vec![
                BoxGroup {
                    label: "Control".into(),
                    values: vec![1.0, 2.0, 3.0, 4.0, 5.0],
                },
                BoxGroup {
                    label: "Treatment".into(),
                    values: vec![],
                },
            ],
        };
        let c = plot.render();
        assert_eq!((c.width(), c.height()), (WIDTH, HEIGHT));
        let has = |color: Rgb| c.pixels().chunks(3).any(|p| p == [color.0, color.1, color.2]);
        assert!(has(PALETTE[0]));
        assert!(!has(PALETTE[1]));
    }

    #[test]
    fn test_write_png_roundtrip_dimensions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("box_plot.png");
        let plot = BoxPlot {
            title: "Box Plot".into(),
            x_label: "Group".into(),
            y_label: "Minutes".into(),
            groups: vec![BoxGroup {
                label: "A".into(),
                values: vec![1.0, 5.0, 9.0],
            }],
        };
        plot.write_png(&path).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (WIDTH, HEIGHT));
        assert_eq!(info.color_type, png::ColorType::Rgb);
    }
}
