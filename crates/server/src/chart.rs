//! Line charts rendered in memory and encoded as PNG.
//!
//! Drawn with plotters' bitmap backend into an RGB buffer, then encoded
//! with `image`. Text is rasterised with `ab_glyph` from a bundled DejaVu
//! Sans face, registered under the `sans-serif` family on first use.

use image::{ImageFormat, RgbImage};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::register_font;
use std::io::Cursor;
use std::sync::OnceLock;
use thiserror::Error;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

/// Line colours, cycled per series.
const PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static FONT_REGISTERED: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot")]
    NoData,

    #[error("chart drawing failed: {0}")]
    Draw(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("pixel buffer size does not match the chart dimensions")]
    BufferSize,

    #[error("bundled chart font could not be loaded")]
    Font,
}

/// Register the bundled face with plotters once per process.
fn ensure_font() -> Result<(), ChartError> {
    let ok = *FONT_REGISTERED
        .get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());
    if ok { Ok(()) } else { Err(ChartError::Font) }
}

fn draw_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// One named line, plotted against its row index.
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    pub label: &'a str,
    pub values: &'a [f64],
}

impl<'a> Series<'a> {
    pub fn new(label: &'a str, values: &'a [f64]) -> Self {
        Self { label, values }
    }
}

/// Y-axis range over all finite values, padded when flat.
fn value_range(series: &[Series<'_>]) -> Option<(f64, f64)> {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return None;
    }
    if lo == hi {
        return Some((lo - 0.5, hi + 0.5));
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

/// Render `series` as a line chart and return the PNG bytes.
pub fn render_line_chart(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[Series<'_>],
) -> Result<Vec<u8>, ChartError> {
    ensure_font()?;
    let len = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let (lo, hi) = value_range(series).ok_or(ChartError::NoData)?;
    let x_max = len.saturating_sub(1).max(1) as f64;

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT_FAMILY, 24).into_font())
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..x_max, lo..hi)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()
            .map_err(draw_err)?;

        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points = s
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(x, &v)| (x as f64, v));
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(draw_err)?
                .label(s.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    encode_png(buf)
}

fn encode_png(rgb: Vec<u8>) -> Result<Vec<u8>, ChartError> {
    let img = RgbImage::from_raw(WIDTH, HEIGHT, rgb).ok_or(ChartError::BufferSize)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_renders_png() {
        let a = [0.1, 0.4, 0.3, 0.8];
        let b = [0.2, 0.3, 0.5, 0.7];
        let png = render_line_chart(
            "close vs predictions",
            "Row",
            "Scaled value",
            &[Series::new("close", &a), Series::new("predictions", &b)],
        )
        .unwrap();
        assert_eq!(png[..8], PNG_MAGIC);
    }

    #[test]
    fn test_single_point_and_flat() {
        let png = render_line_chart("flat", "x", "y", &[Series::new("loss", &[0.5])]).unwrap();
        assert_eq!(png[..8], PNG_MAGIC);
    }

    #[test]
    fn test_empty_is_error() {
        let err = render_line_chart("t", "x", "y", &[Series::new("none", &[])]).unwrap_err();
        assert!(matches!(err, ChartError::NoData));

        let nan = [f64::NAN];
        assert!(matches!(
            render_line_chart("t", "x", "y", &[Series::new("nan", &nan)]),
            Err(ChartError::NoData)
        ));
    }

    #[test]
    fn test_caption_text_is_drawn() {
        let v = [0.2, 0.4];
        let blank = image::load_from_memory(
            &render_line_chart("", "", "", &[Series::new("", &v)]).unwrap(),
        )
        .unwrap()
        .to_rgb8();
        let titled = image::load_from_memory(
            &render_line_chart("Training loss", "", "", &[Series::new("", &v)]).unwrap(),
        )
        .unwrap()
        .to_rgb8();

        // Caption sits in the top margin, above the plotting area.
        let band = |img: &RgbImage| -> usize {
            (0..WIDTH)
                .flat_map(|x| (0..40).map(move |y| (x, y)))
                .filter(|&(x, y)| img.get_pixel(x, y).0 != [255, 255, 255])
                .count()
        };
        assert_eq!(band(&blank), 0);
        assert!(band(&titled) > 0);
    }

    #[test]
    fn test_font_registration_is_idempotent() {
        ensure_font().unwrap();
        ensure_font().unwrap();
    }

    #[test]
    fn test_value_range_padding() {
        let v = [1.0, 3.0];
        let (lo, hi) = value_range(&[Series::new("v", &v)]).unwrap();
        assert!(lo < 1.0 && hi > 3.0);
    }
}
