//! Illustrative SVG bar chart of a report's land-use types.
//!
//! Bar heights are synthetic percentages drawn at random, one per land-use
//! type found around the location. They are not measurements.

use rand::Rng;
use urban_growth_models::Report;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 400;
const MARGIN: u32 = 48;
const BAR_COLOR: &str = "#4c78a8";

/// Range of the synthetic share drawn for each land-use type.
const SHARE_RANGE: std::ops::RangeInclusive<f64> = 10.0..=60.0;

/// Draws one synthetic percentage per land-use type in `report`.
pub fn synthetic_shares<R: Rng + ?Sized>(report: &Report, rng: &mut R) -> Vec<(String, f64)> {
    report
        .urban_area
        .feature_types
        .iter()
        .map(|t| (t.clone(), (rng.gen_range(SHARE_RANGE) * 10.0).round() / 10.0))
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn push_line(svg: &mut String, line: &str) {
    svg.push_str(line);
    svg.push('\n');
}

/// Renders `bars` (label, percentage) as a standalone SVG document.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn render_svg(title: &str, bars: &[(String, f64)]) -> String {
    let plot_width = f64::from(WIDTH - 2 * MARGIN);
    let plot_height = f64::from(HEIGHT - 2 * MARGIN);
    let baseline = f64::from(HEIGHT - MARGIN);
    let mid_x = WIDTH / 2;

    let mut svg = String::new();
    push_line(
        &mut svg,
        &format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        ),
    );
    push_line(&mut svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    push_line(
        &mut svg,
        &format!(
            r#"<text x="{mid_x}" y="{}" font-family="sans-serif" font-size="16" text-anchor="middle">{}</text>"#,
            MARGIN / 2,
            escape(title)
        ),
    );
    push_line(
        &mut svg,
        &format!(
            r#"<line x1="{MARGIN}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="black"/>"#,
            WIDTH - MARGIN
        ),
    );

    if bars.is_empty() {
        push_line(
            &mut svg,
            &format!(
                r#"<text x="{mid_x}" y="{}" font-family="sans-serif" font-size="14" text-anchor="middle">No land-use features found</text>"#,
                HEIGHT / 2
            ),
        );
    }

    let slot = plot_width / bars.len().max(1) as f64;
    for (i, (label, value)) in bars.iter().enumerate() {
        let height = plot_height * value.clamp(0.0, 100.0) / 100.0;
        let x = f64::from(MARGIN) + slot * i as f64 + slot * 0.15;
        let y = baseline - height;
        let bar_width = slot * 0.7;
        let center = x + bar_width / 2.0;

        push_line(
            &mut svg,
            &format!(
                r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{BAR_COLOR}"/>"#
            ),
        );
        push_line(
            &mut svg,
            &format!(
                r#"<text x="{center:.1}" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle">{value:.1}%</text>"#,
                y - 4.0
            ),
        );
        push_line(
            &mut svg,
            &format!(
                r#"<text x="{center:.1}" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle">{}</text>"#,
                baseline + 16.0,
                escape(label)
            ),
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use urban_growth_models::{PostalCode, UrbanAreaSummary};

    use super::*;

    fn report_with(types: &[&str]) -> Report {
        let mut urban_area = UrbanAreaSummary::default();
        urban_area.feature_count = types.len() as u64;
        urban_area.feature_types = types.iter().map(ToString::to_string).collect();
        Report {
            postal_code: PostalCode::new("500055").unwrap(),
            location: None,
            urban_area,
            urban_growth: None,
        }
    }

    #[test]
    fn one_share_per_land_use_type() {
        let report = report_with(&["residential", "industrial"]);
        let shares = synthetic_shares(&report, &mut StdRng::seed_from_u64(3));
        let labels: Vec<&str> = shares.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["industrial", "residential"]);
        assert!(shares.iter().all(|(_, v)| SHARE_RANGE.contains(v)));
    }

    #[test]
    fn renders_a_bar_per_entry() {
        let svg = render_svg(
            "Land use <500055>",
            &[("residential".to_string(), 40.0), ("commercial".to_string(), 20.0)],
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(BAR_COLOR).count(), 2);
        assert!(svg.contains("Land use &lt;500055&gt;"));
        assert!(svg.contains(">residential</text>"));
    }

    #[test]
    fn writes_one_element_per_line() {
        let svg = render_svg(
            "Land use",
            &[("residential".to_string(), 40.0), ("commercial".to_string(), 20.0)],
        );
        let lines: Vec<&str> = svg.lines().collect();
        assert_eq!(lines.len(), 4 + 3 * 2 + 1);
        assert!(lines.iter().all(|line| line.starts_with('<') && line.ends_with('>')));
    }

    #[test]
    fn renders_placeholder_without_features() {
        let svg = render_svg("Land use", &[]);
        assert!(svg.contains("No land-use features found"));
        assert_eq!(svg.matches(BAR_COLOR).count(), 0);
    }
}
