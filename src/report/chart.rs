//! Normal/Threat count chart

use std::fmt;

use serde::Serialize;

use crate::detection::{Detection, Label};

const WIDTH: u32 = 480;
const HEIGHT: u32 = 320;
const MARGIN: u32 = 48;
const BAR_COLORS: [&str; 2] = ["#4c72b0", "#dd8452"];

/// Categorical count chart with fixed `Normal` / `Threat` ticks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountChart {
    pub title: String,
    pub categories: [&'static str; 2],
    pub counts: [usize; 2],
}

impl CountChart {
    pub fn from_detection(title: impl Into<String>, detection: &Detection) -> Self {
        let threats = detection.threat_count();
        Self {
            title: title.into(),
            categories: [Label::Normal.category(), Label::Threat.category()],
            counts: [detection.labels.len() - threats, threats],
        }
    }

    /// Render as a standalone SVG bar chart
    pub fn to_svg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CountChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plot_w = WIDTH - 2 * MARGIN;
        let plot_h = HEIGHT - 2 * MARGIN;
        let base_y = HEIGHT - MARGIN;
        let max = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let slot = plot_w / self.counts.len() as u32;
        let bar_w = slot * 3 / 5;

        write!(
            f,
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            w = WIDTH,
            h = HEIGHT
        )?;
        f.write_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        write!(
            f,
            r##"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"##,
            WIDTH / 2,
            MARGIN / 2 + 6,
            escape(&self.title)
        )?;
        write!(
            f,
            r##"<line x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="#333333"/>"##,
            m = MARGIN,
            b = base_y,
            r = WIDTH - MARGIN
        )?;

        for (i, (category, count)) in self.categories.iter().zip(self.counts).enumerate() {
            let bar_h = (count as u64 * plot_h as u64 / max as u64) as u32;
            let x = MARGIN + slot * i as u32 + (slot - bar_w) / 2;
            let center = x + bar_w / 2;

            write!(
                f,
                r##"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"><title>{}: {}</title></rect>"##,
                x,
                base_y - bar_h,
                bar_w,
                bar_h,
                BAR_COLORS[i % BAR_COLORS.len()],
                category,
                count
            )?;
            write!(
                f,
                r##"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"##,
                center,
                base_y - bar_h - 4,
                count
            )?;
            write!(
                f,
                r##"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="13">{}</text>"##,
                center,
                base_y + 18,
                category
            )?;
        }

        f.write_str("</svg>")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
