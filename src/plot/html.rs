//! Self-contained HTML document around the rendered SVG.
//!
//! The page inlines the SVG, a JSON payload with the plotted values, and a small
//! script that shows the nearest date and every trace's value under the pointer.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::{ChartSpec, Series};
use crate::error::AppError;
use crate::plot::chart::{PlotArea, RenderedChart};

#[derive(Debug, Serialize)]
struct Payload<'a> {
    width: u32,
    height: u32,
    area: PlotArea,
    start: String,
    days: i64,
    traces: Vec<TracePayload<'a>>,
}

#[derive(Debug, Serialize)]
struct TracePayload<'a> {
    label: &'a str,
    color: String,
    axis: &'a str,
    /// `[days since start, value]`, value `null` where the series has a gap.
    points: Vec<(i64, Option<f64>)>,
}

const SCRIPT: &str = r#"
(function () {
  const data = JSON.parse(document.getElementById("chart-data").textContent);
  const wrap = document.getElementById("chart");
  const guide = document.getElementById("guide");
  const readout = document.getElementById("readout");
  const start = new Date(data.start + "T00:00:00Z");

  function nearest(points, day) {
    let best = null;
    for (const p of points) {
      if (p[1] === null) continue;
      if (best === null || Math.abs(p[0] - day) < Math.abs(best[0] - day)) best = p;
    }
    return best;
  }

  wrap.addEventListener("mousemove", function (ev) {
    const rect = wrap.getBoundingClientRect();
    const scale = data.width / rect.width;
    const x = (ev.clientX - rect.left) * scale;
    const a = data.area;
    if (x < a.left || x > a.right) { guide.style.display = "none"; return; }
    const day = Math.round((x - a.left) / (a.right - a.left) * data.days);
    const date = new Date(start.getTime() + day * 86400000).toISOString().slice(0, 10);
    guide.style.display = "block";
    guide.style.left = (x / scale) + "px";
    guide.style.top = (a.top / scale) + "px";
    guide.style.height = ((a.bottom - a.top) / scale) + "px";
    const heading = document.createElement("strong");
    heading.textContent = date;
    const rows = [heading];
    for (const t of data.traces) {
      const p = nearest(t.points, day);
      const row = document.createElement("div");
      const swatch = document.createElement("span");
      swatch.className = "swatch";
      swatch.style.background = t.color;
      row.appendChild(swatch);
      row.appendChild(document.createTextNode(t.label + ": " + (p === null ? "n/a" : p[1].toFixed(2))));
      rows.push(row);
    }
    readout.replaceChildren(...rows);
  });

  wrap.addEventListener("mouseleave", function () { guide.style.display = "none"; });
})();
"#;

/// Build the complete HTML document.
pub fn render_html(chart: &RenderedChart, spec: &ChartSpec, series: &[Series]) -> Result<String, AppError> {
    let payload = Payload {
        width: spec.width,
        height: spec.height,
        area: chart.area,
        start: chart.start.format("%Y-%m-%d").to_string(),
        days: chart.days,
        traces: spec
            .traces
            .iter()
            .map(|t| TracePayload {
                label: &t.label,
                color: t.color.hex(),
                axis: spec.axis_title(t.axis),
                points: series
                    .iter()
                    .find(|s| s.name == t.series)
                    .map(|s| {
                        s.points
                            .iter()
                            .map(|p| ((p.date - chart.start).num_days(), p.value))
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect(),
    };

    let json = serde_json::to_string(&payload)
        .map_err(|e| AppError::new(4, format!("Failed to serialize chart data: {e}")))?
        // Keep the payload from closing its own <script> element.
        .replace("</", "<\\/");

    let title = escape_html(&spec.title);
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; margin: 24px; background: #fafafa; color: #222; }}
  #chart {{ position: relative; max-width: {width}px; background: #fff; box-shadow: 0 1px 4px rgba(0,0,0,.15); }}
  #chart svg {{ width: 100%; height: auto; display: block; }}
  #guide {{ position: absolute; width: 1px; background: rgba(0,0,0,.45); display: none; pointer-events: none; }}
  #readout {{ margin-top: 12px; min-height: 6em; font-size: 14px; }}
  .swatch {{ display: inline-block; width: 12px; height: 12px; margin-right: 6px; vertical-align: middle; }}
</style>
</head>
<body>
<div id="chart">
{svg}
<div id="guide"></div>
</div>
<div id="readout">Move the pointer over the chart to read values.</div>
<script type="application/json" id="chart-data">{json}</script>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        width = spec.width,
        svg = chart.svg,
    ))
}

/// Write the document to `path`.
pub fn write_html(path: &Path, html: &str) -> Result<(), AppError> {
    fs::write(path, html)
        .map_err(|e| AppError::new(4, format!("Failed to write chart HTML '{}': {e}", path.display())))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AxisSlot, AxisSpec, DashStyle, DateWindow, Observation, Rgb, TraceSpec};
    use crate::plot::chart::render_svg;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<CPI & PPI>"), "&lt;CPI &amp; PPI&gt;");
    }

    #[test]
    fn document_embeds_svg_payload_and_script() {
        let spec = ChartSpec {
            title: "CPI </script> test".to_string(),
            x_title: "Date".to_string(),
            axes: vec![AxisSpec {
                slot: AxisSlot::Right,
                title: "CPI (%)".to_string(),
            }],
            traces: vec![TraceSpec {
                series: "CPI".to_string(),
                label: "CPI </script>".to_string(),
                color: Rgb(250, 128, 114),
                dash: DashStyle::Dash,
                width: 2,
                axis: AxisSlot::Right,
            }],
            width: 900,
            height: 500,
        };
        let series = vec![Series::new(
            "CPI",
            vec![
                Observation::new(d(2024, 1, 31), Some(5.3)),
                Observation::new(d(2024, 2, 29), None),
            ],
        )];
        let window = DateWindow::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        let chart = render_svg(&series, &spec, &window).unwrap();

        let html = render_html(&chart, &spec, &series).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>CPI &lt;/script&gt; test</title>"));
        assert!(html.contains("<svg"));
        assert!(html.contains(r#""points":[[30,5.3],[59,null]]"#));
        assert!(html.contains("\"color\":\"#fa8072\""));
        // The payload cannot terminate its script element early.
        assert!(!html.contains("CPI </script>\""));
        assert!(html.contains("mousemove"));
        // Labels reach the page as text nodes, never as markup.
        assert!(!html.contains("innerHTML"));
        assert!(html.contains("createTextNode"));
    }
}
