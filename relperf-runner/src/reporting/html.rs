//! Self-contained HTML page with an embedded Chart.js line chart.

use super::payload::ChartPayload;
use chrono::{DateTime, Utc};

/// Element id of the chart canvas.
const CANVAS_ID: &str = "banksChart";

/// "01 Jul 2024 12:30 UTC"
pub fn format_updated_at(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y %H:%M UTC").to_string()
}

/// Escape text for an HTML element or attribute body.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// JSON that can sit inside a `<script>` element without closing it.
fn script_safe_json(payload: &ChartPayload) -> Result<String, serde_json::Error> {
    Ok(payload.to_json()?.replace("</", "<\\/"))
}

/// Render the full report page.
pub fn render_html(
    payload: &ChartPayload,
    title: &str,
    generated_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let chart_json = script_safe_json(payload)?;
    let title = escape_html(title);
    let timestamp = format_updated_at(generated_at);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/luxon@3/build/global/luxon.min.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-luxon"></script>
  <style>
    :root {{ font-family: 'Segoe UI', Tahoma, sans-serif; background:#f4f4f4; }}
    body {{ margin:0; padding:1rem; }}
    h1 {{ text-align:center; }}
    .container {{ max-width:1200px; margin:0 auto; background:#fff; padding:1rem 2rem; box-shadow:0 2px 8px rgba(0,0,0,0.1); }}
    .meta {{ text-align:center; color:#666; margin-bottom:1rem; }}
    canvas {{ width:100%; max-height:600px; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>{title}</h1>
    <p class="meta">Last updated: {timestamp}</p>
    <canvas id="{CANVAS_ID}"></canvas>
  </div>
  <script>
    const chartData = {chart_json};
    const ctx = document.getElementById('{CANVAS_ID}').getContext('2d');
    new Chart(ctx, {{
      type: 'line',
      data: {{ datasets: chartData.datasets }},
      options: {{
        responsive: true,
        interaction: {{ mode: 'nearest', axis: 'x', intersect: false }},
        stacked: false,
        scales: {{
          x: {{ type: 'time', time: {{ unit: 'month' }}, title: {{ display: true, text: 'Date' }} }},
          y: {{ title: {{ display: true, text: chartData.yTitle }}, ticks: {{ callback: (value) => value.toFixed(2) }} }}
        }},
        plugins: {{ legend: {{ position: 'bottom' }} }}
      }}
    }});
  </script>
</body>
</html>
"#
    ))
}
