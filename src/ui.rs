use crate::models::DashboardMetrics;

pub fn render_dashboard(metrics: &DashboardMetrics) -> String {
    let progress = metrics
        .progress
        .percent
        .map(|percent| format!("{percent:.1}%"))
        .unwrap_or_else(|| "--".to_string());
    let days = metrics
        .days_until_demo
        .map(|days| format!("{days}d"))
        .unwrap_or_else(|| "--".to_string());

    DASHBOARD_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{TOTAL}}", &format_money(metrics.total_revenue))
        .replace("{{TARGET}}", &format_money(metrics.target_revenue))
        .replace("{{REMAINING}}", &format_money(metrics.remaining))
        .replace("{{WEEKLY}}", &format_money(metrics.weekly_target))
        .replace("{{PROGRESS}}", &progress)
        .replace("{{BAR}}", &format!("{:.1}", metrics.progress.bar_percent))
        .replace("{{DAYS}}", &days)
}

pub fn render_admin() -> String {
    ADMIN_HTML.replace("{{STYLE}}", STYLE)
}

/// Whole dollars with thousands separators, e.g. `-$12,500`.
pub fn format_money(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #22a05a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    a {
      color: var(--accent-2);
      font-weight: 600;
    }

    .hero {
      font-size: clamp(2.6rem, 7vw, 4rem);
      font-weight: 600;
      color: var(--accent);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .bar {
      height: 14px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .bar > div {
      height: 100%;
      background: var(--accent);
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    #chart {
      width: 100%;
      height: 260px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    form {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
    }

    input, button {
      font: inherit;
      border-radius: 12px;
      padding: 10px 14px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      border: none;
      background: var(--accent-2);
      color: white;
      font-weight: 600;
      cursor: pointer;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td, th {
      text-align: left;
      padding: 8px 6px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Revenue Tracker</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Revenue</h1>
      <a href="/admin">Edit</a>
    </header>

    <section>
      <div id="total" class="hero">{{TOTAL}}</div>
      <span class="label">MRR</span>
    </section>

    <section class="chart-card">
      <svg id="chart" role="img" aria-label="Cumulative revenue"></svg>
    </section>

    <section class="panel">
      <div class="stat">
        <span class="label">Needed this week</span>
        <span id="weekly" class="value">{{WEEKLY}}</span>
      </div>
      <div class="stat">
        <span class="label">Target</span>
        <span id="target" class="value">{{TARGET}}</span>
      </div>
      <div class="stat">
        <span class="label">Remaining</span>
        <span id="remaining" class="value">{{REMAINING}}</span>
      </div>
      <div class="stat">
        <span class="label">Until demo day</span>
        <span id="countdown" class="value">{{DAYS}}</span>
      </div>
    </section>

    <section class="stat">
      <span class="label">Progress to target <span id="progress">{{PROGRESS}}</span></span>
      <div class="bar"><div id="bar" style="width: {{BAR}}%"></div></div>
    </section>
  </main>

  <script>
    const SVG_NS = 'http://www.w3.org/2000/svg';
    const chartEl = document.getElementById('chart');
    const countdownEl = document.getElementById('countdown');
    let demoDay = null;
    let timer = null;

    const money = (value) =>
      `${value < 0 ? '-' : ''}$${Math.abs(Math.round(value)).toLocaleString()}`;

    const renderChart = (points) => {
      if (!points.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No revenue yet</text>';
        return;
      }

      const width = 600;
      const height = 260;
      const padX = 56;
      const padY = 34;
      const top = 24;
      const values = points.map((point) => point.cumulative);
      let min = Math.min(0, ...values);
      let max = Math.max(0, ...values);
      if (min === max) {
        max += 1;
      }

      const xStep = points.length > 1 ? (width - padX * 2) / (points.length - 1) : 0;
      const scaleY = (height - top - padY) / (max - min);
      const x = (index) => padX + index * xStep;
      const y = (value) => height - padY - (value - min) * scaleY;

      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.cumulative).toFixed(2)}`)
        .join(' ');

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = min + ((max - min) * i) / 4;
        grid += `<line class="chart-grid" x1="${padX}" y1="${y(value)}" x2="${width - padX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${padX - 8}" y="${y(value) + 4}" text-anchor="end">${money(value)}</text>`;
      }

      chartEl.setAttribute('viewBox', `0 0 ${width} ${height}`);
      chartEl.innerHTML = `${grid}<path class="chart-line" d="${path}" />`;

      // Labels come from stored date strings; keep them out of the markup.
      points.forEach((point, index) => {
        const label = document.createElementNS(SVG_NS, 'text');
        label.setAttribute('class', 'chart-label');
        label.setAttribute('x', x(index));
        label.setAttribute('y', height - padY + 18);
        label.setAttribute('text-anchor', 'middle');
        label.textContent = point.label;
        chartEl.append(label);
      });
    };

    const tick = () => {
      if (!demoDay) {
        countdownEl.textContent = '--';
        return;
      }
      const [year, month, day] = demoDay.split('-').map(Number);
      const target = new Date(year, month - 1, day);
      const total = Math.max(0, Math.floor((target.getTime() - Date.now()) / 1000));
      const d = Math.floor(total / 86400);
      const h = Math.floor((total % 86400) / 3600);
      const m = Math.floor((total % 3600) / 60);
      const s = total % 60;
      countdownEl.textContent = `${d}d ${h}h ${m}m ${s}s`;
    };

    const render = (metrics) => {
      document.getElementById('total').textContent = money(metrics.total_revenue);
      document.getElementById('weekly').textContent = money(metrics.weekly_target);
      document.getElementById('target').textContent = money(metrics.target_revenue);
      document.getElementById('remaining').textContent = money(metrics.remaining);
      document.getElementById('progress').textContent =
        metrics.progress.percent === null ? '--' : `${metrics.progress.percent.toFixed(1)}%`;
      document.getElementById('bar').style.width = `${metrics.progress.bar_percent}%`;
      renderChart(metrics.chart);

      demoDay = metrics.demo_day;
      clearInterval(timer);
      tick();
      if (demoDay) {
        timer = setInterval(tick, 1000);
      }
    };

    fetch('/api/metrics', { cache: 'no-store' })
      .then((res) => res.json())
      .then(render)
      .catch(() => renderChart([]));
  </script>
</body>
</html>
"#;

const ADMIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Revenue Tracker - Edit</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Edit</h1>
      <a href="/">Dashboard</a>
    </header>

    <section class="stat">
      <span class="label">Settings</span>
      <form id="settings-form">
        <input id="target-input" type="number" min="0" step="any" placeholder="Target revenue" />
        <input id="demo-input" type="date" />
        <button type="submit">Save settings</button>
      </form>
    </section>

    <section class="stat">
      <span class="label">Add revenue</span>
      <form id="entry-form">
        <input id="amount-input" type="number" step="any" placeholder="Amount" required />
        <input id="date-input" type="date" required />
        <input id="note-input" type="text" placeholder="Note (optional)" />
        <button type="submit">Add</button>
      </form>
    </section>

    <section class="stat">
      <span class="label">Entries</span>
      <table>
        <thead><tr><th>Date</th><th>Amount</th><th>Note</th><th></th></tr></thead>
        <tbody id="entries"></tbody>
      </table>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const entriesEl = document.getElementById('entries');
    const targetInput = document.getElementById('target-input');
    const demoInput = document.getElementById('demo-input');
    const dateInput = document.getElementById('date-input');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const cell = (text) => {
      const td = document.createElement('td');
      td.textContent = text;
      return td;
    };

    const render = (data) => {
      targetInput.value = data.settings.targetRevenue;
      demoInput.value = data.settings.demoDay || '';
      entriesEl.innerHTML = '';
      [...data.entries]
        .sort((a, b) => (a.date < b.date ? 1 : a.date > b.date ? -1 : 0))
        .forEach((entry) => {
          const row = document.createElement('tr');
          row.append(cell(entry.date), cell(`$${entry.amount.toLocaleString()}`), cell(entry.note || ''));
          const remove = document.createElement('button');
          remove.textContent = 'Delete';
          remove.addEventListener('click', () => {
            send(`/api/entries/${encodeURIComponent(entry.id)}`, 'DELETE').catch((err) => setStatus(err.message, 'error'));
          });
          const actions = document.createElement('td');
          actions.append(remove);
          row.append(actions);
          entriesEl.append(row);
        });
    };

    const send = async (url, method, body) => {
      setStatus('Saving...', 'info');
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      const outcome = await res.json();
      render(outcome.data);
      setStatus(outcome.saved ? 'Saved' : 'Could not save, change reverted', outcome.saved ? 'ok' : 'error');
    };

    document.getElementById('settings-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send('/api/settings', 'PATCH', {
        targetRevenue: parseFloat(targetInput.value) || 0,
        demoDay: demoInput.value
      }).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('entry-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const note = document.getElementById('note-input').value;
      send('/api/entries', 'POST', {
        amount: parseFloat(document.getElementById('amount-input').value),
        date: dateInput.value,
        note: note || null
      })
        .then(() => event.target.reset())
        .catch((err) => setStatus(err.message, 'error'));
    });

    dateInput.valueAsDate = new Date();
    fetch('/api/data', { cache: 'no-store' })
      .then((res) => res.json())
      .then(render)
      .catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
