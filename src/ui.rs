use crate::models::DaySummary;

pub fn render_index(date: &str, summary: &DaySummary) -> String {
    let (hours, duration) = match summary {
        DaySummary::Recorded {
            total_sleep_hours,
            total_sleep_duration,
            ..
        } => (total_sleep_hours.as_str(), total_sleep_duration.as_str()),
        DaySummary::Empty { .. } => ("0.00", "0:00:00"),
    };
    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{NAPS}}", &summary.naps().len().to_string())
        .replace("{{HOURS}}", hours)
        .replace("{{DURATION}}", duration)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Baby Sleep Tracker</title>
  <style>
    :root {
      --bg: #eef1f8;
      --ink: #24283b;
      --accent: #4a6cf7;
      --danger: #e5484d;
      --card: #ffffff;
      --muted: #6b7085;
      --shadow: 0 18px 40px rgba(36, 40, 59, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 16px;
    }

    .app {
      width: min(520px, 100%);
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 28px;
      display: grid;
      gap: 20px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .row {
      display: flex;
      gap: 10px;
      align-items: center;
      flex-wrap: wrap;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
    }

    .stat {
      border: 1px solid rgba(36, 40, 59, 0.08);
      border-radius: 14px;
      padding: 12px;
    }

    .stat .label {
      display: block;
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.4rem;
      font-weight: 600;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      font-size: 1rem;
      color: white;
      background: var(--accent);
      cursor: pointer;
    }

    button.danger {
      background: var(--danger);
    }

    input {
      border: 1px solid rgba(36, 40, 59, 0.2);
      border-radius: 8px;
      padding: 8px;
      font-size: 1rem;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    li {
      display: flex;
      justify-content: space-between;
      align-items: center;
      border-bottom: 1px solid rgba(36, 40, 59, 0.08);
      padding-bottom: 6px;
    }

    .status {
      min-height: 1.2em;
      color: var(--danger);
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Baby Sleep Tracker</h1>
    <div class="status" id="status"></div>

    <div class="row">
      <input type="date" id="date" value="{{DATE}}" />
      <button id="toggle" type="button">Start Sleep</button>
    </div>
    <p id="active"></p>

    <section class="panel">
      <div class="stat">
        <span class="label">Naps</span>
        <span id="naps" class="value">{{NAPS}}</span>
      </div>
      <div class="stat">
        <span class="label">Hours</span>
        <span id="hours" class="value">{{HOURS}}</span>
      </div>
      <div class="stat">
        <span class="label">Total</span>
        <span id="duration" class="value">{{DURATION}}</span>
      </div>
    </section>

    <ul id="nap-list"></ul>

    <section class="row">
      <input type="time" id="manual-start" />
      <input type="time" id="manual-end" />
      <button id="manual-add" type="button">Add Nap</button>
    </section>

    <button id="clear-day" class="danger" type="button">Clear Day</button>
  </main>

  <script>
    const dateEl = document.getElementById('date');
    const toggleEl = document.getElementById('toggle');
    const activeEl = document.getElementById('active');
    const statusEl = document.getElementById('status');
    const listEl = document.getElementById('nap-list');

    let activeSession = null;

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const api = async (method, path, body) => {
      const response = await fetch(path, {
        method,
        headers: body ? { 'Content-Type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined,
      });
      const data = await response.json();
      if (!response.ok) {
        throw new Error(data.error || 'Request failed');
      }
      return data;
    };

    const loadActive = async () => {
      const data = await api('GET', '/active');
      activeSession = data.active_session;
      toggleEl.textContent = activeSession ? 'End Sleep' : 'Start Sleep';
      activeEl.textContent = activeSession ? `Sleeping since ${activeSession.start_time}` : '';
    };

    const loadSummary = async () => {
      const data = await api('GET', `/summary?date=${dateEl.value}`);
      document.getElementById('naps').textContent = data.naps.length;
      document.getElementById('hours').textContent = data.total_sleep_hours || '0.00';
      document.getElementById('duration').textContent = data.total_sleep_duration || '0:00:00';
      listEl.innerHTML = '';
      data.naps.forEach((nap) => {
        const item = document.createElement('li');
        item.textContent = `${nap.start} - ${nap.end} (${nap.duration})`;
        const remove = document.createElement('button');
        remove.className = 'danger';
        remove.textContent = 'Delete';
        remove.addEventListener('click', () => run(() => api('DELETE', `/nap/${nap.id}`)));
        item.appendChild(remove);
        listEl.appendChild(item);
      });
    };

    const refresh = async () => {
      await Promise.all([loadActive(), loadSummary()]);
    };

    const run = async (action) => {
      try {
        await action();
        setStatus('');
        await refresh();
      } catch (err) {
        setStatus(err.message);
      }
    };

    toggleEl.addEventListener('click', () =>
      run(() => (activeSession ? api('POST', '/end', {}) : api('POST', '/start', {})))
    );

    document.getElementById('manual-add').addEventListener('click', () => {
      const start = document.getElementById('manual-start').value;
      const end = document.getElementById('manual-end').value;
      if (!start || !end) {
        setStatus('Please fill in both start and end times');
        return;
      }
      run(() => api('POST', '/manual-nap', {
        start_time: `${dateEl.value} ${start}`,
        end_time: `${dateEl.value} ${end}`,
      }));
    });

    document.getElementById('clear-day').addEventListener('click', () => {
      if (window.confirm('Clear all sleep data for this day?')) {
        run(() => api('POST', '/clear-day', { date: dateEl.value }));
      }
    });

    dateEl.addEventListener('change', () => run(async () => {}));
    setInterval(() => loadActive().catch(() => {}), 30000);
    refresh().catch((err) => setStatus(err.message));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_shows_day_totals() {
        let summary = DaySummary::Recorded {
            date: "2024-01-01".to_string(),
            naps: Vec::new(),
            total_sleep_hours: "1.50".to_string(),
            total_sleep_duration: "1:30:00".to_string(),
        };
        let html = render_index("2024-01-01", &summary);
        assert!(html.contains(r#"value="2024-01-01""#));
        assert!(html.contains(">1.50<"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn index_for_empty_day_shows_zeroes() {
        let summary = DaySummary::Empty {
            message: "none".to_string(),
            naps: Vec::new(),
        };
        let html = render_index("2024-01-01", &summary);
        assert!(html.contains(">0:00:00<"));
    }
}
