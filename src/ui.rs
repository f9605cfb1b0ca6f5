use crate::accounting::{QUICK_LOG_AMOUNTS, progress_message};
use crate::models::{ActivityLevel, BadgeView, DailySummary, EntryView, Profile, StatsResponse};

pub fn render_index(
    profile: &Profile,
    summary: &DailySummary,
    badges: &[BadgeView],
    entries: &[EntryView],
    stats: &StatsResponse,
    eco_mode: bool,
    notice: Option<&str>,
) -> String {
    let (progress_hidden, progress_pct) = match summary.progress_display {
        Some(ratio) => ("", format!("{:.0}", ratio * 100.0)),
        None => ("hidden", "0".to_string()),
    };
    let goal = summary
        .goal_ml
        .map(|goal| goal.to_string())
        .unwrap_or_else(|| "--".to_string());
    let remaining = summary
        .remaining_ml
        .map(|remaining| remaining.to_string())
        .unwrap_or_else(|| "--".to_string());
    let insights = &stats.insights;

    INDEX_HTML
        .replace("{{NAME}}", &escape_html(&profile.name))
        .replace("{{AGE}}", &profile.age.to_string())
        .replace("{{WEIGHT}}", &profile.weight.to_string())
        .replace("{{ACTIVITY_OPTIONS}}", &activity_options(profile.activity_level))
        .replace(
            "{{GOAL_INPUT}}",
            &profile.goal().map(|goal| goal.to_string()).unwrap_or_default(),
        )
        .replace("{{DATE}}", &summary.date)
        .replace("{{CONSUMED}}", &summary.consumed_ml.to_string())
        .replace("{{GOAL}}", &goal)
        .replace("{{REMAINING}}", &remaining)
        .replace("{{PROGRESS_HIDDEN}}", progress_hidden)
        .replace("{{PROGRESS_PCT}}", &progress_pct)
        .replace("{{MESSAGE}}", &escape_html(&progress_message(summary)))
        .replace("{{QUICK_BUTTONS}}", &quick_buttons())
        .replace("{{ECO_STATE}}", if eco_mode { "on" } else { "off" })
        .replace("{{ECO_LABEL}}", if eco_mode { "Eco mode: on" } else { "Eco mode: off" })
        .replace("{{SUGGESTION}}", &escape_html(&insights.suggestion))
        .replace("{{WEEK_TOTAL}}", &insights.week_total_ml.to_string())
        .replace("{{AVG_14}}", &insights.avg_14_days_ml.to_string())
        .replace("{{BOTTLES}}", &format!("{:.1}", insights.refill_bottles))
        .replace("{{CO2}}", &format!("{:.2}", insights.co2_saved_kg))
        .replace("{{BADGES}}", &badge_items(badges))
        .replace("{{ENTRIES}}", &entry_rows(entries))
        .replace("{{NOTICE}}", &escape_html(notice.unwrap_or_default()))
}

fn quick_buttons() -> String {
    QUICK_LOG_AMOUNTS
        .iter()
        .map(|amount| {
            format!(
                r#"<form class="quick-form" method="post" action="/log"><input type="hidden" name="amount_ml" value="{amount}" /><button class="btn-quick" type="submit">+{amount} ml</button></form>"#
            )
        })
        .collect()
}

fn activity_options(selected: ActivityLevel) -> String {
    ActivityLevel::ALL
        .iter()
        .map(|level| {
            let value = level.as_str();
            let marker = if *level == selected { " selected" } else { "" };
            format!(r#"<option value="{value}"{marker}>{value}</option>"#)
        })
        .collect()
}

fn badge_items(badges: &[BadgeView]) -> String {
    badges
        .iter()
        .map(|badge| {
            let state = if badge.earned { "earned" } else { "locked" };
            let date = badge
                .earned_date
                .as_deref()
                .map(|date| format!("Earned {}", escape_html(date)))
                .unwrap_or_else(|| "Not yet earned".to_string());
            format!(
                r#"<li class="badge {state}" data-badge="{id}"><strong>{title}</strong><span>{description}</span><em>{date}</em></li>"#,
                id = escape_html(&badge.id),
                title = escape_html(&badge.title),
                description = escape_html(&badge.description),
            )
        })
        .collect()
}

fn entry_rows(entries: &[EntryView]) -> String {
    if entries.is_empty() {
        return r#"<tr><td colspan="4">No logs yet.</td></tr>"#.to_string();
    }
    entries
        .iter()
        .map(|entry| {
            // RFC 3339 timestamps carry the time of day at a fixed offset.
            let time = entry.timestamp.get(11..16).unwrap_or(&entry.timestamp);
            format!(
                "<tr><td>{date} {time}</td><td>{amount}</td><td>{eco}</td><td>{note}</td></tr>",
                date = escape_html(&entry.date),
                time = escape_html(time),
                amount = entry.amount_ml,
                eco = if entry.eco { "yes" } else { "" },
                note = escape_html(entry.note.as_deref().unwrap_or_default()),
            )
        })
        .collect()
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Water Buddy</title>
  <style>
    :root {
      --bg: #071927;
      --panel: #0c2536;
      --ink: #cff8ff;
      --muted: #8fc4cf;
      --accent: #00e5ff;
      --accent-2: #00cfea;
      --eco: #6ee7a8;
      --error: #ff8a80;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #0e3a52, var(--bg) 65%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 28px 16px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    h1 {
      margin: 0;
      color: var(--accent);
      font-size: clamp(2rem, 4vw, 2.6rem);
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.15rem;
    }

    .subtitle,
    .hint {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
      gap: 20px;
    }

    .card {
      background: var(--panel);
      border-radius: 18px;
      padding: 20px;
      border: 1px solid rgba(0, 229, 255, 0.12);
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
      margin-bottom: 14px;
    }

    .stat .label {
      display: block;
      font-size: 0.75rem;
      letter-spacing: 0.1em;
      text-transform: uppercase;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
    }

    .bar {
      height: 18px;
      background: #04262b;
      border-radius: 999px;
      overflow: hidden;
    }

    .bar-fill {
      height: 100%;
      background: linear-gradient(90deg, var(--accent-2), var(--accent));
      transition: width 300ms ease;
    }

    .message {
      margin: 12px 0 0;
    }

    .quick {
      display: grid;
      grid-template-columns: repeat(2, 1fr);
      gap: 10px;
      margin-bottom: 14px;
    }

    form {
      margin: 0;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
      color: var(--muted);
      margin-bottom: 10px;
    }

    input,
    select {
      background: #04262b;
      color: var(--ink);
      border: 1px solid rgba(0, 229, 255, 0.25);
      border-radius: 10px;
      padding: 8px 10px;
      font-size: 1rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: var(--bg);
      width: 100%;
    }

    button.secondary {
      background: transparent;
      color: var(--accent);
      border: 1px solid var(--accent);
    }

    .eco[data-state="on"] button {
      background: var(--eco);
      border-color: var(--eco);
      color: var(--bg);
    }

    .badges {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .badge {
      display: grid;
      gap: 2px;
      padding: 10px 12px;
      border-radius: 12px;
      background: #04262b;
    }

    .badge.locked {
      opacity: 0.5;
    }

    .badge.earned {
      border: 1px solid var(--accent);
    }

    .entries {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.9rem;
    }

    .entries th,
    .entries td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid rgba(0, 229, 255, 0.12);
    }

    .entries th {
      color: var(--muted);
      font-weight: 600;
    }

    .badge span,
    .badge em {
      font-size: 0.85rem;
      color: var(--muted);
    }

    #chart {
      width: 100%;
      height: 240px;
      display: block;
    }

    .chart-bar {
      fill: var(--accent-2);
    }

    .chart-bar.met {
      fill: var(--accent);
    }

    .chart-goal {
      stroke: #89f9ff;
      stroke-dasharray: 4 6;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .status {
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: var(--error);
    }

    .status[data-type="ok"] {
      color: var(--eco);
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Water Buddy</h1>
      <p class="subtitle">Hi <span id="profile-name">{{NAME}}</span>, here is your hydration for <span id="date">{{DATE}}</span>.</p>
    </header>

    <div class="status" id="status">{{NOTICE}}</div>

    <section class="card">
      <h2>Today</h2>
      <div class="stats">
        <div class="stat"><span class="label">Consumed (ml)</span><span class="value" id="consumed">{{CONSUMED}}</span></div>
        <div class="stat"><span class="label">Goal (ml)</span><span class="value" id="goal">{{GOAL}}</span></div>
        <div class="stat"><span class="label">Remaining (ml)</span><span class="value" id="remaining">{{REMAINING}}</span></div>
      </div>
      <div class="bar" id="progress" {{PROGRESS_HIDDEN}}>
        <div class="bar-fill" id="progress-fill" style="width: {{PROGRESS_PCT}}%"></div>
      </div>
      <p class="message" id="message">{{MESSAGE}}</p>
    </section>

    <div class="grid">
      <section class="card">
        <h2>Quick log</h2>
        <div class="quick">{{QUICK_BUTTONS}}</div>
        <form id="custom-form" method="post" action="/log">
          <label>Custom amount (ml)
            <input name="amount_ml" type="number" min="1" step="50" value="250" required />
          </label>
          <label>Note (optional)
            <input name="note" type="text" maxlength="200" />
          </label>
          <button type="submit">Log custom</button>
        </form>
      </section>

      <section class="card">
        <h2>Profile</h2>
        <form id="profile-form" method="post" action="/profile">
          <label>Name <input name="name" type="text" value="{{NAME}}" /></label>
          <label>Age <input name="age" type="number" min="1" max="120" value="{{AGE}}" /></label>
          <label>Weight (kg) <input name="weight" type="number" min="20" max="300" step="0.1" value="{{WEIGHT}}" /></label>
          <label>Activity level <select name="activity_level">{{ACTIVITY_OPTIONS}}</select></label>
          <label>Daily goal (ml, blank for recommended) <input name="daily_goal_ml" type="number" min="1" value="{{GOAL_INPUT}}" /></label>
          <button type="submit">Save profile</button>
        </form>
      </section>
    </div>

    <div class="grid">
      <section class="card">
        <h2>Last 7 days</h2>
        <svg id="chart" viewBox="0 0 600 240" aria-label="Daily totals" role="img"></svg>
      </section>

      <section class="card">
        <h2>Badges</h2>
        <ul class="badges" id="badges">{{BADGES}}</ul>
      </section>
    </div>

    <div class="grid">
      <section class="card eco" id="eco" data-state="{{ECO_STATE}}">
        <h2>Eco mode</h2>
        <form id="eco-form" method="post" action="/eco/toggle">
          <button class="secondary" id="eco-btn" type="submit">{{ECO_LABEL}}</button>
        </form>
        <p class="message" id="suggestion">{{SUGGESTION}}</p>
        <div class="stats">
          <div class="stat"><span class="label">This week (ml)</span><span class="value" id="week-total">{{WEEK_TOTAL}}</span></div>
          <div class="stat"><span class="label">Refill bottles</span><span class="value" id="bottles">{{BOTTLES}}</span></div>
          <div class="stat"><span class="label">CO2 saved (kg)</span><span class="value" id="co2">{{CO2}}</span></div>
        </div>
        <p class="hint">14-day average: <span id="avg-14">{{AVG_14}}</span> ml per day.</p>
      </section>

      <section class="card">
        <h2>Reminders</h2>
        <label>Interval (minutes)
          <input id="reminder-interval" type="number" min="5" max="240" step="5" value="60" />
        </label>
        <div class="quick">
          <button type="button" id="reminder-on">Enable</button>
          <button type="button" class="secondary" id="reminder-off">Disable</button>
        </div>
        <p class="hint">Browser notifications only fire while this tab stays open. <a href="/export.csv">Export logs as CSV</a>.</p>
      </section>
    </div>

    <section class="card">
      <h2>Recent logs</h2>
      <table class="entries">
        <thead>
          <tr><th>When</th><th>Amount (ml)</th><th>Eco</th><th>Note</th></tr>
        </thead>
        <tbody id="entries">{{ENTRIES}}</tbody>
      </table>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const consumedEl = document.getElementById('consumed');
    const goalEl = document.getElementById('goal');
    const remainingEl = document.getElementById('remaining');
    const progressEl = document.getElementById('progress');
    const progressFillEl = document.getElementById('progress-fill');
    const messageEl = document.getElementById('message');
    const badgesEl = document.getElementById('badges');
    const chartEl = document.getElementById('chart');
    const ecoEl = document.getElementById('eco');
    const ecoBtn = document.getElementById('eco-btn');
    const suggestionEl = document.getElementById('suggestion');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeText = (value) => {
      const span = document.createElement('span');
      span.textContent = value;
      return span.innerHTML;
    };

    const progressText = (summary) => {
      if (summary.progress === null) {
        return 'Set a daily goal in your profile to track progress.';
      }
      if (summary.progress > 1) {
        return `Goal smashed! ${summary.consumed_ml - summary.goal_ml} ml over your ${summary.goal_ml} ml target.`;
      }
      if (summary.progress >= 1) return 'Goal reached. Nicely done!';
      if (summary.progress >= 0.75) return 'Almost there, one or two more glasses.';
      if (summary.progress >= 0.5) return 'Halfway there. Keep sipping.';
      if (summary.progress > 0) return 'Good start. Keep a bottle nearby.';
      return 'Nothing logged yet today. Start with a glass of water.';
    };

    const updateSummary = (summary) => {
      consumedEl.textContent = summary.consumed_ml;
      goalEl.textContent = summary.goal_ml ?? '--';
      remainingEl.textContent = summary.remaining_ml ?? '--';
      if (summary.progress_display === null) {
        progressEl.hidden = true;
      } else {
        progressEl.hidden = false;
        progressFillEl.style.width = `${Math.round(summary.progress_display * 100)}%`;
      }
      messageEl.textContent = progressText(summary);
    };

    const updateBadges = (badges) => {
      badgesEl.innerHTML = badges
        .map((badge) => {
          const state = badge.earned ? 'earned' : 'locked';
          const date = badge.earned_date ? `Earned ${escapeText(badge.earned_date)}` : 'Not yet earned';
          return `<li class="badge ${state}" data-badge="${escapeText(badge.id)}"><strong>${escapeText(badge.title)}</strong><span>${escapeText(badge.description)}</span><em>${date}</em></li>`;
        })
        .join('');
    };

    const renderBarChart = (days, goal) => {
      const width = 600;
      const height = 240;
      const paddingX = 44;
      const paddingY = 30;
      const top = 20;

      const max = Math.max(goal || 0, ...days.map((day) => day.total_ml), 1);
      const slot = (width - paddingX * 2) / days.length;
      const barWidth = slot * 0.6;
      const y = (value) => height - paddingY - (value / max) * (height - top - paddingY);

      const bars = days
        .map((day, index) => {
          const x = paddingX + index * slot + (slot - barWidth) / 2;
          const label = new Date(`${day.date}T00:00:00`).toLocaleDateString(undefined, { weekday: 'short' });
          return `
            <rect class="chart-bar ${day.goal_met ? 'met' : ''}" x="${x.toFixed(2)}" y="${y(day.total_ml).toFixed(2)}" width="${barWidth.toFixed(2)}" height="${(height - paddingY - y(day.total_ml)).toFixed(2)}" rx="4" />
            <text class="chart-label" x="${(x + barWidth / 2).toFixed(2)}" y="${(y(day.total_ml) - 6).toFixed(2)}" text-anchor="middle">${day.total_ml}</text>
            <text class="chart-label" x="${(x + barWidth / 2).toFixed(2)}" y="${height - paddingY + 18}" text-anchor="middle">${label}</text>`;
        })
        .join('');

      const goalLine = goal
        ? `<line class="chart-goal" x1="${paddingX}" y1="${y(goal)}" x2="${width - paddingX}" y2="${y(goal)}" />
           <text class="chart-label" x="${paddingX - 6}" y="${y(goal) + 4}" text-anchor="end">${goal}</text>`
        : '';

      chartEl.innerHTML = `${bars}${goalLine}`;
    };

    const loadStats = async () => {
      const res = await fetch('/api/stats');
      if (!res.ok) {
        throw new Error('Unable to load stats');
      }
      const stats = await res.json();
      renderBarChart(stats.last_7_days, stats.goal_ml);
      document.getElementById('week-total').textContent = stats.insights.week_total_ml;
      document.getElementById('avg-14').textContent = stats.insights.avg_14_days_ml;
      document.getElementById('bottles').textContent = stats.insights.refill_bottles.toFixed(1);
      document.getElementById('co2').textContent = stats.insights.co2_saved_kg.toFixed(2);
      suggestionEl.textContent = stats.insights.suggestion;
    };

    const loadEntries = async () => {
      const res = await fetch('/api/entries');
      if (!res.ok) {
        throw new Error('Unable to load recent logs');
      }
      const entries = await res.json();
      const body = document.getElementById('entries');
      if (!entries.length) {
        body.innerHTML = '<tr><td colspan="4">No logs yet.</td></tr>';
        return;
      }
      body.innerHTML = entries
        .map((entry) => {
          const time = entry.timestamp.slice(11, 16);
          return `<tr><td>${escapeText(entry.date)} ${escapeText(time)}</td><td>${entry.amount_ml}</td><td>${entry.eco ? 'yes' : ''}</td><td>${escapeText(entry.note || '')}</td></tr>`;
        })
        .join('');
    };

    const sendJson = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const logDrink = async (amount, note) => {
      setStatus('Saving...', 'info');
      const data = await sendJson('POST', '/api/log', { amount_ml: amount, note: note || null });
      updateSummary(data.summary);
      updateBadges(data.badges);
      if (data.notice) {
        setStatus(data.notice, 'error');
      } else if (data.newly_earned.length) {
        setStatus(`Logged ${amount} ml. New badge: ${data.newly_earned.join(', ')}`, 'ok');
      } else {
        setStatus(`Logged ${amount} ml.`, 'ok');
      }
      loadStats().catch((err) => setStatus(err.message, 'error'));
      loadEntries().catch((err) => setStatus(err.message, 'error'));
    };

    document.querySelectorAll('.quick-form').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const amount = Number(form.elements.amount_ml.value);
        logDrink(amount).catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.getElementById('custom-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = event.target;
      const raw = form.elements.amount_ml.value.trim();
      const amount = Number(raw);
      if (!raw || !Number.isInteger(amount) || amount <= 0) {
        setStatus('amount must be a positive whole number of ml', 'error');
        return;
      }
      logDrink(amount, form.elements.note.value).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('profile-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = event.target;
      const goal = form.elements.daily_goal_ml.value.trim();
      const body = {
        name: form.elements.name.value,
        age: Number(form.elements.age.value),
        weight: Number(form.elements.weight.value),
        activity_level: form.elements.activity_level.value,
        daily_goal_ml: goal ? Number(goal) : null
      };
      sendJson('PUT', '/api/profile', body)
        .then(async (data) => {
          document.getElementById('profile-name').textContent = data.profile.name;
          form.elements.daily_goal_ml.value = data.profile.daily_goal_ml;
          setStatus(data.notice || 'Profile saved.', data.notice ? 'error' : 'ok');
          const res = await fetch('/api/today');
          if (res.ok) updateSummary(await res.json());
          await loadStats();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('eco-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const enabled = ecoEl.dataset.state !== 'on';
      sendJson('POST', '/api/eco', { enabled })
        .then((data) => {
          ecoEl.dataset.state = data.eco_mode ? 'on' : 'off';
          ecoBtn.textContent = data.eco_mode ? 'Eco mode: on' : 'Eco mode: off';
          suggestionEl.textContent = data.suggestion;
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    let reminderId = null;
    const stopReminders = () => {
      if (reminderId) clearInterval(reminderId);
      reminderId = null;
    };
    const startReminders = (minutes) => {
      stopReminders();
      reminderId = setInterval(() => {
        const notif = new Notification('Water Buddy: time to sip!', {
          body: 'Open the app to log a quick drink. Stay hydrated!'
        });
        setTimeout(() => notif.close(), 8000);
      }, minutes * 60 * 1000);
      setStatus(`Reminders enabled every ${minutes} minutes.`, 'ok');
    };

    document.getElementById('reminder-on').addEventListener('click', () => {
      const minutes = Math.min(240, Math.max(5, Number(document.getElementById('reminder-interval').value) || 60));
      if (!('Notification' in window)) {
        setStatus('This browser does not support notifications.', 'error');
        return;
      }
      if (Notification.permission === 'granted') {
        startReminders(minutes);
      } else if (Notification.permission !== 'denied') {
        Notification.requestPermission().then((permission) => {
          if (permission === 'granted') startReminders(minutes);
        });
      } else {
        setStatus('Notifications are blocked for this site.', 'error');
      }
    });

    document.getElementById('reminder-off').addEventListener('click', () => {
      stopReminders();
      setStatus('Reminders disabled.', 'info');
    });

    loadStats().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
