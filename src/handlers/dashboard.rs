//! Browser dashboard
//!
//! A single static page driving the JSON API: upload, detect, download and
//! the awareness quiz.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Threat Detector</title>
<style>
  body { font-family: sans-serif; margin: 2rem auto; max-width: 960px; color: #2c3e50; }
  h1 { margin-bottom: 0; }
  .sub { color: #7f8c8d; margin-top: .25rem; }
  .metrics { display: flex; gap: 1rem; margin: 1rem 0; }
  .metric { flex: 1; padding: 10px; background: #f5f5f5; border-radius: 10px; text-align: center; }
  .metric b { display: block; font-size: 1.8em; }
  .warn { color: #b9770e; } .err { color: #c0392b; } .ok { color: #1e8449; }
  table { border-collapse: collapse; font-size: .85em; }
  td, th { border: 1px solid #ddd; padding: 2px 6px; }
  section { margin-bottom: 2.5rem; }
</style>
</head>
<body>
<h1>AI-Powered Threat Detection Dashboard</h1>
<p class="sub">Upload data from any domain (finance, systems, logs) and detect anomalies.</p>

<section>
  <h2>Upload &amp; Detect</h2>
  <input type="file" id="file" accept=".csv">
  <select id="profile">
    <option value="dashboard">dashboard</option>
    <option value="incident">incident</option>
  </select>
  <button id="detect">Run Threat Detection</button>
  <p id="status"></p>
  <div id="preview"></div>
  <div class="metrics" id="metrics" hidden>
    <div class="metric">Threats<b id="threats"></b></div>
    <div class="metric">Normal<b id="normal"></b></div>
  </div>
  <div id="chart"></div>
  <button id="download" hidden>Download CSV</button>
</section>

<section>
  <h2>Cybersecurity Awareness Quiz</h2>
  <form id="quiz"></form>
  <button id="submit-quiz">Submit Quiz</button>
  <p id="quiz-result"></p>
</section>

<script>
const $ = (id) => document.getElementById(id);

function form() {
  const data = new FormData();
  data.append("file", $("file").files[0]);
  return data;
}

function table(preview) {
  const head = "<tr>" + preview.columns.map(c => `<th>${c}</th>`).join("") + "</tr>";
  const rows = preview.rows.map(r => "<tr>" + r.map(v => `<td>${v}</td>`).join("") + "</tr>").join("");
  return `<table>${head}${rows}</table>`;
}

async function post(path) {
  const res = await fetch(`${path}?profile=${$("profile").value}`, { method: "POST", body: form() });
  if (!res.ok) {
    const body = await res.json().catch(() => ({ error: res.statusText, level: "error" }));
    $("status").className = body.level === "warning" ? "warn" : "err";
    $("status").textContent = body.error;
    throw new Error(body.error);
  }
  return res;
}

$("file").onchange = async () => {
  $("metrics").hidden = true; $("download").hidden = true; $("chart").innerHTML = "";
  const info = await (await post("/api/v1/datasets/inspect")).json();
  $("status").className = "ok";
  $("status").textContent = `Using ${info.numeric_features.length} numeric features: ${info.numeric_features.join(", ")}`;
  $("preview").innerHTML = table(info.preview);
};

$("detect").onclick = async () => {
  const report = await (await post("/api/v1/detect")).json();
  $("threats").textContent = report.summary.threat_count;
  $("normal").textContent = report.summary.normal_count;
  $("metrics").hidden = false;
  $("preview").innerHTML = table(report.results);
  $("chart").innerHTML = await (await post("/api/v1/detect/chart")).text();
  $("download").hidden = false;
  $("download").dataset.name = report.download_file_name;
};

$("download").onclick = async () => {
  const blob = await (await post("/api/v1/detect/report")).blob();
  const a = document.createElement("a");
  a.href = URL.createObjectURL(blob);
  a.download = $("download").dataset.name;
  a.click();
};

async function loadQuiz() {
  const quiz = await (await fetch("/api/v1/quiz")).json();
  $("quiz").innerHTML = quiz.questions.map(q => `
    <fieldset><legend>${q.prompt}</legend>
    ${q.options.map(o => `<label><input type="radio" name="q${q.index}" value="${o}" data-q="${q.index}"> ${o}</label><br>`).join("")}
    <span id="fb${q.index}"></span></fieldset>`).join("");
  $("quiz").onchange = async (e) => {
    const q = Number(e.target.dataset.q);
    const res = await fetch("/api/v1/quiz/answer", {
      method: "POST", headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ question: q, selected: e.target.value }),
    });
    const fb = await res.json();
    $(`fb${q}`).className = fb.correct ? "ok" : "err";
    $(`fb${q}`).textContent = fb.message;
  };
}

$("submit-quiz").onclick = async () => {
  const answers = [...$("quiz").querySelectorAll("fieldset")].map((_, i) => {
    const checked = $("quiz").querySelector(`input[name=q${i}]:checked`);
    return checked ? checked.value : "";
  });
  const res = await fetch("/api/v1/quiz/submit", {
    method: "POST", headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ answers }),
  });
  const result = await res.json();
  $("quiz-result").className = result.passed ? "ok" : "warn";
  $("quiz-result").textContent = `Your Score: ${result.score}/${result.total}. ${result.message}`;
};

loadQuiz();
</script>
</body>
</html>
"##;
