use axum::response::Html;

/// GET /
/// Upload form posting to the analysis endpoints.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>ATS Resume Expert</title>
  <style>
    body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
    textarea { width: 100%; min-height: 10rem; }
    .actions button { margin-right: .5rem; }
    .success { color: #1a7f37; }
    .warning { color: #9a6700; }
    .error { color: #cf222e; }
    #output { white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>ATS Tracking System</h1>
  <form id="analysis-form">
    <label for="job_description">Job Description:</label>
    <textarea id="job_description" name="job_description"></textarea>
    <p>
      <label for="resume">Upload your resume (PDF)...</label>
      <input type="file" id="resume" name="resume" accept=".pdf,application/pdf">
    </p>
    <p id="upload-status" class="success" hidden>PDF Uploaded Successfully</p>
    <p class="actions">
      <button type="button" data-action="review">Analyze Resume</button>
      <button type="button" data-action="match">Calculate Match %</button>
    </p>
  </form>
  <h2 id="heading"></h2>
  <div id="output"></div>
  <script>
    const form = document.getElementById("analysis-form");
    const resume = document.getElementById("resume");
    const heading = document.getElementById("heading");
    const output = document.getElementById("output");

    resume.addEventListener("change", () => {
      document.getElementById("upload-status").hidden = resume.files.length === 0;
    });

    const show = (title, text, cls) => {
      heading.textContent = title;
      output.textContent = text;
      output.className = cls;
    };

    for (const button of form.querySelectorAll("button[data-action]")) {
      button.addEventListener("click", async () => {
        if (resume.files.length === 0) {
          show("", "Please upload a resume first", "warning");
          return;
        }
        show("", button.dataset.action === "review"
          ? "Analyzing resume..." : "Calculating match percentage...", "");
        const response = await fetch(`/api/v1/analysis/${button.dataset.action}`, {
          method: "POST",
          body: new FormData(form),
        });
        const body = await response.json()
          .catch(() => ({ error: { message: response.statusText } }));
        if (response.ok) {
          show(body.heading, body.text, "");
        } else {
          const { message, hint } = body.error;
          show("", hint ? `${message}\n${hint}` : message, hint ? "error" : "warning");
        }
      });
    }
  </script>
</body>
</html>
"#;
