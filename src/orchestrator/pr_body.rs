use chrono::NaiveDate;
use serde::Serialize;

use crate::{Result, entry::ProposedFile, orchestrator::types::Report};

const PR_BODY_TEMPLATE: &str = r#"## Changelog sync {{ date }}

{% if files | length > 0 -%}
This PR adds {{ files | length }} changelog {% if files | length == 1 %}entry{% else %}entries{% endif %}:

{% for file in files -%}
- `{{ file.path }}`
{% endfor %}
{%- else -%}
No new changelog entries.
{%- endif %}

| Processed | Included | Skipped | Errors |
| --- | --- | --- | --- |
| {{ report.stats.totalProcessed }} | {{ report.stats.includedCount }} | {{ report.stats.skippedCount }} | {{ report.stats.errorCount }} |
{% if report.skipped | length > 0 %}
<details>
<summary>Skipped ({{ report.skipped | length }})</summary>

{% for item in report.skipped -%}
- {{ item.kind }} `{{ item.repo }}` {{ item.id }}: {{ item.reason }}
{% endfor %}
</details>
{% endif -%}
{% if report.errors | length > 0 %}
<details>
<summary>Errors ({{ report.errors | length }})</summary>

{% for item in report.errors -%}
- {{ item.kind }} `{{ item.repo }}` {{ item.id }}: {{ item.reason }}
{% endfor %}
</details>
{% endif -%}
"#;

#[derive(Serialize)]
struct PrBodyContext<'a> {
    date: String,
    files: &'a [ProposedFile],
    report: &'a Report,
}

pub fn pr_title(date: NaiveDate) -> String {
    format!("docs(changelog): sync updates for {date}")
}

/// Render the changelog pull request description.
pub fn render_pr_body(
    date: NaiveDate,
    files: &[ProposedFile],
    report: &Report,
) -> Result<String> {
    let mut tera = tera::Tera::default();
    tera.add_raw_template("pr_body", PR_BODY_TEMPLATE)?;

    let context = tera::Context::from_serialize(PrBodyContext {
        date: date.to_string(),
        files,
        report,
    })?;

    Ok(tera.render("pr_body", &context)?)
}
