//! HTML for the form and the result page. All user-facing text goes
//! through [`escape_html`].

use knowbatch_html::escape_html;

const STYLE: &str = r#"body { font-family: Arial, Helvetica, sans-serif; margin: 40px; color: #333; }
textarea { width: 100%; height: 180px; }
pre { white-space: pre-wrap; background-color: #f7f7f7; padding: 16px; border: 1px solid #ddd; }
.error { color: #b00020; }"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    )
}

/// The upload form, with `default_prompt` prefilled.
pub fn index_page(default_prompt: &str) -> String {
    let body = format!(
        r#"<form action="/report" method="post" enctype="multipart/form-data">
<p><label>CSV file (optional): <input type="file" name="csv_file" accept=".csv"></label></p>
<p><label>Prompt:<br><textarea name="user_prompt">{}</textarea></label></p>
<p><button type="submit">Generate report</button></p>
</form>"#,
        escape_html(default_prompt)
    );
    layout("Knowledge Learning Report", &body)
}

/// Shows the model's reply and links every file under `/download/`.
pub fn result_page(response_text: &str, files: &[String], pdf_error: Option<&str>) -> String {
    let mut body = String::from("<h2>Downloads</h2>\n<ul>\n");
    for file in files {
        let file = escape_html(file);
        body.push_str(&format!(
            "<li><a href=\"/download/{file}\">{file}</a></li>\n"
        ));
    }
    body.push_str("</ul>\n");
    if let Some(error) = pdf_error {
        body.push_str(&format!(
            "<p class=\"error\">PDF generation failed: {}</p>\n",
            escape_html(error)
        ));
    }
    body.push_str(&format!(
        "<h2>Model reply</h2>\n<pre>{}</pre>\n<p><a href=\"/\">Back</a></p>",
        escape_html(response_text)
    ));
    layout("Report Result", &body)
}
