use html_escape::encode_text;

pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Full-page view of a generated document.
///
/// A complete HTML document is returned untouched. A fragment is placed in a
/// small shell that loads Tailwind. The markup itself is never sanitized.
pub fn standalone_page(document: &str, idea: &str) -> String {
    if is_full_document(document) {
        return document.to_string();
    }

    let title = if idea.trim().is_empty() {
        "AI PageCraft Preview".to_string()
    } else {
        format!("{} | AI PageCraft Preview", encode_text(idea.trim()))
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <script src="{TAILWIND_CDN}"></script>
</head>
<body>
{document}
</body>
</html>
"#
    )
}

fn is_full_document(document: &str) -> bool {
    let head: String = document
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}
