//! The single HTML page the annotator works in. The page only lists the
//! tag vocabulary; `/static/app.js` drives it through the JSON endpoints.

pub fn render_index(tags: &[String]) -> String {
    let mut buttons = String::new();
    for tag in tags {
        let tag = escape_html(tag);
        buttons.push_str(&format!(
            "      <button class=\"tag-button\" data-tag=\"{tag}\">{tag}</button>\n"
        ));
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Video Tagger</title>
    <link rel="stylesheet" href="/static/style.css">
  </head>
  <body>
    <div id="stats"></div>
    <video id="player" controls autoplay></video>
    <p id="filename"></p>
    <div id="tags">
{buttons}    </div>
    <script src="/static/app.js"></script>
  </body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
