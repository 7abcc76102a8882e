use habr_renderer::{ConvertError, HeadingShift, HighlightMode, Pipeline, PipelineOptions};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn convert(markdown: &str) -> String {
    convert_with(markdown, PipelineOptions::default()).unwrap()
}

fn convert_with(markdown: &str, options: PipelineOptions) -> Result<String, ConvertError> {
    Pipeline::new(&options)?.convert(markdown)
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Check that highlighted markup only uses the allowed tags, properly nested.
fn assert_balanced(markup: &str) {
    let mut stack = Vec::new();
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        let end = start + rest[start..].find('>').unwrap();
        let tag = &rest[start + 1..end];
        rest = &rest[end + 1..];

        if tag == "br/" {
            continue;
        }
        if let Some(name) = tag.strip_prefix('/') {
            assert_eq!(stack.pop(), Some(name.to_owned()), "in {markup}");
        } else {
            let name = tag.split_whitespace().next().unwrap().to_owned();
            assert!(["font", "b", "i", "u"].contains(&name.as_str()), "tag {name}");
            stack.push(name);
        }
    }
    assert!(stack.is_empty(), "unclosed {stack:?} in {markup}");
}

#[test]
fn test_cut_text_round_trips() {
    let text = r#"Read <more> & "quotes" 'too'"#;
    let html = convert(&format!("Teaser\n\n-x- {text}\n\nBody\n"));

    let start = html.find("<habracut text=\"").unwrap() + "<habracut text=\"".len();
    let end = start + html[start..].find("\"/>").unwrap();
    assert_eq!(unescape(&html[start..end]), text);
}

#[test]
fn test_bare_cut() {
    assert_eq!(
        convert("Teaser\n\n-X-----\n\nBody\n"),
        "<p>Teaser</p>\n<habracut/>\n<p>Body</p>"
    );
}

#[test]
fn test_cut_inside_fence_untouched() {
    assert_eq!(convert("```\n-x- keep\n```\n"), "<pre>-x- keep\n</pre>");
}

#[test]
fn test_headings_shifted_at_depth() {
    let html = convert("# Top\n\n> ## Quoted\n\n- ### Listed\n");
    assert!(html.contains("<h2>Top</h2>"), "{html}");
    assert!(html.contains("<h3>Quoted</h3>"), "{html}");
    assert!(html.contains("<h4>Listed</h4>"), "{html}");
    assert!(!html.contains("<h1>"), "{html}");
}

#[test]
fn test_top_three_heading_table() {
    let options = PipelineOptions {
        heading_shift: HeadingShift::TopThree,
        ..PipelineOptions::default()
    };
    assert_eq!(
        convert_with("# A\n\n#### D\n", options).unwrap(),
        "<h4>A</h4>\n<h4>D</h4>"
    );
}

#[test]
fn test_external_image_untouched() {
    assert_eq!(
        convert("![shot](http://example.com/a.png)\n"),
        "<p><img alt=\"shot\" src=\"http://example.com/a.png\"/></p>"
    );
}

#[test]
fn test_local_image_relocated() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("foo.address"), "thumbA\npageA\n").unwrap();
    let options = PipelineOptions {
        image_base_dir: dir.path().to_path_buf(),
        ..PipelineOptions::default()
    };

    assert_eq!(
        convert_with("![shot](foo \"Title\")\n", options).unwrap(),
        "<p><a href=\"pageA\"><img src=\"thumbA\"/></a></p>"
    );
}

#[test]
fn test_missing_side_file_aborts() {
    let dir = TempDir::new().unwrap();
    let options = PipelineOptions {
        image_base_dir: dir.path().to_path_buf(),
        ..PipelineOptions::default()
    };

    let result = convert_with("Text\n\n![shot](missing.png)\n", options);
    assert!(matches!(result, Err(ConvertError::MalformedSideFile { .. })));
}

#[test]
fn test_python_block_highlighted() {
    let html = convert("```\n@python@\ndef f(x):\n    return x + 1  # inc\n```\n");

    let markup = html
        .strip_prefix("<blockquote>")
        .and_then(|rest| rest.strip_suffix("</blockquote>"))
        .unwrap();
    assert!(!markup.contains("@python@"));
    assert!(markup.contains("<font color=\"#"));
    assert!(markup.contains("<br/>"));
    assert_balanced(markup);
}

#[test]
fn test_indented_block_highlighted() {
    let html = convert("Code:\n\n    @ python @\n    print(1)\n");
    assert!(html.starts_with("<p>Code:</p>\n<blockquote>"), "{html}");
    assert!(!html.contains('@'), "{html}");
}

#[test]
fn test_escaped_marker() {
    assert_eq!(
        convert("```\n\\@python@\nx = 1\n```\n"),
        "<pre>@python@\nx = 1\n</pre>"
    );
}

#[test]
fn test_unknown_language() {
    let result = convert_with("```\n@nosuchlang@\nx\n```\n", PipelineOptions::default());
    assert!(matches!(result, Err(ConvertError::UnknownLanguage(lang)) if lang == "nosuchlang"));
}

#[test]
fn test_native_mode() {
    let options = PipelineOptions {
        highlight_mode: HighlightMode::Native,
        ..PipelineOptions::default()
    };
    assert_eq!(
        convert_with("```\n@python@\nif a < b: pass\n```\n\n```\nplain\n```\n", options).unwrap(),
        "<source lang=\"python\">if a &lt; b: pass\n</source>\n<source lang=\"plain\">plain\n</source>"
    );
}

#[test]
fn test_inline_patterns() {
    assert_eq!(
        convert("Hi @alice, ~~gone~~ but \\~~kept~~\n"),
        "<p>Hi <hh user=\"alice\"/>, <s>gone</s> but ~~kept~~</p>"
    );
}

#[test]
fn test_strike_spans_emphasis() {
    assert_eq!(convert("~~a *b* c~~\n"), "<p><s>a <em>b</em> c</s></p>");
}

#[test]
fn test_patterns_not_applied_in_code() {
    assert_eq!(
        convert("`@alice ~~x~~`\n"),
        "<p><code>@alice ~~x~~</code></p>"
    );
}

#[test]
fn test_autolinks_not_patterned() {
    assert_eq!(
        convert("<user@example.com> and <http://x/@bob>\n"),
        "<p><a href=\"mailto:user@example.com\">user@example.com</a> and \
         <a href=\"http://x/@bob\">http://x/@bob</a></p>"
    );
}

#[test]
fn test_convert_bytes() {
    let mut pipeline = Pipeline::new(&PipelineOptions::default()).unwrap();
    assert_eq!(
        pipeline.convert_bytes("Привет, @мир\n".as_bytes()).unwrap(),
        "<p>Привет, @мир</p>"
    );
    assert!(matches!(
        pipeline.convert_bytes(&[0xff, 0xfe]),
        Err(ConvertError::MalformedInputEncoding(_))
    ));
}
