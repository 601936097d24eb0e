//! HTML conversion utilities
//!
//! Two converters share one structural pass:
//!
//! - [`html_to_text`] produces clean plain text.
//! - [`html_to_escaped_markdown`] produces Telegram MarkdownV2 with the
//!   supported inline tags mapped to emphasis and anchors mapped to links.
//!
//! Both are tree-less: every step is a regex rewrite over the whole string.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Characters MarkdownV2 treats as syntax
const MARKDOWN_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

// Emphasis markers travel through escaping as private-use placeholders.
const BOLD: char = '\u{E000}';
const ITALIC: char = '\u{E001}';
const STRIKE: char = '\u{E002}';
const CODE: char = '\u{E003}';
const PLACEHOLDERS: [char; 4] = [BOLD, ITALIC, STRIKE, CODE];

static PARAGRAPH_THEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>\s*<br\s*/?>").expect("valid regex"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

static PARAGRAPH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>").expect("valid regex"));

static PARAGRAPH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>").expect("valid regex"));

/// Comments and anything tag-shaped; a bare `<` in prose is not a tag
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^<>]*>").expect("valid regex"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>(.*?)</a\s*>"#)
        .expect("valid regex")
});

/// An anchor after the escape pass: `\[` label `\]\(` url `\)`. Label and
/// url were escaped twice, so every backslash in them starts a four
/// character unit (`\\\x`) and a lone `\)` can only be the delimiter.
static ESCAPED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\\\[((?:\\\\\\.|[^\\])*?)\\\]\\\(((?:\\\\\\.|[^\\])*?)\\\)")
        .expect("valid regex")
});

/// Inline tags in application order; each only closes with its own name
static EMPHASIS: LazyLock<Vec<(Regex, char)>> = LazyLock::new(|| {
    [
        ("strong", BOLD),
        ("b", BOLD),
        ("em", ITALIC),
        ("i", ITALIC),
        ("del", STRIKE),
        ("code", CODE),
    ]
    .into_iter()
    .map(|(tag, marker)| {
        let pattern = format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>");
        (Regex::new(&pattern).expect("valid regex"), marker)
    })
    .collect()
});

static URL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

/// Convert HTML to plain text
///
/// Line-break and paragraph tags become newlines, every other tag is
/// dropped, entities are decoded and runs of blank lines collapse to one.
///
/// Re-running it on its own output is a no-op, except when entities decoded
/// into tag-shaped text (`&lt;div&gt;`): a second pass strips that text.
pub fn html_to_text(html: &str) -> String {
    let text = break_lines(html);
    let text = TAG.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);
    collapse_blank_lines(&text)
}

/// Convert HTML to escaped Telegram MarkdownV2
///
/// `strong`/`b`, `em`/`i`, `del` and `code` become emphasis and anchors
/// become `[label](url)`; everything else is escaped so it renders
/// literally. Nested tags of the same name close at the first closing tag.
pub fn html_to_escaped_markdown(html: &str) -> String {
    let text = html.replace(&PLACEHOLDERS[..], "");
    let mut text = break_lines(&text);

    for (pattern, marker) in EMPHASIS.iter() {
        text = pattern
            .replace_all(&text, |caps: &Captures| {
                let inner = &caps[1];
                if inner.trim().is_empty() {
                    inner.to_string()
                } else {
                    format!("{marker}{inner}{marker}")
                }
            })
            .into_owned();
    }

    let text = ANCHOR.replace_all(&text, |caps: &Captures| {
        let href = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let url = html_escape::decode_html_entities(href).into_owned();
        let label = TAG.replace_all(&caps[3], "");
        let label = html_escape::decode_html_entities(&label);
        let label = match label.trim() {
            "" => url.as_str(),
            trimmed => trimmed,
        };
        format!("[{}]({})", escape_markdown(label), escape_markdown(&url))
    });

    let text = TAG.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text);
    let text = collapse_blank_lines(&text);

    let escaped = escape_markdown(&text);
    let linked = ESCAPED_LINK.replace_all(&escaped, |caps: &Captures| {
        format!("[{}]({})", unescape_once(&caps[1]), unescape_once(&caps[2]))
    });

    restore_emphasis(&linked)
}

/// Escape every MarkdownV2 reserved character with a backslash
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Extract every http(s) URL from free text, in order of appearance
pub fn extract_links(text: &str) -> Vec<String> {
    URL_RUN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Structural pass shared by both converters
fn break_lines(html: &str) -> String {
    let text = PARAGRAPH_THEN_BREAK.replace_all(html, "\n");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = PARAGRAPH_CLOSE.replace_all(&text, "\n");
    PARAGRAPH_OPEN.replace_all(&text, "").into_owned()
}

/// Collapse blank-line runs into a single blank line and trim
fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n\n").trim().to_string()
}

/// Remove one level of backslash escaping
fn unescape_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn restore_emphasis(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            BOLD => '*',
            ITALIC => '_',
            STRIKE => '~',
            CODE => '`',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_paragraph_then_break() {
        assert_eq!(
            html_to_text("<p>Hello <b>world</b></p><br>Bye"),
            "Hello world\nBye"
        );
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        assert_eq!(html_to_text("<p>one</p><p>two</p>"), "one\ntwo");
        assert_eq!(html_to_text("<p class=\"lead\">hi</p>"), "hi");
        assert_eq!(html_to_text("<P>upper</P><BR/>case"), "upper\ncase");
    }

    #[test]
    fn test_html_to_text_line_breaks() {
        assert_eq!(html_to_text("a<br>b<br/>c<br />d"), "a\nb\nc\nd");
    }

    #[test]
    fn test_html_to_text_collapses_blank_lines() {
        assert_eq!(html_to_text("a<br><br><br><br>b"), "a\n\nb");
        assert_eq!(html_to_text("a\n  \n\n \nb"), "a\n\nb");
        // A single blank line is kept
        assert_eq!(html_to_text("a<br><br>b"), "a\n\nb");
    }

    #[test]
    fn test_html_to_text_trims() {
        assert_eq!(html_to_text("  <p>  padded  </p>  "), "padded");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_html_to_text_entities() {
        assert_eq!(
            html_to_text("&lt;3 &amp; &quot;x&quot; &#39;y&#39; &#x41;"),
            "<3 & \"x\" 'y' A"
        );
    }

    #[test]
    fn test_html_to_text_keeps_bare_angle_brackets() {
        assert_eq!(html_to_text("5 &lt; 6 and 7 &gt; 3"), "5 < 6 and 7 > 3");
        assert_eq!(html_to_text("5 < 6 and 7 > 3"), "5 < 6 and 7 > 3");
    }

    #[test]
    fn test_html_to_text_mastodon_mention() {
        let html = r#"<p>Hi <span class="h-card"><a href="https://m.example/@bob" class="u-url mention">@<span>bob</span></a></span>!</p>"#;
        assert_eq!(html_to_text(html), "Hi @bob!");
    }

    #[test]
    fn test_html_to_text_no_tags_left() {
        let html = r#"<p>a <b>b</b> <i>c</i> <code>d</code> <del>e</del> <a href="https://x.y">f</a><!-- note --></p>"#;
        let text = html_to_text(html);
        assert!(!text.contains('<'));
        assert!(!text.contains('>'));
        for word in ["a", "b", "c", "d", "e", "f"] {
            assert_eq!(text.matches(word).count(), 1, "{word} in {text:?}");
        }
    }

    #[test]
    fn test_html_to_text_idempotent() {
        let inputs = [
            "<p>Hello <b>world</b></p><br>Bye",
            "<p>one</p><p>two</p><p></p><p>three</p>",
            "a<br><br><br>b &amp; c",
            "  spaced \n\n\n text  ",
            "<p>5 &lt; 6</p>",
        ];
        for input in inputs {
            let once = html_to_text(input);
            assert_eq!(html_to_text(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_html_to_text_entity_encoded_tag() {
        let once = html_to_text("<p>use &lt;div&gt; here</p>");
        assert_eq!(once, "use <div> here");
        // Decoded tag text is not protected from a second pass
        assert_eq!(html_to_text(&once), "use  here");
    }

    #[test]
    fn test_markdown_link_escaping() {
        let md = html_to_escaped_markdown(r#"<a href="https://e.com/?a=b_c">Label*1</a>"#);
        assert_eq!(md, r"[Label\*1](https://e\.com/?a\=b\_c)");
        assert!(!md.contains(r"\["));
        assert!(!md.contains(r"\\"));
    }

    #[test]
    fn test_markdown_link_entities() {
        let md = html_to_escaped_markdown(
            r#"<a href="https://x.io/?a=1&amp;z=2" rel="nofollow">Tom &amp; Jerry</a>"#,
        );
        assert_eq!(md, r"[Tom & Jerry](https://x\.io/?a\=1&z\=2)");
    }

    #[test]
    fn test_markdown_link_label_with_spans() {
        let html = r#"<a href="https://ex.com/p"><span class="invisible">https://</span><span>ex.com/p</span></a>"#;
        assert_eq!(
            html_to_escaped_markdown(html),
            r"[https://ex\.com/p](https://ex\.com/p)"
        );
    }

    #[test]
    fn test_markdown_empty_label_uses_url() {
        assert_eq!(
            html_to_escaped_markdown(r#"<a href="https://a.b"></a>"#),
            r"[https://a\.b](https://a\.b)"
        );
    }

    #[test]
    fn test_markdown_label_with_brackets() {
        let md = html_to_escaped_markdown(r#"see <a href="https://a.b/(x)">[tag](1)</a> now."#);
        assert_eq!(md, r"see [\[tag\]\(1\)](https://a\.b/\(x\)) now\.");
    }

    #[test]
    fn test_markdown_emphasis() {
        let html = "<p><strong>bold</strong> and <em>it</em>, <del>gone</del> <code>x.y</code></p>";
        assert_eq!(
            html_to_escaped_markdown(html),
            r"*bold* and _it_, ~gone~ `x\.y`"
        );
        assert_eq!(html_to_escaped_markdown("<b>b</b><i>i</i>"), "*b*_i_");
    }

    #[test]
    fn test_markdown_emphasis_same_tag_pairs() {
        // strong closes only with strong
        assert_eq!(html_to_escaped_markdown("<strong>a</em> b</strong>"), "*a b*");
        // nested identical tags close early
        assert_eq!(
            html_to_escaped_markdown("<b>bold <b>nested</b></b>"),
            "*bold nested*"
        );
    }

    #[test]
    fn test_markdown_empty_emphasis_dropped() {
        assert_eq!(html_to_escaped_markdown("a<b> </b>b"), "a b");
    }

    #[test]
    fn test_markdown_escapes_prose() {
        assert_eq!(
            html_to_escaped_markdown("<p>1+1=2. Done!</p>"),
            r"1\+1\=2\. Done\!"
        );
        assert_eq!(html_to_escaped_markdown("a &amp; b &lt; c"), "a & b < c");
        assert_eq!(html_to_escaped_markdown("*not bold*"), r"\*not bold\*");
    }

    #[test]
    fn test_markdown_structure() {
        assert_eq!(
            html_to_escaped_markdown("<p>one</p><p>two</p><br><br><br>three"),
            "one\ntwo\n\nthree"
        );
    }

    #[test]
    fn test_markdown_literal_link_shape_in_prose_is_restored() {
        // Prose that already looks like a link comes out as one
        assert_eq!(html_to_escaped_markdown("see [a](b)"), "see [a](b)");
    }

    #[test]
    fn test_markdown_strips_placeholder_input() {
        assert_eq!(html_to_escaped_markdown("\u{E000}x\u{E003}"), "x");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(
            escape_markdown(r"a_b*c[d]e(f)g~h`i>j#k+l-m=n|o{p}q.r!s\t"),
            r"a\_b\*c\[d\]e\(f\)g\~h\`i\>j\#k\+l\-m\=n\|o\{p\}q\.r\!s\\t"
        );
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn test_unescape_once() {
        assert_eq!(unescape_once(r"a\\\.b"), r"a\.b");
        assert_eq!(unescape_once(r"\*x\*"), "*x*");
    }

    #[test]
    fn test_extract_links() {
        let text = "see https://a.booru.org/1 and http://x.y/z?q=1\nnext https://m.s/@a/2";
        assert_eq!(
            extract_links(text),
            vec![
                "https://a.booru.org/1".to_string(),
                "http://x.y/z?q=1".to_string(),
                "https://m.s/@a/2".to_string(),
            ]
        );
        assert!(extract_links("no links here").is_empty());
    }
}
