use regex::{Captures, Regex};

/// Matches `[answer]` with an optional `(hint)` directly behind it. Unbalanced
/// brackets never match and therefore pass through untouched.
const CLOZE_PATTERN: &str = r"\[([^\[\]]*)\](?:\(([^()]*)\))?";

/// Escapes text for embedding in markup attributes or inline content.
/// `&` must be first so already-produced entities are not double-escaped.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Rewrites every cloze-like span in `text` with the given per-match
/// transformer. Pure `text -> text`; anything the pattern does not match is
/// copied through unchanged.
pub fn rewrite_clozes<F>(text: &str, transform: F) -> String
where
    F: FnMut(&Captures) -> String,
{
    let re = Regex::new(CLOZE_PATTERN).unwrap();
    re.replace_all(text, transform).into_owned()
}

/// Default transformer: a clickable placeholder carrying the concealed answer
/// and, when present and non-empty after escaping, the hint as a title.
pub fn cloze_span(caps: &Captures) -> String {
    let answer = escape_html(&caps[1]);
    let hint = caps
        .get(2)
        .map(|m| escape_html(m.as_str()))
        .unwrap_or_default();
    if hint.is_empty() {
        format!(
            "<span class=\"cloze\" onclick=\"revealCloze(this)\" data-original=\"{}\">[…]</span>",
            answer
        )
    } else {
        format!(
            "<span class=\"cloze\" onclick=\"revealCloze(this)\" title=\"{}\" data-original=\"{}\">[…]</span>",
            hint, answer
        )
    }
}

/// Prefixes speaker turns at line starts with a break marker so the rendered
/// document shows one turn per visual line.
pub fn break_speaker_lines(text: &str) -> String {
    let re = Regex::new(r"(?m)^(A:|B:)").unwrap();
    re.replace_all(text, "<br>$1").into_owned()
}

#[cfg(test)]
fn unescape_html(text: &str) -> String {
    text.replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

#[test]
fn test_escape_round_trip() {
    let input = r#"Tom & Jerry <sagen> "nie" 'nigdy'"#;
    let escaped = escape_html(input);

    assert!(!escaped.contains('<'));
    assert!(!escaped.contains('"'));
    assert_eq!(unescape_html(&escaped), input);
}

#[test]
fn test_bracket_only_span_conceals_answer() {
    let out = rewrite_clozes("Hallo [Cześć]!", cloze_span);
    assert_eq!(
        out,
        "Hallo <span class=\"cloze\" onclick=\"revealCloze(this)\" data-original=\"Cześć\">[…]</span>!"
    );
}

#[test]
fn test_answer_hint_span_carries_title() {
    let out = rewrite_clozes("[powoli](slowly)", cloze_span);
    assert_eq!(
        out,
        "<span class=\"cloze\" onclick=\"revealCloze(this)\" title=\"slowly\" data-original=\"powoli\">[…]</span>"
    );
}

#[test]
fn test_empty_hint_is_omitted() {
    let out = rewrite_clozes("[powoli]()", cloze_span);
    assert!(!out.contains("title="));
    assert!(out.contains("data-original=\"powoli\""));
}

#[test]
fn test_answer_is_escaped_in_attribute() {
    let out = rewrite_clozes(r#"[x < "y" & z]"#, cloze_span);
    assert!(out.contains("data-original=\"x &lt; &quot;y&quot; &amp; z\""));
}

#[test]
fn test_unbalanced_bracket_passes_through_unchanged() {
    let input = "odd [bracket without close";
    assert_eq!(rewrite_clozes(input, cloze_span), input);
}

#[test]
fn test_speaker_turns_get_line_breaks() {
    let story = "A: Hallo [Cześć]\nB: Hallo [Cześć]";
    assert_eq!(
        break_speaker_lines(story),
        "<br>A: Hallo [Cześć]\n<br>B: Hallo [Cześć]"
    );
}

#[test]
fn test_mid_line_speaker_tag_is_left_alone() {
    let story = "A: sagt B: nichts";
    assert_eq!(break_speaker_lines(story), "<br>A: sagt B: nichts");
}
