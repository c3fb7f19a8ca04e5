//! Output cleanup for chat-platform replies.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static DECORATIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[•◆◇○●■□▲▼▶◀★☆→←↑↓※§¤†‡¶©®™✓✔✗✘☑☒☓☠☢☣☤☥☦☧☨☩☪☫☬☭☮☯☸☹☺☻☼☽☾♠♣♥♦♪♫♭♯⚡☀☁☂☃☄\x{2500}-\x{25FF}\x{2700}-\x{27BF}]+")
        .expect("decoration regex")
});

#[allow(clippy::expect_used)]
static EMPHASIS_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#*]{2,}").expect("emphasis regex"));

#[allow(clippy::expect_used)]
static HEADER_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s*").expect("header regex"));

#[allow(clippy::expect_used)]
static IMAGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").expect("image regex"));

#[allow(clippy::expect_used)]
static LINKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));

#[allow(clippy::expect_used)]
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line regex"));

/// Strip decoration and convert Markdown to chat-platform markup.
///
/// Images are removed before links are rewritten so `![alt](url)` never turns
/// into a dangling `!<url|alt>`.
pub fn clean_output(text: &str) -> String {
    let text = DECORATIONS.replace_all(text, "");
    let text = text.replace("```", "");
    let text = EMPHASIS_RUNS.replace_all(&text, "");
    let text = HEADER_MARKS.replace_all(&text, "");
    let text = IMAGES.replace_all(&text, "");
    let text = LINKS.replace_all(&text, "<$2|$1>");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}
