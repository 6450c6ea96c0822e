//! Markdown to HTML fragment conversion.
//!
//! Uses [pulldown-cmark](https://docs.rs/pulldown-cmark) with the common
//! extensions enabled. The conversion is pure: bytes in, HTML string out,
//! no I/O and no error surface. Invalid UTF-8 is replaced rather than
//! rejected so a stray byte cannot fail an article.

use pulldown_cmark::{Options, Parser, html as md_html};

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Render markdown source to an HTML fragment.
pub fn render_markdown(source: &[u8]) -> String {
    let text = String::from_utf8_lossy(source);
    let parser = Parser::new_ext(&text, options());
    let mut body_html = String::with_capacity(text.len() * 3 / 2);
    md_html::push_html(&mut body_html, parser);
    body_html
}
