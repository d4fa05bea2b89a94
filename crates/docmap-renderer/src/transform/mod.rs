//! Markup sanitization pipeline.
//!
//! [`transform`] rewrites untrusted markdown/MDX text into a form a component
//! compiler accepts. Code regions are protected first and restored last, so
//! nothing inside a code fence, indented block, `<pre>` or code span is ever
//! touched. Rules run in a fixed order; reordering them changes the result.
//!
//! The pipeline is idempotent: `transform(transform(x)) == transform(x)`.

mod protect;
mod rules;
pub(crate) mod tags;

use std::fmt;

use serde::Serialize;

use self::protect::Protected;

/// Upper bound on sanitizing passes before the text is accepted as-is.
const MAX_PASSES: usize = 32;

/// One rewrite rule of the pipeline, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// `\{{` style delimiters turned into entities.
    EscapedDelimiters,
    /// Templating regions removed.
    Templating,
    /// Comments, scripts and styles removed.
    CommentsScriptsStyles,
    /// Event-handler and `style` attributes removed.
    UnsafeAttributes,
    /// Unquoted `href`/`src` values quoted.
    QuotedUrls,
    /// Void elements self-closed.
    VoidElements,
    /// Pseudo-tags escaped.
    PseudoTags,
    /// Attributes renamed to component syntax.
    AttributeNames,
    /// Paragraphs around block content turned into divs.
    BlockParagraphs,
}

impl Rule {
    /// Every rule in application order.
    pub const ALL: [Self; 9] = [
        Self::EscapedDelimiters,
        Self::Templating,
        Self::CommentsScriptsStyles,
        Self::UnsafeAttributes,
        Self::QuotedUrls,
        Self::VoidElements,
        Self::PseudoTags,
        Self::AttributeNames,
        Self::BlockParagraphs,
    ];

    fn apply(self, text: &str) -> String {
        match self {
            Self::EscapedDelimiters => rules::escaped_delimiters(text),
            Self::Templating => rules::templating(text),
            Self::CommentsScriptsStyles => rules::comments_scripts_styles(text),
            Self::UnsafeAttributes => rules::unsafe_attributes(text),
            Self::QuotedUrls => rules::quote_urls(text),
            Self::VoidElements => rules::void_elements(text),
            Self::PseudoTags => rules::pseudo_tags(text),
            Self::AttributeNames => rules::attribute_names(text),
            Self::BlockParagraphs => rules::block_paragraphs(text),
        }
    }

    /// Short identifier used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EscapedDelimiters => "escaped-delimiters",
            Self::Templating => "templating",
            Self::CommentsScriptsStyles => "comments-scripts-styles",
            Self::UnsafeAttributes => "unsafe-attributes",
            Self::QuotedUrls => "quoted-urls",
            Self::VoidElements => "void-elements",
            Self::PseudoTags => "pseudo-tags",
            Self::AttributeNames => "attribute-names",
            Self::BlockParagraphs => "block-paragraphs",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules that changed the text during one transform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    fired: Vec<Rule>,
}

impl TransformReport {
    fn record(&mut self, rule: Rule) {
        if !self.fired.contains(&rule) {
            self.fired.push(rule);
            self.fired.sort();
        }
    }

    /// Rules that fired, in application order.
    #[must_use]
    pub fn fired(&self) -> &[Rule] {
        &self.fired
    }

    /// True if the input passed through unchanged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fired.is_empty()
    }

    /// True if `rule` fired.
    #[must_use]
    pub fn has(&self, rule: Rule) -> bool {
        self.fired.contains(&rule)
    }
}

/// Sanitized document text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedDocument {
    text: String,
    report: TransformReport,
}

impl TransformedDocument {
    /// Sanitized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the sanitized text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Rules that changed the text.
    #[must_use]
    pub fn report(&self) -> &TransformReport {
        &self.report
    }
}

/// Sanitize raw document text.
///
/// Passes repeat until one leaves the text unchanged, so the result is a
/// fixed point and transforming it again is a no-op.
#[must_use]
pub fn transform(raw: &str) -> TransformedDocument {
    let mut report = TransformReport::default();
    let mut text = raw.to_owned();
    for _ in 0..MAX_PASSES {
        let next = sanitize_pass(&text, &mut report);
        if next == text {
            break;
        }
        text = next;
    }

    if !report.is_clean() {
        tracing::trace!(
            rules = ?report.fired().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            "Sanitized document"
        );
    }
    TransformedDocument { text, report }
}

/// Protect code regions, apply every rule once, restore.
///
/// Removing markup can expose code regions that were not there before, so
/// each pass tokenizes its own input afresh.
fn sanitize_pass(text: &str, report: &mut TransformReport) -> String {
    let protected = Protected::new(text);
    let mut working = protected.text.clone();
    for rule in Rule::ALL {
        let rewritten = rule.apply(&working);
        if rewritten != working {
            report.record(rule);
            working = rewritten;
        }
    }
    protected.restore(&working)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn sanitize(raw: &str) -> String {
        transform(raw).into_string()
    }

    #[test]
    fn test_clean_input_unchanged() {
        let raw = "# Title\n\nSome *text* with a [link](/a).\n";
        let doc = transform(raw);

        assert_eq!(doc.as_str(), raw);
        assert!(doc.report().is_clean());
    }

    #[test]
    fn test_fenced_script_survives_unfenced_removed() {
        let raw = "```html\n<script>alert(1)</script>\n```\n\n<script>alert(1)</script>\n";

        assert_eq!(sanitize(raw), "```html\n<script>alert(1)</script>\n```\n\n\n");
    }

    #[test]
    fn test_code_span_content_preserved() {
        let raw = "Use `{{ name }}` or `<br>` in templates. {{ gone }}\n";

        assert_eq!(sanitize(raw), "Use `{{ name }}` or `<br>` in templates. \n");
    }

    #[test]
    fn test_pre_block_preserved() {
        let raw = "<pre>\n<your_name> {{ x }}\n</pre>\n";

        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_unterminated_script_keeps_later_code() {
        let raw = "Run <script>var a; `<b>keep</b>` later\n";

        assert_eq!(sanitize(raw), "Run `<b>keep</b>`");
    }

    #[test]
    fn test_full_pipeline() {
        let raw = concat!(
            "<!-- draft -->\n",
            "<p align=\"center\"><img src=logo.png class=\"hero\" onload=\"x()\"></p>\n",
            "<p><iframe src=\"https://x\" allowfullscreen=\"true\" frameborder=\"0\"></iframe></p>\n",
            "Replace <your_token> when a <5 limit applies.\n",
        );

        assert_eq!(
            sanitize(raw),
            concat!(
                "\n",
                "<p align=\"center\"><img src=\"logo.png\" className=\"hero\" /></p>\n",
                "<div><iframe src=\"https://x\" allowFullScreen frameBorder=\"0\"></iframe></div>\n",
                "Replace &lt;your_token&gt; when a &lt;5 limit applies.\n",
            )
        );
    }

    #[test]
    fn test_report_lists_fired_rules() {
        let doc = transform("<br> {{ x }}");

        assert_eq!(doc.report().fired(), &[Rule::Templating, Rule::VoidElements]);
        assert!(doc.report().has(Rule::VoidElements));
    }

    #[test]
    fn test_idempotent_on_messy_input() {
        let inputs = [
            "<p><p><div>x</div></p></p>",
            "{<!-- -->{ x }}",
            "a <scr{{ x }}ipt>alert(1)</script> b",
            "<x-card>\n\n`code` <br>\n\n    indented <b>\n</x-card>\n",
            "\\{{ keep \\}} {% drop %} <input disabled=\"\" maxlength=3>",
            "<foo-bar> </foo-bar> <baz-qux> </lonely-one> <a href=x onclick=y>",
        ];
        for raw in inputs {
            let once = sanitize(raw);
            let twice = sanitize(&once);
            assert_eq!(twice, once, "not idempotent for {raw:?}");
        }
    }

    fn assert_stable(raw: &str) {
        let once = sanitize(raw);
        assert_eq!(sanitize(&once), once, "not idempotent for {raw:?}");
    }

    #[test]
    fn test_comment_before_code_span_after_backslash() {
        assert_stable("\\<!-- -->`<br>`\n");
        assert_eq!(sanitize("\\<!-- -->`<br>`\n"), "\\`<br />`\n");
    }

    #[test]
    fn test_comment_hiding_list_marker() {
        assert_stable("<!-- -->- x\n\n    <br>\n");
        assert_eq!(sanitize("<!-- -->- x\n\n    <br>\n"), "- x\n\n    <br />\n");
    }

    #[test]
    fn test_template_hiding_ordered_list_marker() {
        assert_stable("{{ a }}1. x\n\n    <br>\n");
    }

    /// Fragments that interact with code detection or with each other.
    const FRAGMENTS: &[&str] = &[
        "x", " ", "\n", "\n\n", "    ", "\\", "`", "``", "```", "~~~", "- ", "1. ", "> ",
        "<!-- -->", "<!--", "-->", "{{ a }}", "{%", "%}", "\\{{", "<br>", "</br>", "<p>",
        "</p>", "<div>", "</div>", "<pre>", "</pre>", "<script>", "</script>", "<foo-bar>",
        "<your_name>", "<a href=x onclick=y>", "<img src=a.png class=\"c\">", "---\n", "|a|\n|-|\n",
    ];

    proptest! {
        #[test]
        fn test_transform_is_idempotent(
            parts in proptest::collection::vec(proptest::sample::select(FRAGMENTS), 0..14)
        ) {
            let raw = parts.concat();
            let once = sanitize(&raw);
            prop_assert_eq!(sanitize(&once), once);
        }
    }
}
