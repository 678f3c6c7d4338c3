use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};

/// Canonical display and inline wrappers.
const DISPLAY_OPEN: &str = r"\[";
const DISPLAY_CLOSE: &str = r"\]";
const INLINE_OPEN: &str = r"\(";
const INLINE_CLOSE: &str = r"\)";

const MATHJAX_LOADERS: &[&str] = &["MathJax.js", "mathjax"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathDetection {
    pub detected: bool,
    pub evidence: String,
}

/// Look for a MathJax loader script or an inline MathJax configuration block.
pub fn detect_math_usage(html: &str) -> MathDetection {
    let doc = Html::parse_document(html);

    if let Ok(sel) = Selector::parse("script[src]") {
        let loader = doc
            .select(&sel)
            .filter_map(|script| script.value().attr("src"))
            .find(|src| MATHJAX_LOADERS.iter().any(|name| src.contains(name)));
        if let Some(src) = loader {
            return MathDetection {
                detected: true,
                evidence: src.to_string(),
            };
        }
    }

    if let Ok(sel) = Selector::parse(r#"script[type="text/x-mathjax-config"]"#) {
        if doc.select(&sel).next().is_some() {
            return MathDetection {
                detected: true,
                evidence: "Found inline MathJax configuration".to_string(),
            };
        }
    }

    MathDetection {
        detected: false,
        evidence: "MathJax not detected".to_string(),
    }
}

static DISPLAY_DOLLARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").expect("display pattern is valid"));

static INLINE_DOLLAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$(.*?)\$").expect("inline pattern is valid"));

/// One regex per environment. The optional `\[` / `\]` groups let an already
/// wrapped environment pass through untouched.
static ENVIRONMENTS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    ["equation", "equation*", "align", "align*"]
        .into_iter()
        .map(|env| {
            let name = regex::escape(env);
            let pattern = format!(
                r"(?s)(\\\[)?\\begin\{{{name}\}}(.*?)\\end\{{{name}\}}(\\\])?"
            );
            (env, Regex::new(&pattern).expect("environment pattern is valid"))
        })
        .collect()
});

/// Rewrite the supported display spellings to `\[...\]`, then `$...$` to `\(...\)`.
///
/// Double dollars must be handled before single dollars. Unbalanced
/// delimiters do not match and stay as written. A `$` used as a currency
/// sign is not told apart from math.
pub fn normalize_delimiters(text: &str) -> String {
    let mut out = DISPLAY_DOLLARS
        .replace_all(text, |caps: &Captures| {
            format!("{DISPLAY_OPEN}{}{DISPLAY_CLOSE}", &caps[1])
        })
        .into_owned();

    for (env, re) in ENVIRONMENTS.iter() {
        out = re
            .replace_all(&out, |caps: &Captures| {
                if caps.get(1).is_some() && caps.get(3).is_some() {
                    return caps[0].to_string();
                }
                format!(
                    "{}{DISPLAY_OPEN}\\begin{{{env}}}{}\\end{{{env}}}{DISPLAY_CLOSE}{}",
                    caps.get(1).map_or("", |m| m.as_str()),
                    &caps[2],
                    caps.get(3).map_or("", |m| m.as_str()),
                )
            })
            .into_owned();
    }

    INLINE_DOLLAR
        .replace_all(&out, |caps: &Captures| {
            format!("{INLINE_OPEN}{}{INLINE_CLOSE}", &caps[1])
        })
        .into_owned()
}
