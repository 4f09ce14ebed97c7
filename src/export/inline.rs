/*!
 * Inline text normalization.
 *
 * Turns one line of lightweight markup into styled runs shared by both
 * export formats. Math escapes are substituted first, then `**bold**` and
 * `*italic*` markers are split into runs.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// `\frac{A}{B}` with brace-free arguments
static FRACTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\frac\{([^{}]*)\}\{([^{}]*)\}").unwrap()
});

/// `\sqrt{X}` with a brace-free argument
static SQRT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\sqrt\{([^{}]*)\}").unwrap()
});

/// Block and inline math delimiters: `$$`, `$`, `\[`, `\]`, `\(`, `\)`
static MATH_DELIMITER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\$|\$|\\\[|\\\]|\\\(|\\\)").unwrap()
});

/// Named Greek-letter and operator escapes
static NAMED_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(theta|omega|alpha|times|beta|div|pi|pm)").unwrap()
});

/// A minimal unit of text carrying bold/italic flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    /// Visible characters
    pub text: String,
    /// Bold weight
    pub bold: bool,
    /// Italic slant
    pub italic: bool,
}

impl StyledRun {
    /// Create a run with explicit flags
    pub fn new(text: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
        }
    }

    /// Create an unstyled run
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, false, false)
    }

    fn same_style(&self, other: &StyledRun) -> bool {
        self.bold == other.bold && self.italic == other.italic
    }
}

/// Result of normalizing one line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedLine {
    /// Runs in source order, never empty, adjacent runs differ in style
    pub runs: Vec<StyledRun>,
    /// Concatenation of the run texts
    pub plain: String,
}

impl NormalizedLine {
    /// Build a line from runs, dropping empty ones and coalescing equal styles
    pub fn from_runs(runs: Vec<StyledRun>) -> Self {
        let mut merged: Vec<StyledRun> = Vec::with_capacity(runs.len());
        for run in runs.into_iter().filter(|r| !r.text.is_empty()) {
            match merged.last_mut() {
                Some(last) if last.same_style(&run) => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        let plain = merged.iter().map(|r| r.text.as_str()).collect();
        Self { runs: merged, plain }
    }

    /// Whether the line has no visible text
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Prepend literal text carrying the weight of the first run
    pub fn with_prefix(self, prefix: &str) -> Self {
        let bold = self.runs.first().is_some_and(|r| r.bold);
        let mut runs = Vec::with_capacity(self.runs.len() + 1);
        runs.push(StyledRun::new(prefix, bold, false));
        runs.extend(self.runs);
        Self::from_runs(runs)
    }
}

fn replace_all_fixed(regex: &Regex, text: &str, replacement: impl Fn(&Captures) -> String) -> String {
    let mut current = text.to_string();
    loop {
        let next = regex.replace_all(&current, |caps: &Captures| replacement(caps)).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn named_symbol(name: &str) -> &'static str {
    match name {
        "pi" => "π",
        "theta" => "θ",
        "omega" => "ω",
        "alpha" => "α",
        "beta" => "β",
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        _ => "",
    }
}

fn substitute_once(text: &str) -> String {
    let text = replace_all_fixed(&FRACTION_REGEX, text, |caps| format!("({}/{})", &caps[1], &caps[2]));
    let text = replace_all_fixed(&SQRT_REGEX, &text, |caps| format!("√{}", &caps[1]));
    let text = MATH_DELIMITER_REGEX.replace_all(&text, "");
    NAMED_ESCAPE_REGEX
        .replace_all(&text, |caps: &Captures| named_symbol(&caps[1]).to_string())
        .into_owned()
}

/// Replace LaTeX-like math escapes with their visible form.
///
/// Every substitution strictly shortens the text, so iterating to a fixed
/// point terminates and makes the function idempotent.
pub fn substitute_math(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = substitute_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn find_marker(chars: &[char], from: usize, marker: &[char]) -> Option<usize> {
    if chars.len() < marker.len() {
        return None;
    }
    (from..=chars.len() - marker.len()).find(|&i| chars[i..i + marker.len()] == *marker)
}

/// Split one line of markup into styled runs.
///
/// Runs outside markers take `ambient_bold` and are never italic.
pub fn parse_runs(line: &str, ambient_bold: bool) -> NormalizedLine {
    const BOLD: [char; 2] = ['*', '*'];
    const ITALIC: [char; 1] = ['*'];

    let text = substitute_math(line);
    let chars: Vec<char> = text.chars().collect();
    let mut runs = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i..].starts_with(&BOLD) {
            if let Some(end) = find_marker(&chars, i + 2, &BOLD) {
                runs.push(StyledRun::new(std::mem::take(&mut literal), ambient_bold, false));
                runs.push(StyledRun::new(chars[i + 2..end].iter().collect::<String>(), true, false));
                i = end + 2;
                continue;
            }
            literal.push_str("**");
            i += 2;
            continue;
        }

        if chars[i] == '*' {
            if let Some(end) = find_marker(&chars, i + 1, &ITALIC) {
                runs.push(StyledRun::new(std::mem::take(&mut literal), ambient_bold, false));
                runs.push(StyledRun::new(chars[i + 1..end].iter().collect::<String>(), ambient_bold, true));
                i = end + 1;
                continue;
            }
        }

        literal.push(chars[i]);
        i += 1;
    }

    runs.push(StyledRun::new(literal, ambient_bold, false));
    NormalizedLine::from_runs(runs)
}
