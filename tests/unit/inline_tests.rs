/*!
 * Tests for inline text normalization
 */

use chapterpress::export::{parse_runs, substitute_math, StyledRun};

const SAMPLES: [&str; 8] = [
    "plain text without markup",
    "**bold** start and *italic* end",
    "mixed **bold *inner* text** here",
    "area is $\\pi r^2$ and \\frac{a}{b}",
    "unbalanced **marker stays",
    "single * star",
    "\\sqrt{\\frac{1}{4}} = \\frac{1}{2}",
    "",
];

#[test]
fn test_substituteMath_onSamples_shouldBeIdempotent() {
    for sample in SAMPLES {
        let once = substitute_math(sample);
        assert_eq!(substitute_math(&once), once, "sample: {:?}", sample);
    }
}

#[test]
fn test_parseRuns_onSamples_shouldConcatenateToPlainText() {
    for sample in SAMPLES {
        let line = parse_runs(sample, false);
        let joined: String = line.runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(joined, line.plain, "sample: {:?}", sample);
        assert!(line.runs.iter().all(|r| !r.text.is_empty()), "sample: {:?}", sample);
        assert!(
            line.runs.windows(2).all(|w| (w[0].bold, w[0].italic) != (w[1].bold, w[1].italic)),
            "adjacent runs should differ in style: {:?}",
            line.runs
        );
    }
}

#[test]
fn test_parseRuns_shouldPreserveSourceOrder() {
    let line = parse_runs("one **two** three *four* five", false);

    assert_eq!(
        line.runs,
        vec![
            StyledRun::plain("one "),
            StyledRun::new("two", true, false),
            StyledRun::plain(" three "),
            StyledRun::new("four", false, true),
            StyledRun::plain(" five"),
        ]
    );
}

#[test]
fn test_parseRuns_shouldApplyMathBeforeEmphasis() {
    let line = parse_runs("**$\\theta$ angle**", false);

    assert_eq!(line.runs, vec![StyledRun::new("θ angle", true, false)]);
}

#[test]
fn test_parseRuns_withUnbalancedBold_shouldKeepMarkersLiteral() {
    let line = parse_runs("unbalanced **marker stays", false);

    assert_eq!(line.plain, "unbalanced **marker stays");
    assert!(line.runs.iter().all(|r| !r.bold));
}
