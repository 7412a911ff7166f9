//! Score extraction from free-form evaluator text
//!
//! Two scales are recognised:
//! - continuous 0-10 scores, one per labelled criterion line
//! - a discrete 1-4 verdict, announced by the `THE FINAL SCORE IS:` marker
//!
//! Both extractors are pure and total. Aggregation depends on their exact
//! quirks (marker priority, first-token parsing), so the heuristics are kept
//! deliberately simple.

use once_cell::sync::Lazy;
use regex::Regex;

use tribunal_core::{ContinuousScores, DiscreteVerdict};

/// Marker line that announces the discrete verdict
pub const FINAL_SCORE_MARKER: &str = "THE FINAL SCORE IS:";

/// Key under which a free-standing `<number>/10` is recorded
pub const OVERALL_SCORE_KEY: &str = "Overall Score";

/// Tokens that flag a line as carrying a continuous score
const SCORE_LINE_TOKENS: [&str; 4] = ["score", "/10", "rating", "points"];

static OUT_OF_TEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)/10").expect("out-of-ten pattern is valid"));

fn is_score_line(line: &str) -> bool {
    if !line.contains(':') {
        return false;
    }
    let lower = line.to_lowercase();
    SCORE_LINE_TOKENS.iter().any(|token| lower.contains(token))
}

fn parse_score_token(token: &str) -> Option<f64> {
    let token = token.strip_suffix("/10").unwrap_or(token);
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extract labelled 0-10 scores from `text`.
///
/// A line counts when it has a colon and mentions `score`, `/10`, `rating`
/// or `points`. The label is the text before the first colon; the value is
/// the first number after it. A `<number>/10` anywhere in the text is also
/// recorded under [`OVERALL_SCORE_KEY`].
pub fn extract_continuous(text: &str) -> ContinuousScores {
    let mut scores = ContinuousScores::new();

    for line in text.lines().filter(|l| is_score_line(l)) {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        if let Some(value) = rest.split_whitespace().find_map(parse_score_token) {
            scores.insert(label.trim().to_string(), value);
        }
    }

    if let Some(value) = OUT_OF_TEN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        scores.insert(OVERALL_SCORE_KEY.to_string(), value);
    }

    scores
}

fn first_discrete_digit(line: &str) -> Option<u8> {
    line.chars()
        .find(|c| ('1'..='4').contains(c))
        .map(|c| c as u8 - b'0')
}

fn from_marker(lines: &[&str]) -> Option<DiscreteVerdict> {
    lines.iter().enumerate().find_map(|(i, line)| {
        if !line.contains(FINAL_SCORE_MARKER) {
            return None;
        }
        let score = first_discrete_digit(line)?;
        Some(DiscreteVerdict {
            score,
            justification: lines[i + 1..].join("\n").trim().to_string(),
        })
    })
}

fn from_loose_lines(lines: &[&str]) -> Option<DiscreteVerdict> {
    let mut score = None;
    let mut justification = Vec::new();

    for line in lines {
        let trimmed = line.trim();
        match score {
            None => {
                let candidate =
                    matches!(trimmed, "1" | "2" | "3" | "4") || trimmed.starts_with("Score:");
                if candidate {
                    score = first_discrete_digit(trimmed);
                }
            }
            Some(_) => {
                if !trimmed.starts_with("Score:") {
                    justification.push(*line);
                }
            }
        }
    }

    score.map(|score| DiscreteVerdict {
        score,
        justification: justification.join("\n").trim().to_string(),
    })
}

/// Extract a 1-4 verdict from `text`.
///
/// The `THE FINAL SCORE IS:` marker always wins. Without it, a bare `1`-`4`
/// line or a `Score:` line is accepted and the lines after it become the
/// justification. Returns `None` when no score can be found.
pub fn extract_discrete(text: &str) -> Option<DiscreteVerdict> {
    let lines: Vec<&str> = text.lines().collect();
    from_marker(&lines).or_else(|| from_loose_lines(&lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_labelled_lines() {
        let text = "Assessment follows.\n\
                    Accuracy Score: 8.5\n\
                    Clarity rating: 7/10 overall\n\
                    Bonus points: none given, 3 later\n\
                    Notes: nothing numeric here";
        let scores = extract_continuous(text);
        assert_eq!(scores.get("Accuracy Score"), Some(&8.5));
        assert_eq!(scores.get("Clarity rating"), Some(&7.0));
        assert_eq!(scores.get("Bonus points"), Some(&3.0));
        assert!(!scores.contains_key("Notes"));
        assert_eq!(scores.get(OVERALL_SCORE_KEY), Some(&7.0));
    }

    #[test]
    fn test_continuous_requires_colon() {
        let scores = extract_continuous("The score is 9 out of ten");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_continuous_first_numeric_token_wins() {
        let scores = extract_continuous("Final Score: about 6 maybe 9");
        assert_eq!(scores.get("Final Score"), Some(&6.0));
    }

    #[test]
    fn test_continuous_punctuation_blocks_parse() {
        // "7.5," is not a number; the next token is
        let scores = extract_continuous("Depth score: 7.5, revised 6");
        assert_eq!(scores.get("Depth score"), Some(&6.0));
    }

    #[test]
    fn test_overall_pattern_anywhere() {
        let scores = extract_continuous("I would give this 6.5/10 because it is thin.");
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get(OVERALL_SCORE_KEY), Some(&6.5));
    }

    #[test]
    fn test_continuous_rejects_non_finite() {
        let scores = extract_continuous("Score: NaN inf 4");
        assert_eq!(scores.get("Score"), Some(&4.0));
    }

    #[test]
    fn test_discrete_marker() {
        let text = "THE FINAL SCORE IS: 3\nGood coverage.\nMinor gaps remain.\n";
        let verdict = extract_discrete(text).unwrap();
        assert_eq!(verdict.score, 3);
        assert_eq!(verdict.justification, "Good coverage.\nMinor gaps remain.");
    }

    #[test]
    fn test_discrete_marker_beats_loose_score() {
        let text = "Score: 1\nEarly impression was poor.\nTHE FINAL SCORE IS: 3\nOn reflection it holds up.";
        let verdict = extract_discrete(text).unwrap();
        assert_eq!(verdict.score, 3);
        assert_eq!(verdict.justification, "On reflection it holds up.");
    }

    #[test]
    fn test_discrete_marker_is_case_sensitive() {
        assert!(extract_discrete("The final score is: 3\nok").is_none());
        // the loose fallback still applies to the lines after it
        let verdict = extract_discrete("The final score is: [4]\nScore: 2\nThin.").unwrap();
        assert_eq!(verdict.score, 2);
        assert_eq!(verdict.justification, "Thin.");
    }

    #[test]
    fn test_discrete_marker_ignores_out_of_range_digits() {
        // 0 and 9 are skipped; the first digit in 1..=4 is taken
        let verdict = extract_discrete("THE FINAL SCORE IS: 9 no, 2").unwrap();
        assert_eq!(verdict.score, 2);
    }

    #[test]
    fn test_discrete_bare_digit_fallback() {
        let text = "My verdict:\n4\nExcellent sourcing.\nScore: 4\nNo real weaknesses.";
        let verdict = extract_discrete(text).unwrap();
        assert_eq!(verdict.score, 4);
        assert_eq!(verdict.justification, "Excellent sourcing.\nNo real weaknesses.");
    }

    #[test]
    fn test_discrete_score_prefix_fallback() {
        let verdict = extract_discrete("Score: 2 (Fair)\nToo vague.").unwrap();
        assert_eq!(verdict.score, 2);
        assert_eq!(verdict.justification, "Too vague.");
    }

    #[test]
    fn test_discrete_miss() {
        assert!(extract_discrete("No verdict was reached.").is_none());
        assert!(extract_discrete("Score: 9").is_none());
        assert!(extract_discrete("").is_none());
    }
}
