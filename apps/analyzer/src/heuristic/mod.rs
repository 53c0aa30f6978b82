//! Heuristic Analyzer: offline, deterministic resume scoring from regex/keyword signals.
//!
//! Never touches the network and is never called by the remote pipeline. It is
//! the degraded-mode alternative exposed on its own endpoint.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fixed skill vocabulary. Output order follows this list.
pub const SKILL_VOCABULARY: &[&str] = &[
    "javascript",
    "typescript",
    "react",
    "node",
    "python",
    "java",
    "c++",
    "sql",
    "mongodb",
    "docker",
    "aws",
    "git",
    "css",
    "tailwind",
    "html",
];

const NAME_SCAN_LINES: usize = 6;
const NAME_MAX_CHARS: usize = 40;
const POINTS_PER_SKILL: u32 = 10;
const POINTS_FOR_EMAIL: u32 = 10;
const POINTS_FOR_PHONE: u32 = 10;
const MAX_SCORE: u32 = 100;
/// More skills than this reads as a strong skill set; fewer is flagged weak.
const SKILL_THRESHOLD: usize = 5;

const SUGGESTIONS: &[&str] = &[
    "Use bullet points for clarity.",
    "Add measurable achievements (e.g., improved sales by 20%).",
    "Include a professional summary at the top.",
    "Highlight major projects with technologies used.",
];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex is valid")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+?\d{1,3}[-.\s]?)?(\d{10}|\d{3}[-.\s]\d{3}[-.\s]\d{4})")
        .expect("phone regex is valid")
});

/// Best-effort assessment derived purely from the resume text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicReport {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    /// 0 – 100
    pub ats_score: u32,
    pub summary: String,
    pub extracted_text: String,
}

/// Candidate name: the first of the leading non-empty lines that is short and
/// carries no digit or `@`.
pub fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(NAME_SCAN_LINES)
        .find(|l| {
            l.chars().count() < NAME_MAX_CHARS
                && !l.chars().any(|c| c.is_ascii_digit())
                && !l.contains('@')
        })
        .map(String::from)
}

pub fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Case-insensitive vocabulary match. A term counts only when it is not glued
/// to other letters, so `java` is not found inside `javascript`.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| contains_term(&lower, skill))
        .map(|s| s.to_string())
        .collect()
}

fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
    })
}

pub fn heuristic_score(skill_count: usize, has_email: bool, has_phone: bool) -> u32 {
    let skills = (skill_count as u32).saturating_mul(POINTS_PER_SKILL);
    let contact = if has_email { POINTS_FOR_EMAIL } else { 0 }
        + if has_phone { POINTS_FOR_PHONE } else { 0 };
    skills.saturating_add(contact).min(MAX_SCORE)
}

/// Runs every extractor and applies the fixed strength/weakness rules.
pub fn analyze_text(text: &str) -> HeuristicReport {
    let skills = extract_skills(text);
    let email = extract_email(text);
    let phone = extract_phone(text);
    let name = extract_name(text);

    let ats_score = heuristic_score(skills.len(), email.is_some(), phone.is_some());

    let mut strengths = vec![if skills.len() > SKILL_THRESHOLD {
        "Strong technical skill set".to_string()
    } else {
        "Decent skill base".to_string()
    }];
    if text.contains("project") {
        strengths.push("Project experience included".to_string());
    }

    let mut weaknesses = Vec::new();
    if email.is_none() {
        weaknesses.push("Email missing".to_string());
    }
    if phone.is_none() {
        weaknesses.push("Phone number missing".to_string());
    }
    if skills.len() < SKILL_THRESHOLD {
        weaknesses.push("Skill section is weak".to_string());
    }
    if !text.to_lowercase().contains("experience") {
        weaknesses.push("Experience section missing".to_string());
    }

    HeuristicReport {
        name,
        email,
        phone,
        skills,
        strengths,
        weaknesses,
        suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        ats_score,
        summary: format!("Estimated ATS score: {ats_score}/100"),
        extracted_text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str =
        "Contact: jane@x.com, 555-123-4567. Skills: javascript, react, docker, aws.";

    const FULL_RESUME: &str = "
        Jane Doe
        Senior Software Engineer
        jane.doe@example.com | +1 415-555-0134
        Experience
        Built a react + typescript dashboard; node and python services on aws.
        Skills: Java, SQL, MongoDB, Docker, Git, CSS, Tailwind, HTML, C++
        Side project: compiler in rust
    ";

    #[test]
    fn test_scenario_contact_and_skills() {
        let r = analyze_text(SCENARIO);
        assert_eq!(r.email.as_deref(), Some("jane@x.com"));
        assert_eq!(r.phone.as_deref(), Some("555-123-4567"));
        for skill in ["javascript", "react", "docker", "aws"] {
            assert!(r.skills.contains(&skill.to_string()), "missing {skill}");
        }
        assert_eq!(r.ats_score, 60);
        assert_eq!(r.summary, "Estimated ATS score: 60/100");
    }

    #[test]
    fn test_java_not_counted_inside_javascript() {
        assert_eq!(extract_skills("javascript"), vec!["javascript"]);
        assert_eq!(extract_skills("Java, JavaScript"), vec!["javascript", "java"]);
    }

    #[test]
    fn test_skills_follow_vocabulary_order() {
        let skills = extract_skills("HTML, Docker, Python, React");
        assert_eq!(skills, vec!["react", "python", "docker", "html"]);
    }

    #[test]
    fn test_skill_with_symbols_and_suffixes() {
        let skills = extract_skills("C++17, Node.js, HTML5");
        assert_eq!(skills, vec!["node", "c++", "html"]);
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let r = analyze_text(FULL_RESUME);
        assert_eq!(r.skills.len(), SKILL_VOCABULARY.len() - 1); // everything but "javascript"
        assert_eq!(r.ats_score, 100);
        assert_eq!(heuristic_score(50, true, true), 100);
    }

    #[test]
    fn test_score_for_empty_text_is_zero() {
        let r = analyze_text("");
        assert_eq!(r.ats_score, 0);
        assert!(r.name.is_none());
        assert!(r.skills.is_empty());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        assert_eq!(analyze_text(FULL_RESUME), analyze_text(FULL_RESUME));
        assert_eq!(analyze_text(SCENARIO), analyze_text(SCENARIO));
    }

    #[test]
    fn test_name_is_first_clean_short_line() {
        assert_eq!(extract_name(FULL_RESUME).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_name_skips_lines_with_digits_or_at() {
        let text = "jane@x.com\n555-123-4567\n\nJane Doe\nEngineer";
        assert_eq!(extract_name(text).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_name_only_scans_first_six_lines() {
        let text = "1\n2\n3\n4\n5\n6\nJane Doe";
        assert_eq!(extract_name(text), None);
    }

    #[test]
    fn test_name_rejects_long_lines() {
        let text = "A very long headline that is definitely longer than forty chars";
        assert_eq!(extract_name(text), None);
    }

    #[test]
    fn test_phone_formats() {
        assert_eq!(extract_phone("call 4155550134 now").as_deref(), Some("4155550134"));
        assert_eq!(
            extract_phone("+44 020.555.0199").as_deref(),
            Some("+44 020.555.0199")
        );
        assert_eq!(extract_phone("no digits here"), None);
    }

    #[test]
    fn test_email_first_match() {
        assert_eq!(
            extract_email("a@b.io and c@d.com").as_deref(),
            Some("a@b.io")
        );
        assert_eq!(extract_email("jane at example dot com"), None);
    }

    #[test]
    fn test_weaknesses_when_signals_missing() {
        let r = analyze_text("Jane Doe\nRust");
        assert_eq!(
            r.weaknesses,
            vec![
                "Email missing",
                "Phone number missing",
                "Skill section is weak",
                "Experience section missing",
            ]
        );
        assert_eq!(r.strengths, vec!["Decent skill base"]);
    }

    #[test]
    fn test_strengths_for_rich_resume() {
        let r = analyze_text(FULL_RESUME);
        assert_eq!(
            r.strengths,
            vec!["Strong technical skill set", "Project experience included"]
        );
        assert!(r.weaknesses.is_empty());
    }

    #[test]
    fn test_suggestions_are_fixed() {
        assert_eq!(analyze_text("").suggestions.len(), SUGGESTIONS.len());
        assert_eq!(analyze_text("").suggestions, analyze_text(FULL_RESUME).suggestions);
    }
}
