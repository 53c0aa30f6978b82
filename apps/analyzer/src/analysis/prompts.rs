use crate::analysis::report::SectionKind;
use crate::llm_client::prompts::STRICT_JSON_INSTRUCTION;

/// Criteria the model checks for each rubric category.
fn section_criteria(kind: SectionKind) -> &'static [&'static str] {
    match kind {
        SectionKind::ContactInfo => &[
            "Phone, email, location",
            "Professional email",
            "LinkedIn/GitHub included?",
        ],
        SectionKind::Experience => &[
            "Clear role titles?",
            "Achievements quantified?",
            "Action verbs used?",
            "No irrelevant or repeated content?",
        ],
        SectionKind::Education => &[
            "Degree clarity",
            "Dates available",
            "Consistent formatting",
        ],
        SectionKind::Skills => &[
            "Relevant to job market?",
            "Hard skills vs Soft skills balance",
            "ATS-friendly structure",
        ],
        SectionKind::Projects => &[
            "Tech stack specified?",
            "Impact described?",
            "Real measurable outcomes?",
        ],
        SectionKind::Achievements => &["Measurable results?", "Highlights added?"],
        SectionKind::Formatting => &[
            "Clear sections?",
            "Proper spacing?",
            "No grammar issues?",
        ],
        SectionKind::Keywords => &[
            "Coverage of in-demand role keywords (see KEYWORD ENGINE)",
            "Keywords placed in context, not just listed",
        ],
    }
}

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"
You are an ATS Engine + Senior Technical Recruiter with 20+ years experience.
You evaluate resumes the SAME WAY real Applicant Tracking Systems score candidates.

{json_only}

You must analyze the resume using the following evaluation logic.

-------------------------------------
SCORING SYSTEM
-------------------------------------
Score every section between 0 and its maximum:
{scoring_system}
overall_score and ats_match are each your holistic judgement from 0 to 100.
They are NOT the sum of the section scores.

-------------------------------------
KEYWORD ENGINE
-------------------------------------
Extract keywords based on:
- Software engineering roles
- Frontend / Backend / Fullstack job descriptions
- Cloud & DevOps keywords
- Modern frameworks

-------------------------------------
ACTION VERB ANALYZER
-------------------------------------
Check:
- Weak verbs
- Missing power verbs
- Passive sentences

-------------------------------------
GRAMMAR ANALYZER
-------------------------------------
Detect:
- Long sentences
- Ambiguous phrasing
- Filler words
- Redundant wording

-------------------------------------
ROLE MATCH ENGINE
-------------------------------------
Identify best job roles based on:
- Skills
- Experience level
- Strengths
- Project areas

-------------------------------------
OUTPUT STRICT JSON:
-------------------------------------

{
  "overall_score": number,
  "overall_feedback": "string",
  "summary_comment": "string",
  "ats_match": number,

  "sections": {
{sections_schema}
  },

  "keyword_analysis": {
    "detected_keywords": string[],
    "missing_keywords": string[],
    "weak_action_verbs": string[],
    "recommended_action_verbs": string[]
  },

  "grammar_issues": string[],

  "bullet_rewrite": [
    { "original": "string", "improved": "string" }
  ],

  "role_match": {
    "best_fit_roles": string[],
    "match_explanation": "string"
  },

  "what_is_good": string[],
  "needs_improvement": string[],
  "tips_for_improvement": string[]
}

-------------------------------------
Resume to analyze:
-------------------------------------

"""{resume_text}"""
"#;

/// Numbered rubric lines, one block per section, with the section's maximum.
pub fn render_scoring_system() -> String {
    SectionKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let criteria: String = section_criteria(*kind)
                .iter()
                .map(|c| format!("   - {c}\n"))
                .collect();
            format!(
                "{}. {} ({} pts)\n{}",
                i + 1,
                kind.label(),
                kind.max_score(),
                criteria
            )
        })
        .collect()
}

fn render_sections_schema() -> String {
    SectionKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "    \"{}\": {{ \"score\": number, \"comment\": \"string\" }}",
                kind.key()
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Builds the full analysis prompt. The resume text is inserted last so that
/// placeholder-like text inside it is left alone.
pub fn build_analysis_prompt(resume_text: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{json_only}", STRICT_JSON_INSTRUCTION)
        .replace("{scoring_system}", &render_scoring_system())
        .replace("{sections_schema}", &render_sections_schema())
        .replace("{resume_text}", resume_text)
}
