use serde::{Deserialize, Serialize, Serializer};

/// Upper bound for `overall_score` and `ats_match`.
pub const MAX_OVERALL_SCORE: f64 = 100.0;

/// The eight fixed rubric categories.
///
/// The first seven maxima sum to 95. `keywords` carries its own cap of 10 and
/// is not part of that total, so section scores are never summed into
/// `overall_score`; the overall score is a separate 0 – 100 judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    ContactInfo,
    Experience,
    Education,
    Skills,
    Projects,
    Achievements,
    Formatting,
    Keywords,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::ContactInfo,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Achievements,
        SectionKind::Formatting,
        SectionKind::Keywords,
    ];

    /// JSON key under `sections`.
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::ContactInfo => "contact_info",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Projects => "projects",
            SectionKind::Achievements => "achievements",
            SectionKind::Formatting => "formatting",
            SectionKind::Keywords => "keywords",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionKind::ContactInfo => "Contact Info",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
            SectionKind::Achievements => "Achievements",
            SectionKind::Formatting => "Formatting",
            SectionKind::Keywords => "Keywords",
        }
    }

    pub fn max_score(self) -> f64 {
        match self {
            SectionKind::ContactInfo => 10.0,
            SectionKind::Experience => 25.0,
            SectionKind::Education => 10.0,
            SectionKind::Skills => 15.0,
            SectionKind::Projects => 15.0,
            SectionKind::Achievements => 10.0,
            SectionKind::Formatting => 10.0,
            SectionKind::Keywords => 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub contact_info: SectionScore,
    pub experience: SectionScore,
    pub education: SectionScore,
    pub skills: SectionScore,
    pub projects: SectionScore,
    pub achievements: SectionScore,
    pub formatting: SectionScore,
    pub keywords: SectionScore,
}

impl Sections {
    pub fn get(&self, kind: SectionKind) -> &SectionScore {
        match kind {
            SectionKind::ContactInfo => &self.contact_info,
            SectionKind::Experience => &self.experience,
            SectionKind::Education => &self.education,
            SectionKind::Skills => &self.skills,
            SectionKind::Projects => &self.projects,
            SectionKind::Achievements => &self.achievements,
            SectionKind::Formatting => &self.formatting,
            SectionKind::Keywords => &self.keywords,
        }
    }

    pub fn get_mut(&mut self, kind: SectionKind) -> &mut SectionScore {
        match kind {
            SectionKind::ContactInfo => &mut self.contact_info,
            SectionKind::Experience => &mut self.experience,
            SectionKind::Education => &mut self.education,
            SectionKind::Skills => &mut self.skills,
            SectionKind::Projects => &mut self.projects,
            SectionKind::Achievements => &mut self.achievements,
            SectionKind::Formatting => &mut self.formatting,
            SectionKind::Keywords => &mut self.keywords,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &SectionScore)> {
        SectionKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub detected_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub weak_action_verbs: Vec<String>,
    pub recommended_action_verbs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletRewrite {
    pub original: String,
    pub improved: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleMatch {
    pub best_fit_roles: Vec<String>,
    pub match_explanation: String,
}

/// The canonical structured result of a resume analysis.
///
/// Every field is required on deserialization: a response missing any of them
/// is rejected as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(serialize_with = "serialize_score")]
    pub overall_score: f64,
    pub overall_feedback: String,
    pub summary_comment: String,
    #[serde(serialize_with = "serialize_score")]
    pub ats_match: f64,
    pub sections: Sections,
    pub keyword_analysis: KeywordAnalysis,
    pub grammar_issues: Vec<String>,
    pub bullet_rewrite: Vec<BulletRewrite>,
    pub role_match: RoleMatch,
    pub what_is_good: Vec<String>,
    pub needs_improvement: Vec<String>,
    pub tips_for_improvement: Vec<String>,
}

impl AnalysisReport {
    /// All-zero/empty report with the full shape, returned whenever remote
    /// analysis cannot produce a valid result.
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Clamps every score into its declared range. Returns the names of the
    /// fields that had to be changed.
    pub fn clamp_scores(&mut self) -> Vec<String> {
        let mut repaired = Vec::new();

        if clamp(&mut self.overall_score, MAX_OVERALL_SCORE) {
            repaired.push("overall_score".to_string());
        }
        if clamp(&mut self.ats_match, MAX_OVERALL_SCORE) {
            repaired.push("ats_match".to_string());
        }
        for kind in SectionKind::ALL {
            if clamp(&mut self.sections.get_mut(kind).score, kind.max_score()) {
                repaired.push(format!("sections.{}", kind.key()));
            }
        }

        repaired
    }

    pub fn scores_in_range(&self) -> bool {
        in_range(self.overall_score, MAX_OVERALL_SCORE)
            && in_range(self.ats_match, MAX_OVERALL_SCORE)
            && self
                .sections
                .iter()
                .all(|(kind, s)| in_range(s.score, kind.max_score()))
    }
}

/// Whole scores go out as JSON integers, so a model's `78` stays `78`.
fn serialize_score<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

fn in_range(value: f64, max: f64) -> bool {
    (0.0..=max).contains(&value)
}

fn clamp(value: &mut f64, max: f64) -> bool {
    if in_range(*value, max) {
        return false;
    }
    *value = if value.is_nan() { 0.0 } else { value.clamp(0.0, max) };
    true
}
