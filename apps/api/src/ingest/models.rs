use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default spoken language when a resume does not list any.
pub const DEFAULT_LANGUAGE: &str = "English";

fn default_languages() -> Vec<String> {
    vec![DEFAULT_LANGUAGE.to_string()]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    pub duration: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub duration: String,
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

/// Structured resume produced by one upload. Every key is always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParsedResume {
    pub personal_info: PersonalInfo,
    /// Order as it appears in the source text.
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub projects: Vec<ProjectEntry>,
}

impl Default for ParsedResume {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            certifications: Vec::new(),
            languages: default_languages(),
            projects: Vec::new(),
        }
    }
}

impl ParsedResume {
    /// Builds a resume from arbitrary model output, repairing what it can.
    ///
    /// Returns `None` unless the top-level value is a JSON object. Known fields are
    /// coerced to their expected shape; unknown fields are dropped. A missing
    /// `languages` key becomes `["English"]`, but an explicit empty list is kept.
    pub fn from_model_output(value: &Value) -> Option<Self> {
        let root = value.as_object()?;

        let personal_info = root
            .get("personalInfo")
            .and_then(Value::as_object)
            .map(|info| PersonalInfo {
                name: text_field(info, "name"),
                title: text_field(info, "title"),
                email: text_field(info, "email"),
                phone: text_field(info, "phone"),
                location: text_field(info, "location"),
                website: text_field(info, "website"),
                summary: text_field(info, "summary"),
            })
            .unwrap_or_default();

        let experience = object_list(root, "experience", |entry| ExperienceEntry {
            company: text_field(entry, "company"),
            position: text_field(entry, "position"),
            duration: text_field(entry, "duration"),
            description: text_field(entry, "description"),
        });

        let education = object_list(root, "education", |entry| EducationEntry {
            institution: text_field(entry, "institution"),
            degree: text_field(entry, "degree"),
            duration: text_field(entry, "duration"),
            gpa: text_field(entry, "gpa"),
        });

        let projects = object_list(root, "projects", |entry| ProjectEntry {
            name: text_field(entry, "name"),
            description: text_field(entry, "description"),
            technologies: string_list(entry.get("technologies")),
        });

        let languages = match root.get("languages") {
            None | Some(Value::Null) => default_languages(),
            other => string_list(other),
        };

        Some(Self {
            personal_info,
            experience,
            education,
            skills: string_list(root.get("skills")),
            certifications: string_list(root.get("certifications")),
            languages,
            projects,
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(scalar_to_string).collect())
        .unwrap_or_default()
}

fn object_list<T>(
    root: &Map<String, Value>,
    key: &str,
    build: impl Fn(&Map<String, Value>) -> T,
) -> Vec<T> {
    root.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).map(build).collect())
        .unwrap_or_default()
}
