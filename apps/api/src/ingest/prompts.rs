// Resume structuring prompt. Sent as the only user message; there is no system prompt.

/// Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT: &str = r#"Parse the following resume text and extract structured information in JSON format.
Return only valid JSON with the following structure:
{
  "personalInfo": {
    "name": "",
    "title": "",
    "email": "",
    "phone": "",
    "location": "",
    "website": "",
    "summary": ""
  },
  "experience": [
    {
      "company": "",
      "position": "",
      "duration": "",
      "description": ""
    }
  ],
  "education": [
    {
      "institution": "",
      "degree": "",
      "duration": "",
      "gpa": ""
    }
  ],
  "skills": [],
  "certifications": [],
  "languages": [],
  "projects": [
    {
      "name": "",
      "description": "",
      "technologies": []
    }
  ]
}

Resume text:
{resume_text}
"#;

pub fn build_resume_prompt(resume_text: &str) -> String {
    RESUME_PARSE_PROMPT.replace("{resume_text}", resume_text)
}
