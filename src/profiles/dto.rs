use serde::Deserialize;

use crate::store::models::{EducationInput, ExperienceInput, SocialLinks};

/// Body of the profile upsert. Absent fields leave existing values alone;
/// skills arrive as one comma-separated string.
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub github_username: Option<String>,
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl UpsertProfileRequest {
    pub fn social(&self) -> SocialLinks {
        SocialLinks {
            youtube: self.youtube.clone(),
            twitter: self.twitter.clone(),
            facebook: self.facebook.clone(),
            linkedin: self.linkedin.clone(),
            instagram: self.instagram.clone(),
        }
    }
}

/// Split a comma-separated skills string: trim each entry, keep order,
/// drop empties.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl ExperienceRequest {
    pub fn into_input(self) -> ExperienceInput {
        ExperienceInput {
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location: self.location,
            from: self.from.unwrap_or_default(),
            to: self.to,
            current: self.current,
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

impl EducationRequest {
    pub fn into_input(self) -> EducationInput {
        EducationInput {
            school: self.school.unwrap_or_default(),
            degree: self.degree.unwrap_or_default(),
            field_of_study: self.field_of_study.unwrap_or_default(),
            from: self.from.unwrap_or_default(),
            to: self.to,
            current: self.current,
            description: self.description,
        }
    }
}
