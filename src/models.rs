use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::error::{Result, ValidationError, ValidationErrors};
use crate::types::Validate;

// ============================================================================
// ENUMS
// ============================================================================

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "interview_type_enum", rename_all = "snake_case")]
pub enum InterviewType {
    #[default]
    Actual,
    Mock,
    Practice,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "seniority_level_enum", rename_all = "snake_case")]
pub enum SeniorityLevel {
    Intern,
    Junior,
    Mid,
    Senior,
    Staff,
    Principal,
    Lead,
    Manager,
    Director,
}

/// Deleting an interview moves it to `Cancelled`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "interview_status_enum", rename_all = "snake_case")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Rescheduled,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "interview_result_enum", rename_all = "snake_case")]
pub enum InterviewResult {
    #[default]
    Pending,
    Passed,
    Failed,
    OfferReceived,
    OfferAccepted,
    OfferDeclined,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "question_category_enum", rename_all = "snake_case")]
pub enum QuestionCategory {
    Technical,
    Behavioral,
    Product,
    SystemDesign,
    Coding,
    CaseStudy,
    Brainteaser,
    CulturalFit,
    Leadership,
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
    Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "question_difficulty_enum", rename_all = "snake_case")]
pub enum QuestionDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Type,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(type_name = "interview_round_type_enum", rename_all = "snake_case")]
pub enum RoundType {
    PhoneScreen,
    Technical,
    Coding,
    SystemDesign,
    Behavioral,
    CulturalFit,
    HiringManager,
    Final,
    Assessment,
    Other,
}

// ============================================================================
// ENTITIES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub company_id: i32,
    pub company_name: String,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub headquarters: Option<String>,
    pub website: Option<String>,
    pub company_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: i32,
    pub role_name: String,
    pub role_category: Option<String>,
    pub role_description: Option<String>,
    pub typical_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An interview joined with its company and role names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub interview_id: i32,
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
    pub custom_role_title: Option<String>,
    pub interview_type: InterviewType,
    pub seniority_level: SeniorityLevel,
    pub interview_status: InterviewStatus,
    pub interview_result: InterviewResult,
    pub job_description: Option<String>,
    pub main_skills_required: Vec<String>,
    pub job_location: Option<String>,
    pub is_remote: bool,
    pub salary_range: Option<String>,
    pub application_date: Option<NaiveDate>,
    pub first_interview_date: Option<NaiveDate>,
    pub overall_feedback: Option<String>,
    pub preparation_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub question_id: i32,
    pub question_text: String,
    pub question_category: QuestionCategory,
    pub question_difficulty: QuestionDifficulty,
    pub question_context: Option<String>,
    pub answer_summary: Option<String>,
    pub answer_markdown_content: Option<String>,
    pub key_concepts: Vec<String>,
    pub tags: Vec<String>,
    pub times_asked: i32,
    pub times_practiced: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub skill_id: i32,
    pub skill_name: String,
    pub skill_category: Option<String>,
    pub skill_type: Option<String>,
    pub skill_description: Option<String>,
    pub proficiency_levels: Vec<String>,
    pub related_skills: Vec<i32>,
    pub parent_skill_id: Option<i32>,
    pub is_trending: bool,
    pub market_demand: Option<String>,
    pub average_salary_impact_percentage: Option<f64>,
    pub learning_resources: Vec<String>,
    pub official_documentation_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stage of an interview (phone screen, onsite loop, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRound {
    pub round_id: i32,
    pub interview_id: i32,
    pub round_number: i32,
    pub round_name: Option<String>,
    pub round_type: RoundType,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub timezone: String,
    pub is_virtual: bool,
    pub meeting_platform: Option<String>,
    pub meeting_link: Option<String>,
    pub physical_location: Option<String>,
    pub interviewer_name: Option<String>,
    pub interviewer_title: Option<String>,
    pub interviewer_linkedin_url: Option<String>,
    pub interviewer_email: Option<String>,
    pub interviewer_notes: Option<String>,
    pub round_status: InterviewStatus,
    pub round_result: InterviewResult,
    pub feedback: Option<String>,
    pub rating: Option<i32>,
    pub preparation_notes: Option<String>,
    pub questions_asked_summary: Option<String>,
    pub key_topics_covered: Vec<String>,
    pub follow_up_actions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bank question as it was asked in a specific interview.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewQuestion {
    pub interview_question_id: i32,
    pub interview_id: i32,
    pub round_id: Option<i32>,
    pub question_id: i32,
    pub was_asked: bool,
    pub order_asked: Option<i32>,
    pub candidate_answer: Option<String>,
    pub answer_quality_rating: Option<i32>,
    pub time_taken_minutes: Option<i32>,
    pub interviewer_feedback: Option<String>,
    pub what_went_well: Option<String>,
    pub what_could_improve: Option<String>,
    pub was_prepared: bool,
    pub preparation_notes: Option<String>,
    pub confidence_level: Option<i32>,
    pub follow_up_questions_asked: Vec<String>,
    pub follow_up_answers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// CREATE / UPDATE PAYLOADS
// ============================================================================

const NAME_MAX: usize = 200;
const QUESTION_TEXT_MIN: usize = 10;

fn check_name(errors: &mut ValidationErrors, field: &str, value: &str) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(ValidationError::new(field, "must not be empty"));
    } else if len > NAME_MAX {
        errors.add(ValidationError::new(
            field,
            format!("must be at most {} characters", NAME_MAX),
        ));
    }
}

fn check_optional_max(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(ValidationError::new(
            field,
            format!("must be at most {} characters", max),
        ));
    }
}

fn check_question_text(errors: &mut ValidationErrors, value: &str) {
    if value.trim().chars().count() < QUESTION_TEXT_MIN {
        errors.add(ValidationError::new(
            "question_text",
            format!("must be at least {} characters", QUESTION_TEXT_MIN),
        ));
    }
}

fn check_range(errors: &mut ValidationErrors, field: &str, value: Option<i32>, min: i32, max: i32) {
    if value.is_some_and(|v| !(min..=max).contains(&v)) {
        errors.add(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        ));
    }
}

fn check_non_negative(errors: &mut ValidationErrors, field: &str, value: Option<i32>) {
    if value.is_some_and(|v| v < 0) {
        errors.add(ValidationError::new(field, "must not be negative"));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewCompany {
    pub company_name: String,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub headquarters: Option<String>,
    pub website: Option<String>,
    pub company_description: Option<String>,
}

impl Validate for NewCompany {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "company_name", &self.company_name);
        check_optional_max(&mut errors, "industry", self.industry.as_deref(), 100);
        check_optional_max(&mut errors, "company_size", self.company_size.as_deref(), 50);
        check_optional_max(&mut errors, "headquarters", self.headquarters.as_deref(), 200);
        check_optional_max(&mut errors, "website", self.website.as_deref(), 500);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewRole {
    pub role_name: String,
    pub role_category: Option<String>,
    pub role_description: Option<String>,
    #[serde(default)]
    pub typical_skills: Vec<String>,
}

impl Validate for NewRole {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "role_name", &self.role_name);
        check_optional_max(&mut errors, "role_category", self.role_category.as_deref(), 100);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterview {
    pub company_id: Option<i32>,
    pub role_id: Option<i32>,
    pub custom_role_title: Option<String>,
    #[serde(default)]
    pub interview_type: InterviewType,
    pub seniority_level: SeniorityLevel,
    #[serde(default)]
    pub interview_status: InterviewStatus,
    #[serde(default)]
    pub interview_result: InterviewResult,
    pub job_description: Option<String>,
    #[serde(default)]
    pub main_skills_required: Vec<String>,
    pub job_location: Option<String>,
    #[serde(default)]
    pub is_remote: bool,
    pub salary_range: Option<String>,
    pub application_date: Option<NaiveDate>,
    pub first_interview_date: Option<NaiveDate>,
    pub overall_feedback: Option<String>,
    pub preparation_notes: Option<String>,
}

impl Validate for NewInterview {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_optional_max(&mut errors, "custom_role_title", self.custom_role_title.as_deref(), 200);
        check_optional_max(&mut errors, "job_location", self.job_location.as_deref(), 200);
        check_optional_max(&mut errors, "salary_range", self.salary_range.as_deref(), 100);
        errors.into_result()
    }
}

/// Partial update: absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InterviewUpdate {
    pub company_id: Option<i32>,
    pub role_id: Option<i32>,
    pub custom_role_title: Option<String>,
    pub interview_type: Option<InterviewType>,
    pub seniority_level: Option<SeniorityLevel>,
    pub interview_status: Option<InterviewStatus>,
    pub interview_result: Option<InterviewResult>,
    pub job_description: Option<String>,
    pub main_skills_required: Option<Vec<String>>,
    pub job_location: Option<String>,
    pub is_remote: Option<bool>,
    pub salary_range: Option<String>,
    pub application_date: Option<NaiveDate>,
    pub first_interview_date: Option<NaiveDate>,
    pub overall_feedback: Option<String>,
    pub preparation_notes: Option<String>,
}

impl Validate for InterviewUpdate {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_optional_max(&mut errors, "custom_role_title", self.custom_role_title.as_deref(), 200);
        check_optional_max(&mut errors, "job_location", self.job_location.as_deref(), 200);
        check_optional_max(&mut errors, "salary_range", self.salary_range.as_deref(), 100);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub question_category: QuestionCategory,
    #[serde(default)]
    pub question_difficulty: QuestionDifficulty,
    pub question_context: Option<String>,
    pub answer_summary: Option<String>,
    pub answer_markdown_content: Option<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for NewQuestion {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_question_text(&mut errors, &self.question_text);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuestionUpdate {
    pub question_text: Option<String>,
    pub question_category: Option<QuestionCategory>,
    pub question_difficulty: Option<QuestionDifficulty>,
    pub question_context: Option<String>,
    pub answer_summary: Option<String>,
    pub answer_markdown_content: Option<String>,
    pub key_concepts: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub times_asked: Option<i32>,
    pub times_practiced: Option<i32>,
    pub is_active: Option<bool>,
}

impl Validate for QuestionUpdate {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if let Some(text) = &self.question_text {
            check_question_text(&mut errors, text);
        }
        check_non_negative(&mut errors, "times_asked", self.times_asked);
        check_non_negative(&mut errors, "times_practiced", self.times_practiced);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewSkill {
    pub skill_name: String,
    pub skill_category: Option<String>,
    pub skill_type: Option<String>,
    pub skill_description: Option<String>,
    #[serde(default)]
    pub proficiency_levels: Vec<String>,
    #[serde(default)]
    pub related_skills: Vec<i32>,
    pub parent_skill_id: Option<i32>,
    #[serde(default)]
    pub is_trending: bool,
    pub market_demand: Option<String>,
    pub average_salary_impact_percentage: Option<f64>,
    #[serde(default)]
    pub learning_resources: Vec<String>,
    pub official_documentation_url: Option<String>,
}

impl Validate for NewSkill {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "skill_name", &self.skill_name);
        check_optional_max(&mut errors, "skill_category", self.skill_category.as_deref(), 100);
        check_optional_max(&mut errors, "skill_type", self.skill_type.as_deref(), 100);
        check_optional_max(&mut errors, "market_demand", self.market_demand.as_deref(), 20);
        check_optional_max(
            &mut errors,
            "official_documentation_url",
            self.official_documentation_url.as_deref(),
            500,
        );
        if self
            .average_salary_impact_percentage
            .is_some_and(|v| !v.is_finite() || v.abs() >= 1000.0)
        {
            errors.add(ValidationError::new(
                "average_salary_impact_percentage",
                "must be a number below 1000 in magnitude",
            ));
        }
        errors.into_result()
    }
}

/// The interview comes from the path, not the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterviewRound {
    pub round_number: i32,
    pub round_name: Option<String>,
    pub round_type: RoundType,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub timezone: Option<String>,
    #[serde(default = "default_true")]
    pub is_virtual: bool,
    pub meeting_platform: Option<String>,
    pub meeting_link: Option<String>,
    pub physical_location: Option<String>,
    pub interviewer_name: Option<String>,
    pub interviewer_title: Option<String>,
    pub interviewer_linkedin_url: Option<String>,
    pub interviewer_email: Option<String>,
    pub interviewer_notes: Option<String>,
    #[serde(default)]
    pub round_status: InterviewStatus,
    #[serde(default)]
    pub round_result: InterviewResult,
    pub feedback: Option<String>,
    pub rating: Option<i32>,
    pub preparation_notes: Option<String>,
    pub questions_asked_summary: Option<String>,
    #[serde(default)]
    pub key_topics_covered: Vec<String>,
    pub follow_up_actions: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Validate for NewInterviewRound {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.round_number < 1 {
            errors.add(ValidationError::new("round_number", "must be at least 1"));
        }
        check_non_negative(&mut errors, "duration_minutes", self.duration_minutes);
        check_range(&mut errors, "rating", self.rating, 1, 10);
        for (field, value, max) in [
            ("round_name", &self.round_name, 200),
            ("timezone", &self.timezone, 50),
            ("meeting_platform", &self.meeting_platform, 100),
            ("meeting_link", &self.meeting_link, 500),
            ("physical_location", &self.physical_location, 500),
            ("interviewer_name", &self.interviewer_name, 200),
            ("interviewer_title", &self.interviewer_title, 200),
            ("interviewer_linkedin_url", &self.interviewer_linkedin_url, 500),
            ("interviewer_email", &self.interviewer_email, 200),
        ] {
            check_optional_max(&mut errors, field, value.as_deref(), max);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterviewQuestion {
    pub question_id: i32,
    pub round_id: Option<i32>,
    #[serde(default = "default_true")]
    pub was_asked: bool,
    pub order_asked: Option<i32>,
    pub candidate_answer: Option<String>,
    pub answer_quality_rating: Option<i32>,
    pub time_taken_minutes: Option<i32>,
    pub interviewer_feedback: Option<String>,
    pub what_went_well: Option<String>,
    pub what_could_improve: Option<String>,
    #[serde(default)]
    pub was_prepared: bool,
    pub preparation_notes: Option<String>,
    pub confidence_level: Option<i32>,
    #[serde(default)]
    pub follow_up_questions_asked: Vec<String>,
    #[serde(default)]
    pub follow_up_answers: Vec<String>,
}

impl Validate for NewInterviewQuestion {
    fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_range(&mut errors, "answer_quality_rating", self.answer_quality_rating, 1, 10);
        check_range(&mut errors, "confidence_level", self.confidence_level, 1, 10);
        check_non_negative(&mut errors, "time_taken_minutes", self.time_taken_minutes);
        check_non_negative(&mut errors, "order_asked", self.order_asked);
        errors.into_result()
    }
}

// ============================================================================
// LISTING
// ============================================================================

pub const MAX_PAGE_SIZE: i64 = 100;

/// Validated `skip`/`limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub fn resolve(skip: Option<i64>, limit: Option<i64>, default_limit: i64) -> Result<Self> {
        let page = Self {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(default_limit),
        };

        let mut errors = ValidationErrors::new();
        if page.skip < 0 {
            errors.add(ValidationError::new("skip", "must be greater than or equal to 0"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page.limit) {
            errors.add(ValidationError::new(
                "limit",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        errors.into_result()?;
        Ok(page)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewSort {
    #[default]
    CreatedAt,
    ApplicationDate,
    FirstInterviewDate,
    CompanyName,
    InterviewStatus,
}

impl InterviewSort {
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "i.created_at",
            Self::ApplicationDate => "i.application_date",
            Self::FirstInterviewDate => "i.first_interview_date",
            Self::CompanyName => "c.company_name",
            Self::InterviewStatus => "i.interview_status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSort {
    #[default]
    CreatedAt,
    TimesAsked,
    TimesPracticed,
    QuestionDifficulty,
}

impl QuestionSort {
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::TimesAsked => "times_asked",
            Self::TimesPracticed => "times_practiced",
            Self::QuestionDifficulty => "question_difficulty",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub company_id: Option<i32>,
    pub role_id: Option<i32>,
    pub interview_type: Option<InterviewType>,
    pub interview_status: Option<InterviewStatus>,
    pub interview_result: Option<InterviewResult>,
    pub seniority_level: Option<SeniorityLevel>,
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub sort_by: InterviewSort,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<QuestionCategory>,
    pub difficulty: Option<QuestionDifficulty>,
    pub search: Option<String>,
    /// Repeatable: `?tags=rust&tags=async` keeps questions carrying every tag.
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_by: QuestionSort,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub is_trending: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub difficulty: Option<QuestionDifficulty>,
}

/// `{total, skip, limit, data}` envelope for paginated listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(total: i64, page: Page, data: Vec<T>) -> Self {
        Self {
            total,
            skip: page.skip,
            limit: page.limit,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_page_defaults_and_bounds() {
        assert_eq!(Page::resolve(None, None, 20).unwrap(), Page { skip: 0, limit: 20 });
        assert!(Page::resolve(Some(-1), None, 20).is_err());
        assert!(Page::resolve(None, Some(0), 20).is_err());
        assert!(Page::resolve(None, Some(101), 20).is_err());
        assert_eq!(Page::resolve(Some(40), Some(100), 20).unwrap().limit, 100);
    }

    #[test]
    fn test_page_error_names_field() {
        let err = Page::resolve(None, Some(500), 50).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.starts_with("limit"));
    }

    #[test]
    fn test_company_name_required() {
        let company = NewCompany {
            company_name: "   ".to_string(),
            ..Default::default()
        };
        assert!(company.validate().is_err());

        let company = NewCompany {
            company_name: "Acme".to_string(),
            ..Default::default()
        };
        assert!(company.validate().is_ok());
    }

    #[test]
    fn test_question_text_min_length() {
        let question: NewQuestion = serde_json::from_str(
            r#"{"question_text": "Too short", "question_category": "technical"}"#,
        )
        .unwrap();
        assert!(question.validate().is_err());
        assert_eq!(question.question_difficulty, QuestionDifficulty::Medium);
    }

    #[test]
    fn test_interview_defaults() {
        let interview: NewInterview =
            serde_json::from_str(r#"{"company_id": 1, "seniority_level": "senior"}"#).unwrap();
        assert_eq!(interview.interview_type, InterviewType::Actual);
        assert_eq!(interview.interview_status, InterviewStatus::Scheduled);
        assert_eq!(interview.interview_result, InterviewResult::Pending);
        assert!(!interview.is_remote);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(InterviewResult::OfferReceived.to_string(), "offer_received");
        let category: QuestionCategory = serde_json::from_str(r#""system_design""#).unwrap();
        assert_eq!(category, QuestionCategory::SystemDesign);
    }

    #[test]
    fn test_round_defaults() {
        let round: NewInterviewRound =
            serde_json::from_str(r#"{"round_number": 1, "round_type": "phone_screen"}"#).unwrap();
        assert!(round.is_virtual);
        assert_eq!(round.round_status, InterviewStatus::Scheduled);
        assert_eq!(round.round_result, InterviewResult::Pending);
        assert!(round.validate().is_ok());
    }

    #[test]
    fn test_round_bounds() {
        let round: NewInterviewRound = serde_json::from_str(
            r#"{"round_number": 0, "round_type": "coding", "rating": 11, "duration_minutes": -5}"#,
        )
        .unwrap();
        let err = round.validate().unwrap_err();
        assert!(err.message.contains("round_number"));
        assert!(err.message.contains("rating"));
        assert!(err.message.contains("duration_minutes"));
    }

    #[test]
    fn test_linked_question_ratings_in_range() {
        let link: NewInterviewQuestion =
            serde_json::from_str(r#"{"question_id": 4, "confidence_level": 0}"#).unwrap();
        assert!(link.was_asked);
        assert!(!link.was_prepared);
        assert!(link.validate().unwrap_err().message.starts_with("confidence_level"));

        let link: NewInterviewQuestion =
            serde_json::from_str(r#"{"question_id": 4, "answer_quality_rating": 10}"#).unwrap();
        assert!(link.validate().is_ok());
    }

    #[test]
    fn test_skill_validation() {
        let skill = NewSkill {
            skill_name: "Rust".to_string(),
            market_demand: Some("extremely high demand".to_string()),
            ..Default::default()
        };
        assert!(skill.validate().unwrap_err().message.starts_with("market_demand"));

        let skill = NewSkill {
            skill_name: "Rust".to_string(),
            average_salary_impact_percentage: Some(12.5),
            ..Default::default()
        };
        assert!(skill.validate().is_ok());
    }

    #[test]
    fn test_round_type_wire_names() {
        assert_eq!(RoundType::HiringManager.to_string(), "hiring_manager");
        let kind: RoundType = serde_json::from_str(r#""system_design""#).unwrap();
        assert_eq!(kind, RoundType::SystemDesign);
    }

    #[test]
    fn test_negative_counters_rejected() {
        let update = QuestionUpdate {
            times_asked: Some(-1),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
