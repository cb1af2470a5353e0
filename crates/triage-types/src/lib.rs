//! Shared types for partner triage
//!
//! Companies sourced from job listings, the outreach letters drafted for
//! them and the send records produced when a letter goes out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod envelope;
mod timestamp;

pub use envelope::{Envelope, ErrorCode, ErrorKind, Failure, Success};

/// Strongly typed CompanyId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(i64);

impl CompanyId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly typed LetterId
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterId(i64);

impl LetterId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LetterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a status or option string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

/// Company triage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStatus {
    New,
    Approved,
    Rejected,
    Sent,
    Responded,
}

impl CompanyStatus {
    pub const ALL: [CompanyStatus; 5] = [
        Self::New,
        Self::Approved,
        Self::Rejected,
        Self::Sent,
        Self::Responded,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Sent => "sent",
            Self::Responded => "responded",
        }
    }
}

impl fmt::Display for CompanyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompanyStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("company status", s))
    }
}

/// Letter review status
///
/// `sent` is only ever reported by the REST backend once the letter has
/// gone out; the in-memory store keeps sent letters `approved` and stamps
/// `sent_at` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    Draft,
    Approved,
    Rejected,
    Sent,
}

impl LetterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Sent => "sent",
        }
    }
}

impl fmt::Display for LetterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "sent" => Ok(Self::Sent),
            other => Err(ParseEnumError::new("letter status", other)),
        }
    }
}

/// Letter generation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterTemplate {
    #[default]
    Formal,
    Informal,
}

impl LetterTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Informal => "informal",
        }
    }
}

impl fmt::Display for LetterTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterTemplate {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formal" => Ok(Self::Formal),
            "informal" => Ok(Self::Informal),
            other => Err(ParseEnumError::new("letter template", other)),
        }
    }
}

/// Ordering for company listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    ScoreDesc,
    ScoreAsc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScoreDesc => "score_desc",
            Self::ScoreAsc => "score_asc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score_desc" => Ok(Self::ScoreDesc),
            "score_asc" => Ok(Self::ScoreAsc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            other => Err(ParseEnumError::new("sort order", other)),
        }
    }
}

/// Delivery state of a sent e-mail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Bounced,
}

/// Open vacancy attached to a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: i64,
    pub position: String,
    pub url: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Prospective partner under triage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub vacancy_count: u32,
    #[serde(default)]
    pub main_skills: Vec<String>,
    pub status: CompanyStatus,
    #[serde(default, with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vacancies: Vec<Vacancy>,
}

/// Outreach letter drafted for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub id: LetterId,
    pub company_id: CompanyId,
    pub template: LetterTemplate,
    pub subject: String,
    pub body: String,
    pub status: LetterStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::optional")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Letter {
    pub fn handle(&self) -> LetterHandle {
        LetterHandle {
            id: self.id,
            company_id: self.company_id,
        }
    }
}

/// Identifies a letter together with the company that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LetterHandle {
    pub id: LetterId,
    pub company_id: CompanyId,
}

impl LetterHandle {
    pub fn new(id: LetterId, company_id: CompanyId) -> Self {
        Self { id, company_id }
    }
}

/// Send record for a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailStatus {
    pub company_id: CompanyId,
    pub email: String,
    #[serde(default, with = "timestamp::optional")]
    pub sent_at: Option<DateTime<Utc>>,
    pub delivery_status: DeliveryStatus,
    #[serde(default, with = "timestamp::optional")]
    pub opened_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub clicked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bounced: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Company-level action recorded in the approval log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approved,
    Rejected,
    Sent,
    Responded,
}

/// Approval log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalLogEntry {
    pub company_id: CompanyId,
    pub action: ApprovalAction,
    pub details: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Filters accepted by the company listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFilter {
    pub status: Option<CompanyStatus>,
    /// Case-sensitive exact match
    pub industry: Option<String>,
    /// Inclusive lower bound
    pub min_score: Option<f64>,
    pub sort_by: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CompanyFilter {
    /// Query string pairs for the REST listing, unset filters omitted
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(industry) = &self.industry {
            query.push(("industry".to_string(), industry.clone()));
        }
        if let Some(min_score) = self.min_score {
            query.push(("min_score".to_string(), min_score.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            query.push(("sort_by".to_string(), sort_by.as_str().to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

/// Filters accepted by the letter listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LetterFilter {
    pub status: Option<LetterStatus>,
    pub company_id: Option<CompanyId>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl LetterFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(company_id) = self.company_id {
            query.push(("company_id".to_string(), company_id.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

/// Body of `POST /companies/{id}/approve`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApproveCompanyRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// Body of the company and letter reject endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

/// Body of `PUT /letters/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLetterRequest {
    pub body: String,
}

/// Body of `POST /letters/{id}/approve`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApproveLetterRequest {
    #[serde(default)]
    pub body: Option<String>,
}

/// Body of `POST /emails/send/{company_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
}
