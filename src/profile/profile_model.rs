use serde::{Deserialize, Serialize};

// ============================================================================
// User profile
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub linked_in_url: String,
    pub portfolio_url: String,
    pub github_url: String,
}

/// Answer to a yes/no profile question; `Unanswered` serializes as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
    #[default]
    #[serde(rename = "")]
    Unanswered,
}

impl YesNo {
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
            YesNo::Unanswered => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkAuthorization {
    pub authorized_to_work: YesNo,
    pub requires_sponsorship: YesNo,
    pub notice_period: String,
    pub willing_to_relocate: YesNo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub personal: PersonalInfo,
    pub work_auth: WorkAuthorization,
    /// Epoch milliseconds of the last save.
    pub last_updated: i64,
}

impl UserProfile {
    /// Leaf value addressed by a dotted profile key path, `""` when the
    /// path is unknown or the leaf is unset.
    pub fn value_at(&self, key_path: &str) -> &str {
        let p = &self.personal;
        let w = &self.work_auth;
        match key_path {
            "personal.firstName" => &p.first_name,
            "personal.lastName" => &p.last_name,
            "personal.email" => &p.email,
            "personal.phone" => &p.phone,
            "personal.address.street" => &p.address.street,
            "personal.address.city" => &p.address.city,
            "personal.address.state" => &p.address.state,
            "personal.address.country" => &p.address.country,
            "personal.address.postalCode" => &p.address.postal_code,
            "personal.linkedInUrl" => &p.linked_in_url,
            "personal.portfolioUrl" => &p.portfolio_url,
            "personal.githubUrl" => &p.github_url,
            "workAuth.authorizedToWork" => w.authorized_to_work.as_str(),
            "workAuth.requiresSponsorship" => w.requires_sponsorship.as_str(),
            "workAuth.noticePeriod" => &w.notice_period,
            "workAuth.willingToRelocate" => w.willing_to_relocate.as_str(),
            _ => "",
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub overwrite_existing: bool,
    pub preview_before_fill: bool,
}

// ============================================================================
// Application history
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Interviewing,
    Offered,
    Rejected,
    Withdrawn,
    NoResponse,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::NoResponse => "no_response",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationHistoryEntry {
    pub id: String,
    pub company: String,
    pub role: String,
    pub url: String,
    /// Epoch milliseconds.
    pub applied_date: i64,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: String,
    pub portal_domain: String,
}

/// Partial update applied by `update_history_entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryUpdate {
    pub company: Option<String>,
    pub role: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
}

impl HistoryUpdate {
    pub fn apply(self, entry: &mut ApplicationHistoryEntry) {
        if let Some(company) = self.company {
            entry.company = company;
        }
        if let Some(role) = self.role {
            entry.role = role;
        }
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
    }
}
