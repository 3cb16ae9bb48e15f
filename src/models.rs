use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Canonical column order of every backing medium.
pub const COLUMNS: [&str; 5] = [
    "company",
    "job_links",
    "date_applied",
    "connection_status",
    "application_status",
];

/// Separator between job links inside the single `job_links` cell.
pub const LINK_SEPARATOR: char = '|';

/// Stored when an application is added without any link.
pub const PLACEHOLDER_LINK: &str = "N/A";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RecordSet = Vec<Application>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub company: String,
    pub job_links: Vec<String>,
    pub date_applied: NaiveDate,
    pub connection_status: ConnectionStatus,
    pub application_status: ApplicationStatus,
}

impl Application {
    pub fn joined_links(&self) -> String {
        self.job_links.join(&LINK_SEPARATOR.to_string())
    }

    pub fn date_string(&self) -> String {
        self.date_applied.format(DATE_FORMAT).to_string()
    }
}

/// Input for adding an application, before validation.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub company: String,
    pub job_links: Vec<String>,
    pub date_applied: NaiveDate,
    pub connection_status: ConnectionStatus,
    pub application_status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ConnectionStatus {
    #[value(name = "pending")]
    RequestPending,
    #[value(name = "sent")]
    Sent,
    #[value(name = "waiting")]
    WaitingForReferral,
    #[value(name = "referred")]
    AppliedWithReferral,
}

impl ConnectionStatus {
    pub const ALL: [ConnectionStatus; 4] = [
        ConnectionStatus::RequestPending,
        ConnectionStatus::Sent,
        ConnectionStatus::WaitingForReferral,
        ConnectionStatus::AppliedWithReferral,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::RequestPending => "Connection request pending",
            ConnectionStatus::Sent => "Connection sent",
            ConnectionStatus::WaitingForReferral => "Waiting for referral",
            ConnectionStatus::AppliedWithReferral => "Applied with referral",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ConnectionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s.trim())
            .ok_or_else(|| ParseStatusError {
                kind: "connection status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ApplicationStatus {
    #[value(name = "applied")]
    Applied,
    #[value(name = "positive")]
    PositiveResponse,
    #[value(name = "rejected")]
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Applied,
        ApplicationStatus::PositiveResponse,
        ApplicationStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::PositiveResponse => "Positive Response received (further rounds)",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == s.trim())
            .ok_or_else(|| ParseStatusError {
                kind: "application status",
                value: s.to_string(),
            })
    }
}

/// Split a delimited link string, trimming entries and dropping empty ones.
pub fn split_links(input: &str, separator: char) -> Vec<String> {
    input
        .split(separator)
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}
