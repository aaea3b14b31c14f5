use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Header name → cell value mapping produced by the CSV collaborator.
pub type SheetRow = HashMap<String, String>;

// Column names of the published spreadsheets.
pub const COL_NAME: &str = "Name";
pub const COL_REG_NO: &str = "Registration Number";
pub const COL_DEPARTMENT: &str = "Department";
pub const COL_YEAR: &str = "Year";
pub const COL_CLUB1: &str = "Club 1";
pub const COL_CLUB2: &str = "Club 2";
pub const COL_EMAIL: &str = "Email address";
pub const COL_PHONE: &str = "Phone Number";

fn cell(row: &SheetRow, column: &str) -> String {
    row.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn optional_cell(row: &SheetRow, column: &str) -> Option<String> {
    row.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// One club-signup submission. Registration numbers are not guaranteed
/// unique here; repeated ones surface in the duplicate report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub registration_number: String,
    pub name: String,
    pub department: String,
    pub club1: Option<String>,
    pub club2: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ResponseRecord {
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            registration_number: cell(row, COL_REG_NO),
            name: cell(row, COL_NAME),
            department: cell(row, COL_DEPARTMENT),
            club1: optional_cell(row, COL_CLUB1),
            club2: optional_cell(row, COL_CLUB2),
            email: optional_cell(row, COL_EMAIL),
            phone: optional_cell(row, COL_PHONE),
        }
    }

    /// Trimmed, non-empty club fields of this submission.
    pub fn clubs(&self) -> impl Iterator<Item = &str> {
        self.club1
            .as_deref()
            .into_iter()
            .chain(self.club2.as_deref())
            .map(str::trim)
            .filter(|club| !club.is_empty())
    }
}

/// One enrolled student from the roster sheet. Registration numbers are
/// unique within the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRecord {
    pub registration_number: String,
    pub name: String,
    pub department: String,
    pub year: String,
}

impl RosterRecord {
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            registration_number: cell(row, COL_REG_NO),
            name: cell(row, COL_NAME),
            department: cell(row, COL_DEPARTMENT),
            year: cell(row, COL_YEAR),
        }
    }
}

/// Immutable pair of datasets fetched together. A refresh builds a new
/// Snapshot; in-flight readers keep the one they already hold.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub responses: Vec<ResponseRecord>,
    pub roster: Vec<RosterRecord>,
    pub clubs: BTreeSet<String>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// The club set is derived here so it always matches `responses`.
    pub fn new(
        responses: Vec<ResponseRecord>,
        roster: Vec<RosterRecord>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let clubs = responses
            .iter()
            .flat_map(|response| response.clubs())
            .map(str::to_string)
            .collect();
        Self {
            responses,
            roster,
            clubs,
            fetched_at,
        }
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }
}

/// Static board → club-names table, loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct Boards {
    table: HashMap<String, HashSet<String>>,
}

impl Boards {
    pub fn new(table: HashMap<String, Vec<String>>) -> Self {
        let table = table
            .into_iter()
            .map(|(board, clubs)| {
                let clubs = clubs
                    .iter()
                    .map(|club| club.trim().to_string())
                    .filter(|club| !club.is_empty())
                    .collect();
                (board.trim().to_string(), clubs)
            })
            .collect();
        Self { table }
    }

    pub fn clubs_of(&self, board: &str) -> Option<&HashSet<String>> {
        self.table.get(board.trim())
    }

    pub fn contains(&self, board: &str) -> bool {
        self.table.contains_key(board.trim())
    }
}

/// The staff member's choice of message recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSelector {
    AllStudents,
    Board(String),
    Club(String),
}

impl TargetSelector {
    pub const ALL_STUDENTS: &'static str = "All Students";

    /// Parses the user-facing strings: "All Students", "<name> Board" for a
    /// configured board, anything else is taken as a club name.
    pub fn parse(raw: &str, boards: &Boards) -> Self {
        let raw = raw.trim();
        if raw == Self::ALL_STUDENTS {
            return Self::AllStudents;
        }
        if let Some(board) = raw.strip_suffix(" Board") {
            if boards.contains(board) {
                return Self::Board(board.trim().to_string());
            }
        }
        Self::Club(raw.to_string())
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllStudents => f.write_str(Self::ALL_STUDENTS),
            Self::Board(name) => write!(f, "{} Board", name),
            Self::Club(name) => f.write_str(name),
        }
    }
}

/// One recorded broadcast. Created before delivery is attempted and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub target: TargetSelector,
    pub sent_by: String,
    pub created_at: DateTime<Utc>,
    pub recipient_count: usize,
}
