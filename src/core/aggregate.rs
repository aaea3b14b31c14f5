//! Dashboard views. Every function here is a pure fold over one immutable
//! snapshot; nothing caches, nothing blocks.

use crate::domain::model::{ResponseRecord, RosterRecord, Snapshot};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

const UNKNOWN_YEAR: &str = "Unknown";
const LATEST_RESPONSES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ClubCount {
    pub club: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubLoadDistribution {
    pub one_club: usize,
    pub two_clubs: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearCount {
    pub year: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearParticipation {
    pub years: Vec<YearCount>,
    /// Responses that contributed to no year bucket: no roster match, or a
    /// roster match without a year value.
    pub excluded_responses: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearPercentage {
    pub year: String,
    pub joined: usize,
    pub total: usize,
    pub joined_percent: String,
    pub not_joined_percent: String,
}

impl YearPercentage {
    fn from_counts(year: &str, joined: usize, total: usize) -> Self {
        let (joined_percent, not_joined_percent) = if total == 0 {
            ("0.00".to_string(), "0.00".to_string())
        } else {
            let joined_pct = joined as f64 * 100.0 / total as f64;
            let not_joined_pct = (total - joined) as f64 * 100.0 / total as f64;
            (format!("{:.2}", joined_pct), format!("{:.2}", not_joined_pct))
        };
        Self {
            year: year.to_string(),
            joined,
            total,
            joined_percent,
            not_joined_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearGroup {
    pub year: String,
    pub students: Vec<RosterRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NonResponders {
    pub total: usize,
    pub years: Vec<YearGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub responses: usize,
    pub roster: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardAggregates {
    pub totals: Totals,
    pub club_participation: Vec<ClubCount>,
    pub club_load_distribution: ClubLoadDistribution,
    pub department_distribution: Vec<DepartmentCount>,
    pub year_participation: YearParticipation,
    pub year_participation_percentage: Vec<YearPercentage>,
    pub non_responders: NonResponders,
    pub duplicates: Vec<ResponseRecord>,
    pub latest_responses: Vec<ResponseRecord>,
}

/// All dashboard views in one pass-shaped struct.
pub fn dashboard(snapshot: &Snapshot) -> DashboardAggregates {
    DashboardAggregates {
        totals: Totals {
            responses: snapshot.responses.len(),
            roster: snapshot.roster.len(),
        },
        club_participation: club_participation(snapshot),
        club_load_distribution: club_load_distribution(snapshot),
        department_distribution: department_distribution(snapshot),
        year_participation: year_participation(snapshot),
        year_participation_percentage: year_participation_percentage(snapshot),
        non_responders: non_responders(snapshot),
        duplicates: duplicate_registrations(snapshot),
        latest_responses: snapshot
            .responses
            .iter()
            .rev()
            .take(LATEST_RESPONSES)
            .cloned()
            .collect(),
    }
}

/// Appearance count of each club across both club fields, count-descending,
/// ties in first-encounter order.
pub fn club_participation(snapshot: &Snapshot) -> Vec<ClubCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for response in &snapshot.responses {
        for club in response.clubs() {
            match counts.get_mut(club) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(club, 1);
                    order.push(club);
                }
            }
        }
    }

    let mut items: Vec<ClubCount> = order
        .into_iter()
        .map(|club| ClubCount {
            club: club.to_string(),
            count: counts[club],
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count));
    items
}

/// Responses with exactly one vs exactly two clubs; zero-club responses are
/// not counted.
pub fn club_load_distribution(snapshot: &Snapshot) -> ClubLoadDistribution {
    let mut one_club = 0;
    let mut two_clubs = 0;

    for response in &snapshot.responses {
        match response.clubs().count() {
            1 => one_club += 1,
            2 => two_clubs += 1,
            _ => {}
        }
    }

    ClubLoadDistribution { one_club, two_clubs }
}

/// Response counts grouped by the department value as given, in encounter
/// order. Missing departments group under the empty string.
pub fn department_distribution(snapshot: &Snapshot) -> Vec<DepartmentCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for response in &snapshot.responses {
        let department = response.department.as_str();
        match counts.get_mut(department) {
            Some(count) => *count += 1,
            None => {
                counts.insert(department, 1);
                order.push(department);
            }
        }
    }

    order
        .into_iter()
        .map(|department| DepartmentCount {
            department: department.to_string(),
            count: counts[department],
        })
        .collect()
}

/// Numeric year labels sort ascending before any non-numeric ones.
fn year_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Response counts per roster year, joined by registration number.
pub fn year_participation(snapshot: &Snapshot) -> YearParticipation {
    let year_by_reg: HashMap<&str, &str> = snapshot
        .roster
        .iter()
        .filter(|student| !student.registration_number.is_empty())
        .map(|student| (student.registration_number.as_str(), student.year.as_str()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut excluded = 0;
    for response in &snapshot.responses {
        match year_by_reg.get(response.registration_number.as_str()).copied() {
            Some(year) if !year.is_empty() => *counts.entry(year).or_insert(0) += 1,
            _ => excluded += 1,
        }
    }

    let mut years: Vec<YearCount> = counts
        .into_iter()
        .map(|(year, count)| YearCount {
            year: year.to_string(),
            count,
        })
        .collect();
    years.sort_by(|a, b| year_order(&a.year, &b.year));

    YearParticipation {
        years,
        excluded_responses: excluded,
    }
}

fn responded_registrations(snapshot: &Snapshot) -> HashSet<&str> {
    snapshot
        .responses
        .iter()
        .map(|response| response.registration_number.as_str())
        .filter(|reg| !reg.is_empty())
        .collect()
}

/// Joined/total counts and two-decimal percentages per roster year.
pub fn year_participation_percentage(snapshot: &Snapshot) -> Vec<YearPercentage> {
    let responded = responded_registrations(snapshot);

    let mut joined: HashMap<&str, usize> = HashMap::new();
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for student in &snapshot.roster {
        let year = if student.year.is_empty() {
            UNKNOWN_YEAR
        } else {
            student.year.as_str()
        };
        *totals.entry(year).or_insert(0) += 1;
        if responded.contains(student.registration_number.as_str()) {
            *joined.entry(year).or_insert(0) += 1;
        }
    }

    let mut items: Vec<YearPercentage> = totals
        .into_iter()
        .map(|(year, total)| {
            YearPercentage::from_counts(year, joined.get(year).copied().unwrap_or(0), total)
        })
        .collect();
    items.sort_by(|a, b| year_order(&a.year, &b.year));
    items
}

/// Roster entries that appear in no response, grouped by year.
pub fn non_responders(snapshot: &Snapshot) -> NonResponders {
    let responded = responded_registrations(snapshot);

    let mut groups: HashMap<&str, Vec<RosterRecord>> = HashMap::new();
    let mut total = 0;
    for student in &snapshot.roster {
        if responded.contains(student.registration_number.as_str()) {
            continue;
        }
        total += 1;
        let year = if student.year.is_empty() {
            UNKNOWN_YEAR
        } else {
            student.year.as_str()
        };
        groups.entry(year).or_default().push(student.clone());
    }

    let mut years: Vec<YearGroup> = groups
        .into_iter()
        .map(|(year, students)| YearGroup {
            year: year.to_string(),
            students,
        })
        .collect();
    years.sort_by(|a, b| year_order(&a.year, &b.year));

    NonResponders { total, years }
}

/// Every record of every registration number submitted more than once,
/// sorted by registration number. Empty keys are ignored.
pub fn duplicate_registrations(snapshot: &Snapshot) -> Vec<ResponseRecord> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for response in &snapshot.responses {
        let reg = response.registration_number.as_str();
        if reg.is_empty() {
            continue;
        }
        *counts.entry(reg).or_insert(0) += 1;
    }

    let mut duplicates: Vec<ResponseRecord> = snapshot
        .responses
        .iter()
        .filter(|response| {
            counts
                .get(response.registration_number.as_str())
                .is_some_and(|count| *count > 1)
        })
        .cloned()
        .collect();
    duplicates.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
    duplicates
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubMember {
    pub name: String,
    pub registration_number: String,
    pub department: String,
    pub year: String,
}

/// Members of one club, joined with their roster year (empty when the
/// registration number has no roster match), optionally filtered by year.
pub fn search_by_club(snapshot: &Snapshot, club: &str, year_filter: Option<&str>) -> Vec<ClubMember> {
    let club = club.trim();
    let year_by_reg: HashMap<&str, &str> = snapshot
        .roster
        .iter()
        .filter(|student| !student.registration_number.is_empty())
        .map(|student| (student.registration_number.as_str(), student.year.as_str()))
        .collect();

    snapshot
        .responses
        .iter()
        .filter(|response| response.clubs().any(|c| c == club))
        .map(|response| ClubMember {
            name: response.name.clone(),
            registration_number: response.registration_number.clone(),
            department: response.department.clone(),
            year: year_by_reg
                .get(response.registration_number.as_str())
                .copied()
                .unwrap_or("")
                .to_string(),
        })
        .filter(|member| year_filter.map_or(true, |year| member.year == year))
        .collect()
}

/// Responses matching a registration number, case-insensitively.
pub fn search_by_registration<'a>(snapshot: &'a Snapshot, reg_no: &str) -> Vec<&'a ResponseRecord> {
    let needle = reg_no.trim().to_lowercase();
    snapshot
        .responses
        .iter()
        .filter(|response| response.registration_number.to_lowercase() == needle)
        .collect()
}

/// Responses with at least one club field filled in.
pub fn joined_at_least_one_club(snapshot: &Snapshot) -> Vec<&ResponseRecord> {
    snapshot
        .responses
        .iter()
        .filter(|response| response.clubs().next().is_some())
        .collect()
}
