use crate::domain::model::{Boards, ResponseRecord, Snapshot, TargetSelector};
use std::collections::HashSet;

/// Records matching a target selector against one snapshot. Deterministic:
/// the same selector and snapshot always yield the same list.
pub fn resolve<'a>(
    selector: &TargetSelector,
    snapshot: &'a Snapshot,
    boards: &Boards,
) -> Vec<&'a ResponseRecord> {
    match selector {
        TargetSelector::AllStudents => snapshot.responses.iter().collect(),
        TargetSelector::Board(name) => match boards.clubs_of(name) {
            Some(clubs) => snapshot
                .responses
                .iter()
                .filter(|response| response.clubs().any(|club| clubs.contains(club)))
                .collect(),
            // Unknown board: empty set, surfaced downstream as NoRecipients.
            None => Vec::new(),
        },
        TargetSelector::Club(name) => {
            let name = name.trim();
            snapshot
                .responses
                .iter()
                .filter(|response| response.clubs().any(|club| club == name))
                .collect()
        }
    }
}

/// Deduplicated delivery addresses for a resolved record set, in first
/// encounter order. Records without an email are dropped.
pub fn recipient_emails(records: &[&ResponseRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut emails = Vec::new();
    for record in records {
        if let Some(email) = record.email.as_deref() {
            let email = email.trim();
            if !email.is_empty() && seen.insert(email.to_string()) {
                emails.push(email.to_string());
            }
        }
    }
    emails
}
