use uuid::Uuid;

use tally_domain::{Book, DocumentKind, Followup, FollowupOutcome, FollowupState};

use crate::CoreError;

pub struct FollowupService;

impl FollowupService {
    /// Logs a collection contact on an issued invoice.
    ///
    /// Only promises stay open; every other outcome is closed on entry.
    pub fn log(book: &mut Book, mut followup: Followup) -> Result<Uuid, CoreError> {
        let doc = book
            .document(followup.document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(followup.document_id.to_string()))?;
        if doc.kind != DocumentKind::Invoice || doc.number.is_none() {
            return Err(CoreError::InvalidOperation(
                "followups can only be logged on issued invoices".into(),
            ));
        }
        if followup.outcome == FollowupOutcome::PromiseToPay {
            match followup.promise_date {
                None => {
                    return Err(CoreError::Validation(
                        "a promise to pay needs a promise date".into(),
                    ))
                }
                Some(date) if date < followup.contact_date => {
                    return Err(CoreError::Validation(
                        "promise date cannot precede the contact date".into(),
                    ))
                }
                Some(_) => followup.state = FollowupState::Open,
            }
        } else {
            followup.state = FollowupState::Closed;
        }
        let id = followup.id;
        book.followups.push(followup);
        book.touch();
        Ok(id)
    }

    pub fn close(book: &mut Book, followup_id: Uuid) -> Result<(), CoreError> {
        let followup = book
            .followup_mut(followup_id)
            .ok_or(CoreError::FollowupNotFound(followup_id))?;
        if followup.state != FollowupState::Open {
            return Err(CoreError::InvalidOperation(format!(
                "followup is already {}",
                followup.state
            )));
        }
        followup.state = FollowupState::Closed;
        book.touch();
        Ok(())
    }

    /// Followups for a document, oldest contact first.
    pub fn for_document(book: &Book, document_id: Uuid) -> Vec<&Followup> {
        let mut entries: Vec<_> = book
            .followups
            .iter()
            .filter(|f| f.document_id == document_id)
            .collect();
        entries.sort_by_key(|f| f.contact_date);
        entries
    }
}
