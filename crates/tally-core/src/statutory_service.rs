//! Statutory obligations and manually entered bills.

use uuid::Uuid;

use tally_domain::{Bill, BillStatus, Book, Statutory};

use crate::CoreError;

pub struct StatutoryService;

impl StatutoryService {
    pub fn add(book: &mut Book, statutory: Statutory) -> Result<Uuid, CoreError> {
        validate_obligation(&statutory.name, statutory.amount)?;
        let id = statutory.id;
        book.statutories.push(statutory);
        book.touch();
        Ok(id)
    }

    pub fn update<F>(book: &mut Book, id: Uuid, mutator: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Statutory),
    {
        let statutory = book
            .statutory_mut(id)
            .ok_or(CoreError::StatutoryNotFound(id))?;
        let mut candidate = statutory.clone();
        mutator(&mut candidate);
        validate_obligation(&candidate.name, candidate.amount)?;
        candidate.id = id;
        *statutory = candidate;
        book.touch();
        Ok(())
    }

    /// Stops future bill generation; bills already generated stay open.
    pub fn deactivate(book: &mut Book, id: Uuid) -> Result<(), CoreError> {
        let statutory = book
            .statutory_mut(id)
            .ok_or(CoreError::StatutoryNotFound(id))?;
        statutory.active = false;
        book.touch();
        Ok(())
    }

    /// Adds a one-off bill that is not tied to an obligation.
    pub fn add_bill(book: &mut Book, bill: Bill) -> Result<Uuid, CoreError> {
        validate_obligation(&bill.name, bill.amount)?;
        let id = bill.id;
        book.bills.push(bill);
        book.touch();
        Ok(id)
    }

    pub fn cancel_bill(book: &mut Book, id: Uuid) -> Result<(), CoreError> {
        let bill = book.bill_mut(id).ok_or(CoreError::BillNotFound(id))?;
        if !bill.payments.is_empty() || !bill.is_open() {
            return Err(CoreError::InvalidOperation(format!(
                "bill `{}` cannot be cancelled",
                bill.name
            )));
        }
        bill.status = BillStatus::Cancelled;
        book.touch();
        Ok(())
    }
}

fn validate_obligation(name: &str, amount: f64) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation("amount must be positive".into()));
    }
    Ok(())
}
