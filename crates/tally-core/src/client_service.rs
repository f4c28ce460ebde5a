//! Client maintenance.

use uuid::Uuid;

use tally_domain::{Book, Client};

use crate::CoreError;

pub struct ClientService;

impl ClientService {
    pub fn add(book: &mut Book, client: Client) -> Result<Uuid, CoreError> {
        validate_client(&client)?;
        let id = client.id;
        book.clients.push(client);
        book.touch();
        Ok(id)
    }

    /// Applies `mutator` to the client and re-validates the result.
    pub fn update<F>(book: &mut Book, id: Uuid, mutator: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Client),
    {
        let client = book.client_mut(id).ok_or(CoreError::ClientNotFound(id))?;
        let mut candidate = client.clone();
        mutator(&mut candidate);
        validate_client(&candidate)?;
        candidate.id = id;
        *client = candidate;
        book.touch();
        Ok(())
    }

    /// Deactivated clients keep their history but cannot receive new documents.
    pub fn deactivate(book: &mut Book, id: Uuid) -> Result<(), CoreError> {
        let client = book.client_mut(id).ok_or(CoreError::ClientNotFound(id))?;
        client.active = false;
        book.touch();
        Ok(())
    }

    pub fn remove(book: &mut Book, id: Uuid) -> Result<Client, CoreError> {
        let index = book
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(CoreError::ClientNotFound(id))?;
        if book.documents.iter().any(|d| d.client_id == id) {
            return Err(CoreError::InvalidOperation(
                "client has documents; deactivate it instead".into(),
            ));
        }
        let removed = book.clients.remove(index);
        book.touch();
        Ok(removed)
    }
}

fn validate_client(client: &Client) -> Result<(), CoreError> {
    if client.name.trim().is_empty() {
        return Err(CoreError::Validation("client name must not be empty".into()));
    }
    validate_email(&client.email)
}

pub(crate) fn validate_email(email: &str) -> Result<(), CoreError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("`{email}` is not a valid email address")))
    }
}
