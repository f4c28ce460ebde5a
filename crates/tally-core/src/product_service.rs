use uuid::Uuid;

use tally_domain::{Book, Product};

use crate::CoreError;

pub struct ProductService;

impl ProductService {
    pub fn add(book: &mut Book, product: Product) -> Result<Uuid, CoreError> {
        validate_product(&product)?;
        let id = product.id;
        book.products.push(product);
        book.touch();
        Ok(id)
    }

    pub fn update<F>(book: &mut Book, id: Uuid, mutator: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Product),
    {
        let product = book.product_mut(id).ok_or(CoreError::ProductNotFound(id))?;
        let mut candidate = product.clone();
        mutator(&mut candidate);
        validate_product(&candidate)?;
        candidate.id = id;
        *product = candidate;
        book.touch();
        Ok(())
    }

    /// Removes the catalogue entry. Existing document lines keep their copied values.
    pub fn remove(book: &mut Book, id: Uuid) -> Result<Product, CoreError> {
        let index = book
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(CoreError::ProductNotFound(id))?;
        let removed = book.products.remove(index);
        book.touch();
        Ok(removed)
    }
}

fn validate_product(product: &Product) -> Result<(), CoreError> {
    if product.name.trim().is_empty() {
        return Err(CoreError::Validation("product name must not be empty".into()));
    }
    if !product.unit_price.is_finite() || product.unit_price < 0.0 {
        return Err(CoreError::Validation("unit price must not be negative".into()));
    }
    validate_tax_rate(product.tax_rate)
}

pub(crate) fn validate_tax_rate(rate: f64) -> Result<(), CoreError> {
    if (0.0..=100.0).contains(&rate) {
        Ok(())
    } else {
        Err(CoreError::Validation("tax rate must be between 0 and 100".into()))
    }
}
