//! Customer intake: validate candidates, then persist the valid subset in
//! one transaction.
//!
//! Validation never fails the call. Each rejected candidate becomes an
//! [`ItemError`] keyed by its 1-based position in the submitted batch. Only
//! storage failures (the existence lookup or the transactional insert) abort
//! the call, and then nothing is committed.

use std::collections::HashSet;
use std::future::Future;

use thiserror::Error;

use crate::customers::{check_candidate, CandidateError, CustomerCandidate, CustomerRecord, NewCustomer};

/// Storage capabilities the intake protocol relies on.
///
/// `insert_all` must be all-or-nothing: either every record is committed and
/// returned in input order, or none is.
pub trait CustomerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether a customer with this normalized email is already persisted.
    fn exists_by_email(&self, email: &str)
        -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Insert every record inside a single transaction.
    fn insert_all(
        &self,
        customers: &[NewCustomer],
    ) -> impl Future<Output = Result<Vec<CustomerRecord>, Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum IntakeError<E: std::error::Error + 'static> {
    #[error("batch of {len} customers exceeds the limit of {limit}")]
    BatchTooLarge { len: usize, limit: usize },
    #[error("customer storage failed: {0}")]
    Storage(#[source] E),
    /// The store broke the `insert_all` contract by returning fewer or more
    /// records than it was given.
    #[error("customer store returned {returned} records for {inserted} inserts")]
    IncompleteInsert { inserted: usize, returned: usize },
}

/// A rejected candidate and its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub position: usize,
    pub reason: CandidateError,
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Item {}: {}", self.position, self.reason)
    }
}

/// Outcome of one intake call. `created.len() + errors.len()` always equals
/// the number of submitted candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Persisted customers in commit order.
    pub created: Vec<CustomerRecord>,
    /// Rejections in ascending position order.
    pub errors: Vec<ItemError>,
}

impl BatchResult {
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.created.len() + self.errors.len()
    }

    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Create customers in bulk.
///
/// # Errors
///
/// Returns [`IntakeError::BatchTooLarge`] when `candidates.len() > max_batch`
/// (nothing is validated or written), or [`IntakeError::Storage`] when the
/// store fails. A storage failure during the insert leaves no rows behind.
pub async fn bulk_create_customers<S>(
    store: &S,
    candidates: &[CustomerCandidate],
    max_batch: usize,
) -> Result<BatchResult, IntakeError<S::Error>>
where
    S: CustomerStore + Sync,
{
    if candidates.len() > max_batch {
        return Err(IntakeError::BatchTooLarge {
            len: candidates.len(),
            limit: max_batch,
        });
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut valid: Vec<NewCustomer> = Vec::new();
    let mut errors: Vec<ItemError> = Vec::new();

    for (idx, candidate) in candidates.iter().enumerate() {
        let position = idx + 1;
        match screen(store, candidate, &seen).await? {
            Ok(customer) => {
                seen.insert(customer.email.clone());
                valid.push(customer);
            }
            Err(reason) => errors.push(ItemError { position, reason }),
        }
    }

    let created = if valid.is_empty() {
        Vec::new()
    } else {
        store.insert_all(&valid).await.map_err(IntakeError::Storage)?
    };
    if created.len() != valid.len() {
        return Err(IntakeError::IncompleteInsert {
            inserted: valid.len(),
            returned: created.len(),
        });
    }

    Ok(BatchResult { created, errors })
}

/// Create a single customer with the same rules as one bulk item.
///
/// The outer `Result` carries storage failures; the inner one carries the
/// validation outcome.
///
/// # Errors
///
/// Returns [`IntakeError::Storage`] when the store fails, or
/// [`IntakeError::IncompleteInsert`] when it does not hand back exactly the
/// inserted record.
pub async fn create_customer<S>(
    store: &S,
    candidate: &CustomerCandidate,
) -> Result<Result<CustomerRecord, CandidateError>, IntakeError<S::Error>>
where
    S: CustomerStore + Sync,
{
    let customer = match screen(store, candidate, &HashSet::new()).await? {
        Ok(customer) => customer,
        Err(reason) => return Ok(Err(reason)),
    };

    let mut created = store
        .insert_all(std::slice::from_ref(&customer))
        .await
        .map_err(IntakeError::Storage)?;

    let returned = created.len();
    match created.pop() {
        Some(record) if returned == 1 => Ok(Ok(record)),
        _ => Err(IntakeError::IncompleteInsert {
            inserted: 1,
            returned,
        }),
    }
}

/// Apply checks 1-5 to one candidate. `seen` holds the emails of earlier
/// accepted candidates in the same batch.
async fn screen<S>(
    store: &S,
    candidate: &CustomerCandidate,
    seen: &HashSet<String>,
) -> Result<Result<NewCustomer, CandidateError>, IntakeError<S::Error>>
where
    S: CustomerStore + Sync,
{
    let customer = match check_candidate(candidate) {
        Ok(customer) => customer,
        Err(reason) => return Ok(Err(reason)),
    };

    if seen.contains(&customer.email) {
        return Ok(Err(CandidateError::DuplicateInRequest(customer.email)));
    }

    if store
        .exists_by_email(&customer.email)
        .await
        .map_err(IntakeError::Storage)?
    {
        return Ok(Err(CandidateError::EmailExists(customer.email)));
    }

    Ok(Ok(customer))
}

#[cfg(test)]
#[path = "intake_test.rs"]
mod tests;
