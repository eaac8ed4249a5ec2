use shared::error::FieldErrors;

use crate::{error::RequestError, events::Notifier};

/// Result of a one-shot operation after the failure policy ran.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Done(T),
    /// Nothing was sent (local validation failed or there is nothing to act on).
    Skipped,
    /// The server rejected the input; field errors were recorded on the form.
    Rejected,
    /// The notifier was told about this error.
    Failed(RequestError),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Skipped => Outcome::Skipped,
            Outcome::Rejected => Outcome::Rejected,
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }
}

/// Every failure goes to the notifier.
pub fn settle<T>(result: Result<T, RequestError>, notifier: &dyn Notifier) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Done(value),
        Err(err) => {
            notifier.show_error(&err);
            Outcome::Failed(err)
        }
    }
}

/// 422 responses replace `errors`; every other failure goes to the notifier.
pub fn settle_form<T>(
    result: Result<T, RequestError>,
    errors: &mut FieldErrors,
    notifier: &dyn Notifier,
) -> Outcome<T> {
    settle_form_with(result, errors, notifier, |_| None)
}

/// Like [`settle_form`], with `recover` turning selected failures (a 404
/// on a token lookup, say) into field errors instead of a toast.
pub fn settle_form_with<T>(
    result: Result<T, RequestError>,
    errors: &mut FieldErrors,
    notifier: &dyn Notifier,
    recover: impl FnOnce(&RequestError) -> Option<FieldErrors>,
) -> Outcome<T> {
    match result {
        Ok(value) => {
            errors.clear();
            Outcome::Done(value)
        }
        Err(RequestError::Validation(fields)) => {
            *errors = fields;
            Outcome::Rejected
        }
        Err(err) => match recover(&err) {
            Some(fields) => {
                *errors = fields;
                Outcome::Rejected
            }
            None => {
                notifier.show_error(&err);
                Outcome::Failed(err)
            }
        },
    }
}
