use shared::{
    error::FieldErrors,
    protocol::{ConfirmPasswordResetRequest, PasswordResetRequest},
};

use super::signup::{PASSWORD_MISMATCH, TOKEN_REQUIRED};
use crate::{
    events::{Collaborators, Route},
    forms::{settle_form_with, Outcome},
    routes::{confirm_password_reset_route, password_reset_route},
    OmsClient,
};

/// Two-step password reset: ask for a token by mail, then set a new
/// password with it.
pub struct PasswordReset {
    client: OmsClient,
    ui: Collaborators,
    pub email: String,
    pub token: String,
    pub new_password: String,
    pub new_password_copy: String,
    /// Whether the token came from the reset link.
    pub token_from_link: bool,
    pub show_token_field: bool,
    pub errors: FieldErrors,
}

impl PasswordReset {
    pub fn new(client: &OmsClient, ui: &Collaborators, token: Option<String>) -> Self {
        let token_from_link = token.is_some();
        Self {
            client: client.clone(),
            ui: ui.clone(),
            email: String::new(),
            token: token.unwrap_or_default(),
            new_password: String::new(),
            new_password_copy: String::new(),
            token_from_link,
            show_token_field: token_from_link,
            errors: FieldErrors::new(),
        }
    }

    pub async fn send_reset_request(&mut self) -> Outcome<()> {
        self.errors.clear();
        let result = self
            .client
            .post_action(
                password_reset_route(),
                Some(&PasswordResetRequest { email: &self.email }),
            )
            .await;
        let outcome = settle_form_with(
            result,
            &mut self.errors,
            self.ui.notifier.as_ref(),
            |err| {
                err.is_not_found()
                    .then(|| FieldErrors::single("email", "Email not found"))
            },
        );
        if outcome.is_done() {
            self.ui.notifier.show_success(
                "You should receive a mail soon, please enter the token you were provided",
            );
            self.show_token_field = true;
        }
        outcome
    }

    pub async fn confirm_reset_request(&mut self) -> Outcome<()> {
        self.errors.clear();
        if self.new_password != self.new_password_copy {
            self.errors = FieldErrors::single("password", PASSWORD_MISMATCH);
            return Outcome::Skipped;
        }
        if self.token.trim().is_empty() {
            self.errors = FieldErrors::single("token", TOKEN_REQUIRED);
            return Outcome::Skipped;
        }

        let result = self
            .client
            .post_action(
                &confirm_password_reset_route(self.token.trim()),
                Some(&ConfirmPasswordResetRequest {
                    password: &self.new_password,
                }),
            )
            .await;
        let outcome = settle_form_with(
            result,
            &mut self.errors,
            self.ui.notifier.as_ref(),
            |err| {
                err.is_not_found()
                    .then(|| FieldErrors::single("token", "Invalid token"))
            },
        );
        if outcome.is_done() {
            self.ui.notifier.show_success("Password changed successfully");
            self.ui.navigator.go(Route::Welcome);
        }
        outcome
    }
}
