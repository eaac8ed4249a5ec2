use shared::{
    domain::CampaignId,
    error::FieldErrors,
    protocol::{SignupRequest, SignupSubmission},
};

use crate::{
    events::{Collaborators, Route},
    forms::{settle_form, Outcome},
    routes::{campaign_signup_route, confirm_mail_route},
    OmsClient,
};

pub const PASSWORD_MISMATCH: &str = "Passwords don't match";
pub const TERMS_NOT_ACCEPTED: &str = "You must accept the terms and conditions to proceed";
pub const TOKEN_REQUIRED: &str = "Token is required";

/// Public signup through a recruitment campaign.
pub struct Signup {
    client: OmsClient,
    ui: Collaborators,
    campaign_id: CampaignId,
    pub form: SignupSubmission,
    pub terms_accepted: bool,
    pub errors: FieldErrors,
}

impl Signup {
    pub fn new(client: &OmsClient, ui: &Collaborators, campaign_id: CampaignId) -> Self {
        Self {
            client: client.clone(),
            ui: ui.clone(),
            campaign_id,
            form: SignupSubmission::default(),
            terms_accepted: false,
            errors: FieldErrors::new(),
        }
    }

    pub async fn send(&mut self) -> Outcome<()> {
        self.errors.clear();
        if self.form.password != self.form.password_copy {
            self.errors = FieldErrors::single("password", PASSWORD_MISMATCH);
            return Outcome::Skipped;
        }
        if !self.terms_accepted {
            self.errors = FieldErrors::single("terms", TERMS_NOT_ACCEPTED);
            return Outcome::Skipped;
        }

        let result = self
            .client
            .post_action(
                &campaign_signup_route(self.campaign_id),
                Some(&SignupRequest {
                    submission: &self.form,
                }),
            )
            .await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui
                .notifier
                .show_success("You should receive a token in your email inbox soon");
            self.ui.navigator.go(Route::ConfirmSignup {
                campaign_id: Some(self.campaign_id),
            });
        }
        outcome
    }
}

/// Mail confirmation with the token sent after signup.
pub struct ConfirmSignup {
    client: OmsClient,
    ui: Collaborators,
    pub token: String,
    pub campaign_id: Option<CampaignId>,
    pub errors: FieldErrors,
}

impl ConfirmSignup {
    /// `token` and `campaign_id` come prefilled when the user follows the
    /// link from the confirmation mail.
    pub fn new(
        client: &OmsClient,
        ui: &Collaborators,
        token: Option<String>,
        campaign_id: Option<CampaignId>,
    ) -> Self {
        Self {
            client: client.clone(),
            ui: ui.clone(),
            token: token.unwrap_or_default(),
            campaign_id,
            errors: FieldErrors::new(),
        }
    }

    pub async fn submit(&mut self) -> Outcome<()> {
        self.errors.clear();
        let token = self.token.trim();
        if token.is_empty() {
            self.errors = FieldErrors::single("token", TOKEN_REQUIRED);
            return Outcome::Skipped;
        }

        let result = self.client.post_empty(&confirm_mail_route(token)).await;
        let outcome = settle_form(result, &mut self.errors, self.ui.notifier.as_ref());
        if outcome.is_done() {
            self.ui
                .notifier
                .show_success("Congratulations, you can now login with your new username");
            self.ui.navigator.go(Route::Welcome);
        }
        outcome
    }
}
