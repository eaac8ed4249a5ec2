use shared::domain::{BodyId, CampaignId, CircleId, JoinRequestId, MemberId, MembershipId};

pub fn member_route(member_id: MemberId) -> String {
    format!("/members/{member_id}")
}

pub fn body_route(body_id: BodyId) -> String {
    format!("/bodies/{body_id}")
}

pub fn body_circles_route(body_id: BodyId) -> String {
    format!("/bodies/{body_id}/circles")
}

pub fn body_members_route(body_id: BodyId) -> String {
    format!("/bodies/{body_id}/members")
}

pub fn body_membership_route(body_id: BodyId, membership_id: MembershipId) -> String {
    format!("/bodies/{body_id}/members/{membership_id}")
}

pub fn join_request_route(body_id: BodyId, request_id: JoinRequestId) -> String {
    format!("/bodies/{body_id}/join_requests/{request_id}")
}

pub fn circle_route(circle_id: CircleId) -> String {
    format!("/circles/{circle_id}")
}

pub fn circle_members_route(circle_id: CircleId) -> String {
    format!("/circles/{circle_id}/members")
}

pub fn circle_membership_route(circle_id: CircleId, membership_id: MembershipId) -> String {
    format!("/circles/{circle_id}/members/{membership_id}")
}

pub fn circle_permissions_route(circle_id: CircleId) -> String {
    format!("/circles/{circle_id}/permissions")
}

pub fn circle_parent_route(circle_id: CircleId) -> String {
    format!("/circles/{circle_id}/parent")
}

pub fn campaign_route(campaign_id: CampaignId) -> String {
    format!("/backend_campaigns/{campaign_id}")
}

pub fn campaign_signup_route(campaign_id: CampaignId) -> String {
    format!("/campaigns/{campaign_id}")
}

pub fn password_reset_route() -> &'static str {
    "/password_reset"
}

pub fn confirm_password_reset_route(token: &str) -> String {
    format!("/confirm_reset_password/{token}")
}

pub fn confirm_mail_route(token: &str) -> String {
    format!("/confirm_mail/{token}")
}
