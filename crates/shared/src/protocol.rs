use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    BodyId, CampaignId, CircleId, JoinRequestId, MemberId, MembershipId, PermissionId,
    PermissionScope,
};

/// `{"data": <payload>}` wrapper around every single-entity response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{"data": [...]}` wrapper around collection responses. A missing `data`
/// field reads as an empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default)]
    pub primary_body_id: Option<BodyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_body: Option<Box<Body>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BodyId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub scope: PermissionScope,
    pub action: String,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CircleId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub joinable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_id: Option<BodyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_circle_id: Option<CircleId>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMembership {
    pub id: MembershipId,
    pub body_id: BodyId,
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleMembership {
    pub id: MembershipId,
    pub circle_id: CircleId,
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    #[serde(default)]
    pub motivation: String,
    #[serde(default)]
    pub approved: bool,
    pub member_id: MemberId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autojoin_body_id: Option<BodyId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signup form payload. `password_copy` stays client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip)]
    pub password_copy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberUpdateRequest<'a> {
    pub member: &'a Member,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyWriteRequest<'a> {
    pub body: &'a Body,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircleWriteRequest<'a> {
    pub circle: &'a Circle,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinRequestPayload<'a> {
    pub motivation: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinBodyRequest<'a> {
    pub join_request: JoinRequestPayload<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessJoinRequest {
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyMembershipUpdateRequest<'a> {
    pub body_membership: &'a BodyMembership,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircleMembershipUpdateRequest<'a> {
    pub circle_membership: &'a CircleMembership,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionsUpdateRequest<'a> {
    pub permissions: &'a [Permission],
}

#[derive(Debug, Clone, Serialize)]
pub struct SetParentCircleRequest {
    pub parent_circle_id: Option<CircleId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub submission: &'a SignupSubmission,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmPasswordResetRequest<'a> {
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_keeps_unknown_fields_for_round_trip_edits() {
        let raw = r#"{"id":7,"first_name":"Ada","last_name":"Smith","date_of_birth":"1990-04-02","primary_body_id":null,"gender":"f"}"#;
        let member: Member = serde_json::from_str(raw).expect("decode member");
        assert_eq!(member.id, MemberId(7));
        assert_eq!(member.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 2));
        assert_eq!(member.display_name(), "Ada Smith");

        let encoded = serde_json::to_value(MemberUpdateRequest { member: &member }).expect("encode");
        assert_eq!(encoded["member"]["gender"], "f");
    }

    #[test]
    fn join_request_keeps_unknown_fields() {
        let raw = r#"{"id":3,"motivation":"hi","member_id":9,"created_at":"2020-01-01"}"#;
        let request: JoinRequest = serde_json::from_str(raw).expect("decode join request");
        assert_eq!(request.member_id, MemberId(9));
        assert!(!request.approved);

        let encoded = serde_json::to_value(&request).expect("encode");
        assert_eq!(encoded["created_at"], "2020-01-01");
    }

    #[test]
    fn collection_without_data_reads_as_empty_page() {
        let page: CollectionEnvelope<Body> = serde_json::from_str("{}").expect("decode");
        assert!(page.data.is_empty());
    }

    #[test]
    fn signup_never_sends_password_copy() {
        let submission = SignupSubmission {
            password: "hunter22".into(),
            password_copy: "hunter22".into(),
            ..SignupSubmission::default()
        };
        let encoded = serde_json::to_value(SignupRequest {
            submission: &submission,
        })
        .expect("encode");
        assert!(encoded["submission"].get("password_copy").is_none());
        assert_eq!(encoded["submission"]["password"], "hunter22");
    }
}
