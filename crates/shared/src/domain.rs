use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MemberId);
id_newtype!(BodyId);
id_newtype!(CircleId);
id_newtype!(PermissionId);
id_newtype!(CampaignId);
id_newtype!(JoinRequestId);
id_newtype!(MembershipId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    Global,
    Local,
}

/// Collections the admin front-end pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Members,
    Bodies,
    Circles,
    Permissions,
    Campaigns,
    BodyMembers(BodyId),
    JoinRequests(BodyId),
    CircleMembers(CircleId),
}

impl Resource {
    pub fn path(&self) -> String {
        match self {
            Resource::Members => "/members".to_string(),
            Resource::Bodies => "/bodies".to_string(),
            Resource::Circles => "/circles".to_string(),
            Resource::Permissions => "/permissions".to_string(),
            Resource::Campaigns => "/backend_campaigns".to_string(),
            Resource::BodyMembers(body_id) => format!("/bodies/{body_id}/members"),
            Resource::JoinRequests(body_id) => format!("/bodies/{body_id}/join_requests"),
            Resource::CircleMembers(circle_id) => format!("/circles/{circle_id}/members"),
        }
    }

    /// Page size the admin screens use for this collection.
    pub fn default_page_size(&self) -> usize {
        match self {
            Resource::Permissions => 20,
            _ => 10,
        }
    }
}
