//! Family domain models, derived roles, and join-code generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Role of a member within a family. Roles are derived from the family
/// record, never stored per member: the creator is `created_by`, the deputy
/// is `deputy_id`, everyone else is a plain member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Creator,
    Deputy,
    Member,
}

impl FamilyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyRole::Creator => "creator",
            FamilyRole::Deputy => "deputy",
            FamilyRole::Member => "member",
        }
    }

    /// Returns true if this role can remove other members.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, FamilyRole::Creator | FamilyRole::Deputy)
    }

    /// Returns true if this role can designate the deputy.
    pub fn can_set_deputy(&self) -> bool {
        matches!(self, FamilyRole::Creator)
    }
}

impl FromStr for FamilyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creator" => Ok(FamilyRole::Creator),
            "deputy" => Ok(FamilyRole::Deputy),
            "member" => Ok(FamilyRole::Member),
            _ => Err(format!("Invalid family role: {}", s)),
        }
    }
}

impl fmt::Display for FamilyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A family. The join code is both the storage key and the invitation token.
///
/// Invariants: `created_by` is always in `members`; `deputy_id`, when
/// present, is in `members` and differs from `created_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Family {
    pub code: String,
    pub name: String,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
    pub deputy_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Family {
    /// Derived role of `user_id`, or `None` if not a member.
    pub fn role_of(&self, user_id: Uuid) -> Option<FamilyRole> {
        if !self.members.contains(&user_id) {
            return None;
        }
        if user_id == self.created_by {
            Some(FamilyRole::Creator)
        } else if self.deputy_id == Some(user_id) {
            Some(FamilyRole::Deputy)
        } else {
            Some(FamilyRole::Member)
        }
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

/// A resolved member entry: identity plus derived role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: Uuid,
    pub name: String,
    pub role: FamilyRole,
}

/// Request to create a new family.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    #[validate(length(min = 1, max = 100, message = "Family name must be 1-100 characters"))]
    pub name: String,
}

/// Request to join an existing family by code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinFamilyRequest {
    #[validate(custom(function = "shared::validation::validate_join_code"))]
    pub code: String,
}

/// Request to designate a member as deputy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDeputyRequest {
    pub member_id: Uuid,
}

/// Request to leave the family. A creator must nominate a successor.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeaveFamilyRequest {
    pub successor_id: Option<Uuid>,
}

/// Response for a created or joined family.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyResponse {
    pub code: String,
    pub name: String,
    pub member_count: usize,
    pub created_by: Uuid,
    pub deputy_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Family> for FamilyResponse {
    fn from(family: Family) -> Self {
        Self {
            code: family.code,
            name: family.name,
            member_count: family.members.len(),
            created_by: family.created_by,
            deputy_id: family.deputy_id,
            created_at: family.created_at,
        }
    }
}

/// Generates a family join code: three uppercase letters, four digits, two
/// uppercase letters and one symbol (e.g. `ABC-1234-DE#`). Callers must
/// retry against existing codes; the generator itself does not check for
/// collisions.
pub fn generate_join_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let letter = |rng: &mut rand::rngs::ThreadRng| (b'A' + rng.gen_range(0..26)) as char;
    let digit = |rng: &mut rand::rngs::ThreadRng| (b'0' + rng.gen_range(0..10)) as char;

    let mut code = String::with_capacity(12);
    for _ in 0..3 {
        code.push(letter(&mut rng));
    }
    code.push('-');
    for _ in 0..4 {
        code.push(digit(&mut rng));
    }
    code.push('-');
    for _ in 0..2 {
        code.push(letter(&mut rng));
    }

    let symbols = shared::validation::JOIN_CODE_SYMBOLS.as_bytes();
    code.push(symbols[rng.gen_range(0..symbols.len())] as char);

    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(members: Vec<Uuid>, created_by: Uuid, deputy_id: Option<Uuid>) -> Family {
        Family {
            code: "ABC-1234-DE#".into(),
            name: "Test Family".into(),
            members,
            created_by,
            deputy_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn role_derivation() {
        let creator = Uuid::new_v4();
        let deputy = Uuid::new_v4();
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let f = family(vec![creator, deputy, member], creator, Some(deputy));

        assert_eq!(f.role_of(creator), Some(FamilyRole::Creator));
        assert_eq!(f.role_of(deputy), Some(FamilyRole::Deputy));
        assert_eq!(f.role_of(member), Some(FamilyRole::Member));
        assert_eq!(f.role_of(stranger), None);
    }

    #[test]
    fn creator_wins_over_deputy_flag() {
        // A family record should never point deputy_id at the creator, but
        // derivation must still classify the creator as creator.
        let creator = Uuid::new_v4();
        let f = family(vec![creator], creator, Some(creator));
        assert_eq!(f.role_of(creator), Some(FamilyRole::Creator));
    }

    #[test]
    fn role_capabilities() {
        assert!(FamilyRole::Creator.can_manage_members());
        assert!(FamilyRole::Deputy.can_manage_members());
        assert!(!FamilyRole::Member.can_manage_members());

        assert!(FamilyRole::Creator.can_set_deputy());
        assert!(!FamilyRole::Deputy.can_set_deputy());
        assert!(!FamilyRole::Member.can_set_deputy());
    }

    #[test]
    fn role_parse_round_trip() {
        for role in [FamilyRole::Creator, FamilyRole::Deputy, FamilyRole::Member] {
            assert_eq!(role.as_str().parse::<FamilyRole>().unwrap(), role);
        }
        assert!("owner".parse::<FamilyRole>().is_err());
    }

    #[test]
    fn join_code_format() {
        for _ in 0..100 {
            let code = generate_join_code();
            assert!(
                shared::validation::validate_join_code(&code).is_ok(),
                "generated code failed format check: {}",
                code
            );
        }
    }

    #[test]
    fn join_request_rejects_bad_code() {
        let bad = JoinFamilyRequest {
            code: "zzz-0000-zz".into(),
        };
        assert!(bad.validate().is_err());

        let ok = JoinFamilyRequest {
            code: "ZZZ-0000-ZZ#".into(),
        };
        assert!(ok.validate().is_ok());
    }
}
