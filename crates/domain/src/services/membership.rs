//! Family membership resolution and administrative capability checks.
//!
//! Roles are derived from the family record on every call. The functions
//! here validate an intent and return a plan; applying the plan (and doing
//! so atomically) is the persistence layer's job.

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::family::{Family, FamilyMember, FamilyRole};
use crate::models::user::User;

/// Resolves a family's member list, in the order the ids appear on the
/// family record. Referenced users missing from `users` are skipped.
pub fn resolve_members(family: &Family, users: &[User]) -> Vec<FamilyMember> {
    family
        .members
        .iter()
        .filter_map(|member_id| {
            let user = users.iter().find(|u| u.id == *member_id)?;
            let role = family.role_of(*member_id)?;
            Some(FamilyMember {
                id: *member_id,
                name: user.name.clone(),
                role,
            })
        })
        .collect()
}

/// Checks that `caller` may remove `target` from the family: caller must
/// hold a managing role (creator or deputy), and may not remove self.
pub fn ensure_can_remove(
    family: &Family,
    caller: Uuid,
    target: Uuid,
) -> Result<(), DomainError> {
    let caller_role = family
        .role_of(caller)
        .ok_or(DomainError::NotInFamily)?;

    if !caller_role.can_manage_members() {
        return Err(DomainError::forbidden(
            "Only the creator or deputy can remove members",
        ));
    }
    if caller == target {
        return Err(DomainError::forbidden(
            "Use leave to remove yourself from the family",
        ));
    }
    // Removing the creator would orphan the family record; the creator
    // departs via leave, which installs a successor.
    if target == family.created_by {
        return Err(DomainError::forbidden("The creator cannot be removed"));
    }
    if !family.is_member(target) {
        return Err(DomainError::not_found("Member not found in this family"));
    }
    Ok(())
}

/// Checks that `caller` may designate `member_id` as deputy: creator only,
/// target must be a member other than the creator. Any existing deputy is
/// displaced back to plain member by the same write.
pub fn ensure_can_set_deputy(
    family: &Family,
    caller: Uuid,
    member_id: Uuid,
) -> Result<(), DomainError> {
    let caller_role = family
        .role_of(caller)
        .ok_or(DomainError::NotInFamily)?;

    if !caller_role.can_set_deputy() {
        return Err(DomainError::forbidden(
            "Only the creator can designate a deputy",
        ));
    }
    if member_id == family.created_by {
        return Err(DomainError::forbidden(
            "The creator cannot also be the deputy",
        ));
    }
    if !family.is_member(member_id) {
        return Err(DomainError::not_found("Member not found in this family"));
    }
    Ok(())
}

/// The validated outcome of a leave intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeavePlan {
    /// When the caller is the creator, the nominated successor to install
    /// as `created_by` (clearing the deputy) before the caller departs.
    pub new_creator: Option<Uuid>,
}

/// Validates a leave-family intent.
///
/// Members leave unconditionally. A creator must nominate a successor from
/// the remaining members; without one the operation fails with
/// `MissingSuccessor` and nothing changes.
pub fn plan_leave(
    family: &Family,
    caller: Uuid,
    successor: Option<Uuid>,
) -> Result<LeavePlan, DomainError> {
    let role = family.role_of(caller).ok_or(DomainError::NotInFamily)?;

    if role != FamilyRole::Creator {
        return Ok(LeavePlan { new_creator: None });
    }

    let successor = successor.ok_or(DomainError::MissingSuccessor)?;
    if successor == caller || !family.is_member(successor) {
        return Err(DomainError::MissingSuccessor);
    }

    Ok(LeavePlan {
        new_creator: Some(successor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: Uuid, name: &str, family: &str) -> User {
        User {
            id,
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            family_code: Some(family.into()),
            is_valid_member: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn family(members: &[Uuid], created_by: Uuid, deputy_id: Option<Uuid>) -> Family {
        Family {
            code: "ABC-1234-DE#".into(),
            name: "Testers".into(),
            members: members.to_vec(),
            created_by,
            deputy_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn member_list_ordered_with_roles() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b, c], a, Some(b));
        let users = vec![
            user(c, "Carol", &f.code),
            user(a, "Alice", &f.code),
            user(b, "Bob", &f.code),
        ];

        let members = resolve_members(&f, &users);
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].name, "Alice");
        assert_eq!(members[0].role, FamilyRole::Creator);
        assert_eq!(members[1].role, FamilyRole::Deputy);
        assert_eq!(members[2].role, FamilyRole::Member);

        // Exactly one creator, at most one deputy.
        assert_eq!(
            members.iter().filter(|m| m.role == FamilyRole::Creator).count(),
            1
        );
        assert!(members.iter().filter(|m| m.role == FamilyRole::Deputy).count() <= 1);
    }

    #[test]
    fn missing_user_rows_are_skipped() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, None);
        let members = resolve_members(&f, &[user(a, "Alice", &f.code)]);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, a);
    }

    #[test]
    fn remove_requires_managing_role() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b, c], a, Some(b));

        assert!(ensure_can_remove(&f, a, c).is_ok()); // creator
        assert!(ensure_can_remove(&f, b, c).is_ok()); // deputy
        assert!(matches!(
            ensure_can_remove(&f, c, b),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn remove_self_rejected() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, None);
        assert!(matches!(
            ensure_can_remove(&f, a, a),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn deputy_cannot_remove_creator() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, Some(b));
        assert!(matches!(
            ensure_can_remove(&f, b, a),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn remove_outsider_not_found() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, None);
        assert!(matches!(
            ensure_can_remove(&f, a, Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn set_deputy_creator_only_and_never_creator() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b, c], a, None);

        assert!(ensure_can_set_deputy(&f, a, b).is_ok());
        assert!(matches!(
            ensure_can_set_deputy(&f, b, c),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_can_set_deputy(&f, a, a),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn set_deputy_displacement_keeps_single_deputy() {
        // A sets B deputy, then C: the write replaces deputy_id wholesale,
        // so derivation never yields two deputies.
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut f = family(&[a, b, c], a, None);

        ensure_can_set_deputy(&f, a, b).unwrap();
        f.deputy_id = Some(b);
        assert_eq!(f.role_of(b), Some(FamilyRole::Deputy));

        ensure_can_set_deputy(&f, a, c).unwrap();
        f.deputy_id = Some(c);
        assert_eq!(f.role_of(b), Some(FamilyRole::Member));
        assert_eq!(f.role_of(c), Some(FamilyRole::Deputy));
    }

    #[test]
    fn member_leave_needs_no_successor() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, None);
        let plan = plan_leave(&f, b, None).unwrap();
        assert_eq!(plan.new_creator, None);
    }

    #[test]
    fn creator_leave_without_successor_fails_and_mutates_nothing() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b, c], a, Some(b));

        let err = plan_leave(&f, a, None).unwrap_err();
        assert_eq!(err, DomainError::MissingSuccessor);

        // Plan validation touched nothing: A is still the creator.
        assert_eq!(f.role_of(a), Some(FamilyRole::Creator));
        assert_eq!(f.created_by, a);
        assert_eq!(f.members.len(), 3);
    }

    #[test]
    fn creator_leave_with_successor() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, Some(b));

        let plan = plan_leave(&f, a, Some(b)).unwrap();
        assert_eq!(plan.new_creator, Some(b));
    }

    #[test]
    fn creator_cannot_nominate_self_or_outsider() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let f = family(&[a, b], a, None);

        assert_eq!(plan_leave(&f, a, Some(a)).unwrap_err(), DomainError::MissingSuccessor);
        assert_eq!(
            plan_leave(&f, a, Some(Uuid::new_v4())).unwrap_err(),
            DomainError::MissingSuccessor
        );
    }

    #[test]
    fn non_member_cannot_leave() {
        let a = Uuid::new_v4();
        let f = family(&[a], a, None);
        assert_eq!(
            plan_leave(&f, Uuid::new_v4(), None).unwrap_err(),
            DomainError::NotInFamily
        );
    }
}
