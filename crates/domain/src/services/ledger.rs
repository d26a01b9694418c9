//! Task/event ledger aggregation: day views, completion capability,
//! modification capability, and point totals.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::calendar_item::{CalendarItem, ItemKind, LeaderboardEntry};
use crate::models::user::User;

/// The single comparison point for assignee matching. Matching is by
/// display name, case-insensitively, to stay compatible with existing
/// data; a migration to id-based matching only has to touch this function.
pub fn assignee_matches(assignee: Option<&str>, name: &str) -> bool {
    assignee
        .map(|a| a.eq_ignore_ascii_case(name))
        .unwrap_or(false)
}

/// Day view over the ledger: items falling on `date` (UTC calendar day,
/// unrestricted when `None`), optionally narrowed to one kind, ascending by
/// timestamp.
pub fn items_on(
    items: &[CalendarItem],
    date: Option<NaiveDate>,
    kind: Option<ItemKind>,
) -> Vec<CalendarItem> {
    let mut matching: Vec<CalendarItem> = items
        .iter()
        .filter(|item| date.map_or(true, |d| item.date.date_naive() == d))
        .filter(|item| kind.map_or(true, |k| item.kind == k))
        .cloned()
        .collect();
    matching.sort_by_key(|item| item.date);
    matching
}

/// True iff `caller` may complete `item`: it is a task, not yet completed,
/// and assigned to the caller's display name.
pub fn can_complete(item: &CalendarItem, caller: &User) -> bool {
    item.kind == ItemKind::Task
        && !item.completed
        && assignee_matches(item.assignee.as_deref(), &caller.name)
}

/// True iff `caller` may edit or delete `item`: its creator, or (tasks) its
/// assignee by name.
pub fn can_modify(item: &CalendarItem, caller: &User) -> bool {
    item.created_by == caller.id
        || (item.kind == ItemKind::Task
            && assignee_matches(item.assignee.as_deref(), &caller.name))
}

/// Points for a display name: one per completed task assigned to it. No
/// weighting, no decay, no time window.
pub fn points_for(items: &[CalendarItem], name: &str) -> u32 {
    items
        .iter()
        .filter(|item| {
            item.kind == ItemKind::Task
                && item.completed
                && assignee_matches(item.assignee.as_deref(), name)
        })
        .count() as u32
}

/// Leaderboard over `members`, descending by points. The sort is stable, so
/// ties keep the order members were discovered in.
pub fn leaderboard(items: &[CalendarItem], members: &[(Uuid, String)]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = members
        .iter()
        .map(|(user_id, name)| LeaderboardEntry {
            user_id: *user_id,
            name: name.clone(),
            points: points_for(items, name),
        })
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn caller(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            family_code: Some("ABC-1234-DE#".into()),
            is_valid_member: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn task(title: &str, date: DateTime<Utc>, assignee: Option<&str>, completed: bool) -> CalendarItem {
        CalendarItem {
            id: Uuid::new_v4(),
            family_code: "ABC-1234-DE#".into(),
            title: title.into(),
            date,
            color_tag: "#3B82F6".into(),
            kind: ItemKind::Task,
            completed,
            assignee: assignee.map(String::from),
            created_by: Uuid::new_v4(),
            created_by_name: "Alice".into(),
            completed_at: completed.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    fn event(title: &str, date: DateTime<Utc>) -> CalendarItem {
        CalendarItem {
            kind: ItemKind::Event,
            assignee: None,
            completed: false,
            completed_at: None,
            ..task(title, date, None, false)
        }
    }

    #[test]
    fn day_view_filters_and_sorts_ascending() {
        let items = vec![
            task("late", at(2026, 8, 20, 18), Some("Carol"), false),
            event("party", at(2026, 8, 20, 12)),
            task("early", at(2026, 8, 20, 8), Some("Carol"), false),
            task("other day", at(2026, 8, 21, 9), Some("Carol"), false),
        ];

        let day = items_on(&items, Some(at(2026, 8, 20, 0).date_naive()), None);
        let titles: Vec<&str> = day.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "party", "late"]);

        let tasks_only = items_on(
            &items,
            Some(at(2026, 8, 20, 0).date_naive()),
            Some(ItemKind::Task),
        );
        assert_eq!(tasks_only.len(), 2);
        assert!(tasks_only.iter().all(|i| i.kind == ItemKind::Task));
    }

    #[test]
    fn undated_view_spans_days_and_filters_by_kind() {
        let items = vec![
            task("chore", at(2026, 8, 21, 9), Some("Carol"), false),
            event("party", at(2026, 8, 20, 12)),
            task("dishes", at(2026, 8, 20, 8), Some("Carol"), false),
        ];

        let all = items_on(&items, None, None);
        let titles: Vec<&str> = all.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["dishes", "party", "chore"]);

        let events_only = items_on(&items, None, Some(ItemKind::Event));
        assert_eq!(events_only.len(), 1);
        assert_eq!(events_only[0].title, "party");
    }

    #[test]
    fn assignee_matching_is_case_insensitive() {
        assert!(assignee_matches(Some("carol"), "Carol"));
        assert!(assignee_matches(Some("CAROL"), "carol"));
        assert!(!assignee_matches(Some("carole"), "Carol"));
        assert!(!assignee_matches(None, "Carol"));
    }

    #[test]
    fn complete_capability() {
        let carol = caller("Carol");
        let open = task("dishes", Utc::now(), Some("carol"), false);
        let done = task("laundry", Utc::now(), Some("carol"), true);
        let someone_elses = task("vacuum", Utc::now(), Some("Bob"), false);
        let party = event("party", Utc::now());

        assert!(can_complete(&open, &carol));
        assert!(!can_complete(&done, &carol)); // idempotence: not offered again
        assert!(!can_complete(&someone_elses, &carol));
        assert!(!can_complete(&party, &carol));
    }

    #[test]
    fn modify_capability() {
        let carol = caller("Carol");

        let mut own = task("own", Utc::now(), None, false);
        own.created_by = carol.id;
        assert!(can_modify(&own, &carol));

        let assigned = task("assigned", Utc::now(), Some("CAROL"), false);
        assert!(can_modify(&assigned, &carol));

        let unrelated = task("unrelated", Utc::now(), Some("Bob"), false);
        assert!(!can_modify(&unrelated, &carol));

        let mut their_event = event("party", Utc::now());
        their_event.assignee = Some("Carol".into()); // assignee meaningless on events
        assert!(!can_modify(&their_event, &carol));
    }

    #[test]
    fn points_count_completed_tasks_only() {
        let items = vec![
            task("a", Utc::now(), Some("carol"), true),
            task("b", Utc::now(), Some("Carol"), true),
            task("open", Utc::now(), Some("Carol"), false),
            task("bobs", Utc::now(), Some("Bob"), true),
            event("party", Utc::now()),
        ];

        assert_eq!(points_for(&items, "Carol"), 2);
        assert_eq!(points_for(&items, "bob"), 1);
        assert_eq!(points_for(&items, "Dave"), 0);
    }

    #[test]
    fn points_invariant_under_completion_order() {
        let mut items = vec![
            task("a", Utc::now(), Some("carol"), true),
            task("b", Utc::now(), Some("carol"), true),
            task("c", Utc::now(), Some("carol"), true),
        ];
        let before = points_for(&items, "Carol");
        items.reverse();
        assert_eq!(points_for(&items, "Carol"), before);
    }

    #[test]
    fn leaderboard_descending_with_stable_ties() {
        let items = vec![
            task("a", Utc::now(), Some("carol"), true),
            task("b", Utc::now(), Some("carol"), true),
            task("c", Utc::now(), Some("bob"), true),
            task("d", Utc::now(), Some("dave"), true),
        ];
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let members = vec![
            (a, "Alice".to_string()),
            (b, "Bob".to_string()),
            (c, "Carol".to_string()),
            (d, "Dave".to_string()),
        ];

        let board = leaderboard(&items, &members);
        assert_eq!(board[0].name, "Carol");
        assert_eq!(board[0].points, 2);
        // Bob and Dave tie at 1; discovery order is preserved.
        assert_eq!(board[1].name, "Bob");
        assert_eq!(board[2].name, "Dave");
        assert_eq!(board[3].name, "Alice");
        assert_eq!(board[3].points, 0);
    }

    #[test]
    fn scenario_assigned_task_completion() {
        // A creates task T assigned to "carol"; C ("Carol") completes it.
        let carol = caller("Carol");
        let mut t = task("T", Utc::now(), Some("carol"), false);

        assert!(can_complete(&t, &carol));
        t.completed = true;
        t.completed_at = Some(Utc::now());

        assert_eq!(points_for(&[t.clone()], "Carol"), 1);
        assert!(!can_complete(&t, &carol));

        // Completing twice has no observable effect on points.
        assert_eq!(points_for(&[t], "Carol"), 1);
    }
}
