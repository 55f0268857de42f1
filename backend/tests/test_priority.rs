//! Effective-priority scoring and ordering tests

use chrono::{Duration, Utc};

use relief_coordinator_core_rs::{
    AgingConfig, Location, Need, PriorityLevel, PriorityManager,
};

fn need(priority: PriorityLevel, required: u32) -> Need {
    Need::new("n", "Food", priority, required, "boxes", Location::unknown("camp"))
}

#[test]
fn test_zero_wait_score_equals_base_numeric() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    for priority in [
        PriorityLevel::Critical,
        PriorityLevel::High,
        PriorityLevel::Medium,
        PriorityLevel::Low,
    ] {
        let n = need(priority, 10).with_created_at(now);
        assert_eq!(manager.effective_score(&n, now), priority.numeric());
        assert_eq!(manager.effective_level(&n, now), priority);
    }
}

#[test]
fn test_aging_promotes_low_to_critical() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    let aged_low = need(PriorityLevel::Low, 10).with_created_at(now - Duration::hours(200));
    let fresh_high = need(PriorityLevel::High, 10).with_created_at(now);

    assert_eq!(manager.effective_level(&aged_low, now), PriorityLevel::Critical);

    // The aged Low request must be visited before a freshly created High one
    let needs = vec![fresh_high.clone(), aged_low.clone()];
    let ordered = manager.prioritize(needs.iter(), now);
    assert_eq!(ordered[0].id(), aged_low.id());
    assert_eq!(ordered[1].id(), fresh_high.id());
}

#[test]
fn test_aging_starts_only_past_threshold() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    // High escalates after 6h
    let at_threshold = need(PriorityLevel::High, 10).with_created_at(now - Duration::hours(6));
    assert_eq!(manager.effective_score(&at_threshold, now), 1.0);

    let past = need(PriorityLevel::High, 10).with_created_at(now - Duration::hours(7));
    assert!(manager.effective_score(&past, now) < 1.0);
}

#[test]
fn test_deadline_bonus_tiers() {
    let manager = PriorityManager::default();
    let now = Utc::now();
    let base = PriorityLevel::Low.numeric();

    let cases = [
        (Duration::hours(-2), 2.0), // past deadline
        (Duration::zero(), 2.0),    // deadline exactly now
        (Duration::hours(6), 1.0),  // within six hours
        (Duration::hours(20), 0.5), // within a day
        (Duration::hours(48), 0.0), // comfortably away
    ];

    for (offset, bonus) in cases {
        let n = need(PriorityLevel::Low, 10)
            .with_created_at(now)
            .with_deadline(now + offset);
        let score = manager.effective_score(&n, now);
        assert_eq!(score, base - bonus, "offset {offset:?}");
    }
}

#[test]
fn test_near_completion_bonus_boundary() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    let mut exactly_80 = need(PriorityLevel::Medium, 10_000).with_created_at(now);
    exactly_80.add_fulfilled_quantity(8_000);
    assert_eq!(manager.effective_score(&exactly_80, now), 1.5);

    let mut just_below = need(PriorityLevel::Medium, 10_000).with_created_at(now);
    just_below.add_fulfilled_quantity(7_999);
    assert_eq!(manager.effective_score(&just_below, now), 2.0);

    // A fulfilled need receives no completion bonus
    let mut done = need(PriorityLevel::Medium, 10).with_created_at(now);
    done.add_fulfilled_quantity(10);
    assert_eq!(manager.effective_score(&done, now), 2.0);
}

#[test]
fn test_score_is_clamped_to_range() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    // Critical + past deadline + near completion cannot go below zero
    let mut n = need(PriorityLevel::Critical, 100)
        .with_created_at(now - Duration::hours(50))
        .with_deadline(now - Duration::hours(1));
    n.add_fulfilled_quantity(85);

    assert_eq!(manager.effective_score(&n, now), 0.0);
}

#[test]
fn test_discrete_level_brackets() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    // Medium with a 24h-window deadline: 2.0 - 0.5 = 1.5 -> still Medium
    let n = need(PriorityLevel::Medium, 10)
        .with_created_at(now)
        .with_deadline(now + Duration::hours(20));
    assert_eq!(manager.effective_level(&n, now), PriorityLevel::Medium);

    // Medium with a 6h-window deadline: 2.0 - 1.0 = 1.0 -> High
    let n = need(PriorityLevel::Medium, 10)
        .with_created_at(now)
        .with_deadline(now + Duration::hours(5));
    assert_eq!(manager.effective_level(&n, now), PriorityLevel::High);
}

#[test]
fn test_ordering_is_deterministic_on_ties() {
    let manager = PriorityManager::default();
    let now = Utc::now();

    let first = need(PriorityLevel::Medium, 10).with_created_at(now - Duration::hours(3));
    let second = need(PriorityLevel::Medium, 10).with_created_at(now - Duration::hours(2));
    let third = need(PriorityLevel::Medium, 10).with_created_at(now - Duration::hours(1));

    // Same score for all three: creation order must decide, oldest first
    let shuffled = vec![second.clone(), third.clone(), first.clone()];
    let ordered = manager.prioritize(shuffled.iter(), now);

    let ids: Vec<_> = ordered.iter().map(|n| n.id()).collect();
    assert_eq!(ids, vec![first.id(), second.id(), third.id()]);
}

#[test]
fn test_emergency_preset_is_stricter() {
    let relaxed = PriorityManager::new(AgingConfig::default());
    let strict = PriorityManager::new(AgingConfig::emergency());
    let now = Utc::now();

    let n = need(PriorityLevel::Low, 10).with_created_at(now - Duration::hours(10));

    // 10h is under the default 24h threshold but past the emergency 6h one
    assert_eq!(relaxed.effective_score(&n, now), 3.0);
    assert!(strict.effective_score(&n, now) < 3.0);
}
