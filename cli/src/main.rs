//! Thin console front end for the relief coordinator
//!
//! Seeds a small demonstration scenario, runs one matching cycle, and
//! renders the dashboard snapshot as text. Everything interesting happens
//! in the core library; this binary only formats its outputs.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};

use relief_coordinator_core_rs::{
    AuditEntry, AuditLog, AuditLogConfig, CoordinatorObserver, Dashboard, DashboardConfig,
    DashboardSnapshot, Location, MatchingConfig, MatchingEngine, MatchingResult, Need, PanicNeed,
    PriorityLevel, ReliefState, Shipment, ShipmentStatus, Supply,
};

/// Prints panic alerts as they fire
struct ConsoleAlerts;

impl CoordinatorObserver for ConsoleAlerts {
    fn on_panic_mode_triggered(&self, needs: &[PanicNeed]) {
        eprintln!("!! PANIC: {} critical need(s) starving", needs.len());
        for need in needs {
            eprintln!(
                "!!   {} (base {}, waited {:.1}h, {:.0}% met)",
                need.title, need.base_priority, need.hours_waiting, need.fulfillment_percent
            );
        }
    }

    fn on_log_added(&self, _entry: &AuditEntry) {}
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let audit: Arc<AuditLog> = Arc::new(AuditLog::new(AuditLogConfig::default()));
    let now = Utc::now();
    let mut state = seed_scenario(now);

    let engine = MatchingEngine::new(MatchingConfig::default()).with_audit_sink(audit.clone());
    let result = engine.run(&mut state, now);
    print_matching_result(&result);

    let mut dashboard = Dashboard::new(DashboardConfig::default()).with_audit_sink(audit.clone());
    dashboard.add_observer(Arc::new(ConsoleAlerts));
    let snapshot = dashboard.snapshot(&state, now);
    print_snapshot(&snapshot);

    println!("\n--- recent audit entries ---");
    for entry in audit.recent(10) {
        println!(
            "{} {:<20} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.event_type.to_string(),
            entry.message
        );
    }

    Ok(())
}

/// A small field scenario: three camps, two depots, one shipment en route
fn seed_scenario(now: chrono::DateTime<chrono::Utc>) -> ReliefState {
    let mut state = ReliefState::new();

    let camp_east = Location::new(39.9334, 32.8597, "Camp East").with_city("Ankara");
    let camp_river = Location::new(40.1885, 29.0610, "Camp Riverside").with_city("Bursa");
    let depot_4 = Location::new(41.0082, 28.9784, "Depot 4").with_city("Istanbul");
    let depot_7 = Location::new(38.4237, 27.1428, "Depot 7").with_city("Izmir");

    state.add_need(
        Need::new(
            "Drinking water for Camp East",
            "Water",
            PriorityLevel::Critical,
            600,
            "liters",
            camp_east.clone(),
        )
        .with_requester("Field team 2", "+90 555 0000")
        .with_created_at(now - Duration::hours(3)),
    );
    state.add_need(
        Need::new(
            "Antibiotics resupply",
            "Medical",
            PriorityLevel::High,
            80,
            "packs",
            camp_river.clone(),
        )
        .with_deadline(now + Duration::hours(5))
        .with_created_at(now - Duration::hours(1)),
    );
    state.add_need(
        Need::new(
            "Winter blankets",
            "Shelter",
            PriorityLevel::Low,
            400,
            "pieces",
            camp_east.clone(),
        )
        .with_created_at(now - Duration::hours(40)),
    );

    state.add_supply(
        Supply::new("Bottled water 1L", "Water", 500, "liters", depot_4.clone())
            .with_supplier("AquaCo")
            .with_minimum_stock(100),
    );
    state.add_supply(
        Supply::new("Purification tablets", "Hydration", 300, "liters", depot_7.clone())
            .with_expiration(now + Duration::days(5)),
    );
    state.add_supply(
        Supply::new("Broad-spectrum antibiotics", "Medical", 120, "packs", depot_4.clone())
            .with_sku("MED-AB-120"),
    );
    state.add_supply(Supply::new(
        "Wool blankets",
        "Bedding",
        250,
        "pieces",
        depot_7.clone(),
    ));

    let mut shipment = Shipment::new(depot_4, camp_east, 200, PriorityLevel::High)
        .with_carrier("RedCrescent Fleet", "TRK-112", "A. Demir")
        .with_estimated_arrival(now + Duration::hours(6));
    shipment.transition_to(ShipmentStatus::Approved, now);
    shipment.transition_to(ShipmentStatus::InTransit, now);
    state.add_shipment(shipment);

    state
}

fn print_matching_result(result: &MatchingResult) {
    println!("--- matching cycle ---");
    println!("{}", result.message);
    for allocation in &result.allocations {
        println!(
            "  {} <- {} units ({:.0}% met)",
            allocation.need_title,
            allocation.total_quantity(),
            allocation.fulfillment_percent_after
        );
        for slice in &allocation.slices {
            println!(
                "      {} x{} (score {:.2}){}",
                slice.supply_name,
                slice.quantity,
                slice.match_score,
                if slice.supply_depleted { " [depleted]" } else { "" }
            );
        }
    }
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    println!("\n--- dashboard @ {} ---", snapshot.generated_at.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "needs:     {} total | {} fulfilled | {} partial | {} unserved | {:.1}% met",
        snapshot.needs.total,
        snapshot.needs.fulfilled,
        snapshot.needs.partially_fulfilled,
        snapshot.needs.unfulfilled,
        snapshot.needs.percent_met
    );
    println!(
        "supplies:  {} total | {} depleted | {} low stock",
        snapshot.supplies.total, snapshot.supplies.depleted, snapshot.supplies.low_stock
    );
    println!(
        "shipments: {} active | {} pending | {} in transit | {} delivered today",
        snapshot.shipments.active,
        snapshot.shipments.pending,
        snapshot.shipments.in_transit,
        snapshot.shipments.delivered_today
    );

    if !snapshot.critical_missing.is_empty() {
        println!("top missing items:");
        for row in &snapshot.critical_missing {
            println!(
                "  [{:.2}] {} ({} outstanding, waited {:.1}h)",
                row.effective_score, row.title, row.remaining, row.hours_waiting
            );
        }
    }

    println!("by category:");
    for (category, pct) in &snapshot.category_fulfillment {
        let allocatable = snapshot.category_allocatable.get(category).copied().unwrap_or(0);
        println!("  {category:<12} {pct:>5.1}% met, {allocatable} allocatable");
    }
}
