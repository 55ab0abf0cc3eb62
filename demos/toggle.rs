//! Toggle
//!
//! This example demonstrates a switch with a guarded maintenance state.
//!
//! Key concepts:
//! - States built from members, methods and guards
//! - Vetoed transitions returning `false`
//! - Bounded transition history
//! - Checkpoint and resume
//!
//! Run with: cargo run --example toggle

use statecraft::builder::StateBuilder;
use statecraft::core::Guard;
use statecraft::machine::Delegate;
use statecraft::{json, params, Checkpoint, StateMachine, StateMachineBuilder};

fn build() -> Result<StateMachine, Box<dyn std::error::Error>> {
    let machine = StateMachineBuilder::new()
        .state(
            StateBuilder::new("on")
                .member("lit", json!(true))
                .method("flip", |_, ctx| {
                    ctx.transition("off", params! {});
                    Ok(json!("off"))
                })
                .build(),
        )
        .state(
            StateBuilder::new("off")
                .member("lit", json!(false))
                .method("flip", |_, ctx| {
                    ctx.transition("on", params! {});
                    Ok(json!("on"))
                })
                .build(),
        )
        .state(
            StateBuilder::new("maintenance")
                .enter_guard(Guard::blocking_from("on"))
                .on_enter(|t| {
                    println!("  entering maintenance: {:?}", t.param("reason"));
                    Ok(())
                })
                .build(),
        )
        .default_state("off")
        .enable_history(true)
        .max_history_size(Some(3))
        .on_after_transition(|t| {
            println!("  {:?} -> {:?}", t.from(), t.to());
            Ok(())
        })
        .build()?;
    Ok(machine)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Toggle ===\n");

    let mut switch = build()?;
    println!("Start: {:?}, lit = {:?}", switch.current_state_name(), switch.get_member("lit"));

    for _ in 0..3 {
        let next = switch.call_member("flip", &[])?;
        println!("Flipped to {next:?}, lit = {:?}", switch.get_member("lit"));
    }

    println!("\nMaintenance while on:");
    let entered = switch.transition("maintenance", params! { "reason" => "bulb" })?;
    println!("  committed: {entered}");

    switch.transition("off", params! {})?;
    println!("\nMaintenance while off:");
    let entered = switch.transition("maintenance", params! { "reason" => "bulb" })?;
    println!("  committed: {entered}");

    println!("\nHistory (most recent first):");
    for record in switch.transition_history() {
        println!("  {:?} -> {:?} at {}", record.from(), record.to(), record.recorded_at());
    }

    let json = switch.checkpoint().to_json_pretty()?;
    let mut restored = build()?;
    restored.resume(Checkpoint::from_json(&json)?)?;
    println!(
        "\nRestored: {:?} with {} records",
        restored.current_state_name(),
        restored.transition_history().count()
    );

    Ok(())
}
