//! Dry run of the toolhead scheduler against a simulated device.
//!
//! Demonstrates how to:
//! - Parse printer configuration from TOML
//! - Wire the scheduler to a device, an event loop and kinematics
//! - Queue a printed square and wait for it to complete
//! - Run a homing-style drip move that stops on a trigger
//!
//! Run with: `cargo run --example dry_run --features std`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use toolhead_planner::{
    parse_config,
    sim::{ManualReactor, SimMcu},
    Cartesian, Extruder, Reactor, Result, Toolhead, TrapQ,
};

const PRINTER_TOML: &str = r#"
[toolhead]
max_velocity = 300.0
max_accel = 3000.0
square_corner_velocity = 5.0

[kinematics]
x = { position_min = 0.0, position_max = 200.0 }
y = { position_min = 0.0, position_max = 200.0 }
z = { position_min = 0.0, position_max = 180.0 }
max_z_velocity = 10.0
max_z_accel = 100.0

[extruder]
nozzle_diameter = 0.4
filament_diameter = 1.75
"#;

fn main() -> Result<()> {
    println!("=== Toolhead Dry Run ===\n");

    let config = parse_config(PRINTER_TOML)?;
    println!("Loaded configuration:");
    println!("  max_velocity: {} mm/s", config.toolhead.max_velocity);
    println!("  max_accel: {} mm/s^2", config.toolhead.max_accel);
    println!("  buffer: {}s..{}s", config.toolhead.buffer_time_low, config.toolhead.buffer_time_high);

    let reactor = ManualReactor::new();
    let mcu = SimMcu::new(16_000_000.0);
    let trapq = Rc::new(RefCell::new(TrapQ::new()));
    let kin = Cartesian::from_config(&config);
    let mut toolhead = Toolhead::new(&config.toolhead, mcu, reactor.clone(), Rc::clone(&trapq), kin);

    if let Some(ext_config) = &config.extruder {
        let extruder = Extruder::new("extruder", ext_config, &config.toolhead, TrapQ::new());
        toolhead.set_extruder(Box::new(extruder), 0.0)?;
    }

    // Count step generation passes
    let passes = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&passes);
    toolhead.register_step_generator(Box::new(move |_flush_time| counter.set(counter.get() + 1)));

    toolhead.set_position([0.0, 0.0, 0.0, 0.0], &[0, 1, 2])?;

    println!("\nPrinting a 40mm square...");
    let corners = [[60.0, 20.0], [60.0, 60.0], [20.0, 60.0], [20.0, 20.0]];
    toolhead.move_to([20.0, 20.0, 0.2, 0.0], 150.0)?;
    let mut e = 0.0;
    for [x, y] in corners {
        e += 40.0 * 0.0332;
        toolhead.move_to([x, y, 0.2, e], 100.0)?;
        let (print_time, est, empty) = toolhead.check_busy(reactor.monotonic());
        println!(
            "  -> ({:5.1}, {:5.1}) print_time={:.3} est={:.3} lookahead_empty={}",
            x, y, print_time, est, empty
        );
    }

    toolhead.wait_moves()?;
    let status = toolhead.get_status(reactor.monotonic());
    println!("\nAfter wait_moves:");
    println!("  state: {}", status.state.name());
    println!("  print_time: {:.3}", status.print_time);
    println!("  printing_time: {:.3}", status.printing_time);
    println!("  step generation passes: {}", passes.get());
    println!("  pieces left in trapq: {}", trapq.borrow().len());

    println!("\nDrip move toward Z=0, triggering after 3 batches...");
    let mut batches = 0;
    let mut probe = || {
        batches += 1;
        batches > 3
    };
    let outcome = toolhead.drip_move([20.0, 20.0, 0.0, e], 5.0, &mut probe)?;
    println!("  outcome: {:?}", outcome);
    println!("  state: {}", toolhead.state().name());

    let (_, stats) = toolhead.stats(reactor.monotonic());
    println!("\n{}", stats);

    println!("\n=== Dry Run Complete ===");
    Ok(())
}
