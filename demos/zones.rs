//! Prints distance-zone polygons, an overcurrent trip time and the
//! differential currents of a small sample relay.
//!
//! Usage:
//! ```text
//! cargo run --example zones
//! RUST_LOG=relaygeom=debug cargo run --example zones
//! ```

use relaygeom::math::PhasorInput;
use relaygeom::operations::differential::{
    Connection, DifferentialCalc, DifferentialSettings, DualSlope, Polarity, RelayModel,
    WindingSettings,
};
use relaygeom::operations::distance::{
    Direction, DirectionalSupervision, DistanceRelay, GroundLoopSettings, LoopSettings, Region,
    ZoneSettings,
};
use relaygeom::operations::overcurrent::{CurveKind, OvercurrentCalc, OvercurrentSettings};
use relaygeom::Result;

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for relaygeom.
    // Override with RUST_LOG (e.g. RUST_LOG=relaygeom=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("zones=info".parse().unwrap_or_default())
        .add_directive("relaygeom=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    distance()?;
    overcurrent()?;
    differential()?;
    Ok(())
}

fn print_region(label: &str, region: &Region) {
    println!("  {label}: {} vertices", region.polygon.len());
    for p in &region.polygon {
        println!("    ({:8.3}, {:8.3})", p.x, p.y);
    }
    if let Some(warning) = &region.warning {
        println!("    warning: {warning}");
    }
}

fn distance() -> Result<()> {
    let zone = |number: u8, forward_reach: f64, direction: Direction| {
        let reach = LoopSettings {
            enabled: true,
            resistive_reach: 10.0,
            forward_reach,
            reverse_reach: 2.0,
            blinder_angle: 75.0,
            tilt: (number == 1).then_some(-3.0),
        };
        ZoneSettings {
            number,
            direction,
            characteristic_angle: 75.0,
            phase: reach,
            ground: GroundLoopSettings {
                reach,
                kn: PhasorInput::new(0.6, -8.0),
            },
        }
    };
    let relay = DistanceRelay::new(
        DirectionalSupervision::default(),
        vec![
            zone(1, 8.0, Direction::Forward),
            zone(2, 12.0, Direction::Forward),
            zone(3, 4.0, Direction::Reverse),
        ],
    );

    println!("== distance ==");
    for result in relay.execute()? {
        println!("zone {} ({:?}), alpha = {:.2}°", result.number, result.direction, result.alpha);
        if let Some(region) = &result.phase {
            print_region("phase", region);
        }
        if let Some(region) = &result.ground {
            print_region("ground", region);
        }
    }
    Ok(())
}

fn overcurrent() -> Result<()> {
    let result = OvercurrentCalc::new(OvercurrentSettings {
        pickup: Some(100.0),
        curve: CurveKind::IecNormalInverse,
        time_dial: 1.0,
        min_time_ms: 0.0,
        fault_current: Some(500.0),
        factor: None,
    })
    .execute()?;

    println!("== overcurrent ==");
    println!("{}", result.equation);
    println!("I/I0 = {:.2}, t = {:.3} s", result.factor, result.trip_time);
    for (current, time) in result.curve.currents.iter().zip(&result.curve.times) {
        println!("  {current:8.1} A  {time:10.4} s");
    }
    Ok(())
}

fn differential() -> Result<()> {
    let balanced = |magnitude: f64, offset: f64| {
        [
            PhasorInput::new(magnitude, offset),
            PhasorInput::new(magnitude, offset - 120.0),
            PhasorInput::new(magnitude, offset + 120.0),
        ]
    };
    let winding = |currents| WindingSettings {
        ct_ratio: 80.0,
        kv: 138.0,
        connection: Connection::Wye,
        tap: 5.0,
        polarity: Polarity::Normal,
        homopolar_filter: false,
        clock_code: 0,
        currents,
    };
    let result = DifferentialCalc::new(DifferentialSettings {
        model: RelayModel::TapScaled,
        power_mva: 0.0,
        reference: 1,
        winding_count: 2,
        windings: vec![winding(balanced(5.0, 0.0)), winding(balanced(4.0, 170.0))],
        slope: DualSlope::default(),
    })
    .execute()?;

    println!("== differential ==");
    for phase in &result.phases {
        println!(
            "  {:?}: Idiff = {:.4}, Irestraint = {:.4}, operates = {}",
            phase.phase, phase.differential, phase.restraint, phase.operates
        );
    }
    Ok(())
}
