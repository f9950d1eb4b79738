use rlc_cascade::circuits::{Cascade, Component, Stage};
use rlc_cascade::errors::CascadeError;
use rlc_cascade::format::to_decibels;
use rlc_cascade::simulation::{analyse, ErrorPolicy, SweepConfig};

fn main() -> Result<(), CascadeError> {
    // Second-order LC low-pass between 50 Ω terminations (fc ≈ 1 MHz).
    let cascade = Cascade::resistive(
        vec![
            Stage::series(Component::inductor("L1", 11.25e-6)?),
            Stage::shunt(Component::capacitor("C1", 4.5e-9)?),
        ],
        50.0,
        50.0,
    )?;

    let config = SweepConfig::logarithmic(1.0e4, 1.0e8, 21)?.with_policy(ErrorPolicy::MarkUndefined);
    let result = analyse(&cascade, &config)?;

    println!("freq(Hz), |Av|(dB), Zin_real(ohm), Zin_imag(ohm)");
    for p in result.responses() {
        let zin = p.input_impedance();
        println!(
            "{:.6e}, {:.3}, {:.6e}, {:.6e}",
            p.frequency,
            to_decibels(p.voltage_gain(), false),
            zin.re,
            zin.im
        );
    }
    Ok(())
}
