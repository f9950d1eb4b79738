use approx::assert_relative_eq;
use num_complex::Complex;
use rlc_cascade::circuits::{
    compose, Cascade, Component, Excitation, OutputQuantity, Stage, TerminalResponse,
};
use rlc_cascade::constants::angular_frequency;
use rlc_cascade::simulation::{analyse, Execution, SweepConfig};

fn assert_complex(actual: Complex<f64>, expected: Complex<f64>) {
    assert_relative_eq!(actual.re, expected.re, max_relative = 1e-6);
    assert_relative_eq!(actual.im, expected.im, max_relative = 1e-6);
}

fn rc_section() -> Cascade {
    Cascade::resistive(
        vec![
            Stage::series(Component::resistor("R1", 1000.0).unwrap()),
            Stage::shunt(Component::capacitor("C1", 10e-6).unwrap()),
        ],
        50.0,
        1000.0,
    )
    .unwrap()
}

#[test]
fn rc_section_at_one_kilohertz() {
    let TerminalResponse {
        voltage_gain,
        current_gain,
        input_impedance,
        output_impedance,
    } = rc_section().response(1000.0).unwrap();

    assert_complex(input_impedance, Complex::new(1000.253_238_812_965_2, -15.911_463_888_302_917));
    assert_complex(voltage_gain, Complex::new(0.000_506_093_138_653_272_6, -0.015_899_384_864_253_22));
    assert_complex(current_gain, Complex::new(0.000_253_238_812_965_159_9, -0.015_911_463_888_302_918));
    assert_complex(output_impedance, Complex::new(0.241_185_500_281_380_42, -15.911_838_512_563_639));
}

#[test]
fn composed_matrix_is_reciprocal_and_ordered() {
    let cascade = rc_section();
    let omega = angular_frequency(1000.0);
    let m = compose(cascade.stages(), omega).unwrap();
    assert_relative_eq!((m.determinant() - Complex::new(1.0, 0.0)).norm(), 0.0, epsilon = 1e-12);

    let reversed: Vec<_> = cascade.stages().iter().rev().cloned().collect();
    let r = compose(&reversed, omega).unwrap();
    assert!(!m.approx_eq(&r, 1e-9));
    assert_eq!(cascade.matrix(1000.0).unwrap(), m);
}

#[test]
fn pure_series_resistor_divides_into_the_load() {
    let cascade = Cascade::resistive(
        vec![Stage::series(Component::resistor("R1", 100.0).unwrap())],
        0.0,
        100.0,
    )
    .unwrap();
    for f in [1.0, 1.0e3, 1.0e9] {
        let r = cascade.response(f).unwrap();
        assert_complex(r.voltage_gain, Complex::new(0.5, 0.0));
        assert_complex(r.current_gain, Complex::new(1.0, 0.0));
        assert_complex(r.input_impedance, Complex::new(200.0, 0.0));
        assert_complex(r.output_impedance, Complex::new(100.0, 0.0));
    }
}

#[test]
fn sweeps_are_repeatable_and_schedule_independent() {
    let cascade = rc_section();
    let config = SweepConfig::logarithmic(1.0, 1.0e7, 301).unwrap();
    let first = analyse(&cascade, &config).unwrap();
    let second = analyse(&cascade, &config).unwrap();
    assert_eq!(first, second);

    let parallel = analyse(&cascade, &config.with_execution(Execution::Parallel)).unwrap();
    assert_eq!(first, parallel);
    assert_eq!(parallel.frequencies(), config.sweep.to_vec());
}

#[test]
fn port_quantities_follow_from_the_response() {
    let cascade = rc_section();
    let result = analyse(&cascade, &SweepConfig::logarithmic(100.0, 1.0e4, 3).unwrap()).unwrap();
    let point = result.responses().nth(1).unwrap();
    let zs = cascade.source_impedance();

    let thevenin = point.drive(Excitation::Voltage(Complex::new(2.0, 0.0)), zs).unwrap();
    let norton = point
        .drive(Excitation::Current(Complex::new(2.0 / 50.0, 0.0)), zs)
        .unwrap();
    for q in OutputQuantity::ALL {
        assert_complex(norton.get(q), thevenin.get(q));
    }
    assert_complex(thevenin.iin * (zs + point.input_impedance()), Complex::new(2.0, 0.0));
    assert_complex(thevenin.vout, thevenin.iout * cascade.load_impedance());
    assert_complex(thevenin.transducer_gain, thevenin.vout / 2.0);
}
