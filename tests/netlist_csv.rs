use std::io::Write as _;

use num_complex::Complex;
use rlc_cascade::circuits::{Cascade, Component, Excitation, OutputQuantity, Stage};
use rlc_cascade::constants::angular_frequency;
use rlc_cascade::errors::CascadeError;
use rlc_cascade::format::{write_response_csv, OutputSpec};
use rlc_cascade::netlist::{Netlist, ParseError};
use rlc_cascade::simulation::{analyse, ErrorPolicy, Execution, SweepConfig};
use rlc_cascade::sweep::FrequencySweep;

const RC_SECTION: &str = "\
<CIRCUIT>
n1=1 n2=2 R=1k
n1=2 n2=0 C=10 u    # separate prefix token
</CIRCUIT>
<TERMS>
VT=1, RS=50, RL=1000
Fstart=1000 Fend=2000 Nfreqs=2
</TERMS>
<OUTPUT>
Zin Ohms
Av dB
</OUTPUT>
";

fn write_netlist(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn netlist_to_csv() {
    let file = write_netlist(RC_SECTION);
    let netlist = Netlist::read(file.path()).unwrap();
    let result = netlist
        .analyse(ErrorPolicy::Abort, Execution::Sequential)
        .unwrap();

    let mut out = Vec::new();
    write_response_csv(
        &mut out,
        &result,
        &netlist.outputs,
        netlist.excitation,
        netlist.cascade.source_impedance(),
    )
    .unwrap();
    let csv = String::from_utf8(out).unwrap();
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "      Freq,    Re(Zin),    Im(Zin),       |Av|,       /_Av"
    );
    assert_eq!(
        lines[1],
        "        Hz,       Ohms,       Ohms,         dB,       Rads"
    );
    assert_eq!(
        lines[2],
        " 1.000e+03,  1.000e+03, -1.591e+01, -3.597e+01, -1.539e+00"
    );
    assert!(lines[3].starts_with(" 2.000e+03,"));
}

#[test]
fn norton_source_needs_source_impedance() {
    let text = RC_SECTION.replace("VT=1, RS=50", "IN=1, RS=0");
    let file = write_netlist(&text);
    match Netlist::read(file.path()) {
        Err(CascadeError::Parse(ParseError::Terms(msg))) => {
            assert!(msg.contains("current source"), "{msg}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn undefined_points_are_written_as_such() {
    let x = angular_frequency(1000.0) * 1e-3;
    let cascade = Cascade::new(
        vec![Stage::series(Component::inductor("L1", 1e-3).unwrap())],
        Complex::new(50.0, 0.0),
        Complex::new(0.0, -x),
    )
    .unwrap();
    let config = SweepConfig::new(FrequencySweep::linear(500.0, 1000.0, 2).unwrap())
        .with_policy(ErrorPolicy::MarkUndefined);
    let result = analyse(&cascade, &config).unwrap();

    let mut out = Vec::new();
    write_response_csv(
        &mut out,
        &result,
        &[OutputSpec::new(OutputQuantity::Vout)],
        Excitation::default(),
        cascade.source_impedance(),
    )
    .unwrap();
    let csv = String::from_utf8(out).unwrap();
    let rows: Vec<_> = csv.lines().skip(2).collect();
    assert_eq!(rows.len(), 2);
    assert!(!rows[0].contains("undefined"));
    assert_eq!(rows[1], " 1.000e+03,  undefined,  undefined");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Netlist::read(dir.path().join("absent.net")).unwrap_err();
    assert!(matches!(err, CascadeError::Io(_)));
}

#[test]
fn port_drive_failures_become_undefined_cells() {
    // Zin = Zl + R = -50 Ω cancels Zs = 50 Ω: the response exists but no
    // input current can be formed.
    let cascade = Cascade::new(
        vec![Stage::series(Component::resistor("R1", 100.0).unwrap())],
        Complex::new(50.0, 0.0),
        Complex::new(-150.0, 0.0),
    )
    .unwrap();
    let config = SweepConfig::new(FrequencySweep::linear(10.0, 20.0, 2).unwrap());
    let result = analyse(&cascade, &config).unwrap();
    assert!(result.is_complete());

    let mut out = Vec::new();
    write_response_csv(
        &mut out,
        &result,
        &[OutputSpec::new(OutputQuantity::Vout)],
        Excitation::default(),
        cascade.source_impedance(),
    )
    .unwrap();
    let csv = String::from_utf8(out).unwrap();
    let rows: Vec<_> = csv.lines().skip(2).collect();
    assert_eq!(rows[0], " 1.000e+01,  undefined,  undefined");
    assert_eq!(rows[1], " 2.000e+01,  undefined,  undefined");
}
