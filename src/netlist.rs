//! Reader for `.net` circuit description files.
//!
//! A file holds three tagged blocks:
//!
//! ```text
//! <CIRCUIT>
//! n1=1 n2=2 R=1 k      # series 1 kΩ between nodes 1 and 2
//! n1=2 n2=0 C=10u      # shunt 10 µF at node 2
//! </CIRCUIT>
//! <TERMS>
//! VT=5 RS=50
//! RL=1000
//! LFstart=10 LFend=10k Nfreqs=50
//! </TERMS>
//! <OUTPUT>
//! Vout V
//! Av dB
//! </OUTPUT>
//! ```
//!
//! `#` starts a comment. Separators may be spaces or commas and `=` may be
//! padded. A node of `0` is ground: such an element becomes a shunt stage at
//! its other node. Every other element is a series stage between adjacent
//! nodes, and series links must cover nodes `1..=N` exactly once.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::circuits::cascade::Cascade;
use crate::circuits::component::{Capacitor, Component, Inductor, Resistor};
use crate::circuits::stage::{Stage, Topology};
use crate::circuits::terminals::{Excitation, OutputQuantity};
use crate::errors::{AnalysisError, CascadeError, ConfigError};
use crate::format::{OutputSpec, SiPrefix};
use crate::math::{CScalar, Scalar};
use crate::simulation::{analyse, ErrorPolicy, Execution, SweepConfig, SweepResult};
use crate::sweep::{FrequencySweep, Spacing, MAX_POINTS};

/// Failure to understand a netlist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A `<TAG>` … `</TAG>` pair is absent.
    #[error("{0} block is missing")]
    MissingBlock(&'static str),
    /// A block holds no entries.
    #[error("{0} block is empty")]
    EmptyBlock(&'static str),
    /// A line could not be understood.
    #[error("line {line}: {reason} in `{text}`")]
    InvalidLine {
        /// One-based line number in the file.
        line: usize,
        /// The offending line, comments removed.
        text: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The elements do not form a ladder between nodes 1..N.
    #[error("invalid circuit connection: {0}")]
    Connection(String),
    /// The `<TERMS>` block is incomplete or contradictory.
    #[error("invalid terms: {0}")]
    Terms(String),
    /// A value parsed but is not acceptable to the engine.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a netlist file describes.
#[derive(Debug, Clone, PartialEq)]
pub struct Netlist {
    /// Ordered stages with source and load terminations.
    pub cascade: Cascade,
    /// Source driving port 1.
    pub excitation: Excitation,
    /// Frequencies to evaluate.
    pub sweep: FrequencySweep,
    /// Requested output columns, in file order.
    pub outputs: Vec<OutputSpec>,
}

impl Netlist {
    /// Reads and parses the file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, CascadeError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(parse(&text)?)
    }

    /// Sweep configuration for this netlist under `policy` and `execution`.
    #[must_use]
    pub fn sweep_config(&self, policy: ErrorPolicy, execution: Execution) -> SweepConfig {
        SweepConfig {
            sweep: self.sweep,
            policy,
            execution,
        }
    }

    /// Runs the described sweep.
    pub fn analyse(
        &self,
        policy: ErrorPolicy,
        execution: Execution,
    ) -> Result<SweepResult, AnalysisError> {
        analyse(&self.cascade, &self.sweep_config(policy, execution))
    }
}

struct Line<'a> {
    number: usize,
    text: &'a str,
}

impl Line<'_> {
    fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError::InvalidLine {
            line: self.number,
            text: self.text.trim().to_owned(),
            reason: reason.into(),
        }
    }
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|l| l.split_once('#').map_or(l, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lines between `<tag>` and the last `</tag>`, numbered as in the file.
fn block<'a>(text: &'a str, tag: &'static str) -> Result<Vec<Line<'a>>, ParseError> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = text.find(&open).ok_or(ParseError::MissingBlock(tag))? + open.len();
    let end = text.rfind(&close).ok_or(ParseError::MissingBlock(tag))?;
    if end < start {
        return Err(ParseError::MissingBlock(tag));
    }
    let first_line = text[..start].matches('\n').count() + 1;
    let lines: Vec<_> = text[start..end]
        .split('\n')
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| Line {
            number: first_line + i,
            text: l,
        })
        .collect();
    if lines.is_empty() {
        return Err(ParseError::EmptyBlock(tag));
    }
    Ok(lines)
}

/// Splits a line into tokens, gluing `key = value` pairs back together.
fn tokens(line: &str) -> Vec<String> {
    let spaced = line.replace(',', " ");
    let mut glued = String::with_capacity(spaced.len());
    let mut chars = spaced.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '=' {
            glued.truncate(glued.trim_end().len());
            glued.push('=');
            while chars.peek().is_some_and(|n| n.is_whitespace() || *n == '=') {
                chars.next();
            }
        } else {
            glued.push(c);
        }
    }
    glued.split_whitespace().map(str::to_owned).collect()
}

/// Parses a number with an optional trailing SI prefix letter (`4.7k`, `10u`).
pub fn parse_value(text: &str) -> Option<Scalar> {
    if let Ok(v) = text.parse::<Scalar>() {
        return Some(v);
    }
    let mut chars = text.chars();
    let last = chars.next_back()?;
    let prefix = SiPrefix::from_symbol(last)?;
    let number: Scalar = chars.as_str().parse().ok()?;
    Some(number * prefix.factor())
}

fn prefix_token(token: &str) -> Option<SiPrefix> {
    let mut chars = token.chars();
    let symbol = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    SiPrefix::from_symbol(symbol)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Resistance,
    Conductance,
    Capacitance,
    Inductance,
}

impl ElementKind {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "R" => Self::Resistance,
            "G" => Self::Conductance,
            "C" => Self::Capacitance,
            "L" => Self::Inductance,
            _ => return None,
        })
    }

    fn letter(self) -> char {
        match self {
            Self::Resistance => 'R',
            Self::Conductance => 'G',
            Self::Capacitance => 'C',
            Self::Inductance => 'L',
        }
    }

    fn build(self, name: String, value: Scalar) -> Result<Component, ConfigError> {
        Ok(match self {
            Self::Resistance => Resistor::new(name, value)?.into(),
            Self::Conductance => Resistor::from_conductance(name, value)?.into(),
            Self::Capacitance => Capacitor::new(name, value)?.into(),
            Self::Inductance => Inductor::new(name, value)?.into(),
        })
    }
}

struct Element {
    node: u32,
    topology: Topology,
    component: Component,
}

fn parse_node(line: &Line<'_>, key: &str, value: &str) -> Result<u32, ParseError> {
    value
        .parse::<u32>()
        .map_err(|_| line.error(format!("node `{key}` must be a non-negative integer")))
}

fn parse_element(line: &Line<'_>, counters: &mut BTreeMap<char, usize>) -> Result<Element, ParseError> {
    let mut n1 = None;
    let mut n2 = None;
    let mut element: Option<(ElementKind, Scalar)> = None;
    let mut prefix = SiPrefix::Unit;

    for token in tokens(line.text) {
        let Some((key, value)) = token.split_once('=') else {
            match prefix_token(&token) {
                Some(p) => prefix = p,
                None => warn!(line = line.number, token = %token, "unknown unit prefix, ignoring"),
            }
            continue;
        };
        match key {
            "n1" => n1 = Some(parse_node(line, key, value)?),
            "n2" => n2 = Some(parse_node(line, key, value)?),
            _ => {
                let kind = ElementKind::from_key(key)
                    .ok_or_else(|| line.error(format!("unknown variable `{key}`")))?;
                if element.is_some() {
                    return Err(line.error("more than one component value"));
                }
                let v = parse_value(value)
                    .ok_or_else(|| line.error(format!("invalid value `{value}`")))?;
                element = Some((kind, v));
            }
        }
    }

    let n1 = n1.ok_or_else(|| line.error("missing node `n1`"))?;
    let n2 = n2.ok_or_else(|| line.error("missing node `n2`"))?;
    let (kind, value) = element.ok_or_else(|| line.error("missing component value"))?;

    let (node, topology) = match (n1.min(n2), n1.max(n2)) {
        (0, 0) => return Err(line.error("both ends connected to ground")),
        (0, hi) => (hi, Topology::Shunt),
        (lo, hi) if hi - lo == 1 => (lo, Topology::Series),
        _ => return Err(line.error("series nodes must be adjacent")),
    };

    let count = counters.entry(kind.letter()).or_insert(0);
    *count += 1;
    let name = format!("{}{}", kind.letter(), count);
    let component = kind.build(name, value * prefix.factor())?;
    Ok(Element {
        node,
        topology,
        component,
    })
}

/// Orders elements into stages: by node, shunt before series at the same node.
fn order_stages(mut elements: Vec<Element>) -> Result<Vec<Stage>, ParseError> {
    let mut series_nodes: Vec<u32> = elements
        .iter()
        .filter(|e| e.topology == Topology::Series)
        .map(|e| e.node)
        .collect();
    series_nodes.sort_unstable();
    for pair in series_nodes.windows(2) {
        if pair[0] == pair[1] {
            return Err(ParseError::Connection(format!(
                "series components cannot share nodes {} and {}",
                pair[0],
                pair[0] + 1
            )));
        }
    }
    for (expected, &node) in (1u32..).zip(&series_nodes) {
        if node != expected {
            return Err(ParseError::Connection(format!(
                "node {expected} is not connected to node {} by a series component",
                expected + 1
            )));
        }
    }
    let last_node = series_nodes.len() as u32 + 1;
    if let Some(stray) = elements
        .iter()
        .find(|e| e.topology == Topology::Shunt && e.node > last_node)
    {
        return Err(ParseError::Connection(format!(
            "shunt element at node {} lies beyond the output node {last_node}",
            stray.node
        )));
    }

    // Stable: parallel shunts at one node keep file order.
    elements.sort_by_key(|e| (e.node, e.topology == Topology::Series));
    Ok(elements
        .into_iter()
        .map(|e| Stage::new(e.component, e.topology))
        .collect())
}

fn parse_circuit(lines: &[Line<'_>]) -> Result<Vec<Stage>, ParseError> {
    let mut counters = BTreeMap::new();
    let elements = lines
        .iter()
        .map(|line| parse_element(line, &mut counters))
        .collect::<Result<Vec<_>, _>>()?;
    order_stages(elements)
}

#[derive(Default)]
struct Terms {
    source: Option<Excitation>,
    source_impedance: Option<Scalar>,
    load: Option<Scalar>,
    start: Option<Scalar>,
    stop: Option<Scalar>,
    points: Option<Scalar>,
    /// Set by the `L` marker of the frequency term read last.
    logarithmic: bool,
}

fn set_once<T>(slot: &mut Option<T>, value: T, what: &str) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::Terms(format!("{what} given more than once")));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_terms(lines: &[Line<'_>]) -> Result<(Excitation, Scalar, Scalar, FrequencySweep), ParseError> {
    let mut t = Terms::default();
    for line in lines {
        for token in tokens(line.text) {
            let (key, raw) = token
                .split_once('=')
                .ok_or_else(|| line.error(format!("expected `name=value`, found `{token}`")))?;
            let value =
                parse_value(raw).ok_or_else(|| line.error(format!("invalid value `{raw}`")))?;
            match key {
                "VT" => set_once(&mut t.source, Excitation::Voltage(CScalar::new(value, 0.0)), "source")?,
                "IN" => set_once(&mut t.source, Excitation::Current(CScalar::new(value, 0.0)), "source")?,
                "RS" => set_once(&mut t.source_impedance, value, "source impedance")?,
                "GS" => {
                    if value <= 0.0 || !value.is_finite() {
                        return Err(line.error("source conductance must be positive"));
                    }
                    set_once(&mut t.source_impedance, 1.0 / value, "source impedance")?;
                }
                "RL" => set_once(&mut t.load, value, "load")?,
                "Fstart" | "LFstart" => {
                    t.logarithmic = key.starts_with('L');
                    set_once(&mut t.start, value, "start frequency")?;
                }
                "Fend" | "LFend" => {
                    t.logarithmic = key.starts_with('L');
                    set_once(&mut t.stop, value, "end frequency")?;
                }
                "Nfreqs" => set_once(&mut t.points, value, "number of frequencies")?,
                _ => return Err(line.error(format!("unknown term `{key}`"))),
            }
        }
    }

    let missing = |what: &str| ParseError::Terms(format!("missing {what}"));
    let source = t.source.ok_or_else(|| missing("source (VT or IN)"))?.validate()?;
    let zs = t.source_impedance.ok_or_else(|| missing("source impedance (RS or GS)"))?;
    let zl = t.load.ok_or_else(|| missing("load (RL)"))?;
    let start = t.start.ok_or_else(|| missing("start frequency (Fstart)"))?;
    let stop = t.stop.ok_or_else(|| missing("end frequency (Fend)"))?;
    let points = t.points.ok_or_else(|| missing("number of frequencies (Nfreqs)"))?;

    if zs < 0.0 {
        return Err(ParseError::Terms("source impedance cannot be negative".into()));
    }
    if matches!(source, Excitation::Current(_)) && zs == 0.0 {
        return Err(ParseError::Terms("a current source needs a non-zero source impedance".into()));
    }
    if points.fract() != 0.0 || points < 0.0 {
        return Err(ParseError::Terms(format!("Nfreqs must be a whole number, got {points}")));
    }
    if points > MAX_POINTS as Scalar {
        return Err(ParseError::Terms(format!(
            "Nfreqs must not exceed {MAX_POINTS}, got {points}"
        )));
    }
    let spacing = if t.logarithmic {
        Spacing::Logarithmic
    } else {
        Spacing::Linear
    };
    let sweep = FrequencySweep::new(start, stop, points as usize, spacing)?;
    Ok((source, zs, zl, sweep))
}

fn parse_output(line: &Line<'_>) -> Result<OutputSpec, ParseError> {
    let text = line.text.trim();
    let (name, unit) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(n, u)| (n, u.trim()));
    let quantity = OutputQuantity::from_label(name)
        .ok_or_else(|| line.error(format!("unknown output variable `{name}`")))?;
    if unit.is_empty() {
        return Ok(OutputSpec::new(quantity));
    }

    let (decibels, rest) = unit
        .strip_prefix("dB")
        .map_or((false, unit), |rest| (true, rest));
    let base = quantity.unit();
    let rest = if base.is_empty() {
        rest.strip_suffix('L').unwrap_or(rest)
    } else {
        rest.strip_suffix(base).unwrap_or(rest)
    };
    let prefix = match rest {
        "" => SiPrefix::Unit,
        p => prefix_token(p).ok_or_else(|| line.error(format!("unknown unit `{unit}`")))?,
    };
    Ok(OutputSpec {
        quantity,
        decibels,
        prefix,
        unit: unit.to_owned(),
    })
}

/// Parses netlist text.
pub fn parse(text: &str) -> Result<Netlist, ParseError> {
    let text = strip_comments(text);
    let stages = parse_circuit(&block(&text, "CIRCUIT")?)?;
    let (excitation, zs, zl, sweep) = parse_terms(&block(&text, "TERMS")?)?;
    let outputs = block(&text, "OUTPUT")?
        .iter()
        .map(parse_output)
        .collect::<Result<Vec<_>, _>>()?;
    let cascade = Cascade::resistive(stages, zs, zl)?;
    debug!(
        stages = cascade.len(),
        points = sweep.len(),
        outputs = outputs.len(),
        "parsed netlist"
    );
    Ok(Netlist {
        cascade,
        excitation,
        sweep,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::circuits::component::{ComponentKind, Lumped};

    const SAMPLE: &str = "\
# low-pass test circuit
<CIRCUIT>
n1=1 n2=2 R=1 k     # series
n1 = 2, n2 = 0, C = 10u
</CIRCUIT>
<TERMS>
VT=5 RS=50
RL=1000
LFstart=10 LFend=10k Nfreqs=4
</TERMS>
<OUTPUT>
Vout mV
Av dB
Zin Ohms
Ap
</OUTPUT>
";

    #[test]
    fn sample_netlist_parses() {
        let net = parse(SAMPLE).unwrap();
        let stages = net.cascade.stages();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].topology, Topology::Series);
        assert_eq!(stages[0].component.kind(), ComponentKind::Resistor);
        assert_relative_eq!(stages[0].component.value(), 1000.0);
        assert_eq!(stages[1].topology, Topology::Shunt);
        assert_eq!(stages[1].component.name(), "C1");
        assert_relative_eq!(stages[1].component.value(), 10e-6, max_relative = 1e-12);

        assert_eq!(net.excitation, Excitation::Voltage(CScalar::new(5.0, 0.0)));
        assert_eq!(net.cascade.source_impedance(), CScalar::new(50.0, 0.0));
        assert_eq!(net.cascade.load_impedance(), CScalar::new(1000.0, 0.0));
        assert_eq!(net.sweep.spacing(), Spacing::Logarithmic);
        assert_eq!(net.sweep.len(), 4);
        assert_eq!(net.sweep.stop(), 10_000.0);

        assert_eq!(net.outputs.len(), 4);
        assert_eq!(net.outputs[0].prefix, SiPrefix::Milli);
        assert!(!net.outputs[0].decibels);
        assert!(net.outputs[1].decibels);
        assert_eq!(net.outputs[2].unit, "Ohms");
        assert_eq!(net.outputs[3], OutputSpec::new(OutputQuantity::Ap));
    }

    #[test]
    fn tokens_normalise_separators() {
        assert_eq!(
            tokens("n1 =======    2   ,   n2 = 1, R   = === 17  "),
            vec!["n1=2", "n2=1", "R=17"]
        );
    }

    #[test]
    fn values_accept_attached_prefixes() {
        assert_eq!(parse_value("4.7k"), Some(4700.0));
        assert_relative_eq!(parse_value("10u").unwrap(), 1e-5, max_relative = 1e-12);
        assert_eq!(parse_value("1e3"), Some(1000.0));
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value(""), None);
    }

    fn with_circuit(circuit: &str) -> String {
        format!(
            "<CIRCUIT>\n{circuit}\n</CIRCUIT>\n<TERMS>\nVT=1 RS=0 RL=50 Fstart=1 Fend=10 Nfreqs=2\n</TERMS>\n<OUTPUT>\nAv\n</OUTPUT>\n"
        )
    }

    #[test]
    fn stages_follow_node_order_with_shunts_first() {
        let net = parse(&with_circuit(
            "n1=3 n2=0 R=30\nn1=2 n2=3 L=2m\nn1=1 n2=0 G=0.1\nn1=1 n2=2 C=1u\nn1=3 n2=0 C=3n",
        ))
        .unwrap();
        let names: Vec<_> = net.cascade.stages().iter().map(|s| s.component.name()).collect();
        assert_eq!(names, ["G1", "C1", "L1", "R1", "C2"]);
        assert_relative_eq!(net.cascade.stages()[0].component.value(), 10.0, max_relative = 1e-12);
        assert_eq!(net.sweep.spacing(), Spacing::Linear);
    }

    #[test]
    fn connection_errors() {
        let err = parse(&with_circuit("n1=1 n2=3 R=1")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine { line: 2, .. }), "{err}");
        let err = parse(&with_circuit("n1=1 n2=2 R=1\nn1=2 n2=1 R=2")).unwrap_err();
        assert!(matches!(err, ParseError::Connection(_)), "{err}");
        let err = parse(&with_circuit("n1=2 n2=3 R=1")).unwrap_err();
        assert!(matches!(err, ParseError::Connection(_)), "{err}");
        let err = parse(&with_circuit("n1=1 n2=2 R=1\nn1=5 n2=0 R=1")).unwrap_err();
        assert!(matches!(err, ParseError::Connection(_)), "{err}");
        let err = parse(&with_circuit("n1=0 n2=0 R=1")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine { .. }), "{err}");
    }

    #[test]
    fn bad_values_are_reported() {
        let err = parse(&with_circuit("n1=1 n2=2 X=1")).unwrap_err();
        assert!(err.to_string().contains("unknown variable `X`"), "{err}");
        let err = parse(&with_circuit("n1=1 n2=2 R=-5")).unwrap_err();
        assert!(matches!(err, ParseError::Config(ConfigError::NonPositiveValue { .. })));
        let err = parse(&with_circuit("n1=1 n2=2 R=1 C=2")).unwrap_err();
        assert!(err.to_string().contains("more than one"), "{err}");
    }

    #[test]
    fn missing_blocks_and_terms() {
        assert_eq!(parse("<CIRCUIT>\n</CIRCUIT>"), Err(ParseError::EmptyBlock("CIRCUIT")));
        assert_eq!(parse("nothing here"), Err(ParseError::MissingBlock("CIRCUIT")));
        let text = "<CIRCUIT>\nn1=1 n2=2 R=1\n</CIRCUIT>\n<TERMS>\nVT=1 RS=0 Fstart=1 Fend=10 Nfreqs=2\n</TERMS>\n<OUTPUT>\nAv\n</OUTPUT>";
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("load"), "{err}");
        let text = text.replace("VT=1", "VT=1 IN=2 RL=5");
        let err = parse(&text).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn output_units() {
        let net = parse(&with_circuit("n1=1 n2=2 R=1").replace("Av\n", "Pout dBmW\nT L\nIin uA\n"))
            .unwrap();
        assert!(net.outputs[0].decibels);
        assert_eq!(net.outputs[0].prefix, SiPrefix::Milli);
        assert_eq!(net.outputs[1].prefix, SiPrefix::Unit);
        assert_eq!(net.outputs[2].prefix, SiPrefix::Micro);
        let err = parse(&with_circuit("n1=1 n2=2 R=1").replace("Av\n", "Vin furlongs\n"))
            .unwrap_err();
        assert!(err.to_string().contains("unknown unit"), "{err}");
    }

    #[test]
    fn oversized_point_count_is_rejected() {
        for n in ["1e30", "20000000", "1.5"] {
            let text = with_circuit("n1=1 n2=2 R=1").replace("Nfreqs=2", &format!("Nfreqs={n}"));
            let err = parse(&text).unwrap_err();
            assert!(matches!(err, ParseError::Terms(_)), "{n}: {err}");
        }
        let text = with_circuit("n1=1 n2=2 R=1").replace("Nfreqs=2", "Nfreqs=1000");
        assert_eq!(parse(&text).unwrap().sweep.len(), 1000);
    }

    #[test]
    fn last_frequency_term_sets_spacing() {
        let circuit = with_circuit("n1=1 n2=2 R=1");
        let text = circuit.replace("Fstart=1 Fend=10", "LFstart=1 Fend=10");
        assert_eq!(parse(&text).unwrap().sweep.spacing(), Spacing::Linear);
        let text = circuit.replace("Fstart=1 Fend=10", "Fend=10 LFstart=1");
        assert_eq!(parse(&text).unwrap().sweep.spacing(), Spacing::Logarithmic);
        let text = circuit.replace("Fstart=1 Fend=10", "Fstart=1 LFend=10");
        assert_eq!(parse(&text).unwrap().sweep.spacing(), Spacing::Logarithmic);
    }
}
