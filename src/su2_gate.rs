use std::f64::consts::{ FRAC_1_SQRT_2, PI };
use nalgebra as na;
use num_complex::Complex64 as C64;
use mbqc_sim::{
    exec::Executor,
    gate::Gate,
    gates::{ MbqGate, SU2Gate, XPowGate, YPowGate, ZPowGate },
    state::StateVec,
};
use tracing_subscriber::EnvFilter;

// ∣ψ⟩ on qubit 0, ∣+⟩ on the rest, then CZ down the chain
fn resource(input: na::Vector2<C64>, n: usize) -> anyhow::Result<StateVec> {
    let plus = na::Vector2::new(C64::from(FRAC_1_SQRT_2), C64::from(FRAC_1_SQRT_2));
    let mut state
        = StateVec::from_qubits(
            std::iter::once(input).chain(std::iter::repeat(plus).take(n - 1)))?;
    let czs: Vec<Gate> = (1..n).map(|k| Gate::CZ(k - 1, k)).collect();
    state.apply_circuit(&czs)?;
    Ok(state)
}

fn trials<G>(
    exec: &mut Executor,
    gate: &G,
    ideal: &na::Matrix2<C64>,
    input: na::Vector2<C64>,
) -> anyhow::Result<()>
where G: MbqGate
{
    const TRIALS: usize = 5;
    let qubits: Vec<usize> = (0..gate.num_qubits()).collect();
    let expected = ideal * input;
    println!("gate '{}'", gate.label());
    for _ in 0..TRIALS {
        exec.load(resource(input, qubits.len())?);
        exec.run(gate, &qubits)?;
        let fidelity
            = exec.state().qubit_state(qubits.len() - 1)
            .map(|out| out.dotc(&expected).norm_sqr())
            .unwrap_or(0.0);
        println!("  {}  fidelity = {:.9}", exec.outcomes(), fidelity);
    }
    Ok(())
}

// run the measurement-based SU(2) gate and its Pauli specializations over a
// few seeded trials
fn main() -> anyhow::Result<()> {
    const SEED: Option<u64> = Some(10546);
    const ALPHA: f64 = 0.35 * PI;
    const BETA: f64 = -0.6 * PI;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let input = na::Vector2::new(C64::new(0.6, 0.0), C64::new(0.0, 0.8));
    let mut exec = Executor::new(SEED);

    let su2 = SU2Gate::new(ALPHA, BETA, 0.0, "su2");
    trials(&mut exec, &su2, &su2.logical_unitary(), input)?;
    let x = XPowGate::new(1.0, "x");
    trials(&mut exec, &x, &x.logical_unitary(), input)?;
    let y = YPowGate::new(1.0, "y");
    trials(&mut exec, &y, &y.logical_unitary(), input)?;
    let z = ZPowGate::new(1.0, "z");
    trials(&mut exec, &z, &z.logical_unitary(), input)?;

    Ok(())
}
