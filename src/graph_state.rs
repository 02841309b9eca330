use mbqc_sim::{ circuit::Simulator, graph::Node, graph_state::GraphState };
use tracing_subscriber::EnvFilter;

// build a few small cluster states and check that every stabilizer generator
// has expectation value +1
fn main() -> anyhow::Result<()> {
    const CHAIN: usize = 3;
    const ROWS: usize = 2;
    const COLS: usize = 2;
    const SEED: Option<u64> = Some(10546);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let mut chain = GraphState::cluster_1d(CHAIN);
    let mut sim = Simulator::new(CHAIN, SEED);
    println!("1D cluster, {} qubits", CHAIN);
    println!("{}", chain.compute_state_vector(&mut sim)?);
    let values = chain.check_stabilizers()?;
    for (stab, val) in chain.stabilizers().iter().zip(&values) {
        println!("  ⟨{}⟩ = {:+.6}", stab, val);
    }

    let mut grid = GraphState::cluster_2d(ROWS, COLS);
    let mut sim = Simulator::new(ROWS * COLS, SEED);
    grid.compute_state_vector(&mut sim)?;
    println!("2D cluster, {}×{} grid", ROWS, COLS);
    for node in grid.graph().nodes() {
        let neighbors = grid.graph().neighbors_of(node).unwrap_or_default();
        println!(
            "  {} -> qubit {}, neighbors {:?}",
            node, grid.get_qubit(node)?, neighbors,
        );
    }
    let values = grid.check_stabilizers()?;
    for (stab, val) in grid.stabilizers().iter().zip(&values) {
        println!("  ⟨{}⟩ = {:+.6}", stab, val);
    }
    println!("corner qubit (1, 1) = {}", grid.get_qubit(&Node::Grid(1, 1))?);

    Ok(())
}
