use crate::model::{Algorithm, LinkCost, RoutingError, SimulationReport, Topology};

/// A routing algorithm that can be simulated over a static topology.
pub trait RoutingEngine<C: LinkCost> {
    fn algorithm(&self) -> Algorithm;

    fn run(&self, topology: &Topology<C>) -> Result<SimulationReport<C>, RoutingError<C>>;

    fn name(&self) -> &'static str {
        self.algorithm().name()
    }
}
