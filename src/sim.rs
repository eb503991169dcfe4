pub trait SimComponent {
    type SharedStatus;
    /// advance the component by one step, return whether it did any work
    fn update(
        &mut self,
        shared_status: &mut Self::SharedStatus,
        current_cycle: usize,
    ) -> eyre::Result<bool>;
}

impl<T, C> SimComponent for &mut T
where
    T: SimComponent<SharedStatus = C>,
{
    type SharedStatus = C;
    fn update(
        &mut self,
        shared_status: &mut Self::SharedStatus,
        current_cycle: usize,
    ) -> eyre::Result<bool> {
        (*self).update(shared_status, current_cycle)
    }
}

/// Steps a component until it goes idle.
///
/// The first error stops the run; the component and status are dropped with
/// the runner.
#[derive(Debug)]
pub struct SimRunner<T, S> {
    sim: T,
    shared_status: S,
    current_cycle: usize,
}
impl<T, S> SimRunner<T, S>
where
    T: SimComponent<SharedStatus = S>,
{
    pub fn new(sim: T, shared_status: S) -> SimRunner<T, S> {
        SimRunner {
            sim,
            current_cycle: 0,
            shared_status,
        }
    }
    pub fn get_sim(&self) -> &T {
        &self.sim
    }
    pub fn get_shared_status(&self) -> &S {
        &self.shared_status
    }
    pub fn run(&mut self) -> eyre::Result<()> {
        while self.sim.update(&mut self.shared_status, self.current_cycle)? {
            self.current_cycle += 1;
        }
        tracing::debug!("simulation idle after {} cycles", self.current_cycle);
        Ok(())
    }
    pub fn get_current_cycle(&self) -> usize {
        self.current_cycle
    }
    pub fn into_inner(self) -> (T, S, usize) {
        (self.sim, self.shared_status, self.current_cycle)
    }
}
