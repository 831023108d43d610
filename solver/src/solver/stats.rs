use env_param::EnvParam;
use std::fmt::{Display, Error, Formatter};
use std::time::Duration;

/// If true, statistics are logged each time a solution is found.
pub static STATS_AT_SOLUTION: EnvParam<bool> = EnvParam::new("FDSOLVE_STATS_AT_SOLUTION", "false");

/// Statistics of a [`Manager`](crate::solver::Manager), accumulated over all its searches.
#[derive(Clone, Default, Debug)]
pub struct Stats {
    pub solve_time: Duration,
    pub num_solutions: u64,
    /// Number of goals taken from the search stack.
    pub num_goals: u64,
    pub num_choice_points: u64,
    pub num_backtracks: u64,
    /// Number of dead ends, whether detected by propagation or by a goal.
    pub num_failures: u64,
    /// Number of constraint invocations.
    pub num_propagations: u64,
    pub num_restarts: u64,
    /// Deepest choice point opened.
    pub max_depth: u32,
}

impl Stats {
    pub fn new() -> Stats {
        Stats::default()
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        fn label(f: &mut Formatter<'_>, label: &str) -> Result<(), Error> {
            write!(f, "{label:<20}: ")
        }
        fn val_throughput(f: &mut Formatter<'_>, value: u64, time: &Duration) -> Result<(), Error> {
            let secs = time.as_secs_f64();
            if secs > 0.0 {
                writeln!(f, "{:<12} ({:.0} /sec)", value, (value as f64) / secs)
            } else {
                writeln!(f, "{value:<12}")
            }
        }

        label(f, "solutions")?;
        writeln!(f, "{:<12}", self.num_solutions)?;

        label(f, "restarts")?;
        writeln!(f, "{:<12}", self.num_restarts)?;

        label(f, "goals")?;
        val_throughput(f, self.num_goals, &self.solve_time)?;

        label(f, "choice points")?;
        val_throughput(f, self.num_choice_points, &self.solve_time)?;

        label(f, "backtracks")?;
        val_throughput(f, self.num_backtracks, &self.solve_time)?;

        label(f, "failures")?;
        val_throughput(f, self.num_failures, &self.solve_time)?;

        label(f, "propagations")?;
        val_throughput(f, self.num_propagations, &self.solve_time)?;

        label(f, "max depth")?;
        writeln!(f, "{:<12}", self.max_depth)?;

        writeln!(f, "================= ")?;
        label(f, "Solve time")?;
        writeln!(f, "{:.6} s", self.solve_time.as_secs_f64())?;

        Ok(())
    }
}
